//! # Storage layer
//!
//! Defines the storage abstraction the domain layer works against. The only
//! implementation in this system is an in-memory store standing in for a real
//! database; the trait keeps the domain layer unaware of that.

mod memory;

pub use memory::MemoryCardStore;

use anyhow::Result;
use shared::Card;

/// Interface for card storage operations.
///
/// The store exclusively owns the canonical card records. Read paths derive
/// views from what it returns; nothing derived is ever written back.
pub trait CardStorage: Send + Sync {
    /// Store a newly created card
    fn store_card(&self, card: &Card) -> Result<()>;

    /// Retrieve a specific card by ID
    fn get_card(&self, card_id: &str) -> Result<Option<Card>>;

    /// List all cards addressed to a recipient, ordered by creation time
    /// ascending
    fn list_for_recipient(&self, recipient_id: &str) -> Result<Vec<Card>>;

    /// List every card in the store (admin view), creation time ascending
    fn list_all(&self) -> Result<Vec<Card>>;

    /// Replace a card's message. Returns false if no card with the ID exists
    fn update_message(&self, card_id: &str, message: &str) -> Result<bool>;

    /// Delete a card. Returns false if no card with the ID exists
    fn delete_card(&self, card_id: &str) -> Result<bool>;

    /// Total number of stored cards
    fn count_cards(&self) -> Result<usize>;
}
