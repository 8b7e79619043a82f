use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use shared::Card;

use super::CardStorage;

/// In-memory card store.
///
/// Holds the canonical card records for the lifetime of the process, standing
/// in for a database. Cloning shares the underlying records.
#[derive(Clone, Default)]
pub struct MemoryCardStore {
    cards: Arc<RwLock<Vec<Card>>>,
}

impl MemoryCardStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the sample valentines the demo
    /// deployment ships with: a mix of anonymous and signed cards, some
    /// unlocked immediately and some pinned to Valentine's Day.
    pub fn with_demo_data() -> Self {
        Self {
            cards: Arc::new(RwLock::new(demo_cards())),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Card>>> {
        self.cards.read().map_err(|_| anyhow!("card store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Card>>> {
        self.cards.write().map_err(|_| anyhow!("card store lock poisoned"))
    }
}

impl CardStorage for MemoryCardStore {
    fn store_card(&self, card: &Card) -> Result<()> {
        let mut cards = self.write()?;
        if cards.iter().any(|c| c.id == card.id) {
            return Err(anyhow!("card id already exists: {}", card.id));
        }
        cards.push(card.clone());
        Ok(())
    }

    fn get_card(&self, card_id: &str) -> Result<Option<Card>> {
        let cards = self.read()?;
        Ok(cards.iter().find(|c| c.id == card_id).cloned())
    }

    fn list_for_recipient(&self, recipient_id: &str) -> Result<Vec<Card>> {
        let cards = self.read()?;
        let mut result: Vec<Card> = cards
            .iter()
            .filter(|c| c.recipient_id == recipient_id)
            .cloned()
            .collect();
        sort_by_creation(&mut result);
        Ok(result)
    }

    fn list_all(&self) -> Result<Vec<Card>> {
        let cards = self.read()?;
        let mut result = cards.clone();
        sort_by_creation(&mut result);
        Ok(result)
    }

    fn update_message(&self, card_id: &str, message: &str) -> Result<bool> {
        let mut cards = self.write()?;
        match cards.iter_mut().find(|c| c.id == card_id) {
            Some(card) => {
                card.message = message.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_card(&self, card_id: &str) -> Result<bool> {
        let mut cards = self.write()?;
        let before = cards.len();
        cards.retain(|c| c.id != card_id);
        Ok(cards.len() < before)
    }

    fn count_cards(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}

/// Creation-time ascending, the order the inbox assumes. The id embeds the
/// creation millis; cards with unparseable ids sort first by their raw
/// created_at string.
fn sort_by_creation(cards: &mut [Card]) {
    cards.sort_by(|a, b| {
        let ka = (a.extract_timestamp().unwrap_or(0), a.created_at.clone());
        let kb = (b.extract_timestamp().unwrap_or(0), b.created_at.clone());
        ka.cmp(&kb)
    });
}

fn demo_cards() -> Vec<Card> {
    vec![
        Card {
            id: Card::generate_id(1770714900000),
            sender_id: "u1".to_string(),
            sender_name: "Anya".to_string(),
            recipient_id: "u2".to_string(),
            recipient_name: "Dima".to_string(),
            message: "You make every day special!".to_string(),
            is_anonymous: true,
            card_color: "#800f2f".to_string(),
            unlocks_at: Some("2026-02-14T00:00:00Z".to_string()),
            created_at: "2026-02-10T09:15:00Z".to_string(),
        },
        Card {
            id: Card::generate_id(1770818520000),
            sender_id: "u3".to_string(),
            sender_name: "Nikita".to_string(),
            recipient_id: "u4".to_string(),
            recipient_name: "Katya".to_string(),
            message: "I've wanted to tell you this for a long time...".to_string(),
            is_anonymous: false,
            card_color: "#ff4d6d".to_string(),
            unlocks_at: Some("2026-02-11T14:02:00Z".to_string()),
            created_at: "2026-02-11T14:02:00Z".to_string(),
        },
        Card {
            id: Card::generate_id(1770885000000),
            sender_id: "u5".to_string(),
            sender_name: "Maria".to_string(),
            recipient_id: "u1".to_string(),
            recipient_name: "Anya".to_string(),
            message: "Happy Valentine's Day! You're the best!".to_string(),
            is_anonymous: true,
            card_color: "#ffc107".to_string(),
            unlocks_at: Some("2026-02-14T00:00:00Z".to_string()),
            created_at: "2026-02-12T08:30:00Z".to_string(),
        },
        Card {
            id: Card::generate_id(1770925500000),
            sender_id: "u2".to_string(),
            sender_name: "Dima".to_string(),
            recipient_id: "u5".to_string(),
            recipient_name: "Maria".to_string(),
            message: "You deserve all the best!".to_string(),
            is_anonymous: false,
            card_color: "#9c27b0".to_string(),
            unlocks_at: Some("2026-02-12T19:45:00Z".to_string()),
            created_at: "2026-02-12T19:45:00Z".to_string(),
        },
        Card {
            id: Card::generate_id(1770977100000),
            sender_id: "u4".to_string(),
            sender_name: "Katya".to_string(),
            recipient_id: "u3".to_string(),
            recipient_name: "Nikita".to_string(),
            message: "Every time I see you, my heart beats faster.".to_string(),
            is_anonymous: true,
            card_color: "#e91e63".to_string(),
            unlocks_at: Some("2026-02-14T00:00:00Z".to_string()),
            created_at: "2026-02-13T10:05:00Z".to_string(),
        },
    ]
}
