//! Card lifecycle engine.
//!
//! Pure derivation of a card's recipient-facing state from the stored record
//! and the current wall-clock time. A card is locked while `now` is before
//! its unlock instant and unlocked from that instant on, one-way; the message
//! is withheld (not merely hidden) while locked, and the sender name is
//! redacted for anonymous cards regardless of lock state. Nothing here
//! mutates the card or keeps hidden state.

use chrono::{DateTime, Utc};

use shared::{Card, CardView, InboxCard, TimeRemaining};

use crate::error::AppError;

/// Sender label shown in place of the real name on anonymous cards
pub const SECRET_ADMIRER: &str = "Secret Admirer";

/// Derive the recipient-facing view of a card at `now`.
///
/// Fails with `InvalidCardData` when the unlock instant is missing or
/// unparseable; bad data must never read as "already unlocked".
pub fn derive_view(card: &Card, now: DateTime<Utc>) -> Result<CardView, AppError> {
    let unlocks_at = parse_unlocks_at(card)?;
    let locked = now < unlocks_at;

    let visible_message = if locked { None } else { Some(card.message.clone()) };

    // Redaction is independent of lock state: an unlocked anonymous card
    // still shows the admirer label.
    let display_sender = if card.is_anonymous {
        SECRET_ADMIRER.to_string()
    } else {
        card.sender_name.clone()
    };

    let time_remaining = if locked {
        Some(TimeRemaining::from_duration(unlocks_at - now))
    } else {
        None
    };

    Ok(CardView {
        locked,
        visible_message,
        display_sender,
        time_remaining,
    })
}

/// Derive the wire-facing inbox for a recipient's cards, preserving order
pub fn inbox_views(cards: &[Card], now: DateTime<Utc>) -> Result<Vec<InboxCard>, AppError> {
    cards
        .iter()
        .map(|card| Ok(InboxCard::from_parts(card, derive_view(card, now)?)))
        .collect()
}

/// Number of cards already unlocked at `now` ("N of M ready to open")
pub fn unlocked_count(cards: &[Card], now: DateTime<Utc>) -> Result<usize, AppError> {
    let mut count = 0;
    for card in cards {
        if !derive_view(card, now)?.locked {
            count += 1;
        }
    }
    Ok(count)
}

/// Parse a card's unlock instant, rejecting missing or malformed values
pub(crate) fn parse_unlocks_at(card: &Card) -> Result<DateTime<Utc>, AppError> {
    let raw = card
        .unlocks_at
        .as_deref()
        .ok_or_else(|| AppError::InvalidCardData(format!("card {} has no unlock time", card.id)))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            AppError::InvalidCardData(format!("card {}: bad unlock time {:?}: {}", card.id, raw, e))
        })
}
