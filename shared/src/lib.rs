use serde::{Deserialize, Serialize};
use std::fmt;

/// Valentine card ID in format: "valentine::<epoch_millis>"
///
/// The canonical card record. Owned exclusively by the card store; everything
/// recipient-facing is derived from it, never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    /// ID of the sender; may be empty for anonymous cards sent without identity
    pub sender_id: String,
    /// Display name of the sender; redacted in recipient-facing views when
    /// `is_anonymous` is set
    pub sender_name: String,
    /// ID of the recipient this card was sent to
    pub recipient_id: String,
    pub recipient_name: String,
    /// Message text (max 300 characters, enforced at creation)
    pub message: String,
    /// Set at creation, immutable thereafter; controls sender redaction on read
    pub is_anonymous: bool,
    /// Envelope color, carried for rendering only; inert to the lifecycle
    pub card_color: String,
    /// RFC 3339 instant before which the message is withheld from the
    /// recipient. Absent or unparseable values are bad data and must be
    /// rejected on read, never treated as "already unlocked".
    #[serde(default)]
    pub unlocks_at: Option<String>,
    /// RFC 3339 creation timestamp, assigned at creation, immutable
    pub created_at: String,
}

impl Card {
    /// Generate a card ID from a creation timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("valentine::{}", epoch_millis)
    }

    /// Parse a card ID to extract the creation timestamp
    pub fn parse_id(id: &str) -> Result<u64, CardIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "valentine" {
            return Err(CardIdError::InvalidFormat);
        }

        parts[1].parse::<u64>().map_err(|_| CardIdError::InvalidTimestamp)
    }

    /// Extract the creation timestamp from this card's ID (used for ordering)
    pub fn extract_timestamp(&self) -> Result<u64, CardIdError> {
        Self::parse_id(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for CardIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardIdError::InvalidFormat => write!(f, "Invalid card ID format"),
            CardIdError::InvalidTimestamp => write!(f, "Invalid timestamp in card ID"),
        }
    }
}

impl std::error::Error for CardIdError {}

/// Time left until a card unlocks, decomposed into whole units for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    /// Decompose a duration in seconds; negative inputs clamp to zero
    pub fn from_seconds(total_seconds: i64) -> Self {
        let total = total_seconds.max(0);
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    /// Decompose a chrono duration (sub-second precision discarded)
    pub fn from_duration(duration: chrono::Duration) -> Self {
        Self::from_seconds(duration.num_seconds())
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// Derived, read-only view of a card for its recipient.
///
/// All redaction rules live in this one shape: the message is absent while
/// the card is locked, and the sender name is replaced for anonymous cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    /// True while the current time is before the card's unlock instant
    pub locked: bool,
    /// The stored message once unlocked; never populated while locked
    pub visible_message: Option<String>,
    /// Sender label safe to show the recipient
    pub display_sender: String,
    /// Countdown until unlock; absent once the card is unlocked
    pub time_remaining: Option<TimeRemaining>,
}

/// Recipient-facing wire shape: the derived view plus rendering attributes.
/// The true sender name and a locked card's message are never serialized here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxCard {
    pub id: String,
    pub display_sender: String,
    pub locked: bool,
    pub visible_message: Option<String>,
    pub time_remaining: Option<TimeRemaining>,
    pub card_color: String,
    pub unlocks_at: Option<String>,
}

impl InboxCard {
    /// Combine a stored card's rendering attributes with its derived view
    pub fn from_parts(card: &Card, view: CardView) -> Self {
        Self {
            id: card.id.clone(),
            display_sender: view.display_sender,
            locked: view.locked,
            visible_message: view.visible_message,
            time_remaining: view.time_remaining,
            card_color: card.card_color.clone(),
            unlocks_at: card.unlocks_at.clone(),
        }
    }
}

/// Request for sending a new valentine card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCardRequest {
    pub recipient_id: String,
    /// Message text (non-blank, max 300 characters)
    pub message: String,
    /// Defaults to true when omitted
    #[serde(default)]
    pub is_anonymous: Option<bool>,
    /// Defaults to the standard envelope color when omitted
    #[serde(default)]
    pub card_color: Option<String>,
    /// Sender identity; required when the card is signed
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
}

/// Response after sending a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCardResponse {
    pub success: bool,
    pub valentine: Card,
}

/// A user's public profile, assembled from their received cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    /// Link the user shares so friends can send them cards
    pub referral_link: String,
    /// Number of cards received so far
    pub hearts_count: usize,
}

/// Response containing a user's profile and their inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: UserProfile,
    pub cards: Vec<InboxCard>,
}

/// Response containing all cards for the admin console (full records)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminValentinesResponse {
    pub valentines: Vec<Card>,
}

/// Request for editing a card's message (admin)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    pub message: String,
}

/// Response after an admin edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValentineResponse {
    pub success: bool,
    pub valentine: Card,
}

/// Response after an admin delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteValentineResponse {
    pub success: bool,
    pub deleted_id: String,
}

/// Admin dashboard statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: usize,
    pub sent_valentines: usize,
    pub active_today: usize,
    pub new_subscriptions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_card_id() {
        let id = Card::generate_id(1770714900000);
        assert_eq!(id, "valentine::1770714900000");
    }

    #[test]
    fn test_parse_card_id() {
        let timestamp = Card::parse_id("valentine::1770714900000").unwrap();
        assert_eq!(timestamp, 1770714900000);

        // Invalid format
        assert!(Card::parse_id("invalid::format::extra").is_err());
        assert!(Card::parse_id("valentine").is_err());
        assert!(Card::parse_id("greeting::123").is_err());

        // Invalid timestamp
        assert!(Card::parse_id("valentine::not_a_number").is_err());
    }

    #[test]
    fn test_extract_timestamp() {
        let card = sample_card();
        assert_eq!(card.extract_timestamp().unwrap(), 1770714900000);
    }

    #[test]
    fn test_time_remaining_decomposition() {
        let tr = TimeRemaining::from_seconds(2 * 86_400 + 5 * 3_600 + 3 * 60 + 10);
        assert_eq!(tr.days, 2);
        assert_eq!(tr.hours, 5);
        assert_eq!(tr.minutes, 3);
        assert_eq!(tr.seconds, 10);
        assert_eq!(tr.to_string(), "2d 5h 3m 10s");
    }

    #[test]
    fn test_time_remaining_clamps_negative() {
        let tr = TimeRemaining::from_seconds(-42);
        assert!(tr.is_zero());
        assert_eq!(tr.to_string(), "0h 0m 0s");
    }

    #[test]
    fn test_time_remaining_round_trip() {
        let total = 11 * 3_600 + 59 * 60 + 59;
        assert_eq!(TimeRemaining::from_seconds(total).total_seconds(), total);
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let json = serde_json::to_value(sample_card()).unwrap();
        assert_eq!(json["recipientId"], "u2");
        assert_eq!(json["isAnonymous"], true);
        assert_eq!(json["cardColor"], "#800f2f");
        assert_eq!(json["unlocksAt"], "2026-02-14T00:00:00Z");
    }

    #[test]
    fn test_card_deserializes_without_unlock_time() {
        // Producers may omit unlocksAt entirely; the record must still parse
        // so the read path can reject it explicitly.
        let json = r##"{
            "id": "valentine::1770714900000",
            "senderId": "u1",
            "senderName": "Anya",
            "recipientId": "u2",
            "recipientName": "Dima",
            "message": "hi",
            "isAnonymous": true,
            "cardColor": "#800f2f",
            "createdAt": "2026-02-10T09:15:00Z"
        }"##;
        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.unlocks_at.is_none());
    }

    #[test]
    fn test_send_request_optional_fields_default() {
        let json = r#"{"recipientId": "u2", "message": "hello"}"#;
        let request: SendCardRequest = serde_json::from_str(json).unwrap();
        assert!(request.is_anonymous.is_none());
        assert!(request.card_color.is_none());
        assert!(request.sender_name.is_none());
    }

    fn sample_card() -> Card {
        Card {
            id: "valentine::1770714900000".to_string(),
            sender_id: "u1".to_string(),
            sender_name: "Anya".to_string(),
            recipient_id: "u2".to_string(),
            recipient_name: "Dima".to_string(),
            message: "You make every day special!".to_string(),
            is_anonymous: true,
            card_color: "#800f2f".to_string(),
            unlocks_at: Some("2026-02-14T00:00:00Z".to_string()),
            created_at: "2026-02-10T09:15:00Z".to_string(),
        }
    }
}
