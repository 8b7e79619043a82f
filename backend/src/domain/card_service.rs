use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info};

use shared::{Card, InboxCard, SendCardRequest, StatsResponse};

use crate::domain::lifecycle;
use crate::error::AppError;
use crate::notify::Notifier;
use crate::storage::CardStorage;

/// Maximum message length accepted from senders and admin edits
pub const MAX_MESSAGE_LEN: usize = 300;

/// Envelope color used when the sender does not pick one
pub const DEFAULT_CARD_COLOR: &str = "#800f2f";

const NOTIFICATION_TEXT: &str = "You've received a new Valentine card!";

/// Service for creating, reading and moderating valentine cards
#[derive(Clone)]
pub struct CardService {
    store: Arc<dyn CardStorage>,
    notifier: Notifier,
    /// Promotional unlock instant: cards created before it are pinned to it,
    /// cards created outside the window unlock immediately
    promo_unlock_at: Option<DateTime<Utc>>,
}

impl CardService {
    pub fn new(
        store: Arc<dyn CardStorage>,
        notifier: Notifier,
        promo_unlock_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            store,
            notifier,
            promo_unlock_at,
        }
    }

    /// Create and store a new card, then notify the recipient
    pub async fn send(&self, request: SendCardRequest) -> Result<Card, AppError> {
        self.send_at(request, Utc::now()).await
    }

    /// As `send`, with an explicit creation instant
    pub async fn send_at(
        &self,
        request: SendCardRequest,
        now: DateTime<Utc>,
    ) -> Result<Card, AppError> {
        let recipient_id = request.recipient_id.trim().to_string();
        if recipient_id.is_empty() {
            return Err(AppError::Validation(
                "recipientId and message are required".to_string(),
            ));
        }

        let message = validate_message(&request.message)?;
        let is_anonymous = request.is_anonymous.unwrap_or(true);

        let sender_name = request.sender_name.unwrap_or_default().trim().to_string();
        if !is_anonymous && sender_name.is_empty() {
            return Err(AppError::Validation(
                "senderName is required for signed cards".to_string(),
            ));
        }

        let card = Card {
            id: self.next_card_id(now)?,
            sender_id: request.sender_id.unwrap_or_default().trim().to_string(),
            sender_name,
            recipient_id,
            recipient_name: request.recipient_name.unwrap_or_default().trim().to_string(),
            message,
            is_anonymous,
            card_color: request
                .card_color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CARD_COLOR.to_string()),
            unlocks_at: Some(rfc3339(self.unlock_instant(now))),
            created_at: rfc3339(now),
        };

        self.store.store_card(&card)?;
        info!(card_id = %card.id, recipient = %card.recipient_id, "valentine stored");

        // Fire-and-forget: a failed delivery must never block or roll back
        // the send.
        let notifier = self.notifier.clone();
        let recipient = card.recipient_id.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&recipient, NOTIFICATION_TEXT).await {
                error!(recipient = %recipient, error = %e, "new-card notification dropped");
            }
        });

        Ok(card)
    }

    /// Recipient-facing inbox: derived views, never raw records
    pub fn inbox(&self, recipient_id: &str, now: DateTime<Utc>) -> Result<Vec<InboxCard>, AppError> {
        let cards = self.store.list_for_recipient(recipient_id)?;
        lifecycle::inbox_views(&cards, now)
    }

    /// All stored cards, full records, for the admin console
    pub fn admin_list(&self) -> Result<Vec<Card>, AppError> {
        Ok(self.store.list_all()?)
    }

    /// Replace a card's message (admin moderation)
    pub fn admin_update_message(&self, card_id: &str, message: &str) -> Result<Card, AppError> {
        let message = validate_message(message)?;

        if !self.store.update_message(card_id, &message)? {
            return Err(AppError::NotFound(card_id.to_string()));
        }

        info!(card_id, "valentine message updated");
        self.store
            .get_card(card_id)?
            .ok_or_else(|| AppError::NotFound(card_id.to_string()))
    }

    /// Delete a card permanently (admin moderation, terminal)
    pub fn admin_delete(&self, card_id: &str) -> Result<(), AppError> {
        if !self.store.delete_card(card_id)? {
            return Err(AppError::NotFound(card_id.to_string()));
        }

        info!(card_id, "valentine deleted");
        Ok(())
    }

    /// Dashboard statistics computed from the store
    pub fn stats(&self, now: DateTime<Utc>) -> Result<StatsResponse, AppError> {
        let cards = self.store.list_all()?;
        let today = now.date_naive();

        let mut users: HashSet<&str> = HashSet::new();
        let mut active_today: HashSet<&str> = HashSet::new();

        for card in &cards {
            if !card.sender_id.is_empty() {
                users.insert(card.sender_id.as_str());
            }
            users.insert(card.recipient_id.as_str());

            let created_today = DateTime::parse_from_rfc3339(&card.created_at)
                .map(|dt| dt.with_timezone(&Utc).date_naive() == today)
                .unwrap_or(false);
            if created_today && !card.sender_id.is_empty() {
                active_today.insert(card.sender_id.as_str());
            }
        }

        Ok(StatsResponse {
            total_users: users.len(),
            sent_valentines: cards.len(),
            active_today: active_today.len(),
            // No subscription model in this system
            new_subscriptions: 0,
        })
    }

    /// Unlock policy: pin to the promotional date while it is still ahead,
    /// otherwise unlock at creation
    fn unlock_instant(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        match self.promo_unlock_at {
            Some(promo) if promo > created_at => promo,
            _ => created_at,
        }
    }

    /// Next card id unique within the store, bumping the millisecond when two
    /// sends land in the same one
    fn next_card_id(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let mut millis = now.timestamp_millis().max(0) as u64;
        loop {
            let id = Card::generate_id(millis);
            if self.store.get_card(&id)?.is_none() {
                return Ok(id);
            }
            millis += 1;
        }
    }
}

fn validate_message(message: &str) -> Result<String, AppError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(format!(
            "message cannot exceed {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
