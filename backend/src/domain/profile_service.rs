use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use shared::{UserProfile, UserResponse};

use crate::domain::lifecycle;
use crate::error::AppError;
use crate::storage::CardStorage;

/// Display name used when nothing in the store names the user
pub const DEFAULT_DISPLAY_NAME: &str = "Valentine User";

/// Assembles a user's public profile from their received cards
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn CardStorage>,
    bot_username: String,
}

impl ProfileService {
    pub fn new(store: Arc<dyn CardStorage>, bot_username: &str) -> Self {
        Self {
            store,
            bot_username: bot_username.to_string(),
        }
    }

    /// Profile plus recipient-facing inbox for one user
    pub fn profile(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserResponse, AppError> {
        let cards = self.store.list_for_recipient(user_id)?;
        debug!(user_id, count = cards.len(), "assembling profile");

        // The most recent card addressed to the user names them best
        let name = cards
            .iter()
            .rev()
            .map(|c| c.recipient_name.trim())
            .find(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string();

        let hearts_count = cards.len();
        let inbox = lifecycle::inbox_views(&cards, now)?;

        Ok(UserResponse {
            user: UserProfile {
                id: user_id.to_string(),
                name,
                referral_link: format!("t.me/{}/app?ref={}", self.bot_username, user_id),
                hearts_count,
            },
            cards: inbox,
        })
    }
}
