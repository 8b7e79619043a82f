//! Broadcast stub: simulated delivery of "new card" notifications.
//!
//! Stands in for the messaging-bot integration a production deployment would
//! use. The simulated round trip takes a configurable latency and is bounded
//! by a timeout, so a delivery may fail but can never hang the caller. Card
//! creation treats delivery as fire-and-forget: a failed notification is
//! logged and dropped, never rolled back into the send result.

use std::time::Duration;

use thiserror::Error;
use tokio::time;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("recipient {0:?} is unreachable")]
    Unreachable(String),
}

/// Simulated bot-API notifier. Cheap to clone so services can hand one to
/// detached tasks.
#[derive(Debug, Clone)]
pub struct Notifier {
    bot_username: String,
    latency: Duration,
    timeout: Duration,
}

impl Notifier {
    pub fn new(bot_username: &str, latency: Duration, timeout: Duration) -> Self {
        Self {
            bot_username: bot_username.to_string(),
            latency,
            timeout,
        }
    }

    /// Deliver a notification to the recipient. Bounded by the configured
    /// timeout; completes with `DeliveryError` rather than hanging.
    pub async fn notify(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError> {
        if recipient_id.trim().is_empty() {
            return Err(DeliveryError::Unreachable(recipient_id.to_string()));
        }

        debug!(
            recipient = %recipient_id,
            bot = %self.bot_username,
            "dispatching notification"
        );

        // Simulated bot-API round trip.
        let round_trip = time::sleep(self.latency);

        time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| DeliveryError::Timeout(self.timeout))?;

        info!(recipient = %recipient_id, text = %text, "notification delivered");
        Ok(())
    }
}
