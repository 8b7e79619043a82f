//! Session-scoped state: the reveal set and active countdown tickers.
//!
//! Both are transient. A `Session` starts empty on every process start, is
//! never persisted, and is passed by reference to whatever renders it; there
//! are no module-level singletons. Dropping the session (or an individual
//! `Countdown`) cancels the underlying timer task, so no ticker outlives the
//! scope that created it.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use shared::{Card, CardView, TimeRemaining};

use crate::domain::lifecycle;
use crate::error::AppError;

/// How often a locked card's remaining time is recomputed
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Per-session UI state for one recipient's inbox
#[derive(Default)]
pub struct Session {
    revealed: HashSet<String>,
    countdowns: HashMap<String, Countdown>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the reveal state of an unlocked card. Returns whether the
    /// reveal set changed.
    ///
    /// Revealing a locked card is a caller error: the set is left untouched
    /// and the attempt is logged.
    pub fn toggle_reveal(&mut self, card_id: &str, view: &CardView) -> bool {
        if view.locked {
            warn!(card_id, "reveal requested for a locked card; ignoring");
            return false;
        }

        if !self.revealed.remove(card_id) {
            self.revealed.insert(card_id.to_string());
        }
        true
    }

    pub fn is_revealed(&self, card_id: &str) -> bool {
        self.revealed.contains(card_id)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Start a countdown ticker for a card and keep ownership of it so that
    /// session teardown cancels it. Replaces any previous ticker for the
    /// same card.
    pub fn start_countdown(
        &mut self,
        card: &Card,
    ) -> Result<watch::Receiver<Option<TimeRemaining>>, AppError> {
        let countdown = Countdown::spawn(card.clone(), TICK_PERIOD)?;
        let rx = countdown.subscribe();
        self.countdowns.insert(card.id.clone(), countdown);
        Ok(rx)
    }

    /// Cancel the ticker for one card, if any
    pub fn stop_countdown(&mut self, card_id: &str) {
        self.countdowns.remove(card_id);
    }

    /// Wipe all transient state, as a page reload would
    pub fn clear(&mut self) {
        self.revealed.clear();
        self.countdowns.clear();
    }
}

/// A cancellable countdown for one locked card.
///
/// Publishes the remaining lock time on a watch channel every tick and
/// finishes with `None` once the card unlocks. The timer task is aborted on
/// drop, so whoever owns the handle bounds its lifetime.
pub struct Countdown {
    rx: watch::Receiver<Option<TimeRemaining>>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Spawn the ticker. A malformed card fails here, before any task runs.
    pub fn spawn(card: Card, period: Duration) -> Result<Self, AppError> {
        let initial = lifecycle::derive_view(&card, Utc::now())?;
        let (tx, rx) = watch::channel(initial.time_remaining);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;

                let view = match lifecycle::derive_view(&card, Utc::now()) {
                    Ok(view) => view,
                    Err(e) => {
                        warn!(card_id = %card.id, error = %e, "countdown stopped");
                        break;
                    }
                };

                // Receiver gone means the subscriber tore down first
                if tx.send(view.time_remaining).is_err() {
                    break;
                }

                if !view.locked {
                    break;
                }
            }
        });

        Ok(Self { rx, task })
    }

    /// Subscribe to remaining-time updates; `None` marks the card unlocked
    pub fn subscribe(&self) -> watch::Receiver<Option<TimeRemaining>> {
        self.rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};

    fn card_unlocking_at(unlocks_at: DateTime<Utc>) -> Card {
        Card {
            id: Card::generate_id(1770714900000),
            sender_id: "u1".to_string(),
            sender_name: "Anya".to_string(),
            recipient_id: "u2".to_string(),
            recipient_name: "Dima".to_string(),
            message: "soon".to_string(),
            is_anonymous: true,
            card_color: "#800f2f".to_string(),
            unlocks_at: Some(unlocks_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            created_at: "2026-02-10T09:15:00Z".to_string(),
        }
    }

    fn locked_view() -> CardView {
        CardView {
            locked: true,
            visible_message: None,
            display_sender: "Secret Admirer".to_string(),
            time_remaining: Some(TimeRemaining::from_seconds(3600)),
        }
    }

    fn unlocked_view() -> CardView {
        CardView {
            locked: false,
            visible_message: Some("soon".to_string()),
            display_sender: "Anya".to_string(),
            time_remaining: None,
        }
    }

    #[test]
    fn test_toggle_reveal_flips_state() {
        let mut session = Session::new();
        let view = unlocked_view();

        assert!(session.toggle_reveal("valentine::1", &view));
        assert!(session.is_revealed("valentine::1"));

        assert!(session.toggle_reveal("valentine::1", &view));
        assert!(!session.is_revealed("valentine::1"));
    }

    #[test]
    fn test_toggle_reveal_on_locked_card_is_noop() {
        let mut session = Session::new();

        assert!(!session.toggle_reveal("valentine::1", &locked_view()));
        assert!(!session.is_revealed("valentine::1"));
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn test_clear_resets_reveal_state() {
        let mut session = Session::new();
        session.toggle_reveal("valentine::1", &unlocked_view());
        session.toggle_reveal("valentine::2", &unlocked_view());
        assert_eq!(session.revealed_count(), 2);

        session.clear();
        assert_eq!(session.revealed_count(), 0);
    }

    #[tokio::test]
    async fn test_countdown_completes_at_unlock() {
        // Unlocks almost immediately; fast ticks so the test stays quick
        let card = card_unlocking_at(Utc::now() + ChronoDuration::milliseconds(50));
        let countdown = Countdown::spawn(card, Duration::from_millis(10)).unwrap();
        let mut rx = countdown.subscribe();

        let completed = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            loop {
                if rx.borrow_and_update().is_none() {
                    break;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        assert!(completed.is_ok(), "countdown never reported unlock");

        // The ticker task winds down on its own after the final update
        tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while !countdown.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("countdown task kept running after unlock");
    }

    #[tokio::test]
    async fn test_countdown_publishes_remaining_time() {
        let card = card_unlocking_at(Utc::now() + ChronoDuration::hours(12));
        let countdown = Countdown::spawn(card, Duration::from_millis(10)).unwrap();
        let mut rx = countdown.subscribe();

        rx.changed().await.unwrap();
        let remaining = rx.borrow().expect("still locked");
        assert_eq!(remaining.days, 0);
        assert!(remaining.hours == 11 || remaining.hours == 12);
    }

    #[tokio::test]
    async fn test_dropping_countdown_cancels_task() {
        let card = card_unlocking_at(Utc::now() + ChronoDuration::hours(12));
        let countdown = Countdown::spawn(card, Duration::from_millis(10)).unwrap();
        let mut rx = countdown.subscribe();

        drop(countdown);

        // The sender disappears with the aborted task
        let closed = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok(), "watch channel never closed after drop");
    }

    #[tokio::test]
    async fn test_session_start_countdown_rejects_bad_card() {
        let mut session = Session::new();
        let mut card = card_unlocking_at(Utc::now());
        card.unlocks_at = None;

        assert!(session.start_countdown(&card).is_err());
    }

    #[tokio::test]
    async fn test_session_owns_and_stops_countdowns() {
        let mut session = Session::new();
        let card = card_unlocking_at(Utc::now() + ChronoDuration::hours(1));

        let mut rx = session.start_countdown(&card).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        session.stop_countdown(&card.id);
        let closed = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok(), "ticker survived stop_countdown");
    }
}
