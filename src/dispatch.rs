//! Broadcast dispatcher
//!
//! Walks the roster in order and sends the message to every user with a
//! linked chat id. A failed send is logged and recorded; it never stops the
//! loop or reaches the caller.

use tracing::{error, info};

use crate::directory::User;
use crate::identifier::extract_identifier;
use crate::telegram::MessageSender;

/// What happened to a single roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No chat id could be derived from the username.
    Skipped,
    Sent { chat_id: i64 },
    /// Dry run: would have been sent.
    DryRun { chat_id: i64 },
    Failed { chat_id: i64, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// 1-based position in the roster.
    pub position: usize,
    pub username: String,
    pub delivery: Delivery,
}

/// Outcomes of one run, one per roster entry in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub total: usize,
    pub outcomes: Vec<DeliveryOutcome>,
}

impl BroadcastReport {
    fn count(&self, pred: impl Fn(&Delivery) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.delivery)).count()
    }

    pub fn sent(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Sent { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|d| matches!(d, Delivery::Failed { .. }))
    }

    pub fn dry_run(&self) -> usize {
        self.count(|d| matches!(d, Delivery::DryRun { .. }))
    }

    /// Number of send requests actually issued.
    pub fn attempted(&self) -> usize {
        self.sent() + self.failed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.delivery, Delivery::Failed { .. }))
    }
}

pub struct BroadcastDispatcher<'a, S> {
    sender: &'a S,
    dry_run: bool,
}

impl<'a, S: MessageSender> BroadcastDispatcher<'a, S> {
    pub fn new(sender: &'a S) -> Self {
        Self {
            sender,
            dry_run: false,
        }
    }

    /// Log and record what would be sent without calling the sender.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Send `message` to every user with a chat id. Sequential, one request
    /// in flight at a time.
    pub async fn dispatch(&self, roster: &[User], message: &str) -> BroadcastReport {
        let total = roster.len();
        let mut outcomes = Vec::with_capacity(total);

        for (idx, user) in roster.iter().enumerate() {
            let position = idx + 1;
            let username = user.username.as_str();

            // Each arm logs exactly one line for this user.
            let delivery = match extract_identifier(username) {
                None => {
                    info!(position, total, username, "Skipped user without tgid");
                    Delivery::Skipped
                }
                Some(chat_id) if self.dry_run => {
                    info!(position, total, username, chat_id, "Would send message (dry run)");
                    Delivery::DryRun { chat_id }
                }
                Some(chat_id) => match self.sender.send_message(chat_id, message).await {
                    Ok(()) => {
                        info!(position, total, username, chat_id, "✓ Sent message");
                        Delivery::Sent { chat_id }
                    }
                    Err(e) => {
                        error!(position, total, username, chat_id, error = %e, "❌ Failed to send message");
                        Delivery::Failed {
                            chat_id,
                            error: e.to_string(),
                        }
                    }
                },
            };

            outcomes.push(DeliveryOutcome {
                position,
                username: user.username.clone(),
                delivery,
            });
        }

        let report = BroadcastReport { total, outcomes };
        info!(
            total,
            sent = report.sent(),
            skipped = report.skipped(),
            failed = report.failed(),
            dry_run = report.dry_run(),
            "Broadcast finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result};
    use std::sync::Mutex;

    /// Records every chat id it is asked to send to; fails for the listed ids.
    #[derive(Default)]
    struct RecordingSender {
        calls: Mutex<Vec<(i64, String)>>,
        fail_for: Vec<i64>,
    }

    impl RecordingSender {
        fn failing_for(ids: &[i64]) -> Self {
            Self {
                fail_for: ids.to_vec(),
                ..Default::default()
            }
        }

        fn chat_ids(&self) -> Vec<i64> {
            self.calls.lock().unwrap().iter().map(|(id, _)| *id).collect()
        }
    }

    impl MessageSender for RecordingSender {
        async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
            self.calls.lock().unwrap().push((chat_id, text.to_string()));
            if self.fail_for.contains(&chat_id) {
                return Err(Error::TelegramError("HTTP 403: bot was blocked".to_string()));
            }
            Ok(())
        }
    }

    fn roster(names: &[&str]) -> Vec<User> {
        names.iter().map(|n| User::new(*n)).collect()
    }

    #[tokio::test]
    async fn sends_only_to_users_with_identifiers() {
        let sender = RecordingSender::default();
        let users = roster(&["a-tgid-1", "plain", "b-tgid-2", "c-tgid-x"]);

        let report = BroadcastDispatcher::new(&sender).dispatch(&users, "hi").await;

        assert_eq!(sender.chat_ids(), vec![1, 2]);
        assert_eq!(report.total, 4);
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.sent(), 2);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.attempted(), 2);
        assert_eq!(
            report.outcomes[1],
            DeliveryOutcome {
                position: 2,
                username: "plain".to_string(),
                delivery: Delivery::Skipped,
            }
        );
    }

    #[tokio::test]
    async fn same_message_is_sent_to_everyone() {
        let sender = RecordingSender::default();
        let users = roster(&["tgid-10", "tgid-20"]);

        BroadcastDispatcher::new(&sender)
            .dispatch(&users, "<b>news</b>")
            .await;

        let calls = sender.calls.lock().unwrap();
        assert!(calls.iter().all(|(_, text)| text == "<b>news</b>"));
    }

    #[tokio::test]
    async fn failure_does_not_stop_remaining_recipients() {
        let sender = RecordingSender::failing_for(&[2]);
        let users = roster(&["tgid-1", "tgid-2", "tgid-3", "tgid-4"]);

        let report = BroadcastDispatcher::new(&sender).dispatch(&users, "hi").await;

        assert_eq!(sender.chat_ids(), vec![1, 2, 3, 4]);
        assert_eq!(report.sent(), 3);
        assert_eq!(report.failed(), 1);

        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].position, 2);
        match &failed[0].delivery {
            Delivery::Failed { chat_id, error } => {
                assert_eq!(*chat_id, 2);
                assert!(error.contains("blocked"));
            }
            other => panic!("unexpected delivery: {:?}", other),
        }
    }

    #[tokio::test]
    async fn every_recipient_failing_still_visits_whole_roster() {
        let sender = RecordingSender::failing_for(&[1, 2, 3]);
        let users = roster(&["tgid-1", "tgid-2", "tgid-3"]);

        let report = BroadcastDispatcher::new(&sender).dispatch(&users, "hi").await;

        assert_eq!(report.failed(), 3);
        assert_eq!(report.sent(), 0);
        assert_eq!(report.outcomes.iter().map(|o| o.position).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn dry_run_never_calls_sender() {
        let sender = RecordingSender::default();
        let users = roster(&["tgid-1", "nobody"]);

        let report = BroadcastDispatcher::new(&sender)
            .dry_run(true)
            .dispatch(&users, "hi")
            .await;

        assert!(sender.chat_ids().is_empty());
        assert_eq!(report.dry_run(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.attempted(), 0);
    }

    #[tokio::test]
    async fn empty_roster_yields_empty_report() {
        let sender = RecordingSender::default();
        let report = BroadcastDispatcher::new(&sender).dispatch(&[], "hi").await;

        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn repeated_dispatch_resends() {
        let sender = RecordingSender::default();
        let users = roster(&["tgid-5"]);
        let dispatcher = BroadcastDispatcher::new(&sender);

        dispatcher.dispatch(&users, "hi").await;
        dispatcher.dispatch(&users, "hi").await;

        assert_eq!(sender.chat_ids(), vec![5, 5]);
    }
}
