//! Fire-and-forget notification dispatch for message events
//!
//! The triggering request hands a [`NotificationTask`] to a bounded queue and
//! returns. A single worker drains the queue and launches every task as its
//! own detached unit; inside it, the email and broadcast side effects are
//! spawned separately so neither can delay or fail the other.

use crate::config::NotificationConfig;
use crate::metrics::{NOTIFICATION_DISPATCH_TOTAL, NOTIFICATION_TASKS_TOTAL};
use crate::models::MessageEvent;
use crate::notifications::email::{MailTransport, OutgoingMail};
use crate::notifications::error::NotificationTaskError;
use crate::realtime::{conversation_topic, PresenceTracker, RealtimeEvent, RealtimePublisher};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Email side effect with everything it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTask {
    pub mail: OutgoingMail,
}

/// Broadcast side effect with everything it needs
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastTask {
    pub topic: String,
    pub event: RealtimeEvent,
}

/// Independent side effects for one eligible event
///
/// Owned entirely by the worker once handed off.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationTask {
    pub id: Uuid,
    /// Absent when the email preconditions do not hold
    pub email: Option<EmailTask>,
    pub broadcast: BroadcastTask,
}

/// Outcome of handing an event to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DispatchDecision {
    /// Eligibility did not hold; nothing runs
    Skipped,
    /// Task queued for execution
    Scheduled,
    /// Queue full or closed; task discarded
    Dropped,
}

/// Lifecycle counters across all dispatched tasks
#[derive(Debug, Default)]
pub struct DispatchStats {
    scheduled: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
    emails_completed: AtomicU64,
    emails_failed: AtomicU64,
    broadcasts_completed: AtomicU64,
    broadcasts_failed: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    pub scheduled: u64,
    pub dropped: u64,
    pub skipped: u64,
    pub emails_completed: u64,
    pub emails_failed: u64,
    pub broadcasts_completed: u64,
    pub broadcasts_failed: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            emails_completed: self.emails_completed.load(Ordering::Relaxed),
            emails_failed: self.emails_failed.load(Ordering::Relaxed),
            broadcasts_completed: self.broadcasts_completed.load(Ordering::Relaxed),
            broadcasts_failed: self.broadcasts_failed.load(Ordering::Relaxed),
        }
    }

    fn record_decision(&self, decision: DispatchDecision) {
        let counter = match decision {
            DispatchDecision::Skipped => &self.skipped,
            DispatchDecision::Scheduled => &self.scheduled,
            DispatchDecision::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let label = decision.to_string();
        NOTIFICATION_DISPATCH_TOTAL
            .with_label_values(&[label.as_str()])
            .inc();
    }

    fn record_task(&self, task: TaskKind, succeeded: bool) {
        let counter = match (task, succeeded) {
            (TaskKind::Email, true) => &self.emails_completed,
            (TaskKind::Email, false) => &self.emails_failed,
            (TaskKind::Broadcast, true) => &self.broadcasts_completed,
            (TaskKind::Broadcast, false) => &self.broadcasts_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        NOTIFICATION_TASKS_TOTAL
            .with_label_values(&[task.as_str(), if succeeded { "completed" } else { "failed" }])
            .inc();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskKind {
    Email,
    Broadcast,
}

impl TaskKind {
    fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Email => "email",
            TaskKind::Broadcast => "broadcast",
        }
    }
}

/// Evaluates message events and hands eligible ones to the worker
pub struct NotificationDispatcher {
    presence: Arc<dyn PresenceTracker>,
    task_tx: mpsc::Sender<NotificationTask>,
    stats: Arc<DispatchStats>,
    support_mailbox: String,
    from_name: Option<String>,
}

impl NotificationDispatcher {
    /// Create the dispatcher and spawn its worker
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(
        config: &NotificationConfig,
        mailer: Arc<dyn MailTransport>,
        publisher: Arc<dyn RealtimePublisher>,
        presence: Arc<dyn PresenceTracker>,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(config.queue_size.max(1));
        let stats = Arc::new(DispatchStats::default());

        spawn_worker(task_rx, mailer, publisher, stats.clone());

        info!(
            queue_size = config.queue_size,
            email_enabled = config.email_enabled,
            "Notification dispatcher initialized"
        );

        Self {
            presence,
            task_tx,
            stats,
            support_mailbox: config.support_mailbox.clone(),
            from_name: config.email_from_name.clone(),
        }
    }

    /// Decide which side effects an event calls for
    ///
    /// `None` unless the agent is unavailable and nobody is connected to the
    /// conversation. The email is included only when the recipient confirmed
    /// their address and the tenant's sending domain is verified.
    pub fn evaluate(&self, event: &MessageEvent) -> Option<NotificationTask> {
        let conversation_id = event.message.conversation_id;
        if !event.unavailable_agent || self.presence.is_online(conversation_id) {
            return None;
        }

        let email = if event.recipient.has_email_token() && event.tenant.email_domain_verified {
            Some(EmailTask {
                mail: OutgoingMail {
                    subject: event.ticket_subject.clone(),
                    to: event.recipient.email.clone(),
                    from: format!("{}@{}", self.support_mailbox, event.tenant.email_domain),
                    from_name: self.from_name.clone(),
                    body: event.description_txt.clone(),
                },
            })
        } else {
            debug!(
                message_id = event.message.id,
                has_email_token = event.recipient.has_email_token(),
                domain_verified = event.tenant.email_domain_verified,
                "Email preconditions not met; broadcast only"
            );
            None
        };

        Some(NotificationTask {
            id: Uuid::new_v4(),
            email,
            broadcast: BroadcastTask {
                topic: conversation_topic(conversation_id),
                event: RealtimeEvent::message_created(event.message.clone()),
            },
        })
    }

    /// Hand an event off without waiting for any side effect
    pub fn dispatch(&self, event: &MessageEvent) -> DispatchDecision {
        let decision = match self.evaluate(event) {
            None => DispatchDecision::Skipped,
            Some(task) => {
                let task_id = task.id;
                match self.task_tx.try_send(task) {
                    Ok(()) => {
                        info!(task_id = %task_id, message_id = event.message.id, "Notification task scheduled");
                        DispatchDecision::Scheduled
                    }
                    Err(e) => {
                        warn!(task_id = %task_id, message_id = event.message.id, error = %e, "Notification task dropped");
                        DispatchDecision::Dropped
                    }
                }
            }
        };

        self.stats.record_decision(decision);
        decision
    }

    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }
}

fn spawn_worker(
    mut task_rx: mpsc::Receiver<NotificationTask>,
    mailer: Arc<dyn MailTransport>,
    publisher: Arc<dyn RealtimePublisher>,
    stats: Arc<DispatchStats>,
) {
    tokio::spawn(async move {
        info!("Notification worker started");

        while let Some(task) = task_rx.recv().await {
            let mailer = mailer.clone();
            let publisher = publisher.clone();
            let stats = stats.clone();

            tokio::spawn(run_task(task, mailer, publisher, stats));
        }

        info!("Notification worker stopped");
    });
}

async fn run_task(
    task: NotificationTask,
    mailer: Arc<dyn MailTransport>,
    publisher: Arc<dyn RealtimePublisher>,
    stats: Arc<DispatchStats>,
) {
    let task_id = task.id;
    debug!(task_id = %task_id, with_email = task.email.is_some(), "Notification task running");

    let email = task.email.map(|email| {
        tokio::spawn(async move { mailer.send(&email.mail).await })
    });

    let broadcast = task.broadcast;
    let broadcast = tokio::spawn(async move {
        publisher
            .publish(&broadcast.topic, broadcast.event)
            .await
            .map(|_| ())
    });

    if let Some(handle) = email {
        finish(task_id, TaskKind::Email, handle.await, &stats);
    }
    finish(task_id, TaskKind::Broadcast, broadcast.await, &stats);
}

fn finish(
    task_id: Uuid,
    kind: TaskKind,
    joined: Result<Result<(), NotificationTaskError>, tokio::task::JoinError>,
    stats: &DispatchStats,
) {
    let outcome = joined.unwrap_or_else(|e| Err(NotificationTaskError::Aborted(e.to_string())));

    match outcome {
        Ok(()) => {
            info!(task_id = %task_id, task = kind.as_str(), "Notification task completed");
            stats.record_task(kind, true);
        }
        Err(e) => {
            error!(task_id = %task_id, task = kind.as_str(), error = %e, "Notification task failed");
            stats.record_task(kind, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, Recipient, Tenant};
    use crate::notifications::LogMailer;
    use crate::realtime::{EventBroadcaster, InMemoryPresence};
    use chrono::Utc;

    fn event() -> MessageEvent {
        MessageEvent {
            message: ChatMessage {
                id: 11,
                conversation_id: 5,
                author_id: 2,
                body: "anyone there?".to_string(),
                created_at: Utc::now(),
            },
            ticket_subject: "Printer on fire".to_string(),
            description_txt: "It is still on fire.".to_string(),
            unavailable_agent: true,
            recipient: Recipient {
                account_id: 3,
                email: "client@example.com".to_string(),
                email_token: Some("tok".to_string()),
            },
            tenant: Tenant {
                id: 42,
                email_domain: "acme.test".to_string(),
                email_domain_verified: true,
            },
        }
    }

    fn dispatcher(presence: Arc<InMemoryPresence>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            &NotificationConfig::default(),
            Arc::new(LogMailer),
            Arc::new(EventBroadcaster::new(16)),
            presence,
        )
    }

    #[tokio::test]
    async fn test_evaluate_builds_both_tasks() {
        let dispatcher = dispatcher(Arc::new(InMemoryPresence::new()));
        let task = dispatcher.evaluate(&event()).unwrap();

        let email = task.email.unwrap();
        assert_eq!(email.mail.from, "support@acme.test");
        assert_eq!(email.mail.to, "client@example.com");
        assert_eq!(email.mail.subject, "Printer on fire");
        assert_eq!(email.mail.body, "It is still on fire.");
        assert_eq!(task.broadcast.topic, "conversation_5");
    }

    #[tokio::test]
    async fn test_not_eligible_when_agent_available_or_client_online() {
        let presence = Arc::new(InMemoryPresence::new());
        let dispatcher = dispatcher(presence.clone());

        let mut available = event();
        available.unavailable_agent = false;
        assert!(dispatcher.evaluate(&available).is_none());

        presence.connect(5);
        assert!(dispatcher.evaluate(&event()).is_none());
        assert_eq!(dispatcher.dispatch(&event()), DispatchDecision::Skipped);
        assert_eq!(dispatcher.stats().skipped, 1);
    }

    #[tokio::test]
    async fn test_email_preconditions() {
        let dispatcher = dispatcher(Arc::new(InMemoryPresence::new()));

        let mut unverified = event();
        unverified.tenant.email_domain_verified = false;
        let task = dispatcher.evaluate(&unverified).unwrap();
        assert!(task.email.is_none());

        let mut no_token = event();
        no_token.recipient.email_token = Some("  ".to_string());
        let task = dispatcher.evaluate(&no_token).unwrap();
        assert!(task.email.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_schedules() {
        let dispatcher = dispatcher(Arc::new(InMemoryPresence::new()));
        assert_eq!(dispatcher.dispatch(&event()), DispatchDecision::Scheduled);
        assert_eq!(dispatcher.stats().scheduled, 1);
    }

    #[test]
    fn test_decision_serialization() {
        assert_eq!(
            serde_json::to_value(DispatchDecision::Scheduled).unwrap(),
            "scheduled"
        );
        assert_eq!(DispatchDecision::Dropped.to_string(), "dropped");
    }
}
