//! Dispatcher behaviour with recording transports

use async_trait::async_trait;
use chrono::Utc;
use helpdesk_directory::config::NotificationConfig;
use helpdesk_directory::models::{ChatMessage, MessageEvent, Recipient, Tenant};
use helpdesk_directory::notifications::*;
use helpdesk_directory::realtime::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Mail transport that reports every attempt
struct RecordingMailer {
    tx: mpsc::UnboundedSender<OutgoingMail>,
    fail: bool,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationTaskError> {
        let _ = self.tx.send(mail.clone());
        if self.fail {
            Err(NotificationTaskError::Mail("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Mail transport that never finishes
struct HangingMailer;

#[async_trait]
impl MailTransport for HangingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), NotificationTaskError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Publisher that reports every publish
struct RecordingPublisher {
    tx: mpsc::UnboundedSender<(String, RealtimeEvent)>,
}

#[async_trait]
impl RealtimePublisher for RecordingPublisher {
    async fn publish(
        &self,
        topic: &str,
        event: RealtimeEvent,
    ) -> Result<usize, NotificationTaskError> {
        let _ = self.tx.send((topic.to_string(), event));
        Ok(1)
    }
}

struct Harness {
    dispatcher: NotificationDispatcher,
    presence: Arc<InMemoryPresence>,
    mails: mpsc::UnboundedReceiver<OutgoingMail>,
    broadcasts: mpsc::UnboundedReceiver<(String, RealtimeEvent)>,
}

fn harness_with(
    mailer: impl FnOnce(mpsc::UnboundedSender<OutgoingMail>) -> Arc<dyn MailTransport>,
) -> Harness {
    let (mail_tx, mails) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcasts) = mpsc::unbounded_channel();
    let presence = Arc::new(InMemoryPresence::new());

    let dispatcher = NotificationDispatcher::new(
        &NotificationConfig::default(),
        mailer(mail_tx),
        Arc::new(RecordingPublisher { tx: broadcast_tx }),
        presence.clone(),
    );

    Harness {
        dispatcher,
        presence,
        mails,
        broadcasts,
    }
}

fn harness(fail_mail: bool) -> Harness {
    harness_with(|tx| Arc::new(RecordingMailer { tx, fail: fail_mail }))
}

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
            email_token: Some("confirmed".to_string()),
        },
        tenant: Tenant {
            id: 42,
            email_domain: "acme.test".to_string(),
            email_domain_verified: true,
        },
    }
}

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

/// Poll dispatcher stats until `done` holds or WAIT elapses
async fn wait_for_stats(
    dispatcher: &NotificationDispatcher,
    done: impl Fn(&DispatchStatsSnapshot) -> bool,
) -> DispatchStatsSnapshot {
    let polled = timeout(WAIT, async {
        loop {
            let stats = dispatcher.stats();
            if done(&stats) {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    polled.unwrap_or_else(|_| dispatcher.stats())
}

#[tokio::test]
async fn test_not_eligible_runs_nothing() {
    let mut h = harness(false);

    let mut available = event();
    available.unavailable_agent = false;
    assert_eq!(h.dispatcher.dispatch(&available), DispatchDecision::Skipped);

    h.presence.connect(5);
    assert_eq!(h.dispatcher.dispatch(&event()), DispatchDecision::Skipped);

    assert!(timeout(QUIET, h.mails.recv()).await.is_err());
    assert!(timeout(QUIET, h.broadcasts.recv()).await.is_err());
}

#[tokio::test]
async fn test_email_preconditions_false_broadcasts_only() {
    let mut h = harness(false);

    let mut unverified = event();
    unverified.tenant.email_domain_verified = false;
    assert_eq!(h.dispatcher.dispatch(&unverified), DispatchDecision::Scheduled);

    let (topic, broadcast) = timeout(WAIT, h.broadcasts.recv()).await.unwrap().unwrap();
    assert_eq!(topic, "conversation_5");
    assert_eq!(broadcast, RealtimeEvent::message_created(unverified.message.clone()));

    let mut no_token = event();
    no_token.recipient.email_token = None;
    assert_eq!(h.dispatcher.dispatch(&no_token), DispatchDecision::Scheduled);
    timeout(WAIT, h.broadcasts.recv()).await.unwrap().unwrap();

    assert!(timeout(QUIET, h.mails.recv()).await.is_err());
}

#[tokio::test]
async fn test_all_conditions_run_both_tasks() {
    let mut h = harness(false);

    assert_eq!(h.dispatcher.dispatch(&event()), DispatchDecision::Scheduled);

    let mail = timeout(WAIT, h.mails.recv()).await.unwrap().unwrap();
    assert_eq!(mail.from, "support@acme.test");
    assert_eq!(mail.to, "client@example.com");
    assert_eq!(mail.subject, "Printer on fire");
    assert_eq!(mail.body, "It is still on fire.");

    let (topic, _) = timeout(WAIT, h.broadcasts.recv()).await.unwrap().unwrap();
    assert_eq!(topic, "conversation_5");
}

#[tokio::test]
async fn test_email_failure_does_not_affect_broadcast() {
    let mut h = harness(true);

    assert_eq!(h.dispatcher.dispatch(&event()), DispatchDecision::Scheduled);

    timeout(WAIT, h.mails.recv()).await.unwrap().unwrap();
    let (topic, _) = timeout(WAIT, h.broadcasts.recv()).await.unwrap().unwrap();
    assert_eq!(topic, "conversation_5");

    // Single attempt: no retry follows the failure
    assert!(timeout(QUIET, h.mails.recv()).await.is_err());

    let stats = wait_for_stats(&h.dispatcher, |s| s.broadcasts_completed == 1).await;
    assert_eq!(stats.scheduled, 1);
    assert_eq!(stats.emails_failed, 1);
    assert_eq!(stats.broadcasts_completed, 1);
}

#[tokio::test]
async fn test_hanging_email_does_not_block_broadcast_or_caller() {
    let mut h = harness_with(|_| Arc::new(HangingMailer));

    let decision = timeout(Duration::from_millis(50), async {
        h.dispatcher.dispatch(&event())
    })
    .await
    .unwrap();
    assert_eq!(decision, DispatchDecision::Scheduled);

    let (topic, _) = timeout(WAIT, h.broadcasts.recv()).await.unwrap().unwrap();
    assert_eq!(topic, "conversation_5");
}

#[tokio::test]
async fn test_full_queue_drops_without_blocking() {
    let config = NotificationConfig {
        queue_size: 1,
        ..Default::default()
    };
    let (broadcast_tx, _broadcasts) = mpsc::unbounded_channel();

    // Current-thread runtime: the worker cannot drain until this test yields
    let dispatcher = NotificationDispatcher::new(
        &config,
        Arc::new(LogMailer),
        Arc::new(RecordingPublisher { tx: broadcast_tx }),
        Arc::new(InMemoryPresence::new()),
    );

    assert_eq!(dispatcher.dispatch(&event()), DispatchDecision::Scheduled);
    assert_eq!(dispatcher.dispatch(&event()), DispatchDecision::Dropped);

    let stats = dispatcher.stats();
    assert_eq!(stats.scheduled, 1);
    assert_eq!(stats.dropped, 1);
}
