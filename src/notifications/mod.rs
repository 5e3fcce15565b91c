pub mod dispatcher;
pub mod email;
pub mod error;

pub use dispatcher::{
    BroadcastTask, DispatchDecision, DispatchStats, DispatchStatsSnapshot, EmailTask,
    NotificationDispatcher, NotificationTask,
};
pub use email::{LogMailer, MailTransport, OutgoingMail, SmtpMailer};
pub use error::NotificationTaskError;
