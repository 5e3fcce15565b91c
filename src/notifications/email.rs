use crate::config::NotificationConfig;
use crate::error::{AppError, Result};
use crate::notifications::error::NotificationTaskError;
use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

/// A composed outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub to: String,
    pub from: String,
    /// Display name shown with `from`
    pub from_name: Option<String>,
    pub body: String,
}

/// Outbound mail delivery
///
/// Each call is a single attempt; timeouts are the transport's own concern.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), NotificationTaskError>;
}

/// SMTP mail transport
#[derive(Clone)]
pub struct SmtpMailer {
    pub(crate) smtp_server: String,
    pub(crate) smtp_port: u16,
    pub(crate) smtp_username: Option<String>,
    pub(crate) smtp_password: Option<String>,
    pub(crate) use_tls: bool,
}

impl SmtpMailer {
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: Option<String>,
        smtp_password: Option<String>,
        use_tls: bool,
    ) -> Result<Self> {
        if smtp_server.is_empty() {
            return Err(AppError::Configuration(
                "SMTP server cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            smtp_server,
            smtp_port,
            smtp_username,
            smtp_password,
            use_tls,
        })
    }

    /// Build from configuration; `None` when email is disabled or not configured
    pub fn from_config(config: &NotificationConfig) -> Result<Option<Self>> {
        if !config.email_enabled {
            return Ok(None);
        }

        let Some(server) = config.smtp_server.as_ref() else {
            warn!("Email notifications enabled but SMTP server not configured");
            return Ok(None);
        };

        let username = config
            .smtp_username_env
            .as_ref()
            .and_then(|env_var| std::env::var(env_var).ok());

        let password = config
            .smtp_password_env
            .as_ref()
            .and_then(|env_var| std::env::var(env_var).ok());

        Self::new(
            server.clone(),
            config.smtp_port,
            username,
            password,
            config.smtp_use_tls,
        )
        .map(Some)
    }

    /// Build the plain-text message
    pub fn build_message(mail: &OutgoingMail) -> std::result::Result<Message, NotificationTaskError> {
        let from = parse_mailbox(&mail.from, mail.from_name.as_deref())?;
        let to = parse_mailbox(&mail.to, None)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| NotificationTaskError::Mail(format!("Failed to build email: {}", e)))
    }
}

fn parse_mailbox(
    address: &str,
    name: Option<&str>,
) -> std::result::Result<Mailbox, NotificationTaskError> {
    let email = address
        .parse()
        .map_err(|e: lettre::address::AddressError| NotificationTaskError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

    Ok(Mailbox::new(name.map(str::to_string), email))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), NotificationTaskError> {
        let message = Self::build_message(mail)?;

        let result = tokio::task::spawn_blocking({
            let smtp_server = self.smtp_server.clone();
            let smtp_port = self.smtp_port;
            let username = self.smtp_username.clone();
            let password = self.smtp_password.clone();
            let use_tls = self.use_tls;

            move || {
                let mut transport_builder = if use_tls {
                    SmtpTransport::starttls_relay(&smtp_server).map_err(|e| {
                        NotificationTaskError::Mail(format!("Invalid SMTP server: {}", e))
                    })?
                } else {
                    SmtpTransport::builder_dangerous(&smtp_server)
                };
                transport_builder = transport_builder.port(smtp_port);

                if let (Some(user), Some(pass)) = (username, password) {
                    transport_builder = transport_builder.credentials(Credentials::new(user, pass));
                }

                transport_builder
                    .build()
                    .send(&message)
                    .map_err(|e| NotificationTaskError::Mail(format!("Failed to send email: {}", e)))?;

                Ok::<(), NotificationTaskError>(())
            }
        })
        .await
        .map_err(|e| NotificationTaskError::Aborted(format!("Task join error: {}", e)))?;

        result?;

        info!(
            to = %mail.to,
            from = %mail.from,
            subject = %mail.subject,
            "Email notification sent"
        );
        Ok(())
    }
}

/// Mail transport used when SMTP is disabled; logs instead of sending
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), NotificationTaskError> {
        info!(
            to = %mail.to,
            from = %mail.from,
            subject = %mail.subject,
            "Email delivery disabled; message logged only"
        );
        Ok(())
    }
}
