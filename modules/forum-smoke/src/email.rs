use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use forum_common::{EmailConfig, ForumAdminError, Result};

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TestMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl TestMessage {
    pub fn for_config(config: &EmailConfig, to: &str) -> Self {
        Self {
            from: config.from.clone(),
            to: to.to_string(),
            subject: "School Forum email configuration test".to_string(),
            body: format!(
                "This is a test message from the school forum admin tools.\n\n\
                 SMTP host: {}:{}\nImplicit TLS: {}\n\n\
                 If you received this, outgoing email is configured correctly.",
                config.host, config.port, config.secure
            ),
        }
    }

    pub fn to_message(&self) -> Result<Message> {
        let from: Mailbox = parse_mailbox("from", &self.from)?;
        let to: Mailbox = parse_mailbox("to", &self.to)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())
            .map_err(|e| ForumAdminError::Email(format!("failed to build message: {e}")))
    }
}

fn parse_mailbox(field: &str, raw: &str) -> Result<Mailbox> {
    raw.parse()
        .map_err(|e| ForumAdminError::Email(format!("invalid {field} address {raw:?}: {e}")))
}

/// Pluggable mail transport for the email configuration test.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Check that the server accepts a connection and our credentials.
    async fn verify(&self) -> Result<bool>;

    async fn send(&self, message: &TestMessage) -> Result<()>;
}

/// SMTP transport built from `EMAIL_*` settings.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| ForumAdminError::Email(format!("invalid SMTP host {}: {e}", config.host)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> Result<bool> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| ForumAdminError::Email(format!("SMTP connection failed: {e}")))
    }

    async fn send(&self, message: &TestMessage) -> Result<()> {
        let email = message.to_message()?;
        self.transport
            .send(email)
            .await
            .map_err(|e| ForumAdminError::Email(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

/// Pick the recipient: explicit flag, then `EMAIL_TEST_TO`, then the SMTP user.
pub fn resolve_recipient(
    explicit: Option<String>,
    test_to: Option<String>,
    config: &EmailConfig,
) -> String {
    explicit
        .or(test_to)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.user.clone())
}

/// Verify the transport, then send one test message.
pub async fn run_email_test(mailer: &dyn Mailer, message: &TestMessage) -> Result<()> {
    info!("Verifying SMTP connection...");
    if !mailer.verify().await? {
        return Err(ForumAdminError::Email(
            "SMTP server rejected the connection check".to_string(),
        ));
    }
    info!("SMTP connection verified");

    message.to_message()?;
    mailer.send(message).await?;
    info!(to = message.to.as_str(), "Test email sent");
    Ok(())
}
