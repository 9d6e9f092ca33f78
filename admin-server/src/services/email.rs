//! Outgoing email
//!
//! Everything that sends mail goes through the [`Mailer`] trait so the order
//! workflow can be exercised without an SMTP server.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::core::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A message ready to hand to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    /// Optional HTML alternative
    pub html: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Shared mailer handle
pub type SharedMailer = Arc<dyn Mailer>;

/// SMTP delivery via lettre
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let builder = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?)
            .subject(email.subject.clone());

        let message = match &email.html {
            Some(html) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            )?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.text.clone())?,
        };
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build_message(&email)?;
        self.transport.send(message).await?;
        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

/// Used when SMTP is not configured: the message is only logged
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email not delivered"
        );
        Ok(())
    }
}

/// Build the mailer for the given configuration
pub fn mailer_from_config(config: Option<&EmailConfig>) -> Result<SharedMailer, SmtpError> {
    match config {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer enabled");
            Ok(Arc::new(SmtpMailer::new(config)?))
        }
        None => {
            tracing::warn!("SMTP not configured, outgoing email will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Send on a background task; failures are logged and go nowhere else
pub fn dispatch(mailer: SharedMailer, email: OutgoingEmail) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let to = email.to.clone();
        let subject = email.subject.clone();
        if let Err(e) = mailer.send(email).await {
            tracing::warn!(to = %to, subject = %subject, error = %e, "Failed to send notification email");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn smtp() -> SmtpMailer {
        SmtpMailer::new(&EmailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 587,
            smtp_username: "bakery@example.com".into(),
            smtp_password: SecretString::from("pw"),
            from_address: "bakery@example.com".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_plain_and_html_messages() {
        let mailer = smtp();
        let plain = OutgoingEmail {
            to: "ana@example.com".into(),
            subject: "Hello".into(),
            text: "Plain body".into(),
            html: None,
        };
        assert!(mailer.build_message(&plain).is_ok());

        let html = OutgoingEmail {
            html: Some("<p>Hi</p>".into()),
            ..plain
        };
        assert!(mailer.build_message(&html).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_recipient() {
        let email = OutgoingEmail {
            to: "not-an-address".into(),
            subject: "x".into(),
            text: "y".into(),
            html: None,
        };
        assert!(matches!(
            smtp().build_message(&email),
            Err(EmailError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let email = OutgoingEmail {
            to: "ana@example.com".into(),
            subject: "x".into(),
            text: "y".into(),
            html: None,
        };
        assert!(LogMailer.send(email.clone()).await.is_ok());
        dispatch(Arc::new(LogMailer), email).await.unwrap();
    }
}
