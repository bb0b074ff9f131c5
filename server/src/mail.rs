//! Invite email delivery.
//!
//! Two [`InviteNotifier`] implementations:
//!
//! - [`ConsoleMailer`]: logs the email, for development
//! - [`SmtpMailer`]: sends it through an SMTP relay with `lettre`

use crate::config::{MailConfig, MailProvider};
use async_trait::async_trait;
use eventqa_core::DomainError;
use eventqa_core::environment::InviteNotifier;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

/// Port that speaks TLS from the first byte. Other ports upgrade with STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Subject line of an invite email.
#[must_use]
pub fn invite_subject(event_title: &str) -> String {
    format!("You're invited to {event_title}")
}

/// HTML body of an invite email.
///
/// The event title is chosen by the host, so every interpolated value is
/// escaped for its HTML context.
#[must_use]
pub fn invite_body(event_title: &str, accept_link: &str, register_link: &str) -> String {
    let event_title = html_escape::encode_text(event_title);
    let accept_link = html_escape::encode_double_quoted_attribute(accept_link);
    let register_link = html_escape::encode_double_quoted_attribute(register_link);
    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2>You're invited to {event_title}</h2>
    <p>You have been invited to take part in <strong>{event_title}</strong>.</p>
    <p>
        <a href="{accept_link}" style="display: inline-block; padding: 10px 20px; background-color: #007bff; color: white; text-decoration: none; border-radius: 4px;">
            Open the event
        </a>
    </p>
    <p>Don't have an account yet? <a href="{register_link}">Sign up here</a> to keep track of your questions.</p>
</body>
</html>"#
    )
}

/// Build the notifier selected by `config`.
///
/// # Errors
///
/// Returns an error if the SMTP transport cannot be configured.
pub fn notifier_from_config(config: &MailConfig) -> anyhow::Result<Arc<dyn InviteNotifier>> {
    match config.provider {
        MailProvider::Console => Ok(Arc::new(ConsoleMailer)),
        MailProvider::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
    }
}

/// Mailer that writes invite emails to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl InviteNotifier for ConsoleMailer {
    async fn send_invite_email(
        &self,
        email: &str,
        event_title: &str,
        accept_link: &str,
        register_link: &str,
    ) -> eventqa_core::Result<()> {
        tracing::info!(
            to = %email,
            subject = %invite_subject(event_title),
            accept_link = %accept_link,
            register_link = %register_link,
            "Invite email (console mailer)"
        );
        Ok(())
    }
}

/// Mailer that sends invite emails through an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a mailer for the relay described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender address is invalid or the relay
    /// cannot be configured.
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email).parse()?;

        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
        };
        let mut builder = builder.port(config.smtp_port);
        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self { transport: builder.build(), from })
    }

    fn message(
        &self,
        email: &str,
        event_title: &str,
        accept_link: &str,
        register_link: &str,
    ) -> eventqa_core::Result<Message> {
        let to: Mailbox = email
            .parse()
            .map_err(|e| DomainError::notification(format!("Invalid recipient {email}: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(invite_subject(event_title))
            .header(ContentType::TEXT_HTML)
            .body(invite_body(event_title, accept_link, register_link))
            .map_err(|e| DomainError::notification(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl InviteNotifier for SmtpMailer {
    async fn send_invite_email(
        &self,
        email: &str,
        event_title: &str,
        accept_link: &str,
        register_link: &str,
    ) -> eventqa_core::Result<()> {
        let message = self.message(email, event_title, accept_link, register_link)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DomainError::notification(format!("Failed to send email: {e}")))?;

        tracing::info!(to = %email, "Invite email sent via SMTP");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn smtp_config() -> MailConfig {
        MailConfig {
            provider: MailProvider::Smtp,
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Event Q&A".to_string(),
        }
    }

    #[test]
    fn test_body_carries_both_links() {
        let body = invite_body(
            "RustConf AMA",
            "http://ui.test/events/token/abc",
            "http://ui.test/signup?email=guest@example.com",
        );
        assert!(body.contains("RustConf AMA"));
        assert!(body.contains(r#"href="http://ui.test/events/token/abc""#));
        assert!(body.contains(r#"href="http://ui.test/signup?email=guest@example.com""#));
    }

    #[test]
    fn test_body_escapes_event_title() {
        let body = invite_body(
            "<a href=x>Free prizes</a>",
            "http://ui.test/events/token/abc",
            "http://ui.test/signup?email=a%2Bb%40x.com&ref=\"><script>",
        );
        assert!(!body.contains("<a href=x>"));
        assert!(body.contains("&lt;a href=x&gt;Free prizes&lt;/a&gt;"));
        assert!(!body.contains("\"><script>"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_subject_names_event() {
        assert_eq!(invite_subject("Town Hall"), "You're invited to Town Hall");
    }

    #[tokio::test]
    async fn test_console_mailer_always_succeeds() {
        let result = ConsoleMailer
            .send_invite_email("guest@example.com", "Town Hall", "accept", "register")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_smtp_message_is_built() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let message = mailer
            .message("guest@example.com", "Town Hall", "accept", "register")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: guest@example.com"));
        assert!(raw.contains("Subject: You're invited to Town Hall"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_notification_error() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let err = mailer
            .message("not an address", "Town Hall", "accept", "register")
            .unwrap_err();
        assert!(matches!(err, DomainError::Notification(_)));
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let mut config = smtp_config();
        config.from_email = "nobody".to_string();
        assert!(SmtpMailer::new(&config).is_err());
    }

    #[test]
    fn test_console_selected_by_default() {
        let mut config = smtp_config();
        config.provider = MailProvider::Console;
        assert!(notifier_from_config(&config).is_ok());
    }
}
