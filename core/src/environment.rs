//! Injected collaborators.
//!
//! Operations never read the wall clock, resolve bearer tokens or send mail
//! directly. They go through these traits so tests can swap in fixed or
//! recording implementations.

use crate::error::Result;
use crate::types::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Resolves an opaque bearer token to the account it was issued for.
///
/// Issuing tokens (registration, login) happens elsewhere.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the user behind `bearer`.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DomainError::Storage`] if the lookup itself fails.
    async fn authenticate(&self, bearer: &str) -> Result<Option<User>>;
}

/// An invite email ready to be handed to an [`InviteNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEmail {
    /// Recipient.
    pub email: String,
    /// Title of the event the recipient is invited to.
    pub event_title: String,
    /// Link that opens the event with the invite token.
    pub accept_link: String,
    /// Link to the signup page with the email pre-filled.
    pub register_link: String,
}

/// Delivers invite emails.
#[async_trait]
pub trait InviteNotifier: Send + Sync {
    /// Send one invite email.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DomainError::Notification`] if delivery fails.
    async fn send_invite_email(
        &self,
        email: &str,
        event_title: &str,
        accept_link: &str,
        register_link: &str,
    ) -> Result<()>;
}

/// Send `invite` through `notifier`, logging instead of failing.
///
/// The invite is already committed when this runs, so a delivery failure
/// must not surface to the caller.
pub async fn deliver_invite(notifier: &dyn InviteNotifier, invite: &InviteEmail) {
    let outcome = notifier
        .send_invite_email(
            &invite.email,
            &invite.event_title,
            &invite.accept_link,
            &invite.register_link,
        )
        .await;

    match outcome {
        Ok(()) => {
            metrics::counter!("eventqa_invite_emails_total", "outcome" => "sent").increment(1);
            tracing::info!(email = %invite.email, "Invite email sent");
        }
        Err(error) => {
            metrics::counter!("eventqa_invite_emails_total", "outcome" => "failed").increment(1);
            tracing::warn!(email = %invite.email, error = %error, "Failed to send invite email");
        }
    }
}
