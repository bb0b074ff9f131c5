//! Invite tokens, links and the pending → accepted | declined transition.

use crate::environment::InviteEmail;
use crate::error::{DomainError, Result};
use crate::types::{Invite, InviteStatus};

/// Message for answering an unknown or already answered invite.
pub const INVALID_OR_EXPIRED_INVITE: &str = "Invalid or expired invite";

/// Generate a cryptographically secure invite token.
///
/// Returns 256 random bits encoded as base64url without padding (43 characters).
#[must_use]
pub fn generate_token() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Builds the links embedded in invite emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    ui_url: String,
}

impl LinkBuilder {
    /// Links rooted at the web UI's base url.
    #[must_use]
    pub fn new(ui_url: impl Into<String>) -> Self {
        let ui_url: String = ui_url.into();
        Self { ui_url: ui_url.trim_end_matches('/').to_string() }
    }

    /// Page that opens the event with the invite token.
    #[must_use]
    pub fn accept_link(&self, token: &str) -> String {
        format!("{}/events/token/{token}", self.ui_url)
    }

    /// Signup page with the invitee's email pre-filled.
    #[must_use]
    pub fn register_link(&self, email: &str) -> String {
        format!("{}/signup?email={}", self.ui_url, urlencoding::encode(email))
    }

    /// The full email for an invite.
    #[must_use]
    pub fn email_for(&self, invite: &Invite, event_title: &str) -> InviteEmail {
        InviteEmail {
            email: invite.email.clone(),
            event_title: event_title.to_string(),
            accept_link: self.accept_link(&invite.token),
            register_link: self.register_link(&invite.email),
        }
    }
}

/// Parse and check the answer to an invite.
///
/// Only `accepted` and `declined` are valid answers.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] ("Invalid status") for anything else.
pub fn parse_response(raw: &str) -> Result<InviteStatus> {
    match raw.parse::<InviteStatus>() {
        Ok(status @ (InviteStatus::Accepted | InviteStatus::Declined)) => Ok(status),
        Ok(InviteStatus::Pending) | Err(_) => Err(DomainError::validation("Invalid status")),
    }
}

/// Fail unless the invite can still be answered.
///
/// # Errors
///
/// Returns [`DomainError::NotFound`] when the invite was already answered.
pub fn ensure_pending(invite: &Invite) -> Result<()> {
    if invite.status == InviteStatus::Pending {
        Ok(())
    } else {
        Err(DomainError::not_found(INVALID_OR_EXPIRED_INVITE))
    }
}
