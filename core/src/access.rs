//! Membership predicates and caller resolution.
//!
//! Every request that touches an event is classified once into a [`Caller`].
//! Operations then run a capability check against that value instead of
//! re-deriving membership ad hoc.

use crate::error::{DomainError, Result};
use crate::store::Session;
use crate::types::{EventId, Invite, InviteId, Role, UserId};

/// Message for requests that carry neither a user nor a usable token.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Whether the user holds the host role on the event.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn is_host(session: &mut dyn Session, event_id: EventId, user_id: UserId) -> Result<bool> {
    let roles = session.participant_roles(event_id, user_id).await?;
    Ok(roles.contains(&Role::Host))
}

/// Whether the user holds any role on the event.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn is_participant(
    session: &mut dyn Session,
    event_id: EventId,
    user_id: UserId,
) -> Result<bool> {
    let roles = session.participant_roles(event_id, user_id).await?;
    Ok(!roles.is_empty())
}

/// The invite behind `token`, if it exists and targets `event_id`.
///
/// The invite status is not consulted: declined and accepted invites still
/// grant token access.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn invite_for_event(
    session: &mut dyn Session,
    event_id: EventId,
    token: &str,
) -> Result<Option<Invite>> {
    let invite = session.invite_by_token(token).await?;
    Ok(invite.filter(|invite| invite.event_id == event_id))
}

/// Whether `token` grants access to `event_id`.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn authorize_via_token(
    session: &mut dyn Session,
    event_id: EventId,
    token: &str,
) -> Result<bool> {
    Ok(invite_for_event(session, event_id, token).await?.is_some())
}

/// Credentials presented with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Authenticated user, if a valid bearer token was presented.
    pub user_id: Option<UserId>,
    /// Invite token, if one was presented.
    pub invite_token: Option<String>,
}

impl Credentials {
    /// Credentials for a signed-in user.
    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self { user_id: Some(user_id), invite_token: None }
    }

    /// Credentials carrying only an invite token.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self { user_id: None, invite_token: Some(token.into()) }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// A caller's standing on one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Signed-in host of the event.
    Host {
        /// The host.
        user_id: UserId,
    },
    /// Signed-in member without the host role.
    Participant {
        /// The member.
        user_id: UserId,
    },
    /// Holder of an invite token for the event.
    AnonymousViaToken {
        /// The invite the token belongs to.
        invite_id: InviteId,
    },
    /// No standing on the event.
    Unauthenticated,
}

impl Caller {
    /// The signed-in member behind this caller, if any.
    #[must_use]
    pub const fn member_id(&self) -> Option<UserId> {
        match self {
            Self::Host { user_id } | Self::Participant { user_id } => Some(*user_id),
            Self::AnonymousViaToken { .. } | Self::Unauthenticated => None,
        }
    }

    /// Whether the caller is a host of the event.
    #[must_use]
    pub const fn is_host(&self) -> bool {
        matches!(self, Self::Host { .. })
    }

    /// Whether the caller may read the event's published content.
    #[must_use]
    pub const fn can_read(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

/// Classify the caller for one event.
///
/// Checked in order: host, participant, invite token, nothing.
///
/// # Errors
///
/// Propagates storage failures.
#[tracing::instrument(skip(session, credentials), fields(signed_in = credentials.is_signed_in()))]
pub async fn resolve(
    session: &mut dyn Session,
    event_id: EventId,
    credentials: &Credentials,
) -> Result<Caller> {
    if let Some(user_id) = credentials.user_id {
        let roles = session.participant_roles(event_id, user_id).await?;
        if roles.contains(&Role::Host) {
            return Ok(Caller::Host { user_id });
        }
        if !roles.is_empty() {
            return Ok(Caller::Participant { user_id });
        }
    }

    if let Some(token) = credentials.invite_token.as_deref() {
        if let Some(invite) = invite_for_event(session, event_id, token).await? {
            return Ok(Caller::AnonymousViaToken { invite_id: invite.id });
        }
    }

    Ok(Caller::Unauthenticated)
}

/// Capability check for host-only operations.
///
/// A request without a signed-in user is `Unauthorized`; a signed-in user
/// who is not a host gets `Forbidden` with `denied`.
///
/// # Errors
///
/// See above.
pub fn require_host(caller: &Caller, credentials: &Credentials, denied: &str) -> Result<UserId> {
    match caller {
        Caller::Host { user_id } => Ok(*user_id),
        _ if !credentials.is_signed_in() => {
            Err(DomainError::unauthorized(AUTHENTICATION_REQUIRED))
        }
        _ => Err(DomainError::forbidden(denied)),
    }
}

/// Capability check for reading an event's questions, categories or members.
///
/// # Errors
///
/// Returns `Unauthorized` for callers without standing on the event.
pub fn require_reader(caller: &Caller) -> Result<()> {
    if caller.can_read() {
        Ok(())
    } else {
        Err(DomainError::unauthorized(AUTHENTICATION_REQUIRED))
    }
}
