//! Invite operations.

use super::load_event;
use crate::access;
use crate::environment::InviteEmail;
use crate::error::{DomainError, Result};
use crate::invite::{self, INVALID_OR_EXPIRED_INVITE, LinkBuilder};
use crate::store::Session;
use crate::types::{
    EventId, Invite, InviteFilter, InviteId, InviteStatus, NewInvite, Participant, Role, UserId,
    parse_status_filter,
};
use crate::views::InviteOut;
use serde::Deserialize;

const NOT_AUTHORIZED: &str = "Not authorized";

fn default_role() -> String {
    Role::Participant.as_str().to_string()
}

/// Body of an invite creation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateInvite {
    /// Event to invite to.
    pub event_id: EventId,
    /// Invitee email.
    pub email: String,
    /// `host` or `participant`.
    #[serde(default = "default_role")]
    pub role: String,
}

/// A stored invite plus the email that announces it.
///
/// The email is returned rather than sent so it goes out only after the
/// transaction commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvite {
    /// The new invite.
    pub invite: InviteOut,
    /// The email to deliver.
    pub email: InviteEmail,
}

async fn invite_out(session: &mut dyn Session, invite: Invite) -> Result<InviteOut> {
    let user = match invite.user_id {
        Some(id) => session.user_by_id(id).await?,
        None => None,
    };
    let event = session.event_by_id(invite.event_id).await?;
    Ok(InviteOut::new(invite, user.as_ref(), event))
}

async fn require_event_host(
    session: &mut dyn Session,
    event_id: EventId,
    user_id: UserId,
) -> Result<crate::types::Event> {
    let event = load_event(session, event_id).await?;
    if !access::is_host(session, event_id, user_id).await? {
        return Err(DomainError::forbidden(NOT_AUTHORIZED));
    }
    Ok(event)
}

/// Invite someone to an event the caller hosts.
///
/// # Errors
///
/// - `NotFound` when the event does not exist
/// - `Forbidden` when the caller is not a host
/// - `Validation` for an unknown role
/// - `Conflict` when the email was already invited to the event
#[tracing::instrument(skip(session, links, request), fields(event_id = %request.event_id))]
pub async fn create(
    session: &mut dyn Session,
    links: &LinkBuilder,
    user_id: UserId,
    request: CreateInvite,
) -> Result<CreatedInvite> {
    let event = require_event_host(session, request.event_id, user_id).await?;
    let role: Role = request.role.parse()?;

    if session
        .invite_by_event_and_email(event.id, &request.email)
        .await?
        .is_some()
    {
        return Err(DomainError::conflict("An invitation has already been sent"));
    }

    let existing_user = session.user_by_email(&request.email).await?;
    let invite = session
        .insert_invite(&NewInvite {
            event_id: event.id,
            email: request.email,
            role,
            token: invite::generate_token(),
            user_id: existing_user.as_ref().map(|u| u.id),
        })
        .await?;

    metrics::counter!("eventqa_invites_created_total", "role" => role.as_str()).increment(1);
    tracing::info!(invite_id = %invite.id, role = %role, "Invite created");

    let email = links.email_for(&invite, &event.title);
    let invite = InviteOut::new(invite, existing_user.as_ref(), Some(event));
    Ok(CreatedInvite { invite, email })
}

/// Accept or decline the invite behind `token`.
///
/// Creates an unregistered account for unknown emails and, on acceptance,
/// adds the membership row unless it already exists.
///
/// # Errors
///
/// - `NotFound` when the token is unknown or the invite was already answered
/// - `Validation` when `status` is not `accepted` or `declined`
#[tracing::instrument(skip(session, token))]
pub async fn respond(session: &mut dyn Session, token: &str, status: &str) -> Result<InviteOut> {
    let invite = session
        .invite_by_token(token)
        .await?
        .ok_or_else(|| DomainError::not_found(INVALID_OR_EXPIRED_INVITE))?;
    invite::ensure_pending(&invite)?;
    let status = invite::parse_response(status)?;

    let user = match session.user_by_email(&invite.email).await? {
        Some(user) => user,
        None => {
            tracing::debug!("Creating unregistered user for invitee");
            session.insert_unregistered_user(&invite.email).await?
        }
    };

    let invite = session.update_invite_response(invite.id, status, user.id).await?;

    if status == InviteStatus::Accepted {
        let roles = session.participant_roles(invite.event_id, user.id).await?;
        if !roles.contains(&invite.role) {
            session
                .insert_participant(Participant {
                    event_id: invite.event_id,
                    user_id: user.id,
                    role: invite.role,
                })
                .await?;
        }
    }

    metrics::counter!("eventqa_invite_responses_total", "status" => status.as_str()).increment(1);
    tracing::info!(invite_id = %invite.id, status = %status, "Invite answered");
    invite_out(session, invite).await
}

/// Withdraw an invite of an event the caller hosts.
///
/// # Errors
///
/// - `NotFound` when the invite (or its event) does not exist
/// - `Forbidden` when the caller is not a host
#[tracing::instrument(skip(session))]
pub async fn delete(session: &mut dyn Session, user_id: UserId, invite_id: InviteId) -> Result<()> {
    let invite = session
        .invite_by_id(invite_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Invite not found"))?;
    require_event_host(session, invite.event_id, user_id).await?;

    session.delete_invite(invite.id).await?;
    tracing::info!("Invite deleted");
    Ok(())
}

/// List invites.
///
/// With `event_id` the caller must host that event and gets all its invites;
/// without it the caller gets the invites linked to their own account.
///
/// # Errors
///
/// - `NotFound` / `Forbidden` for an event the caller cannot manage
/// - `Validation` for an unknown status filter
#[tracing::instrument(skip(session))]
pub async fn list(
    session: &mut dyn Session,
    user_id: UserId,
    event_id: Option<EventId>,
    status: Option<&str>,
) -> Result<Vec<InviteOut>> {
    if let Some(event_id) = event_id {
        require_event_host(session, event_id, user_id).await?;
    }
    let status = parse_status_filter(status)?;

    let filter = match event_id {
        Some(event_id) => InviteFilter { event_id: Some(event_id), user_id: None, status },
        None => InviteFilter { event_id: None, user_id: Some(user_id), status },
    };

    let invites = session.invites(filter).await?;
    let mut out = Vec::with_capacity(invites.len());
    for invite in invites {
        out.push(invite_out(session, invite).await?);
    }
    Ok(out)
}
