//! Event membership listings.

use super::load_event;
use crate::access::{self, Credentials};
use crate::error::{DomainError, Result};
use crate::store::Session;
use crate::types::{EventId, Role};
use crate::views::{ParticipantOut, display_name};

/// Parse an optional role filter.
///
/// # Errors
///
/// Returns `Validation` for anything but `host` or `participant`.
pub fn parse_role_filter(raw: Option<&str>) -> Result<Option<Role>> {
    raw.map(str::parse).transpose()
}

async fn members(
    session: &mut dyn Session,
    event_id: EventId,
    role: Option<Role>,
) -> Result<Vec<ParticipantOut>> {
    let rows = session.participants_of_event(event_id).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows.into_iter().filter(|r| role.is_none_or(|role| r.role == role)) {
        let user = session.user_by_id(row.user_id).await?;
        let name = match &user {
            Some(user) => display_name(Some(user), &user.email),
            None => row.user_id.to_string(),
        };
        out.push(ParticipantOut { id: row.user_id, name, role: row.role });
    }
    out.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.name.cmp(&b.name)));
    Ok(out)
}

/// Members of an event, hosts first then by name.
///
/// # Errors
///
/// - `NotFound` when the event does not exist
/// - `Unauthorized` for callers without standing on the event
#[tracing::instrument(skip(session, credentials))]
pub async fn list(
    session: &mut dyn Session,
    credentials: &Credentials,
    event_id: EventId,
    role: Option<Role>,
) -> Result<Vec<ParticipantOut>> {
    load_event(session, event_id).await?;
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_reader(&caller)?;
    members(session, event_id, role).await
}

/// Members of the event an invite token points at.
///
/// # Errors
///
/// Returns `NotFound` for unknown tokens.
#[tracing::instrument(skip_all)]
pub async fn list_by_token(
    session: &mut dyn Session,
    token: &str,
    role: Option<Role>,
) -> Result<Vec<ParticipantOut>> {
    let invite = session
        .invite_by_token(token)
        .await?
        .ok_or_else(|| DomainError::not_found("Invalid or expired invite token"))?;
    load_event(session, invite.event_id).await?;
    members(session, invite.event_id, role).await
}
