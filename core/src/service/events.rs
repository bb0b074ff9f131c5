//! Event operations.

use super::{EVENT_NOT_FOUND, event_out, load_event};
use crate::access::{self, Credentials};
use crate::environment::Clock;
use crate::error::{DomainError, Result};
use crate::store::Session;
use crate::types::{EventDetails, EventId, Participant, Role, TimeFilter, UserId};
use crate::views::EventOut;

/// Which memberships an event listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    /// Events the user hosts.
    Host,
    /// Events the user belongs to in any role.
    #[default]
    Participant,
}

impl std::str::FromStr for Membership {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "host" => Ok(Self::Host),
            "participant" => Ok(Self::Participant),
            _ => Err(DomainError::validation(
                "Invalid role parameter. Must be 'host' or 'participant'.",
            )),
        }
    }
}

fn validate(details: &EventDetails) -> Result<()> {
    if details.title.trim().is_empty() {
        return Err(DomainError::validation("Event title must not be empty"));
    }
    if details.end_time < details.start_time {
        return Err(DomainError::validation(
            "Event end time must not precede its start time",
        ));
    }
    Ok(())
}

/// Create an event hosted by `user_id`.
///
/// # Errors
///
/// Returns `Validation` for a blank title or an end before the start.
#[tracing::instrument(skip(session, details), fields(title = %details.title))]
pub async fn create(
    session: &mut dyn Session,
    user_id: UserId,
    details: EventDetails,
) -> Result<EventOut> {
    validate(&details)?;

    let event = session.insert_event(&details).await?;
    session
        .insert_participant(Participant { event_id: event.id, user_id, role: Role::Host })
        .await?;

    metrics::counter!("eventqa_events_created_total").increment(1);
    tracing::info!(event_id = %event.id, "Event created");
    event_out(session, event).await
}

/// Events of `user_id` matching the membership and time filters, by start time.
///
/// # Errors
///
/// Propagates storage failures.
#[tracing::instrument(skip(session, clock))]
pub async fn list(
    session: &mut dyn Session,
    clock: &dyn Clock,
    user_id: UserId,
    membership: Membership,
    time: TimeFilter,
) -> Result<Vec<EventOut>> {
    let role = match membership {
        Membership::Host => Some(Role::Host),
        Membership::Participant => None,
    };
    let now = clock.now();
    let events = session.events_for_user(user_id, role).await?;

    let mut out = Vec::new();
    for event in events.into_iter().filter(|e| time.admits(e, now)) {
        out.push(event_out(session, event).await?);
    }
    Ok(out)
}

/// An event the user belongs to.
///
/// # Errors
///
/// Returns `NotFound` when the event is missing or the user is not a member.
#[tracing::instrument(skip(session))]
pub async fn get(session: &mut dyn Session, user_id: UserId, event_id: EventId) -> Result<EventOut> {
    let caller = access::resolve(session, event_id, &Credentials::user(user_id)).await?;
    if caller.member_id().is_none() {
        return Err(DomainError::not_found(EVENT_NOT_FOUND));
    }
    let event = load_event(session, event_id).await?;
    event_out(session, event).await
}

/// Replace the editable fields of an event the user hosts.
///
/// # Errors
///
/// Returns `NotFound` for non-hosts and `Validation` for invalid details.
#[tracing::instrument(skip(session, details))]
pub async fn update(
    session: &mut dyn Session,
    user_id: UserId,
    event_id: EventId,
    details: EventDetails,
) -> Result<EventOut> {
    if !access::is_host(session, event_id, user_id).await? {
        return Err(DomainError::not_found(EVENT_NOT_FOUND));
    }
    validate(&details)?;

    let event = session
        .update_event(event_id, &details)
        .await?
        .ok_or_else(|| DomainError::not_found(EVENT_NOT_FOUND))?;
    tracing::info!("Event updated");
    event_out(session, event).await
}

/// Delete an event the user hosts, with everything it owns.
///
/// # Errors
///
/// Returns `NotFound` for non-hosts.
#[tracing::instrument(skip(session))]
pub async fn delete(session: &mut dyn Session, user_id: UserId, event_id: EventId) -> Result<()> {
    if !access::is_host(session, event_id, user_id).await? {
        return Err(DomainError::not_found(EVENT_NOT_FOUND));
    }
    session.delete_event(event_id).await?;
    tracing::info!("Event deleted");
    Ok(())
}

/// The event an invite token points at.
///
/// # Errors
///
/// Returns `NotFound` for unknown tokens.
#[tracing::instrument(skip_all)]
pub async fn get_by_token(session: &mut dyn Session, token: &str) -> Result<EventOut> {
    let invite = session
        .invite_by_token(token)
        .await?
        .ok_or_else(|| DomainError::not_found("Invalid or expired invite token"))?;
    let event = session
        .event_by_id(invite.event_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Event not found for this invite"))?;
    event_out(session, event).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn details(title: &str, start_hour: u32, end_hour: u32) -> EventDetails {
        EventDetails {
            title: title.into(),
            description: None,
            start_time: Utc.with_ymd_and_hms(2025, 3, 1, start_hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 3, 1, end_hour, 0, 0).unwrap(),
            address: "Hall A".into(),
        }
    }

    #[test]
    fn rejects_end_before_start() {
        assert!(matches!(validate(&details("Launch", 10, 9)), Err(DomainError::Validation(_))));
        assert!(validate(&details("Launch", 10, 10)).is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        assert!(matches!(validate(&details("  ", 9, 10)), Err(DomainError::Validation(_))));
    }

    #[test]
    fn membership_defaults_to_participant() {
        assert_eq!(Membership::default(), Membership::Participant);
        assert_eq!("host".parse::<Membership>(), Ok(Membership::Host));
        assert!("owner".parse::<Membership>().is_err());
    }
}
