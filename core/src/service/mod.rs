//! Operations behind every route.
//!
//! Each operation takes the request's open [`Session`] explicitly, checks the
//! caller's capability, performs its reads and writes, and returns a view
//! payload. Committing is left to the caller so a failing operation leaves no
//! partial writes.

pub mod categories;
pub mod events;
pub mod invites;
pub mod participants;
pub mod questions;

use crate::error::{DomainError, Result};
use crate::store::Session;
use crate::types::{Event, EventId, Role};
use crate::views::{EventOut, display_name};

/// Message for events that do not exist or are hidden from the caller.
pub const EVENT_NOT_FOUND: &str = "Event not found";

/// Load an event or fail with `NotFound`.
pub(crate) async fn load_event(session: &mut dyn Session, event_id: EventId) -> Result<Event> {
    session
        .event_by_id(event_id)
        .await?
        .ok_or_else(|| DomainError::not_found(EVENT_NOT_FOUND))
}

/// Display names of the event's hosts, in membership order.
pub(crate) async fn host_names(session: &mut dyn Session, event_id: EventId) -> Result<Vec<String>> {
    let members = session.participants_of_event(event_id).await?;
    let mut names = Vec::new();
    for member in members.into_iter().filter(|m| m.role == Role::Host) {
        if let Some(user) = session.user_by_id(member.user_id).await? {
            names.push(display_name(Some(&user), &user.email));
        }
    }
    Ok(names)
}

/// Build the member-facing payload of an event.
pub(crate) async fn event_out(session: &mut dyn Session, event: Event) -> Result<EventOut> {
    let hosts = host_names(session, event.id).await?;
    Ok(EventOut::new(event, hosts))
}
