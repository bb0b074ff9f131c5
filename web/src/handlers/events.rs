//! Event endpoints.
//!
//! - POST /api/events - Create an event hosted by the caller
//! - GET /api/events - List the caller's events (`?role=host|participant&time=all|upcoming|past`)
//! - GET /api/events/:id - Get an event the caller belongs to
//! - PUT /api/events/:id - Replace an event's details (hosts)
//! - DELETE /api/events/:id - Delete an event (hosts)

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use eventqa_core::service::events::{self, Membership};
use eventqa_core::types::{EventDetails, EventId, TimeFilter};
use eventqa_core::views::EventOut;
use serde::Deserialize;

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    /// `host` or `participant` (default).
    pub role: Option<String>,
    /// `all` (default), `upcoming` or `past`.
    pub time: Option<String>,
}

/// Create an event. The caller becomes its host.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "All hands",
///     "description": "Quarterly update",
///     "start_time": "2025-06-01T09:00:00Z",
///     "end_time": "2025-06-01T11:00:00Z",
///     "address": "1 Main St"
///   }'
/// ```
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(details): Json<EventDetails>,
) -> Result<(StatusCode, Json<EventOut>), AppError> {
    let mut session = state.database.begin().await?;
    let event = events::create(session.as_mut(), user.id, details).await?;
    session.commit().await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List the caller's events, ordered by start time.
pub async fn list_events(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventOut>>, AppError> {
    let membership = query
        .role
        .as_deref()
        .map(str::parse::<Membership>)
        .transpose()?
        .unwrap_or_default();
    let time = query
        .time
        .as_deref()
        .map(str::parse::<TimeFilter>)
        .transpose()?
        .unwrap_or_default();

    let mut session = state.database.begin().await?;
    let events =
        events::list(session.as_mut(), state.clock.as_ref(), user.id, membership, time).await?;
    Ok(Json(events))
}

/// Get one event. Non-members get 404.
pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventOut>, AppError> {
    let mut session = state.database.begin().await?;
    let event = events::get(session.as_mut(), user.id, event_id).await?;
    Ok(Json(event))
}

/// Replace the details of an event the caller hosts.
pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<EventId>,
    Json(details): Json<EventDetails>,
) -> Result<Json<EventOut>, AppError> {
    let mut session = state.database.begin().await?;
    let event = events::update(session.as_mut(), user.id, event_id, details).await?;
    session.commit().await?;
    Ok(Json(event))
}

/// Delete an event the caller hosts.
pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<EventId>,
) -> Result<StatusCode, AppError> {
    let mut session = state.database.begin().await?;
    events::delete(session.as_mut(), user.id, event_id).await?;
    session.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
