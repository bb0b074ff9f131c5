//! Endpoints for invite holders without an account.
//!
//! - GET /api/public/events/token/:token - The event behind an invite token
//! - GET /api/public/events/token/:token/participants - Its members (`?role=`)

use super::RoleQuery;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use eventqa_core::service::{events, participants};
use eventqa_core::views::{EventOut, ParticipantOut};

/// The event an invite token grants access to.
pub async fn event_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<EventOut>, AppError> {
    let mut session = state.database.begin().await?;
    let event = events::get_by_token(session.as_mut(), &token).await?;
    Ok(Json(event))
}

/// Members of the event an invite token grants access to.
pub async fn participants_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<ParticipantOut>>, AppError> {
    let role = participants::parse_role_filter(query.role.as_deref())?;
    let mut session = state.database.begin().await?;
    let members = participants::list_by_token(session.as_mut(), &token, role).await?;
    Ok(Json(members))
}
