//! GET /api/events/:id/participants - Members of an event (`?role=`)

use super::RoleQuery;
use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use eventqa_core::access::Credentials;
use eventqa_core::service::participants;
use eventqa_core::types::EventId;
use eventqa_core::views::ParticipantOut;

/// Members of an event the caller belongs to, hosts first.
pub async fn list_participants(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<EventId>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<ParticipantOut>>, AppError> {
    let role = participants::parse_role_filter(query.role.as_deref())?;
    let mut session = state.database.begin().await?;
    let members =
        participants::list(session.as_mut(), &Credentials::user(user.id), event_id, role).await?;
    Ok(Json(members))
}
