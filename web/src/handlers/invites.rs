//! Invite endpoints.
//!
//! - POST /api/invites - Invite an email to an event (hosts)
//! - PUT /api/invites/:token - Accept or decline (token holders)
//! - DELETE /api/invites/:id - Withdraw an invite (hosts)
//! - GET /api/invites - The caller's invites, or an event's (`?event_id=&status=`)

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use eventqa_core::environment::deliver_invite;
use eventqa_core::service::invites::{self, CreateInvite};
use eventqa_core::types::{EventId, InviteId};
use eventqa_core::views::InviteOut;
use serde::Deserialize;

/// Body of an invite response.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// `accepted` or `declined`.
    pub status: String,
}

/// Query parameters for listing invites.
#[derive(Debug, Default, Deserialize)]
pub struct ListInvitesQuery {
    /// Restrict to one event the caller hosts.
    pub event_id: Option<EventId>,
    /// `pending`, `accepted`, `declined` or `all`.
    pub status: Option<String>,
}

/// Create an invite and email it.
///
/// The email goes out after the invite is committed; a delivery failure is
/// logged and the invite stays.
pub async fn create_invite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateInvite>,
) -> Result<(StatusCode, Json<InviteOut>), AppError> {
    let mut session = state.database.begin().await?;
    let created = invites::create(session.as_mut(), &state.links, user.id, request).await?;
    session.commit().await?;

    deliver_invite(state.notifier.as_ref(), &created.email).await;
    Ok((StatusCode::CREATED, Json(created.invite)))
}

/// Answer an invite. No account needed: the token is the credential.
pub async fn respond_to_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<InviteOut>, AppError> {
    let mut session = state.database.begin().await?;
    let invite = invites::respond(session.as_mut(), &token, &request.status).await?;
    session.commit().await?;
    Ok(Json(invite))
}

/// Withdraw an invite.
pub async fn delete_invite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(invite_id): Path<InviteId>,
) -> Result<StatusCode, AppError> {
    let mut session = state.database.begin().await?;
    invites::delete(session.as_mut(), user.id, invite_id).await?;
    session.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List invites.
pub async fn list_invites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListInvitesQuery>,
) -> Result<Json<Vec<InviteOut>>, AppError> {
    let mut session = state.database.begin().await?;
    let invites =
        invites::list(session.as_mut(), user.id, query.event_id, query.status.as_deref()).await?;
    Ok(Json(invites))
}
