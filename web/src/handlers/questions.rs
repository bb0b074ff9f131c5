//! Question endpoints.
//!
//! Reads and question creation accept a bearer token, an invite token, or
//! both; everything else is host only.
//!
//! - GET /api/events/:id/questions - Listing (`?invite_token=`)
//! - POST /api/events/:id/questions - Ask (body may carry `invite_token`)
//! - PUT /api/events/:id/questions/order - Bulk publish/reorder
//! - PUT /api/events/:id/questions/:qid - Edit text, answer or askers
//! - DELETE /api/events/:id/questions/:qid - Delete

use super::InviteTokenQuery;
use crate::error::AppError;
use crate::extractors::MaybeUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use eventqa_core::service::questions::{self, CreateQuestion, ReorderQuestions, UpdateQuestion};
use eventqa_core::types::{EventId, QuestionId};
use eventqa_core::views::QuestionOut;

/// Questions in listing order. Non-hosts only see published ones.
pub async fn list_questions(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(event_id): Path<EventId>,
    Query(query): Query<InviteTokenQuery>,
) -> Result<Json<Vec<QuestionOut>>, AppError> {
    let credentials = caller.credentials(query.invite_token);
    let mut session = state.database.begin().await?;
    let questions = questions::list(session.as_mut(), &credentials, event_id).await?;
    Ok(Json(questions))
}

/// Ask a question.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/1/questions \
///   -H "Content-Type: application/json" \
///   -d '{"question_text": "Is there parking?", "invite_token": "<token>"}'
/// ```
pub async fn create_question(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(event_id): Path<EventId>,
    Json(request): Json<CreateQuestion>,
) -> Result<(StatusCode, Json<QuestionOut>), AppError> {
    let credentials = caller.credentials(request.invite_token.clone());
    let mut session = state.database.begin().await?;
    let question =
        questions::create(session.as_mut(), state.clock.as_ref(), &credentials, event_id, request)
            .await?;
    session.commit().await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Apply a bulk publish/reorder. Any failing item rolls back the batch.
pub async fn reorder_questions(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(event_id): Path<EventId>,
    Json(request): Json<ReorderQuestions>,
) -> Result<StatusCode, AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    questions::reorder(session.as_mut(), state.clock.as_ref(), &credentials, event_id, request)
        .await?;
    session.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Edit a question.
pub async fn update_question(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((event_id, question_id)): Path<(EventId, QuestionId)>,
    Json(request): Json<UpdateQuestion>,
) -> Result<Json<QuestionOut>, AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    let question = questions::update(
        session.as_mut(),
        state.clock.as_ref(),
        &credentials,
        event_id,
        question_id,
        request,
    )
    .await?;
    session.commit().await?;
    Ok(Json(question))
}

/// Delete a question.
pub async fn delete_question(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((event_id, question_id)): Path<(EventId, QuestionId)>,
) -> Result<StatusCode, AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    questions::delete(session.as_mut(), &credentials, event_id, question_id).await?;
    session.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
