//! Question category endpoints.
//!
//! - GET /api/events/:id/question-categories - Listing (`?invite_token=`)
//! - POST /api/events/:id/question-categories - Create (hosts)
//! - PUT /api/events/:id/question-categories/order - Reorder (hosts)
//! - PUT /api/events/:id/question-categories/:cid - Rename (hosts)
//! - DELETE /api/events/:id/question-categories/:cid - Delete (hosts)

use super::InviteTokenQuery;
use crate::error::AppError;
use crate::extractors::MaybeUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use eventqa_core::service::categories::{
    self, CreateCategory, ReorderCategories, UpdateCategory,
};
use eventqa_core::types::{CategoryId, EventId};
use eventqa_core::views::CategoryOut;

/// Categories by display order.
pub async fn list_categories(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(event_id): Path<EventId>,
    Query(query): Query<InviteTokenQuery>,
) -> Result<Json<Vec<CategoryOut>>, AppError> {
    let credentials = caller.credentials(query.invite_token);
    let mut session = state.database.begin().await?;
    let categories = categories::list(session.as_mut(), &credentials, event_id).await?;
    Ok(Json(categories))
}

/// Append a category.
pub async fn create_category(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(event_id): Path<EventId>,
    Json(request): Json<CreateCategory>,
) -> Result<(StatusCode, Json<CategoryOut>), AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    let category =
        categories::create(session.as_mut(), state.clock.as_ref(), &credentials, event_id, request)
            .await?;
    session.commit().await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Set display orders; returns the reordered listing.
pub async fn reorder_categories(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(event_id): Path<EventId>,
    Json(request): Json<ReorderCategories>,
) -> Result<Json<Vec<CategoryOut>>, AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    let categories =
        categories::reorder(session.as_mut(), state.clock.as_ref(), &credentials, event_id, request)
            .await?;
    session.commit().await?;
    Ok(Json(categories))
}

/// Rename a category.
pub async fn update_category(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((event_id, category_id)): Path<(EventId, CategoryId)>,
    Json(request): Json<UpdateCategory>,
) -> Result<Json<CategoryOut>, AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    let category = categories::update(
        session.as_mut(),
        state.clock.as_ref(),
        &credentials,
        event_id,
        category_id,
        request,
    )
    .await?;
    session.commit().await?;
    Ok(Json(category))
}

/// Delete a category. Its questions become uncategorized.
pub async fn delete_category(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path((event_id, category_id)): Path<(EventId, CategoryId)>,
) -> Result<StatusCode, AppError> {
    let credentials = caller.credentials(None);
    let mut session = state.database.begin().await?;
    categories::delete(session.as_mut(), &credentials, event_id, category_id).await?;
    session.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
