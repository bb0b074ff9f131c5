//! Question category operations.

use super::load_event;
use crate::access::{self, Credentials};
use crate::environment::Clock;
use crate::error::{DomainError, Result};
use crate::ordering;
use crate::store::Session;
use crate::types::{CategoryId, EventId, QuestionCategory};
use crate::views::CategoryOut;
use serde::Deserialize;

const CATEGORY_NOT_FOUND: &str = "Category not found";
const HOSTS_ONLY: &str = "Only hosts can manage question categories";

/// Body of a category creation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCategory {
    /// Display name.
    pub name: String,
}

/// Body of a category rename request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateCategory {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of a category reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CategoryOrderItem {
    /// Category to move.
    pub category_id: CategoryId,
    /// New position.
    pub display_order: i32,
}

/// Body of a category reorder request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReorderCategories {
    /// Entries applied in order.
    pub items: Vec<CategoryOrderItem>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Category name must not be empty"));
    }
    Ok(())
}

async fn require_host(
    session: &mut dyn Session,
    credentials: &Credentials,
    event_id: EventId,
) -> Result<()> {
    load_event(session, event_id).await?;
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_host(&caller, credentials, HOSTS_ONLY)?;
    Ok(())
}

async fn load_category(
    session: &mut dyn Session,
    event_id: EventId,
    category_id: CategoryId,
) -> Result<QuestionCategory> {
    session
        .category_by_id(event_id, category_id)
        .await?
        .ok_or_else(|| DomainError::not_found(CATEGORY_NOT_FOUND))
}

/// Categories of an event by display order.
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
) -> Result<Vec<CategoryOut>> {
    load_event(session, event_id).await?;
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_reader(&caller)?;

    let categories = session.categories_of_event(event_id).await?;
    Ok(categories.into_iter().map(CategoryOut::from).collect())
}

/// Add a category at the end of the event's list.
///
/// # Errors
///
/// - `NotFound` when the event does not exist
/// - `Unauthorized` / `Forbidden` for non-hosts
/// - `Validation` for a blank name
#[tracing::instrument(skip(session, clock, credentials, request))]
pub async fn create(
    session: &mut dyn Session,
    clock: &dyn Clock,
    credentials: &Credentials,
    event_id: EventId,
    request: CreateCategory,
) -> Result<CategoryOut> {
    require_host(session, credentials, event_id).await?;
    validate_name(&request.name)?;

    let display_order = ordering::next_order(session.max_category_order(event_id).await?);
    let category = session
        .insert_category(event_id, request.name.trim(), display_order, clock.now())
        .await?;
    tracing::info!(category_id = %category.id, "Category created");
    Ok(category.into())
}

/// Rename a category.
///
/// # Errors
///
/// - `NotFound` when the event or category does not exist
/// - `Unauthorized` / `Forbidden` for non-hosts
/// - `Validation` for a blank name
#[tracing::instrument(skip(session, clock, credentials, request))]
pub async fn update(
    session: &mut dyn Session,
    clock: &dyn Clock,
    credentials: &Credentials,
    event_id: EventId,
    category_id: CategoryId,
    request: UpdateCategory,
) -> Result<CategoryOut> {
    require_host(session, credentials, event_id).await?;
    let mut category = load_category(session, event_id, category_id).await?;

    if let Some(name) = request.name {
        validate_name(&name)?;
        category.name = name.trim().to_string();
    }
    category.updated_at = clock.now();
    session.save_category(&category).await?;
    Ok(category.into())
}

/// Apply a host's category reorder. Any unknown category aborts the batch.
///
/// # Errors
///
/// - `NotFound` when the event or a category does not exist
/// - `Unauthorized` / `Forbidden` for non-hosts
#[tracing::instrument(skip(session, clock, credentials, request), fields(items = request.items.len()))]
pub async fn reorder(
    session: &mut dyn Session,
    clock: &dyn Clock,
    credentials: &Credentials,
    event_id: EventId,
    request: ReorderCategories,
) -> Result<Vec<CategoryOut>> {
    require_host(session, credentials, event_id).await?;

    let now = clock.now();
    for item in &request.items {
        let mut category = load_category(session, event_id, item.category_id).await?;
        category.display_order = item.display_order;
        category.updated_at = now;
        session.save_category(&category).await?;
    }

    let categories = session.categories_of_event(event_id).await?;
    Ok(categories.into_iter().map(CategoryOut::from).collect())
}

/// Delete a category; its questions become uncategorized.
///
/// # Errors
///
/// - `NotFound` when the event or category does not exist
/// - `Unauthorized` / `Forbidden` for non-hosts
#[tracing::instrument(skip(session, credentials))]
pub async fn delete(
    session: &mut dyn Session,
    credentials: &Credentials,
    event_id: EventId,
    category_id: CategoryId,
) -> Result<()> {
    require_host(session, credentials, event_id).await?;
    let category = load_category(session, event_id, category_id).await?;
    session.delete_category(event_id, category.id).await?;
    tracing::info!("Category deleted");
    Ok(())
}
