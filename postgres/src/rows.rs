//! Row shapes returned by queries and their mapping onto domain records.

use chrono::{DateTime, Utc};
use eventqa_core::types::{
    CategoryId, Event, EventId, Invite, InviteId, InviteStatus, Participant, Question,
    QuestionCategory, QuestionId, Role, User, UserId,
};
use eventqa_core::{DomainError, Result};

fn parse_role(raw: &str) -> Result<Role> {
    raw.parse()
        .map_err(|_| DomainError::storage(format!("Invalid role in database: {raw}")))
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    is_registered: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_registered: row.is_registered,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    address: String,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            title: row.title,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            address: row.address,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ParticipantRow {
    event_id: i64,
    user_id: i64,
    role: String,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = DomainError;

    fn try_from(row: ParticipantRow) -> Result<Self> {
        Ok(Self {
            event_id: EventId::new(row.event_id),
            user_id: UserId::new(row.user_id),
            role: parse_role(&row.role)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RoleRow {
    role: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = DomainError;

    fn try_from(row: RoleRow) -> Result<Self> {
        parse_role(&row.role)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct InviteRow {
    id: i64,
    event_id: i64,
    email: String,
    role: String,
    token: String,
    status: String,
    user_id: Option<i64>,
}

impl TryFrom<InviteRow> for Invite {
    type Error = DomainError;

    fn try_from(row: InviteRow) -> Result<Self> {
        let status: InviteStatus = row.status.parse().map_err(|_| {
            DomainError::storage(format!("Invalid invite status in database: {}", row.status))
        })?;
        Ok(Self {
            id: InviteId::new(row.id),
            event_id: EventId::new(row.event_id),
            email: row.email,
            role: parse_role(&row.role)?,
            token: row.token,
            status,
            user_id: row.user_id.map(UserId::new),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CategoryRow {
    id: i64,
    event_id: i64,
    name: String,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for QuestionCategory {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            event_id: EventId::new(row.event_id),
            name: row.name,
            display_order: row.display_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    id: i64,
    event_id: i64,
    user_id: Option<i64>,
    category_id: Option<i64>,
    question_text: String,
    answer_text: Option<String>,
    is_published: bool,
    published_order: Option<i32>,
    draft_order: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: QuestionId::new(row.id),
            event_id: EventId::new(row.event_id),
            user_id: row.user_id.map(UserId::new),
            category_id: row.category_id.map(CategoryId::new),
            question_text: row.question_text,
            answer_text: row.answer_text,
            is_published: row.is_published,
            published_order: row.published_order,
            draft_order: row.draft_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
        }
    }
}
