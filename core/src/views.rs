//! Response payloads and the display-name rule.

use crate::types::{
    CategoryId, Event, EventId, Invite, InviteId, InviteStatus, Question, QuestionCategory,
    QuestionId, Role, User, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name shown for a person.
///
/// The trimmed `"{first} {last}"` of the user; the user's email when that is
/// empty; `fallback_email` when there is no user at all.
#[must_use]
pub fn display_name(user: Option<&User>, fallback_email: &str) -> String {
    let Some(user) = user else {
        return fallback_email.to_string();
    };
    let full = format!(
        "{} {}",
        user.first_name.as_deref().unwrap_or_default(),
        user.last_name.as_deref().unwrap_or_default()
    );
    let trimmed = full.trim();
    if trimmed.is_empty() { user.email.clone() } else { trimmed.to_string() }
}

/// An event as returned to members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOut {
    /// Event id.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-form description, omitted when empty.
    pub description: Option<String>,
    /// Start of the event.
    pub start_time: DateTime<Utc>,
    /// End of the event.
    pub end_time: DateTime<Utc>,
    /// Where the event takes place.
    pub address: String,
    /// Display names of the event's hosts.
    pub hosts: Vec<String>,
}

impl EventOut {
    /// Combine an event with its host names.
    #[must_use]
    pub fn new(event: Event, hosts: Vec<String>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description.filter(|d| !d.is_empty()),
            start_time: event.start_time,
            end_time: event.end_time,
            address: event.address,
            hosts,
        }
    }
}

/// The event embedded in an invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event id.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Start of the event.
    pub start_time: DateTime<Utc>,
    /// End of the event.
    pub end_time: DateTime<Utc>,
    /// Where the event takes place.
    pub address: String,
}

impl From<Event> for EventSummary {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            start_time: event.start_time,
            end_time: event.end_time,
            address: event.address,
        }
    }
}

/// An invite as returned to hosts and invitees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteOut {
    /// Invite id.
    pub id: InviteId,
    /// Address the invite was sent to.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
    /// Where the invite is in its lifecycle.
    pub status: InviteStatus,
    /// Token that grants access to the event.
    pub token: String,
    /// Display name of the linked user, or the invite email.
    pub user_name: String,
    /// The invited-to event, when it still exists.
    pub event: Option<EventSummary>,
}

impl InviteOut {
    /// Build the payload from an invite and its optional relations.
    #[must_use]
    pub fn new(invite: Invite, user: Option<&User>, event: Option<Event>) -> Self {
        let user_name = display_name(user, &invite.email);
        Self {
            id: invite.id,
            email: invite.email,
            role: invite.role,
            status: invite.status,
            token: invite.token,
            user_name,
            event: event.map(EventSummary::from),
        }
    }
}

/// A member of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantOut {
    /// The member's user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role held on the event.
    pub role: Role,
}

/// A question with its askers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOut {
    /// Question id.
    pub id: QuestionId,
    /// Owning event.
    pub event_id: EventId,
    /// The question as asked or edited.
    pub question_text: String,
    /// Host's answer.
    pub answer_text: Option<String>,
    /// Category within the same event.
    pub category_id: Option<CategoryId>,
    /// Whether non-hosts can see it.
    pub is_published: bool,
    /// Position in the published sequence.
    pub published_order: Option<i32>,
    /// Position in the draft sequence.
    pub draft_order: Option<i32>,
    /// Original asker; `None` for anonymous questions.
    pub user_id: Option<UserId>,
    /// Registered askers in the order they were recorded.
    pub asker_user_ids: Vec<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// When it was first published; cleared on unpublish.
    pub published_at: Option<DateTime<Utc>>,
}

impl QuestionOut {
    /// Combine a question with its askers.
    #[must_use]
    pub fn new(question: Question, asker_user_ids: Vec<UserId>) -> Self {
        Self {
            id: question.id,
            event_id: question.event_id,
            question_text: question.question_text,
            answer_text: question.answer_text,
            category_id: question.category_id,
            is_published: question.is_published,
            published_order: question.published_order,
            draft_order: question.draft_order,
            user_id: question.user_id,
            asker_user_ids,
            created_at: question.created_at,
            updated_at: question.updated_at,
            published_at: question.published_at,
        }
    }
}

/// A question category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOut {
    /// Category id.
    pub id: CategoryId,
    /// Owning event.
    pub event_id: EventId,
    /// Category name.
    pub name: String,
    /// Position among the event's categories.
    pub display_order: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<QuestionCategory> for CategoryOut {
    fn from(category: QuestionCategory) -> Self {
        Self {
            id: category.id,
            event_id: category.event_id,
            name: category.name,
            display_order: category.display_order,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}
