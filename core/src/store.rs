//! Transactional storage seam.
//!
//! A [`Database`] hands out one [`Session`] per request. Every read and write
//! of an operation goes through that session; [`Session::commit`] makes the
//! writes durable and dropping an uncommitted session rolls them back.
//!
//! # Implementations
//!
//! - `PgDatabase` (in `eventqa-postgres`): production implementation
//! - `MemoryDatabase` (in `eventqa-testing`): fast, deterministic testing

use crate::error::Result;
use crate::types::{
    CategoryId, Event, EventDetails, EventId, Invite, InviteFilter, InviteId, InviteStatus,
    NewInvite, NewQuestion, Participant, Question, QuestionCategory, QuestionId, Role, Sequence,
    User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of per-request transactions.
#[async_trait]
pub trait Database: Send + Sync {
    /// Open a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DomainError::Storage`] if no connection is available.
    async fn begin(&self) -> Result<Box<dyn Session>>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DomainError::Storage`] if the store does not answer.
    async fn ping(&self) -> Result<()>;
}

/// One open transaction.
///
/// All methods return [`crate::DomainError::Storage`] when the backing store
/// fails. Lookups return `Ok(None)` for missing rows; scoped lookups (by
/// event and id) also return `None` when the row belongs to another event.
#[async_trait]
pub trait Session: Send {
    /// Make every write of this session durable.
    async fn commit(self: Box<Self>) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Users
    // ═══════════════════════════════════════════════════════════

    /// Look up a user by id.
    async fn user_by_id(&mut self, id: UserId) -> Result<Option<User>>;

    /// Look up a user by exact email.
    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// Create an account that has not completed registration.
    async fn insert_unregistered_user(&mut self, email: &str) -> Result<User>;

    // ═══════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════

    /// Store a new event.
    async fn insert_event(&mut self, details: &EventDetails) -> Result<Event>;

    /// Look up an event by id.
    async fn event_by_id(&mut self, id: EventId) -> Result<Option<Event>>;

    /// Events the user belongs to, with a role filter, ordered by start time.
    async fn events_for_user(&mut self, user_id: UserId, role: Option<Role>) -> Result<Vec<Event>>;

    /// Replace the editable fields of an event.
    async fn update_event(&mut self, id: EventId, details: &EventDetails) -> Result<Option<Event>>;

    /// Delete an event and everything it owns.
    async fn delete_event(&mut self, id: EventId) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Participants
    // ═══════════════════════════════════════════════════════════

    /// Every role the user holds on the event.
    async fn participant_roles(&mut self, event_id: EventId, user_id: UserId) -> Result<Vec<Role>>;

    /// Every membership row of the event.
    async fn participants_of_event(&mut self, event_id: EventId) -> Result<Vec<Participant>>;

    /// Add a membership row.
    async fn insert_participant(&mut self, participant: Participant) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Invites
    // ═══════════════════════════════════════════════════════════

    /// Store a new invite with status `pending`.
    async fn insert_invite(&mut self, invite: &NewInvite) -> Result<Invite>;

    /// Look up an invite by id.
    async fn invite_by_id(&mut self, id: InviteId) -> Result<Option<Invite>>;

    /// Look up an invite by token.
    async fn invite_by_token(&mut self, token: &str) -> Result<Option<Invite>>;

    /// Look up the invite sent to `email` for an event.
    async fn invite_by_event_and_email(
        &mut self,
        event_id: EventId,
        email: &str,
    ) -> Result<Option<Invite>>;

    /// Invites matching the filter, ordered by id.
    async fn invites(&mut self, filter: InviteFilter) -> Result<Vec<Invite>>;

    /// Record an answer to an invite.
    async fn update_invite_response(
        &mut self,
        id: InviteId,
        status: InviteStatus,
        user_id: UserId,
    ) -> Result<Invite>;

    /// Delete an invite.
    async fn delete_invite(&mut self, id: InviteId) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Question categories
    // ═══════════════════════════════════════════════════════════

    /// Categories of the event, ordered by display order then id.
    async fn categories_of_event(&mut self, event_id: EventId) -> Result<Vec<QuestionCategory>>;

    /// Look up a category scoped to an event.
    async fn category_by_id(
        &mut self,
        event_id: EventId,
        id: CategoryId,
    ) -> Result<Option<QuestionCategory>>;

    /// Highest display order among the event's categories.
    async fn max_category_order(&mut self, event_id: EventId) -> Result<Option<i32>>;

    /// Store a new category.
    async fn insert_category(
        &mut self,
        event_id: EventId,
        name: &str,
        display_order: i32,
        now: DateTime<Utc>,
    ) -> Result<QuestionCategory>;

    /// Overwrite name, display order and `updated_at` of a category.
    async fn save_category(&mut self, category: &QuestionCategory) -> Result<()>;

    /// Delete a category, detaching its questions.
    async fn delete_category(&mut self, event_id: EventId, id: CategoryId) -> Result<()>;

    // ═══════════════════════════════════════════════════════════
    // Questions
    // ═══════════════════════════════════════════════════════════

    /// Highest order value in one of the event's sequences.
    async fn max_question_order(&mut self, event_id: EventId, sequence: Sequence)
    -> Result<Option<i32>>;

    /// Store a new question.
    async fn insert_question(&mut self, question: &NewQuestion) -> Result<Question>;

    /// Look up a question scoped to an event.
    async fn question_by_id(&mut self, event_id: EventId, id: QuestionId)
    -> Result<Option<Question>>;

    /// Questions of the event, optionally only published ones, in no particular order.
    async fn questions_of_event(
        &mut self,
        event_id: EventId,
        published_only: bool,
    ) -> Result<Vec<Question>>;

    /// Overwrite every mutable column of a question.
    async fn save_question(&mut self, question: &Question) -> Result<()>;

    /// Delete a question and its asker rows.
    async fn delete_question(&mut self, event_id: EventId, id: QuestionId) -> Result<()>;

    /// Askers of a question in insertion order.
    async fn askers_of(&mut self, question_id: QuestionId) -> Result<Vec<UserId>>;

    /// Record that a user asked a question.
    async fn add_asker(
        &mut self,
        question_id: QuestionId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Replace the askers of a question, keeping the given order.
    async fn replace_askers(
        &mut self,
        question_id: QuestionId,
        user_ids: &[UserId],
        now: DateTime<Utc>,
    ) -> Result<()>;
}
