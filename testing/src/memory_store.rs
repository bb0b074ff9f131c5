//! In-memory [`Database`] for fast, deterministic testing.
//!
//! A session works on a private copy of the state taken at `begin`; `commit`
//! writes the copy back and dropping the session discards it. Uniqueness and
//! cascade rules mirror the PostgreSQL schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventqa_core::store::{Database, Session};
use eventqa_core::types::{
    CategoryId, Event, EventDetails, EventId, Invite, InviteFilter, InviteId, InviteStatus,
    NewInvite, NewQuestion, Participant, Question, QuestionCategory, QuestionId, Role, Sequence,
    User, UserId,
};
use eventqa_core::{DomainError, Result};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_id: i64,
    users: BTreeMap<UserId, User>,
    events: BTreeMap<EventId, Event>,
    participants: Vec<Participant>,
    invites: BTreeMap<InviteId, Invite>,
    categories: BTreeMap<CategoryId, QuestionCategory>,
    questions: BTreeMap<QuestionId, Question>,
    askers: Vec<(QuestionId, UserId, DateTime<Utc>)>,
}

impl MemoryState {
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn duplicate(constraint: &str) -> DomainError {
    DomainError::storage(format!("duplicate key value violates unique constraint \"{constraint}\""))
}

/// In-memory database with snapshot-on-begin, write-back-on-commit semantics.
///
/// # Example
///
/// ```
/// use eventqa_testing::MemoryDatabase;
/// use eventqa_core::store::{Database, Session};
///
/// # async fn example() -> eventqa_core::Result<()> {
/// let db = MemoryDatabase::new();
/// let user = db.seed_user("a@x.com", Some("Ada"), None);
///
/// let mut session = db.begin().await?;
/// assert_eq!(session.user_by_email("a@x.com").await?, Some(user));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

#[allow(clippy::unwrap_used, clippy::missing_panics_doc)] // Test infrastructure uses unwrap for simplicity
impl MemoryDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Insert a registered user directly.
    pub fn seed_user(&self, email: &str, first_name: Option<&str>, last_name: Option<&str>) -> User {
        let mut state = self.state();
        let user = User {
            id: UserId::new(state.next_id()),
            email: email.to_string(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            is_registered: true,
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Insert a membership row directly.
    pub fn seed_participant(&self, event_id: EventId, user_id: UserId, role: Role) {
        self.state().participants.push(Participant { event_id, user_id, role });
    }

    /// Committed users.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.state().users.values().cloned().collect()
    }

    /// Committed membership rows.
    #[must_use]
    pub fn participants(&self) -> Vec<Participant> {
        self.state().participants.clone()
    }

    /// Committed invites.
    #[must_use]
    pub fn invites(&self) -> Vec<Invite> {
        self.state().invites.values().cloned().collect()
    }

    /// Committed questions by id.
    #[must_use]
    pub fn questions(&self) -> Vec<Question> {
        self.state().questions.values().cloned().collect()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> Result<Box<dyn Session>> {
        let snapshot = self
            .state
            .lock()
            .map_err(|_| DomainError::storage("memory store lock poisoned"))?
            .clone();
        Ok(Box::new(MemorySession { working: snapshot, shared: Arc::clone(&self.state) }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

struct MemorySession {
    working: MemoryState,
    shared: Arc<Mutex<MemoryState>>,
}

impl MemorySession {
    fn detach_category(&mut self, id: CategoryId) {
        for question in self.working.questions.values_mut() {
            if question.category_id == Some(id) {
                question.category_id = None;
            }
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn commit(self: Box<Self>) -> Result<()> {
        let Self { working, shared } = *self;
        let mut committed = shared
            .lock()
            .map_err(|_| DomainError::storage("memory store lock poisoned"))?;
        *committed = working;
        Ok(())
    }

    // Users

    async fn user_by_id(&mut self, id: UserId) -> Result<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self.working.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_unregistered_user(&mut self, email: &str) -> Result<User> {
        if self.working.users.values().any(|u| u.email == email) {
            return Err(duplicate("users_email_key"));
        }
        let user = User {
            id: UserId::new(self.working.next_id()),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            is_registered: false,
        };
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    // Events

    async fn insert_event(&mut self, details: &EventDetails) -> Result<Event> {
        let event = Event::from_details(EventId::new(self.working.next_id()), details.clone());
        self.working.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn event_by_id(&mut self, id: EventId) -> Result<Option<Event>> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn events_for_user(&mut self, user_id: UserId, role: Option<Role>) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .working
            .events
            .values()
            .filter(|event| {
                self.working.participants.iter().any(|p| {
                    p.event_id == event.id
                        && p.user_id == user_id
                        && role.is_none_or(|role| p.role == role)
                })
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn update_event(&mut self, id: EventId, details: &EventDetails) -> Result<Option<Event>> {
        let Some(event) = self.working.events.get_mut(&id) else {
            return Ok(None);
        };
        *event = Event::from_details(id, details.clone());
        Ok(Some(event.clone()))
    }

    async fn delete_event(&mut self, id: EventId) -> Result<()> {
        let state = &mut self.working;
        state.events.remove(&id);
        state.participants.retain(|p| p.event_id != id);
        state.invites.retain(|_, i| i.event_id != id);
        state.categories.retain(|_, c| c.event_id != id);
        let removed: Vec<QuestionId> = state
            .questions
            .values()
            .filter(|q| q.event_id == id)
            .map(|q| q.id)
            .collect();
        state.questions.retain(|_, q| q.event_id != id);
        state.askers.retain(|(question_id, _, _)| !removed.contains(question_id));
        Ok(())
    }

    // Participants

    async fn participant_roles(&mut self, event_id: EventId, user_id: UserId) -> Result<Vec<Role>> {
        Ok(self
            .working
            .participants
            .iter()
            .filter(|p| p.event_id == event_id && p.user_id == user_id)
            .map(|p| p.role)
            .collect())
    }

    async fn participants_of_event(&mut self, event_id: EventId) -> Result<Vec<Participant>> {
        Ok(self
            .working
            .participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .copied()
            .collect())
    }

    async fn insert_participant(&mut self, participant: Participant) -> Result<()> {
        if self.working.participants.contains(&participant) {
            return Err(duplicate("participants_pkey"));
        }
        self.working.participants.push(participant);
        Ok(())
    }

    // Invites

    async fn insert_invite(&mut self, invite: &NewInvite) -> Result<Invite> {
        let state = &mut self.working;
        if state.invites.values().any(|i| i.token == invite.token) {
            return Err(duplicate("invites_token_key"));
        }
        if state
            .invites
            .values()
            .any(|i| i.event_id == invite.event_id && i.email == invite.email)
        {
            return Err(duplicate("invites_event_id_email_key"));
        }
        let stored = Invite {
            id: InviteId::new(state.next_id()),
            event_id: invite.event_id,
            email: invite.email.clone(),
            role: invite.role,
            token: invite.token.clone(),
            status: InviteStatus::Pending,
            user_id: invite.user_id,
        };
        state.invites.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn invite_by_id(&mut self, id: InviteId) -> Result<Option<Invite>> {
        Ok(self.working.invites.get(&id).cloned())
    }

    async fn invite_by_token(&mut self, token: &str) -> Result<Option<Invite>> {
        Ok(self.working.invites.values().find(|i| i.token == token).cloned())
    }

    async fn invite_by_event_and_email(
        &mut self,
        event_id: EventId,
        email: &str,
    ) -> Result<Option<Invite>> {
        Ok(self
            .working
            .invites
            .values()
            .find(|i| i.event_id == event_id && i.email == email)
            .cloned())
    }

    async fn invites(&mut self, filter: InviteFilter) -> Result<Vec<Invite>> {
        Ok(self
            .working
            .invites
            .values()
            .filter(|i| filter.event_id.is_none_or(|id| i.event_id == id))
            .filter(|i| filter.user_id.is_none_or(|id| i.user_id == Some(id)))
            .filter(|i| filter.status.is_none_or(|status| i.status == status))
            .cloned()
            .collect())
    }

    async fn update_invite_response(
        &mut self,
        id: InviteId,
        status: InviteStatus,
        user_id: UserId,
    ) -> Result<Invite> {
        let invite = self
            .working
            .invites
            .get_mut(&id)
            .ok_or_else(|| DomainError::storage(format!("invite {id} vanished")))?;
        invite.status = status;
        invite.user_id = Some(user_id);
        Ok(invite.clone())
    }

    async fn delete_invite(&mut self, id: InviteId) -> Result<()> {
        self.working.invites.remove(&id);
        Ok(())
    }

    // Question categories

    async fn categories_of_event(&mut self, event_id: EventId) -> Result<Vec<QuestionCategory>> {
        let mut categories: Vec<QuestionCategory> = self
            .working
            .categories
            .values()
            .filter(|c| c.event_id == event_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| (c.display_order, c.id));
        Ok(categories)
    }

    async fn category_by_id(
        &mut self,
        event_id: EventId,
        id: CategoryId,
    ) -> Result<Option<QuestionCategory>> {
        Ok(self.working.categories.get(&id).filter(|c| c.event_id == event_id).cloned())
    }

    async fn max_category_order(&mut self, event_id: EventId) -> Result<Option<i32>> {
        Ok(self
            .working
            .categories
            .values()
            .filter(|c| c.event_id == event_id)
            .map(|c| c.display_order)
            .max())
    }

    async fn insert_category(
        &mut self,
        event_id: EventId,
        name: &str,
        display_order: i32,
        now: DateTime<Utc>,
    ) -> Result<QuestionCategory> {
        let category = QuestionCategory {
            id: CategoryId::new(self.working.next_id()),
            event_id,
            name: name.to_string(),
            display_order,
            created_at: now,
            updated_at: now,
        };
        self.working.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn save_category(&mut self, category: &QuestionCategory) -> Result<()> {
        if let Some(stored) = self.working.categories.get_mut(&category.id) {
            stored.name.clone_from(&category.name);
            stored.display_order = category.display_order;
            stored.updated_at = category.updated_at;
        }
        Ok(())
    }

    async fn delete_category(&mut self, event_id: EventId, id: CategoryId) -> Result<()> {
        let owned = self.working.categories.get(&id).is_some_and(|c| c.event_id == event_id);
        if owned {
            self.working.categories.remove(&id);
            self.detach_category(id);
        }
        Ok(())
    }

    // Questions

    async fn max_question_order(
        &mut self,
        event_id: EventId,
        sequence: Sequence,
    ) -> Result<Option<i32>> {
        Ok(self
            .working
            .questions
            .values()
            .filter(|q| q.event_id == event_id)
            .filter_map(|q| match sequence {
                Sequence::Published if q.is_published => q.published_order,
                Sequence::Draft if !q.is_published => q.draft_order,
                _ => None,
            })
            .max())
    }

    async fn insert_question(&mut self, question: &NewQuestion) -> Result<Question> {
        let stored = Question {
            id: QuestionId::new(self.working.next_id()),
            event_id: question.event_id,
            user_id: question.user_id,
            category_id: question.category_id,
            question_text: question.question_text.clone(),
            answer_text: question.answer_text.clone(),
            is_published: question.is_published,
            published_order: question.published_order,
            draft_order: question.draft_order,
            created_at: question.created_at,
            updated_at: question.created_at,
            published_at: question.published_at,
        };
        self.working.questions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn question_by_id(
        &mut self,
        event_id: EventId,
        id: QuestionId,
    ) -> Result<Option<Question>> {
        Ok(self.working.questions.get(&id).filter(|q| q.event_id == event_id).cloned())
    }

    async fn questions_of_event(
        &mut self,
        event_id: EventId,
        published_only: bool,
    ) -> Result<Vec<Question>> {
        Ok(self
            .working
            .questions
            .values()
            .filter(|q| q.event_id == event_id && (q.is_published || !published_only))
            .cloned()
            .collect())
    }

    async fn save_question(&mut self, question: &Question) -> Result<()> {
        if let Some(stored) = self.working.questions.get_mut(&question.id) {
            *stored = question.clone();
        }
        Ok(())
    }

    async fn delete_question(&mut self, event_id: EventId, id: QuestionId) -> Result<()> {
        let owned = self.working.questions.get(&id).is_some_and(|q| q.event_id == event_id);
        if owned {
            self.working.questions.remove(&id);
            self.working.askers.retain(|(question_id, _, _)| *question_id != id);
        }
        Ok(())
    }

    async fn askers_of(&mut self, question_id: QuestionId) -> Result<Vec<UserId>> {
        Ok(self
            .working
            .askers
            .iter()
            .filter(|(q, _, _)| *q == question_id)
            .map(|(_, user_id, _)| *user_id)
            .collect())
    }

    async fn add_asker(
        &mut self,
        question_id: QuestionId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.working.askers.iter().any(|(q, u, _)| *q == question_id && *u == user_id) {
            return Err(duplicate("question_askers_pkey"));
        }
        self.working.askers.push((question_id, user_id, now));
        Ok(())
    }

    async fn replace_askers(
        &mut self,
        question_id: QuestionId,
        user_ids: &[UserId],
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.working.askers.retain(|(q, _, _)| *q != question_id);
        for user_id in user_ids {
            self.add_asker(question_id, *user_id, now).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn uncommitted_sessions_roll_back() {
        let db = MemoryDatabase::new();
        {
            let mut session = db.begin().await.unwrap();
            session.insert_unregistered_user("a@x.com").await.unwrap();
        }
        assert!(db.users().is_empty());

        let mut session = db.begin().await.unwrap();
        session.insert_unregistered_user("a@x.com").await.unwrap();
        session.commit().await.unwrap();
        assert_eq!(db.users().len(), 1);
    }

    #[tokio::test]
    async fn unique_constraints_are_enforced() {
        let db = MemoryDatabase::new();
        db.seed_user("a@x.com", None, None);
        let mut session = db.begin().await.unwrap();
        assert!(matches!(
            session.insert_unregistered_user("a@x.com").await,
            Err(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_category_detaches_its_questions() {
        let db = MemoryDatabase::new();
        let mut session = db.begin().await.unwrap();
        let now = Utc::now();
        let event_id = EventId::new(99);
        let category = session.insert_category(event_id, "General", 1, now).await.unwrap();
        let question = session
            .insert_question(&NewQuestion {
                event_id,
                user_id: None,
                category_id: Some(category.id),
                question_text: "Why?".into(),
                answer_text: None,
                is_published: false,
                published_order: None,
                draft_order: Some(1),
                created_at: now,
                published_at: None,
            })
            .await
            .unwrap();

        session.delete_category(event_id, category.id).await.unwrap();
        let reloaded = session.question_by_id(event_id, question.id).await.unwrap().unwrap();
        assert_eq!(reloaded.category_id, None);
    }
}
