//! `PostgreSQL` implementation of the [`Database`] / [`Session`] seam.

use crate::rows::{
    CategoryRow, EventRow, InviteRow, ParticipantRow, QuestionRow, RoleRow, UserRow,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventqa_core::store::{Database, Session};
use eventqa_core::types::{
    CategoryId, Event, EventDetails, EventId, Invite, InviteFilter, InviteId, InviteStatus,
    NewInvite, NewQuestion, Participant, Question, QuestionCategory, QuestionId, Role, Sequence,
    User, UserId,
};
use eventqa_core::{DomainError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::storage(format!("{context}: {e}"))
}

/// Pool settings for [`PgDatabase::connect`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Upper bound of open connections.
    pub max_connections: u32,
    /// Connections kept open when idle.
    pub min_connections: u32,
    /// How long to wait for a connection.
    pub connect_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self { max_connections: 10, min_connections: 1, connect_timeout: Duration::from_secs(30) }
    }
}

/// `PostgreSQL`-backed [`Database`].
///
/// # Example
///
/// ```no_run
/// use eventqa_postgres::{PgDatabase, PoolOptions};
///
/// # async fn example() -> eventqa_core::Result<()> {
/// let database = PgDatabase::connect("postgres://localhost/eventqa", &PoolOptions::default()).await?;
/// database.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Storage`] if the database cannot be reached.
    pub async fn connect(database_url: &str, options: &PoolOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .acquire_timeout(options.connect_timeout)
            .connect(database_url)
            .await
            .map_err(db_error("Failed to connect"))?;
        Ok(Self::new(pool))
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> Result<Box<dyn Session>> {
        let tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        Ok(Box::new(PgSession { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("Database unreachable"))?;
        Ok(())
    }
}

/// One open transaction. Dropping it without commit rolls back.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Session for PgSession {
    async fn commit(self: Box<Self>) -> Result<()> {
        let outcome = self.tx.commit().await.map_err(db_error("Failed to commit"));
        let label = if outcome.is_ok() { "committed" } else { "failed" };
        metrics::counter!("eventqa_db_transactions_total", "outcome" => label).increment(1);
        outcome
    }

    // ═══════════════════════════════════════════════════════════
    // Users
    // ═══════════════════════════════════════════════════════════

    async fn user_by_id(&mut self, id: UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, is_registered FROM users WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load user"))?;
        Ok(row.map(User::from))
    }

    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, is_registered FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load user"))?;
        Ok(row.map(User::from))
    }

    async fn insert_unregistered_user(&mut self, email: &str) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (email, is_registered)
            VALUES ($1, FALSE)
            RETURNING id, email, first_name, last_name, is_registered
            ",
        )
        .bind(email)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create user"))?;
        Ok(row.into())
    }

    // ═══════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════

    async fn insert_event(&mut self, details: &EventDetails) -> Result<Event> {
        let row: EventRow = sqlx::query_as(
            r"
            INSERT INTO events (title, description, start_time, end_time, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, start_time, end_time, address
            ",
        )
        .bind(&details.title)
        .bind(&details.description)
        .bind(details.start_time)
        .bind(details.end_time)
        .bind(&details.address)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create event"))?;
        Ok(row.into())
    }

    async fn event_by_id(&mut self, id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(
            "SELECT id, title, description, start_time, end_time, address FROM events WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load event"))?;
        Ok(row.map(Event::from))
    }

    async fn events_for_user(&mut self, user_id: UserId, role: Option<Role>) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r"
            SELECT DISTINCT e.id, e.title, e.description, e.start_time, e.end_time, e.address
            FROM events e
            JOIN participants p ON p.event_id = e.id
            WHERE p.user_id = $1 AND ($2::TEXT IS NULL OR p.role = $2)
            ORDER BY e.start_time, e.id
            ",
        )
        .bind(user_id.get())
        .bind(role.map(Role::as_str))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list events"))?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn update_event(&mut self, id: EventId, details: &EventDetails) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(
            r"
            UPDATE events
            SET title = $2, description = $3, start_time = $4, end_time = $5, address = $6
            WHERE id = $1
            RETURNING id, title, description, start_time, end_time, address
            ",
        )
        .bind(id.get())
        .bind(&details.title)
        .bind(&details.description)
        .bind(details.start_time)
        .bind(details.end_time)
        .bind(&details.address)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update event"))?;
        Ok(row.map(Event::from))
    }

    async fn delete_event(&mut self, id: EventId) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete event"))?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Participants
    // ═══════════════════════════════════════════════════════════

    async fn participant_roles(&mut self, event_id: EventId, user_id: UserId) -> Result<Vec<Role>> {
        let rows: Vec<RoleRow> = sqlx::query_as(
            "SELECT role FROM participants WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load membership"))?;
        rows.into_iter().map(Role::try_from).collect()
    }

    async fn participants_of_event(&mut self, event_id: EventId) -> Result<Vec<Participant>> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(
            "SELECT event_id, user_id, role FROM participants WHERE event_id = $1 ORDER BY user_id",
        )
        .bind(event_id.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list participants"))?;
        rows.into_iter().map(Participant::try_from).collect()
    }

    async fn insert_participant(&mut self, participant: Participant) -> Result<()> {
        sqlx::query("INSERT INTO participants (event_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(participant.event_id.get())
            .bind(participant.user_id.get())
            .bind(participant.role.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to add participant"))?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Invites
    // ═══════════════════════════════════════════════════════════

    async fn insert_invite(&mut self, invite: &NewInvite) -> Result<Invite> {
        let row: InviteRow = sqlx::query_as(
            r"
            INSERT INTO invites (event_id, email, role, token, status, user_id)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING id, event_id, email, role, token, status, user_id
            ",
        )
        .bind(invite.event_id.get())
        .bind(&invite.email)
        .bind(invite.role.as_str())
        .bind(&invite.token)
        .bind(invite.user_id.map(UserId::get))
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            // Two hosts inviting the same email concurrently
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::conflict("An invitation has already been sent");
                }
            }
            DomainError::storage(format!("Failed to create invite: {e}"))
        })?;
        row.try_into()
    }

    async fn invite_by_id(&mut self, id: InviteId) -> Result<Option<Invite>> {
        let row: Option<InviteRow> = sqlx::query_as(
            "SELECT id, event_id, email, role, token, status, user_id FROM invites WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load invite"))?;
        row.map(Invite::try_from).transpose()
    }

    async fn invite_by_token(&mut self, token: &str) -> Result<Option<Invite>> {
        let row: Option<InviteRow> = sqlx::query_as(
            "SELECT id, event_id, email, role, token, status, user_id FROM invites WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load invite"))?;
        row.map(Invite::try_from).transpose()
    }

    async fn invite_by_event_and_email(
        &mut self,
        event_id: EventId,
        email: &str,
    ) -> Result<Option<Invite>> {
        let row: Option<InviteRow> = sqlx::query_as(
            r"
            SELECT id, event_id, email, role, token, status, user_id
            FROM invites
            WHERE event_id = $1 AND email = $2
            ",
        )
        .bind(event_id.get())
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load invite"))?;
        row.map(Invite::try_from).transpose()
    }

    async fn invites(&mut self, filter: InviteFilter) -> Result<Vec<Invite>> {
        let rows: Vec<InviteRow> = sqlx::query_as(
            r"
            SELECT id, event_id, email, role, token, status, user_id
            FROM invites
            WHERE ($1::BIGINT IS NULL OR event_id = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
            ORDER BY id
            ",
        )
        .bind(filter.event_id.map(EventId::get))
        .bind(filter.user_id.map(UserId::get))
        .bind(filter.status.map(InviteStatus::as_str))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list invites"))?;
        rows.into_iter().map(Invite::try_from).collect()
    }

    async fn update_invite_response(
        &mut self,
        id: InviteId,
        status: InviteStatus,
        user_id: UserId,
    ) -> Result<Invite> {
        let row: InviteRow = sqlx::query_as(
            r"
            UPDATE invites SET status = $2, user_id = $3
            WHERE id = $1
            RETURNING id, event_id, email, role, token, status, user_id
            ",
        )
        .bind(id.get())
        .bind(status.as_str())
        .bind(user_id.get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update invite"))?;
        row.try_into()
    }

    async fn delete_invite(&mut self, id: InviteId) -> Result<()> {
        sqlx::query("DELETE FROM invites WHERE id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete invite"))?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Question categories
    // ═══════════════════════════════════════════════════════════

    async fn categories_of_event(&mut self, event_id: EventId) -> Result<Vec<QuestionCategory>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r"
            SELECT id, event_id, name, display_order, created_at, updated_at
            FROM question_categories
            WHERE event_id = $1
            ORDER BY display_order, id
            ",
        )
        .bind(event_id.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list categories"))?;
        Ok(rows.into_iter().map(QuestionCategory::from).collect())
    }

    async fn category_by_id(
        &mut self,
        event_id: EventId,
        id: CategoryId,
    ) -> Result<Option<QuestionCategory>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r"
            SELECT id, event_id, name, display_order, created_at, updated_at
            FROM question_categories
            WHERE id = $1 AND event_id = $2
            ",
        )
        .bind(id.get())
        .bind(event_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load category"))?;
        Ok(row.map(QuestionCategory::from))
    }

    async fn max_category_order(&mut self, event_id: EventId) -> Result<Option<i32>> {
        sqlx::query_scalar("SELECT MAX(display_order) FROM question_categories WHERE event_id = $1")
            .bind(event_id.get())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_error("Failed to read category order"))
    }

    async fn insert_category(
        &mut self,
        event_id: EventId,
        name: &str,
        display_order: i32,
        now: DateTime<Utc>,
    ) -> Result<QuestionCategory> {
        let row: CategoryRow = sqlx::query_as(
            r"
            INSERT INTO question_categories (event_id, name, display_order, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, event_id, name, display_order, created_at, updated_at
            ",
        )
        .bind(event_id.get())
        .bind(name)
        .bind(display_order)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create category"))?;
        Ok(row.into())
    }

    async fn save_category(&mut self, category: &QuestionCategory) -> Result<()> {
        sqlx::query(
            "UPDATE question_categories SET name = $2, display_order = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(category.id.get())
        .bind(&category.name)
        .bind(category.display_order)
        .bind(category.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update category"))?;
        Ok(())
    }

    async fn delete_category(&mut self, event_id: EventId, id: CategoryId) -> Result<()> {
        // ON DELETE SET NULL detaches the category's questions.
        sqlx::query("DELETE FROM question_categories WHERE id = $1 AND event_id = $2")
            .bind(id.get())
            .bind(event_id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete category"))?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Questions
    // ═══════════════════════════════════════════════════════════

    async fn max_question_order(
        &mut self,
        event_id: EventId,
        sequence: Sequence,
    ) -> Result<Option<i32>> {
        let query = match sequence {
            Sequence::Published => {
                "SELECT MAX(published_order) FROM questions WHERE event_id = $1 AND is_published"
            }
            Sequence::Draft => {
                "SELECT MAX(draft_order) FROM questions WHERE event_id = $1 AND NOT is_published"
            }
        };
        sqlx::query_scalar(query)
            .bind(event_id.get())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_error("Failed to read question order"))
    }

    async fn insert_question(&mut self, question: &NewQuestion) -> Result<Question> {
        let row: QuestionRow = sqlx::query_as(
            r"
            INSERT INTO questions (
                event_id, user_id, category_id, question_text, answer_text,
                is_published, published_order, draft_order, created_at, updated_at, published_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9, $10)
            RETURNING id, event_id, user_id, category_id, question_text, answer_text,
                      is_published, published_order, draft_order, created_at, updated_at, published_at
            ",
        )
        .bind(question.event_id.get())
        .bind(question.user_id.map(UserId::get))
        .bind(question.category_id.map(CategoryId::get))
        .bind(&question.question_text)
        .bind(&question.answer_text)
        .bind(question.is_published)
        .bind(question.published_order)
        .bind(question.draft_order)
        .bind(question.created_at)
        .bind(question.published_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("Failed to create question"))?;
        Ok(row.into())
    }

    async fn question_by_id(
        &mut self,
        event_id: EventId,
        id: QuestionId,
    ) -> Result<Option<Question>> {
        let row: Option<QuestionRow> = sqlx::query_as(
            r"
            SELECT id, event_id, user_id, category_id, question_text, answer_text,
                   is_published, published_order, draft_order, created_at, updated_at, published_at
            FROM questions
            WHERE id = $1 AND event_id = $2
            ",
        )
        .bind(id.get())
        .bind(event_id.get())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to load question"))?;
        Ok(row.map(Question::from))
    }

    async fn questions_of_event(
        &mut self,
        event_id: EventId,
        published_only: bool,
    ) -> Result<Vec<Question>> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            r"
            SELECT id, event_id, user_id, category_id, question_text, answer_text,
                   is_published, published_order, draft_order, created_at, updated_at, published_at
            FROM questions
            WHERE event_id = $1 AND (is_published OR NOT $2)
            ",
        )
        .bind(event_id.get())
        .bind(published_only)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to list questions"))?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn save_question(&mut self, question: &Question) -> Result<()> {
        sqlx::query(
            r"
            UPDATE questions
            SET category_id = $2, question_text = $3, answer_text = $4, is_published = $5,
                published_order = $6, draft_order = $7, updated_at = $8, published_at = $9
            WHERE id = $1
            ",
        )
        .bind(question.id.get())
        .bind(question.category_id.map(CategoryId::get))
        .bind(&question.question_text)
        .bind(&question.answer_text)
        .bind(question.is_published)
        .bind(question.published_order)
        .bind(question.draft_order)
        .bind(question.updated_at)
        .bind(question.published_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update question"))?;
        Ok(())
    }

    async fn delete_question(&mut self, event_id: EventId, id: QuestionId) -> Result<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1 AND event_id = $2")
            .bind(id.get())
            .bind(event_id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to delete question"))?;
        Ok(())
    }

    async fn askers_of(&mut self, question_id: QuestionId) -> Result<Vec<UserId>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT user_id FROM question_askers WHERE question_id = $1 ORDER BY id")
                .bind(question_id.get())
                .fetch_all(&mut *self.tx)
                .await
                .map_err(db_error("Failed to list askers"))?;
        Ok(ids.into_iter().map(UserId::new).collect())
    }

    async fn add_asker(
        &mut self,
        question_id: QuestionId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO question_askers (question_id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(question_id.get())
            .bind(user_id.get())
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to record asker"))?;
        Ok(())
    }

    async fn replace_askers(
        &mut self,
        question_id: QuestionId,
        user_ids: &[UserId],
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("DELETE FROM question_askers WHERE question_id = $1")
            .bind(question_id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("Failed to clear askers"))?;
        for user_id in user_ids {
            self.add_asker(question_id, *user_id, now).await?;
        }
        Ok(())
    }
}
