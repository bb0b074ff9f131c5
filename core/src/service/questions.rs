//! Question operations.

use super::load_event;
use crate::access::{self, AUTHENTICATION_REQUIRED, Caller, Credentials};
use crate::environment::Clock;
use crate::error::{DomainError, Result};
use crate::ordering::{self, PUBLISH_REQUIRES_ANSWER, ReorderItem};
use crate::store::Session;
use crate::types::{
    CategoryId, EventId, NewQuestion, Question, QuestionId, Sequence, UserId, has_text,
};
use crate::views::QuestionOut;
use serde::Deserialize;

const QUESTION_NOT_FOUND: &str = "Question not found";
const INVALID_CATEGORY: &str = "Invalid category for this event";

/// Body of a question creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateQuestion {
    /// The question.
    pub question_text: String,
    /// Answer, hosts only.
    #[serde(default)]
    pub answer_text: Option<String>,
    /// Category within the same event.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Publish immediately, hosts only.
    #[serde(default)]
    pub is_published: bool,
    /// Invite token for callers without an account.
    #[serde(default)]
    pub invite_token: Option<String>,
}

/// Body of a question edit request. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateQuestion {
    /// New question text.
    #[serde(default)]
    pub question_text: Option<String>,
    /// New answer text.
    #[serde(default)]
    pub answer_text: Option<String>,
    /// Replacement list of askers, in order.
    #[serde(default)]
    pub asker_user_ids: Option<Vec<UserId>>,
}

/// Body of a bulk reorder request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReorderQuestions {
    /// Entries applied in order.
    pub items: Vec<ReorderItem>,
}

async fn question_out(session: &mut dyn Session, question: Question) -> Result<QuestionOut> {
    let askers = session.askers_of(question.id).await?;
    Ok(QuestionOut::new(question, askers))
}

async fn load_question(
    session: &mut dyn Session,
    event_id: EventId,
    question_id: QuestionId,
) -> Result<Question> {
    session
        .question_by_id(event_id, question_id)
        .await?
        .ok_or_else(|| DomainError::not_found(QUESTION_NOT_FOUND))
}

async fn ensure_category(
    session: &mut dyn Session,
    event_id: EventId,
    category_id: Option<CategoryId>,
) -> Result<()> {
    if let Some(category_id) = category_id {
        if session.category_by_id(event_id, category_id).await?.is_none() {
            return Err(DomainError::validation(INVALID_CATEGORY));
        }
    }
    Ok(())
}

/// Explain why a caller without standing may not ask a question.
async fn rejection(
    session: &mut dyn Session,
    event_id: EventId,
    credentials: &Credentials,
) -> Result<DomainError> {
    let Some(token) = credentials.invite_token.as_deref() else {
        return Ok(if credentials.is_signed_in() {
            DomainError::forbidden("Only event participants can ask questions")
        } else {
            DomainError::unauthorized(AUTHENTICATION_REQUIRED)
        });
    };
    Ok(match session.invite_by_token(token).await? {
        None => DomainError::forbidden("Invalid or expired invite token"),
        Some(invite) if invite.event_id != event_id => {
            DomainError::forbidden("Invite token does not match event")
        }
        // Resolution would have accepted this token.
        Some(_) => DomainError::unauthorized(AUTHENTICATION_REQUIRED),
    })
}

/// Questions of an event in listing order.
///
/// Hosts see every question; other members and token holders see only
/// published ones.
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
) -> Result<Vec<QuestionOut>> {
    load_event(session, event_id).await?;
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_reader(&caller)?;

    let mut questions = session.questions_of_event(event_id, !caller.is_host()).await?;
    ordering::sort_for_listing(&mut questions);

    let mut out = Vec::with_capacity(questions.len());
    for question in questions {
        out.push(question_out(session, question).await?);
    }
    Ok(out)
}

/// Ask a question, or for hosts, add an answered and published one.
///
/// The question is appended to the end of its sequence. Signed-in askers
/// are recorded; token holders ask anonymously.
///
/// # Errors
///
/// - `NotFound` when the event does not exist
/// - `Unauthorized` / `Forbidden` when the caller may not ask or publish
/// - `Validation` for a published question without answer or a foreign category
#[tracing::instrument(skip(session, clock, credentials, request), fields(published = request.is_published))]
pub async fn create(
    session: &mut dyn Session,
    clock: &dyn Clock,
    credentials: &Credentials,
    event_id: EventId,
    request: CreateQuestion,
) -> Result<QuestionOut> {
    load_event(session, event_id).await?;
    let caller = access::resolve(session, event_id, credentials).await?;

    match caller {
        Caller::Host { .. } => {}
        Caller::Participant { .. } if request.is_published => {
            return Err(DomainError::forbidden("Only hosts can publish questions"));
        }
        Caller::AnonymousViaToken { .. } if request.is_published => {
            return Err(DomainError::forbidden("Anonymous users cannot publish questions"));
        }
        Caller::Participant { .. } | Caller::AnonymousViaToken { .. } => {}
        Caller::Unauthenticated => return Err(rejection(session, event_id, credentials).await?),
    }

    if request.question_text.trim().is_empty() {
        return Err(DomainError::validation("Question text must not be empty"));
    }
    ordering::ensure_publishable(request.is_published, has_text(request.answer_text.as_deref()))?;
    ensure_category(session, event_id, request.category_id).await?;

    let sequence = Sequence::for_published(request.is_published);
    let next = ordering::next_order(session.max_question_order(event_id, sequence).await?);
    let (published_order, draft_order) = match sequence {
        Sequence::Published => (Some(next), None),
        Sequence::Draft => (None, Some(next)),
    };

    let now = clock.now();
    let asker = caller.member_id();
    let question = session
        .insert_question(&NewQuestion {
            event_id,
            user_id: asker,
            category_id: request.category_id,
            question_text: request.question_text,
            answer_text: request.answer_text,
            is_published: request.is_published,
            published_order,
            draft_order,
            created_at: now,
            published_at: request.is_published.then_some(now),
        })
        .await?;

    if let Some(user_id) = asker {
        session.add_asker(question.id, user_id, now).await?;
    }

    let kind = if asker.is_some() { "member" } else { "anonymous" };
    metrics::counter!("eventqa_questions_created_total", "asker" => kind).increment(1);
    tracing::info!(question_id = %question.id, "Question created");
    question_out(session, question).await
}

/// Apply a host's bulk reorder.
///
/// Items are applied in order; the first failing item aborts the whole batch
/// (the caller must not commit).
///
/// # Errors
///
/// - `Unauthorized` / `Forbidden` for non-hosts
/// - `NotFound` for a question outside the event
/// - `Validation` when publishing a question without answer or using a foreign category
#[tracing::instrument(skip(session, clock, credentials, request), fields(items = request.items.len()))]
pub async fn reorder(
    session: &mut dyn Session,
    clock: &dyn Clock,
    credentials: &Credentials,
    event_id: EventId,
    request: ReorderQuestions,
) -> Result<()> {
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_host(&caller, credentials, "Only hosts can reorder questions")?;

    let now = clock.now();
    for item in &request.items {
        let mut question = load_question(session, event_id, item.question_id).await?;
        ensure_category(session, event_id, item.category_id).await?;
        ordering::apply_reorder(&mut question, item, now)?;
        session.save_question(&question).await?;
    }

    metrics::counter!("eventqa_question_reorders_total").increment(1);
    tracing::info!("Questions reordered");
    Ok(())
}

/// Edit a question's text, answer or askers.
///
/// Repeated asker ids are collapsed, keeping the first occurrence.
///
/// # Errors
///
/// - `Unauthorized` / `Forbidden` for non-hosts
/// - `NotFound` for a question outside the event
/// - `Validation` for askers outside the event or an emptied answer on a published question
#[tracing::instrument(skip(session, clock, credentials, request))]
pub async fn update(
    session: &mut dyn Session,
    clock: &dyn Clock,
    credentials: &Credentials,
    event_id: EventId,
    question_id: QuestionId,
    request: UpdateQuestion,
) -> Result<QuestionOut> {
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_host(&caller, credentials, "Only hosts can update questions")?;
    let mut question = load_question(session, event_id, question_id).await?;

    if let Some(text) = request.question_text {
        question.question_text = text;
    }
    if let Some(answer) = request.answer_text {
        question.answer_text = Some(answer);
    }
    if question.is_published && !question.has_answer() {
        return Err(DomainError::validation(PUBLISH_REQUIRES_ANSWER));
    }

    let now = clock.now();
    if let Some(requested) = request.asker_user_ids {
        // First occurrence wins.
        let mut askers: Vec<UserId> = Vec::with_capacity(requested.len());
        for user_id in requested {
            if !askers.contains(&user_id) {
                askers.push(user_id);
            }
        }
        for user_id in &askers {
            if !access::is_participant(session, event_id, *user_id).await? {
                return Err(DomainError::validation(format!(
                    "User {user_id} is not a participant of this event"
                )));
            }
        }
        session.replace_askers(question.id, &askers, now).await?;
    }

    question.updated_at = now;
    session.save_question(&question).await?;
    tracing::info!("Question updated");
    question_out(session, question).await
}

/// Delete a question.
///
/// # Errors
///
/// - `Unauthorized` / `Forbidden` for non-hosts
/// - `NotFound` for a question outside the event
#[tracing::instrument(skip(session, credentials))]
pub async fn delete(
    session: &mut dyn Session,
    credentials: &Credentials,
    event_id: EventId,
    question_id: QuestionId,
) -> Result<()> {
    let caller = access::resolve(session, event_id, credentials).await?;
    access::require_host(&caller, credentials, "Only hosts can delete questions")?;
    let question = load_question(session, event_id, question_id).await?;

    session.delete_question(event_id, question.id).await?;
    tracing::info!("Question deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_to_unpublished_draft() {
        let request: CreateQuestion =
            serde_json::from_str(r#"{"question_text": "Why?"}"#).unwrap();
        assert!(!request.is_published);
        assert_eq!(request.answer_text, None);
        assert_eq!(request.invite_token, None);
    }

    #[test]
    fn reorder_request_accepts_sparse_items() {
        let request: ReorderQuestions = serde_json::from_str(
            r#"{"items": [{"question_id": 4, "is_published": false, "draft_order": 2}]}"#,
        )
        .unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].published_order, None);
        assert_eq!(request.items[0].draft_order, Some(2));
    }
}
