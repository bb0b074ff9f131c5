//! Draft and published question sequences.
//!
//! Each event keeps two independent integer sequences: one ranking draft
//! (unpublished) questions and one ranking published questions. New questions
//! are appended to the end of their sequence; hosts rearrange both through a
//! bulk reorder whose values are taken as given.

use crate::error::{DomainError, Result};
use crate::types::{CategoryId, Question, QuestionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Message for publishing a question that has no answer.
pub const PUBLISH_REQUIRES_ANSWER: &str = "Published questions must include an answer";

/// The position after the current maximum, or 1 for an empty sequence.
#[must_use]
pub fn next_order(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0).saturating_add(1)
}

/// Fail unless a question about to be published has an answer.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when `publish` is set and `has_answer` is not.
pub fn ensure_publishable(publish: bool, has_answer: bool) -> Result<()> {
    if publish && !has_answer {
        return Err(DomainError::validation(PUBLISH_REQUIRES_ANSWER));
    }
    Ok(())
}

/// One entry of a bulk reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    /// Question to move.
    pub question_id: QuestionId,
    /// New publish flag.
    pub is_published: bool,
    /// New category, `None` to detach.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// New published position.
    #[serde(default)]
    pub published_order: Option<i32>,
    /// New draft position.
    #[serde(default)]
    pub draft_order: Option<i32>,
}

/// Set the publish flag and maintain `published_at`.
///
/// `published_at` is stamped only on the first publish and cleared when the
/// question goes back to draft.
pub fn set_published(question: &mut Question, publish: bool, now: DateTime<Utc>) {
    if publish {
        if question.published_at.is_none() {
            question.published_at = Some(now);
        }
    } else {
        question.published_at = None;
    }
    question.is_published = publish;
}

/// Apply one reorder entry to a loaded question.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when the entry publishes a question
/// without a stored answer; the question is left untouched.
pub fn apply_reorder(question: &mut Question, item: &ReorderItem, now: DateTime<Utc>) -> Result<()> {
    ensure_publishable(item.is_published, question.has_answer())?;

    set_published(question, item.is_published, now);
    question.category_id = item.category_id;
    question.published_order = item.published_order;
    question.draft_order = item.draft_order;
    question.updated_at = now;
    Ok(())
}

fn nulls_last(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Listing order: published first, then published order, then draft order
/// (missing values last), then id.
#[must_use]
pub fn listing_cmp(a: &Question, b: &Question) -> Ordering {
    b.is_published
        .cmp(&a.is_published)
        .then_with(|| nulls_last(a.published_order, b.published_order))
        .then_with(|| nulls_last(a.draft_order, b.draft_order))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort questions into listing order.
pub fn sort_for_listing(questions: &mut [Question]) {
    questions.sort_by(listing_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventId;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn question(id: i64, answer: Option<&str>) -> Question {
        Question {
            id: QuestionId::new(id),
            event_id: EventId::new(1),
            user_id: None,
            category_id: None,
            question_text: format!("q{id}"),
            answer_text: answer.map(str::to_string),
            is_published: false,
            published_order: None,
            draft_order: Some(1),
            created_at: at(0),
            updated_at: at(0),
            published_at: None,
        }
    }

    fn publish(id: i64, order: i32) -> ReorderItem {
        ReorderItem {
            question_id: QuestionId::new(id),
            is_published: true,
            category_id: None,
            published_order: Some(order),
            draft_order: None,
        }
    }

    #[test]
    fn next_order_starts_at_one() {
        assert_eq!(next_order(None), 1);
        assert_eq!(next_order(Some(4)), 5);
    }

    #[test]
    fn publishing_without_answer_is_rejected_and_leaves_question_untouched() {
        let mut q = question(1, Some(""));
        let before = q.clone();
        let result = apply_reorder(&mut q, &publish(1, 1), at(1));
        assert_eq!(result, Err(DomainError::validation(PUBLISH_REQUIRES_ANSWER)));
        assert_eq!(q, before);
    }

    #[test]
    fn published_at_is_stamped_once_and_cleared_on_unpublish() {
        let mut q = question(1, Some("yes"));
        apply_reorder(&mut q, &publish(1, 1), at(1)).unwrap();
        assert_eq!(q.published_at, Some(at(1)));

        apply_reorder(&mut q, &publish(1, 2), at(2)).unwrap();
        assert_eq!(q.published_at, Some(at(1)));
        assert_eq!(q.published_order, Some(2));
        assert_eq!(q.updated_at, at(2));

        let unpublish = ReorderItem { is_published: false, draft_order: Some(3), ..publish(1, 0) };
        apply_reorder(&mut q, &unpublish, at(3)).unwrap();
        assert!(!q.is_published);
        assert_eq!(q.published_at, None);
        assert_eq!(q.draft_order, Some(3));
    }

    #[test]
    fn unpublishing_does_not_need_an_answer() {
        let mut q = question(1, None);
        let item = ReorderItem { is_published: false, draft_order: Some(7), ..publish(1, 1) };
        apply_reorder(&mut q, &item, at(1)).unwrap();
        assert_eq!(q.draft_order, Some(7));
    }

    #[test]
    fn listing_puts_published_first_and_missing_orders_last() {
        let mut draft_late = question(1, None);
        draft_late.draft_order = Some(2);
        let mut draft_early = question(2, None);
        draft_early.draft_order = Some(1);
        let mut unordered = question(3, None);
        unordered.draft_order = None;
        let mut published = question(4, Some("a"));
        published.is_published = true;
        published.published_order = Some(1);
        published.draft_order = None;

        let mut list = vec![draft_late, unordered, published, draft_early];
        sort_for_listing(&mut list);
        let ids: Vec<i64> = list.iter().map(|q| q.id.get()).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    proptest! {
        #[test]
        fn next_order_exceeds_every_existing_value(values in proptest::collection::vec(0i32..10_000, 0..50)) {
            let next = next_order(values.iter().copied().max());
            prop_assert!(values.iter().all(|v| *v < next));
            prop_assert!(next >= 1);
        }

        #[test]
        fn published_questions_always_precede_drafts(
            flags in proptest::collection::vec((any::<bool>(), proptest::option::of(0i32..20), proptest::option::of(0i32..20)), 0..30)
        ) {
            let mut list: Vec<Question> = flags
                .iter()
                .enumerate()
                .map(|(i, (published, p, d))| {
                    let mut q = question(i64::try_from(i).unwrap(), Some("a"));
                    q.is_published = *published;
                    q.published_order = *p;
                    q.draft_order = *d;
                    q
                })
                .collect();
            sort_for_listing(&mut list);
            let first_draft = list.iter().position(|q| !q.is_published).unwrap_or(list.len());
            prop_assert!(list[first_draft..].iter().all(|q| !q.is_published));
        }

        #[test]
        fn published_at_is_set_iff_published(ops in proptest::collection::vec(any::<bool>(), 1..20)) {
            let mut q = question(1, Some("a"));
            let mut first_publish = None;
            for (hour, publish_now) in ops.iter().enumerate() {
                let now = at(u32::try_from(hour).unwrap());
                set_published(&mut q, *publish_now, now);
                if *publish_now {
                    first_publish.get_or_insert(now);
                } else {
                    first_publish = None;
                }
                prop_assert_eq!(q.published_at, first_publish);
            }
        }
    }
}
