//! Router-level tests driving the HTTP API against the in-memory collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code uses unwrap for brevity

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use eventqa_core::invite::LinkBuilder;
use eventqa_core::types::{EventId, InviteStatus, Role};
use eventqa_testing::fixtures::{self, HostedEvent};
use eventqa_testing::{MemoryDatabase, MemoryIdentity, RecordingNotifier, test_clock};
use eventqa_web::{AppState, CORRELATION_ID_HEADER, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    db: MemoryDatabase,
    identity: MemoryIdentity,
    notifier: RecordingNotifier,
}

impl TestApp {
    fn new() -> Self {
        Self::with_notifier(RecordingNotifier::new())
    }

    fn with_notifier(notifier: RecordingNotifier) -> Self {
        eventqa_testing::init_tracing();
        let db = MemoryDatabase::new();
        let identity = MemoryIdentity::new();
        let state = AppState::new(
            Arc::new(db.clone()),
            Arc::new(identity.clone()),
            Arc::new(notifier.clone()),
            Arc::new(test_clock()),
            LinkBuilder::new("http://ui.test/"),
        );
        Self { router: build_router(state), db, identity, notifier }
    }

    async fn world(&self) -> (HostedEvent, String, String, String) {
        let world = fixtures::hosted_event(&self.db).await;
        let host = self.identity.issue(&world.host);
        let guest = self.identity.issue(&world.guest);
        let outsider = self.identity.issue(&world.outsider);
        (world, host, guest, outsider)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn invite(&self, host: &str, event_id: EventId, email: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/invites",
                Some(host),
                Some(json!({ "event_id": event_id, "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════
// Health and plumbing
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_responses_carry_correlation_id() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
}

// ═══════════════════════════════════════════════════════════
// Authentication
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_routes_require_a_bearer_token() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "Authentication required");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_bearer_token_is_rejected_everywhere() {
    let app = TestApp::new();
    let (world, ..) = app.world().await;

    let (status, _) = app.send(Method::GET, "/api/events", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/api/events/{}/questions", world.event_id);
    let (status, body) = app.send(Method::GET, &uri, Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "Invalid or expired token");
}

// ═══════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_event_makes_caller_host() {
    let app = TestApp::new();
    let (_, host, ..) = app.world().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/events",
            Some(&host),
            Some(json!({
                "title": "Launch",
                "description": "",
                "start_time": "2025-02-01T10:00:00Z",
                "end_time": "2025-02-01T12:00:00Z",
                "address": "Dock 4",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["hosts"], json!(["Hannah Host"]));
    assert_eq!(body["description"], Value::Null);

    let (status, body) = app.send(Method::GET, "/api/events?role=host", Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_event_with_end_before_start_is_rejected() {
    let app = TestApp::new();
    let (_, host, ..) = app.world().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/events",
            Some(&host),
            Some(json!({
                "title": "Backwards",
                "start_time": "2025-02-01T12:00:00Z",
                "end_time": "2025-02-01T10:00:00Z",
                "address": "Dock 4",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Event end time must not precede its start time");
}

#[tokio::test]
async fn test_event_visible_only_to_members() {
    let app = TestApp::new();
    let (world, _, guest, outsider) = app.world().await;
    let uri = format!("/api/events/{}", world.event_id);

    let (status, body) = app.send(Method::GET, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "All hands");

    let (status, _) = app.send(Method::GET, &uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_list_rejects_unknown_filters() {
    let app = TestApp::new();
    let (_, host, ..) = app.world().await;

    let (status, _) = app.send(Method::GET, "/api/events?time=someday", Some(&host), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::GET, "/api/events?role=owner", Some(&host), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::GET, "/api/events?time=upcoming", Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_hosts_update_and_delete_events() {
    let app = TestApp::new();
    let (world, host, guest, _) = app.world().await;
    let uri = format!("/api/events/{}", world.event_id);
    let details = json!({
        "title": "Renamed",
        "start_time": "2025-01-08T18:00:00Z",
        "end_time": "2025-01-08T20:00:00Z",
        "address": "1 Main St",
    });

    let (status, _) = app.send(Method::PUT, &uri, Some(&guest), Some(details.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.send(Method::PUT, &uri, Some(&host), Some(details)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");

    let (status, _) = app.send(Method::DELETE, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════
// Invites
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_invite_accept_flow_for_new_email() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;

    let invite = app.invite(&host, world.event_id, "b@x.com").await;
    assert_eq!(invite["status"], "pending");
    assert_eq!(invite["user_name"], "b@x.com");
    let token = invite["token"].as_str().unwrap().to_string();

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "b@x.com");
    assert_eq!(sent[0].event_title, "All hands");
    assert_eq!(sent[0].accept_link, format!("http://ui.test/events/token/{token}"));
    assert_eq!(sent[0].register_link, "http://ui.test/signup?email=b%40x.com");

    let uri = format!("/api/invites/{token}");
    let (status, body) =
        app.send(Method::PUT, &uri, None, Some(json!({ "status": "accepted" }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "accepted");

    let user = app.db.users().into_iter().find(|u| u.email == "b@x.com").unwrap();
    assert!(!user.is_registered);
    assert!(app.db.participants().iter().any(|p| {
        p.event_id == world.event_id && p.user_id == user.id && p.role == Role::Participant
    }));
    let stored = app.db.invites().into_iter().find(|i| i.token == token).unwrap();
    assert_eq!(stored.status, InviteStatus::Accepted);
    assert_eq!(stored.user_id, Some(user.id));

    let (status, body) =
        app.send(Method::PUT, &uri, None, Some(json!({ "status": "declined" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Invalid or expired invite");
}

#[tokio::test]
async fn test_invite_response_with_bad_status_changes_nothing() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    let invite = app.invite(&host, world.event_id, "c@x.com").await;
    let uri = format!("/api/invites/{}", invite["token"].as_str().unwrap());

    let (status, body) = app.send(Method::PUT, &uri, None, Some(json!({ "status": "maybe" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Invalid status");
    assert!(app.db.users().iter().all(|u| u.email != "c@x.com"));
}

#[tokio::test]
async fn test_duplicate_invite_conflicts() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    app.invite(&host, world.event_id, "b@x.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/invites",
            Some(&host),
            Some(json!({ "event_id": world.event_id, "email": "b@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(message(&body), "An invitation has already been sent");
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_only_hosts_invite() {
    let app = TestApp::new();
    let (world, _, guest, _) = app.world().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/invites",
            Some(&guest),
            Some(json!({ "event_id": world.event_id, "email": "b@x.com", "role": "host" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Not authorized");
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_failed_email_keeps_invite() {
    let app = TestApp::with_notifier(RecordingNotifier::failing());
    let (world, host, ..) = app.world().await;

    let invite = app.invite(&host, world.event_id, "b@x.com").await;
    assert_eq!(invite["email"], "b@x.com");
    assert_eq!(app.db.invites().len(), 1);
}

#[tokio::test]
async fn test_list_and_delete_invites() {
    let app = TestApp::new();
    let (world, host, guest, _) = app.world().await;
    let invite = app.invite(&host, world.event_id, "b@x.com").await;

    let uri = format!("/api/invites?event_id={}&status=pending", world.event_id);
    let (status, body) = app.send(Method::GET, &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::GET, "/api/invites?status=bogus", Some(&host), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/invites/{}", invite["id"]);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.db.invites().is_empty());

    let (status, body) = app.send(Method::DELETE, &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Invite not found");
}

// ═══════════════════════════════════════════════════════════
// Invite holders
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_public_event_and_participants_by_token() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    let invite = app.invite(&host, world.event_id, "b@x.com").await;
    let token = invite["token"].as_str().unwrap();

    let (status, body) =
        app.send(Method::GET, &format!("/api/public/events/token/{token}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(world.event_id));

    let uri = format!("/api/public/events/token/{token}/participants?role=host");
    let (status, body) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": world.host.id, "name": "Hannah Host", "role": "host" }]));

    let (status, body) =
        app.send(Method::GET, "/api/public/events/token/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Invalid or expired invite token");
}

#[tokio::test]
async fn test_participants_listing_requires_membership() {
    let app = TestApp::new();
    let (world, _, guest, outsider) = app.world().await;
    let uri = format!("/api/events/{}/participants", world.event_id);

    let (status, body) = app.send(Method::GET, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    let roles: Vec<&str> =
        body.as_array().unwrap().iter().map(|p| p["role"].as_str().unwrap()).collect();
    assert_eq!(roles, ["host", "participant"]);

    let (status, _) = app.send(Method::GET, &uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ═══════════════════════════════════════════════════════════
// Questions
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_anonymous_token_caller_cannot_publish() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    let invite = app.invite(&host, world.event_id, "b@x.com").await;
    let uri = format!("/api/events/{}/questions", world.event_id);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            None,
            Some(json!({
                "question_text": "Q?",
                "answer_text": "A",
                "is_published": true,
                "invite_token": invite["token"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Anonymous users cannot publish questions");
    assert!(app.db.questions().is_empty());
}

#[tokio::test]
async fn test_anonymous_token_caller_asks_a_draft() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    let invite = app.invite(&host, world.event_id, "b@x.com").await;
    let uri = format!("/api/events/{}/questions", world.event_id);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            None,
            Some(json!({ "question_text": "Is there parking?", "invite_token": invite["token"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user_id"], Value::Null);
    assert_eq!(body["draft_order"], 1);
    assert_eq!(body["published_order"], Value::Null);
    assert_eq!(body["asker_user_ids"], json!([]));
}

#[tokio::test]
async fn test_question_creation_without_credentials() {
    let app = TestApp::new();
    let (world, _, _, outsider) = app.world().await;
    let uri = format!("/api/events/{}/questions", world.event_id);
    let body = json!({ "question_text": "Hello?" });

    let (status, _) = app.send(Method::POST, &uri, None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, response) = app.send(Method::POST, &uri, Some(&outsider), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&response), "Only event participants can ask questions");

    let (status, response) = app
        .send(
            Method::POST,
            &uri,
            None,
            Some(json!({ "question_text": "Hello?", "invite_token": "bogus" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&response), "Invalid or expired invite token");
}

#[tokio::test]
async fn test_published_create_requires_answer() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    let uri = format!("/api/events/{}/questions", world.event_id);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&host),
            Some(json!({ "question_text": "Q?", "answer_text": "  ", "is_published": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Published questions must include an answer");
    assert!(app.db.questions().is_empty());
}

#[tokio::test]
async fn test_non_hosts_only_see_published_questions() {
    let app = TestApp::new();
    let (world, host, guest, _) = app.world().await;
    let uri = format!("/api/events/{}/questions", world.event_id);

    app.send(Method::POST, &uri, Some(&guest), Some(json!({ "question_text": "Draft?" }))).await;
    let (status, _) = app
        .send(
            Method::POST,
            &uri,
            Some(&host),
            Some(json!({ "question_text": "Public?", "answer_text": "Yes", "is_published": true })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app.send(Method::GET, &uri, Some(&host), None).await;
    let texts: Vec<&str> =
        body.as_array().unwrap().iter().map(|q| q["question_text"].as_str().unwrap()).collect();
    assert_eq!(texts, ["Public?", "Draft?"]);

    let (_, body) = app.send(Method::GET, &uri, Some(&guest), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let invite = app.invite(&host, world.event_id, "b@x.com").await;
    let token_uri = format!("{uri}?invite_token={}", invite["token"].as_str().unwrap());
    let (status, body) = app.send(Method::GET, &token_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message(&body), "Authentication required");
}

#[tokio::test]
async fn test_reorder_batch_fails_atomically() {
    let app = TestApp::new();
    let (world, host, guest, _) = app.world().await;
    let uri = format!("/api/events/{}/questions", world.event_id);

    let (_, answered) = app
        .send(
            Method::POST,
            &uri,
            Some(&host),
            Some(json!({ "question_text": "One", "answer_text": "Yes" })),
        )
        .await;
    let (_, unanswered) =
        app.send(Method::POST, &uri, Some(&guest), Some(json!({ "question_text": "Two" }))).await;

    let order = json!({
        "items": [
            { "question_id": answered["id"], "is_published": true, "published_order": 1 },
            { "question_id": unanswered["id"], "is_published": true, "published_order": 2 },
        ]
    });
    let order_uri = format!("{uri}/order");

    let (status, _) = app.send(Method::PUT, &order_uri, Some(&guest), Some(order.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::PUT, &order_uri, Some(&host), Some(order)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Published questions must include an answer");
    assert!(app.db.questions().iter().all(|q| !q.is_published && q.published_at.is_none()));

    let publish_one = json!({
        "items": [{ "question_id": answered["id"], "is_published": true, "published_order": 1 }]
    });
    let (status, _) = app.send(Method::PUT, &order_uri, Some(&host), Some(publish_one)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let published: Vec<_> = app.db.questions().into_iter().filter(|q| q.is_published).collect();
    assert_eq!(published.len(), 1);
    assert!(published[0].published_at.is_some());
}

#[tokio::test]
async fn test_update_and_delete_questions_are_host_only() {
    let app = TestApp::new();
    let (world, host, guest, _) = app.world().await;
    let uri = format!("/api/events/{}/questions", world.event_id);
    let (_, question) =
        app.send(Method::POST, &uri, Some(&guest), Some(json!({ "question_text": "Typo?" }))).await;
    let question_uri = format!("{uri}/{}", question["id"]);

    let (status, body) = app
        .send(Method::PUT, &question_uri, Some(&guest), Some(json!({ "question_text": "Fixed?" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Only hosts can update questions");

    let (status, body) = app
        .send(
            Method::PUT,
            &question_uri,
            Some(&host),
            Some(json!({ "question_text": "Fixed?", "asker_user_ids": [world.guest.id, world.host.id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["question_text"], "Fixed?");
    assert_eq!(body["asker_user_ids"], json!([world.guest.id, world.host.id]));

    let (status, _) = app.send(Method::DELETE, &question_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::DELETE, &question_uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send(Method::DELETE, &question_uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Question not found");
}

// ═══════════════════════════════════════════════════════════
// Question categories
// ═══════════════════════════════════════════════════════════

#[tokio::test]
async fn test_category_lifecycle() {
    let app = TestApp::new();
    let (world, host, guest, _) = app.world().await;
    let uri = format!("/api/events/{}/question-categories", world.event_id);

    let (status, body) =
        app.send(Method::POST, &uri, Some(&guest), Some(json!({ "name": "Logistics" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Only hosts can manage question categories");

    let (_, logistics) =
        app.send(Method::POST, &uri, Some(&host), Some(json!({ "name": "Logistics" }))).await;
    let (status, agenda) =
        app.send(Method::POST, &uri, Some(&host), Some(json!({ "name": "Agenda" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(logistics["display_order"], 1);
    assert_eq!(agenda["display_order"], 2);

    let order = json!({
        "items": [
            { "category_id": logistics["id"], "display_order": 2 },
            { "category_id": agenda["id"], "display_order": 1 },
        ]
    });
    let (status, body) =
        app.send(Method::PUT, &format!("{uri}/order"), Some(&host), Some(order)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> =
        body.as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Agenda", "Logistics"]);

    let category_uri = format!("{uri}/{}", agenda["id"]);
    let (status, body) = app
        .send(Method::PUT, &category_uri, Some(&host), Some(json!({ "name": "Program" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Program");

    let (status, body) = app.send(Method::GET, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.send(Method::DELETE, &category_uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.send(Method::GET, &uri, Some(&host), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_question_with_foreign_category_is_rejected() {
    let app = TestApp::new();
    let (world, host, ..) = app.world().await;
    let other = fixtures::hosted_event_named(&app.db, "Other").await;
    let other_host = app.identity.issue(&other.host);

    let (_, category) = app
        .send(
            Method::POST,
            &format!("/api/events/{}/question-categories", other.event_id),
            Some(&other_host),
            Some(json!({ "name": "Elsewhere" })),
        )
        .await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/events/{}/questions", world.event_id),
            Some(&host),
            Some(json!({ "question_text": "Q?", "category_id": category["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Invalid category for this event");
}
