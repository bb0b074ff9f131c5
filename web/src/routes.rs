//! Router configuration.

use crate::handlers::{categories, events, health, invites, participants, public, questions};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete router.
///
/// `/health` and `/ready` sit at the root; everything else is nested under
/// `/api`. Requests are traced and tagged with a correlation ID.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Events
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/participants", get(participants::list_participants))
        // Questions
        .route(
            "/events/:id/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/events/:id/questions/order", put(questions::reorder_questions))
        .route(
            "/events/:id/questions/:question_id",
            put(questions::update_question).delete(questions::delete_question),
        )
        // Question categories
        .route(
            "/events/:id/question-categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/events/:id/question-categories/order", put(categories::reorder_categories))
        .route(
            "/events/:id/question-categories/:category_id",
            put(categories::update_category).delete(categories::delete_category),
        )
        // Invites
        .route("/invites", get(invites::list_invites).post(invites::create_invite))
        .route(
            "/invites/:key",
            put(invites::respond_to_invite).delete(invites::delete_invite),
        )
        // Invite holders
        .route("/public/events/token/:token", get(public::event_by_token))
        .route(
            "/public/events/token/:token/participants",
            get(public::participants_by_token),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}

/// CORS for the browser UI.
///
/// Restricted to `allowed_origin` when given, open otherwise.
#[must_use]
pub fn cors_layer(allowed_origin: Option<HeaderValue>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allowed_origin {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}
