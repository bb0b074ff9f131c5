//! Application state for Axum handlers.

use axum::extract::FromRef;
use eventqa_core::environment::{Clock, IdentityProvider, InviteNotifier};
use eventqa_core::invite::LinkBuilder;
use eventqa_core::store::Database;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Every collaborator sits behind an `Arc`, so cloning per request is cheap.
/// Tests build it from the in-memory implementations in `eventqa-testing`.
#[derive(Clone)]
pub struct AppState {
    /// Transaction provider.
    pub database: Arc<dyn Database>,
    /// Bearer token lookup.
    pub identity: Arc<dyn IdentityProvider>,
    /// Invite email delivery.
    pub notifier: Arc<dyn InviteNotifier>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Builds the links placed in invite emails.
    pub links: Arc<LinkBuilder>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        database: Arc<dyn Database>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn InviteNotifier>,
        clock: Arc<dyn Clock>,
        links: LinkBuilder,
    ) -> Self {
        Self { database, identity, notifier, clock, links: Arc::new(links) }
    }
}

impl FromRef<AppState> for Arc<dyn Database> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.database)
    }
}

impl FromRef<AppState> for Arc<dyn IdentityProvider> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.identity)
    }
}
