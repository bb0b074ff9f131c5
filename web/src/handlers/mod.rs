//! HTTP request handlers, one module per resource.
//!
//! Every handler opens one transaction, runs a single service operation on
//! it and commits on success. Returning early drops the session, which rolls
//! the transaction back.

pub mod categories;
pub mod events;
pub mod health;
pub mod invites;
pub mod participants;
pub mod public;
pub mod questions;

use serde::Deserialize;

/// `?invite_token=` on routes that accept anonymous invite holders.
#[derive(Debug, Default, Deserialize)]
pub struct InviteTokenQuery {
    /// Invite token, if the caller has no account.
    pub invite_token: Option<String>,
}

/// `?role=` filter on participant listings.
#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    /// `host` or `participant`.
    pub role: Option<String>,
}
