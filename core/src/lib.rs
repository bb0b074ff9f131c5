//! # Event Q&A Core
//!
//! Domain types, access rules and operations for the Event Q&A backend.
//!
//! Hosts create events, invite people by email, and moderate a queue of
//! audience questions that can be drafted, answered, ordered and published.
//!
//! ## Layout
//!
//! - [`types`]: ids, roles, statuses and the stored records
//! - [`error`]: the [`DomainError`] taxonomy shared by every operation
//! - [`environment`]: injected collaborators (clock, identity, mail)
//! - [`store`]: the transactional [`store::Database`] / [`store::Session`] seam
//! - [`access`]: membership predicates and caller resolution
//! - [`ordering`]: draft/published sequences and listing order
//! - [`invite`]: invite status machine, tokens and links
//! - [`views`]: response payloads and display names
//! - [`service`]: the operations behind every route
//!
//! ## Example
//!
//! ```ignore
//! use eventqa_core::{access::Credentials, service::questions};
//!
//! let mut session = database.begin().await?;
//! let listed = questions::list(session.as_mut(), &credentials, event_id).await?;
//! session.commit().await?;
//! ```

pub mod access;
pub mod environment;
pub mod error;
pub mod invite;
pub mod ordering;
pub mod service;
pub mod store;
pub mod types;
pub mod views;

pub use error::{DomainError, Result};
