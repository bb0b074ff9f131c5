//! Axum HTTP layer for the Event Q&A backend.
//!
//! Handlers are a thin shell around the operations in
//! [`eventqa_core::service`]:
//!
//! 1. **Extract** the caller (bearer token, invite token) and the request body
//! 2. **Begin** a transaction on the [`AppState`] database
//! 3. **Run** the operation on it
//! 4. **Commit** and map the result (or the [`AppError`]) to a response
//!
//! # Example
//!
//! ```ignore
//! use eventqa_web::{AppState, build_router};
//!
//! let app = build_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{AuthUser, MaybeUser};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use routes::{build_router, cors_layer};
pub use state::AppState;

