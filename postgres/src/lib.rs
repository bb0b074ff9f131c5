//! `PostgreSQL` storage for the Event Q&A backend.
//!
//! Implements the [`eventqa_core::store::Database`] seam on a `sqlx` pool:
//! every request runs inside one transaction that the handler commits.
//! Also provides the bearer-token [`PgIdentityProvider`].
//!
//! # Example
//!
//! ```no_run
//! use eventqa_postgres::{PgDatabase, PgIdentityProvider, PoolOptions};
//!
//! # async fn example() -> eventqa_core::Result<()> {
//! let database = PgDatabase::connect("postgres://localhost/eventqa", &PoolOptions::default()).await?;
//! database.migrate().await?;
//! let identity = PgIdentityProvider::new(database.pool().clone());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod database;
mod identity;
mod rows;

pub use database::{PgDatabase, PgSession, PoolOptions};
pub use identity::{PgIdentityProvider, hash_token};
