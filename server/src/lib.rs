//! Event Q&A server.
//!
//! Wires the PostgreSQL store, the mailers and the Axum router into a
//! runnable binary. Configuration comes from the environment (see
//! [`config::Config`]).

pub mod config;
pub mod mail;
pub mod metrics;

pub use config::Config;
