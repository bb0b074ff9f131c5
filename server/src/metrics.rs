//! Prometheus metrics for the Event Q&A server.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `eventqa_events_created_total` - Events created
//! - `eventqa_invites_created_total{role}` - Invites sent by role
//! - `eventqa_invite_responses_total{status}` - Invite responses by status
//! - `eventqa_invite_emails_total{outcome}` - Invite email deliveries (sent, failed)
//! - `eventqa_questions_created_total{asker}` - Questions by asker kind
//! - `eventqa_question_reorders_total` - Bulk question reorders
//! - `eventqa_db_transactions_total{outcome}` - Committed database transactions
//! - `eventqa_http_responses_total{method,status}` - HTTP responses

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be started.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();
    tracing::info!(addr = %addr, "Metrics exporter listening");
    Ok(())
}

/// Register descriptions for every metric the server records.
pub fn register_metrics() {
    describe_counter!("eventqa_events_created_total", "Total number of events created");
    describe_counter!(
        "eventqa_invites_created_total",
        "Total number of invites created by role (host, participant)"
    );
    describe_counter!(
        "eventqa_invite_responses_total",
        "Total number of invite responses by status (accepted, declined)"
    );
    describe_counter!(
        "eventqa_invite_emails_total",
        "Total number of invite emails by outcome (sent, failed)"
    );
    describe_counter!(
        "eventqa_questions_created_total",
        "Total number of questions created by asker kind (member, anonymous)"
    );
    describe_counter!("eventqa_question_reorders_total", "Total number of bulk question reorders");
    describe_counter!(
        "eventqa_db_transactions_total",
        "Total number of database transactions by outcome (committed, failed)"
    );
    describe_counter!(
        "eventqa_http_responses_total",
        "Total number of HTTP responses by method and status"
    );
}
