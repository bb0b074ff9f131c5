//! # Event Q&A Testing
//!
//! Testing utilities for the Event Q&A backend.
//!
//! This crate provides:
//! - [`MemoryDatabase`]: an in-memory [`Database`](eventqa_core::store::Database)
//!   with real commit/rollback semantics
//! - Mock implementations of the environment traits
//! - Fixtures for common scenarios
//!
//! ## Example
//!
//! ```ignore
//! use eventqa_testing::{MemoryDatabase, fixtures};
//!
//! #[tokio::test]
//! async fn host_sees_drafts() {
//!     let db = MemoryDatabase::new();
//!     let world = fixtures::hosted_event(&db).await;
//!     // ...
//! }
//! ```

mod memory_store;

pub use memory_store::MemoryDatabase;

use chrono::{DateTime, Utc};
use eventqa_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use async_trait::async_trait;
    use eventqa_core::environment::{IdentityProvider, InviteEmail, InviteNotifier};
    use eventqa_core::types::User;
    use eventqa_core::{DomainError, Result};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use eventqa_testing::mocks::FixedClock;
    /// use eventqa_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Identity provider backed by a token map.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryIdentity {
        tokens: Arc<Mutex<HashMap<String, User>>>,
    }

    impl MemoryIdentity {
        /// Create an empty identity provider.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Issue a bearer token for `user` and return it.
        #[must_use]
        #[allow(clippy::unwrap_used)]
        pub fn issue(&self, user: &User) -> String {
            let token = format!("test-token-{}", user.id);
            self.tokens.lock().unwrap().insert(token.clone(), user.clone());
            token
        }
    }

    #[async_trait]
    impl IdentityProvider for MemoryIdentity {
        async fn authenticate(&self, bearer: &str) -> Result<Option<User>> {
            let tokens = self
                .tokens
                .lock()
                .map_err(|_| DomainError::storage("identity map lock poisoned"))?;
            Ok(tokens.get(bearer).cloned())
        }
    }

    /// Notifier that records every invite email.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNotifier {
        sent: Arc<Mutex<Vec<InviteEmail>>>,
        fail: bool,
    }

    impl RecordingNotifier {
        /// A notifier whose deliveries succeed.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A notifier whose deliveries fail after being recorded.
        #[must_use]
        pub fn failing() -> Self {
            Self { fail: true, ..Self::default() }
        }

        /// Every email handed to this notifier.
        #[must_use]
        #[allow(clippy::unwrap_used)]
        pub fn sent(&self) -> Vec<InviteEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InviteNotifier for RecordingNotifier {
        async fn send_invite_email(
            &self,
            email: &str,
            event_title: &str,
            accept_link: &str,
            register_link: &str,
        ) -> Result<()> {
            self.sent
                .lock()
                .map_err(|_| DomainError::Notification("notifier lock poisoned".into()))?
                .push(InviteEmail {
                    email: email.to_string(),
                    event_title: event_title.to_string(),
                    accept_link: accept_link.to_string(),
                    register_link: register_link.to_string(),
                });
            if self.fail {
                return Err(DomainError::Notification("relay refused the message".into()));
            }
            Ok(())
        }
    }
}

/// Fixtures for common scenarios.
pub mod fixtures {
    #![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

    use super::MemoryDatabase;
    use chrono::{Duration, TimeZone, Utc};
    use eventqa_core::service::events;
    use eventqa_core::store::Database;
    use eventqa_core::types::{EventDetails, EventId, Role, User};

    /// A hosted event with one host and one participant.
    #[derive(Debug, Clone)]
    pub struct HostedEvent {
        /// The event.
        pub event_id: EventId,
        /// Its host.
        pub host: User,
        /// A plain participant.
        pub guest: User,
        /// A registered user with no membership.
        pub outsider: User,
    }

    /// Event details starting a week after the test clock.
    #[must_use]
    pub fn event_details(title: &str) -> EventDetails {
        let start = Utc.with_ymd_and_hms(2025, 1, 8, 18, 0, 0).unwrap();
        EventDetails {
            title: title.to_string(),
            description: Some("Quarterly all-hands".to_string()),
            start_time: start,
            end_time: start + Duration::hours(2),
            address: "1 Main St".to_string(),
        }
    }

    /// Seed a host, a guest and an outsider, and an event joining the first two.
    pub async fn hosted_event(db: &MemoryDatabase) -> HostedEvent {
        let host = db.seed_user("host@x.com", Some("Hannah"), Some("Host"));
        let guest = db.seed_user("guest@x.com", Some("Gus"), None);
        let outsider = db.seed_user("outsider@x.com", None, None);
        seed_event(db, "All hands", host, guest, outsider).await
    }

    /// Like [`hosted_event`], with its own users so several events can coexist.
    pub async fn hosted_event_named(db: &MemoryDatabase, title: &str) -> HostedEvent {
        let slug = title.to_lowercase().replace(' ', "-");
        let host = db.seed_user(&format!("host.{slug}@x.com"), Some("Other"), Some("Host"));
        let guest = db.seed_user(&format!("guest.{slug}@x.com"), None, None);
        let outsider = db.seed_user(&format!("outsider.{slug}@x.com"), None, None);
        seed_event(db, title, host, guest, outsider).await
    }

    async fn seed_event(
        db: &MemoryDatabase,
        title: &str,
        host: User,
        guest: User,
        outsider: User,
    ) -> HostedEvent {
        let mut session = db.begin().await.unwrap();
        let event = events::create(session.as_mut(), host.id, event_details(title))
            .await
            .unwrap();
        session.commit().await.unwrap();
        db.seed_participant(event.id, guest.id, Role::Participant);

        HostedEvent { event_id: event.id, host, guest, outsider }
    }
}

/// Install a test subscriber once so `RUST_LOG` controls test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, MemoryIdentity, RecordingNotifier, test_clock};
