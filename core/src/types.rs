//! Ids, enumerations and the records kept by the store.

use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw database id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw database id.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a user account (registered or not).
    UserId
);
define_id!(
    /// Identifies an event.
    EventId
);
define_id!(
    /// Identifies an invite.
    InviteId
);
define_id!(
    /// Identifies a question.
    QuestionId
);
define_id!(
    /// Identifies a question category.
    CategoryId
);

// ═══════════════════════════════════════════════════════════
// Enumerations
// ═══════════════════════════════════════════════════════════

/// Role a user holds on an event. Hosts sort before participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage the event, its invites and its questions.
    Host,
    /// May read the event and ask questions.
    Participant,
}

impl Role {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Participant => "participant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(Self::Host),
            "participant" => Ok(Self::Participant),
            _ => Err(DomainError::validation(
                "Invalid role. Must be 'host' or 'participant'.",
            )),
        }
    }
}

/// Lifecycle state of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    /// Sent and not yet answered.
    Pending,
    /// Answered with yes.
    Accepted,
    /// Answered with no.
    Declined,
}

impl InviteStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InviteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            _ => Err(DomainError::validation("Invalid status")),
        }
    }
}

/// Parse the status filter for invite listings. `all` (or nothing) means no filter.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] for unknown values.
pub fn parse_status_filter(raw: Option<&str>) -> crate::Result<Option<InviteStatus>> {
    match raw {
        None | Some("all") => Ok(None),
        Some(other) => other.parse().map(Some).map_err(|_| {
            DomainError::validation(
                "Invalid status parameter. Must be 'pending', 'accepted', 'declined', or 'all'.",
            )
        }),
    }
}

/// Time window for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// Every event.
    #[default]
    All,
    /// Events that have not started yet.
    Upcoming,
    /// Events that have already ended.
    Past,
}

impl TimeFilter {
    /// Whether an event falls inside the window at `now`.
    #[must_use]
    pub fn admits(self, event: &Event, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => event.start_time > now,
            Self::Past => event.end_time < now,
        }
    }
}

impl FromStr for TimeFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "upcoming" => Ok(Self::Upcoming),
            "past" => Ok(Self::Past),
            _ => Err(DomainError::validation(
                "Invalid time parameter. Must be 'upcoming', 'past', or 'all'.",
            )),
        }
    }
}

/// Which of the two per-event question sequences a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// Order among unpublished questions.
    Draft,
    /// Order among published questions.
    Published,
}

impl Sequence {
    /// The sequence a question with the given publish flag lives in.
    #[must_use]
    pub const fn for_published(is_published: bool) -> Self {
        if is_published { Self::Published } else { Self::Draft }
    }
}

// ═══════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════

/// A user account. Unregistered accounts are created when an invite is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Unique email address.
    pub email: String,
    /// Given name, if known.
    pub first_name: Option<String>,
    /// Family name, if known.
    pub last_name: Option<String>,
    /// Whether the account completed registration.
    pub is_registered: bool,
}

/// Editable fields of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// When the event starts.
    pub start_time: DateTime<Utc>,
    /// When the event ends.
    pub end_time: DateTime<Utc>,
    /// Venue address.
    pub address: String,
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// When the event starts.
    pub start_time: DateTime<Utc>,
    /// When the event ends.
    pub end_time: DateTime<Utc>,
    /// Venue address.
    pub address: String,
}

impl Event {
    /// Build an event from its id and editable fields.
    #[must_use]
    pub fn from_details(id: EventId, details: EventDetails) -> Self {
        Self {
            id,
            title: details.title,
            description: details.description,
            start_time: details.start_time,
            end_time: details.end_time,
            address: details.address,
        }
    }
}

/// Membership of a user in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// The event.
    pub event_id: EventId,
    /// The member.
    pub user_id: UserId,
    /// The member's role.
    pub role: Role,
}

/// Fields of an invite before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvite {
    /// Target event.
    pub event_id: EventId,
    /// Invitee email.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
    /// Opaque access token.
    pub token: String,
    /// Linked account, when the email already belongs to one.
    pub user_id: Option<UserId>,
}

/// A stored invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    /// Invite id.
    pub id: InviteId,
    /// Target event.
    pub event_id: EventId,
    /// Invitee email.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
    /// Opaque access token, unique across invites.
    pub token: String,
    /// Lifecycle state.
    pub status: InviteStatus,
    /// Linked account.
    pub user_id: Option<UserId>,
}

/// Criteria for listing invites. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InviteFilter {
    /// Only invites for this event.
    pub event_id: Option<EventId>,
    /// Only invites linked to this user.
    pub user_id: Option<UserId>,
    /// Only invites in this state.
    pub status: Option<InviteStatus>,
}

/// A named group of questions within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCategory {
    /// Category id.
    pub id: CategoryId,
    /// Owning event.
    pub event_id: EventId,
    /// Display name.
    pub name: String,
    /// Position among the event's categories.
    pub display_order: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Fields of a question before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    /// Owning event.
    pub event_id: EventId,
    /// Registered asker, `None` for anonymous questions.
    pub user_id: Option<UserId>,
    /// Optional category within the same event.
    pub category_id: Option<CategoryId>,
    /// The question.
    pub question_text: String,
    /// The host's answer.
    pub answer_text: Option<String>,
    /// Visible to non-hosts.
    pub is_published: bool,
    /// Position in the published sequence.
    pub published_order: Option<i32>,
    /// Position in the draft sequence.
    pub draft_order: Option<i32>,
    /// Creation time, also used for `updated_at` and `published_at`.
    pub created_at: DateTime<Utc>,
    /// Publication time.
    pub published_at: Option<DateTime<Utc>>,
}

/// A stored question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question id.
    pub id: QuestionId,
    /// Owning event.
    pub event_id: EventId,
    /// Registered asker, `None` for anonymous questions.
    pub user_id: Option<UserId>,
    /// Optional category within the same event.
    pub category_id: Option<CategoryId>,
    /// The question.
    pub question_text: String,
    /// The host's answer.
    pub answer_text: Option<String>,
    /// Visible to non-hosts.
    pub is_published: bool,
    /// Position in the published sequence.
    pub published_order: Option<i32>,
    /// Position in the draft sequence.
    pub draft_order: Option<i32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Set the first time the question is published, cleared on unpublish.
    pub published_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Whether the question carries a non-empty answer.
    #[must_use]
    pub fn has_answer(&self) -> bool {
        has_text(self.answer_text.as_deref())
    }
}

/// `true` when `text` is present and non-empty.
#[must_use]
pub fn has_text(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.is_empty())
}
