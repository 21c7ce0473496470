//! Session, actor and user models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{feedback::Feedback, overlap::TimeRange};

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Awaiting a coordinator decision
    Proposal,
    /// Declined by a coordinator (terminal)
    Rejected,
    /// Accepted and open for registration
    Upcoming,
    Ongoing,
    /// Finished (terminal)
    Completed,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 5] = [
        SessionStatus::Proposal,
        SessionStatus::Rejected,
        SessionStatus::Upcoming,
        SessionStatus::Ongoing,
        SessionStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Proposal => "proposal",
            SessionStatus::Rejected => "rejected",
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown session status: {}", s))
    }
}

/// Role of an authenticated actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    EventCoordinator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::EventCoordinator => "event-coordinator",
            Role::Admin => "admin",
        }
    }

    /// Resolve a single role from a list of role claims.
    ///
    /// Unknown names are ignored; the most privileged known role wins and an
    /// empty or unrecognised list falls back to [`Role::User`].
    pub fn from_claims<S: AsRef<str>>(claims: &[S]) -> Role {
        claims
            .iter()
            .filter_map(|claim| claim.as_ref().parse::<Role>().ok())
            .max_by_key(|role| match role {
                Role::User => 0,
                Role::EventCoordinator => 1,
                Role::Admin => 2,
            })
            .unwrap_or(Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "event-coordinator" => Ok(Role::EventCoordinator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Authenticated caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// Session entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub maximum_participants: u32,
    pub status: SessionStatus,
    pub created_by: Uuid,
    pub participants: Vec<Uuid>,
    pub feedbacks: Vec<Feedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Build a fresh proposal owned by `created_by`
    pub fn proposal(created_by: Uuid, new_session: NewSession) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new_session.title,
            description: new_session.description,
            time_start: new_session.time_start,
            time_end: new_session.time_end,
            maximum_participants: new_session.maximum_participants,
            status: SessionStatus::Proposal,
            created_by,
            participants: Vec::new(),
            feedbacks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.time_start,
            end: self.time_end,
        }
    }

    /// Current participant count
    pub fn occupancy(&self) -> usize {
        self.participants.len()
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }
}

/// New session creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub title: String,
    pub description: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub maximum_participants: u32,
}

/// Session update payload; `None` keeps the current value
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub maximum_participants: Option<u32>,
}

/// User entity as seen by admin operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
