//! Persistence contracts
//!
//! The service layer reads and writes whole session documents through
//! [`SessionStore`]. Queries are expressed with [`SessionFilter`], which every
//! backend must be able to evaluate: status membership, creator and
//! participant membership, and inclusive interval overlap.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    model::{Role, Session, SessionStatus, User},
    overlap::TimeRange,
};

/// Predicate over sessions; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    /// Status must be one of these
    pub statuses: Option<Vec<SessionStatus>>,
    /// Status must not be any of these
    pub excluded_statuses: Vec<SessionStatus>,
    pub created_by: Option<Uuid>,
    pub participant: Option<Uuid>,
    /// Interval must overlap this range (inclusive)
    pub overlapping: Option<TimeRange>,
    pub exclude_id: Option<Uuid>,
}

impl SessionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(mut self, statuses: &[SessionStatus]) -> Self {
        self.statuses = Some(statuses.to_vec());
        self
    }

    pub fn without_statuses(mut self, statuses: &[SessionStatus]) -> Self {
        self.excluded_statuses = statuses.to_vec();
        self
    }

    pub fn created_by(mut self, user_id: Uuid) -> Self {
        self.created_by = Some(user_id);
        self
    }

    pub fn participant(mut self, user_id: Uuid) -> Self {
        self.participant = Some(user_id);
        self
    }

    pub fn overlapping(mut self, range: TimeRange) -> Self {
        self.overlapping = Some(range);
        self
    }

    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude_id = Some(id);
        self
    }

    /// Evaluate the filter against an in-memory session
    pub fn matches(&self, session: &Session) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&session.status) {
                return false;
            }
        }
        if self.excluded_statuses.contains(&session.status) {
            return false;
        }
        if self.created_by.is_some_and(|id| id != session.created_by) {
            return false;
        }
        if self
            .participant
            .is_some_and(|id| !session.has_participant(id))
        {
            return false;
        }
        if self
            .overlapping
            .is_some_and(|range| !range.overlaps(&session.range()))
        {
            return false;
        }
        if self.exclude_id == Some(session.id) {
            return false;
        }
        true
    }
}

/// Session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>>;

    /// Any one session matching `filter`
    async fn find_one(&self, filter: &SessionFilter) -> Result<Option<Session>>;

    /// All sessions matching `filter`, ordered by start time
    async fn find_many(&self, filter: &SessionFilter) -> Result<Vec<Session>>;

    async fn insert(&self, session: &Session) -> Result<Session>;

    /// Replace the stored document with `session`.
    ///
    /// Participants are owned by [`SessionStore::append_participant`] and are
    /// left as stored, so a concurrent registration is never overwritten. The
    /// write applies only if the stored participants still fit within
    /// `session.maximum_participants`. Returns `None` when that condition
    /// fails or the session no longer exists.
    async fn save(&self, session: &Session) -> Result<Option<Session>>;

    /// Remove a session, returning whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Conditionally append `user_id` to the participants of session `id`.
    ///
    /// The write applies only if, at write time, the session is upcoming, has
    /// fewer participants than its maximum, and does not already list
    /// `user_id`. Returns the updated session, or `None` when the condition
    /// did not hold (or the session no longer exists).
    async fn append_participant(&self, id: Uuid, user_id: Uuid) -> Result<Option<Session>>;
}

/// User persistence for admin operations
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    /// Set a user's role, returning the updated user if it exists
    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<User>>;

    /// Remove a user, returning whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
