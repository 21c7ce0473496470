//! Interval overlap detection
//!
//! Two sessions conflict when their closed intervals share at least one
//! instant. Touching endpoints count: a session ending at 20:00 conflicts with
//! one starting at 20:00.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{SessionError, SessionResult},
    model::Session,
    store::{SessionFilter, SessionStore},
};

/// Closed time interval `[start, end]` with `end > start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted intervals
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SessionResult<Self> {
        if end <= start {
            return Err(SessionError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        intervals_overlap(self, other)
    }
}

/// Inclusive overlap test: `a.start <= b.end && b.start <= a.end`
pub fn intervals_overlap(a: &TimeRange, b: &TimeRange) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Which of an actor's sessions a new interval is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapScope {
    /// Sessions the actor proposed
    CreatedBy(Uuid),
    /// Sessions the actor is registered for
    Participant(Uuid),
}

impl OverlapScope {
    fn filter(self, range: TimeRange, exclude: Option<Uuid>) -> SessionFilter {
        let filter = match self {
            OverlapScope::CreatedBy(user_id) => SessionFilter::new().created_by(user_id),
            OverlapScope::Participant(user_id) => SessionFilter::new().participant(user_id),
        };
        let filter = filter.overlapping(range);
        match exclude {
            Some(id) => filter.excluding(id),
            None => filter,
        }
    }
}

/// Find any session in `scope` whose interval overlaps `range`.
///
/// `exclude` skips one session id, used when a session is checked against
/// its owner's other sessions during an edit.
pub async fn find_conflict(
    store: &dyn SessionStore,
    scope: OverlapScope,
    range: TimeRange,
    exclude: Option<Uuid>,
) -> SessionResult<Option<Session>> {
    let conflict = store.find_one(&scope.filter(range, exclude)).await?;
    if let Some(session) = &conflict {
        debug!(
            "Interval {} - {} conflicts with session {} ({:?})",
            range.start, range.end, session.id, scope
        );
    }
    Ok(conflict)
}

/// Fail with [`SessionError::Conflict`] when [`find_conflict`] finds a match
pub async fn ensure_no_conflict(
    store: &dyn SessionStore,
    scope: OverlapScope,
    range: TimeRange,
    exclude: Option<Uuid>,
) -> SessionResult<()> {
    match find_conflict(store, scope, range, exclude).await? {
        Some(session) => Err(SessionError::Conflict {
            title: session.title,
        }),
        None => Ok(()),
    }
}
