//! API models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use session_core::{Feedback, NewSession, Session, SessionChanges};

/// Request for proposing a session
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub description: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub maximum_participants: u32,
}

impl From<CreateSessionRequest> for NewSession {
    fn from(req: CreateSessionRequest) -> Self {
        NewSession {
            title: req.title,
            description: req.description,
            time_start: req.time_start,
            time_end: req.time_end,
            maximum_participants: req.maximum_participants,
        }
    }
}

/// Request for editing a session; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct EditSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub maximum_participants: Option<u32>,
}

impl From<EditSessionRequest> for SessionChanges {
    fn from(req: EditSessionRequest) -> Self {
        SessionChanges {
            title: req.title,
            description: req.description,
            time_start: req.time_start,
            time_end: req.time_end,
            maximum_participants: req.maximum_participants,
        }
    }
}

/// Coordinator decision on a proposal
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// "accept" or "reject"
    pub action: String,
}

/// Feedback comment
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub comment: String,
}

/// Response wrapping a single session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub session: Session,
}

impl SessionResponse {
    pub fn new(message: impl Into<String>, session: Session) -> Self {
        Self {
            message: message.into(),
            session,
        }
    }
}

/// Response wrapping a new feedback entry
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub feedback: Feedback,
}
