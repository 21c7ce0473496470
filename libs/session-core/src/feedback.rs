//! Per-session feedback comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{SessionError, SessionResult},
    lifecycle,
    model::{Actor, Session},
};

/// Feedback entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Append a comment from `actor`, returning the new entry
pub fn append(session: &mut Session, actor: &Actor, comment: &str) -> SessionResult<Feedback> {
    lifecycle::ensure_accepts_feedback(session.status)?;

    let comment = comment.trim();
    if comment.is_empty() {
        return Err(SessionError::BadRequest("Comment is required".to_string()));
    }

    let feedback = Feedback {
        id: Uuid::new_v4(),
        user_id: actor.id,
        comment: comment.to_string(),
        created_at: Utc::now(),
    };
    session.feedbacks.push(feedback.clone());
    Ok(feedback)
}

/// Remove the feedback entry with `feedback_id`
pub fn remove(session: &mut Session, feedback_id: Uuid) -> SessionResult<Feedback> {
    let index = session
        .feedbacks
        .iter()
        .position(|feedback| feedback.id == feedback_id)
        .ok_or(SessionError::NotFound("Feedback"))?;
    Ok(session.feedbacks.remove(index))
}
