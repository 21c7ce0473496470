//! Session lifecycle state machine
//!
//! ```text
//!              accept            (external)         (external)
//!  Proposal ───────────► Upcoming ─────────► Ongoing ─────────► Completed
//!     │
//!     │ reject
//!     ▼
//!  Rejected
//! ```
//!
//! Only the proposal decision is driven from here. `Ongoing` and `Completed`
//! are reached through an external scheduler and are never set by this crate.
//! The remaining functions answer which operations a status admits.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::{SessionError, SessionResult},
    model::SessionStatus,
};

/// Coordinator decision on a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalAction {
    Accept,
    Reject,
}

impl ProposalAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalAction::Accept => "accept",
            ProposalAction::Reject => "reject",
        }
    }
}

impl FromStr for ProposalAction {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(ProposalAction::Accept),
            "reject" => Ok(ProposalAction::Reject),
            _ => Err(SessionError::BadRequest(
                "Invalid action. It should be either \"accept\" or \"reject\".".to_string(),
            )),
        }
    }
}

/// Apply a coordinator decision, returning the next status
pub fn decide(current: SessionStatus, action: ProposalAction) -> SessionResult<SessionStatus> {
    match current {
        SessionStatus::Proposal => Ok(match action {
            ProposalAction::Accept => SessionStatus::Upcoming,
            ProposalAction::Reject => SessionStatus::Rejected,
        }),
        SessionStatus::Rejected
        | SessionStatus::Upcoming
        | SessionStatus::Ongoing
        | SessionStatus::Completed => Err(SessionError::NotProposal),
    }
}

/// Registration is open only while a session is upcoming
pub fn ensure_registrable(status: SessionStatus) -> SessionResult<()> {
    match status {
        SessionStatus::Upcoming => Ok(()),
        SessionStatus::Proposal
        | SessionStatus::Rejected
        | SessionStatus::Ongoing
        | SessionStatus::Completed => Err(SessionError::NotAvailable(
            "session is not open for registration",
        )),
    }
}

/// The owner may edit while the session is still pending or upcoming
pub fn ensure_editable(status: SessionStatus) -> SessionResult<()> {
    match status {
        SessionStatus::Proposal | SessionStatus::Upcoming => Ok(()),
        SessionStatus::Rejected | SessionStatus::Ongoing | SessionStatus::Completed => Err(
            SessionError::NotAvailable("session can no longer be edited"),
        ),
    }
}

/// Feedback is accepted once a session has been approved
pub fn ensure_accepts_feedback(status: SessionStatus) -> SessionResult<()> {
    match status {
        SessionStatus::Upcoming | SessionStatus::Ongoing | SessionStatus::Completed => Ok(()),
        SessionStatus::Proposal | SessionStatus::Rejected => Err(SessionError::NotAcceptedYet),
    }
}

/// Whether a session appears in the public listing
pub fn is_published(status: SessionStatus) -> bool {
    ensure_accepts_feedback(status).is_ok()
}
