//! Error taxonomy for session operations
//!
//! Every operation in this crate returns either its success payload or a
//! [`SessionError`]. Each variant carries a stable [`ErrorKind`] and a fixed
//! HTTP status so the transport layer can render it without further
//! inspection.

use serde::Serialize;
use thiserror::Error;

/// Stable, client-facing error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidRange,
    CapacityBelowOccupancy,
    Conflict,
    AlreadyRegistered,
    SessionFull,
    NotAvailable,
    NotProposal,
    NotAcceptedYet,
    Forbidden,
    BadRequest,
    InternalError,
}

impl ErrorKind {
    /// HTTP status code for this kind
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InvalidRange
            | ErrorKind::CapacityBelowOccupancy
            | ErrorKind::NotAvailable
            | ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict
            | ErrorKind::AlreadyRegistered
            | ErrorKind::SessionFull
            | ErrorKind::NotProposal
            | ErrorKind::NotAcceptedYet => 409,
            ErrorKind::InternalError => 500,
        }
    }

    /// Wire representation, e.g. `SESSION_FULL`
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidRange => "INVALID_RANGE",
            ErrorKind::CapacityBelowOccupancy => "CAPACITY_BELOW_OCCUPANCY",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorKind::SessionFull => "SESSION_FULL",
            ErrorKind::NotAvailable => "NOT_AVAILABLE",
            ErrorKind::NotProposal => "NOT_PROPOSAL",
            ErrorKind::NotAcceptedYet => "NOT_ACCEPTED_YET",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Error returned by session and admin operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Session, feedback or user does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// End time is not after start time
    #[error("End time must be after start time")]
    InvalidRange,

    /// Capacity edit would drop below current participant count
    #[error(
        "Maximum participants ({requested}) cannot be less than current participants count ({occupancy})"
    )]
    CapacityBelowOccupancy { requested: u32, occupancy: usize },

    /// Time interval overlaps another session in the relevant scope
    #[error("Session conflicts with session {title}")]
    Conflict { title: String },

    #[error("You are already registered for this session")]
    AlreadyRegistered,

    #[error("Session is full")]
    SessionFull,

    /// Registration or edit attempted outside an eligible status
    #[error("Session not available: {0}")]
    NotAvailable(&'static str),

    #[error("Only session proposals can be decided")]
    NotProposal,

    #[error("Session not available for feedback")]
    NotAcceptedYet,

    /// Role or ownership check failed
    #[error("{0}")]
    Forbidden(&'static str),

    /// Malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Store or unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::InvalidRange => ErrorKind::InvalidRange,
            SessionError::CapacityBelowOccupancy { .. } => ErrorKind::CapacityBelowOccupancy,
            SessionError::Conflict { .. } => ErrorKind::Conflict,
            SessionError::AlreadyRegistered => ErrorKind::AlreadyRegistered,
            SessionError::SessionFull => ErrorKind::SessionFull,
            SessionError::NotAvailable(_) => ErrorKind::NotAvailable,
            SessionError::NotProposal => ErrorKind::NotProposal,
            SessionError::NotAcceptedYet => ErrorKind::NotAcceptedYet,
            SessionError::Forbidden(_) => ErrorKind::Forbidden,
            SessionError::BadRequest(_) => ErrorKind::BadRequest,
            SessionError::Internal(_) => ErrorKind::InternalError,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Store operation failed: {:#}", err);
        SessionError::Internal(format!("{:#}", err))
    }
}

/// Type alias for Result with SessionError
pub type SessionResult<T> = Result<T, SessionError>;
