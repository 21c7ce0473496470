//! Participant-count ceiling checks

use crate::{
    error::{SessionError, SessionResult},
    model::Session,
};

/// Largest capacity a session may declare (fits a signed 32-bit column)
pub const MAX_CAPACITY: u32 = i32::MAX as u32;

/// Reject a capacity that is not a positive integer within [`MAX_CAPACITY`]
pub fn validate_capacity(maximum_participants: u32) -> SessionResult<u32> {
    if maximum_participants == 0 {
        return Err(SessionError::BadRequest(
            "Maximum participants must be a positive integer".to_string(),
        ));
    }
    if maximum_participants > MAX_CAPACITY {
        return Err(SessionError::BadRequest(format!(
            "Maximum participants must not exceed {}",
            MAX_CAPACITY
        )));
    }
    Ok(maximum_participants)
}

/// Whether one more participant fits
pub fn has_room(session: &Session) -> bool {
    session.occupancy() < session.maximum_participants as usize
}

/// Fail with [`SessionError::SessionFull`] if the session is at capacity
pub fn ensure_room(session: &Session) -> SessionResult<()> {
    if has_room(session) {
        Ok(())
    } else {
        Err(SessionError::SessionFull)
    }
}

/// Fail if a new capacity would drop below the current participant count
pub fn ensure_covers_occupancy(session: &Session, requested: u32) -> SessionResult<()> {
    let occupancy = session.occupancy();
    if (requested as usize) < occupancy {
        return Err(SessionError::CapacityBelowOccupancy {
            requested,
            occupancy,
        });
    }
    Ok(())
}
