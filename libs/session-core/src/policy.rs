//! Role and ownership predicates consulted before every mutation

use tracing::warn;

use crate::{
    error::{SessionError, SessionResult},
    model::{Actor, Role, Session},
};

/// Roles allowed to decide proposals and moderate feedback
pub const COORDINATOR_ROLES: &[Role] = &[Role::EventCoordinator];

/// Roles allowed to delete sessions they do not own
pub const MODERATOR_ROLES: &[Role] = &[Role::EventCoordinator, Role::Admin];

/// Roles allowed to manage users
pub const ADMIN_ROLES: &[Role] = &[Role::Admin];

pub fn is_owner(actor: &Actor, session: &Session) -> bool {
    actor.id == session.created_by
}

pub fn has_any_role(actor: &Actor, allowed: &[Role]) -> bool {
    allowed.contains(&actor.role)
}

/// Edit rule: only the proposer may change a session
pub fn require_owner(actor: &Actor, session: &Session) -> SessionResult<()> {
    if is_owner(actor, session) {
        return Ok(());
    }
    warn!(
        "User {} is not the owner of session {}",
        actor.id, session.id
    );
    Err(SessionError::Forbidden(
        "You can only perform this action on your own sessions",
    ))
}

/// Delete rule: the owner, or any actor holding one of `roles`
pub fn require_owner_or_role(actor: &Actor, session: &Session, roles: &[Role]) -> SessionResult<()> {
    if is_owner(actor, session) || has_any_role(actor, roles) {
        return Ok(());
    }
    warn!(
        "User {} ({}) may not modify session {}",
        actor.id, actor.role, session.id
    );
    Err(SessionError::Forbidden(
        "You can only perform this action on your own sessions",
    ))
}

/// Route-level gate for coordinator and admin operations
pub fn require_role(actor: &Actor, roles: &[Role]) -> SessionResult<()> {
    if has_any_role(actor, roles) {
        return Ok(());
    }
    warn!("Forbidden access attempt by user {} ({})", actor.id, actor.role);
    Err(SessionError::Forbidden(
        "You do not have permission to access this resource",
    ))
}
