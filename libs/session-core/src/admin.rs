//! Admin-only user management

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{SessionError, SessionResult},
    model::{Actor, Role, User},
    policy,
    store::UserStore,
};

/// User management operations
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserStore>,
}

impl AdminService {
    /// Create a new admin service
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    async fn load(&self, user_id: Uuid) -> SessionResult<User> {
        self.users.find_by_id(user_id).await?.ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            SessionError::NotFound("User")
        })
    }

    /// Grant the event coordinator role
    pub async fn promote_to_coordinator(&self, actor: &Actor, user_id: Uuid) -> SessionResult<User> {
        debug!("Request to promote user {} from {}", user_id, actor.id);
        policy::require_role(actor, policy::ADMIN_ROLES)?;
        let user = self.load(user_id).await?;

        if user.role == Role::EventCoordinator {
            warn!("User with ID {} is already an event coordinator", user_id);
            return Err(SessionError::BadRequest(
                "User is already an event coordinator".to_string(),
            ));
        }

        let user = self
            .users
            .update_role(user_id, Role::EventCoordinator)
            .await?
            .ok_or(SessionError::NotFound("User"))?;

        info!("User {} promoted to event coordinator", user_id);
        Ok(user)
    }

    /// Delete a user account
    pub async fn remove_user(&self, actor: &Actor, user_id: Uuid) -> SessionResult<()> {
        debug!("Request to remove user {} from {}", user_id, actor.id);
        policy::require_role(actor, policy::ADMIN_ROLES)?;
        let user = self.load(user_id).await?;

        if !self.users.delete(user_id).await? {
            return Err(SessionError::NotFound("User"));
        }

        info!("User {} ({}) removed", user.username, user_id);
        Ok(())
    }

    pub async fn list_users(&self, actor: &Actor) -> SessionResult<Vec<User>> {
        policy::require_role(actor, policy::ADMIN_ROLES)?;
        Ok(self.users.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryUserStore;
    use chrono::Utc;

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: format!("user-{}", role),
            email: format!("{}@example.com", role),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), Role::Admin)
    }

    #[tokio::test]
    async fn test_promote() {
        let member = user(Role::User);
        let service = AdminService::new(Arc::new(MemoryUserStore::with_users([member.clone()])));

        let promoted = service.promote_to_coordinator(&admin(), member.id).await.unwrap();
        assert_eq!(promoted.role, Role::EventCoordinator);

        let err = service
            .promote_to_coordinator(&admin(), member.id)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::BadRequest(_)));

        let err = service
            .promote_to_coordinator(&admin(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound("User"));
    }

    #[tokio::test]
    async fn test_admin_only() {
        let member = user(Role::User);
        let service = AdminService::new(Arc::new(MemoryUserStore::with_users([member.clone()])));
        let coordinator = Actor::new(Uuid::new_v4(), Role::EventCoordinator);

        assert!(matches!(
            service.promote_to_coordinator(&coordinator, member.id).await,
            Err(SessionError::Forbidden(_))
        ));
        assert!(matches!(
            service.remove_user(&coordinator, member.id).await,
            Err(SessionError::Forbidden(_))
        ));
        assert!(service.list_users(&coordinator).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_user() {
        let member = user(Role::User);
        let service = AdminService::new(Arc::new(MemoryUserStore::with_users([member.clone()])));

        service.remove_user(&admin(), member.id).await.unwrap();
        assert!(service.list_users(&admin()).await.unwrap().is_empty());
        assert_eq!(
            service.remove_user(&admin(), member.id).await,
            Err(SessionError::NotFound("User"))
        );
    }
}
