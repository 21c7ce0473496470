//! In-memory store implementations
//!
//! Used by tests and for running the service without a database. Every
//! method holds the lock for its whole read-modify-write, so each call is
//! atomic with respect to the others.

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    capacity,
    model::{Role, Session, SessionStatus, User},
    store::{SessionFilter, SessionStore, UserStore},
};

/// Session store backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.sessions.lock().await.get(&id).cloned())
    }

    async fn find_one(&self, filter: &SessionFilter) -> Result<Option<Session>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.values().find(|s| filter.matches(s)).cloned())
    }

    async fn find_many(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let sessions = self.sessions.lock().await;
        let mut matching: Vec<Session> = sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by_key(|s| (s.time_start, s.created_at));
        Ok(matching)
    }

    async fn insert(&self, session: &Session) -> Result<Session> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            bail!("Session {} already exists", session.id);
        }
        sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn save(&self, session: &Session) -> Result<Option<Session>> {
        let mut sessions = self.sessions.lock().await;
        let Some(stored) = sessions.get_mut(&session.id) else {
            return Ok(None);
        };
        if stored.occupancy() > session.maximum_participants as usize {
            return Ok(None);
        }
        let participants = std::mem::take(&mut stored.participants);
        *stored = session.clone();
        stored.participants = participants;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.sessions.lock().await.remove(&id).is_some())
    }

    async fn append_participant(&self, id: Uuid, user_id: Uuid) -> Result<Option<Session>> {
        let mut sessions = self.sessions.lock().await;
        let Some(stored) = sessions.get_mut(&id) else {
            return Ok(None);
        };
        if stored.status != SessionStatus::Upcoming
            || !capacity::has_room(stored)
            || stored.has_participant(user_id)
        {
            return Ok(None);
        }
        stored.participants.push(user_id);
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }
}

/// User store backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = self.users.lock().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<User>> {
        let mut users = self.users.lock().await;
        Ok(users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.users.lock().await.remove(&id).is_some())
    }
}
