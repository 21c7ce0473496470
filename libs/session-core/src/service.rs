//! Session service
//!
//! Composes the policy, lifecycle, overlap and capacity checks into the
//! operations exposed at the boundary. Every operation reads the session,
//! validates, then writes it back; nothing is written unless all checks pass.
//! Checks run in a fixed order (existence, authorization, status, range,
//! conflict, capacity) so the error a client sees is deterministic.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    capacity,
    error::{SessionError, SessionResult},
    feedback::{self, Feedback},
    lifecycle::{self, ProposalAction},
    model::{Actor, NewSession, Session, SessionChanges, SessionStatus},
    overlap::{self, OverlapScope, TimeRange},
    policy,
    store::{SessionFilter, SessionStore},
};

/// Default number of conditional-append attempts per registration
pub const DEFAULT_REGISTRATION_ATTEMPTS: u32 = 3;

/// Session lifecycle operations
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    registration_attempts: u32,
}

impl SessionService {
    /// Create a new session service
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            registration_attempts: DEFAULT_REGISTRATION_ATTEMPTS,
        }
    }

    /// Override how many times a contended registration is re-validated
    pub fn with_registration_attempts(mut self, attempts: u32) -> Self {
        self.registration_attempts = attempts.max(1);
        self
    }

    async fn load(&self, id: Uuid) -> SessionResult<Session> {
        self.store.find_by_id(id).await?.ok_or_else(|| {
            warn!("Session with ID {} not found", id);
            SessionError::NotFound("Session")
        })
    }

    /// Write back a validated session.
    ///
    /// The store refuses the write when registrations that landed after our
    /// read no longer fit the new capacity; that is reported as
    /// [`SessionError::CapacityBelowOccupancy`] against the fresh occupancy.
    async fn persist(&self, session: &Session) -> SessionResult<Session> {
        if let Some(saved) = self.store.save(session).await? {
            return Ok(saved);
        }

        let current = self.load(session.id).await?;
        warn!(
            "Save of session {} refused: capacity {} below occupancy {}",
            session.id,
            session.maximum_participants,
            current.occupancy()
        );
        capacity::ensure_covers_occupancy(&current, session.maximum_participants)?;
        Err(SessionError::Internal(format!(
            "Session {} could not be saved",
            session.id
        )))
    }

    /// Propose a new session owned by `actor`
    pub async fn create_proposal(
        &self,
        actor: &Actor,
        new_session: NewSession,
    ) -> SessionResult<Session> {
        debug!("Request to create proposal from user {}", actor.id);

        let title = require_text("Title", &new_session.title)?;
        let description = require_text("Description", &new_session.description)?;
        let range = TimeRange::new(new_session.time_start, new_session.time_end).inspect_err(|_| {
            warn!("User {} proposed a session with an invalid time range", actor.id);
        })?;
        let maximum_participants = capacity::validate_capacity(new_session.maximum_participants)?;

        overlap::ensure_no_conflict(
            self.store.as_ref(),
            OverlapScope::CreatedBy(actor.id),
            range,
            None,
        )
        .await
        .inspect_err(|e| warn!("Proposal by user {} rejected: {}", actor.id, e))?;

        let session = Session::proposal(
            actor.id,
            NewSession {
                title,
                description,
                time_start: range.start,
                time_end: range.end,
                maximum_participants,
            },
        );
        let session = self.store.insert(&session).await?;

        info!("Proposal {} created by user {}", session.id, actor.id);
        Ok(session)
    }

    /// Accept or reject a pending proposal
    pub async fn decide_proposal(
        &self,
        actor: &Actor,
        session_id: Uuid,
        action: ProposalAction,
    ) -> SessionResult<Session> {
        policy::require_role(actor, policy::COORDINATOR_ROLES)?;
        let mut session = self.load(session_id).await?;

        session.status = lifecycle::decide(session.status, action).inspect_err(|_| {
            warn!(
                "Session {} is not in proposal status ({})",
                session_id, session.status
            );
        })?;
        let session = self.persist(&session).await?;

        info!("Session {} {}ed by {}", session_id, action.as_str(), actor.id);
        Ok(session)
    }

    /// Apply the owner's partial edit
    pub async fn edit_session(
        &self,
        actor: &Actor,
        session_id: Uuid,
        changes: SessionChanges,
    ) -> SessionResult<Session> {
        debug!("Request to edit session {} from user {}", session_id, actor.id);
        let mut session = self.load(session_id).await?;
        policy::require_owner(actor, &session)?;
        lifecycle::ensure_editable(session.status)?;

        let title = match changes.title {
            Some(title) => require_text("Title", &title)?,
            None => session.title.clone(),
        };
        let description = match changes.description {
            Some(description) => require_text("Description", &description)?,
            None => session.description.clone(),
        };
        let range = TimeRange::new(
            changes.time_start.unwrap_or(session.time_start),
            changes.time_end.unwrap_or(session.time_end),
        )?;
        let maximum_participants = match changes.maximum_participants {
            Some(requested) => capacity::validate_capacity(requested)?,
            None => session.maximum_participants,
        };

        overlap::ensure_no_conflict(
            self.store.as_ref(),
            OverlapScope::CreatedBy(actor.id),
            range,
            Some(session_id),
        )
        .await
        .inspect_err(|e| warn!("Edit of session {} rejected: {}", session_id, e))?;
        capacity::ensure_covers_occupancy(&session, maximum_participants)?;

        session.title = title;
        session.description = description;
        session.time_start = range.start;
        session.time_end = range.end;
        session.maximum_participants = maximum_participants;
        let session = self.persist(&session).await?;

        info!("Session {} updated by owner {}", session_id, actor.id);
        Ok(session)
    }

    /// Remove a session; owners and coordinators may delete
    pub async fn delete_session(&self, actor: &Actor, session_id: Uuid) -> SessionResult<()> {
        debug!("Request to delete session {} from user {}", session_id, actor.id);
        let session = self.load(session_id).await?;
        policy::require_owner_or_role(actor, &session, policy::MODERATOR_ROLES)?;

        if !self.store.delete(session_id).await? {
            return Err(SessionError::NotFound("Session"));
        }

        info!("Session {} deleted by {}", session_id, actor.id);
        Ok(())
    }

    /// Register `actor` as a participant.
    ///
    /// The final write is conditional on the session still having room, so
    /// concurrent registrations cannot overshoot capacity. When the condition
    /// fails the session is re-read and re-validated, which surfaces the
    /// precise reason (full, already registered, closed).
    pub async fn register(&self, actor: &Actor, session_id: Uuid) -> SessionResult<Session> {
        debug!("Request to register user {} for session {}", actor.id, session_id);

        for attempt in 1..=self.registration_attempts {
            let session = self.load(session_id).await?;
            self.validate_registration(actor, &session).await?;

            if let Some(updated) = self.store.append_participant(session_id, actor.id).await? {
                info!("User {} registered for session {}", actor.id, session_id);
                return Ok(updated);
            }
            warn!(
                "Registration of user {} for session {} lost a concurrent update (attempt {})",
                actor.id, session_id, attempt
            );
        }

        Err(SessionError::Internal(format!(
            "Registration for session {} did not settle after {} attempts",
            session_id, self.registration_attempts
        )))
    }

    async fn validate_registration(&self, actor: &Actor, session: &Session) -> SessionResult<()> {
        lifecycle::ensure_registrable(session.status).inspect_err(|_| {
            warn!("Session {} not available for registration", session.id);
        })?;

        if session.has_participant(actor.id) {
            warn!("User {} already registered for session {}", actor.id, session.id);
            return Err(SessionError::AlreadyRegistered);
        }

        overlap::ensure_no_conflict(
            self.store.as_ref(),
            OverlapScope::Participant(actor.id),
            session.range(),
            Some(session.id),
        )
        .await
        .inspect_err(|e| warn!("Registration of user {} rejected: {}", actor.id, e))?;

        capacity::ensure_room(session).inspect_err(|_| warn!("Session {} is full", session.id))
    }

    /// Leave feedback on an accepted session
    pub async fn add_feedback(
        &self,
        actor: &Actor,
        session_id: Uuid,
        comment: &str,
    ) -> SessionResult<Feedback> {
        let mut session = self.load(session_id).await?;
        let entry = feedback::append(&mut session, actor, comment).inspect_err(|e| {
            warn!("Feedback on session {} rejected: {}", session_id, e);
        })?;
        self.persist(&session).await?;

        debug!("Feedback {} added to session {}", entry.id, session_id);
        Ok(entry)
    }

    /// Remove a feedback entry (coordinators only)
    pub async fn remove_feedback(
        &self,
        actor: &Actor,
        session_id: Uuid,
        feedback_id: Uuid,
    ) -> SessionResult<()> {
        policy::require_role(actor, policy::COORDINATOR_ROLES)?;
        let mut session = self.load(session_id).await?;
        feedback::remove(&mut session, feedback_id).inspect_err(|_| {
            warn!("Feedback with ID {} not found", feedback_id);
        })?;
        self.persist(&session).await?;

        debug!("Feedback {} removed from session {}", feedback_id, session_id);
        Ok(())
    }

    /// Published sessions (neither pending nor rejected)
    pub async fn list_sessions(&self) -> SessionResult<Vec<Session>> {
        let filter = SessionFilter::new()
            .without_statuses(&[SessionStatus::Proposal, SessionStatus::Rejected]);
        Ok(self.store.find_many(&filter).await?)
    }

    /// Sessions awaiting a decision (coordinators only)
    pub async fn list_proposals(&self, actor: &Actor) -> SessionResult<Vec<Session>> {
        policy::require_role(actor, policy::COORDINATOR_ROLES)?;
        let filter = SessionFilter::new().with_statuses(&[SessionStatus::Proposal]);
        Ok(self.store.find_many(&filter).await?)
    }

    pub async fn get_session(&self, session_id: Uuid) -> SessionResult<Session> {
        self.load(session_id).await
    }
}

fn require_text(field: &str, value: &str) -> SessionResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SessionError::BadRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::MemorySessionStore, model::Role};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn new_session(title: &str, start: i64, end: i64, capacity: u32) -> NewSession {
        NewSession {
            title: title.to_string(),
            description: format!("{} description", title),
            time_start: at(start),
            time_end: at(end),
            maximum_participants: capacity,
        }
    }

    fn user() -> Actor {
        Actor::new(Uuid::new_v4(), Role::User)
    }

    fn coordinator() -> Actor {
        Actor::new(Uuid::new_v4(), Role::EventCoordinator)
    }

    fn service() -> (SessionService, MemorySessionStore) {
        let store = MemorySessionStore::new();
        (SessionService::new(Arc::new(store.clone())), store)
    }

    async fn upcoming(
        service: &SessionService,
        owner: &Actor,
        title: &str,
        start: i64,
        end: i64,
        capacity: u32,
    ) -> Session {
        let proposal = service
            .create_proposal(owner, new_session(title, start, end, capacity))
            .await
            .unwrap();
        service
            .decide_proposal(&coordinator(), proposal.id, ProposalAction::Accept)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_proposal_trims_and_persists() {
        let (service, store) = service();
        let owner = user();
        let mut payload = new_session("  Rust 101 ", 100, 200, 5);
        payload.description = " basics ".to_string();

        let session = service.create_proposal(&owner, payload).await.unwrap();

        assert_eq!(session.title, "Rust 101");
        assert_eq!(session.description, "basics");
        assert_eq!(session.status, SessionStatus::Proposal);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_proposal_field_validation() {
        let (service, store) = service();
        let owner = user();

        let err = service
            .create_proposal(&owner, new_session(" ", 100, 200, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::BadRequest(_)));

        let err = service
            .create_proposal(&owner, new_session("T", 100, 200, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::BadRequest(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_proposal_overlap_is_scoped_to_creator() {
        let (service, _) = service();
        let alice = user();
        let bob = user();

        service
            .create_proposal(&alice, new_session("A", 10, 20, 3))
            .await
            .unwrap();

        // another user may book the same slot
        assert!(service
            .create_proposal(&bob, new_session("B", 15, 25, 3))
            .await
            .is_ok());

        let err = service
            .create_proposal(&alice, new_session("C", 15, 25, 3))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Conflict { title: "A".into() });
    }

    #[tokio::test]
    async fn test_rejected_proposals_still_block_creator() {
        let (service, _) = service();
        let owner = user();
        let proposal = service
            .create_proposal(&owner, new_session("First", 10, 20, 3))
            .await
            .unwrap();
        service
            .decide_proposal(&coordinator(), proposal.id, ProposalAction::Reject)
            .await
            .unwrap();

        let err = service
            .create_proposal(&owner, new_session("Second", 12, 18, 3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_decide_requires_coordinator_and_proposal() {
        let (service, _) = service();
        let owner = user();
        let proposal = service
            .create_proposal(&owner, new_session("Pending", 0, 10, 3))
            .await
            .unwrap();

        let err = service
            .decide_proposal(&owner, proposal.id, ProposalAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Forbidden(_)));

        let err = service
            .decide_proposal(&coordinator(), Uuid::new_v4(), ProposalAction::Accept)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound("Session"));

        let rejected = service
            .decide_proposal(&coordinator(), proposal.id, ProposalAction::Reject)
            .await
            .unwrap();
        assert_eq!(rejected.status, SessionStatus::Rejected);

        let err = service
            .decide_proposal(&coordinator(), proposal.id, ProposalAction::Accept)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotProposal);
    }

    #[tokio::test]
    async fn test_edit_merges_partial_changes() {
        let (service, _) = service();
        let owner = user();
        let session = service
            .create_proposal(&owner, new_session("Old", 100, 200, 5))
            .await
            .unwrap();

        let edited = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    title: Some("New".to_string()),
                    time_end: Some(at(300)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.title, "New");
        assert_eq!(edited.description, session.description);
        assert_eq!(edited.time_start, at(100));
        assert_eq!(edited.time_end, at(300));
        assert_eq!(edited.maximum_participants, 5);
    }

    #[tokio::test]
    async fn test_edit_does_not_conflict_with_itself() {
        let (service, _) = service();
        let owner = user();
        let session = service
            .create_proposal(&owner, new_session("Self", 100, 200, 5))
            .await
            .unwrap();

        let edited = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    time_start: Some(at(150)),
                    time_end: Some(at(250)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.time_start, at(150));
    }

    #[tokio::test]
    async fn test_edit_conflicts_with_owners_other_session() {
        let (service, store) = service();
        let owner = user();
        service
            .create_proposal(&owner, new_session("Morning", 100, 200, 5))
            .await
            .unwrap();
        let evening = service
            .create_proposal(&owner, new_session("Evening", 300, 400, 5))
            .await
            .unwrap();

        let err = service
            .edit_session(
                &owner,
                evening.id,
                SessionChanges {
                    time_start: Some(at(200)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Conflict {
                title: "Morning".into()
            }
        );
        let stored = store.find_by_id(evening.id).await.unwrap().unwrap();
        assert_eq!(stored.time_start, at(300));
    }

    #[tokio::test]
    async fn test_edit_invalid_range_reported_before_conflict() {
        let (service, _) = service();
        let owner = user();
        service
            .create_proposal(&owner, new_session("Other", 0, 50, 5))
            .await
            .unwrap();
        let session = service
            .create_proposal(&owner, new_session("Mine", 100, 200, 5))
            .await
            .unwrap();

        let err = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    time_start: Some(at(10)),
                    time_end: Some(at(5)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidRange);
    }

    #[tokio::test]
    async fn test_edit_capacity_below_occupancy() {
        let (service, _) = service();
        let owner = user();
        let session = upcoming(&service, &owner, "Busy", 0, 10, 3).await;
        service.register(&user(), session.id).await.unwrap();
        service.register(&user(), session.id).await.unwrap();

        let err = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    maximum_participants: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::CapacityBelowOccupancy {
                requested: 1,
                occupancy: 2
            }
        );

        let edited = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    maximum_participants: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.maximum_participants, 2);
    }

    #[tokio::test]
    async fn test_edit_closed_session_not_available() {
        let (service, store) = service();
        let owner = user();
        let mut session = upcoming(&service, &owner, "Done", 0, 10, 3).await;
        session.status = SessionStatus::Completed;
        store.save(&session).await.unwrap();

        let err = service
            .edit_session(&owner, session.id, SessionChanges::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotAvailable);
    }

    #[tokio::test]
    async fn test_register_status_and_participant_overlap() {
        let (service, _) = service();
        let owner = user();
        let guest = user();

        let proposal = service
            .create_proposal(&owner, new_session("Pending", 0, 10, 3))
            .await
            .unwrap();
        let err = service.register(&guest, proposal.id).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotAvailable);

        let first = upcoming(&service, &owner, "First", 100, 200, 3).await;
        let clash = upcoming(&service, &user(), "Clash", 200, 300, 3).await;
        let later = upcoming(&service, &user(), "Later", 201, 300, 3).await;

        service.register(&guest, first.id).await.unwrap();
        let err = service.register(&guest, clash.id).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::Conflict {
                title: "First".into()
            }
        );
        assert!(service.register(&guest, later.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_conflict_reported_before_full() {
        let (service, _) = service();
        let guest = user();
        let booked = upcoming(&service, &user(), "Booked", 0, 100, 5).await;
        let full = upcoming(&service, &user(), "Full", 50, 150, 1).await;
        service.register(&guest, booked.id).await.unwrap();
        service.register(&user(), full.id).await.unwrap();

        let err = service.register(&guest, full.id).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_delete_permissions() {
        let (service, _) = service();
        let owner = user();
        let session = service
            .create_proposal(&owner, new_session("Doomed", 0, 10, 3))
            .await
            .unwrap();

        let err = service.delete_session(&user(), session.id).await.unwrap_err();
        assert!(matches!(err, SessionError::Forbidden(_)));

        service.delete_session(&owner, session.id).await.unwrap();
        assert_eq!(
            service.get_session(session.id).await,
            Err(SessionError::NotFound("Session"))
        );
    }

    #[tokio::test]
    async fn test_feedback_flow() {
        let (service, _) = service();
        let owner = user();
        let proposal = service
            .create_proposal(&owner, new_session("Feedback", 0, 10, 3))
            .await
            .unwrap();

        let err = service
            .add_feedback(&user(), proposal.id, "early")
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotAcceptedYet);

        service
            .decide_proposal(&coordinator(), proposal.id, ProposalAction::Accept)
            .await
            .unwrap();
        let entry = service
            .add_feedback(&user(), proposal.id, "Nice")
            .await
            .unwrap();

        let err = service
            .remove_feedback(&owner, proposal.id, entry.id)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Forbidden(_)));

        let err = service
            .remove_feedback(&coordinator(), proposal.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound("Feedback"));

        service
            .remove_feedback(&coordinator(), proposal.id, entry.id)
            .await
            .unwrap();
        let session = service.get_session(proposal.id).await.unwrap();
        assert!(session.feedbacks.is_empty());
    }

    #[tokio::test]
    async fn test_listings() {
        let (service, _) = service();
        let owner = user();
        let pending = service
            .create_proposal(&owner, new_session("Pending", 0, 10, 3))
            .await
            .unwrap();
        let late = upcoming(&service, &owner, "Late", 300, 400, 3).await;
        let early = upcoming(&service, &owner, "Early", 100, 200, 3).await;

        let published: Vec<Uuid> = service
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(published, vec![early.id, late.id]);

        let proposals = service.list_proposals(&coordinator()).await.unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].id, pending.id);
        assert!(service.list_proposals(&owner).await.is_err());
    }

    /// Wraps the memory store to interleave another writer between a read and
    /// the write that follows it, or to make every registration write lose.
    struct ScriptedStore {
        inner: MemorySessionStore,
        register_on_next_read: tokio::sync::Mutex<Option<Uuid>>,
        stall_appends: bool,
        append_calls: std::sync::atomic::AtomicU32,
    }

    impl ScriptedStore {
        fn new(inner: MemorySessionStore, stall_appends: bool) -> Self {
            Self {
                inner,
                register_on_next_read: tokio::sync::Mutex::new(None),
                stall_appends,
                append_calls: std::sync::atomic::AtomicU32::new(0),
            }
        }

        fn append_calls(&self) -> u32 {
            self.append_calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SessionStore for ScriptedStore {
        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Session>> {
            let found = self.inner.find_by_id(id).await?;
            if let Some(user_id) = self.register_on_next_read.lock().await.take() {
                self.inner.append_participant(id, user_id).await?;
            }
            Ok(found)
        }

        async fn find_one(&self, filter: &SessionFilter) -> anyhow::Result<Option<Session>> {
            self.inner.find_one(filter).await
        }

        async fn find_many(&self, filter: &SessionFilter) -> anyhow::Result<Vec<Session>> {
            self.inner.find_many(filter).await
        }

        async fn insert(&self, session: &Session) -> anyhow::Result<Session> {
            self.inner.insert(session).await
        }

        async fn save(&self, session: &Session) -> anyhow::Result<Option<Session>> {
            self.inner.save(session).await
        }

        async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
            self.inner.delete(id).await
        }

        async fn append_participant(
            &self,
            id: Uuid,
            user_id: Uuid,
        ) -> anyhow::Result<Option<Session>> {
            self.append_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.stall_appends {
                return Ok(None);
            }
            self.inner.append_participant(id, user_id).await
        }
    }

    #[tokio::test]
    async fn test_edit_capacity_checked_against_registration_landing_mid_edit() {
        let memory = MemorySessionStore::new();
        let store = Arc::new(ScriptedStore::new(memory.clone(), false));
        let service = SessionService::new(store.clone());
        let owner = user();
        let session = upcoming(&service, &owner, "Crowded", 100, 200, 3).await;
        service.register(&user(), session.id).await.unwrap();
        service.register(&user(), session.id).await.unwrap();

        // a third registration lands after the edit has read the session
        *store.register_on_next_read.lock().await = Some(Uuid::new_v4());
        let err = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    maximum_participants: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::CapacityBelowOccupancy {
                requested: 2,
                occupancy: 3
            }
        );
        let stored = memory.find_by_id(session.id).await.unwrap().unwrap();
        assert_eq!(stored.maximum_participants, 3);
        assert_eq!(stored.occupancy(), 3);
    }

    #[tokio::test]
    async fn test_registration_gives_up_after_configured_attempts() {
        let memory = MemorySessionStore::new();
        let store = Arc::new(ScriptedStore::new(memory, true));
        let service = SessionService::new(store.clone()).with_registration_attempts(4);
        let session = upcoming(&service, &user(), "Contended", 100, 200, 3).await;

        let err = service.register(&user(), session.id).await.unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::InternalError);
        assert_eq!(err.http_status(), 500);
        assert_eq!(store.append_calls(), 4);
    }

    #[tokio::test]
    async fn test_registration_attempts_floor_at_one() {
        let store = Arc::new(ScriptedStore::new(MemorySessionStore::new(), true));
        let service = SessionService::new(store.clone()).with_registration_attempts(0);
        let session = upcoming(&service, &user(), "Contended", 100, 200, 3).await;

        let err = service.register(&user(), session.id).await.unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::InternalError);
        assert_eq!(store.append_calls(), 1);
    }

    #[tokio::test]
    async fn test_range_reported_before_capacity() {
        let (service, store) = service();
        let owner = user();

        let err = service
            .create_proposal(&owner, new_session("Both wrong", 200, 100, 0))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidRange);
        assert!(store.is_empty().await);

        let session = service
            .create_proposal(&owner, new_session("Fine", 100, 200, 3))
            .await
            .unwrap();
        let err = service
            .edit_session(
                &owner,
                session.id,
                SessionChanges {
                    time_end: Some(at(50)),
                    maximum_participants: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidRange);
    }

    #[tokio::test]
    async fn test_oversized_capacity_is_bad_request() {
        let (service, store) = service();

        let err = service
            .create_proposal(&user(), new_session("Stadium", 100, 200, 3_000_000_000))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::BadRequest(_)));
        assert_eq!(err.http_status(), 400);
        assert!(store.is_empty().await);
    }
}
