//! Session lifecycle and conflict-resolution engine
//!
//! This crate owns the rules for proposing, deciding, editing, joining and
//! commenting on time-bounded, capacity-limited sessions. Persistence and
//! authentication are reached through the narrow contracts in [`store`] and
//! the [`model::Actor`] value; HTTP lives in the `api` service.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use session_core::{
//!     Actor, NewSession, ProposalAction, Role, SessionService, memory::MemorySessionStore,
//! };
//! use uuid::Uuid;
//!
//! # async fn run() -> Result<(), session_core::SessionError> {
//! let service = SessionService::new(Arc::new(MemorySessionStore::new()));
//! let owner = Actor::new(Uuid::new_v4(), Role::User);
//! let start = Utc::now() + Duration::days(1);
//!
//! let proposal = service
//!     .create_proposal(
//!         &owner,
//!         NewSession {
//!             title: "Async Rust".to_string(),
//!             description: "Futures from the ground up".to_string(),
//!             time_start: start,
//!             time_end: start + Duration::hours(2),
//!             maximum_participants: 30,
//!         },
//!     )
//!     .await?;
//!
//! let coordinator = Actor::new(Uuid::new_v4(), Role::EventCoordinator);
//! service
//!     .decide_proposal(&coordinator, proposal.id, ProposalAction::Accept)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod capacity;
pub mod error;
pub mod feedback;
pub mod lifecycle;
pub mod memory;
pub mod model;
pub mod overlap;
pub mod policy;
pub mod service;
pub mod store;

pub use admin::AdminService;
pub use error::{ErrorKind, SessionError, SessionResult};
pub use feedback::Feedback;
pub use lifecycle::ProposalAction;
pub use model::{Actor, NewSession, Role, Session, SessionChanges, SessionStatus, User};
pub use overlap::TimeRange;
pub use service::SessionService;
pub use store::{SessionFilter, SessionStore, UserStore};
