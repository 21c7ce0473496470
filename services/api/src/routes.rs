//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use session_core::{Actor, AdminService, ProposalAction, SessionService};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    models::{
        CreateSessionRequest, DecisionRequest, EditSessionRequest, FeedbackRequest,
        FeedbackResponse, SessionResponse,
    },
    state::AppState,
};

type JsonBody<T> = WithRejection<Json<T>, ApiError>;
type IdPath<T> = WithRejection<Path<T>, ApiError>;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/proposals", post(create_proposal))
        .route("/sessions/proposals", get(list_proposals))
        .route(
            "/sessions/:id",
            get(get_session).put(edit_session).delete(delete_session),
        )
        .route("/sessions/:id/proposal", patch(decide_proposal))
        .route("/sessions/:id/register", post(register))
        .route("/sessions/:id/feedback", post(add_feedback))
        .route(
            "/sessions/:id/feedback/:feedback_id",
            delete(remove_feedback),
        )
        .route("/admin/users", get(list_users))
        .route(
            "/admin/user/:id/event-coordinator",
            patch(promote_to_coordinator),
        )
        .route("/admin/user/:id", delete(remove_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", get(list_sessions))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "session-service"
    }))
}

/// Published sessions, open to anonymous callers
pub async fn list_sessions(State(sessions): State<SessionService>) -> ApiResult<impl IntoResponse> {
    let sessions = sessions.list_sessions().await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(sessions): State<SessionService>,
    WithRejection(Path(id), _): IdPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let session = sessions.get_session(id).await?;
    Ok(Json(session))
}

/// Propose a new session
pub async fn create_proposal(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Json(payload), _): JsonBody<CreateSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = sessions.create_proposal(&actor, payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new("Proposal created successfully", session)),
    ))
}

/// Pending proposals (coordinators only)
pub async fn list_proposals(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<impl IntoResponse> {
    let proposals = sessions.list_proposals(&actor).await?;
    Ok(Json(proposals))
}

/// Accept or reject a proposal
pub async fn decide_proposal(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
    WithRejection(Json(payload), _): JsonBody<DecisionRequest>,
) -> ApiResult<impl IntoResponse> {
    let action: ProposalAction = payload.action.parse()?;
    let session = sessions.decide_proposal(&actor, id, action).await?;

    let message = match action {
        ProposalAction::Accept => "Proposal accepted",
        ProposalAction::Reject => "Proposal rejected",
    };
    Ok(Json(SessionResponse::new(message, session)))
}

/// Edit a session owned by the caller
pub async fn edit_session(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
    WithRejection(Json(payload), _): JsonBody<EditSessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = sessions.edit_session(&actor, id, payload.into()).await?;
    Ok(Json(SessionResponse::new("Session updated successfully", session)))
}

/// Delete a session by ID
pub async fn delete_session(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    sessions.delete_session(&actor, id).await?;
    Ok(Json(json!({"message": "Session deleted successfully"})))
}

/// Join an upcoming session
pub async fn register(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let session = sessions.register(&actor, id).await?;
    Ok(Json(SessionResponse::new("Registered successfully", session)))
}

pub async fn add_feedback(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
    WithRejection(Json(payload), _): JsonBody<FeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let feedback = sessions.add_feedback(&actor, id, &payload.comment).await?;

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message: "Feedback added successfully".to_string(),
            feedback,
        }),
    ))
}

pub async fn remove_feedback(
    State(sessions): State<SessionService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path((id, feedback_id)), _): IdPath<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    sessions.remove_feedback(&actor, id, feedback_id).await?;
    Ok(Json(json!({"message": "Feedback removed successfully"})))
}

/// All users (admins only)
pub async fn list_users(
    State(admin): State<AdminService>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<impl IntoResponse> {
    let users = admin.list_users(&actor).await?;
    Ok(Json(users))
}

pub async fn promote_to_coordinator(
    State(admin): State<AdminService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = admin.promote_to_coordinator(&actor, id).await?;
    Ok(Json(json!({
        "message": "User promoted to event coordinator",
        "user": user,
    })))
}

pub async fn remove_user(
    State(admin): State<AdminService>,
    Extension(actor): Extension<Actor>,
    WithRejection(Path(id), _): IdPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    admin.remove_user(&actor, id).await?;
    Ok(Json(json!({"message": "User removed successfully"})))
}
