use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::access::Actor;
use super::applications::ApplicationDesk;
use super::availability::AllocationResolver;
use super::domain::{
    ApplicationId, ApplicationStatus, NotificationId, ProposalDraft, ProposalId, ProposalStatus,
    RequestId, RequestStatus, RequestSubmission,
};
use super::notify::NotificationCenter;
use super::proposals::{ProposalDesk, ReviewDecision};
use super::repository::UserDirectory;
use super::requests::RequestDesk;
use super::PlacementError;

/// Shared service wiring handed to the router.
pub struct PlacementState {
    pub directory: Arc<dyn UserDirectory>,
    pub resolver: AllocationResolver,
    pub proposals: ProposalDesk,
    pub requests: RequestDesk,
    pub applications: ApplicationDesk,
    pub center: Arc<NotificationCenter>,
}

impl IntoResponse for PlacementError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlacementError::Validation(_) => StatusCode::BAD_REQUEST,
            PlacementError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacementError::Forbidden(_) => StatusCode::FORBIDDEN,
            PlacementError::Conflict(_) => StatusCode::CONFLICT,
            PlacementError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Store failures are logged with context but the payload stays
        // generic so statement parameters never reach the caller.
        let message = if let PlacementError::Store(detail) = &self {
            error!(error = %detail, "placement store failure");
            "internal storage error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Router builder exposing the placement boundary surface. The actor is
/// identified by an `x-user-id` header resolved through the user directory;
/// session authentication itself lives outside the engine.
pub fn placement_router(state: Arc<PlacementState>) -> Router {
    Router::new()
        .route(
            "/api/v1/placement/supervisors",
            get(available_supervisors_handler),
        )
        .route(
            "/api/v1/placement/classmates",
            get(eligible_classmates_handler),
        )
        .route(
            "/api/v1/placement/proposals",
            post(submit_proposal_handler).get(list_proposals_handler),
        )
        .route(
            "/api/v1/placement/proposals/mine",
            get(list_my_proposals_handler),
        )
        .route(
            "/api/v1/placement/proposals/:id",
            get(get_proposal_handler)
                .put(update_proposal_handler)
                .delete(delete_proposal_handler),
        )
        .route(
            "/api/v1/placement/proposals/:id/status",
            post(proposal_status_handler),
        )
        .route(
            "/api/v1/placement/proposals/:id/approval",
            post(proposal_approval_handler),
        )
        .route(
            "/api/v1/placement/proposals/:id/archive",
            post(archive_proposal_handler),
        )
        .route(
            "/api/v1/placement/requests",
            post(submit_request_handler).get(list_requests_handler),
        )
        .route(
            "/api/v1/placement/requests/mine",
            get(list_my_requests_handler),
        )
        .route("/api/v1/placement/requests/:id", get(get_request_handler))
        .route(
            "/api/v1/placement/requests/:id/status",
            post(request_status_handler),
        )
        .route(
            "/api/v1/placement/applications",
            post(submit_application_handler).get(list_applications_handler),
        )
        .route(
            "/api/v1/placement/applications/mine",
            get(list_my_applications_handler),
        )
        .route(
            "/api/v1/placement/applications/status",
            post(bulk_application_status_handler),
        )
        .route(
            "/api/v1/placement/applications/:id",
            get(get_application_handler).delete(withdraw_application_handler),
        )
        .route(
            "/api/v1/placement/applications/:id/status",
            post(application_status_handler),
        )
        .route("/api/v1/placement/notifications", get(inbox_handler))
        .route(
            "/api/v1/placement/notifications/:id/read",
            post(mark_read_handler),
        )
        .with_state(state)
}

fn actor_from(state: &PlacementState, headers: &HeaderMap) -> Result<Actor, PlacementError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| PlacementError::Forbidden("missing x-user-id header".to_string()))?;

    let user = state
        .directory
        .fetch(&super::domain::UserId(raw.to_string()))?
        .ok_or_else(|| PlacementError::Forbidden("unknown user".to_string()))?;

    Ok(Actor::new(user.id, user.role))
}

async fn available_supervisors_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    actor_from(&state, &headers)?;
    let slots = state.resolver.available_supervisors()?;
    Ok(Json(slots).into_response())
}

async fn eligible_classmates_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let listing = state.resolver.eligible_classmates(&actor.id)?;
    Ok(Json(listing).into_response())
}

async fn submit_proposal_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Json(draft): Json<ProposalDraft>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.proposals.submit(&actor, draft)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

async fn list_proposals_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let views = state.proposals.list_all(&actor)?;
    Ok(Json(views).into_response())
}

async fn list_my_proposals_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let views = state.proposals.list_mine(&actor)?;
    Ok(Json(views).into_response())
}

async fn get_proposal_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.proposals.get(&actor, &ProposalId(id))?;
    Ok(Json(view).into_response())
}

async fn update_proposal_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<ProposalDraft>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.proposals.update(&actor, &ProposalId(id), draft)?;
    Ok(Json(view).into_response())
}

async fn delete_proposal_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    state.proposals.delete(&actor, &ProposalId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
struct ProposalStatusBody {
    status: ProposalStatus,
}

async fn proposal_status_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ProposalStatusBody>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state
        .proposals
        .set_status(&actor, &ProposalId(id), body.status)?;
    Ok(Json(view).into_response())
}

async fn proposal_approval_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(decision): Json<ReviewDecision>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state
        .proposals
        .set_approval(&actor, &ProposalId(id), decision)?;
    Ok(Json(view).into_response())
}

async fn archive_proposal_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    state.proposals.archive(&actor, &ProposalId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn submit_request_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Json(submission): Json<RequestSubmission>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.requests.submit(&actor, submission)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

async fn list_requests_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let views = state.requests.list_all(&actor)?;
    Ok(Json(views).into_response())
}

async fn list_my_requests_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let views = state.requests.list_mine(&actor)?;
    Ok(Json(views).into_response())
}

async fn get_request_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.requests.get(&actor, &RequestId(id))?;
    Ok(Json(view).into_response())
}

#[derive(Debug, Deserialize)]
struct RequestStatusBody {
    status: RequestStatus,
}

async fn request_status_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RequestStatusBody>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state
        .requests
        .set_status(&actor, &RequestId(id), body.status)?;
    Ok(Json(view).into_response())
}

#[derive(Debug, Deserialize)]
struct ApplicationBody {
    offer_id: String,
}

async fn submit_application_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Json(body): Json<ApplicationBody>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.applications.submit(&actor, &body.offer_id)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

async fn list_applications_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let views = state.applications.list_all(&actor)?;
    Ok(Json(views).into_response())
}

async fn list_my_applications_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let views = state.applications.list_mine(&actor)?;
    Ok(Json(views).into_response())
}

async fn get_application_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state.applications.get(&actor, &ApplicationId(id))?;
    Ok(Json(view).into_response())
}

async fn withdraw_application_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    state.applications.withdraw(&actor, &ApplicationId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
struct ApplicationStatusBody {
    status: ApplicationStatus,
}

async fn application_status_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ApplicationStatusBody>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let view = state
        .applications
        .set_status(&actor, &ApplicationId(id), body.status)?;
    Ok(Json(view).into_response())
}

#[derive(Debug, Deserialize)]
struct BulkStatusBody {
    ids: Vec<String>,
    status: ApplicationStatus,
}

async fn bulk_application_status_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Json(body): Json<BulkStatusBody>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let ids: Vec<ApplicationId> = body.ids.into_iter().map(ApplicationId).collect();
    let outcome = state
        .applications
        .set_status_bulk(&actor, &ids, body.status)?;
    Ok(Json(outcome).into_response())
}

async fn inbox_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    let inbox = state.center.inbox(&actor)?;
    Ok(Json(inbox).into_response())
}

async fn mark_read_handler(
    State(state): State<Arc<PlacementState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, PlacementError> {
    let actor = actor_from(&state, &headers)?;
    state.center.mark_read(&actor, &NotificationId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
