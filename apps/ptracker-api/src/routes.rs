use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use ptracker_domain::EntityKind;
use ptracker_service::{
	ActionResponse, AnalyzeSourcesRequest, AnalyzeSourcesResponse, CandidateResponse,
	CitationInput, CitationResponse, CreateActionRequest, CreateCandidateRequest,
	CreatePromiseRequest, Error as ServiceError, JobResponse, Page, PromiseResponse,
	UpdateActionRequest, UpdatePromiseRequest,
};

use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/candidates", get(list_candidates).post(create_candidate))
		.route("/v1/candidates/{candidate_id}", get(get_candidate))
		.route("/v1/candidates/{candidate_id}/sources", post(analyze_sources))
		.route("/v1/jobs/{job_id}", get(get_job))
		.route("/v1/candidates/{candidate_id}/promises", get(list_promises).post(create_promise))
		.route(
			"/v1/candidates/{candidate_id}/promises/{promise_id}",
			get(get_promise).patch(update_promise),
		)
		.route(
			"/v1/candidates/{candidate_id}/promises/{promise_id}/actions",
			get(list_promise_actions),
		)
		.route(
			"/v1/candidates/{candidate_id}/promises/{promise_id}/citations",
			get(list_promise_citations).post(add_promise_citation),
		)
		.route("/v1/candidates/{candidate_id}/actions", get(list_actions).post(create_action))
		.route(
			"/v1/candidates/{candidate_id}/actions/{action_id}",
			get(get_action).patch(update_action),
		)
		.route(
			"/v1/candidates/{candidate_id}/actions/{action_id}/promises",
			get(list_action_promises),
		)
		.route(
			"/v1/candidates/{candidate_id}/actions/{action_id}/citations",
			get(list_action_citations).post(add_action_citation),
		)
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_candidate(
	State(state): State<AppState>,
	Json(payload): Json<CreateCandidateRequest>,
) -> ApiResult<(StatusCode, Json<CandidateResponse>)> {
	let response = state.service.create_candidate(payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn list_candidates(
	State(state): State<AppState>,
	Query(page): Query<Page>,
) -> ApiResult<Json<Vec<CandidateResponse>>> {
	Ok(Json(state.service.list_candidates(page).await?))
}

async fn get_candidate(
	State(state): State<AppState>,
	Path(candidate_id): Path<Uuid>,
) -> ApiResult<Json<CandidateResponse>> {
	Ok(Json(state.service.get_candidate(candidate_id).await?))
}

async fn analyze_sources(
	State(state): State<AppState>,
	Path(candidate_id): Path<Uuid>,
	Json(payload): Json<AnalyzeSourcesRequest>,
) -> ApiResult<(StatusCode, Json<AnalyzeSourcesResponse>)> {
	let response = state.service.analyze_sources_request(candidate_id, payload).await?;

	Ok((StatusCode::ACCEPTED, Json(response)))
}

async fn get_job(
	State(state): State<AppState>,
	Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobResponse>> {
	Ok(Json(state.service.get_job(job_id).await?))
}

async fn list_promises(
	State(state): State<AppState>,
	Path(candidate_id): Path<Uuid>,
	Query(page): Query<Page>,
) -> ApiResult<Json<Vec<PromiseResponse>>> {
	Ok(Json(state.service.list_promises(candidate_id, page).await?))
}

async fn create_promise(
	State(state): State<AppState>,
	Path(candidate_id): Path<Uuid>,
	Json(payload): Json<CreatePromiseRequest>,
) -> ApiResult<(StatusCode, Json<PromiseResponse>)> {
	let response = state.service.create_promise(candidate_id, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_promise(
	State(state): State<AppState>,
	Path((candidate_id, promise_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PromiseResponse>> {
	Ok(Json(state.service.get_promise(candidate_id, promise_id).await?))
}

async fn update_promise(
	State(state): State<AppState>,
	Path((candidate_id, promise_id)): Path<(Uuid, Uuid)>,
	Json(payload): Json<UpdatePromiseRequest>,
) -> ApiResult<Json<PromiseResponse>> {
	Ok(Json(state.service.update_promise(candidate_id, promise_id, payload).await?))
}

async fn list_promise_actions(
	State(state): State<AppState>,
	Path((candidate_id, promise_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<ActionResponse>>> {
	Ok(Json(state.service.list_promise_actions(candidate_id, promise_id).await?))
}

async fn list_promise_citations(
	State(state): State<AppState>,
	Path((candidate_id, promise_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<CitationResponse>>> {
	let citations =
		state.service.list_citations(EntityKind::Promise, candidate_id, promise_id).await?;

	Ok(Json(citations))
}

async fn add_promise_citation(
	State(state): State<AppState>,
	Path((candidate_id, promise_id)): Path<(Uuid, Uuid)>,
	Json(payload): Json<CitationInput>,
) -> ApiResult<(StatusCode, Json<CitationResponse>)> {
	let citation = state
		.service
		.add_citation(EntityKind::Promise, candidate_id, promise_id, payload)
		.await?;

	Ok((StatusCode::CREATED, Json(citation)))
}

async fn list_actions(
	State(state): State<AppState>,
	Path(candidate_id): Path<Uuid>,
	Query(page): Query<Page>,
) -> ApiResult<Json<Vec<ActionResponse>>> {
	Ok(Json(state.service.list_actions(candidate_id, page).await?))
}

async fn create_action(
	State(state): State<AppState>,
	Path(candidate_id): Path<Uuid>,
	Json(payload): Json<CreateActionRequest>,
) -> ApiResult<(StatusCode, Json<ActionResponse>)> {
	let response = state.service.create_action(candidate_id, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_action(
	State(state): State<AppState>,
	Path((candidate_id, action_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ActionResponse>> {
	Ok(Json(state.service.get_action(candidate_id, action_id).await?))
}

async fn update_action(
	State(state): State<AppState>,
	Path((candidate_id, action_id)): Path<(Uuid, Uuid)>,
	Json(payload): Json<UpdateActionRequest>,
) -> ApiResult<Json<ActionResponse>> {
	Ok(Json(state.service.update_action(candidate_id, action_id, payload).await?))
}

async fn list_action_promises(
	State(state): State<AppState>,
	Path((candidate_id, action_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<PromiseResponse>>> {
	Ok(Json(state.service.list_action_promises(candidate_id, action_id).await?))
}

async fn list_action_citations(
	State(state): State<AppState>,
	Path((candidate_id, action_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<CitationResponse>>> {
	let citations =
		state.service.list_citations(EntityKind::Action, candidate_id, action_id).await?;

	Ok(Json(citations))
}

async fn add_action_citation(
	State(state): State<AppState>,
	Path((candidate_id, action_id)): Path<(Uuid, Uuid)>,
	Json(payload): Json<CitationInput>,
) -> ApiResult<(StatusCode, Json<CitationResponse>)> {
	let citation = state
		.service
		.add_citation(EntityKind::Action, candidate_id, action_id, payload)
		.await?;

	Ok((StatusCode::CREATED, Json(citation)))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			ServiceError::InvariantViolation { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVARIANT_VIOLATION", message, None),
			ServiceError::LinkMismatch { message, ids } =>
				Self::new(StatusCode::BAD_REQUEST, "LINK_MISMATCH", message, id_fields(&ids)),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::Conflict { message, ids } =>
				Self::new(StatusCode::CONFLICT, "CONFLICT", message, id_fields(&ids)),
			ServiceError::Extraction { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "EXTRACTION_FAILED", message, None),
			ServiceError::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage error while serving request.");

				Self::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"STORAGE_ERROR",
					"Internal storage error.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

fn id_fields(ids: &[Uuid]) -> Option<Vec<String>> {
	Some(ids.iter().map(Uuid::to_string).collect())
}
