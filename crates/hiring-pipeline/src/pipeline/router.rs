use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, JobId, StatusUpdateRequest};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationServiceError, ApplicationStatusService};

/// Router builder exposing the pipeline read and status-update endpoints.
pub fn application_router<R>(service: Arc<ApplicationStatusService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/v1/jobs/:job_id/applications", get(list_handler::<R>))
        .route("/v1/applications/:application_id", get(get_handler::<R>))
        .route(
            "/v1/applications/:application_id/status",
            put(update_status_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ApplicationServiceError::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let message = match &error {
        ApplicationServiceError::Repository(RepositoryError::NotFound) => {
            "application not found".to_string()
        }
        other => other.to_string(),
    };
    (status, axum::Json(json!({ "message": message }))).into_response()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ApplicationStatusService<R>>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.list_for_job(&JobId(job_id)) {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<ApplicationStatusService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<R>(
    State(service): State<Arc<ApplicationStatusService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_status_raw(&id, &request.status) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}
