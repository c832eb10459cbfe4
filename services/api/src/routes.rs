use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use hiring_pipeline::error::AppError;
use hiring_pipeline::pipeline::{
    application_router, ApplicationRepository, ApplicationStatusService, Board, JobId,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_application_routes<R>(service: Arc<ApplicationStatusService<R>>) -> axum::Router
where
    R: ApplicationRepository + 'static,
{
    application_router(service.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/v1/jobs/:job_id/board",
            axum::routing::get(board_endpoint::<R>),
        )
        .layer(Extension(service))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Server-side view of the board, partitioned exactly as the client would.
pub(crate) async fn board_endpoint<R>(
    Extension(service): Extension<Arc<ApplicationStatusService<R>>>,
    Path(job_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError>
where
    R: ApplicationRepository + 'static,
{
    let job_id = JobId(job_id);
    let board = Board::new(service.list_for_job(&job_id)?);

    Ok(Json(json!({
        "job_id": job_id,
        "total": board.len(),
        "columns": board.summary(),
    })))
}
