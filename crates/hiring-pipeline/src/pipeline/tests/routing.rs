use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::pipeline::domain::{ApplicationId, ApplicationStatus, StatusUpdateRequest};
use crate::pipeline::repository::ApplicationRepository;
use crate::pipeline::router::{application_router, update_status_handler};
use crate::pipeline::service::ApplicationStatusService;

fn put_status(id: &str, status: &str) -> Request<Body> {
    Request::put(format!("/v1/applications/{id}/status"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({ "status": status })).expect("encode body"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn put_status_returns_updated_record() {
    let (service, repository) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(put_status("A1", "Interview"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("id"), Some(&json!("A1")));
    assert_eq!(payload.get("status"), Some(&json!("Interview")));

    let stored = repository
        .fetch(&ApplicationId::from("A1"))
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, ApplicationStatus::Interview);
}

#[tokio::test]
async fn put_status_unknown_application_is_not_found_with_message() {
    let (service, _) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(put_status("A404", "Offer"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("message"), Some(&json!("application not found")));
}

#[tokio::test]
async fn put_status_rejects_unknown_status() {
    let (service, _) = build_service();
    let service = Arc::new(service);

    let response = update_status_handler(
        State(service),
        Path("A1".to_string()),
        axum::Json(StatusUpdateRequest {
            status: "Archived".to_string(),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .contains("Archived"));
}

#[tokio::test]
async fn put_status_reports_storage_outage() {
    let service = Arc::new(ApplicationStatusService::new(Arc::new(UnavailableRepository)));

    let response = update_status_handler(
        State(service),
        Path("A1".to_string()),
        axum::Json(StatusUpdateRequest::from(ApplicationStatus::Hired)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn list_route_returns_job_applications_in_order() {
    let (service, _) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get(format!("/v1/jobs/{}/applications", job_id()))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let ids: Vec<_> = payload
        .as_array()
        .expect("array payload")
        .iter()
        .filter_map(|item| item.get("id").and_then(serde_json::Value::as_str))
        .collect();
    assert_eq!(ids, ["A1", "A2", "A3", "A4", "A5"]);
}

#[tokio::test]
async fn get_route_returns_single_application() {
    let (service, _) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/v1/applications/A4")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("In Review")));
    assert_eq!(
        payload.pointer("/applicant/display_name"),
        Some(&json!("Candidate A4"))
    );
}
