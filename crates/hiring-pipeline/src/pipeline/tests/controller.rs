use super::common::*;
use crate::pipeline::cache::QueryKey;
use crate::pipeline::client::{StatusUpdateError, FETCH_APPLICANTS_FALLBACK, STATUS_UPDATE_FALLBACK};
use crate::pipeline::controller::SyncOutcome;
use crate::pipeline::domain::{ApplicationId, ApplicationStatus};
use crate::pipeline::notify::NotificationLevel;

#[tokio::test]
async fn sync_fetches_once_then_reuses_cached_list() {
    let mut harness = harness();

    let first = harness.controller.sync().await.expect("initial sync");
    let second = harness.controller.sync().await.expect("second sync");

    assert_eq!(first, SyncOutcome::Fetched);
    assert_eq!(second, SyncOutcome::Current);
    assert_eq!(harness.source.calls(), 1);
    assert_eq!(harness.controller.board().len(), applications().len());
}

#[tokio::test]
async fn sync_rebuilds_when_cached_list_changes_identity() {
    let mut harness = harness();
    harness.controller.sync().await.expect("initial sync");

    harness.cache.store(
        QueryKey::Applicants(job_id()),
        vec![application("A9", ApplicationStatus::Hired)],
    );

    let outcome = harness.controller.sync().await.expect("resync");
    assert_eq!(outcome, SyncOutcome::Refreshed);
    assert_eq!(harness.controller.board().len(), 1);
    assert_eq!(
        harness.controller.board().locate("A9"),
        Some(ApplicationStatus::Hired)
    );
    assert_eq!(harness.source.calls(), 1);
}

#[tokio::test]
async fn sync_failure_notifies_and_keeps_board() {
    let mut harness = harness_with(StaticSource::failing(), RecordingUpdater::default());

    let result = harness.controller.sync().await;

    assert!(result.is_err());
    assert!(harness.controller.board().is_empty());
    let errors = harness.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, FETCH_APPLICANTS_FALLBACK);
}

#[tokio::test]
async fn cross_column_drop_dispatches_exactly_one_update() {
    let mut harness = harness();
    harness.controller.sync().await.expect("initial sync");

    harness.controller.drag_start("A1");
    let result = harness.controller.drag_end("A1", Some("Interview"));

    let handle = result.dispatched.expect("update dispatched");
    // Optimistic state is visible before the request completes.
    assert_eq!(
        harness.controller.board().column(ApplicationStatus::Interview).ids(),
        ["A1"]
    );
    assert!(!harness
        .controller
        .board()
        .column(ApplicationStatus::Submitted)
        .ids()
        .contains(&"A1"));

    let updated = handle.await.expect("task joins").expect("update succeeds");
    assert_eq!(updated.status, ApplicationStatus::Interview);
    assert_eq!(
        harness.updater.calls(),
        vec![(ApplicationId::from("A1"), ApplicationStatus::Interview)]
    );
    assert!(harness.controller.board().active().is_none());
}

#[tokio::test]
async fn reorder_never_reaches_the_backend() {
    let mut harness = harness();
    harness.controller.sync().await.expect("initial sync");

    let result = harness.controller.drag_end("A3", Some("A1"));

    assert!(result.dispatched.is_none());
    assert_eq!(
        harness.controller.board().column(ApplicationStatus::Submitted).ids(),
        ["A3", "A1", "A2"]
    );
    assert!(harness.updater.calls().is_empty());
    assert!(harness.notifier.events().is_empty());
}

#[tokio::test]
async fn successful_update_invalidates_cache_and_next_sync_refetches() {
    let mut harness = harness();
    harness.controller.sync().await.expect("initial sync");

    let result = harness.controller.drag_end("A2", Some("Offer"));
    result
        .dispatched
        .expect("update dispatched")
        .await
        .expect("task joins")
        .expect("update succeeds");

    assert!(harness.cache.get(&QueryKey::Applicants(job_id())).is_none());
    let events = harness.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, NotificationLevel::Success);

    let mut authoritative = applications();
    authoritative[1].status = ApplicationStatus::Offer;
    harness.source.replace(authoritative);

    let outcome = harness.controller.sync().await.expect("refetch");
    assert_eq!(outcome, SyncOutcome::Fetched);
    assert_eq!(harness.source.calls(), 2);
    assert_eq!(
        harness.controller.board().column(ApplicationStatus::Offer).ids(),
        ["A2", "A5"]
    );
}

#[tokio::test]
async fn failed_update_keeps_optimistic_board_and_surfaces_server_message() {
    let mut harness = harness_with(
        StaticSource::with(applications()),
        RecordingUpdater::rejecting(Some("Application is locked")),
    );
    harness.controller.sync().await.expect("initial sync");

    let result = harness.controller.drag_end("A1", Some("Hired"));
    let optimistic = harness.controller.board().clone();

    let error = result
        .dispatched
        .expect("update dispatched")
        .await
        .expect("task joins")
        .expect_err("update rejected");

    assert!(matches!(error, StatusUpdateError::Rejected { .. }));
    assert_eq!(harness.controller.board(), &optimistic);
    assert_eq!(
        harness.controller.board().locate("A1"),
        Some(ApplicationStatus::Hired)
    );
    assert!(harness.cache.get(&QueryKey::Applicants(job_id())).is_some());
    let errors = harness.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Application is locked");
}

#[tokio::test]
async fn failed_update_without_server_message_uses_fallback() {
    let harness = harness_with(
        StaticSource::with(applications()),
        RecordingUpdater::rejecting(None),
    );

    let result = harness
        .controller
        .update_status(&ApplicationId::from("A4"), ApplicationStatus::Rejected)
        .await;

    assert!(result.is_err());
    assert_eq!(
        harness.notifier.errors()[0].message,
        STATUS_UPDATE_FALLBACK
    );
}

#[tokio::test]
async fn concurrent_drops_each_dispatch_their_own_update() {
    let mut harness = harness();
    harness.controller.sync().await.expect("initial sync");

    let first = harness.controller.drag_end("A1", Some("Interview"));
    let second = harness.controller.drag_end("A2", Some("Rejected"));

    for result in [first, second] {
        result
            .dispatched
            .expect("update dispatched")
            .await
            .expect("task joins")
            .expect("update succeeds");
    }

    let mut calls = harness.updater.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            (ApplicationId::from("A1"), ApplicationStatus::Interview),
            (ApplicationId::from("A2"), ApplicationStatus::Rejected),
        ]
    );
}
