use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::pipeline::board::Board;
use crate::pipeline::cache::QueryCache;
use crate::pipeline::client::{ApplicantSource, FetchError, StatusUpdateError, StatusUpdater};
use crate::pipeline::controller::PipelineController;
use crate::pipeline::domain::{
    ApplicantSummary, Application, ApplicationId, ApplicationStatus, JobId,
};
use crate::pipeline::notify::RecordingNotifier;
use crate::pipeline::repository::{
    ApplicationRepository, MemoryApplicationRepository, RepositoryError,
};
use crate::pipeline::service::ApplicationStatusService;

pub(super) fn job_id() -> JobId {
    JobId::from("job-ux-101")
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn application(id: &str, status: ApplicationStatus) -> Application {
    let offset: i64 = id
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(0);
    Application {
        id: ApplicationId::from(id),
        job_id: job_id(),
        status,
        applicant: ApplicantSummary {
            display_name: format!("Candidate {id}"),
            headline: Some("Accessibility engineer".to_string()),
            location: Some("Remote".to_string()),
            accommodations: vec!["Screen reader friendly interviews".to_string()],
        },
        submitted_at: base_time() + Duration::hours(offset),
    }
}

/// Three submitted candidates plus one in each of two later stages.
pub(super) fn applications() -> Vec<Application> {
    vec![
        application("A1", ApplicationStatus::Submitted),
        application("A2", ApplicationStatus::Submitted),
        application("A3", ApplicationStatus::Submitted),
        application("A4", ApplicationStatus::InReview),
        application("A5", ApplicationStatus::Offer),
    ]
}

pub(super) fn board() -> Board {
    Board::new(applications())
}

/// Applicant source returning a fixed list and counting how often it was asked.
#[derive(Default)]
pub(super) struct StaticSource {
    applications: Mutex<Vec<Application>>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticSource {
    pub(super) fn with(applications: Vec<Application>) -> Self {
        Self {
            applications: Mutex::new(applications),
            ..Default::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub(super) fn replace(&self, applications: Vec<Application>) {
        *self.applications.lock().expect("source mutex poisoned") = applications;
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApplicantSource for StaticSource {
    async fn fetch_applicants(&self, _job_id: &JobId) -> Result<Vec<Application>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Transport("connection refused".to_string()));
        }
        Ok(self.applications.lock().expect("source mutex poisoned").clone())
    }
}

/// Status updater recording every call; optionally rejects them all.
#[derive(Default)]
pub(super) struct RecordingUpdater {
    calls: Mutex<Vec<(ApplicationId, ApplicationStatus)>>,
    reject_with: Option<Option<String>>,
}

impl RecordingUpdater {
    pub(super) fn rejecting(message: Option<&str>) -> Self {
        Self {
            reject_with: Some(message.map(str::to_string)),
            ..Default::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<(ApplicationId, ApplicationStatus)> {
        self.calls.lock().expect("updater mutex poisoned").clone()
    }
}

#[async_trait]
impl StatusUpdater for RecordingUpdater {
    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, StatusUpdateError> {
        self.calls
            .lock()
            .expect("updater mutex poisoned")
            .push((id.clone(), status));

        match &self.reject_with {
            Some(message) => Err(StatusUpdateError::Rejected {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(application(id.as_str(), status)),
        }
    }
}

pub(super) type TestController = PipelineController<StaticSource, RecordingUpdater, RecordingNotifier>;

pub(super) struct Harness {
    pub(super) controller: TestController,
    pub(super) cache: Arc<QueryCache>,
    pub(super) source: Arc<StaticSource>,
    pub(super) updater: Arc<RecordingUpdater>,
    pub(super) notifier: Arc<RecordingNotifier>,
}

pub(super) fn harness_with(source: StaticSource, updater: RecordingUpdater) -> Harness {
    let cache = Arc::new(QueryCache::new());
    let source = Arc::new(source);
    let updater = Arc::new(updater);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = PipelineController::new(
        job_id(),
        cache.clone(),
        source.clone(),
        updater.clone(),
        notifier.clone(),
    );
    Harness {
        controller,
        cache,
        source,
        updater,
        notifier,
    }
}

pub(super) fn harness() -> Harness {
    harness_with(
        StaticSource::with(applications()),
        RecordingUpdater::default(),
    )
}

pub(super) fn build_service() -> (
    ApplicationStatusService<MemoryApplicationRepository>,
    Arc<MemoryApplicationRepository>,
) {
    let repository = Arc::new(MemoryApplicationRepository::seeded(applications()));
    let service = ApplicationStatusService::new(repository.clone());
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_job(&self, _job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
