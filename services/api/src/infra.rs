use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hiring_pipeline::pipeline::{
    ApplicantSource, ApplicantSummary, Application, ApplicationId, ApplicationRepository,
    ApplicationServiceError, ApplicationStatus, ApplicationStatusService, FetchError, JobId,
    RepositoryError, StatusUpdateError, StatusUpdater,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) const DEMO_JOB_ID: &str = "job-accessibility-lead";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn demo_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Applicants the service starts with so the board has something to show.
pub(crate) fn demo_applications() -> Vec<Application> {
    let job_id = JobId::from(DEMO_JOB_ID);
    let seed = [
        (
            "app-001",
            "Amara Okafor",
            "Frontend developer, WCAG auditor",
            vec!["Captioned video interviews"],
            ApplicationStatus::Submitted,
        ),
        (
            "app-002",
            "Daniel Reyes",
            "QA engineer with assistive tech focus",
            vec![],
            ApplicationStatus::Submitted,
        ),
        (
            "app-003",
            "Priya Natarajan",
            "UX researcher",
            vec!["Extended time for take-home tasks"],
            ApplicationStatus::InReview,
        ),
        (
            "app-004",
            "Jonas Lindqvist",
            "Design systems engineer",
            vec!["Step-free office access"],
            ApplicationStatus::Interview,
        ),
        (
            "app-005",
            "Grace Mwangi",
            "Accessibility program manager",
            vec![],
            ApplicationStatus::Offer,
        ),
    ];

    seed.into_iter()
        .enumerate()
        .map(|(index, (id, name, headline, accommodations, status))| Application {
            id: ApplicationId::from(id),
            job_id: job_id.clone(),
            status,
            applicant: ApplicantSummary {
                display_name: name.to_string(),
                headline: Some(headline.to_string()),
                location: Some("Remote".to_string()),
                accommodations: accommodations.into_iter().map(str::to_string).collect(),
            },
            submitted_at: demo_epoch() + Duration::hours(index as i64 * 6),
        })
        .collect()
}

/// Serves the pipeline client traits straight from the service, skipping HTTP.
pub(crate) struct LocalBackend<R> {
    service: Arc<ApplicationStatusService<R>>,
    offline: AtomicBool,
}

impl<R> LocalBackend<R>
where
    R: ApplicationRepository + 'static,
{
    pub(crate) fn new(service: Arc<ApplicationStatusService<R>>) -> Self {
        Self {
            service,
            offline: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<R> ApplicantSource for LocalBackend<R>
where
    R: ApplicationRepository + 'static,
{
    async fn fetch_applicants(&self, job_id: &JobId) -> Result<Vec<Application>, FetchError> {
        if self.is_offline() {
            return Err(FetchError::Transport("backend offline".to_string()));
        }
        self.service
            .list_for_job(job_id)
            .map_err(|err| FetchError::Rejected {
                status: 503,
                message: Some(err.to_string()),
            })
    }
}

#[async_trait]
impl<R> StatusUpdater for LocalBackend<R>
where
    R: ApplicationRepository + 'static,
{
    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, StatusUpdateError> {
        if self.is_offline() {
            return Err(StatusUpdateError::Transport("backend offline".to_string()));
        }
        self.service
            .update_status(id, status)
            .map_err(|err| match err {
                ApplicationServiceError::Repository(RepositoryError::NotFound) => {
                    StatusUpdateError::Rejected {
                        status: 404,
                        message: Some("application not found".to_string()),
                    }
                }
                other => StatusUpdateError::Rejected {
                    status: 500,
                    message: Some(other.to_string()),
                },
            })
    }
}
