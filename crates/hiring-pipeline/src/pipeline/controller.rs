use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::board::{Board, DragOutcome};
use super::cache::{QueryCache, QueryKey};
use super::client::{ApplicantSource, FetchError, StatusUpdateError, StatusUpdater};
use super::domain::{Application, ApplicationId, ApplicationStatus, JobId};
use super::notify::{Notification, Notifier};

/// Completion of a dispatched status update.
pub type UpdateHandle = JoinHandle<Result<Application, StatusUpdateError>>;

/// How `sync` brought the board up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing cached: fetched from the source and rebuilt.
    Fetched,
    /// A newer cached list existed; rebuilt from it.
    Refreshed,
    /// Board already derived from the current cached list.
    Current,
}

/// Result of a drop: the board transition plus the in-flight update, if one was sent.
#[derive(Debug)]
pub struct DropResult {
    pub outcome: DragOutcome,
    pub dispatched: Option<UpdateHandle>,
}

/// Drives one job posting's board against the cache, the backend and the notification surface.
///
/// Drops mutate the board immediately and send the status update in the background. A failed
/// update is reported but never rolled back; the board corrects itself on the next `sync`
/// after a successful update invalidates the cached list.
pub struct PipelineController<S, U, N> {
    job_id: JobId,
    board: Board,
    built_from: Option<u64>,
    cache: Arc<QueryCache>,
    source: Arc<S>,
    updater: Arc<U>,
    notifier: Arc<N>,
}

impl<S, U, N> PipelineController<S, U, N>
where
    S: ApplicantSource + 'static,
    U: StatusUpdater + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        job_id: JobId,
        cache: Arc<QueryCache>,
        source: Arc<S>,
        updater: Arc<U>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            job_id,
            board: Board::default(),
            built_from: None,
            cache,
            source,
            updater,
            notifier,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn key(&self) -> QueryKey {
        QueryKey::Applicants(self.job_id.clone())
    }

    /// Rebuild the board when the cached applicant list changed identity, fetching it first
    /// if the cache has nothing for this job.
    pub async fn sync(&mut self) -> Result<SyncOutcome, FetchError> {
        let key = self.key();

        if let Some(entry) = self.cache.get(&key) {
            if self.built_from == Some(entry.generation) {
                return Ok(SyncOutcome::Current);
            }
            self.board.refresh(entry.applications.as_ref().clone());
            self.built_from = Some(entry.generation);
            return Ok(SyncOutcome::Refreshed);
        }

        let applications = match self.source.fetch_applicants(&self.job_id).await {
            Ok(applications) => applications,
            Err(err) => {
                warn!(job_id = %self.job_id, error = %err, "applicant fetch failed");
                self.notifier.notify(Notification::error(err.user_message()));
                return Err(err);
            }
        };

        let entry = self.cache.store(key, applications);
        self.board.refresh(entry.applications.as_ref().clone());
        self.built_from = Some(entry.generation);
        info!(job_id = %self.job_id, total = self.board.len(), "board rebuilt from fetch");
        Ok(SyncOutcome::Fetched)
    }

    pub fn drag_start(&mut self, active_id: &str) {
        self.board.on_drag_start(active_id);
    }

    pub fn drag_cancel(&mut self) {
        self.board.on_drag_cancel();
    }

    /// Apply a drop and, for a cross-column move, dispatch exactly one status update.
    ///
    /// Must be called from within a tokio runtime.
    pub fn drag_end(&mut self, active_id: &str, over_id: Option<&str>) -> DropResult {
        let outcome = self.board.on_drag_end(active_id, over_id);

        let dispatched = outcome.transition().map(|transition| {
            info!(
                job_id = %self.job_id,
                application_id = %transition.application_id,
                from = transition.from.label(),
                to = transition.to.label(),
                "dispatching status update"
            );
            tokio::spawn(run_update(
                self.updater.clone(),
                self.cache.clone(),
                self.notifier.clone(),
                self.key(),
                transition.application_id.clone(),
                transition.to,
            ))
        });

        DropResult {
            outcome,
            dispatched,
        }
    }

    /// Persist a status change, invalidating the applicant list on success.
    pub async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, StatusUpdateError> {
        run_update(
            self.updater.clone(),
            self.cache.clone(),
            self.notifier.clone(),
            self.key(),
            id.clone(),
            status,
        )
        .await
    }
}

async fn run_update<U, N>(
    updater: Arc<U>,
    cache: Arc<QueryCache>,
    notifier: Arc<N>,
    key: QueryKey,
    id: ApplicationId,
    status: ApplicationStatus,
) -> Result<Application, StatusUpdateError>
where
    U: StatusUpdater + ?Sized,
    N: Notifier + ?Sized,
{
    match updater.update_status(&id, status).await {
        Ok(updated) => {
            cache.invalidate(&key);
            notifier.notify(Notification::success(format!(
                "Application moved to {}",
                status.label()
            )));
            Ok(updated)
        }
        Err(err) => {
            warn!(application_id = %id, status = status.label(), error = %err, "status update failed");
            notifier.notify(Notification::error(err.user_message()));
            Err(err)
        }
    }
}
