use std::sync::Arc;

use tracing::info;

use super::domain::{Application, ApplicationId, ApplicationStatus, JobId, UnknownStatus};
use super::repository::{ApplicationRepository, RepositoryError};

/// Backend-of-record operations behind the pipeline endpoints.
pub struct ApplicationStatusService<R> {
    repository: Arc<R>,
}

impl<R> ApplicationStatusService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// All applications for a job, oldest submission first.
    pub fn list_for_job(&self, job_id: &JobId) -> Result<Vec<Application>, ApplicationServiceError> {
        let mut applications = self.repository.list_for_job(job_id)?;
        applications.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(applications)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, ApplicationServiceError> {
        let application = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    /// Move an application to any status; every transition is allowed.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, ApplicationServiceError> {
        let mut application = self.get(id)?;
        let previous = application.status;
        application.status = status;
        self.repository.update(application.clone())?;

        info!(
            application_id = %id,
            from = previous.label(),
            to = status.label(),
            "application status updated"
        );
        Ok(application)
    }

    pub fn update_status_raw(
        &self,
        id: &ApplicationId,
        raw_status: &str,
    ) -> Result<Application, ApplicationServiceError> {
        let status = raw_status.parse::<ApplicationStatus>()?;
        self.update_status(id, status)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),
}
