use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{Application, ApplicationId, JobId};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list_for_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local repository used by the API binary and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl MemoryApplicationRepository {
    pub fn seeded(applications: impl IntoIterator<Item = Application>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.lock();
            for application in applications {
                guard.insert(application.id.clone(), application);
            }
        }
        repository
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ApplicationId, Application>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ApplicationRepository for MemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.lock();
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.lock();
        match guard.get_mut(&application.id) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock().get(id).cloned())
    }

    fn list_for_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .lock()
            .values()
            .filter(|application| &application.job_id == job_id)
            .cloned()
            .collect())
    }
}
