use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{Application, ApplicationId, ApplicationStatus, JobId, StatusUpdateRequest};

pub const STATUS_UPDATE_FALLBACK: &str = "Failed to update application status";
pub const FETCH_APPLICANTS_FALLBACK: &str = "Failed to load applicants";

/// Persists a status change with the backend of record.
#[async_trait]
pub trait StatusUpdater: Send + Sync {
    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, StatusUpdateError>;
}

/// Authoritative "all applicants for a job" query.
#[async_trait]
pub trait ApplicantSource: Send + Sync {
    async fn fetch_applicants(&self, job_id: &JobId) -> Result<Vec<Application>, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StatusUpdateError {
    #[error("status update rejected with {status}: {}", .message.as_deref().unwrap_or(STATUS_UPDATE_FALLBACK))]
    Rejected { status: u16, message: Option<String> },
    #[error("status update transport failure: {0}")]
    Transport(String),
    #[error("status update response unreadable: {0}")]
    Decode(String),
}

impl StatusUpdateError {
    /// Text for the error toast: the server's message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => STATUS_UPDATE_FALLBACK.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("applicant fetch rejected with {status}: {}", .message.as_deref().unwrap_or(FETCH_APPLICANTS_FALLBACK))]
    Rejected { status: u16, message: Option<String> },
    #[error("applicant fetch transport failure: {0}")]
    Transport(String),
    #[error("applicant fetch response unreadable: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            _ => FETCH_APPLICANTS_FALLBACK.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientConfigError {
    #[error("base URL '{value}' is not a valid http(s) URL")]
    InvalidBaseUrl { value: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// REST client for the pipeline endpoints.
#[derive(Clone)]
pub struct HttpPipelineClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for HttpPipelineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPipelineClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpPipelineClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientConfigError> {
        let invalid = || ClientConfigError::InvalidBaseUrl {
            value: base_url.to_string(),
        };
        let parsed = Url::parse(base_url).map_err(|_| invalid())?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid());
        }

        let http = Client::builder()
            .user_agent(concat!("hiring-pipeline/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Constructor guarantees the URL can be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn rejection_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

#[async_trait]
impl StatusUpdater for HttpPipelineClient {
    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, StatusUpdateError> {
        let url = self.endpoint(&["v1", "applications", id.as_str(), "status"]);
        info!(%url, application_id = %id, status = status.label(), "sending status update");

        let response = self
            .http
            .put(url)
            .json(&StatusUpdateRequest::from(status))
            .send()
            .await
            .map_err(|err| StatusUpdateError::Transport(err.to_string()))?;

        let code = response.status();
        if !code.is_success() {
            let message = rejection_message(response).await;
            warn!(status = code.as_u16(), ?message, "status update rejected");
            return Err(StatusUpdateError::Rejected {
                status: code.as_u16(),
                message,
            });
        }

        response
            .json::<Application>()
            .await
            .map_err(|err| StatusUpdateError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ApplicantSource for HttpPipelineClient {
    async fn fetch_applicants(&self, job_id: &JobId) -> Result<Vec<Application>, FetchError> {
        let url = self.endpoint(&["v1", "jobs", job_id.as_str(), "applications"]);
        info!(%url, job_id = %job_id, "fetching applicants");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let code = response.status();
        if !code.is_success() {
            let message = rejection_message(response).await;
            warn!(status = code.as_u16(), ?message, "applicant fetch rejected");
            return Err(FetchError::Rejected {
                status: code.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<Application>>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}
