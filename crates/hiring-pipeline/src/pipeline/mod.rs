//! Applicant pipeline: the Kanban board view-model, its optimistic controller, and the
//! status-update endpoints it talks to.

pub mod board;
pub mod cache;
pub mod client;
pub mod controller;
pub mod domain;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use board::{Board, Column, ColumnSummary, DragOutcome, DropTarget, StatusTransition};
pub use cache::{CachedQuery, QueryCache, QueryKey};
pub use client::{
    ApplicantSource, ClientConfigError, FetchError, HttpPipelineClient, StatusUpdateError,
    StatusUpdater, FETCH_APPLICANTS_FALLBACK, STATUS_UPDATE_FALLBACK,
};
pub use controller::{DropResult, PipelineController, SyncOutcome, UpdateHandle};
pub use domain::{
    ApplicantSummary, Application, ApplicationId, ApplicationStatus, JobId, StatusUpdateRequest,
    UnknownStatus,
};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use repository::{ApplicationRepository, MemoryApplicationRepository, RepositoryError};
pub use router::application_router;
pub use service::{ApplicationServiceError, ApplicationStatusService};
