//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::{AccountError, CatalogError};
use academy_core::quiz::QuizError;
use academy_core::scenario::ScenarioError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading and validating the content catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("catalog JSON is malformed")]
    Json(#[from] serde_json::Error),
    #[error("lesson video URL is invalid")]
    VideoUrl(#[from] url::ParseError),
    #[error(transparent)]
    Content(#[from] CatalogError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("avatar URL could not be built")]
    AvatarUrl(#[from] url::ParseError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LessonFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonFlowError {
    #[error("course or lesson not found in catalog")]
    UnknownLesson,
    #[error("lesson is locked")]
    LessonLocked,
    #[error("simulation stays locked until the quiz completes")]
    ScenarioLocked,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by overview queries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OverviewError {
    #[error("course not found in catalog")]
    UnknownCourse,
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
}
