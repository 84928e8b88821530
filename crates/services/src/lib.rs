#![forbid(unsafe_code)]

pub mod app;
pub mod catalog;
pub mod error;
pub mod lessons;
pub mod progress;

pub use academy_core::Clock;

pub use app::AppServices;
pub use catalog::CatalogService;
pub use error::{
    AppServicesError, CatalogLoadError, LessonFlowError, OverviewError, ProgressServiceError,
};
pub use lessons::{
    CourseOverview, LessonAttempt, LessonFlowService, LessonStatusItem, OverviewService, QuizView,
    ScenarioView,
};
pub use progress::ProgressService;
