use academy_core::Clock;
use storage::repository::Storage;

use crate::catalog::CatalogService;
use crate::error::AppServicesError;
use crate::lessons::{LessonFlowService, OverviewService};
use crate::progress::ProgressService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: CatalogService,
    progress: ProgressService,
    lessons: LessonFlowService,
    overview: OverviewService,
}

impl AppServices {
    /// Wire services over an already-built storage backend.
    #[must_use]
    pub fn new(catalog: CatalogService, clock: Clock, storage: &Storage) -> Self {
        let progress = ProgressService::new(clock, storage.progress.clone());
        let lessons = LessonFlowService::new(catalog.clone(), progress.clone());
        let overview = OverviewService::new(catalog.clone(), progress.clone());
        Self {
            catalog,
            progress,
            lessons,
            overview,
        }
    }

    /// Build services over the in-memory store (tests, prototyping).
    #[must_use]
    pub fn in_memory(catalog: CatalogService, clock: Clock) -> Self {
        Self::new(catalog, clock, &Storage::in_memory())
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn sqlite(
        catalog: CatalogService,
        clock: Clock,
        database_url: &str,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(database_url).await?;
        Ok(Self::new(catalog, clock, &storage))
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    #[must_use]
    pub fn lessons(&self) -> &LessonFlowService {
        &self.lessons
    }

    #[must_use]
    pub fn overview(&self) -> &OverviewService {
        &self.overview
    }
}
