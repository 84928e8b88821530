use academy_core::gating::{self, LessonStatus, ResumeTarget};
use academy_core::model::{Course, CourseId, LessonId, ProgressData, ProgressSnapshot, StarRating};

use crate::catalog::CatalogService;
use crate::error::OverviewError;
use crate::progress::ProgressService;

/// Presentation-agnostic status row for one lesson.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI renders locks, stars, and percentages however it likes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonStatusItem {
    pub lesson: LessonId,
    pub chapter: u32,
    pub title: String,
    pub status: LessonStatus,
    pub quiz_score: u8,
    pub stars: Option<StarRating>,
}

/// A course with its completion percentage and per-lesson statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOverview {
    pub course: CourseId,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub completion_pct: u8,
    pub lessons: Vec<LessonStatusItem>,
}

impl CourseOverview {
    fn build(course: &Course, snapshot: &ProgressSnapshot) -> Self {
        let lessons = course
            .lessons()
            .iter()
            .enumerate()
            .filter_map(|(index, lesson)| {
                let record = snapshot.lesson(lesson.id());
                gating::lesson_status(course, index, snapshot).map(|status| LessonStatusItem {
                    lesson: lesson.id().clone(),
                    chapter: lesson.chapter(),
                    title: lesson.title().to_owned(),
                    status,
                    quiz_score: record.map_or(0, ProgressData::quiz_score),
                    stars: record.and_then(ProgressData::stars),
                })
            })
            .collect();

        Self {
            course: course.id().clone(),
            title: course.title().to_owned(),
            description: course.description().to_owned(),
            icon: course.icon().map(str::to_owned),
            completion_pct: gating::course_completion(course, snapshot),
            lessons,
        }
    }
}

/// Gating and course-progress queries, always derived fresh from the
/// current store state. Nothing here is cached or invalidated.
#[derive(Clone)]
pub struct OverviewService {
    catalog: CatalogService,
    progress: ProgressService,
}

impl OverviewService {
    #[must_use]
    pub fn new(catalog: CatalogService, progress: ProgressService) -> Self {
        Self { catalog, progress }
    }

    /// Status and completion for one course.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::UnknownCourse` for an id missing from the
    /// catalog and `OverviewError::Progress` on store failures.
    pub async fn course_overview(&self, course: &CourseId) -> Result<CourseOverview, OverviewError> {
        let course = self
            .catalog
            .course(course)
            .ok_or(OverviewError::UnknownCourse)?;
        let snapshot = self.progress.snapshot().await?;
        Ok(CourseOverview::build(course, &snapshot))
    }

    /// Overviews for the whole catalog, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Progress` on store failures.
    pub async fn all_courses(&self) -> Result<Vec<CourseOverview>, OverviewError> {
        let snapshot = self.progress.snapshot().await?;
        Ok(self
            .catalog
            .courses()
            .iter()
            .map(|course| CourseOverview::build(course, &snapshot))
            .collect())
    }

    /// Where the host's "continue" action should land.
    ///
    /// # Errors
    ///
    /// Returns `OverviewError::Progress` on store failures.
    pub async fn resume_target(&self) -> Result<Option<ResumeTarget>, OverviewError> {
        let snapshot = self.progress.snapshot().await?;
        Ok(gating::resume_target(self.catalog.courses(), &snapshot))
    }
}
