mod account;
mod catalog;
mod ids;
mod progress;

pub use account::{AccountError, BookedSession, Identity};
pub use catalog::{CatalogError, Course, KeyTerm, Lesson, QuizQuestion, Scenario, ScenarioChoice};
pub use ids::{ChoiceId, CourseId, LessonId, QuestionId, ScenarioId};
pub use progress::{ProgressData, ProgressError, ProgressPatch, ProgressSnapshot, StarRating};
