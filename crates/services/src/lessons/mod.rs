mod flow;
mod overview;
mod view;

// Public API of the lesson subsystem.
pub use crate::error::LessonFlowError;
pub use flow::{LessonAttempt, LessonFlowService};
pub use overview::{CourseOverview, LessonStatusItem, OverviewService};
pub use view::{ChoiceView, QuestionView, QuizView, ScenarioStepView, ScenarioView};
