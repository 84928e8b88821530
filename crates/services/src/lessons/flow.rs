use academy_core::gating::{self, LessonStatus};
use academy_core::model::{ChoiceId, CourseId, LessonId, ProgressPatch};
use academy_core::quiz::{QuizAdvance, QuizEngine, QuizPhase};
use academy_core::scenario::{ScenarioEngine, ScenarioOutcome};

use crate::catalog::CatalogService;
use crate::error::LessonFlowError;
use crate::progress::ProgressService;

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// In-memory run state for one lesson: the quiz engine, the scenario
/// engine, and the quiz-before-scenario unlock.
///
/// Dropping the attempt (e.g. when the host switches lessons) discards all
/// of this unconditionally; a partial attempt is never persisted.
#[derive(Debug)]
pub struct LessonAttempt {
    course: CourseId,
    lesson: LessonId,
    quiz: QuizEngine,
    scenario: ScenarioEngine,
}

impl LessonAttempt {
    #[must_use]
    pub fn course(&self) -> &CourseId {
        &self.course
    }

    #[must_use]
    pub fn lesson(&self) -> &LessonId {
        &self.lesson
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    #[must_use]
    pub fn scenario(&self) -> &ScenarioEngine {
        &self.scenario
    }

    /// The simulation opens only once the quiz run is complete.
    #[must_use]
    pub fn scenario_unlocked(&self) -> bool {
        self.quiz.phase() == QuizPhase::Complete
    }
}

//
// ─── FLOW SERVICE ──────────────────────────────────────────────────────────────
//

/// Drives one lesson attempt end to end: watch, quiz (with review rounds),
/// then the scenario sequence, emitting progress merges at the two
/// terminal points.
#[derive(Clone)]
pub struct LessonFlowService {
    catalog: CatalogService,
    progress: ProgressService,
}

impl LessonFlowService {
    #[must_use]
    pub fn new(catalog: CatalogService, progress: ProgressService) -> Self {
        Self { catalog, progress }
    }

    /// Start an attempt for the given lesson.
    ///
    /// A lesson with no quiz questions completes its quiz stage right here
    /// (score 100, three stars), and a lesson with no scenarios completes
    /// its scenario stage the moment it is reachable; both emit their
    /// progress updates before the attempt is returned.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::UnknownLesson` for ids missing from the
    /// catalog and `LessonFlowError::LessonLocked` when gating denies
    /// access.
    pub async fn start_attempt(
        &self,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonAttempt, LessonFlowError> {
        let (course_ref, index, lesson_ref) = self
            .catalog
            .lesson(course, lesson)
            .ok_or(LessonFlowError::UnknownLesson)?;

        let snapshot = self.progress.snapshot().await?;
        let status = gating::lesson_status(course_ref, index, &snapshot)
            .ok_or(LessonFlowError::UnknownLesson)?;
        if status == LessonStatus::Locked {
            return Err(LessonFlowError::LessonLocked);
        }

        let attempt = LessonAttempt {
            course: course.clone(),
            lesson: lesson.clone(),
            quiz: QuizEngine::new(lesson_ref.quiz().to_vec()),
            scenario: ScenarioEngine::new(lesson_ref.scenarios().to_vec()),
        };

        if let Some(outcome) = attempt.quiz.outcome() {
            self.progress
                .merge(
                    &attempt.lesson,
                    &ProgressPatch::quiz_completed(outcome.score, outcome.stars),
                )
                .await?;
            self.settle_empty_scenario_stage(&attempt).await?;
        }

        Ok(attempt)
    }

    /// Record that the lecture was watched (the host's "mark as watched").
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::Progress` on store failures.
    pub async fn mark_watched(&self, attempt: &LessonAttempt) -> Result<(), LessonFlowError> {
        self.progress
            .merge(&attempt.lesson, &ProgressPatch::watched())
            .await?;
        Ok(())
    }

    /// Record the learner's selection for the current quiz question.
    /// Returns whether it was correct. No store side effects.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::Quiz` for out-of-order calls.
    pub fn select_option(
        &self,
        attempt: &mut LessonAttempt,
        option: impl Into<String>,
    ) -> Result<bool, LessonFlowError> {
        Ok(attempt.quiz.select_option(option)?)
    }

    /// Advance the quiz. Completion emits the terminal score/stars merge.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::Quiz` for out-of-order calls and
    /// `LessonFlowError::Progress` on store failures.
    pub async fn advance_quiz(
        &self,
        attempt: &mut LessonAttempt,
    ) -> Result<QuizAdvance, LessonFlowError> {
        let advance = attempt.quiz.advance()?;

        if let QuizAdvance::Completed(outcome) = advance {
            log::info!(
                "quiz complete for lesson {}: score {}, {} star(s)",
                attempt.lesson,
                outcome.score,
                outcome.stars.as_u8()
            );
            self.progress
                .merge(
                    &attempt.lesson,
                    &ProgressPatch::quiz_completed(outcome.score, outcome.stars),
                )
                .await?;
            self.settle_empty_scenario_stage(attempt).await?;
        }

        Ok(advance)
    }

    /// Start the retry round over the questions missed this round.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::Quiz` unless a review is pending.
    pub fn begin_review(&self, attempt: &mut LessonAttempt) -> Result<(), LessonFlowError> {
        Ok(attempt.quiz.begin_review()?)
    }

    /// Record a scenario choice. The best choice of the final scenario
    /// emits the lesson-completion merge.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::ScenarioLocked` before the quiz completes,
    /// `LessonFlowError::Scenario` for out-of-order calls, and
    /// `LessonFlowError::Progress` on store failures.
    pub async fn choose_scenario(
        &self,
        attempt: &mut LessonAttempt,
        choice: &ChoiceId,
    ) -> Result<ScenarioOutcome, LessonFlowError> {
        if !attempt.scenario_unlocked() {
            return Err(LessonFlowError::ScenarioLocked);
        }

        let outcome = attempt.scenario.choose(choice)?;

        if let ScenarioOutcome::Completed { scenario, .. } = &outcome {
            log::info!("scenario sequence complete for lesson {}", attempt.lesson);
            self.progress
                .merge(
                    &attempt.lesson,
                    &ProgressPatch::scenario_completed(Some(scenario.clone())),
                )
                .await?;
        }

        Ok(outcome)
    }

    /// Move to the next scenario after a best choice.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::ScenarioLocked` before the quiz completes
    /// and `LessonFlowError::Scenario` for out-of-order calls.
    pub fn advance_scenario(&self, attempt: &mut LessonAttempt) -> Result<(), LessonFlowError> {
        if !attempt.scenario_unlocked() {
            return Err(LessonFlowError::ScenarioLocked);
        }
        Ok(attempt.scenario.advance()?)
    }

    /// Clear non-best feedback and let the learner choose again.
    ///
    /// # Errors
    ///
    /// Returns `LessonFlowError::ScenarioLocked` before the quiz completes
    /// and `LessonFlowError::Scenario` for out-of-order calls.
    pub fn retry_scenario(&self, attempt: &mut LessonAttempt) -> Result<(), LessonFlowError> {
        if !attempt.scenario_unlocked() {
            return Err(LessonFlowError::ScenarioLocked);
        }
        Ok(attempt.scenario.retry_current()?)
    }

    /// The lesson the host's "next lesson" action should open, if any.
    #[must_use]
    pub fn next_lesson(&self, attempt: &LessonAttempt) -> Option<LessonId> {
        self.catalog
            .next_lesson(&attempt.course, &attempt.lesson)
            .map(|lesson| lesson.id().clone())
    }

    // A lesson without scenarios has nothing to decide; mark the stage
    // complete as soon as it is reachable.
    async fn settle_empty_scenario_stage(
        &self,
        attempt: &LessonAttempt,
    ) -> Result<(), LessonFlowError> {
        if attempt.scenario.total() == 0 {
            self.progress
                .merge(&attempt.lesson, &ProgressPatch::scenario_completed(None))
                .await?;
        }
        Ok(())
    }
}
