use academy_core::model::{ChoiceId, QuestionId, ScenarioId};
use academy_core::quiz::{QuizEngine, QuizOutcome, QuizPhase};
use academy_core::scenario::ChoiceFeedback;

use super::flow::LessonAttempt;

//
// ─── QUIZ VIEW ─────────────────────────────────────────────────────────────────
//

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub explanation: String,
}

/// Presentation-agnostic snapshot of a quiz run for the host UI.
///
/// Carries exactly the state the host needs to enable/disable controls:
/// position within the round, outstanding retries, the answered flag, and
/// the terminal outcome. No pre-formatted strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    pub phase: QuizPhase,
    pub question: Option<QuestionView>,
    pub round_index: usize,
    pub round_length: usize,
    pub retry_outstanding: usize,
    pub total_questions: usize,
    pub answered: bool,
    pub selected: Option<String>,
    pub outcome: Option<QuizOutcome>,
}

impl QuizView {
    #[must_use]
    pub fn of(engine: &QuizEngine) -> Self {
        Self {
            phase: engine.phase(),
            question: engine.current_question().map(|question| QuestionView {
                id: question.id().clone(),
                prompt: question.prompt().to_owned(),
                options: question.options().to_vec(),
                explanation: question.explanation().to_owned(),
            }),
            round_index: engine.round_index(),
            round_length: engine.round_length(),
            retry_outstanding: engine.retry_outstanding(),
            total_questions: engine.total_questions(),
            answered: engine.is_answered(),
            selected: engine.selected_option().map(str::to_owned),
            outcome: engine.outcome(),
        }
    }
}

//
// ─── SCENARIO VIEW ─────────────────────────────────────────────────────────────
//

/// A choice as shown to the learner. Deliberately omits `is_best`; the
/// host learns the verdict through feedback, not up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub id: ChoiceId,
    pub text: String,
}

/// The scenario currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioStepView {
    pub id: ScenarioId,
    pub prompt: String,
    pub guidance: String,
    pub choices: Vec<ChoiceView>,
}

/// Presentation-agnostic snapshot of the scenario stage for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioView {
    pub unlocked: bool,
    pub index: usize,
    pub total: usize,
    pub step: Option<ScenarioStepView>,
    pub feedback: Option<ChoiceFeedback>,
    pub is_complete: bool,
}

impl ScenarioView {
    #[must_use]
    pub fn of(attempt: &LessonAttempt) -> Self {
        let engine = attempt.scenario();
        Self {
            unlocked: attempt.scenario_unlocked(),
            index: engine.index(),
            total: engine.total(),
            step: engine.current_scenario().map(|scenario| ScenarioStepView {
                id: scenario.id().clone(),
                prompt: scenario.prompt().to_owned(),
                guidance: scenario.guidance().to_owned(),
                choices: scenario
                    .choices()
                    .iter()
                    .map(|choice| ChoiceView {
                        id: choice.id.clone(),
                        text: choice.text.clone(),
                    })
                    .collect(),
            }),
            feedback: engine.pending_feedback().cloned(),
            is_complete: engine.is_complete(),
        }
    }
}
