use thiserror::Error;

use crate::model::{ChoiceId, Scenario, ScenarioId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Contract violations for scenario operations.
///
/// As with the quiz engine, every error leaves the sequence untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScenarioError {
    #[error("scenario sequence already completed")]
    Completed,

    #[error("best-choice feedback is pending")]
    FeedbackPending,

    #[error("unknown choice for the current scenario")]
    UnknownChoice,

    #[error("advancing requires best-choice feedback")]
    NoBestFeedback,

    #[error("already at the final scenario")]
    LastScenario,

    #[error("only a non-best choice can be retried")]
    NotRetryable,
}

//
// ─── FEEDBACK & OUTCOME ────────────────────────────────────────────────────────
//

/// Feedback recorded for the most recent choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceFeedback {
    pub is_best: bool,
    pub text: String,
}

/// What a choice produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// Feedback was recorded; the sequence continues (or waits for retry).
    Feedback(ChoiceFeedback),
    /// The best choice of the final scenario: the lesson's scenario stage
    /// is complete. Carries the scenario to append to the progress record.
    Completed {
        scenario: ScenarioId,
        feedback: ChoiceFeedback,
    },
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Drives one lesson's branching decision sequence.
///
/// A linear walk, not a retry queue: progression past a scenario requires
/// its designated best choice, and a non-best choice may be retried
/// indefinitely. A scenario authored without a best choice therefore never
/// advances: stuck, but never a panic.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    scenarios: Vec<Scenario>,
    index: usize,
    feedback: Option<ChoiceFeedback>,
    completed: bool,
}

impl ScenarioEngine {
    /// Starts a run over the lesson's scenario list.
    ///
    /// A lesson with zero scenarios has nothing to decide; the stage counts
    /// as complete from the start (the caller emits the progress update).
    #[must_use]
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        let completed = scenarios.is_empty();
        Self {
            scenarios,
            index: 0,
            feedback: None,
            completed,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// The scenario currently displayed.
    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.scenarios.get(self.index)
    }

    /// Zero-based position within the sequence.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.scenarios.len()
    }

    /// Feedback for the most recent choice, if any is showing.
    #[must_use]
    pub fn pending_feedback(&self) -> Option<&ChoiceFeedback> {
        self.feedback.as_ref()
    }

    /// Records the learner's choice for the current scenario.
    ///
    /// Valid whenever no best-choice feedback is pending; choosing over
    /// non-best feedback simply replaces it. The best choice of the final
    /// scenario completes the whole stage.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::Completed` after the stage finished,
    /// `ScenarioError::FeedbackPending` while best-choice feedback awaits
    /// `advance`, and `ScenarioError::UnknownChoice` for an id that is not
    /// part of the current scenario.
    pub fn choose(&mut self, choice: &ChoiceId) -> Result<ScenarioOutcome, ScenarioError> {
        if self.completed {
            return Err(ScenarioError::Completed);
        }
        if self.feedback.as_ref().is_some_and(|f| f.is_best) {
            return Err(ScenarioError::FeedbackPending);
        }
        let Some(scenario) = self.scenarios.get(self.index) else {
            return Err(ScenarioError::Completed);
        };
        let Some(selected) = scenario.choice(choice) else {
            return Err(ScenarioError::UnknownChoice);
        };

        let feedback = ChoiceFeedback {
            is_best: selected.is_best,
            text: selected.feedback.clone(),
        };
        self.feedback = Some(feedback.clone());

        if selected.is_best && self.index + 1 == self.scenarios.len() {
            self.completed = true;
            return Ok(ScenarioOutcome::Completed {
                scenario: scenario.id().clone(),
                feedback,
            });
        }

        Ok(ScenarioOutcome::Feedback(feedback))
    }

    /// Moves to the next scenario after a best choice.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::NoBestFeedback` unless best-choice feedback
    /// is pending, and `ScenarioError::LastScenario` on the final scenario
    /// (completion happens in `choose`, not here).
    pub fn advance(&mut self) -> Result<(), ScenarioError> {
        if !self.feedback.as_ref().is_some_and(|f| f.is_best) {
            return Err(ScenarioError::NoBestFeedback);
        }
        if self.index + 1 >= self.scenarios.len() {
            return Err(ScenarioError::LastScenario);
        }

        self.index += 1;
        self.feedback = None;
        Ok(())
    }

    /// Clears non-best feedback, leaving the learner on the same scenario
    /// to choose again. No retry limit exists.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::NotRetryable` unless non-best feedback is
    /// pending.
    pub fn retry_current(&mut self) -> Result<(), ScenarioError> {
        match &self.feedback {
            Some(feedback) if !feedback.is_best => {
                self.feedback = None;
                Ok(())
            }
            _ => Err(ScenarioError::NotRetryable),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScenarioChoice;

    fn build_scenario(id: &str, with_best: bool) -> Scenario {
        Scenario::new(
            ScenarioId::new(id),
            format!("Prompt {id}"),
            "Think it through.",
            vec![
                ScenarioChoice::new(ChoiceId::new("c1"), "Hasty option", false, "Mistake."),
                ScenarioChoice::new(ChoiceId::new("c2"), "Better option", with_best, "Correct."),
                ScenarioChoice::new(ChoiceId::new("c3"), "Risky option", false, "That backfires."),
            ],
        )
        .unwrap()
    }

    #[test]
    fn non_best_choice_keeps_index_and_records_feedback() {
        let mut engine = ScenarioEngine::new(vec![build_scenario("s1", true)]);

        let outcome = engine.choose(&ChoiceId::new("c1")).unwrap();
        assert_eq!(
            outcome,
            ScenarioOutcome::Feedback(ChoiceFeedback {
                is_best: false,
                text: "Mistake.".into(),
            })
        );
        assert_eq!(engine.index(), 0);
        assert!(!engine.is_complete());
    }

    #[test]
    fn best_choice_on_last_scenario_completes_the_stage() {
        let mut engine = ScenarioEngine::new(vec![build_scenario("s1", true)]);

        engine.choose(&ChoiceId::new("c1")).unwrap();
        engine.retry_current().unwrap();
        let outcome = engine.choose(&ChoiceId::new("c2")).unwrap();

        match outcome {
            ScenarioOutcome::Completed { scenario, feedback } => {
                assert_eq!(scenario, ScenarioId::new("s1"));
                assert!(feedback.is_best);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(engine.is_complete());
        assert_eq!(engine.choose(&ChoiceId::new("c2")).unwrap_err(), ScenarioError::Completed);
    }

    #[test]
    fn best_choice_mid_sequence_requires_advance() {
        let mut engine =
            ScenarioEngine::new(vec![build_scenario("s1", true), build_scenario("s2", true)]);

        let outcome = engine.choose(&ChoiceId::new("c2")).unwrap();
        assert!(matches!(outcome, ScenarioOutcome::Feedback(ref f) if f.is_best));
        assert!(!engine.is_complete());

        // Choosing again while best feedback is pending is rejected.
        assert_eq!(
            engine.choose(&ChoiceId::new("c1")).unwrap_err(),
            ScenarioError::FeedbackPending
        );

        engine.advance().unwrap();
        assert_eq!(engine.index(), 1);
        assert!(engine.pending_feedback().is_none());

        match engine.choose(&ChoiceId::new("c2")).unwrap() {
            ScenarioOutcome::Completed { scenario, .. } => {
                assert_eq!(scenario, ScenarioId::new("s2"));
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn advance_and_retry_validate_their_preconditions() {
        let mut engine =
            ScenarioEngine::new(vec![build_scenario("s1", true), build_scenario("s2", true)]);

        assert_eq!(engine.advance().unwrap_err(), ScenarioError::NoBestFeedback);
        assert_eq!(engine.retry_current().unwrap_err(), ScenarioError::NotRetryable);

        engine.choose(&ChoiceId::new("c1")).unwrap();
        assert_eq!(engine.advance().unwrap_err(), ScenarioError::NoBestFeedback);

        engine.retry_current().unwrap();
        engine.choose(&ChoiceId::new("c2")).unwrap();
        assert_eq!(engine.retry_current().unwrap_err(), ScenarioError::NotRetryable);
    }

    #[test]
    fn unknown_choice_is_rejected_without_feedback() {
        let mut engine = ScenarioEngine::new(vec![build_scenario("s1", true)]);

        let err = engine.choose(&ChoiceId::new("c9")).unwrap_err();
        assert_eq!(err, ScenarioError::UnknownChoice);
        assert!(engine.pending_feedback().is_none());
    }

    #[test]
    fn scenario_without_best_choice_is_stuck_but_usable() {
        let mut engine = ScenarioEngine::new(vec![build_scenario("s1", false)]);

        for _ in 0..3 {
            let outcome = engine.choose(&ChoiceId::new("c2")).unwrap();
            assert!(matches!(outcome, ScenarioOutcome::Feedback(ref f) if !f.is_best));
            assert_eq!(engine.advance().unwrap_err(), ScenarioError::NoBestFeedback);
            engine.retry_current().unwrap();
        }

        assert!(!engine.is_complete());
    }

    #[test]
    fn empty_sequence_is_complete_from_the_start() {
        let engine = ScenarioEngine::new(Vec::new());
        assert!(engine.is_complete());
        assert!(engine.current_scenario().is_none());
        assert_eq!(engine.total(), 0);
    }
}
