use std::collections::HashSet;

use thiserror::Error;

use crate::model::{QuestionId, QuizQuestion, StarRating};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Contract violations for quiz operations.
///
/// Every error leaves the engine untouched; the host UI is expected to
/// prevent these by disabling controls, so an out-of-order call is a safe
/// no-op rather than corruption.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no question is active")]
    NoActiveQuestion,

    #[error("current question already answered")]
    AlreadyAnswered,

    #[error("no answer recorded for the current question")]
    NotAnswered,

    #[error("no review round is pending")]
    NoReviewPending,
}

//
// ─── PHASES & RESULTS ──────────────────────────────────────────────────────────
//

/// Quiz run phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// A question is being answered or its feedback is shown.
    Active,
    /// A round finished with outstanding mistakes; awaiting confirmation
    /// to retry them.
    ReviewIntro,
    /// Terminal; the score is finalized.
    Complete,
}

/// Final result of a quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: u8,
    pub stars: StarRating,
}

/// What happened on `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAdvance {
    /// Moved to the next question of the current round.
    NextQuestion,
    /// Round exhausted with misses; the engine is now in `ReviewIntro`.
    ReviewPending { missed: usize },
    /// Round exhausted cleanly; the engine is now `Complete`.
    Completed(QuizOutcome),
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Drives one lesson's question sequence with mistake-driven remediation.
///
/// The run keeps two persistent containers: the ordered round queue
/// (indices into the lesson's question list) and the write-once set of
/// first-attempt mistakes. The current round's misses are an accumulator
/// rebuilt on every `begin_review`. Scoring counts first-attempt mistakes
/// only; retry rounds can complete the run but never change the score.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    questions: Vec<QuizQuestion>,
    round: Vec<usize>,
    cursor: usize,
    selected: Option<String>,
    round_misses: Vec<usize>,
    first_attempt_mistakes: HashSet<QuestionId>,
    phase: QuizPhase,
    outcome: Option<QuizOutcome>,
}

impl QuizEngine {
    /// Starts a run over the lesson's question list.
    ///
    /// A lesson with zero questions completes immediately with a perfect
    /// score; there is nothing to answer and nothing to divide by.
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let mut engine = Self {
            round: (0..questions.len()).collect(),
            questions,
            cursor: 0,
            selected: None,
            round_misses: Vec::new(),
            first_attempt_mistakes: HashSet::new(),
            phase: QuizPhase::Active,
            outcome: None,
        };

        if engine.questions.is_empty() {
            engine.phase = QuizPhase::Complete;
            engine.outcome = Some(QuizOutcome {
                score: 100,
                stars: StarRating::Three,
            });
        }

        engine
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// The question currently awaiting an answer or showing feedback.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.phase != QuizPhase::Active {
            return None;
        }
        self.round.get(self.cursor).map(|&idx| &self.questions[idx])
    }

    /// Zero-based position within the current round.
    #[must_use]
    pub fn round_index(&self) -> usize {
        self.cursor
    }

    /// Length of the current round's queue.
    #[must_use]
    pub fn round_length(&self) -> usize {
        self.round.len()
    }

    /// Number of questions missed so far in the current round.
    #[must_use]
    pub fn retry_outstanding(&self) -> usize {
        self.round_misses.len()
    }

    /// Total questions in the lesson, independent of retry rounds.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Count of questions answered wrong on their first appearance.
    #[must_use]
    pub fn first_attempt_mistakes(&self) -> usize {
        self.first_attempt_mistakes.len()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Final score and stars, present once the run is complete.
    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.outcome
    }

    /// Records the learner's selection for the current question.
    ///
    /// A wrong selection queues the question for the next review round and
    /// permanently marks it as a first-attempt mistake; re-answering it
    /// correctly later never removes that mark. Does not advance.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` outside the active phase and
    /// `QuizError::AlreadyAnswered` if the current question already has a
    /// selection.
    pub fn select_option(&mut self, option: impl Into<String>) -> Result<bool, QuizError> {
        if self.phase != QuizPhase::Active || self.cursor >= self.round.len() {
            return Err(QuizError::NoActiveQuestion);
        }
        if self.selected.is_some() {
            return Err(QuizError::AlreadyAnswered);
        }

        let option = option.into();
        let idx = self.round[self.cursor];
        let question = &self.questions[idx];
        let correct = question.is_correct(&option);

        if !correct {
            if !self.round_misses.contains(&idx) {
                self.round_misses.push(idx);
            }
            self.first_attempt_mistakes.insert(question.id().clone());
        }

        self.selected = Some(option);
        Ok(correct)
    }

    /// Moves past the current question once it has been answered.
    ///
    /// At the end of a round this either enters `ReviewIntro` (misses
    /// outstanding) or finalizes the score and completes.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` outside the active phase and
    /// `QuizError::NotAnswered` when the current question has no selection.
    pub fn advance(&mut self) -> Result<QuizAdvance, QuizError> {
        if self.phase != QuizPhase::Active {
            return Err(QuizError::NoActiveQuestion);
        }
        if self.selected.is_none() {
            return Err(QuizError::NotAnswered);
        }

        self.selected = None;
        self.cursor += 1;

        if self.cursor < self.round.len() {
            return Ok(QuizAdvance::NextQuestion);
        }

        if self.round_misses.is_empty() {
            let outcome = self.final_outcome();
            self.phase = QuizPhase::Complete;
            self.outcome = Some(outcome);
            Ok(QuizAdvance::Completed(outcome))
        } else {
            self.phase = QuizPhase::ReviewIntro;
            Ok(QuizAdvance::ReviewPending {
                missed: self.round_misses.len(),
            })
        }
    }

    /// Starts a retry round over exactly the questions missed in the round
    /// that just ended, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoReviewPending` unless the engine is in
    /// `ReviewIntro`.
    pub fn begin_review(&mut self) -> Result<(), QuizError> {
        if self.phase != QuizPhase::ReviewIntro {
            return Err(QuizError::NoReviewPending);
        }

        self.round = std::mem::take(&mut self.round_misses);
        self.cursor = 0;
        self.selected = None;
        self.phase = QuizPhase::Active;
        Ok(())
    }

    fn final_outcome(&self) -> QuizOutcome {
        let total = self.questions.len();
        let correct = total - self.first_attempt_mistakes.len();
        // Round half up, matching the original integer percentage.
        let score = u8::try_from((correct * 100 + total / 2) / total).unwrap_or(100);
        QuizOutcome {
            score,
            stars: StarRating::from_score(score),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn build_question(id: &str) -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(id),
            format!("Prompt {id}?"),
            vec!["right".into(), "wrong".into(), "also wrong".into()],
            "right",
            "because",
        )
        .unwrap()
    }

    fn build_quiz(count: usize) -> QuizEngine {
        let questions = (1..=count).map(|n| build_question(&format!("q{n}"))).collect();
        QuizEngine::new(questions)
    }

    #[test]
    fn empty_quiz_completes_immediately_with_full_score() {
        let engine = QuizEngine::new(Vec::new());
        assert_eq!(engine.phase(), QuizPhase::Complete);
        assert_eq!(
            engine.outcome(),
            Some(QuizOutcome {
                score: 100,
                stars: StarRating::Three,
            })
        );
        assert!(engine.current_question().is_none());
    }

    #[test]
    fn clean_pass_scores_100() {
        let mut engine = build_quiz(3);

        for _ in 0..2 {
            assert!(engine.select_option("right").unwrap());
            assert_eq!(engine.advance().unwrap(), QuizAdvance::NextQuestion);
        }
        assert!(engine.select_option("right").unwrap());
        let outcome = match engine.advance().unwrap() {
            QuizAdvance::Completed(outcome) => outcome,
            other => panic!("expected completion, got {other:?}"),
        };

        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.stars, StarRating::Three);
        assert_eq!(engine.phase(), QuizPhase::Complete);
    }

    #[test]
    fn review_round_contains_exactly_the_missed_questions_in_order() {
        let mut engine = build_quiz(3);

        // Round 1: miss q1 and q3, get q2 right.
        assert!(!engine.select_option("wrong").unwrap());
        engine.advance().unwrap();
        assert!(engine.select_option("right").unwrap());
        engine.advance().unwrap();
        assert!(!engine.select_option("wrong").unwrap());
        assert_eq!(engine.retry_outstanding(), 2);
        assert_eq!(
            engine.advance().unwrap(),
            QuizAdvance::ReviewPending { missed: 2 }
        );
        assert_eq!(engine.phase(), QuizPhase::ReviewIntro);

        engine.begin_review().unwrap();
        assert_eq!(engine.phase(), QuizPhase::Active);
        assert_eq!(engine.round_length(), 2);
        assert_eq!(engine.retry_outstanding(), 0);
        assert_eq!(
            engine.current_question().unwrap().id(),
            &QuestionId::new("q1")
        );

        // Round 2: both correct this time.
        engine.select_option("right").unwrap();
        engine.advance().unwrap();
        assert_eq!(
            engine.current_question().unwrap().id(),
            &QuestionId::new("q3")
        );
        engine.select_option("right").unwrap();
        let outcome = match engine.advance().unwrap() {
            QuizAdvance::Completed(outcome) => outcome,
            other => panic!("expected completion, got {other:?}"),
        };

        // round(100 * (3 - 2) / 3) = 33; retries never restore the score.
        assert_eq!(outcome.score, 33);
        assert_eq!(outcome.stars, StarRating::One);
        assert_eq!(engine.first_attempt_mistakes(), 2);
    }

    #[test]
    fn single_question_wrong_then_right_scores_zero_but_completes() {
        let mut engine = build_quiz(1);

        assert!(!engine.select_option("wrong").unwrap());
        assert_eq!(
            engine.advance().unwrap(),
            QuizAdvance::ReviewPending { missed: 1 }
        );
        engine.begin_review().unwrap();
        assert!(engine.select_option("right").unwrap());

        let outcome = match engine.advance().unwrap() {
            QuizAdvance::Completed(outcome) => outcome,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.stars, StarRating::One);
        assert_eq!(engine.phase(), QuizPhase::Complete);
    }

    #[test]
    fn repeated_misses_keep_reviewing_without_double_counting() {
        let mut engine = build_quiz(2);

        engine.select_option("right").unwrap();
        engine.advance().unwrap();
        engine.select_option("wrong").unwrap();
        engine.advance().unwrap();
        engine.begin_review().unwrap();

        // Miss the same question again on the retry round.
        engine.select_option("wrong").unwrap();
        assert_eq!(
            engine.advance().unwrap(),
            QuizAdvance::ReviewPending { missed: 1 }
        );
        engine.begin_review().unwrap();
        engine.select_option("right").unwrap();
        let outcome = match engine.advance().unwrap() {
            QuizAdvance::Completed(outcome) => outcome,
            other => panic!("expected completion, got {other:?}"),
        };

        // Still one unique first-attempt mistake: round(100 * 1/2) = 50.
        assert_eq!(engine.first_attempt_mistakes(), 1);
        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.stars, StarRating::Two);
    }

    #[test]
    fn advance_without_answer_is_a_rejected_no_op() {
        let mut engine = build_quiz(2);
        let before = engine.clone();

        let err = engine.advance().unwrap_err();
        assert_eq!(err, QuizError::NotAnswered);
        assert_eq!(engine.round_index(), before.round_index());
        assert_eq!(engine.phase(), before.phase());
        assert!(!engine.is_answered());
    }

    #[test]
    fn second_selection_is_rejected() {
        let mut engine = build_quiz(1);
        engine.select_option("wrong").unwrap();

        let err = engine.select_option("right").unwrap_err();
        assert_eq!(err, QuizError::AlreadyAnswered);
        assert_eq!(engine.selected_option(), Some("wrong"));
        assert_eq!(engine.first_attempt_mistakes(), 1);
    }

    #[test]
    fn operations_outside_their_phase_are_rejected() {
        let mut engine = build_quiz(1);
        assert_eq!(engine.begin_review().unwrap_err(), QuizError::NoReviewPending);

        engine.select_option("wrong").unwrap();
        engine.advance().unwrap();
        assert_eq!(engine.phase(), QuizPhase::ReviewIntro);
        assert_eq!(
            engine.select_option("right").unwrap_err(),
            QuizError::NoActiveQuestion
        );
        assert_eq!(engine.advance().unwrap_err(), QuizError::NoActiveQuestion);

        engine.begin_review().unwrap();
        engine.select_option("right").unwrap();
        engine.advance().unwrap();
        assert_eq!(engine.phase(), QuizPhase::Complete);
        assert_eq!(
            engine.select_option("right").unwrap_err(),
            QuizError::NoActiveQuestion
        );
        assert_eq!(engine.begin_review().unwrap_err(), QuizError::NoReviewPending);
    }

    #[test]
    fn score_depends_only_on_first_attempt_mistake_count() {
        // 4 questions, one first-attempt miss: round(100 * 3/4) = 75.
        let mut engine = build_quiz(4);
        engine.select_option("wrong").unwrap();
        engine.advance().unwrap();
        for _ in 0..3 {
            engine.select_option("right").unwrap();
            engine.advance().unwrap();
        }
        engine.begin_review().unwrap();
        engine.select_option("right").unwrap();
        let outcome = match engine.advance().unwrap() {
            QuizAdvance::Completed(outcome) => outcome,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(outcome.score, 75);
        assert_eq!(outcome.stars, StarRating::Two);
    }
}
