use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::account::{BookedSession, Identity};
use crate::model::ids::{LessonId, ScenarioId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur while handling progress records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("invalid star rating value: {0}")]
    InvalidStars(u8),

    #[error("quiz score out of range: {0}")]
    InvalidScore(u8),
}

//
// ─── STAR RATING ───────────────────────────────────────────────────────────────
//

/// Three-level reward for a completed quiz.
///
/// Derived from first-attempt accuracy only: three stars for a perfect
/// first pass, two for at least half, one otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StarRating {
    One,
    Two,
    Three,
}

impl StarRating {
    /// Converts a numeric rating (1-3) to a `StarRating`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidStars` if the value is not 1, 2, or 3.
    pub fn from_u8(value: u8) -> Result<Self, ProgressError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(ProgressError::InvalidStars(value)),
        }
    }

    /// Maps this rating to its numeric value.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            StarRating::One => 1,
            StarRating::Two => 2,
            StarRating::Three => 3,
        }
    }

    /// Derives the rating from a final quiz score (0-100).
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score == 100 {
            StarRating::Three
        } else if score >= 50 {
            StarRating::Two
        } else {
            StarRating::One
        }
    }
}

//
// ─── PROGRESS DATA ─────────────────────────────────────────────────────────────
//

/// Persisted per-lesson progress. All gating and resume decisions derive
/// from this record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressData {
    watched: bool,
    quiz_score: u8,
    stars: Option<StarRating>,
    scenario_completed: bool,
    completed_scenarios: Vec<ScenarioId>,
    last_updated: DateTime<Utc>,
}

impl ProgressData {
    /// Creates the never-attempted default record.
    ///
    /// This is the single place defaults are defined; callers must not
    /// infer them ad hoc at read sites.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            watched: false,
            quiz_score: 0,
            stars: None,
            scenario_completed: false,
            completed_scenarios: Vec::new(),
            last_updated: now,
        }
    }

    /// Rehydrates a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidScore` if the score exceeds 100.
    pub fn from_persisted(
        watched: bool,
        quiz_score: u8,
        stars: Option<StarRating>,
        scenario_completed: bool,
        completed_scenarios: Vec<ScenarioId>,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, ProgressError> {
        if quiz_score > 100 {
            return Err(ProgressError::InvalidScore(quiz_score));
        }

        Ok(Self {
            watched,
            quiz_score,
            stars,
            scenario_completed,
            completed_scenarios,
            last_updated,
        })
    }

    #[must_use]
    pub fn watched(&self) -> bool {
        self.watched
    }

    #[must_use]
    pub fn quiz_score(&self) -> u8 {
        self.quiz_score
    }

    /// None until a quiz run has completed for this lesson.
    #[must_use]
    pub fn stars(&self) -> Option<StarRating> {
        self.stars
    }

    #[must_use]
    pub fn scenario_completed(&self) -> bool {
        self.scenario_completed
    }

    /// Append-only list of scenario identifiers completed for this lesson.
    #[must_use]
    pub fn completed_scenarios(&self) -> &[ScenarioId] {
        &self.completed_scenarios
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// A lesson counts as completed once the lecture was watched and the
    /// scenario sequence finished.
    #[must_use]
    pub fn is_lesson_complete(&self) -> bool {
        self.watched && self.scenario_completed
    }

    /// Overlays the patch onto this record and refreshes `last_updated`.
    ///
    /// Fields absent from the patch keep their current value; the scenario
    /// append is idempotent.
    pub fn apply(&mut self, patch: &ProgressPatch, now: DateTime<Utc>) {
        if let Some(watched) = patch.watched {
            self.watched = watched;
        }
        if let Some(score) = patch.quiz_score {
            self.quiz_score = score.min(100);
        }
        if let Some(stars) = patch.stars {
            self.stars = Some(stars);
        }
        if let Some(done) = patch.scenario_completed {
            self.scenario_completed = done;
        }
        if let Some(scenario) = &patch.complete_scenario {
            if !self.completed_scenarios.contains(scenario) {
                self.completed_scenarios.push(scenario.clone());
            }
        }
        self.last_updated = now;
    }
}

//
// ─── PROGRESS PATCH ────────────────────────────────────────────────────────────
//

/// Partial update consumed by the store's merge contract. Every field is
/// optional; `complete_scenario` is an idempotent append rather than a
/// replacement of the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub watched: Option<bool>,
    pub quiz_score: Option<u8>,
    pub stars: Option<StarRating>,
    pub scenario_completed: Option<bool>,
    pub complete_scenario: Option<ScenarioId>,
}

impl ProgressPatch {
    /// Patch marking the lecture as watched.
    #[must_use]
    pub fn watched() -> Self {
        Self {
            watched: Some(true),
            ..Self::default()
        }
    }

    /// Terminal quiz update: watched, final score, star rating.
    #[must_use]
    pub fn quiz_completed(score: u8, stars: StarRating) -> Self {
        Self {
            watched: Some(true),
            quiz_score: Some(score),
            stars: Some(stars),
            ..Self::default()
        }
    }

    /// Terminal scenario update, appending the completed scenario when one
    /// exists (a lesson without scenarios completes with nothing to append).
    #[must_use]
    pub fn scenario_completed(scenario: Option<ScenarioId>) -> Self {
        Self {
            scenario_completed: Some(true),
            complete_scenario: scenario,
            ..Self::default()
        }
    }
}

//
// ─── PROGRESS SNAPSHOT ─────────────────────────────────────────────────────────
//

/// The whole progress store record: lesson map plus the global flags.
///
/// Deliberately a dedicated type: lesson records, the premium flag,
/// bookings, and the identity never share one generic mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub lessons: HashMap<LessonId, ProgressData>,
    pub is_premium: bool,
    pub booked_sessions: Vec<BookedSession>,
    pub identity: Option<Identity>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for a lesson, absent meaning never attempted.
    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&ProgressData> {
        self.lessons.get(id)
    }

    /// Whether the lesson satisfies the completion rule.
    #[must_use]
    pub fn is_lesson_complete(&self, id: &LessonId) -> bool {
        self.lessons
            .get(id)
            .is_some_and(ProgressData::is_lesson_complete)
    }

    /// Creates the record with defaults if absent, then overlays the patch.
    /// Returns the merged record.
    pub fn merge_lesson(
        &mut self,
        id: &LessonId,
        patch: &ProgressPatch,
        now: DateTime<Utc>,
    ) -> &ProgressData {
        let record = self
            .lessons
            .entry(id.clone())
            .or_insert_with(|| ProgressData::new(now));
        record.apply(patch, now);
        record
    }

    /// Clears every lesson record and all global flags back to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn star_rating_numeric_round_trip() {
        assert_eq!(StarRating::from_u8(1).unwrap(), StarRating::One);
        assert_eq!(StarRating::from_u8(3).unwrap(), StarRating::Three);
        assert_eq!(StarRating::Two.as_u8(), 2);
        let err = StarRating::from_u8(4).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidStars(4)));
    }

    #[test]
    fn star_rating_from_score_boundaries() {
        assert_eq!(StarRating::from_score(100), StarRating::Three);
        assert_eq!(StarRating::from_score(99), StarRating::Two);
        assert_eq!(StarRating::from_score(50), StarRating::Two);
        assert_eq!(StarRating::from_score(49), StarRating::One);
        assert_eq!(StarRating::from_score(0), StarRating::One);
    }

    #[test]
    fn defaults_are_never_attempted() {
        let record = ProgressData::new(fixed_now());
        assert!(!record.watched());
        assert_eq!(record.quiz_score(), 0);
        assert_eq!(record.stars(), None);
        assert!(!record.scenario_completed());
        assert!(record.completed_scenarios().is_empty());
        assert!(!record.is_lesson_complete());
    }

    #[test]
    fn apply_merges_without_clearing_other_fields() {
        let now = fixed_now();
        let mut record = ProgressData::new(now);

        record.apply(&ProgressPatch::quiz_completed(67, StarRating::Two), now);
        assert!(record.watched());
        assert_eq!(record.quiz_score(), 67);

        let later = now + Duration::seconds(5);
        record.apply(
            &ProgressPatch::scenario_completed(Some(ScenarioId::new("s2"))),
            later,
        );

        // The quiz fields survived the scenario merge.
        assert!(record.watched());
        assert_eq!(record.quiz_score(), 67);
        assert_eq!(record.stars(), Some(StarRating::Two));
        assert!(record.scenario_completed());
        assert_eq!(record.completed_scenarios(), &[ScenarioId::new("s2")]);
        assert_eq!(record.last_updated(), later);
        assert!(record.is_lesson_complete());
    }

    #[test]
    fn scenario_append_is_idempotent() {
        let now = fixed_now();
        let mut record = ProgressData::new(now);
        let patch = ProgressPatch::scenario_completed(Some(ScenarioId::new("s2")));

        record.apply(&patch, now);
        record.apply(&patch, now + Duration::seconds(1));

        assert_eq!(record.completed_scenarios().len(), 1);
    }

    #[test]
    fn from_persisted_rejects_out_of_range_score() {
        let err = ProgressData::from_persisted(true, 101, None, false, Vec::new(), fixed_now())
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidScore(101)));
    }

    #[test]
    fn snapshot_merge_creates_record_lazily() {
        let mut snapshot = ProgressSnapshot::new();
        let id = LessonId::new("bs-101");
        assert!(snapshot.lesson(&id).is_none());

        snapshot.merge_lesson(&id, &ProgressPatch::watched(), fixed_now());

        let record = snapshot.lesson(&id).unwrap();
        assert!(record.watched());
        assert!(!snapshot.is_lesson_complete(&id));
    }

    #[test]
    fn snapshot_reset_clears_everything() {
        let mut snapshot = ProgressSnapshot::new();
        snapshot.is_premium = true;
        snapshot.merge_lesson(
            &LessonId::new("bs-101"),
            &ProgressPatch::watched(),
            fixed_now(),
        );

        snapshot.reset();

        assert!(!snapshot.is_premium);
        assert!(snapshot.lessons.is_empty());
        assert!(snapshot.booked_sessions.is_empty());
        assert!(snapshot.identity.is_none());
    }
}
