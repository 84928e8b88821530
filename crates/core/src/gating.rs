use crate::model::{Course, CourseId, LessonId, ProgressData, ProgressSnapshot};

/// Accessibility of a lesson, derived fresh from catalog order and the
/// progress store. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    /// Inaccessible: the preceding lesson is incomplete and the learner is
    /// not premium.
    Locked,
    NotStarted,
    InProgress,
    Completed,
}

/// Where a "continue learning" action should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeTarget {
    pub course: CourseId,
    pub lesson: LessonId,
}

/// Computes the status of one lesson.
///
/// Completion requires both `watched` and `scenario_completed`. Locking
/// applies only to non-first lessons of non-premium learners whose
/// preceding lesson is incomplete; premium bypasses locking unconditionally
/// (a monetization rule, not an oversight). Returns `None` for an index
/// outside the course.
#[must_use]
pub fn lesson_status(
    course: &Course,
    lesson_index: usize,
    snapshot: &ProgressSnapshot,
) -> Option<LessonStatus> {
    let lesson = course.lessons().get(lesson_index)?;
    let record = snapshot.lesson(lesson.id());

    if record.is_some_and(ProgressData::is_lesson_complete) {
        return Some(LessonStatus::Completed);
    }

    if !snapshot.is_premium && lesson_index > 0 {
        let previous = &course.lessons()[lesson_index - 1];
        if !snapshot.is_lesson_complete(previous.id()) {
            return Some(LessonStatus::Locked);
        }
    }

    let started = record.is_some_and(|p| p.watched() || p.quiz_score() > 0);
    Some(if started {
        LessonStatus::InProgress
    } else {
        LessonStatus::NotStarted
    })
}

/// Completion percentage for a course, 0-100.
///
/// A lesson counts under the same rule as `LessonStatus::Completed`,
/// independent of its current lock state. An empty course reports 0.
#[must_use]
pub fn course_completion(course: &Course, snapshot: &ProgressSnapshot) -> u8 {
    let total = course.lessons().len();
    if total == 0 {
        return 0;
    }
    let completed = course
        .lessons()
        .iter()
        .filter(|lesson| snapshot.is_lesson_complete(lesson.id()))
        .count();

    u8::try_from((completed * 100 + total / 2) / total).unwrap_or(100)
}

/// Picks the lesson a "continue" action should open: the most recently
/// updated progress record, ties resolved to the earliest catalog position.
/// With no progress at all, the first lesson of the first course.
#[must_use]
pub fn resume_target(catalog: &[Course], snapshot: &ProgressSnapshot) -> Option<ResumeTarget> {
    let mut best: Option<(ResumeTarget, chrono::DateTime<chrono::Utc>)> = None;

    for course in catalog {
        for lesson in course.lessons() {
            let Some(record) = snapshot.lesson(lesson.id()) else {
                continue;
            };
            // Strictly greater: the earliest catalog position wins a tie.
            if best
                .as_ref()
                .is_none_or(|(_, stamp)| record.last_updated() > *stamp)
            {
                best = Some((
                    ResumeTarget {
                        course: course.id().clone(),
                        lesson: lesson.id().clone(),
                    },
                    record.last_updated(),
                ));
            }
        }
    }

    if let Some((target, _)) = best {
        return Some(target);
    }

    let first_course = catalog.first()?;
    let first_lesson = first_course.lessons().first()?;
    Some(ResumeTarget {
        course: first_course.id().clone(),
        lesson: first_lesson.id().clone(),
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
