use thiserror::Error;
use url::Url;

use crate::model::ids::{ChoiceId, CourseId, LessonId, QuestionId, ScenarioId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course title cannot be empty")]
    EmptyCourseTitle,

    #[error("lesson title cannot be empty")]
    EmptyLessonTitle,

    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {0}: correct answer is not one of the options")]
    CorrectAnswerMissing(QuestionId),

    #[error("scenario {0} has no choices")]
    NoChoices(ScenarioId),
}

//
// ─── QUIZ QUESTION ─────────────────────────────────────────────────────────────
//

/// One multiple-choice question with a single designated correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
}

impl QuizQuestion {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoOptions` if the option list is empty, and
    /// `CatalogError::CorrectAnswerMissing` if the correct answer is not a
    /// member of the option list.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let correct_answer = correct_answer.into();
        if options.is_empty() {
            return Err(CatalogError::NoOptions(id));
        }
        if !options.contains(&correct_answer) {
            return Err(CatalogError::CorrectAnswerMissing(id));
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Whether the given selection matches the designated correct option.
    #[must_use]
    pub fn is_correct(&self, selection: &str) -> bool {
        self.correct_answer == selection
    }
}

//
// ─── SCENARIO ──────────────────────────────────────────────────────────────────
//

/// One selectable branch of a scenario, with the feedback shown on selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioChoice {
    pub id: ChoiceId,
    pub text: String,
    pub is_best: bool,
    pub feedback: String,
}

impl ScenarioChoice {
    #[must_use]
    pub fn new(
        id: ChoiceId,
        text: impl Into<String>,
        is_best: bool,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            is_best,
            feedback: feedback.into(),
        }
    }
}

/// A branching decision step. Advancing past it requires its best choice.
///
/// A scenario without any best choice is accepted here: it is a content
/// authoring defect that surfaces as a sequence that can never complete,
/// not as a load failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    id: ScenarioId,
    prompt: String,
    guidance: String,
    choices: Vec<ScenarioChoice>,
}

impl Scenario {
    /// Creates a validated scenario.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoChoices` if the choice list is empty.
    pub fn new(
        id: ScenarioId,
        prompt: impl Into<String>,
        guidance: impl Into<String>,
        choices: Vec<ScenarioChoice>,
    ) -> Result<Self, CatalogError> {
        if choices.is_empty() {
            return Err(CatalogError::NoChoices(id));
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            guidance: guidance.into(),
            choices,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ScenarioId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn guidance(&self) -> &str {
        &self.guidance
    }

    #[must_use]
    pub fn choices(&self) -> &[ScenarioChoice] {
        &self.choices
    }

    /// Looks up a choice by identifier.
    #[must_use]
    pub fn choice(&self, id: &ChoiceId) -> Option<&ScenarioChoice> {
        self.choices.iter().find(|choice| &choice.id == id)
    }

    /// Whether any choice is marked best. False means the scenario is stuck.
    #[must_use]
    pub fn has_best_choice(&self) -> bool {
        self.choices.iter().any(|choice| choice.is_best)
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A term/definition pair shown alongside the lecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
}

impl KeyTerm {
    #[must_use]
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// The atomic unit of content: one video, one quiz, one scenario sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    chapter: u32,
    title: String,
    video_url: Url,
    duration: String,
    summary_bullets: Vec<String>,
    key_terms: Vec<KeyTerm>,
    quiz: Vec<QuizQuestion>,
    scenarios: Vec<Scenario>,
}

impl Lesson {
    /// Creates a validated lesson.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyLessonTitle` if the title is empty or
    /// whitespace-only.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LessonId,
        chapter: u32,
        title: impl Into<String>,
        video_url: Url,
        duration: impl Into<String>,
        summary_bullets: Vec<String>,
        key_terms: Vec<KeyTerm>,
        quiz: Vec<QuizQuestion>,
        scenarios: Vec<Scenario>,
    ) -> Result<Self, CatalogError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CatalogError::EmptyLessonTitle);
        }

        Ok(Self {
            id,
            chapter,
            title: title.trim().to_owned(),
            video_url,
            duration: duration.into(),
            summary_bullets,
            key_terms,
            quiz,
            scenarios,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    /// Ordering key within a course.
    #[must_use]
    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn video_url(&self) -> &Url {
        &self.video_url
    }

    #[must_use]
    pub fn duration(&self) -> &str {
        &self.duration
    }

    #[must_use]
    pub fn summary_bullets(&self) -> &[String] {
        &self.summary_bullets
    }

    #[must_use]
    pub fn key_terms(&self) -> &[KeyTerm] {
        &self.key_terms
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// An ordered sequence of lessons. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    icon: Option<String>,
    lessons: Vec<Lesson>,
}

impl Course {
    /// Creates a validated course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCourseTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: impl Into<String>,
        icon: Option<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, CatalogError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CatalogError::EmptyCourseTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into(),
            icon,
            lessons,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Looks up a lesson by identifier.
    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id() == id)
    }

    /// Position of a lesson within the course order.
    #[must_use]
    pub fn lesson_index(&self, id: &LessonId) -> Option<usize> {
        self.lessons.iter().position(|lesson| lesson.id() == id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
