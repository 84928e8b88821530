use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use academy_core::model::{
    ChoiceId, Course, CourseId, KeyTerm, Lesson, LessonId, QuestionId, QuizQuestion, Scenario,
    ScenarioChoice, ScenarioId,
};

use crate::error::CatalogLoadError;

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

// Wire shape of the catalog content file (camelCase, matching the authored
// JSON). Drafts are validated into domain types once at startup; nothing
// downstream ever sees a draft.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub lessons: Vec<LessonDraft>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub id: String,
    pub chapter: u32,
    pub title: String,
    pub youtube_url: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub summary_bullets: Vec<String>,
    #[serde(default)]
    pub key_terms: Vec<KeyTermDraft>,
    #[serde(default)]
    pub quiz: Vec<QuestionDraft>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDraft>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTermDraft {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDraft {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub guidance: String,
    pub choices: Vec<ChoiceDraft>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDraft {
    pub id: String,
    pub text: String,
    pub is_best: bool,
    #[serde(default)]
    pub feedback: String,
}

impl CourseDraft {
    /// Validate and normalize the draft into a domain `Course`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError` for a malformed video URL or any content
    /// invariant violation.
    pub fn validate(self) -> Result<Course, CatalogLoadError> {
        let lessons = self
            .lessons
            .into_iter()
            .map(LessonDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Course::new(
            CourseId::new(self.id),
            self.title,
            self.description,
            self.icon,
            lessons,
        )?)
    }
}

impl LessonDraft {
    fn validate(self) -> Result<Lesson, CatalogLoadError> {
        let video_url = Url::parse(&self.youtube_url)?;
        let quiz = self
            .quiz
            .into_iter()
            .map(|question| {
                QuizQuestion::new(
                    QuestionId::new(question.id),
                    question.question,
                    question.options,
                    question.correct_answer,
                    question.explanation,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let scenarios = self
            .scenarios
            .into_iter()
            .map(|scenario| {
                let choices = scenario
                    .choices
                    .into_iter()
                    .map(|choice| {
                        ScenarioChoice::new(
                            ChoiceId::new(choice.id),
                            choice.text,
                            choice.is_best,
                            choice.feedback,
                        )
                    })
                    .collect();
                Scenario::new(
                    ScenarioId::new(scenario.id),
                    scenario.prompt,
                    scenario.guidance,
                    choices,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let key_terms = self
            .key_terms
            .into_iter()
            .map(|entry| KeyTerm::new(entry.term, entry.definition))
            .collect();

        Ok(Lesson::new(
            LessonId::new(self.id),
            self.chapter,
            self.title,
            video_url,
            self.duration,
            self.summary_bullets,
            key_terms,
            quiz,
            scenarios,
        )?)
    }
}

//
// ─── CATALOG SERVICE ───────────────────────────────────────────────────────────
//

/// Read-only view over the ordered course catalog, supplied once at startup.
#[derive(Clone, Debug)]
pub struct CatalogService {
    courses: Arc<Vec<Course>>,
}

impl CatalogService {
    #[must_use]
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: Arc::new(courses),
        }
    }

    /// Load and validate a JSON catalog document (an array of courses).
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError` if the JSON is malformed or any course
    /// fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogLoadError> {
        let drafts: Vec<CourseDraft> = serde_json::from_str(json)?;
        let courses = drafts
            .into_iter()
            .map(CourseDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(courses))
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|course| course.id() == id)
    }

    /// Resolve a lesson within a course, returning its index as well.
    #[must_use]
    pub fn lesson(&self, course: &CourseId, lesson: &LessonId) -> Option<(&Course, usize, &Lesson)> {
        let course = self.course(course)?;
        let index = course.lesson_index(lesson)?;
        Some((course, index, &course.lessons()[index]))
    }

    /// Locate a lesson anywhere in the catalog (used by resume).
    #[must_use]
    pub fn find_lesson(&self, lesson: &LessonId) -> Option<(&Course, usize, &Lesson)> {
        self.courses.iter().find_map(|course| {
            course
                .lesson_index(lesson)
                .map(|index| (course, index, &course.lessons()[index]))
        })
    }

    /// The lesson following the given one within its course, if any.
    #[must_use]
    pub fn next_lesson(&self, course: &CourseId, lesson: &LessonId) -> Option<&Lesson> {
        let (course, index, _) = self.lesson(course, lesson)?;
        course.lessons().get(index + 1)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    [
      {
        "id": "c1-bullshit-jobs",
        "title": "Bullshit Jobs",
        "description": "Meaningless work, examined.",
        "icon": "Briefcase",
        "lessons": [
          {
            "id": "bs-101",
            "chapter": 1,
            "title": "The Rise of Pointless Work",
            "youtubeUrl": "https://www.youtube.com/embed/jHx5rePmz2Y",
            "duration": "15 min",
            "summaryBullets": ["Bullshit versus shit jobs."],
            "keyTerms": [
              { "term": "Bullshit Job", "definition": "Pointless paid employment." }
            ],
            "quiz": [
              {
                "id": "q1",
                "question": "Which best describes a bullshit job?",
                "options": ["Low paid", "Pointless by the worker's own judgement"],
                "correctAnswer": "Pointless by the worker's own judgement",
                "explanation": "The worker's own recognition is the defining trait."
              }
            ],
            "scenarios": [
              {
                "id": "s1",
                "prompt": "Your team works fine without you. What do you do?",
                "guidance": "Think about appearances.",
                "choices": [
                  { "id": "c1", "text": "Demand clear work", "isBest": false, "feedback": "Taboo." },
                  { "id": "c2", "text": "Keep up the act", "isBest": true, "feedback": "Exhausting but expected." }
                ]
              }
            ]
          }
        ]
      }
    ]
    "#;

    #[test]
    fn parses_and_validates_a_catalog() {
        let catalog = CatalogService::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.courses().len(), 1);

        let course_id = CourseId::new("c1-bullshit-jobs");
        let lesson_id = LessonId::new("bs-101");
        let (course, index, lesson) = catalog.lesson(&course_id, &lesson_id).unwrap();
        assert_eq!(course.title(), "Bullshit Jobs");
        assert_eq!(index, 0);
        assert_eq!(lesson.quiz().len(), 1);
        assert_eq!(lesson.scenarios().len(), 1);
        assert_eq!(lesson.key_terms().len(), 1);

        assert!(catalog.next_lesson(&course_id, &lesson_id).is_none());
        assert!(catalog.find_lesson(&lesson_id).is_some());
    }

    #[test]
    fn rejects_a_question_with_a_stray_correct_answer() {
        let broken = SAMPLE.replace(
            "\"correctAnswer\": \"Pointless by the worker's own judgement\"",
            "\"correctAnswer\": \"Not an option at all\"",
        );
        let err = CatalogService::from_json(&broken).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Content(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = CatalogService::from_json("not json").unwrap_err();
        assert!(matches!(err, CatalogLoadError::Json(_)));
    }

    #[test]
    fn rejects_an_invalid_video_url() {
        let broken = SAMPLE.replace(
            "https://www.youtube.com/embed/jHx5rePmz2Y",
            "not a url",
        );
        let err = CatalogService::from_json(&broken).unwrap_err();
        assert!(matches!(err, CatalogLoadError::VideoUrl(_)));
    }
}
