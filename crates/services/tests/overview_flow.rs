use std::sync::Arc;

use chrono::Duration;
use academy_core::gating::LessonStatus;
use academy_core::model::{
    Course, CourseId, Lesson, LessonId, ProgressPatch, StarRating,
};
use academy_core::time::fixed_now;
use services::{AppServices, CatalogService, Clock, OverviewService, ProgressService};
use storage::repository::{InMemoryProgressStore, ProgressRepository};
use url::Url;

fn build_lesson(id: &str, chapter: u32) -> Lesson {
    Lesson::new(
        LessonId::new(id),
        chapter,
        format!("Lesson {chapter}"),
        Url::parse("https://www.youtube.com/embed/jHx5rePmz2Y").unwrap(),
        "12 min",
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    )
    .unwrap()
}

fn build_catalog() -> CatalogService {
    let course = Course::new(
        CourseId::new("c1"),
        "Gating Course",
        "",
        None,
        vec![
            build_lesson("l1", 1),
            build_lesson("l2", 2),
            build_lesson("l3", 3),
        ],
    )
    .unwrap();
    CatalogService::new(vec![course])
}

fn statuses(overview: &services::CourseOverview) -> Vec<LessonStatus> {
    overview.lessons.iter().map(|item| item.status).collect()
}

async fn complete_lesson(progress: &ProgressService, id: &str) {
    progress
        .merge(
            &LessonId::new(id),
            &ProgressPatch::quiz_completed(100, StarRating::Three),
        )
        .await
        .unwrap();
    progress
        .merge(&LessonId::new(id), &ProgressPatch::scenario_completed(None))
        .await
        .unwrap();
}

#[tokio::test]
async fn gating_table_matches_the_unlock_rules() {
    let app = AppServices::in_memory(build_catalog(), Clock::fixed(fixed_now()));
    let course = CourseId::new("c1");

    let overview = app.overview().course_overview(&course).await.unwrap();
    assert_eq!(
        statuses(&overview),
        vec![
            LessonStatus::NotStarted,
            LessonStatus::Locked,
            LessonStatus::Locked,
        ]
    );
    assert_eq!(overview.completion_pct, 0);

    complete_lesson(app.progress(), "l1").await;
    let overview = app.overview().course_overview(&course).await.unwrap();
    assert_eq!(
        statuses(&overview),
        vec![
            LessonStatus::Completed,
            LessonStatus::NotStarted,
            LessonStatus::Locked,
        ]
    );
    assert_eq!(overview.completion_pct, 33);

    // Premium unlocks everything that is not yet completed.
    app.progress().subscribe().await.unwrap();
    let overview = app.overview().course_overview(&course).await.unwrap();
    assert_eq!(
        statuses(&overview),
        vec![
            LessonStatus::Completed,
            LessonStatus::NotStarted,
            LessonStatus::NotStarted,
        ]
    );
}

#[tokio::test]
async fn overview_surfaces_scores_and_stars() {
    let app = AppServices::in_memory(build_catalog(), Clock::fixed(fixed_now()));
    app.progress()
        .merge(
            &LessonId::new("l1"),
            &ProgressPatch::quiz_completed(67, StarRating::Two),
        )
        .await
        .unwrap();

    let overview = app
        .overview()
        .course_overview(&CourseId::new("c1"))
        .await
        .unwrap();
    let first = &overview.lessons[0];
    assert_eq!(first.status, LessonStatus::InProgress);
    assert_eq!(first.quiz_score, 67);
    assert_eq!(first.stars, Some(StarRating::Two));
    assert_eq!(overview.lessons[1].stars, None);
}

#[tokio::test]
async fn resume_tracks_the_most_recent_merge() {
    // Two service handles over one store, with clocks a minute apart, so
    // the merges carry distinct timestamps.
    let repo = Arc::new(InMemoryProgressStore::new());
    let catalog = build_catalog();
    let earlier = ProgressService::new(Clock::fixed(fixed_now()), repo.clone());
    let later = ProgressService::new(
        Clock::fixed(fixed_now() + Duration::minutes(1)),
        repo.clone(),
    );
    let overview = OverviewService::new(catalog, earlier.clone());

    // No progress at all: resume opens the very first lesson.
    let target = overview.resume_target().await.unwrap().expect("target");
    assert_eq!(target.lesson, LessonId::new("l1"));

    earlier
        .merge(&LessonId::new("l1"), &ProgressPatch::watched())
        .await
        .unwrap();
    later
        .merge(&LessonId::new("l2"), &ProgressPatch::watched())
        .await
        .unwrap();

    let target = overview.resume_target().await.unwrap().expect("target");
    assert_eq!(target.course, CourseId::new("c1"));
    assert_eq!(target.lesson, LessonId::new("l2"));

    repo.reset().await.unwrap();
    let target = overview.resume_target().await.unwrap().expect("target");
    assert_eq!(target.lesson, LessonId::new("l1"));
}

#[tokio::test]
async fn completion_is_visible_even_when_a_lesson_is_locked() {
    // A lesson completed while premium still counts toward the percentage
    // after premium lapses, even though it sits behind a lock again.
    let app = AppServices::in_memory(build_catalog(), Clock::fixed(fixed_now()));
    app.progress().set_premium(true).await.unwrap();
    complete_lesson(app.progress(), "l3").await;
    app.progress().set_premium(false).await.unwrap();

    let overview = app
        .overview()
        .course_overview(&CourseId::new("c1"))
        .await
        .unwrap();
    assert_eq!(
        statuses(&overview),
        vec![
            LessonStatus::NotStarted,
            LessonStatus::Locked,
            LessonStatus::Completed,
        ]
    );
    assert_eq!(overview.completion_pct, 33);
}
