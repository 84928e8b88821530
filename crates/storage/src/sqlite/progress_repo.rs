use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use academy_core::model::{
    BookedSession, Identity, LessonId, ProgressData, ProgressPatch, ProgressSnapshot, ScenarioId,
};

use super::{SqliteProgressStore, mapping};
use crate::repository::{ProgressRepository, StorageError};

fn connection(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

fn serialization(err: sqlx::Error) -> StorageError {
    StorageError::Serialization(err.to_string())
}

const SELECT_PROGRESS: &str = r"
    SELECT watched, quiz_score, stars, scenario_completed, last_updated
    FROM lesson_progress
    WHERE lesson_id = ?1
";

const UPSERT_PROGRESS: &str = r"
    INSERT INTO lesson_progress (
        lesson_id,
        watched,
        quiz_score,
        stars,
        scenario_completed,
        last_updated
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(lesson_id) DO UPDATE SET
        watched = excluded.watched,
        quiz_score = excluded.quiz_score,
        stars = excluded.stars,
        scenario_completed = excluded.scenario_completed,
        last_updated = excluded.last_updated
";

#[async_trait]
impl ProgressRepository for SqliteProgressStore {
    async fn read(&self, lesson: &LessonId) -> Result<Option<ProgressData>, StorageError> {
        let row = sqlx::query(SELECT_PROGRESS)
            .bind(lesson.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(connection)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let scenarios = sqlx::query(
            r"
            SELECT scenario_id
            FROM completed_scenarios
            WHERE lesson_id = ?1
            ORDER BY position
            ",
        )
        .bind(lesson.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?
        .iter()
        .map(|row| {
            row.try_get::<String, _>("scenario_id")
                .map(ScenarioId::new)
                .map_err(serialization)
        })
        .collect::<Result<Vec<_>, _>>()?;

        mapping::progress_from_row(&row, scenarios).map(Some)
    }

    async fn merge(
        &self,
        lesson: &LessonId,
        patch: &ProgressPatch,
        now: DateTime<Utc>,
    ) -> Result<ProgressData, StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection)?;

        let row = sqlx::query(SELECT_PROGRESS)
            .bind(lesson.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(connection)?;

        let mut record = match row {
            Some(row) => {
                let scenarios = sqlx::query(
                    r"
                    SELECT scenario_id
                    FROM completed_scenarios
                    WHERE lesson_id = ?1
                    ORDER BY position
                    ",
                )
                .bind(lesson.as_str())
                .fetch_all(&mut *tx)
                .await
                .map_err(connection)?
                .iter()
                .map(|row| {
                    row.try_get::<String, _>("scenario_id")
                        .map(ScenarioId::new)
                        .map_err(serialization)
                })
                .collect::<Result<Vec<_>, _>>()?;
                mapping::progress_from_row(&row, scenarios)?
            }
            None => ProgressData::new(now),
        };

        record.apply(patch, now);

        sqlx::query(UPSERT_PROGRESS)
            .bind(lesson.as_str())
            .bind(i64::from(record.watched()))
            .bind(i64::from(record.quiz_score()))
            .bind(record.stars().map(|stars| i64::from(stars.as_u8())))
            .bind(i64::from(record.scenario_completed()))
            .bind(record.last_updated())
            .execute(&mut *tx)
            .await
            .map_err(connection)?;

        if let Some(scenario) = &patch.complete_scenario {
            let position = record
                .completed_scenarios()
                .iter()
                .position(|id| id == scenario)
                .and_then(|pos| i64::try_from(pos).ok())
                .ok_or_else(|| {
                    StorageError::Serialization("merged scenario missing from record".into())
                })?;
            sqlx::query(
                r"
                INSERT INTO completed_scenarios (lesson_id, scenario_id, position)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(lesson_id, scenario_id) DO NOTHING
                ",
            )
            .bind(lesson.as_str())
            .bind(scenario.as_str())
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(connection)?;
        }

        tx.commit().await.map_err(connection)?;
        Ok(record)
    }

    async fn snapshot(&self) -> Result<ProgressSnapshot, StorageError> {
        let scenario_rows = sqlx::query(
            r"
            SELECT lesson_id, scenario_id
            FROM completed_scenarios
            ORDER BY lesson_id, position
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?;

        let mut scenarios_by_lesson: HashMap<String, Vec<ScenarioId>> = HashMap::new();
        for row in &scenario_rows {
            let lesson: String = row.try_get("lesson_id").map_err(serialization)?;
            let scenario: String = row.try_get("scenario_id").map_err(serialization)?;
            scenarios_by_lesson
                .entry(lesson)
                .or_default()
                .push(ScenarioId::new(scenario));
        }

        let progress_rows = sqlx::query(
            r"
            SELECT lesson_id, watched, quiz_score, stars, scenario_completed, last_updated
            FROM lesson_progress
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?;

        let mut lessons = HashMap::with_capacity(progress_rows.len());
        for row in &progress_rows {
            let lesson: String = row.try_get("lesson_id").map_err(serialization)?;
            let scenarios = scenarios_by_lesson.remove(&lesson).unwrap_or_default();
            lessons.insert(
                LessonId::new(lesson),
                mapping::progress_from_row(row, scenarios)?,
            );
        }

        let account = sqlx::query(
            r"
            SELECT is_premium,
                   identity_name,
                   identity_email,
                   identity_avatar_url,
                   identity_joined,
                   identity_streak
            FROM account
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(connection)?;

        let (is_premium, identity) = match &account {
            Some(row) => {
                let premium: i64 = row.try_get("is_premium").map_err(serialization)?;
                (premium != 0, mapping::identity_from_row(row)?)
            }
            None => (false, None),
        };

        let booked_sessions = sqlx::query(
            r"
            SELECT mentor_id, date, time_slot
            FROM booked_sessions
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(connection)?
        .iter()
        .map(|row| {
            Ok(BookedSession::new(
                row.try_get::<String, _>("mentor_id").map_err(serialization)?,
                row.try_get::<String, _>("date").map_err(serialization)?,
                row.try_get::<String, _>("time_slot").map_err(serialization)?,
            ))
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(ProgressSnapshot {
            lessons,
            is_premium,
            booked_sessions,
            identity,
        })
    }

    async fn is_premium(&self) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT is_premium FROM account WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(connection)?;
        match row {
            Some(row) => {
                let premium: i64 = row.try_get("is_premium").map_err(serialization)?;
                Ok(premium != 0)
            }
            None => Ok(false),
        }
    }

    async fn set_premium(&self, premium: bool) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO account (id, is_premium)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET is_premium = excluded.is_premium
            ",
        )
        .bind(i64::from(premium))
        .execute(&self.pool)
        .await
        .map_err(connection)?;
        Ok(())
    }

    async fn record_booking(&self, booking: &BookedSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO booked_sessions (mentor_id, date, time_slot)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(&booking.mentor_id)
        .bind(&booking.date)
        .bind(&booking.time_slot)
        .execute(&self.pool)
        .await
        .map_err(connection)?;
        Ok(())
    }

    async fn identity(&self) -> Result<Option<Identity>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT identity_name,
                   identity_email,
                   identity_avatar_url,
                   identity_joined,
                   identity_streak
            FROM account
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(connection)?;

        match &row {
            Some(row) => mapping::identity_from_row(row),
            None => Ok(None),
        }
    }

    async fn set_identity(&self, identity: &Identity) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO account (
                id,
                is_premium,
                identity_name,
                identity_email,
                identity_avatar_url,
                identity_joined,
                identity_streak
            )
            VALUES (1, 0, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                identity_name = excluded.identity_name,
                identity_email = excluded.identity_email,
                identity_avatar_url = excluded.identity_avatar_url,
                identity_joined = excluded.identity_joined,
                identity_streak = excluded.identity_streak
            ",
        )
        .bind(identity.name())
        .bind(identity.email())
        .bind(identity.avatar_url().as_str())
        .bind(identity.joined())
        .bind(i64::from(identity.streak()))
        .execute(&self.pool)
        .await
        .map_err(connection)?;
        Ok(())
    }

    async fn clear_identity(&self) -> Result<(), StorageError> {
        sqlx::query(
            r"
            UPDATE account SET
                identity_name = NULL,
                identity_email = NULL,
                identity_avatar_url = NULL,
                identity_joined = NULL,
                identity_streak = NULL
            WHERE id = 1
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(connection)?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection)?;

        sqlx::query("DELETE FROM completed_scenarios")
            .execute(&mut *tx)
            .await
            .map_err(connection)?;
        sqlx::query("DELETE FROM lesson_progress")
            .execute(&mut *tx)
            .await
            .map_err(connection)?;
        sqlx::query("DELETE FROM booked_sessions")
            .execute(&mut *tx)
            .await
            .map_err(connection)?;
        sqlx::query(
            r"
            UPDATE account SET
                is_premium = 0,
                identity_name = NULL,
                identity_email = NULL,
                identity_avatar_url = NULL,
                identity_joined = NULL,
                identity_streak = NULL
            WHERE id = 1
            ",
        )
        .execute(&mut *tx)
        .await
        .map_err(connection)?;

        tx.commit().await.map_err(connection)?;
        Ok(())
    }
}
