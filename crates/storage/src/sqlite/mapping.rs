use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use url::Url;

use academy_core::model::{Identity, ProgressData, ScenarioId, StarRating};

use crate::repository::StorageError;

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StorageError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Rebuild a `ProgressData` from its row plus the ordered scenario append log.
pub fn progress_from_row(
    row: &SqliteRow,
    completed_scenarios: Vec<ScenarioId>,
) -> Result<ProgressData, StorageError> {
    let watched: i64 = column(row, "watched")?;
    let quiz_score: i64 = column(row, "quiz_score")?;
    let stars: Option<i64> = column(row, "stars")?;
    let scenario_completed: i64 = column(row, "scenario_completed")?;
    let last_updated: DateTime<Utc> = column(row, "last_updated")?;

    let quiz_score = u8::try_from(quiz_score)
        .map_err(|_| StorageError::Serialization(format!("quiz_score out of range: {quiz_score}")))?;
    let stars = stars
        .map(|value| {
            u8::try_from(value)
                .ok()
                .and_then(|value| StarRating::from_u8(value).ok())
                .ok_or_else(|| StorageError::Serialization(format!("invalid stars: {value}")))
        })
        .transpose()?;

    ProgressData::from_persisted(
        watched != 0,
        quiz_score,
        stars,
        scenario_completed != 0,
        completed_scenarios,
        last_updated,
    )
    .map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Rebuild the optional identity from the singleton account row.
///
/// A NULL name means logged out; the remaining columns are then ignored.
pub fn identity_from_row(row: &SqliteRow) -> Result<Option<Identity>, StorageError> {
    let name: Option<String> = column(row, "identity_name")?;
    let Some(name) = name else {
        return Ok(None);
    };

    let email: Option<String> = column(row, "identity_email")?;
    let avatar_url: Option<String> = column(row, "identity_avatar_url")?;
    let joined: Option<DateTime<Utc>> = column(row, "identity_joined")?;
    let streak: Option<i64> = column(row, "identity_streak")?;

    let email = email.ok_or_else(|| StorageError::Serialization("missing email".into()))?;
    let avatar_url = avatar_url
        .ok_or_else(|| StorageError::Serialization("missing avatar url".into()))
        .and_then(|raw| {
            Url::parse(&raw).map_err(|err| StorageError::Serialization(err.to_string()))
        })?;
    let joined = joined.ok_or_else(|| StorageError::Serialization("missing join date".into()))?;
    let streak = streak
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| StorageError::Serialization("invalid streak".into()))?;

    Identity::new(name, email, avatar_url, joined, streak)
        .map(Some)
        .map_err(|err| StorageError::Serialization(err.to_string()))
}
