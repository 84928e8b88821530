use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: per-lesson progress, completed-scenario append
/// log, the singleton account row, and mentor bookings.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS lesson_progress (
                    lesson_id TEXT PRIMARY KEY,
                    watched INTEGER NOT NULL CHECK (watched IN (0, 1)),
                    quiz_score INTEGER NOT NULL CHECK (quiz_score BETWEEN 0 AND 100),
                    stars INTEGER CHECK (stars BETWEEN 1 AND 3),
                    scenario_completed INTEGER NOT NULL CHECK (scenario_completed IN (0, 1)),
                    last_updated TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS completed_scenarios (
                    lesson_id TEXT NOT NULL,
                    scenario_id TEXT NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    PRIMARY KEY (lesson_id, scenario_id),
                    FOREIGN KEY (lesson_id)
                        REFERENCES lesson_progress(lesson_id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Singleton row, same shape as an app-settings table: id is pinned
        // to 1 and the identity columns are NULL while logged out.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS account (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    is_premium INTEGER NOT NULL CHECK (is_premium IN (0, 1)),
                    identity_name TEXT,
                    identity_email TEXT,
                    identity_avatar_url TEXT,
                    identity_joined TEXT,
                    identity_streak INTEGER
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS booked_sessions (
                    id INTEGER PRIMARY KEY,
                    mentor_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    time_slot TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_lesson_progress_last_updated
                    ON lesson_progress (last_updated);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO account (id, is_premium)
                VALUES (1, 0)
                ON CONFLICT(id) DO NOTHING
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
