use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use academy_core::model::{
    BookedSession, Identity, LessonId, ProgressData, ProgressPatch, ProgressSnapshot,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the progress store.
///
/// This is the narrow update surface the core consumes: per-lesson reads,
/// merge-patch writes, the global flags, and a full snapshot for gating and
/// resume queries. `now` is supplied by the caller so the services clock
/// stays the single time source; every merge refreshes `last_updated`
/// through [`ProgressData::apply`].
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch one lesson's record; `None` means never attempted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn read(&self, lesson: &LessonId) -> Result<Option<ProgressData>, StorageError>;

    /// Create the record with defaults if absent, overlay the patch, and
    /// refresh `last_updated`. Returns the merged record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn merge(
        &self,
        lesson: &LessonId,
        patch: &ProgressPatch,
        now: DateTime<Utc>,
    ) -> Result<ProgressData, StorageError>;

    /// The whole store record, for gating/resume/overview queries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn snapshot(&self) -> Result<ProgressSnapshot, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn is_premium(&self) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn set_premium(&self, premium: bool) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn record_booking(&self, booking: &BookedSession) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn identity(&self) -> Result<Option<Identity>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn set_identity(&self, identity: &Identity) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn clear_identity(&self) -> Result<(), StorageError>;

    /// Clear every lesson record and all global flags back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn reset(&self) -> Result<(), StorageError>;
}

/// Simple in-memory progress store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<Mutex<ProgressSnapshot>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressSnapshot::new())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ProgressSnapshot>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressStore {
    async fn read(&self, lesson: &LessonId) -> Result<Option<ProgressData>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.lesson(lesson).cloned())
    }

    async fn merge(
        &self,
        lesson: &LessonId,
        patch: &ProgressPatch,
        now: DateTime<Utc>,
    ) -> Result<ProgressData, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.merge_lesson(lesson, patch, now).clone())
    }

    async fn snapshot(&self) -> Result<ProgressSnapshot, StorageError> {
        let guard = self.lock()?;
        Ok(guard.clone())
    }

    async fn is_premium(&self) -> Result<bool, StorageError> {
        let guard = self.lock()?;
        Ok(guard.is_premium)
    }

    async fn set_premium(&self, premium: bool) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.is_premium = premium;
        Ok(())
    }

    async fn record_booking(&self, booking: &BookedSession) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.booked_sessions.push(booking.clone());
        Ok(())
    }

    async fn identity(&self) -> Result<Option<Identity>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.identity.clone())
    }

    async fn set_identity(&self, identity: &Identity) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.identity = Some(identity.clone());
        Ok(())
    }

    async fn clear_identity(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.identity = None;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.reset();
        Ok(())
    }
}

/// Aggregates the progress repository behind a trait object so backends can
/// be swapped without touching the services layer.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryProgressStore::new()),
        }
    }
}
