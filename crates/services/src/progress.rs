use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use url::Url;

use academy_core::Clock;
use academy_core::model::{
    BookedSession, Identity, LessonId, ProgressData, ProgressPatch, ProgressSnapshot,
};
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;

/// Store-facing progress facade that hides the repository and time from the
/// rest of the app.
///
/// This service owns the time source: every merge is stamped with the
/// clock's `now`, so the repository never reads wall time itself.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, repo }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fetch one lesson's record; `None` means never attempted.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn read(&self, lesson: &LessonId) -> Result<Option<ProgressData>, ProgressServiceError> {
        Ok(self.repo.read(lesson).await?)
    }

    /// Merge-patch one lesson's record, stamping `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn merge(
        &self,
        lesson: &LessonId,
        patch: &ProgressPatch,
    ) -> Result<ProgressData, ProgressServiceError> {
        let now = self.clock.now();
        log::debug!("merging progress for lesson {lesson}");
        Ok(self.repo.merge(lesson, patch, now).await?)
    }

    /// The whole store record, derived fresh on every call.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn snapshot(&self) -> Result<ProgressSnapshot, ProgressServiceError> {
        Ok(self.repo.snapshot().await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn is_premium(&self) -> Result<bool, ProgressServiceError> {
        Ok(self.repo.is_premium().await?)
    }

    /// Turn on the premium flag, unlocking every lesson.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn subscribe(&self) -> Result<(), ProgressServiceError> {
        log::info!("premium subscription activated");
        self.set_premium(true).await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn set_premium(&self, premium: bool) -> Result<(), ProgressServiceError> {
        Ok(self.repo.set_premium(premium).await?)
    }

    /// Store a mentor session booking.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn book_session(&self, booking: BookedSession) -> Result<(), ProgressServiceError> {
        Ok(self.repo.record_booking(&booking).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn identity(&self) -> Result<Option<Identity>, ProgressServiceError> {
        Ok(self.repo.identity().await?)
    }

    /// Simulated login: builds a local identity with a generated avatar and
    /// a small starter streak, and stores it. No credentials exist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Account` for an unusable name or
    /// email, and `ProgressServiceError::Storage` on repository failures.
    pub async fn login(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Identity, ProgressServiceError> {
        let seed: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        let avatar_url = Url::parse(&format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={seed}&backgroundColor=b6e3f4"
        ))?;
        let streak = rand::rng().random_range(1..=5);

        let identity = Identity::new(name, email, avatar_url, self.clock.now(), streak)?;
        self.repo.set_identity(&identity).await?;
        log::info!("local identity created for {}", identity.name());
        Ok(identity)
    }

    /// Simulated logout: drops the identity, leaving the rest of the store
    /// intact.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn logout(&self) -> Result<(), ProgressServiceError> {
        Ok(self.repo.clear_identity().await?)
    }

    /// Clear every lesson record and all global flags back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn reset(&self) -> Result<(), ProgressServiceError> {
        log::info!("resetting all training progress");
        Ok(self.repo.reset().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_clock;
    use storage::repository::InMemoryProgressStore;

    fn build_service() -> ProgressService {
        ProgressService::new(fixed_clock(), Arc::new(InMemoryProgressStore::new()))
    }

    #[tokio::test]
    async fn merge_stamps_the_service_clock() {
        let service = build_service();
        let record = service
            .merge(&LessonId::new("bs-101"), &ProgressPatch::watched())
            .await
            .unwrap();
        assert_eq!(record.last_updated(), service.now());
    }

    #[tokio::test]
    async fn login_builds_a_seeded_avatar_and_starter_streak() {
        let service = build_service();
        let identity = service.login("Ana Lopez", "ana@example.com").await.unwrap();

        assert_eq!(identity.name(), "Ana Lopez");
        assert!(
            identity
                .avatar_url()
                .as_str()
                .contains("seed=AnaLopez")
        );
        assert!((1..=5).contains(&identity.streak()));
        assert_eq!(service.identity().await.unwrap(), Some(identity));

        service.logout().await.unwrap();
        assert!(service.identity().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_rejects_blank_names() {
        let service = build_service();
        let err = service.login("   ", "a@b.c").await.unwrap_err();
        assert!(matches!(err, ProgressServiceError::Account(_)));
    }

    #[tokio::test]
    async fn subscribe_flips_the_premium_flag() {
        let service = build_service();
        assert!(!service.is_premium().await.unwrap());
        service.subscribe().await.unwrap();
        assert!(service.is_premium().await.unwrap());

        service.reset().await.unwrap();
        assert!(!service.is_premium().await.unwrap());
    }
}
