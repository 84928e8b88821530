use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("identity name cannot be empty")]
    EmptyName,

    #[error("identity email is not plausible")]
    InvalidEmail,
}

//
// ─── IDENTITY ──────────────────────────────────────────────────────────────────
//

/// Local simulated identity. There is no real account system; this is the
/// data the "login" produces and the store keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    email: String,
    avatar_url: Url,
    joined: DateTime<Utc>,
    streak: u8,
}

impl Identity {
    /// Creates a validated identity.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyName` for a blank name and
    /// `AccountError::InvalidEmail` when the email lacks an `@`.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        avatar_url: Url,
        joined: DateTime<Utc>,
        streak: u8,
    ) -> Result<Self, AccountError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AccountError::EmptyName);
        }
        let email = email.into();
        if !email.contains('@') {
            return Err(AccountError::InvalidEmail);
        }

        Ok(Self {
            name: name.trim().to_owned(),
            email,
            avatar_url,
            joined,
            streak,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn avatar_url(&self) -> &Url {
        &self.avatar_url
    }

    /// When the simulated account was created. The UI formats this as it
    /// sees fit (e.g. "June 2025").
    #[must_use]
    pub fn joined(&self) -> DateTime<Utc> {
        self.joined
    }

    #[must_use]
    pub fn streak(&self) -> u8 {
        self.streak
    }
}

//
// ─── BOOKED SESSION ────────────────────────────────────────────────────────────
//

/// A mentor session booking. Opaque to the core: stored and listed, never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedSession {
    pub mentor_id: String,
    pub date: String,
    pub time_slot: String,
}

impl BookedSession {
    #[must_use]
    pub fn new(
        mentor_id: impl Into<String>,
        date: impl Into<String>,
        time_slot: impl Into<String>,
    ) -> Self {
        Self {
            mentor_id: mentor_id.into(),
            date: date.into(),
            time_slot: time_slot.into(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
