//! Administrator session flag and password change.
//!
//! Login compares against the built-in credentials only. A password saved by
//! [`AdminSession::change_password`] is stored but never consulted by
//! [`AdminSession::login`]; that gap is pinned by an ignored test below.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CatalogResult, ValidationError};
use crate::storage::{StorageArea, StorageError};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";
/// Minimum length of a new password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// In-process administrator flag. Starts logged out in every new session.
pub struct AdminSession {
    authenticated: AtomicBool,
    area: Arc<dyn StorageArea>,
    password_key: String,
}

impl AdminSession {
    #[must_use]
    pub fn new(area: Arc<dyn StorageArea>, password_key: impl Into<String>) -> Self {
        Self {
            authenticated: AtomicBool::new(false),
            area,
            password_key: password_key.into(),
        }
    }

    /// Set the flag if the credentials match the built-in pair.
    pub fn login(&self, username: &str, password: &str) -> bool {
        let ok = username == ADMIN_USERNAME && password == ADMIN_PASSWORD;
        if ok {
            self.authenticated.store(true, Ordering::SeqCst);
            tracing::info!(user = username, "admin logged in");
        } else {
            tracing::warn!(user = username, "admin login rejected");
        }
        ok
    }

    pub fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
        tracing::info!("admin logged out");
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Validate and store a new password.
    ///
    /// Checks run in order: current password, minimum length, confirmation.
    ///
    /// # Errors
    /// `Validation` for the first failing check, `Persistence` if the write is rejected.
    pub fn change_password(&self, current: &str, new: &str, confirm: &str) -> CatalogResult<()> {
        if current != ADMIN_PASSWORD {
            return Err(ValidationError::IncorrectPassword.into());
        }
        if new.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min_length: MIN_PASSWORD_LENGTH,
            }
            .into());
        }
        if new != confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }
        let raw = serde_json::to_string(new).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.area.set_item(&self.password_key, &raw)?;
        tracing::info!("admin password changed");
        Ok(())
    }

    /// The stored replacement password, if one was saved and is readable.
    #[must_use]
    pub fn stored_password(&self) -> Option<String> {
        let raw = self.area.get_item(&self.password_key)?;
        serde_json::from_str(&raw).ok()
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("authenticated", &self.is_authenticated())
            .field("password_key", &self.password_key)
            .finish_non_exhaustive()
    }
}
