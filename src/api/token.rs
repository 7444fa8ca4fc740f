//! Session persistence: where the bearer token lives between requests.
//!
//! `MemoryTokenStore` serves tests and long-running processes;
//! `FileTokenStore` keeps the session across CLI invocations as a JSON file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::model::AuthSession;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("session file io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait TokenStore: Send + Sync {
    /// Current session, if one is stored.
    fn load(&self) -> Option<AuthSession>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    fn save(&self, session: &AuthSession) -> Result<(), TokenStoreError>;

    /// Forget the session. Never fails; problems are logged.
    fn clear(&self);

    fn token(&self) -> Option<String> {
        self.load().map(|s| s.token)
    }
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<AuthSession>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: AuthSession) -> Self {
        Self { session: Mutex::new(Some(session)) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AuthSession>> {
        self.session.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<AuthSession> {
        self.slot().clone()
    }

    fn save(&self, session: &AuthSession) -> Result<(), TokenStoreError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}

// =============================================================================
// FILE
// =============================================================================

pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<AuthSession> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "ignoring unreadable session file");
                None
            }
        }
    }

    fn save(&self, session: &AuthSession) -> Result<(), TokenStoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_vec_pretty(session)?;
        std::fs::write(&self.path, body)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, path = %self.path.display(), "failed to remove session file"),
        }
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
