//! Durable credential storage.
//!
//! The session survives process restarts through a single persisted value:
//! the bearer token string. The [`CredentialStore`] trait is the seam the
//! session layer writes through; the file-backed implementation is the
//! default, and an in-memory implementation exists for tests and ephemeral
//! sessions.

use parking_lot::RwLock;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Process-wide persistence for the session token.
///
/// `clear` must tolerate the entry being absent: logout is idempotent and
/// the forced de-authentication path may run while nothing is stored.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored token, or `None` when no session is persisted.
    fn load(&self) -> Option<String>;
    /// Persists the token, replacing any previous value.
    fn save(&self, token: &str) -> io::Result<()>;
    /// Removes the stored token. Absence of the entry is not an error.
    fn clear(&self);
}

/// Stores the token as the contents of a single file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)
    }

    fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                log::warn!("failed to clear stored token: {}", err);
            }
        }
    }
}

/// Keeps the token in memory only. The session will not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    token: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a token, as if a previous process had
    /// persisted one.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        *self.token.write() = None;
    }
}
