//! # Token Store
//!
//! Holds the bearer token attached to every authenticated request.
//!
//! ## Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Token Lookup                                   │
//! │                                                                         │
//! │  get() ──► in-memory copy? ──yes──► return it                          │
//! │                 │                                                       │
//! │                 no                                                      │
//! │                 ▼                                                       │
//! │           token file? ──yes──► cache in memory, return it               │
//! │                 │                                                       │
//! │                 no ──► None (callers treat as signed out)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File problems are logged and never fail the caller: a token that cannot
//! be persisted still works for the rest of the process.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// In-memory bearer token with optional file persistence.
#[derive(Debug)]
pub struct TokenStore {
    token: Mutex<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Creates a store that persists to `path` when given.
    pub fn new(path: Option<PathBuf>) -> Self {
        TokenStore {
            token: Mutex::new(None),
            path,
        }
    }

    /// Creates a store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Stores `token` in memory and, if configured, on disk.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();

        if let Some(path) = &self.path {
            let written = path
                .parent()
                .map(std::fs::create_dir_all)
                .unwrap_or(Ok(()))
                .and_then(|_| write_private(path, &token));
            if let Err(e) = written {
                warn!(?path, error = %e, "Failed to persist auth token");
            }
        }

        *self.token.lock().expect("Token mutex poisoned") = Some(token);
    }

    /// Returns the current token, loading the persisted copy on first use.
    pub fn get(&self) -> Option<String> {
        let mut token = self.token.lock().expect("Token mutex poisoned");
        if token.is_some() {
            return token.clone();
        }

        let path = self.path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(stored) => {
                let stored = stored.trim().to_string();
                if stored.is_empty() {
                    return None;
                }
                debug!(?path, "Loaded auth token from disk");
                *token = Some(stored);
                token.clone()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(?path, error = %e, "Failed to read auth token");
                None
            }
        }
    }

    /// Forgets the token in memory and on disk.
    pub fn clear(&self) {
        *self.token.lock().expect("Token mutex poisoned") = None;

        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(?path, error = %e, "Failed to clear auth token"),
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

/// Writes the token readable by the owner only.
#[cfg(unix)]
fn write_private(path: &Path, token: &str) -> io::Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies to newly created files.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(token.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, token: &str) -> io::Result<()> {
    std::fs::write(path, token)
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
