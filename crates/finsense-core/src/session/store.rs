//! Durable session storage.
//!
//! Persists the bearer token and the cached profile in
//! `${FINSENSE_HOME}/session.json` with restricted permissions (0600).
//! Tokens are never logged or displayed in full.
//!
//! The store is shared by the HTTP client (reads the token, clears both
//! entries on an authentication failure) and the session manager
//! (reads and writes both entries).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::types::UserProfile;
use crate::config::paths;

/// The two durable entries of a session.
///
/// The JSON field names are the storage-key contract
/// (`endpoints::TOKEN_KEY` / `endpoints::USER_KEY`).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SessionStore {
    /// Bearer token entry.
    #[serde(rename = "finsense_token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Cached profile entry.
    #[serde(rename = "finsense_user", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl SessionStore {
    /// Returns the default path of the session file.
    pub fn default_path() -> PathBuf {
        paths::session_path()
    }

    /// Loads the store from a path.
    /// Returns an empty store if the file doesn't exist.
    pub fn load_at(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))
    }

    /// Saves the store with restricted permissions (0600).
    pub fn save_at(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize session")?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    /// Removes both entries. Idempotent.
    /// Returns whether a token was present.
    pub fn clear_at(path: &Path) -> Result<bool> {
        let store = Self::load_at(path)?;
        let had_token = store.token.is_some();
        if had_token || store.user.is_some() {
            Self::default().save_at(path)?;
        }
        Ok(had_token)
    }

    /// Convenience: the stored token, if any.
    pub fn stored_token_at(path: &Path) -> Result<Option<String>> {
        Ok(Self::load_at(path)?.token)
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
