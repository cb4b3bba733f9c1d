//! Configuration management.
//!
//! Loads configuration from ${FINSENSE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for configuration and session data.
    //!
    //! FINSENSE_HOME resolution order:
    //! 1. FINSENSE_HOME environment variable (if set)
    //! 2. ~/.config/finsense (default)

    use std::path::PathBuf;

    /// Returns the FinSense home directory.
    pub fn finsense_home() -> PathBuf {
        if let Ok(home) = std::env::var("FINSENSE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("finsense"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        finsense_home().join("config.toml")
    }

    /// Returns the path to the durable session file.
    pub fn session_path() -> PathBuf {
        finsense_home().join("session.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub base_url: String,

    /// Timeout for auth and download requests, in seconds
    pub auth_timeout_secs: u32,

    /// Timeout for chat requests, in seconds
    pub chat_timeout_secs: u32,

    /// Timeout for budget forecasting, in seconds
    pub budget_timeout_secs: u32,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_AUTH_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_CHAT_TIMEOUT_SECS: u32 = 60;
    const DEFAULT_BUDGET_TIMEOUT_SECS: u32 = 120;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the base_url field to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the base_url field to a specific config file path.
    /// Rejects malformed URLs before touching the file.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        url::Url::parse(base_url)
            .with_context(|| format!("Invalid backend base URL: {}", base_url))?;

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            DEFAULT_CONFIG_TEMPLATE.to_string()
        };

        // Parse as editable document (preserves comments and formatting)
        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["base_url"] = value(base_url);

        Self::write_config(path, &doc.to_string())
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.auth_timeout_secs))
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.chat_timeout_secs))
    }

    pub fn budget_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.budget_timeout_secs))
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            auth_timeout_secs: Self::DEFAULT_AUTH_TIMEOUT_SECS,
            chat_timeout_secs: Self::DEFAULT_CHAT_TIMEOUT_SECS,
            budget_timeout_secs: Self::DEFAULT_BUDGET_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.chat_timeout_secs, 60);
    }

    /// Config loading: partial config merges with defaults.
    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "base_url = \"https://fin.example.com\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url, "https://fin.example.com");
        assert_eq!(config.budget_timeout_secs, 120); // default preserved
    }

    /// Config init: creates file with defaults, creates parent dirs.
    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("http://localhost:8000"));
        assert!(contents.contains("budget_timeout_secs"));
    }

    /// Config init: fails if file exists (no silent overwrite).
    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
    }

    /// save_base_url: creates new config file with template if it doesn't exist.
    #[test]
    fn test_save_base_url_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::save_base_url_to(&config_path, "https://fin.example.com").unwrap();

        assert!(config_path.exists());

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url, "https://fin.example.com");

        // Verify template comments are preserved
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# FinSense Configuration"));
        assert!(contents.contains("chat_timeout_secs = 60"));
    }

    /// save_base_url: preserves other fields and comments in existing config.
    #[test]
    fn test_save_base_url_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"# My config file
base_url = "http://old.example.com"
chat_timeout_secs = 90
"#,
        )
        .unwrap();

        Config::save_base_url_to(&config_path, "http://new.example.com").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url, "http://new.example.com");
        assert_eq!(config.chat_timeout_secs, 90); // preserved

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# My config file"));
    }

    /// Timeout accessors convert to Duration.
    #[test]
    fn test_timeout_accessors() {
        let config = Config::default();
        assert_eq!(config.auth_timeout(), Duration::from_secs(30));
        assert_eq!(config.chat_timeout(), Duration::from_secs(60));
        assert_eq!(config.budget_timeout(), Duration::from_secs(120));
    }
}
