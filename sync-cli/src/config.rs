//! Persisted console state and configuration loading for twinsync.
//!
//! The console state (source URLs and proxy lists) lives in
//! `console-state.json` in the data directory and is reloaded verbatim.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use twinsync_client::{ConfigError, ConsoleConfig};
use twinsync_types::Side;

/// File name of the persisted console state.
pub const STATE_FILE: &str = "console-state.json";

/// File name of the optional configuration in the data directory.
pub const CONFIG_FILE: &str = "twinsync.toml";

/// Errors reading or writing the persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The state file is not valid JSON.
    #[error("invalid console state in {path}: {source}")]
    Parse {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The state could not be encoded.
    #[error("failed to encode console state: {0}")]
    Encode(serde_json::Error),
    /// The state file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Operator inputs that survive between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleState {
    /// Source URL for Cluster A.
    #[serde(default)]
    pub url_a: String,
    /// Source URL for Cluster B.
    #[serde(default)]
    pub url_b: String,
    /// Proxy list text for Cluster A.
    #[serde(default)]
    pub proxies_a: String,
    /// Proxy list text for Cluster B.
    #[serde(default)]
    pub proxies_b: String,
}

impl ConsoleState {
    /// Load the state from a directory; a missing file yields the empty state.
    pub async fn load(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(STATE_FILE);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(StoreError::Read { path, source: e }),
        };
        serde_json::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
    }

    /// Save the state to a directory (owner read/write only).
    pub async fn save(&self, data_dir: &Path) -> Result<(), StoreError> {
        let path = data_dir.join(STATE_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(StoreError::Encode)?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StoreError::Write {
                path: path.clone(),
                source: e,
            })?;
        set_file_permissions_0600(&path)
            .await
            .map_err(|e| StoreError::Write { path, source: e })
    }

    /// Source URL of a side.
    pub fn url(&self, side: Side) -> &str {
        match side {
            Side::A => &self.url_a,
            Side::B => &self.url_b,
        }
    }

    /// Set the source URL of a side.
    pub fn set_url(&mut self, side: Side, url: impl Into<String>) {
        match side {
            Side::A => self.url_a = url.into(),
            Side::B => self.url_b = url.into(),
        }
    }

    /// Proxy list text of a side.
    pub fn proxies(&self, side: Side) -> &str {
        match side {
            Side::A => &self.proxies_a,
            Side::B => &self.proxies_b,
        }
    }

    /// Set the proxy list text of a side.
    pub fn set_proxies(&mut self, side: Side, text: impl Into<String>) {
        match side {
            Side::A => self.proxies_a = text.into(),
            Side::B => self.proxies_b = text.into(),
        }
    }

    /// Both proxy lists, in side order.
    pub fn proxy_lists(&self) -> [String; 2] {
        [self.proxies_a.clone(), self.proxies_b.clone()]
    }
}

/// Load the console configuration.
///
/// An explicit path must exist. Without one, `twinsync.toml` in the data
/// directory is used when present, and defaults otherwise.
pub fn load_config(explicit: Option<&Path>, data_dir: &Path) -> Result<ConsoleConfig, ConfigError> {
    match explicit {
        Some(path) => ConsoleConfig::from_file(path),
        None => {
            let path = data_dir.join(CONFIG_FILE);
            if path.exists() {
                ConsoleConfig::from_file(&path)
            } else {
                Ok(ConsoleConfig::default())
            }
        }
    }
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_state_loads_empty() {
        let dir = tempdir().unwrap();
        let state = ConsoleState::load(dir.path()).await.unwrap();
        assert_eq!(state, ConsoleState::default());
    }

    #[tokio::test]
    async fn state_roundtrip_uses_fixed_keys() {
        let dir = tempdir().unwrap();
        let mut state = ConsoleState::default();
        state.set_url(Side::A, "https://src/a.txt");
        state.set_proxies(Side::B, "10.0.0.1:80\n10.0.0.2:81");
        state.save(dir.path()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(STATE_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["url_a"], "https://src/a.txt");
        assert_eq!(raw["proxies_b"], "10.0.0.1:80\n10.0.0.2:81");

        let loaded = ConsoleState::load(dir.path()).await.unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.url(Side::A), "https://src/a.txt");
        assert_eq!(loaded.proxies(Side::B), "10.0.0.1:80\n10.0.0.2:81");
    }

    #[tokio::test]
    async fn partial_state_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), r#"{"url_b":"https://b"}"#).unwrap();

        let state = ConsoleState::load(dir.path()).await.unwrap();
        assert_eq!(state.url_b, "https://b");
        assert!(state.url_a.is_empty());
    }

    #[tokio::test]
    async fn corrupt_state_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), "not json").unwrap();

        assert!(matches!(
            ConsoleState::load(dir.path()).await,
            Err(StoreError::Parse { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn state_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        ConsoleState::default().save(dir.path()).await.unwrap();

        let path = dir.path().join(STATE_FILE);
        let perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600, "file should be 0600");
    }

    #[test]
    fn config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn config_in_data_dir_is_used() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[sync]\nmax_retries = 7\n").unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.sync.max_retries, 7);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("elsewhere.toml");
        assert!(matches!(
            load_config(Some(missing.as_path()), dir.path()),
            Err(ConfigError::ReadError { .. })
        ));
    }
}
