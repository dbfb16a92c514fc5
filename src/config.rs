//! Process configuration, bundled into the binary or read from an override file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{DriveError, Result};

/// Settings compiled into the binary.
const BUNDLED_CONFIG: &str = include_str!("../config.toml");

/// Port of the local OAuth callback listener.
pub const DEFAULT_CALLBACK_PORT: u16 = 8888;

/// How long the interactive authorization waits for the browser redirect.
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

fn default_callback_port() -> u16 {
    DEFAULT_CALLBACK_PORT
}

fn default_auth_timeout_secs() -> u64 {
    DEFAULT_AUTH_TIMEOUT_SECS
}

fn default_open_browser() -> bool {
    true
}

/// Immutable settings shared by every component of one invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub application_name: String,
    pub tokens_directory_path: PathBuf,
    pub credentials_file_path: PathBuf,
    pub default_folder_id: String,
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
    /// Open the consent page in the system browser instead of only printing it.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

impl Config {
    /// Load the override file when given, the bundled settings otherwise.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) => {
                debug!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(path).map_err(|e| {
                    DriveError::ConfigurationError(format!("cannot read {:?}: {}", path, e))
                })?;
                Self::from_toml_str(&content)
            }
            None => Self::bundled(),
        }
    }

    /// The settings compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_CONFIG)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| DriveError::ConfigurationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("application_name", self.application_name.trim().is_empty()),
            (
                "tokens_directory_path",
                self.tokens_directory_path.as_os_str().is_empty(),
            ),
            (
                "credentials_file_path",
                self.credentials_file_path.as_os_str().is_empty(),
            ),
            ("default_folder_id", self.default_folder_id.trim().is_empty()),
        ];

        if let Some((key, _)) = required.iter().find(|(_, empty)| *empty) {
            return Err(DriveError::ConfigurationError(format!(
                "`{}` must not be empty",
                key
            )));
        }

        if self.auth_timeout_secs == 0 {
            return Err(DriveError::ConfigurationError(
                "`auth_timeout_secs` must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Upper bound on the wait for the authorization redirect.
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }
}
