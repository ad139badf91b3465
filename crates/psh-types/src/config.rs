//! Shell configuration (TOML) and persisted UI settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PshError, Result};

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Static configuration for a shell session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Reported by `whoami`, `$UserName` and used for the home directory.
    pub user_name: String,
    /// Reported by `hostname` and `$ComputerName`.
    pub computer_name: String,
    /// Drive letter with colon, e.g. `C:`.
    pub drive: String,
    /// Maximum number of history entries retained.
    pub history_limit: usize,
    /// Directory used by the on-disk blob store. `None` keeps state in memory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            user_name: "user".to_string(),
            computer_name: "PSH-EMULATOR".to_string(),
            drive: "C:".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            data_dir: None,
        }
    }
}

impl ShellConfig {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ShellConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        let bytes = self.drive.as_bytes();
        if bytes.len() != 2 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b':' {
            return Err(PshError::Config(format!(
                "drive must look like 'C:', got '{}'",
                self.drive
            )));
        }
        if self.user_name.is_empty() {
            return Err(PshError::Config("user_name must not be empty".to_string()));
        }
        if self.history_limit == 0 {
            return Err(PshError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Root of the configured drive, e.g. `C:\`.
    pub fn drive_root(&self) -> String {
        format!("{}\\", self.drive.to_ascii_uppercase())
    }

    /// Home directory of the configured user, e.g. `C:\Users\user`.
    pub fn home_dir(&self) -> String {
        format!("{}Users\\{}", self.drive_root(), self.user_name)
    }
}

/// User-facing settings persisted alongside the filesystem and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub font_size: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            font_size: 14,
        }
    }
}
