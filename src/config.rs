use std::path::PathBuf;

use crate::error::ConfigError;

/// Limits applied to an upload channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UploadLimits {
    /// Maximum number of part-data bytes retained for replay.
    ///
    /// `None` keeps the full history available for late subscribers, which
    /// grows with the size of the upload. When set, exceeding the cap fails
    /// the event stream terminally.
    pub max_replay_bytes: Option<u64>,
}

/// Uploader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UploadConfig {
    /// Base directory for resolving relative transfer destinations.
    ///
    /// When unset, relative destinations resolve to uniquely named fresh
    /// files under [`std::env::temp_dir`].
    pub base_dir: Option<PathBuf>,
    /// Directory where disk spools are created.
    ///
    /// Defaults to [`std::env::temp_dir`] when unset.
    pub spool_dir: Option<PathBuf>,
    /// Upload channel limits.
    pub limits: UploadLimits,
}

impl UploadConfig {
    /// Validates configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_replay_bytes == Some(0) {
            return Err(ConfigError::InvalidReplayLimit);
        }
        Ok(())
    }

    /// Returns the directory where disk spools are created, applying the
    /// temp-directory default.
    pub fn resolved_spool_dir(&self) -> PathBuf {
        self.spool_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
