use std::path::PathBuf;

use crate::{
    config::{UploadConfig, UploadLimits},
    error::ConfigError,
    Uploader,
};

/// Builder for configuring an [`Uploader`] instance.
#[derive(Debug, Clone, Default)]
pub struct UploaderBuilder {
    config: UploadConfig,
}

impl UploaderBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory for resolving relative transfer destinations.
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(base_dir.into());
        self
    }

    /// Sets the directory where disk spools are created.
    pub fn spool_dir(mut self, spool_dir: impl Into<PathBuf>) -> Self {
        self.config.spool_dir = Some(spool_dir.into());
        self
    }

    /// Replaces the upload limits wholesale.
    pub fn limits(mut self, limits: UploadLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Caps the number of part-data bytes retained for replay.
    pub fn max_replay_bytes(mut self, max_replay_bytes: u64) -> Self {
        self.config.limits.max_replay_bytes = Some(max_replay_bytes);
        self
    }

    /// Returns the current builder configuration snapshot.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Validates the configuration and builds the uploader.
    pub fn build(self) -> Result<Uploader, ConfigError> {
        Uploader::with_config(self.config)
    }
}
