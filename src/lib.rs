#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Streaming file-upload transfer for asynchronously-completing uploads.
//!
//! `streamgear` bridges an upload producer (typically an HTTP multipart
//! decoder) to consumers that need upload metadata, a replayable stream of
//! part-data events, and deferred transfer semantics: move the spooled bytes
//! to a destination now if the upload already finished, or as soon as it
//! does.
//!
//! An [`Uploader`] opens upload channels. Each channel has a producer-facing
//! [`UploadWriter`] that spools chunks and ends the stream with exactly one
//! terminal event, and a consumer-facing [`StreamingUpload`] exposing
//! metadata, subscriptions and the at-most-once [`transfer_to`] and
//! [`delete`] operations. Spooling goes through an [`UploadSource`] engine;
//! [`DiskSpool`] and [`MemorySpool`] are provided.
//!
//! [`transfer_to`]: StreamingUpload::transfer_to
//! [`delete`]: StreamingUpload::delete

use std::sync::Arc;

/// Fluent builder API.
pub mod builder;
/// Uploader configuration.
pub mod config;
/// Error types exposed by this crate.
pub mod error;
/// Replayable part-data event channel.
pub mod replay;
/// Spool engines and the upload source contract.
pub mod spool;
/// Streaming upload consumer handle.
pub mod upload;
/// Producer-facing upload writer.
pub mod writer;

pub use builder::UploaderBuilder;
pub use config::{UploadConfig, UploadLimits};
pub use error::{ConfigError, StreamError, TransferError};
pub use replay::{Completion, PartStream, Terminal};
pub use spool::{DiskSpool, MemorySpool, UploadMeta, UploadSource};
pub use upload::StreamingUpload;
pub use writer::UploadWriter;

use crate::replay::ReplayChannel;

/// Main `streamgear` entry point: opens upload channels with shared
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct Uploader {
    config: UploadConfig,
}

impl Uploader {
    /// Creates an uploader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uploader with explicit validated configuration.
    pub fn with_config(config: UploadConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a fluent builder with permissive defaults.
    pub fn builder() -> UploaderBuilder {
        UploaderBuilder::default()
    }

    /// Returns an immutable reference to the active configuration.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Opens an upload channel over `source`.
    ///
    /// Returns the producer-facing writer and the consumer-facing streaming
    /// upload handle, wired to the same replayable event stream.
    pub fn open<S>(&self, source: S) -> (UploadWriter<S>, StreamingUpload<S>)
    where
        S: UploadSource,
    {
        let source = Arc::new(source);
        let events = ReplayChannel::new(self.config.limits.max_replay_bytes);
        let writer = UploadWriter::new(Arc::clone(&source), events.clone());
        let upload = StreamingUpload::new(source, self.config.clone(), events);
        (writer, upload)
    }

    /// Opens an upload channel spooling to a fresh disk file.
    pub async fn open_disk(
        &self,
        meta: UploadMeta,
    ) -> std::io::Result<(UploadWriter<DiskSpool>, StreamingUpload<DiskSpool>)> {
        let spool = DiskSpool::create(self.config.resolved_spool_dir(), meta).await?;
        Ok(self.open(spool))
    }
}
