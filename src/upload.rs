use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use mime::Mime;
use tracing::{debug, warn};

use crate::{
    config::UploadConfig,
    error::TransferError,
    replay::{Completion, PartStream, ReplayChannel, Terminal},
    spool::{disk::sanitize_filename, UploadSource},
};

/// Streaming handle over one in-flight file upload.
///
/// Metadata accessors read through the underlying [`UploadSource`] at call
/// time and never block. Part-data events are observed through
/// [`subscribe`](Self::subscribe); the spooled bytes are claimed with
/// [`transfer_to`](Self::transfer_to), which runs the move immediately for a
/// completed upload and otherwise waits for the event stream's terminal
/// event first.
#[derive(Debug)]
pub struct StreamingUpload<S> {
    source: Arc<S>,
    config: UploadConfig,
    events: ReplayChannel,
    transferred: Arc<AtomicBool>,
}

impl<S> Clone for StreamingUpload<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            events: self.events.clone(),
            transferred: Arc::clone(&self.transferred),
        }
    }
}

impl<S> StreamingUpload<S>
where
    S: UploadSource,
{
    pub(crate) fn new(source: Arc<S>, config: UploadConfig, events: ReplayChannel) -> Self {
        Self {
            source,
            config,
            events,
            transferred: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the upload's declared content type.
    ///
    /// Empty or unparseable declarations yield `None`.
    pub fn content_type(&self) -> Option<Mime> {
        let raw = self.source.content_type();
        if raw.is_empty() {
            return None;
        }
        raw.parse().ok()
    }

    /// Logical field name of the upload.
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// File name declared by the client.
    pub fn file_name(&self) -> &str {
        self.source.file_name()
    }

    /// Declared size of the upload in bytes.
    pub fn size(&self) -> u64 {
        self.source.size()
    }

    /// Whether all part data has been received.
    ///
    /// The answer may be stale immediately after returning. Callers that
    /// need a stable signal should use [`completed`](Self::completed) or
    /// [`subscribe`](Self::subscribe) instead.
    pub fn is_complete(&self) -> bool {
        self.source.is_complete()
    }

    /// Returns a reference to the underlying spool source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Attaches a new subscriber to the upload's part-data events.
    ///
    /// Each subscriber independently receives the full history of chunks
    /// followed by live chunks, ending with the terminal event.
    pub fn subscribe(&self) -> PartStream {
        self.events.subscribe()
    }

    /// One-shot future resolving once the upload's event stream terminates.
    pub fn completed(&self) -> Completion {
        self.events.completion()
    }

    /// Moves the spooled upload to `destination`.
    ///
    /// Runs the move immediately when the upload is already complete and
    /// otherwise waits for the event stream's terminal event first. Resolves
    /// `Ok(true)` when data was moved and `Ok(false)` when the source had
    /// nothing to move. The move happens at most once per upload: concurrent
    /// or repeated calls fail with [`TransferError::AlreadyTransferred`],
    /// though a move that itself failed releases the claim so the caller may
    /// retry.
    ///
    /// Dropping the returned future cancels result delivery, but a move
    /// already dispatched to the blocking pool runs to completion.
    pub async fn transfer_to(&self, destination: impl AsRef<Path>) -> Result<bool, TransferError> {
        let destination = destination.as_ref();
        if !self.is_complete() {
            match self.completed().await {
                Terminal::Complete => {}
                Terminal::Failed(error) => return Err(TransferError::Stream(error)),
            }
            if !self.is_complete() {
                return Err(TransferError::Incomplete);
            }
        }
        self.perform_move(destination).await
    }

    /// Moves the spooled upload to `location` resolved against the
    /// configured base directory.
    ///
    /// `location` is sanitized before joining, so it cannot escape the base
    /// directory. With no base directory configured, the destination is a
    /// uniquely named fresh file under the process temp directory with
    /// `location` embedded in its name.
    pub async fn transfer_to_location(&self, location: &str) -> Result<bool, TransferError> {
        let file_name = sanitize_filename(location);
        let destination = match self.config.base_dir.as_deref() {
            Some(base) => base.join(file_name),
            None => fresh_temp_destination(file_name).await?,
        };
        self.transfer_to(destination).await
    }

    /// Removes the spooled upload data.
    ///
    /// Resolves `Ok(true)` once the attempt finishes, even when the resource
    /// was already gone. Underlying deletion failures are logged, not
    /// surfaced.
    pub async fn delete(&self) -> Result<bool, TransferError> {
        if let Err(error) = self.source.delete().await {
            warn!(field = %self.name(), %error, "failed to delete spooled upload");
        }
        Ok(true)
    }

    async fn perform_move(&self, destination: &Path) -> Result<bool, TransferError> {
        if self.transferred.swap(true, Ordering::AcqRel) {
            return Err(TransferError::AlreadyTransferred);
        }

        debug!(
            file = %self.file_name(),
            destination = %destination.display(),
            "transferring upload"
        );

        match self.source.move_to(destination).await {
            Ok(moved) => Ok(moved),
            Err(source) => {
                // nothing was transferred; release the claim
                self.transferred.store(false, Ordering::Release);
                Err(TransferError::Io {
                    name: self.name().to_owned(),
                    source,
                })
            }
        }
    }
}

/// Creates a uniquely named destination under the process temp directory and
/// releases its backing file so the later rename target is fresh.
async fn fresh_temp_destination(location: String) -> Result<PathBuf, TransferError> {
    let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, TransferError> {
        let temp = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(&format!("_{location}"))
            .tempfile()
            .map_err(|source| TransferError::TempFile { source })?;
        Ok(temp.path().to_owned())
    })
    .await
    .map_err(|err| TransferError::TempFile {
        source: io::Error::other(err),
    })??;
    Ok(path)
}
