use std::{fmt, sync::Arc};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::{
    error::StreamError,
    replay::{ReplayChannel, Terminal},
    spool::UploadSource,
};

/// Producer-facing half of an upload channel.
///
/// The writer spools incoming part data through the channel's
/// [`UploadSource`] and publishes each chunk to subscribers, ending the
/// event stream with exactly one terminal event. A writer dropped before
/// delivering a terminal fails the stream, so waiting transfers observe the
/// abort instead of hanging.
#[derive(Debug)]
pub struct UploadWriter<S> {
    source: Arc<S>,
    events: ReplayChannel,
    finished: bool,
}

impl<S> UploadWriter<S>
where
    S: UploadSource,
{
    pub(crate) fn new(source: Arc<S>, events: ReplayChannel) -> Self {
        Self {
            source,
            events,
            finished: false,
        }
    }

    /// Spools one chunk of part data and publishes it to subscribers.
    ///
    /// A spool failure ends the event stream with a terminal error.
    pub async fn push(&mut self, chunk: Bytes) -> Result<(), StreamError> {
        if let Err(err) = self.source.append(chunk.clone()).await {
            let error = StreamError::new(format!(
                "failed to spool chunk for `{}`: {err}",
                self.source.name()
            ));
            return Err(self.abort(error));
        }

        self.events.publish(chunk).map_err(|error| {
            self.finished = true;
            error
        })
    }

    /// Marks the upload complete and ends the event stream.
    pub fn complete(mut self) {
        self.finished = true;
        self.source.mark_complete();
        self.events.terminate(Terminal::Complete);
    }

    /// Ends the event stream with a terminal error.
    pub fn fail(mut self, error: StreamError) {
        self.finished = true;
        self.events.terminate(Terminal::Failed(error));
    }

    /// Drives an entire chunk stream into the channel and finishes it.
    ///
    /// A clean stream end marks the upload complete; a stream error ends the
    /// channel with a terminal failure carrying the error's message.
    pub async fn finish_from_stream<T, E>(mut self, mut stream: T) -> Result<(), StreamError>
    where
        T: Stream<Item = Result<Bytes, E>> + Unpin,
        E: fmt::Display,
    {
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => self.push(chunk).await?,
                Err(err) => {
                    let error = StreamError::new(format!("upload body stream error: {err}"));
                    self.fail(error.clone());
                    return Err(error);
                }
            }
        }
        self.complete();
        Ok(())
    }

    /// Drives an [`AsyncRead`] into the channel and finishes it.
    pub async fn finish_from_reader<R>(self, reader: R) -> Result<(), StreamError>
    where
        R: AsyncRead + Unpin,
    {
        self.finish_from_stream(ReaderStream::new(reader)).await
    }

    fn abort(&mut self, error: StreamError) -> StreamError {
        self.finished = true;
        self.events.terminate(Terminal::Failed(error.clone()));
        error
    }
}

impl<S> Drop for UploadWriter<S> {
    fn drop(&mut self) {
        if !self.finished {
            self.events.terminate(Terminal::Failed(StreamError::new(
                "upload aborted before completion",
            )));
        }
    }
}
