use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll, Waker},
};

use bytes::Bytes;
use futures::Stream;

use crate::error::StreamError;

/// Terminal event ending an upload event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    /// All part data arrived and the upload completed.
    Complete,
    /// The upload failed before completing.
    Failed(StreamError),
}

#[derive(Debug)]
struct State {
    chunks: Vec<Bytes>,
    buffered_bytes: u64,
    max_replay_bytes: Option<u64>,
    terminal: Option<Terminal>,
    wakers: Vec<Waker>,
}

impl State {
    fn take_wakers(&mut self) -> Vec<Waker> {
        std::mem::take(&mut self.wakers)
    }
}

/// Replayable multi-subscriber channel of part-data events.
///
/// Chunks are buffered in publish order and replayed index-wise to every
/// subscriber, so a subscriber attaching after some chunks were emitted still
/// observes the full sequence. At most one terminal event is ever recorded.
#[derive(Debug, Clone)]
pub(crate) struct ReplayChannel {
    state: Arc<Mutex<State>>,
}

impl ReplayChannel {
    pub(crate) fn new(max_replay_bytes: Option<u64>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                chunks: Vec::new(),
                buffered_bytes: 0,
                max_replay_bytes,
                terminal: None,
                wakers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes one chunk to current and future subscribers.
    pub(crate) fn publish(&self, chunk: Bytes) -> Result<(), StreamError> {
        let wakers = {
            let mut state = self.lock();
            if state.terminal.is_some() {
                return Err(StreamError::new("upload stream already terminated"));
            }

            let next = state.buffered_bytes.saturating_add(chunk.len() as u64);
            if let Some(limit) = state.max_replay_bytes {
                if next > limit {
                    let error =
                        StreamError::new(format!("replay buffer limit of {limit} bytes exceeded"));
                    state.terminal = Some(Terminal::Failed(error.clone()));
                    let wakers = state.take_wakers();
                    drop(state);
                    wake_all(wakers);
                    return Err(error);
                }
            }

            state.buffered_bytes = next;
            state.chunks.push(chunk);
            state.take_wakers()
        };
        wake_all(wakers);
        Ok(())
    }

    /// Records the terminal event. The first terminal wins; later calls are
    /// no-ops.
    pub(crate) fn terminate(&self, terminal: Terminal) {
        let wakers = {
            let mut state = self.lock();
            if state.terminal.is_some() {
                return;
            }
            state.terminal = Some(terminal);
            state.take_wakers()
        };
        wake_all(wakers);
    }

    pub(crate) fn subscribe(&self) -> PartStream {
        PartStream {
            channel: self.clone(),
            position: 0,
            done: false,
        }
    }

    pub(crate) fn completion(&self) -> Completion {
        Completion {
            channel: self.clone(),
        }
    }
}

/// Subscriber stream over an upload's part-data events.
///
/// Items arrive in publish order: the full history first, then live chunks.
/// A failed upload yields its [`StreamError`] as the final item; a completed
/// upload ends the stream cleanly.
#[derive(Debug)]
pub struct PartStream {
    channel: ReplayChannel,
    position: usize,
    done: bool,
}

impl Stream for PartStream {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        let mut state = this.channel.lock();
        let state = &mut *state;
        if this.position < state.chunks.len() {
            let chunk = state.chunks[this.position].clone();
            this.position += 1;
            return Poll::Ready(Some(Ok(chunk)));
        }

        match &state.terminal {
            Some(Terminal::Complete) => {
                this.done = true;
                Poll::Ready(None)
            }
            Some(Terminal::Failed(error)) => {
                this.done = true;
                Poll::Ready(Some(Err(error.clone())))
            }
            None => {
                state.wakers.push(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// One-shot future resolving with an upload stream's terminal event.
#[derive(Debug)]
pub struct Completion {
    channel: ReplayChannel,
}

impl Future for Completion {
    type Output = Terminal;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = this.channel.lock();
        let state = &mut *state;
        match &state.terminal {
            Some(terminal) => Poll::Ready(terminal.clone()),
            None => {
                state.wakers.push(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

fn wake_all(wakers: Vec<Waker>) {
    for waker in wakers {
        waker.wake();
    }
}
