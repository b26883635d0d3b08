use std::{
    io,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::fs;

use crate::spool::{UploadMeta, UploadSource};

/// In-memory spool buffering part data on the heap.
#[derive(Debug)]
pub struct MemorySpool {
    meta: UploadMeta,
    buffer: Mutex<Option<BytesMut>>,
    complete: AtomicBool,
}

impl MemorySpool {
    /// Creates an empty in-memory spool for `meta`.
    pub fn new(meta: UploadMeta) -> Self {
        Self {
            meta,
            buffer: Mutex::new(Some(BytesMut::new())),
            complete: AtomicBool::new(false),
        }
    }

    /// Number of bytes spooled so far.
    pub fn spooled_bytes(&self) -> u64 {
        self.lock().as_ref().map_or(0, |buffer| buffer.len() as u64)
    }

    fn lock(&self) -> MutexGuard<'_, Option<BytesMut>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UploadSource for MemorySpool {
    fn name(&self) -> &str {
        &self.meta.name
    }

    fn file_name(&self) -> &str {
        &self.meta.file_name
    }

    fn content_type(&self) -> &str {
        &self.meta.content_type
    }

    fn size(&self) -> u64 {
        self.meta.size
    }

    fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    fn mark_complete(&self) {
        self.complete.store(true, Ordering::Release);
    }

    async fn append(&self, chunk: Bytes) -> io::Result<()> {
        let mut buffer = self.lock();
        let Some(buffer) = buffer.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "spool buffer was released",
            ));
        };
        buffer.extend_from_slice(&chunk);
        Ok(())
    }

    async fn move_to(&self, destination: &Path) -> io::Result<bool> {
        let data = match self.lock().take() {
            Some(buffer) => buffer.freeze(),
            None => return Ok(false),
        };

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(destination, &data).await?;
        Ok(true)
    }

    async fn delete(&self) -> io::Result<()> {
        self.lock().take();
        Ok(())
    }
}
