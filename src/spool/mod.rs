use std::{fmt, io, path::Path};

use async_trait::async_trait;
use bytes::Bytes;

/// Disk-backed spool engine.
pub mod disk;
/// In-memory spool engine.
pub mod memory;

pub use disk::DiskSpool;
pub use memory::MemorySpool;

/// Immutable metadata snapshot describing one upload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    /// Logical field name.
    pub name: String,
    /// File name declared by the client.
    pub file_name: String,
    /// Raw declared content type. Empty when the client declared none.
    pub content_type: String,
    /// Declared size in bytes.
    pub size: u64,
}

impl UploadMeta {
    /// Creates a metadata snapshot for one upload field.
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            size,
        }
    }
}

/// Contract between an upload channel and the engine spooling its bytes.
///
/// Metadata reads report best-known-so-far values and never block. The
/// resource primitives run their blocking filesystem work on the runtime's
/// blocking pool, off the producer's event-processing task.
#[async_trait]
pub trait UploadSource: Send + Sync + fmt::Debug {
    /// Logical field name of the upload.
    fn name(&self) -> &str;

    /// File name declared by the client.
    fn file_name(&self) -> &str;

    /// Raw declared content type. Empty when the client declared none.
    fn content_type(&self) -> &str;

    /// Declared size of the upload in bytes.
    fn size(&self) -> u64;

    /// Whether all part data has been received.
    fn is_complete(&self) -> bool;

    /// Marks the upload as fully received.
    fn mark_complete(&self);

    /// Appends one chunk of part data to the spooled resource.
    async fn append(&self, chunk: Bytes) -> io::Result<()>;

    /// Moves the spooled resource to `destination`.
    ///
    /// Returns `Ok(false)` when there was nothing to move; the destination
    /// is left untouched in that case.
    async fn move_to(&self, destination: &Path) -> io::Result<bool>;

    /// Removes the spooled resource.
    ///
    /// Removing an already-gone resource is not an error.
    async fn delete(&self) -> io::Result<()>;
}
