use std::{
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
    sync::Mutex,
};
use uuid::Uuid;

use crate::spool::{UploadMeta, UploadSource};

/// Disk-backed spool holding part data in a uniquely named file.
///
/// The backing file lives under the configured spool directory until it is
/// moved to its final destination or deleted.
#[derive(Debug)]
pub struct DiskSpool {
    meta: UploadMeta,
    path: PathBuf,
    file: Mutex<Option<File>>,
    complete: AtomicBool,
    spooled_bytes: AtomicU64,
}

impl DiskSpool {
    /// Creates a fresh spool file for `meta` under `dir`.
    pub async fn create(dir: impl AsRef<Path>, meta: UploadMeta) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let file_name = format!(
            "{}-{}.spool",
            sanitize_filename(&meta.file_name),
            Uuid::new_v4()
        );
        let path = dir.join(file_name);
        let file = File::create(&path).await?;
        tracing::debug!(field = %meta.name, path = %path.display(), "created disk spool");

        Ok(Self {
            meta,
            path,
            file: Mutex::new(Some(file)),
            complete: AtomicBool::new(false),
            spooled_bytes: AtomicU64::new(0),
        })
    }

    /// Path of the backing spool file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes spooled so far.
    pub fn spooled_bytes(&self) -> u64 {
        self.spooled_bytes.load(Ordering::Acquire)
    }
}

#[async_trait]
impl UploadSource for DiskSpool {
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
        let mut file = self.file.lock().await;
        let Some(file) = file.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "spool file was released",
            ));
        };
        file.write_all(&chunk).await?;
        self.spooled_bytes
            .fetch_add(chunk.len() as u64, Ordering::AcqRel);
        Ok(())
    }

    async fn move_to(&self, destination: &Path) -> io::Result<bool> {
        let mut file = self.file.lock().await;
        if let Some(mut open) = file.take() {
            open.flush().await?;
        }

        if !fs::try_exists(&self.path).await? {
            return Ok(false);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        match fs::rename(&self.path, destination).await {
            Ok(()) => Ok(true),
            // rename cannot cross filesystems; fall back to copy + remove
            Err(_) => {
                fs::copy(&self.path, destination).await?;
                fs::remove_file(&self.path).await?;
                Ok(true)
            }
        }
    }

    async fn delete(&self) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.take();
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Strips path separators, traversal sequences and other hostile characters
/// from a client-supplied file name.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .filter(|c| !c.is_control())
        .collect();

    let cleaned = cleaned.replace("..", "_");
    if cleaned.is_empty() {
        "unnamed".to_owned()
    } else {
        cleaned
    }
}
