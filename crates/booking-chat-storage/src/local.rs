//! Filesystem object store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use booking_chat_common::StorageConfig;
use booking_chat_core::{DomainError, MediaPath, ObjectStore, RepoResult, Snowflake};

use crate::signer::{MediaUrlSigner, SignedUrlError};

/// Stores each object as a file at `<root>/<key>`
#[derive(Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
    signer: MediaUrlSigner,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, signer: MediaUrlSigner) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            base_url,
            signer,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            &config.media_root,
            &config.public_base_url,
            MediaUrlSigner::new(&config.signing_secret),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read an object's bytes
    #[instrument(skip(self), fields(path = %path))]
    pub async fn read(&self, path: &MediaPath) -> RepoResult<Vec<u8>> {
        match tokio::fs::read(self.object_path(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DomainError::MediaNotFound(path.to_string()))
            }
            Err(e) => Err(storage_error("read", &e)),
        }
    }

    /// Check a signed URL token against the requested key
    pub fn verify(&self, token: &str, path: &MediaPath) -> Result<(), SignedUrlError> {
        self.signer.verify(token, path.as_str()).map(|_| ())
    }

    fn object_path(&self, path: &MediaPath) -> PathBuf {
        // MediaPath segments are already restricted to [A-Za-z0-9._-]
        self.root.join(path.as_str())
    }

    fn thread_dir(&self, thread_id: Snowflake) -> PathBuf {
        self.root.join(MediaPath::thread_prefix(thread_id))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, thread_id: Snowflake, filename: &str, bytes: &[u8]) -> RepoResult<MediaPath> {
        let object_name = format!("{}-{filename}", Uuid::new_v4().simple());
        let path = MediaPath::new(thread_id, &object_name)
            .ok_or_else(|| DomainError::InvalidInput(format!("invalid file name: {filename}")))?;

        let target = self.object_path(&path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create_dir", &e))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| storage_error("write", &e))?;

        debug!(path = %path, "Stored media object");
        Ok(path)
    }

    async fn signed_read_url(&self, path: &MediaPath, ttl_secs: u64) -> RepoResult<String> {
        let token = self
            .signer
            .sign(path, ttl_secs)
            .map_err(|e| DomainError::StorageError(e.to_string()))?;
        Ok(format!("{}/media/{path}?token={token}", self.base_url))
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &MediaPath) -> RepoResult<()> {
        match tokio::fs::remove_file(self.object_path(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Media object already gone");
                Ok(())
            }
            Err(e) => Err(storage_error("delete", &e)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_prefix(&self, thread_id: Snowflake) -> RepoResult<u64> {
        let dir = self.thread_dir(thread_id);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(storage_error("read_dir", &e)),
        };

        let mut removed = 0u64;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("read_dir", &e))?
        {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(storage_error("delete", &e)),
            }
        }

        match tokio::fs::remove_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            // Something raced a new upload in; the next purge run picks it up
            Err(e) => warn!(error = %e, "Thread media directory not removed"),
        }

        Ok(removed)
    }
}

fn storage_error(op: &str, err: &std::io::Error) -> DomainError {
    DomainError::StorageError(format!("{op}: {err}"))
}
