use std::future::Future;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::domain::{AppError, BlobRegistry, BlobUrl, ResultStore};
use crate::utils::{download_name, numbered_name};

/// Attempts at finding a free `name (n).ext` before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Saves compressed blobs into the download directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    dir: PathBuf,
    prefix: String,
    normalize_extension: bool,
}

impl Downloader {
    pub fn new(dir: PathBuf, prefix: String, normalize_extension: bool) -> Self {
        Self {
            dir,
            prefix,
            normalize_extension,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn set_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
    }

    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.dir
            .join(download_name(&self.prefix, filename, self.normalize_extension))
    }

    /// The blob is resolved now; a URL revoked later does not affect the
    /// returned save. Existing files are never replaced: a taken name gets a
    /// ` (n)` suffix and the path actually written is returned.
    pub fn download_one(
        &self,
        blobs: &BlobRegistry,
        url: BlobUrl,
        filename: &str,
    ) -> impl Future<Output = Result<PathBuf, AppError>> + Send + 'static {
        let job = blobs
            .resolve(url)
            .map(|bytes| (bytes, self.target_path(filename)))
            .ok_or_else(|| AppError::BlobRevoked(url.to_string()));

        async move {
            let (bytes, path) = job?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::Io(format!("{}: {}", parent.display(), e)))?;
            }
            let saved = write_new_file(&path, &bytes).await?;

            log::info!("Saved {} ({} bytes)", saved.display(), bytes.len());
            Ok(saved)
        }
    }

    /// One save per stored result, in store order, one after another.
    pub fn download_all(
        &self,
        blobs: &BlobRegistry,
        results: &ResultStore,
    ) -> impl Future<Output = Vec<Result<PathBuf, AppError>>> + Send + 'static {
        let jobs: Vec<_> = results
            .iter()
            .map(|result| self.download_one(blobs, result.reference_url, &result.filename))
            .collect();

        async move {
            futures::stream::iter(jobs)
                .then(|job| job)
                .collect::<Vec<_>>()
                .await
        }
    }
}

async fn write_new_file(path: &Path, bytes: &Bytes) -> Result<PathBuf, AppError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    for n in 0..MAX_NAME_ATTEMPTS {
        let candidate = dir.join(numbered_name(&name, n));
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await;

        let mut file = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next name", candidate.display());
                continue;
            }
            Err(e) => return Err(AppError::Io(format!("{}: {}", candidate.display(), e))),
        };

        file.write_all(bytes)
            .await
            .map_err(|e| AppError::Io(format!("{}: {}", candidate.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::Io(format!("{}: {}", candidate.display(), e)))?;
        return Ok(candidate);
    }

    Err(AppError::Io(format!(
        "{}: no free file name after {} attempts",
        path.display(),
        MAX_NAME_ATTEMPTS
    )))
}
