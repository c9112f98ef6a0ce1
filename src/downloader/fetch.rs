//! Streaming download with tmp-then-rename finalization
//!
//! The body is written to `<folder>/<filename>.tmp` and only renamed to
//! `<folder>/<filename>` once every byte is on disk, so the final path never
//! holds a partial file. A failed rename leaves the `.tmp` file behind.

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::ArtifactDownloader;
use super::progress::ProgressLine;
use crate::error::{Error, Result};
use crate::types::{DownloadTarget, Event, FilenameStrategy};
use crate::utils::{filename_from_content_disposition, filename_from_url, is_blank};

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchOutcome {
    /// Final file path
    pub(crate) path: PathBuf,
    /// Bytes written
    pub(crate) bytes: u64,
}

/// Pick the filename for a download according to its strategy
///
/// `UrlPath` falls back to the `Content-Disposition` header when the URL has no
/// usable last segment.
pub(crate) fn resolve_filename(target: &DownloadTarget, headers: &HeaderMap) -> Result<String> {
    let from_header = || -> Result<Option<String>> {
        let value = headers
            .get(CONTENT_DISPOSITION)
            .map(|v| {
                v.to_str().map_err(|_| {
                    Error::Decode("invalid Content-Disposition header: not valid UTF-8".into())
                })
            })
            .transpose()?;
        filename_from_content_disposition(value)
    };

    let name = match &target.filename {
        FilenameStrategy::Explicit { name, extension } => match extension {
            Some(ext) if !is_blank(ext) => Some(format!("{}.{}", name, ext)),
            _ => Some(name.clone()),
        },
        FilenameStrategy::UrlPath => match filename_from_url(target.url.as_str()) {
            Some(name) => Some(name),
            None => from_header()?,
        },
        FilenameStrategy::ContentDisposition => from_header()?,
    };

    name.filter(|n| !is_blank(n))
        .ok_or_else(|| Error::MissingFilename {
            url: target.url.to_string(),
        })
}

/// Download `target`, reporting progress after every chunk
pub(crate) async fn fetch<W: Write + Send>(
    downloader: &ArtifactDownloader,
    target: &DownloadTarget,
    progress: &mut ProgressLine<W>,
) -> Result<FetchOutcome> {
    let mut request = downloader.client().get(target.url.clone());
    if let Some(timeout) = downloader.config().download_timeout {
        request = request.timeout(timeout);
    }
    let mut response = request.send().await?;

    if !response.status().is_success() {
        return Err(Error::Status {
            status: response.status().as_u16(),
            url: target.url.to_string(),
        });
    }

    let filename = resolve_filename(target, response.headers())?;
    let final_path = target.final_path_for(&filename);
    let tmp_path = target.tmp_path_for(&filename);

    tokio::fs::create_dir_all(&target.folder).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create target folder '{}': {}",
                target.folder.display(),
                e
            ),
        ))
    })?;

    let mut file = tokio::fs::File::create(&tmp_path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create '{}': {}", tmp_path.display(), e),
        ))
    })?;

    tracing::debug!(url = %target.url, path = %tmp_path.display(), "streaming artifact");
    downloader.emit_event(Event::DownloadStarted {
        path: tmp_path.clone(),
        total_bytes: response.content_length(),
    });

    let mut bytes: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
        progress.update(bytes);
        downloader.emit_event(Event::Downloading { bytes });
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    progress.finish(&final_path);

    tokio::fs::rename(&tmp_path, &final_path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to rename '{}' to '{}': {}",
                tmp_path.display(),
                final_path.display(),
                e
            ),
        ))
    })?;

    tracing::debug!(path = %final_path.display(), bytes, "artifact saved");
    downloader.emit_event(Event::Complete {
        path: final_path.clone(),
        bytes,
    });

    Ok(FetchOutcome {
        path: final_path,
        bytes,
    })
}
