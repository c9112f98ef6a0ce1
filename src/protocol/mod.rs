//! Search protocols spoken by the repository manager
//!
//! Each protocol version resolves a request on its own and then hands a
//! [`DownloadTarget`](crate::types::DownloadTarget) to the downloader:
//! - [`v2`] - Lucene search, version lookup, then the content endpoint
//! - [`v3`] - REST v1 asset search returning a direct URL
//!
//! Selection is a plain `match` on [`ProtocolVersion`].

pub(crate) mod search;
pub mod v2;
pub mod v3;

use std::path::PathBuf;

use crate::downloader::ArtifactDownloader;
use crate::error::Result;
use crate::types::{ArtifactRequest, ProtocolVersion, Resolved};

impl ProtocolVersion {
    /// Run this protocol's search and normalize the outcome
    pub(crate) async fn resolve(
        self,
        downloader: &ArtifactDownloader,
        request: &ArtifactRequest,
    ) -> Result<Resolved> {
        match self {
            ProtocolVersion::V2 => {
                let (version, repository_id) = v2::resolve(downloader, request).await?;
                Ok(Resolved::V2 {
                    version,
                    repository_id,
                })
            }
            ProtocolVersion::V3 => {
                let download_url = v3::resolve(downloader, request).await?;
                Ok(Resolved::V3 { download_url })
            }
        }
    }

    /// Resolve with this protocol, then download the result
    pub(crate) async fn download(
        self,
        downloader: &ArtifactDownloader,
        request: &ArtifactRequest,
    ) -> Result<PathBuf> {
        match self {
            ProtocolVersion::V2 => v2::download(downloader, request).await,
            ProtocolVersion::V3 => v3::download(downloader, request).await,
        }
    }
}
