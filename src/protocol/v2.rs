//! Nexus 2 protocol: Lucene search plus the Maven content redirect endpoint
//!
//! Resolution is a two step affair. The search response yields a version (and,
//! if the caller didn't name one, a repository id); the download URL is then
//! templated against the content endpoint with that version.

use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use super::search::{build_url, get_json, null_as_default};
use crate::downloader::ArtifactDownloader;
use crate::error::{Error, Result};
use crate::types::{
    ArtifactRequest, DownloadTarget, FilenameStrategy, ProtocolVersion, SearchParams,
};
use crate::utils::is_blank;

const SEARCH_PATH: &str = "/nexus/service/local/lucene/search";
const CONTENT_PATH: &str = "/nexus/service/local/artifact/maven/content";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "totalCount", default)]
    #[allow(dead_code)]
    total_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<ArtifactHit>,
    #[serde(rename = "repoDetails", default, deserialize_with = "null_as_default")]
    repo_details: Vec<RepositoryDetail>,
}

#[derive(Debug, Deserialize)]
struct ArtifactHit {
    #[serde(rename = "latestRelease", default)]
    latest_release: Option<String>,
    #[serde(rename = "latestSnapshot", default)]
    latest_snapshot: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryDetail {
    #[serde(rename = "repositoryId", default)]
    repository_id: Option<String>,
}

/// Lucene search URL for the given parameters
pub fn search_url(base: &str, params: &SearchParams) -> Result<Url> {
    build_url(
        base,
        SEARCH_PATH,
        &[
            ("repositoryId", &params.repository_id),
            ("g", &params.group_id),
            ("a", &params.artifact_id),
            ("p", &params.packaging),
            ("v", &params.version),
            ("c", &params.classifier),
        ],
    )
}

/// Content URL serving `version` of the artifact out of `repository_id`
pub fn content_url(
    base: &str,
    params: &SearchParams,
    version: &str,
    repository_id: &str,
) -> Result<Url> {
    build_url(
        base,
        CONTENT_PATH,
        &[
            ("r", repository_id),
            ("g", &params.group_id),
            ("a", &params.artifact_id),
            ("p", &params.packaging),
            ("v", version),
            ("c", &params.classifier),
        ],
    )
}

/// Search for the artifact and pick its version
///
/// Returns `(version, repository_id)`. The repository id comes from the request,
/// or else from the first repository detail in the response. The version is the
/// latest release if there is one, otherwise the latest snapshot.
pub(crate) async fn resolve(
    downloader: &ArtifactDownloader,
    request: &ArtifactRequest,
) -> Result<(String, String)> {
    let config = downloader.config();
    let mut params = request.search_params();
    let url = search_url(config.base_url(), &params)?;
    downloader.emit_searching(&url, ProtocolVersion::V2);

    let response: SearchResponse = get_json(
        downloader.client(),
        &url,
        config.search_timeout,
        request.verbose,
    )
    .await?;

    if is_blank(&params.repository_id) {
        match response
            .repo_details
            .first()
            .and_then(|d| d.repository_id.as_deref())
            .filter(|id| !is_blank(id))
        {
            Some(id) => params.repository_id = id.to_string(),
            None => {
                return Err(Error::MissingRepository {
                    details: format!("{:?}", response.repo_details),
                });
            }
        }
    }

    let Some(hit) = response.data.first() else {
        return Err(Error::ArtifactNotFound {
            params,
            response: format!("{:?}", response),
        });
    };

    let version = [&hit.latest_release, &hit.latest_snapshot]
        .into_iter()
        .flatten()
        .find(|v| !is_blank(v))
        .cloned();

    match version {
        Some(version) => Ok((version, params.repository_id)),
        None => Err(Error::ArtifactNotFound {
            params,
            response: format!("{:?}", response.data),
        }),
    }
}

/// Turn a resolved version into a download target on the content endpoint
///
/// An explicit application name is saved as `<name>.<packaging>`; otherwise the
/// server's `Content-Disposition` filename is used.
pub(crate) fn download_target(
    base: &str,
    request: &ArtifactRequest,
    version: &str,
    repository_id: &str,
) -> Result<DownloadTarget> {
    let url = content_url(base, &request.search_params(), version, repository_id)?;
    let filename = match request.application_name() {
        Some(name) => FilenameStrategy::Explicit {
            name: name.to_string(),
            extension: Some(request.packaging.clone()).filter(|p| !is_blank(p)),
        },
        None => FilenameStrategy::ContentDisposition,
    };
    Ok(DownloadTarget {
        url,
        folder: request.target_folder.clone(),
        filename,
    })
}

/// Resolve the latest version, then stream it from the content endpoint
pub(crate) async fn download(
    downloader: &ArtifactDownloader,
    request: &ArtifactRequest,
) -> Result<PathBuf> {
    let (version, repository_id) = resolve(downloader, request).await?;

    let target = download_target(
        downloader.config().base_url(),
        request,
        &version,
        &repository_id,
    )?;

    if request.verbose {
        tracing::info!(url = %target.url, "download url");
    }
    downloader.emit_resolved(&target.url);

    downloader.fetch(&target).await
}
