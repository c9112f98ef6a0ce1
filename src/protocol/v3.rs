//! Nexus 3 protocol: REST v1 asset search
//!
//! The search response already carries an absolute download URL per asset, so
//! there is no second URL-building step.

use chrono::{DateTime, Utc};
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

const SEARCH_PATH: &str = "/service/rest/v1/search/assets";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Asset {
    #[serde(rename = "downloadUrl", default)]
    download_url: Option<String>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(rename = "lastModified", default)]
    last_modified: Option<DateTime<Utc>>,
}

/// Asset search URL for the given parameters
pub fn search_url(base: &str, params: &SearchParams) -> Result<Url> {
    build_url(
        base,
        SEARCH_PATH,
        &[
            ("repository", &params.repository_id),
            ("group", &params.group_id),
            ("name", &params.artifact_id),
            ("maven.extension", &params.packaging),
            ("version", &params.version),
            ("maven.classifier", &params.classifier),
        ],
    )
}

/// Search for the artifact and return the download URL of the first asset
pub(crate) async fn resolve(
    downloader: &ArtifactDownloader,
    request: &ArtifactRequest,
) -> Result<String> {
    let config = downloader.config();
    let params = request.search_params();
    let url = search_url(config.base_url(), &params)?;
    downloader.emit_searching(&url, ProtocolVersion::V3);

    let response: SearchResponse = get_json(
        downloader.client(),
        &url,
        config.search_timeout,
        request.verbose,
    )
    .await?;

    let Some(asset) = response.items.first() else {
        return Err(Error::ArtifactNotFound {
            params,
            response: format!("{:?}", response),
        });
    };

    match asset.download_url.as_deref().filter(|u| !is_blank(u)) {
        Some(download_url) => Ok(download_url.to_string()),
        None => Err(Error::ArtifactNotFound {
            params,
            response: format!("{:?}", response.items),
        }),
    }
}

/// Download target for an asset URL
///
/// An explicit application name is saved as `<name>.<packaging>`; otherwise the
/// last segment of the asset URL names the file.
pub(crate) fn download_target(
    request: &ArtifactRequest,
    download_url: &str,
) -> Result<DownloadTarget> {
    let url = Url::parse(download_url)?;
    let filename = match request.application_name() {
        Some(name) => FilenameStrategy::Explicit {
            name: name.to_string(),
            extension: Some(request.packaging.clone()).filter(|p| !is_blank(p)),
        },
        None => FilenameStrategy::UrlPath,
    };
    Ok(DownloadTarget {
        url,
        folder: request.target_folder.clone(),
        filename,
    })
}

/// Resolve the asset URL, then stream it
pub(crate) async fn download(
    downloader: &ArtifactDownloader,
    request: &ArtifactRequest,
) -> Result<PathBuf> {
    let download_url = resolve(downloader, request).await?;
    let target = download_target(request, &download_url)?;

    if request.verbose {
        tracing::info!(url = %target.url, "download url");
    }
    downloader.emit_resolved(&target.url);

    downloader.fetch(&target).await
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FULL_ITEM: &str = r#"{"items":[{"downloadUrl":"success","path":"path","id":"id","repository":"maven-central","format":"maven2","checksum":{"sha1":"sha1","sha256":"sha256","sha512":"sha512","md5":"md5"},"contentType":"application/java-archive","lastModified":"2006-03-14T05:31:30.000+00:00","maven2":{"extension":"jar","groupId":"stax","artifactId":"stax-api","version":"1.0.1"}}],"continuationToken":null}"#;

    fn request() -> ArtifactRequest {
        ArtifactRequest::new("com.group.id", "app-server")
            .with_packaging("rpm")
            .with_protocol_version(3)
            .verbose(true)
    }

    async fn stub(body: &str) -> (MockServer, ArtifactDownloader) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        let downloader = ArtifactDownloader::new(Config::new(server.uri())).unwrap();
        (server, downloader)
    }

    #[test]
    fn test_search_url_template() {
        let params = request()
            .with_repository("maven-releases")
            .with_version("1.0.0")
            .search_params();
        let url = search_url("http://nexus:8081", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "http://nexus:8081/service/rest/v1/search/assets?repository=maven-releases&group=com.group.id&name=app-server&maven.extension=rpm&version=1.0.0&maven.classifier="
        );
    }

    #[tokio::test]
    async fn test_success() {
        let (_server, downloader) = stub(FULL_ITEM).await;
        let url = resolve(&downloader, &request()).await.unwrap();
        assert_eq!(url, "success");
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("group", "com.group.id"))
            .and(query_param("name", "app-server"))
            .and(query_param("maven.extension", "rpm"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FULL_ITEM))
            .expect(1)
            .mount(&server)
            .await;
        let downloader = ArtifactDownloader::new(Config::new(server.uri())).unwrap();

        assert_eq!(resolve(&downloader, &request()).await.unwrap(), "success");
    }

    #[tokio::test]
    async fn test_empty_items() {
        let (_server, downloader) = stub(r#"{"items":[],"continuationToken":null}"#).await;
        let err = resolve(&downloader, &request()).await.unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound { .. }));
        assert!(err.to_string().contains("Could not find artifact"));
    }

    #[tokio::test]
    async fn test_missing_items_tag() {
        let (_server, downloader) = stub(r#"{"continuationToken":null}"#).await;
        let err = resolve(&downloader, &request()).await.unwrap_err();
        assert!(err.to_string().contains("Could not find artifact"));
    }

    #[tokio::test]
    async fn test_empty_null_or_absent_download_url() {
        for body in [
            r#"{"items":[{"downloadUrl":"","repository":"maven-central"}]}"#,
            r#"{"items":[{"downloadUrl":null,"repository":"maven-central"}]}"#,
            r#"{"items":[{"repository":"maven-central"}]}"#,
        ] {
            let (_server, downloader) = stub(body).await;
            let err = resolve(&downloader, &request()).await.unwrap_err();
            assert!(matches!(err, Error::ArtifactNotFound { .. }), "body {body}");
            assert!(err.to_string().contains("Could not find artifact"));
            assert!(err.to_string().contains("Asset"));
        }
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (_server, downloader) = stub(r#"{"items":[{"downloadUrl":1}]}"#).await;
        let err = resolve(&downloader, &request()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let downloader = ArtifactDownloader::new(Config::new(server.uri())).unwrap();

        let err = resolve(&downloader, &request()).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_invalid_host() {
        let downloader = ArtifactDownloader::new(Config::new("invalid_url")).unwrap();
        assert!(resolve(&downloader, &request()).await.is_err());
    }

    #[test]
    fn test_download_target_from_url_path() {
        let target = download_target(
            &request(),
            "http://nexus/repository/maven-releases/com/group/id/app-server/1.0.0/app-server-1.0.0.rpm",
        )
        .unwrap();
        assert_eq!(target.filename, FilenameStrategy::UrlPath);
    }

    #[test]
    fn test_download_target_explicit_name() {
        let target = download_target(
            &request().with_application_name("server"),
            "http://nexus/repository/x/app-server-1.0.0.rpm",
        )
        .unwrap();
        assert_eq!(
            target.filename,
            FilenameStrategy::Explicit {
                name: "server".into(),
                extension: Some("rpm".into())
            }
        );
    }

    #[test]
    fn test_download_target_rejects_relative_url() {
        assert!(matches!(
            download_target(&request(), "success"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
