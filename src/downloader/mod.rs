//! Resolve-then-download entry point.
//!
//! [`ArtifactDownloader`] ties the pieces together:
//! - [`crate::protocol`] - per-version search and URL resolution
//! - [`fetch`] - streaming download into `<name>.tmp`, then rename
//! - [`progress`] - in-place terminal progress line

pub(crate) mod fetch;
pub mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ArtifactRequest, DownloadTarget, Event, ProtocolVersion, Resolved};
use progress::ProgressLine;

/// Main downloader instance (cloneable - all fields are cheap to clone)
#[derive(Clone)]
pub struct ArtifactDownloader {
    /// Shared HTTP client (connection pool, User-Agent)
    client: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for cheap clones)
    config: Arc<Config>,
}

impl std::fmt::Debug for ArtifactDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactDownloader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ArtifactDownloader {
    /// Create a new ArtifactDownloader instance
    ///
    /// The configuration is not validated here; call [`Config::validate`] first if
    /// it comes from user input.
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        // Progress events arrive per chunk; slow subscribers lag rather than block
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1024);

        Ok(Self {
            client,
            event_tx,
            config: Arc::new(config),
        })
    }

    /// Subscribe to download events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Protocol version for `request`: its own selector, or the configured default
    pub fn protocol_for(&self, request: &ArtifactRequest) -> Result<ProtocolVersion> {
        match request.protocol_version {
            Some(selector) => ProtocolVersion::try_from(selector),
            None => Ok(self.config.protocol),
        }
    }

    /// Search for the artifact without downloading it
    pub async fn resolve(&self, request: &ArtifactRequest) -> Result<Resolved> {
        let protocol = self.protocol_for(request)?;
        protocol.resolve(self, request).await
    }

    /// Resolve the artifact and download it into the request's target folder
    ///
    /// Returns the path of the completed file. Errors are returned as-is; nothing
    /// is retried.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use artifact_dl::{ArtifactDownloader, ArtifactRequest, Config};
    ///
    /// # async fn example() -> artifact_dl::Result<()> {
    /// let downloader = ArtifactDownloader::new(Config::new("http://nexus.example.com:8081"))?;
    /// let request = ArtifactRequest::new("com.example", "app-server")
    ///     .with_packaging("war")
    ///     .with_target_folder("/srv/apps");
    /// let path = downloader.download(&request).await?;
    /// println!("saved to {}", path.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(&self, request: &ArtifactRequest) -> Result<PathBuf> {
        let protocol = self.protocol_for(request)?;
        protocol.download(self, request).await
    }

    /// Stream a single target to disk, printing progress if configured
    pub async fn fetch(&self, target: &DownloadTarget) -> Result<PathBuf> {
        let outcome = if self.config.show_progress {
            let mut progress = ProgressLine::new(std::io::stdout());
            fetch::fetch(self, target, &mut progress).await?
        } else {
            let mut progress = ProgressLine::new(std::io::sink());
            fetch::fetch(self, target, &mut progress).await?
        };
        Ok(outcome.path)
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }

    pub(crate) fn emit_searching(&self, url: &Url, protocol: ProtocolVersion) {
        self.emit_event(Event::Searching {
            url: url.to_string(),
            protocol,
        });
    }

    pub(crate) fn emit_resolved(&self, url: &Url) {
        self.emit_event(Event::Resolved {
            download_url: url.to_string(),
        });
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quiet_config(uri: String) -> Config {
        Config {
            show_progress: false,
            ..Config::new(uri)
        }
    }

    #[test]
    fn test_protocol_for_prefers_request_selector() {
        let downloader = ArtifactDownloader::new(Config::new("http://nexus")).unwrap();
        let request = ArtifactRequest::new("g", "a");

        assert_eq!(downloader.protocol_for(&request).unwrap(), ProtocolVersion::V2);
        assert_eq!(
            downloader
                .protocol_for(&request.clone().with_protocol_version(3))
                .unwrap(),
            ProtocolVersion::V3
        );
    }

    #[tokio::test]
    async fn test_unsupported_version_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let downloader = ArtifactDownloader::new(quiet_config(server.uri())).unwrap();
        let request = ArtifactRequest::new("com.group.id", "app-server").with_protocol_version(4);

        let err = downloader.download(&request).await.unwrap_err();
        match err {
            Error::UnsupportedVersion {
                requested,
                supported,
            } => {
                assert_eq!(requested, 4);
                assert_eq!(supported, "2, 3");
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_dispatches_by_protocol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nexus/service/local/lucene/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"totalCount":1,"data":[{"latestRelease":"1.0.0"}],"repoDetails":[{"repositoryId":"releases"}]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/search/assets"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"items":[{"downloadUrl":"success"}]}"#),
            )
            .mount(&server)
            .await;
        let downloader = ArtifactDownloader::new(quiet_config(server.uri())).unwrap();
        let request = ArtifactRequest::new("com.group.id", "app-server").with_packaging("rpm");

        assert_eq!(
            downloader.resolve(&request).await.unwrap(),
            Resolved::V2 {
                version: "1.0.0".into(),
                repository_id: "releases".into()
            }
        );
        assert_eq!(
            downloader
                .resolve(&request.with_protocol_version(3))
                .await
                .unwrap(),
            Resolved::V3 {
                download_url: "success".into()
            }
        );
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/search/assets"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"items":[{{"downloadUrl":"{}/repo/app-1.0.jar"}}]}}"#,
                server.uri()
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repo/app-1.0.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-bytes".to_vec()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let downloader = ArtifactDownloader::new(Config {
            protocol: ProtocolVersion::V3,
            ..quiet_config(server.uri())
        })
        .unwrap();
        let mut events = downloader.subscribe();
        let request = ArtifactRequest::new("g", "app")
            .with_packaging("jar")
            .with_target_folder(temp_dir.path());

        let path = downloader.download(&request).await.unwrap();
        assert_eq!(path, temp_dir.path().join("app-1.0.jar"));

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(matches!(seen.first(), Some(Event::Searching { protocol: ProtocolVersion::V3, .. })));
        assert!(seen.iter().any(|e| matches!(e, Event::Resolved { .. })));
        assert!(seen.iter().any(|e| matches!(e, Event::DownloadStarted { .. })));
        assert!(matches!(seen.last(), Some(Event::Complete { bytes: 9, .. })));
    }
}
