//! Nexus search envelopes and stub server helpers

use artifact_dl::{ArtifactDownloader, Config, ProtocolVersion};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nexus 2 Lucene search path
pub const V2_SEARCH_PATH: &str = "/nexus/service/local/lucene/search";
/// Nexus 2 content path
pub const V2_CONTENT_PATH: &str = "/nexus/service/local/artifact/maven/content";
/// Nexus 3 asset search path
pub const V3_SEARCH_PATH: &str = "/service/rest/v1/search/assets";

/// Nexus 2 search envelope with one hit and one repository
pub fn v2_envelope(release: Option<&str>, snapshot: Option<&str>, repository: &str) -> String {
    let field = |v: Option<&str>| match v {
        Some(v) => format!("\"{}\"", v),
        None => "null".to_string(),
    };
    format!(
        r#"{{"totalCount":1,"data":[{{"groupId":"com.group.id","artifactId":"app-server","latestRelease":{},"latestSnapshot":{}}}],"repoDetails":[{{"repositoryId":"{}","repositoryKind":"hosted"}}]}}"#,
        field(release),
        field(snapshot),
        repository
    )
}

/// Nexus 3 search envelope with one asset
pub fn v3_envelope(download_url: &str) -> String {
    format!(
        r#"{{"items":[{{"downloadUrl":"{}","repository":"maven-releases","lastModified":"2024-05-01T10:00:00.000+00:00"}}],"continuationToken":null}}"#,
        download_url
    )
}

/// Mount a JSON search response on `search_path`
pub async fn mount_search(server: &MockServer, search_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(search_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Downloader pointed at `server` with progress output disabled
pub fn quiet_downloader(server: &MockServer, protocol: ProtocolVersion) -> ArtifactDownloader {
    let config = Config {
        protocol,
        show_progress: false,
        ..Config::new(server.uri())
    };
    ArtifactDownloader::new(config).expect("client builds")
}
