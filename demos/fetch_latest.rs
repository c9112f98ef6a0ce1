//! Fetch the latest build of an artifact
//!
//! This example demonstrates the core functionality of artifact-dl:
//! - Building a configuration and request
//! - Validating mandatory inputs before touching the network
//! - Subscribing to events
//! - Resolving and downloading the artifact
//!
//! Inputs come from environment variables:
//!
//! ```bash
//! NEXUS_URL=http://nexus:8081 GROUP_ID=com.example ARTIFACT_ID=app-server \
//!     PACKAGING=war PROTOCOL=3 RUST_LOG=artifact_dl=debug \
//!     cargo run --example fetch_latest
//! ```

use artifact_dl::{ArtifactDownloader, ArtifactRequest, Config, Event};
use tracing_subscriber::EnvFilter;

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::new(env("NEXUS_URL").unwrap_or_default());
    config.validate()?;

    let mut request = ArtifactRequest::new(
        env("GROUP_ID").unwrap_or_default(),
        env("ARTIFACT_ID").unwrap_or_default(),
    )
    .verbose(env("VERBOSE").is_some());
    if let Some(version) = env("VERSION") {
        request = request.with_version(version);
    }
    if let Some(packaging) = env("PACKAGING") {
        request = request.with_packaging(packaging);
    }
    if let Some(classifier) = env("CLASSIFIER") {
        request = request.with_classifier(classifier);
    }
    if let Some(name) = env("APP_NAME") {
        request = request.with_application_name(name);
    }
    if let Some(target) = env("TARGET") {
        request = request.with_target_folder(target);
    }
    if let Some(protocol) = env("PROTOCOL") {
        request = request.with_protocol_version(protocol.parse()?);
    }
    request.validate()?;

    let downloader = ArtifactDownloader::new(config)?;

    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Searching { url, protocol } => {
                    tracing::info!(%url, %protocol, "searching");
                }
                Event::Resolved { download_url } => {
                    tracing::info!(%download_url, "resolved");
                }
                Event::Complete { path, bytes } => {
                    tracing::info!(path = %path.display(), bytes, "complete");
                }
                _ => {}
            }
        }
    });

    match downloader.download(&request).await {
        Ok(path) => {
            println!("saved {}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
