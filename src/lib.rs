//! # artifact-dl
//!
//! Resolve the latest version of a Maven artifact through a Nexus repository
//! manager's search API and stream it into a local folder.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI flag parsing; callers build an [`ArtifactRequest`]
//! - **Two protocols** - Nexus 2 Lucene search and Nexus 3 REST v1 asset search
//! - **Never a partial file** - Bodies stream into `<name>.tmp` and are renamed on success
//! - **No hidden retries** - Every failure is returned to the caller as an [`Error`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use artifact_dl::{ArtifactDownloader, ArtifactRequest, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("http://nexus.example.com:8081");
//!     config.validate()?;
//!
//!     let request = ArtifactRequest::new("com.example", "app-server")
//!         .with_packaging("rpm")
//!         .with_target_folder("/tmp");
//!     request.validate()?;
//!
//!     let downloader = ArtifactDownloader::new(config)?;
//!     let path = downloader.download(&request).await?;
//!     println!("downloaded {}", path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Resolve-then-download orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Search protocol implementations
pub mod protocol;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use downloader::ArtifactDownloader;
pub use downloader::progress::ProgressLine;
pub use error::{Error, Result};
pub use types::{
    ArtifactRequest, DownloadTarget, Event, FilenameStrategy, ProtocolVersion, Resolved,
    SearchParams,
};
