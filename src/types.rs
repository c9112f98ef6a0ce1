//! Core types for artifact-dl

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Error, Result};
use crate::utils::is_blank;

/// Suffix appended to the final filename while the body is still streaming
pub const TMP_SUFFIX: &str = ".tmp";

/// Search protocol spoken by the repository manager
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolVersion {
    /// Nexus 2 Lucene search (`/nexus/service/local/lucene/search`)
    #[default]
    V2,
    /// Nexus 3 REST v1 asset search (`/service/rest/v1/search/assets`)
    V3,
}

impl ProtocolVersion {
    /// All supported protocol versions, sorted ascending
    pub const fn supported() -> [ProtocolVersion; 2] {
        [ProtocolVersion::V2, ProtocolVersion::V3]
    }

    /// Numeric selector for this version
    pub fn as_u8(self) -> u8 {
        match self {
            ProtocolVersion::V2 => 2,
            ProtocolVersion::V3 => 3,
        }
    }

    fn supported_list() -> String {
        Self::supported()
            .iter()
            .map(|v| v.as_u8().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            2 => Ok(ProtocolVersion::V2),
            3 => Ok(ProtocolVersion::V3),
            other => Err(Error::UnsupportedVersion {
                requested: other,
                supported: Self::supported_list(),
            }),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> Self {
        version.as_u8()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Everything needed to locate and download one Maven artifact
///
/// Built once per invocation by the caller. Required fields (`group_id`,
/// `artifact_id`) are checked by [`ArtifactRequest::validate`], which the
/// resolvers themselves never call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactRequest {
    /// Maven group id (e.g. "com.group.id")
    pub group_id: String,

    /// Maven artifact id (e.g. "app-server")
    pub artifact_id: String,

    /// Version to fetch (empty = latest)
    #[serde(default)]
    pub version: String,

    /// Packaging / file extension (e.g. "war", "jar", "rpm")
    #[serde(default = "default_packaging")]
    pub packaging: String,

    /// Optional classifier (e.g. "sources")
    #[serde(default)]
    pub classifier: Option<String>,

    /// Repository to search (None = infer from the search response)
    #[serde(default)]
    pub repository_id: Option<String>,

    /// Name to save the artifact under (None = infer it)
    #[serde(default)]
    pub application_name: Option<String>,

    /// Folder the artifact is written to
    #[serde(default = "std::env::temp_dir")]
    pub target_folder: PathBuf,

    /// Log search URLs and raw responses
    #[serde(default)]
    pub verbose: bool,

    /// Protocol selector (None = use the configured default)
    #[serde(default)]
    pub protocol_version: Option<u8>,
}

fn default_packaging() -> String {
    "war".to_string()
}

impl ArtifactRequest {
    /// Create a request for the latest version of `group_id:artifact_id`
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: String::new(),
            packaging: default_packaging(),
            classifier: None,
            repository_id: None,
            application_name: None,
            target_folder: std::env::temp_dir(),
            verbose: false,
            protocol_version: None,
        }
    }

    /// Pin a version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the packaging / extension
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    /// Set the classifier
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Search a specific repository instead of inferring it
    pub fn with_repository(mut self, repository_id: impl Into<String>) -> Self {
        self.repository_id = Some(repository_id.into());
        self
    }

    /// Save the artifact as `<name>.<packaging>`
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Write the artifact into `folder`
    pub fn with_target_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.target_folder = folder.into();
        self
    }

    /// Select the search protocol for this request
    pub fn with_protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = Some(version);
        self
    }

    /// Enable verbose tracing of search URLs and responses
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check that the mandatory coordinates are present
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("group_id", &self.group_id), ("artifact_id", &self.artifact_id)] {
            if is_blank(value) {
                return Err(Error::Config {
                    message: format!("{} is mandatory", key),
                    key: Some(key.to_string()),
                });
            }
        }
        Ok(())
    }

    /// True if the requested version names a snapshot build
    pub fn is_snapshot(&self) -> bool {
        self.version.contains("SNAPSHOT")
    }

    /// Explicit application name, if one was supplied and is not blank
    pub fn application_name(&self) -> Option<&str> {
        non_blank(self.application_name.as_deref())
    }

    /// Search parameters as sent to the repository manager
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            repository_id: non_blank(self.repository_id.as_deref())
                .unwrap_or_default()
                .to_string(),
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            packaging: self.packaging.clone(),
            version: self.version.clone(),
            classifier: non_blank(self.classifier.as_deref())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

/// The six query parameters both search protocols are templated with
///
/// Blank values are sent as empty query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Repository id ("" = any)
    pub repository_id: String,
    /// Maven group id
    pub group_id: String,
    /// Maven artifact id
    pub artifact_id: String,
    /// Packaging / extension
    pub packaging: String,
    /// Version ("" = latest)
    pub version: String,
    /// Classifier ("" = none)
    pub classifier: String,
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\trepositoryId: {}", self.repository_id)?;
        writeln!(f, "\tgroupId: {}", self.group_id)?;
        writeln!(f, "\tartifactId: {}", self.artifact_id)?;
        writeln!(f, "\tpackaging: {}", self.packaging)?;
        writeln!(f, "\tversion: {}", self.version)?;
        writeln!(f, "\tclassifier: {}", self.classifier)
    }
}

/// Protocol-specific outcome of a search
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    /// Nexus 2: a version plus the repository holding it
    V2 {
        /// Latest release, or latest snapshot when there is no release
        version: String,
        /// Supplied or inferred repository id
        repository_id: String,
    },
    /// Nexus 3: a direct asset URL
    V3 {
        /// Absolute download URL of the first matching asset
        download_url: String,
    },
}

/// How the downloader names the file it writes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilenameStrategy {
    /// Caller-supplied name, optionally suffixed with `.<extension>`
    Explicit {
        /// Base filename
        name: String,
        /// Extension appended after a dot, if any
        extension: Option<String>,
    },
    /// Last path segment of the download URL
    UrlPath,
    /// `filename` parameter of the response's `Content-Disposition` header
    ContentDisposition,
}

/// A single file transfer: where to fetch from and where to put it
#[derive(Clone, Debug)]
pub struct DownloadTarget {
    /// URL to GET
    pub url: Url,
    /// Destination folder
    pub folder: PathBuf,
    /// How the final filename is chosen
    pub filename: FilenameStrategy,
}

impl DownloadTarget {
    /// Final location of `filename` inside the target folder
    pub fn final_path_for(&self, filename: &str) -> PathBuf {
        self.folder.join(filename)
    }

    /// Temporary location used while the body is streaming
    pub fn tmp_path_for(&self, filename: &str) -> PathBuf {
        self.folder.join(format!("{}{}", filename, TMP_SUFFIX))
    }
}

/// Event emitted while resolving and downloading an artifact
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Search request is about to be sent
    Searching {
        /// Search URL
        url: String,
        /// Protocol in use
        protocol: ProtocolVersion,
    },

    /// Search succeeded and produced a download URL
    Resolved {
        /// URL the artifact will be fetched from
        download_url: String,
    },

    /// Response headers received, streaming into the temp file
    DownloadStarted {
        /// Temporary file being written
        path: PathBuf,
        /// Content-Length, if the server sent one
        #[serde(skip_serializing_if = "Option::is_none")]
        total_bytes: Option<u64>,
    },

    /// A chunk was written
    Downloading {
        /// Cumulative bytes written so far
        bytes: u64,
    },

    /// Temp file renamed to its final name
    Complete {
        /// Final file path
        path: PathBuf,
        /// Total bytes written
        bytes: u64,
    },
}

/// True if `path` is a temp file produced by an interrupted or in-flight download
pub fn is_tmp_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(TMP_SUFFIX))
}
