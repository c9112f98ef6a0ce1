//! Configuration types for artifact-dl

use crate::error::{Error, Result};
use crate::types::ProtocolVersion;
use crate::utils::is_blank;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for [`ArtifactDownloader`](crate::ArtifactDownloader)
///
/// Only `nexus_url` has no usable default; everything else works out of the box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the repository manager (e.g. "http://nexus.example.com:8081")
    #[serde(default)]
    pub nexus_url: String,

    /// Search protocol used when a request doesn't select one (default: 2)
    #[serde(default)]
    pub protocol: ProtocolVersion,

    /// Timeout for search requests (default: 5 seconds)
    #[serde(default = "default_search_timeout", with = "duration_serde")]
    pub search_timeout: Duration,

    /// Timeout for the artifact download (None = unbounded)
    ///
    /// Artifacts can be large, so no limit is applied unless one is configured.
    #[serde(default, with = "optional_duration_serde")]
    pub download_timeout: Option<Duration>,

    /// Print an in-place progress line to stdout while downloading (default: true)
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nexus_url: String::new(),
            protocol: ProtocolVersion::default(),
            search_timeout: default_search_timeout(),
            download_timeout: None,
            show_progress: true,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Create a configuration pointing at `nexus_url` with all other settings defaulted
    pub fn new(nexus_url: impl Into<String>) -> Self {
        Self {
            nexus_url: nexus_url.into(),
            ..Default::default()
        }
    }

    /// Check that the repository manager URL is present and absolute
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.nexus_url) {
            return Err(Error::Config {
                message: "nexus_url is mandatory".to_string(),
                key: Some("nexus_url".to_string()),
            });
        }
        url::Url::parse(self.nexus_url.trim()).map_err(|e| Error::Config {
            message: format!("nexus_url '{}' is not a valid URL: {}", self.nexus_url, e),
            key: Some("nexus_url".to_string()),
        })?;
        Ok(())
    }

    /// Repository manager base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.nexus_url.trim().trim_end_matches('/')
    }
}

fn default_search_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    concat!("artifact-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper (as whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
