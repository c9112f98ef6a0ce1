//! Error types for artifact-dl
//!
//! Every failure in the resolve-then-download pipeline is surfaced as an [`Error`]
//! and returned to the caller immediately. Nothing is retried and nothing is logged
//! on the failure path; reporting is left to whoever drives the library.

use crate::types::SearchParams;
use thiserror::Error;

/// Result type alias for artifact-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for artifact-dl
#[derive(Debug, Error)]
pub enum Error {
    /// The search endpoint answered with something other than `200 OK`
    #[error("invalid status code: {status}")]
    Status {
        /// HTTP status code returned by the server
        status: u16,
        /// URL that produced the status
        url: String,
    },

    /// Response could not be decoded (malformed JSON or Content-Disposition header)
    #[error("{0}")]
    Decode(String),

    /// No repository id was supplied and none could be inferred from the search response
    #[error("Could not get repository id: {details}")]
    MissingRepository {
        /// Debug rendering of the repository details returned by the server
        details: String,
    },

    /// Search returned no usable result for the given coordinates
    #[error("Could not find artifact\n{params}\tresponse: {response}\n")]
    ArtifactNotFound {
        /// Search parameters that were sent
        params: SearchParams,
        /// Raw decoded payload, kept for diagnosis
        response: String,
    },

    /// Protocol version selector has no registered resolver
    #[error("unsupported protocol version {requested}, valid values are: {supported}")]
    UnsupportedVersion {
        /// The selector that was requested
        requested: u8,
        /// Sorted, comma separated list of supported selectors
        supported: String,
    },

    /// No explicit filename, no usable URL segment and no Content-Disposition filename
    #[error("could not determine a filename for {url}")]
    MissingFilename {
        /// Download URL whose filename could not be determined
        url: String,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "nexus_url")
        key: Option<String>,
    },

    /// I/O error (temp file creation, write, rename)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error (connection failure, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Search or download URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Build a decode error for a JSON payload that failed to parse
    pub(crate) fn invalid_json(err: serde_json::Error) -> Self {
        Error::Decode(format!("Invalid JSON: {}", err))
    }

    /// Returns true if the repository manager simply doesn't know the artifact
    ///
    /// Lets callers tell "nothing to download" apart from transport or disk failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ArtifactNotFound { .. } | Error::MissingRepository { .. }
        )
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams {
            repository_id: "releases".into(),
            group_id: "com.group.id".into(),
            artifact_id: "app-server".into(),
            packaging: "rpm".into(),
            version: String::new(),
            classifier: "x86_64".into(),
        }
    }

    #[test]
    fn test_artifact_not_found_embeds_every_search_parameter() {
        let err = Error::ArtifactNotFound {
            params: params(),
            response: "[]".into(),
        };
        let msg = err.to_string();

        assert!(msg.starts_with("Could not find artifact\n"));
        assert!(msg.contains("\trepositoryId: releases\n"));
        assert!(msg.contains("\tgroupId: com.group.id\n"));
        assert!(msg.contains("\tartifactId: app-server\n"));
        assert!(msg.contains("\tpackaging: rpm\n"));
        assert!(msg.contains("\tversion: \n"));
        assert!(msg.contains("\tclassifier: x86_64\n"));
        assert!(msg.contains("\tresponse: []"));
    }

    #[test]
    fn test_status_message_names_code() {
        let err = Error::Status {
            status: 503,
            url: "http://nexus/search".into(),
        };
        assert_eq!(err.to_string(), "invalid status code: 503");
    }

    #[test]
    fn test_invalid_json_prefix() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::invalid_json(json_err);
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_is_not_found() {
        assert!(
            Error::ArtifactNotFound {
                params: params(),
                response: String::new(),
            }
            .is_not_found()
        );
        assert!(
            Error::MissingRepository {
                details: "[]".into()
            }
            .is_not_found()
        );
        assert!(
            !Error::Status {
                status: 404,
                url: String::new(),
            }
            .is_not_found()
        );
        assert!(!Error::Io(std::io::Error::other("disk full")).is_not_found());
    }
}
