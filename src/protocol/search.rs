//! Shared plumbing for the search endpoints of both protocol versions

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Build `{base}{path}?k1=v1&k2=v2...`, keeping empty values as empty parameters
pub(crate) fn build_url(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base, path))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// GET a search URL and decode its JSON envelope
///
/// Sends `Accept: application/json` with the given timeout. Anything but `200 OK`
/// is an [`Error::Status`]. When `verbose` is set the URL and the raw body are
/// traced before the body is decoded, so malformed responses can be inspected.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &Url,
    timeout: Duration,
    verbose: bool,
) -> Result<T> {
    if verbose {
        tracing::info!(url = %url, "search url");
    } else {
        tracing::debug!(url = %url, "searching");
    }

    let response = client
        .get(url.clone())
        .header(ACCEPT, "application/json")
        .timeout(timeout)
        .send()
        .await?;

    if response.status() != StatusCode::OK {
        return Err(Error::Status {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await?;

    if verbose {
        tracing::info!(response = %String::from_utf8_lossy(&body), "search response");
    }

    serde_json::from_slice(&body).map_err(Error::invalid_json)
}

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as `T::default()`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
