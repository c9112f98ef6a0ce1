//! Utility functions for blank checks and filename inference

use crate::error::{Error, Result};
use std::path::Path;

/// Returns true if `value` is empty or only whitespace
///
/// Optional string fields coming from callers and from the repository manager's JSON
/// are treated as absent when blank.
///
/// # Examples
///
/// ```
/// use artifact_dl::utils::is_blank;
///
/// assert!(is_blank(""));
/// assert!(is_blank("  \t"));
/// assert!(!is_blank("1.0.0"));
/// ```
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Extract the filename from a `Content-Disposition` header value
///
/// Accepts `attachment; filename="app.war"`, unquoted tokens, and the RFC 5987
/// `filename*=UTF-8''app%20server.war` form (which wins when both are present).
///
/// # Returns
///
/// * `Ok(None)` when the header is absent or carries no `filename` parameter
/// * `Err(Error::Decode)` when the header is present but malformed
///
/// # Examples
///
/// ```
/// use artifact_dl::utils::filename_from_content_disposition;
///
/// let name = filename_from_content_disposition(Some("attachment; filename=\"app.war\"")).unwrap();
/// assert_eq!(name.as_deref(), Some("app.war"));
/// ```
pub fn filename_from_content_disposition(header: Option<&str>) -> Result<Option<String>> {
    let Some(header) = header else {
        return Ok(None);
    };

    let invalid = |reason: &str| {
        Error::Decode(format!(
            "invalid Content-Disposition header '{}': {}",
            header, reason
        ))
    };

    let (disposition, mut rest) = match header.find(';') {
        Some(idx) => (&header[..idx], &header[idx + 1..]),
        None => (header, ""),
    };
    let disposition = disposition.trim();
    if disposition.is_empty() || !disposition.chars().all(is_token_char) {
        return Err(invalid("missing disposition type"));
    }

    let mut plain = None;
    let mut extended = None;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let eq = rest.find('=').ok_or_else(|| invalid("parameter without value"))?;
        let key = rest[..eq].trim().to_ascii_lowercase();
        if key.is_empty() || !key.chars().all(is_token_char) {
            return Err(invalid("malformed parameter name"));
        }
        rest = rest[eq + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let (value, consumed) =
                parse_quoted(quoted).ok_or_else(|| invalid("unterminated quoted string"))?;
            rest = &quoted[consumed..];
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let token = rest[..end].trim();
            if token.is_empty() {
                return Err(invalid("empty parameter value"));
            }
            rest = &rest[end..];
            token.to_string()
        };

        match key.as_str() {
            "filename" => plain = Some(value),
            "filename*" => {
                let decoded =
                    decode_ext_value(&value).ok_or_else(|| invalid("bad filename* encoding"))?;
                extended = Some(decoded);
            }
            _ => {}
        }
    }

    Ok(extended.or(plain).and_then(|name| sanitize_filename(&name)))
}

/// Last path segment of a URL, if it has a non-empty one
///
/// # Examples
///
/// ```
/// use artifact_dl::utils::filename_from_url;
///
/// assert_eq!(
///     filename_from_url("http://nexus/repository/releases/app-1.0.0.jar").as_deref(),
///     Some("app-1.0.0.jar")
/// );
/// assert_eq!(filename_from_url("http://nexus/"), None);
/// ```
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).ok()?;
    sanitize_filename(&decoded)
}

/// Reduce a server-supplied name to a plain file name
///
/// Directory components are stripped so a header like `filename="../../etc/passwd"`
/// can only ever land inside the target folder.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let name = name.trim().replace('\\', "/");
    let file_name = Path::new(&name).file_name()?.to_str()?;
    if is_blank(file_name) {
        return None;
    }
    Some(file_name.to_string())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"[]?={}".contains(c)
}

/// Parse a quoted-string body (opening quote already consumed)
///
/// Returns the unescaped value and the number of bytes consumed, including the
/// closing quote.
fn parse_quoted(input: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((value, idx + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(escaped);
            }
            _ => value.push(c),
        }
    }
    None
}

/// Decode an RFC 5987 `charset'language'pct-encoded` value
fn decode_ext_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}
