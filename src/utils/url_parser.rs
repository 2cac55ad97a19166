//! Target URL validation.
//!
//! Targets must be absolute URLs. Bare hostnames are accepted by assuming
//! `http://`.

use crate::error::AppError;
use url::Url;

/// Validates a target and returns the parsed form.
///
/// When `raw` has no `http://` or `https://` prefix, `http://` is prepended
/// before parsing. The caller stores the original string; the parsed URL is
/// only proof of validity.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] when the input is empty, does not parse,
/// or has no host.
///
/// # Examples
///
/// ```
/// use link_shortener::utils::url_parser::parse_target;
///
/// assert_eq!(parse_target("example.com/a").unwrap().as_str(), "http://example.com/a");
/// assert!(parse_target("exa mple.com").is_err());
/// ```
pub fn parse_target(raw: &str) -> Result<Url, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_url(raw, "empty URL"));
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| AppError::invalid_url(raw, e))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(AppError::invalid_url(raw, "missing host")),
    }
}

fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
