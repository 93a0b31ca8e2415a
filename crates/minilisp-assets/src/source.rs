//! Source URL resolution.
//!
//! The release archive is fetched either directly or through a relay
//! proxy that takes the real URL as its `target` query parameter:
//!
//! ```text
//! https://v4.vscch.tk/proxy?target=https%3A%2F%2Fgithub.com%2F...
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::error::{FetchError, FetchResult};

/// Characters left as-is when encoding the proxy target. Matches the
/// unreserved set of JavaScript's `encodeURIComponent`, which is what the
/// proxy expects.
const TARGET_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query parameter carrying the real URL.
pub const PROXY_TARGET_PARAM: &str = "target";

/// Parse `raw` as an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `raw` does not parse or uses
/// another scheme.
pub fn parse_http_url(raw: &str) -> FetchResult<Url> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_owned(),
        message: e.to_string(),
    })?;
    ensure_http(&url)?;
    Ok(url)
}

fn ensure_http(url: &Url) -> FetchResult<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            message: "missing host".to_owned(),
        });
    }
    Ok(())
}

/// Compute the URL actually requested.
///
/// With `use_proxy` off this is `base` unchanged. With it on, `base` is
/// percent-encoded into the `target` parameter of `proxy_endpoint`; any
/// query already on the endpoint is kept.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base` (or, when used, the proxy
/// endpoint) is not an http(s) URL.
pub fn resolve_source_url(base: &Url, use_proxy: bool, proxy_endpoint: &Url) -> FetchResult<Url> {
    ensure_http(base)?;
    if !use_proxy {
        return Ok(base.clone());
    }
    ensure_http(proxy_endpoint)?;

    let encoded = utf8_percent_encode(base.as_str(), TARGET_ENCODE_SET);
    let query = match proxy_endpoint.query() {
        Some(existing) if !existing.is_empty() => {
            format!("{existing}&{PROXY_TARGET_PARAM}={encoded}")
        },
        _ => format!("{PROXY_TARGET_PARAM}={encoded}"),
    };

    let mut proxied = proxy_endpoint.clone();
    proxied.set_query(Some(&query));
    Ok(proxied)
}
