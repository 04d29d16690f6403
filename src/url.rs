//! URL construction helpers
//!
//! Joining a base URL with a request path and merging query parameters,
//! used by both the limited and unlimited request paths.

use crate::error::Result;
use crate::types::QueryParams;
use url::Url;

/// Join a base URL and a path into a full URL.
///
/// Absolute `http(s)://` paths are used as-is. Slashes at the seam are
/// normalized so `"https://api.example.com/"` + `"/users"` yields
/// `https://api.example.com/users`.
pub fn combine_url(base: &str, path: &str) -> Result<Url> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }

    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Ok(Url::parse(base)?);
    }
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// Merge query parameters into a URL, keeping any already present.
pub fn apply_query(url: &mut Url, params: &QueryParams) {
    if params.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        pairs.append_pair(key, value);
    }
    drop(pairs);
}
