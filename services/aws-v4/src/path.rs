use http::uri::{PathAndQuery, Uri};
use sigv4_core::Result;

/// Collapse every run of consecutive `/` in `path` into a single `/`.
///
/// Dot segments are left alone and a trailing slash is kept. An empty path
/// becomes `/`.
pub fn canonicalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len().max(1));
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Rewrite the path of `uri` into its canonical form, keeping the query.
///
/// Returns the uri untouched when it's already canonical.
pub(crate) fn canonicalize_uri(uri: &Uri) -> Result<Uri> {
    let path = uri.path();
    let canonical = canonicalize_path(path);
    if canonical == path {
        return Ok(uri.clone());
    }

    let path_and_query = match uri.query() {
        Some(query) => format!("{canonical}?{query}"),
        None => canonical,
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
