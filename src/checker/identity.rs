// src/checker/identity.rs
// =============================================================================
// Decides whether two URLs point at "the same page".
//
// Two URLs are the same page when:
// - their hostnames are equal, and
// - their normalised paths are equal
//
// Scheme, port, query string and fragment are NOT compared, so an
// http -> https upgrade or a tracking parameter does not count as a move.
//
// Path normalisation:
// - runs of slashes collapse to one      "/a//b"  -> "/a/b"
// - one trailing slash is removed        "/a/b/"  -> "/a/b"
// - the root path stays as it is         "/"      -> "/"
// - everything is lowercased             "/A/B"   -> "/a/b"
// =============================================================================

use url::Url;

/// Normalises a URL path for comparison. Idempotent.
pub fn normalize_path(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }

    if collapsed.len() > 1 && collapsed.ends_with('/') {
        collapsed.pop();
    }

    if collapsed.is_empty() {
        collapsed.push('/');
    }

    collapsed.to_lowercase()
}

/// True when both URLs parse and share hostname and normalised path.
pub fn is_same_page(requested: &str, landed: &str) -> bool {
    let (Ok(requested), Ok(landed)) = (Url::parse(requested), Url::parse(landed)) else {
        return false;
    };

    requested.host_str() == landed.host_str()
        && normalize_path(requested.path()) == normalize_path(landed.path())
}
