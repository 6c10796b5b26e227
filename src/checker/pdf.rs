// src/checker/pdf.rs
// =============================================================================
// This module checks that a sheet link really serves a PDF.
//
// Key functionality:
// - Resolves the href against the page URL (relative links are common)
// - Makes an HTTP HEAD request (lightweight, no body download)
// - Falls back to GET when the server refuses HEAD (405 / 501)
// - Accepts the link if ANY of these say "PDF":
//     * Content-Type contains application/pdf
//     * Content-Disposition mentions application/pdf or a .pdf filename
//     * the final URL path (after redirects) ends in .pdf
//
// Servers disagree about which header they set, and some CDNs redirect to a
// differently named object, so one positive signal is enough.
//
// Nothing in here returns an error: every failure simply means "not a valid
// PDF link".
// =============================================================================

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::fetch::{FetchClient, RequestSpec};

const PDF_MIME: &str = "application/pdf";

// Resolves a possibly-relative href to an absolute URL.
//
// Examples:
//   base = "https://shop.example/products/a"
//   href = "/files/sds.pdf"            -> "https://shop.example/files/sds.pdf"
//   href = "sds.pdf"                   -> "https://shop.example/products/sds.pdf"
//   href = "https://cdn.example/x.pdf" -> "https://cdn.example/x.pdf"
//
// If the base itself is unusable, the href is taken as already absolute.
pub fn resolve_href(base_url: &str, href: &str) -> String {
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Probes `href` and reports whether it serves a PDF. Never fails.
pub async fn is_valid_pdf(fetcher: &FetchClient, base_url: &str, href: &str, delay: Duration) -> bool {
    let target = resolve_href(base_url, href);

    match probe(fetcher, &target, delay).await {
        Ok(valid) => valid,
        Err(error) => {
            debug!(url = %target, %error, "pdf probe failed");
            false
        }
    }
}

// HEAD first, GET if HEAD is not allowed. Only headers are inspected.
async fn probe(fetcher: &FetchClient, target: &str, delay: Duration) -> Result<bool, FetchError> {
    let head = fetcher.fetch_with_retry(&RequestSpec::head(target), delay).await;

    let response = match head {
        Err(FetchError::HttpStatus { status, .. })
            if status == StatusCode::METHOD_NOT_ALLOWED.as_u16()
                || status == StatusCode::NOT_IMPLEMENTED.as_u16() =>
        {
            debug!(url = %target, status, "HEAD refused, retrying with GET");
            fetcher.fetch_with_retry(&RequestSpec::get(target), delay).await?
        }
        other => other?,
    };

    let is_pdf = looks_like_pdf(response.headers(), response.url().as_str());
    debug!(url = %target, final_url = %response.url(), is_pdf, "pdf probe finished");
    Ok(is_pdf)
}

/// The tri-signal PDF test on a successful response.
pub fn looks_like_pdf(headers: &HeaderMap, final_url: &str) -> bool {
    let header_text = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
    };

    let by_type = header_text(CONTENT_TYPE).is_some_and(|v| v.contains(PDF_MIME));

    let by_disposition = header_text(CONTENT_DISPOSITION)
        .is_some_and(|v| v.contains(PDF_MIME) || v.contains(".pdf"));

    let by_path = Url::parse(final_url)
        .map(|url| url.path().to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);

    by_type || by_disposition || by_path
}
