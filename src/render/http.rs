// src/render/http.rs
// =============================================================================
// The default page renderer: a plain HTTP GET.
//
// How it works:
// 1. GET the URL through the retrying fetch client (HTTP redirects are
//    followed automatically by reqwest)
// 2. Record the URL of the final response
// 3. Read the body as text
// 4. Look for a <meta http-equiv="refresh"> that sends the browser somewhere
//    else. That is how many shops bounce a dead product page to the home
//    page while still answering 200, so we report it as a redirect.
//
// Non-2xx statuses, timeouts and network errors become a PageLoadError.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::{FetchedPage, PageRenderer};
use crate::checker::is_same_page;
use crate::error::PageLoadError;
use crate::fetch::{FetchClient, RequestSpec};

#[derive(Debug, Clone)]
pub struct HttpRenderer {
    fetcher: FetchClient,
}

impl HttpRenderer {
    pub fn new(fetcher: FetchClient) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str, delay: Duration) -> Result<FetchedPage, PageLoadError> {
        let response = self
            .fetcher
            .fetch_with_retry(&RequestSpec::get(url), delay)
            .await?;

        let final_url = response.url().to_string();

        let html = response
            .text()
            .await
            .map_err(|e| PageLoadError::new(format!("failed to read body: {}", e)))?;

        let redirected = match meta_refresh_target(&html, &final_url) {
            Some(target) => !is_same_page(&final_url, &target),
            None => false,
        };

        Ok(FetchedPage {
            html,
            final_url,
            redirected,
        })
    }
}

// Finds where a meta refresh tag points, resolved against the page URL.
//
// Examples of content values:
//   "0; url=/home"          -> Some("https://shop.example/home")
//   "5;URL='https://x.io/'" -> Some("https://x.io/")
//   "30"                    -> None (reloads the same page)
pub fn meta_refresh_target(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("meta[http-equiv]").ok()?;

    let content = document
        .select(&selector)
        .find(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"))
        })?
        .value()
        .attr("content")?;

    // Everything after the first ';' (or ',') is the target part.
    let (_, target) = content.split_once([';', ','])?;
    let target = target.trim();

    let target = match target.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("url=") => &target[4..],
        _ => target,
    };
    let target = target.trim().trim_matches(|c| c == '\'' || c == '"').trim();

    if target.is_empty() {
        return None;
    }

    let base = Url::parse(page_url).ok()?;
    base.join(target).ok().map(|u| u.to_string())
}
