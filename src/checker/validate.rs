// src/checker/validate.rs
// =============================================================================
// This module turns one URL into one OK/KO verdict.
//
// Steps (stop at the first fatal one):
// 1. The URL must parse and be http or https      -> "invalid URL/protocol"
// 2. Render the page                               -> "page load failed (...)"
// 3. We must still be on the same page            -> "redirected to <url>"
// 4. The documentation section must exist         -> "documentation section missing ..."
// 5. Safety sheet link: present, and a PDF if we are verifying
// 6. Technical sheet link: same checks
// 7. OK if steps 5-6 found nothing, otherwise KO with every reason
//
// Steps 5 and 6 always both run, so one pass reports every problem with the
// page instead of just the first.
//
// No error ever leaves validate(): every failure ends up in the outcome.
// =============================================================================

use tracing::{debug, warn};
use url::Url;

use super::extract::DocumentationExtractor;
use super::identity::is_same_page;
use super::outcome::ValidationOutcome;
use super::pdf::is_valid_pdf;
use crate::config::RunConfig;
use crate::fetch::FetchClient;
use crate::render::PageRenderer;

pub const INVALID_URL: &str = "invalid URL/protocol";
pub const SECTION_MISSING: &str = "documentation section missing (both sheets missing)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sheet {
    Safety,
    Technical,
}

impl Sheet {
    fn label(self) -> &'static str {
        match self {
            Sheet::Safety => "safety sheet",
            Sheet::Technical => "technical sheet",
        }
    }
}

// Everything a worker needs to check a URL. All borrowed: the batch owns
// the renderer, client and extractor, and they outlive every validation.
pub struct UrlValidator<'a> {
    renderer: &'a dyn PageRenderer,
    fetcher: &'a FetchClient,
    extractor: &'a DocumentationExtractor,
    config: &'a RunConfig,
}

impl<'a> UrlValidator<'a> {
    pub fn new(
        renderer: &'a dyn PageRenderer,
        fetcher: &'a FetchClient,
        extractor: &'a DocumentationExtractor,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            extractor,
            config,
        }
    }

    pub async fn validate(&self, url: &str) -> ValidationOutcome {
        if !has_web_protocol(url) {
            return ValidationOutcome::ko(url, INVALID_URL);
        }

        let page = match self.renderer.render(url, self.config.delay()).await {
            Ok(page) => page,
            Err(error) => {
                warn!(url = %url, %error, "page load failed");
                return ValidationOutcome::ko(url, format!("page load failed ({})", error));
            }
        };

        if page.redirected || !is_same_page(url, &page.final_url) {
            debug!(url = %url, final_url = %page.final_url, "page moved");
            return ValidationOutcome::ko(url, format!("redirected to {}", page.final_url));
        }

        // Html is dropped inside extract(), before the next await.
        let Some(links) = self.extractor.extract(&page.html) else {
            return ValidationOutcome::ko(url, SECTION_MISSING);
        };

        let mut reasons = Vec::new();
        let base = page.final_url.as_str();

        if let Some(reason) = self.check_sheet(Sheet::Safety, links.safety_href.as_deref(), base).await {
            reasons.push(reason);
        }
        if let Some(reason) = self.check_sheet(Sheet::Technical, links.technical_href.as_deref(), base).await {
            reasons.push(reason);
        }

        ValidationOutcome::from_reasons(url, &reasons)
    }

    // Returns the reason this sheet fails, or None if it is fine.
    async fn check_sheet(&self, sheet: Sheet, href: Option<&str>, base: &str) -> Option<String> {
        let Some(href) = href else {
            return Some(format!("{} missing", sheet.label()));
        };

        if !self.config.validate_pdf_links {
            return None;
        }

        if is_valid_pdf(self.fetcher, base, href, self.config.delay()).await {
            None
        } else {
            Some(format!("{} link invalid", sheet.label()))
        }
    }
}

/// The URL parses and uses http or https.
pub fn has_web_protocol(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}
