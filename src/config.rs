// src/config.rs
// =============================================================================
// Run configuration.
//
// RunConfig holds the three knobs that change how a batch behaves:
// - validate_pdf_links: probe each sheet link, or just require it to exist
// - delay_ms: politeness pause applied before every HTTP request
// - concurrency: how many URLs are checked at the same time
//
// DocumentationSignature holds the CSS class names the extractor looks for.
// Both are normally built from CLI flags in main.rs.
// =============================================================================

use std::time::Duration;

use crate::error::InitError;

/// Default pause before each request.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Default number of workers.
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub validate_pdf_links: bool,
    pub delay_ms: u64,
    pub concurrency: usize,
}

impl RunConfig {
    /// Builds a config, rejecting values the pipeline cannot work with.
    pub fn new(validate_pdf_links: bool, delay_ms: u64, concurrency: usize) -> Result<Self, InitError> {
        if delay_ms == 0 {
            return Err(InitError::InvalidConfig(
                "delay must be greater than 0 ms".to_string(),
            ));
        }
        if concurrency == 0 {
            return Err(InitError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            validate_pdf_links,
            delay_ms,
            concurrency,
        })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            validate_pdf_links: true,
            delay_ms: DEFAULT_DELAY_MS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

// The class names that identify the documentation block on a product page.
//
// A page looks roughly like this:
//
//   <div class="product-documents documents-list">
//     <a class="doc-link doc-link--safety" href="/files/sds.pdf">SDS</a>
//     <a class="doc-link doc-link--technical" href="/files/tds.pdf">TDS</a>
//   </div>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationSignature {
    /// Every one of these must be on the section element.
    pub section_classes: Vec<String>,
    /// Shared by both sheet links.
    pub link_class: String,
    pub safety_class: String,
    pub technical_class: String,
}

impl DocumentationSignature {
    /// Class set a safety sheet anchor must carry.
    pub fn safety_link_classes(&self) -> Vec<&str> {
        vec![self.link_class.as_str(), self.safety_class.as_str()]
    }

    /// Class set a technical sheet anchor must carry.
    pub fn technical_link_classes(&self) -> Vec<&str> {
        vec![self.link_class.as_str(), self.technical_class.as_str()]
    }

    /// Checks every class name is a single non-empty token.
    pub fn validate(&self) -> Result<(), InitError> {
        if self.section_classes.is_empty() {
            return Err(InitError::InvalidSignature(
                "at least one section class is required".to_string(),
            ));
        }

        let all = self
            .section_classes
            .iter()
            .chain([&self.link_class, &self.safety_class, &self.technical_class]);

        for class in all {
            if class.is_empty() || class.chars().any(char::is_whitespace) {
                return Err(InitError::InvalidSignature(format!(
                    "'{}' is not a single class name",
                    class
                )));
            }
        }

        Ok(())
    }
}

impl Default for DocumentationSignature {
    fn default() -> Self {
        Self {
            section_classes: vec!["product-documents".to_string(), "documents-list".to_string()],
            link_class: "doc-link".to_string(),
            safety_class: "doc-link--safety".to_string(),
            technical_class: "doc-link--technical".to_string(),
        }
    }
}
