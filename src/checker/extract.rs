// src/checker/extract.rs
// =============================================================================
// This module finds the two sheet links in a product page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// How it works:
// 1. Find the FIRST element carrying every documentation section class
// 2. Look only at that element's direct <a> children
// 3. Pick the first anchor whose classes include the wanted set
//    (e.g. "doc-link" + "doc-link--safety")
// 4. Trim the href; an empty href counts as no link
//
// Hrefs are returned as written. Making them absolute is the PDF
// verifier's job.
// =============================================================================

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::DocumentationSignature;
use crate::error::InitError;

/// The two hrefs found in a documentation section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationLinks {
    pub safety_href: Option<String>,
    pub technical_href: Option<String>,
}

// Compiled form of a DocumentationSignature.
//
// Building the section selector can fail (odd class names), so it is done
// once up front rather than per page.
#[derive(Debug, Clone)]
pub struct DocumentationExtractor {
    section_selector: Selector,
    signature: DocumentationSignature,
}

impl DocumentationExtractor {
    pub fn new(signature: DocumentationSignature) -> Result<Self, InitError> {
        signature.validate()?;

        // ["product-documents", "documents-list"] -> ".product-documents.documents-list"
        let css: String = signature
            .section_classes
            .iter()
            .map(|class| format!(".{}", class))
            .collect();

        let section_selector = Selector::parse(&css)
            .map_err(|e| InitError::InvalidSignature(format!("{}: {}", css, e)))?;

        Ok(Self {
            section_selector,
            signature,
        })
    }

    /// Returns None when the page has no documentation section at all.
    pub fn extract(&self, html: &str) -> Option<DocumentationLinks> {
        let document = Html::parse_document(html);
        let section = self.find_documentation_section(&document)?;

        let links = DocumentationLinks {
            safety_href: find_link(section, &self.signature.safety_link_classes()),
            technical_href: find_link(section, &self.signature.technical_link_classes()),
        };

        debug!(
            safety = links.safety_href.as_deref().unwrap_or("-"),
            technical = links.technical_href.as_deref().unwrap_or("-"),
            "documentation section found"
        );

        Some(links)
    }

    /// First element carrying all section classes.
    pub fn find_documentation_section<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.section_selector).next()
    }
}

/// First direct child <a> of `section` whose class list contains every
/// class in `required`, returning its trimmed, non-empty href.
pub fn find_link(section: ElementRef<'_>, required: &[&str]) -> Option<String> {
    let anchor = section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name().eq_ignore_ascii_case("a"))
        .find(|anchor| {
            let classes: HashSet<&str> = anchor
                .value()
                .attr("class")
                .unwrap_or("")
                .split_whitespace()
                .collect();
            required.iter().all(|class| classes.contains(class))
        })?;

    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        None
    } else {
        Some(href.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why ElementRef<'a>?
//    - An ElementRef points INTO the parsed document
//    - The 'a lifetime says "this reference can't outlive the document"
//    - The compiler stops us from using a section after the Html is dropped
//
// 2. What does ElementRef::wrap do?
//    - children() yields every node: text, comments and elements
//    - wrap() returns Some only for element nodes, so filter_map keeps elements
//
// 3. Why a HashSet for classes?
//    - "Superset" checks are just "does the set contain each required class"
//    - Extra classes on the anchor (e.g. "btn") don't matter
//
// 4. Why does extract() return owned Strings?
//    - Html from scraper is not Send, so it must not live across an .await
//    - Copying the two hrefs out lets us drop the document straight away
// -----------------------------------------------------------------------------
