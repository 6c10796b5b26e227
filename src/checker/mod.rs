// src/checker/mod.rs
// =============================================================================
// This module contains all per-URL checking logic.
//
// Submodules:
// - extract: Finds the documentation section and its two sheet links
// - identity: Path normalisation and "same page" comparison
// - pdf: Verifies a sheet link really serves a PDF
// - outcome: The OK/KO verdict type
// - validate: Runs all of the above for one URL
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers can write `checker::UrlValidator` instead of the full path.
// =============================================================================

mod extract;
mod identity;
mod outcome;
mod pdf;
mod validate;

pub use extract::{find_link, DocumentationExtractor, DocumentationLinks};
pub use identity::{is_same_page, normalize_path};
pub use outcome::{ValidationOutcome, Verdict, COMMENT_SEPARATOR};
pub use pdf::{is_valid_pdf, looks_like_pdf, resolve_href};
pub use validate::{has_web_protocol, UrlValidator, INVALID_URL, SECTION_MISSING};
