// src/lib.rs
// =============================================================================
// sheet-guardian checks product pages for their two documentation PDFs:
// a safety data sheet and a technical data sheet.
//
// Modules, from the bottom up:
// - fetch: HTTP client with a politeness delay and retry/backoff
// - render: Turns a URL into HTML + final URL (lazily started backend)
// - checker: Extracts sheet links, verifies PDFs, decides OK/KO per URL
// - scheduler: Runs the checker over a batch with a bounded worker pool
// - config, error: Shared configuration and error types
// - input, report: Reading URL lists and writing results
// =============================================================================

pub mod checker;
pub mod config;
pub mod error;
pub mod fetch;
pub mod input;
pub mod render;
pub mod report;
pub mod scheduler;

pub use checker::{ValidationOutcome, Verdict};
pub use config::{DocumentationSignature, RunConfig};
pub use scheduler::validate_batch;
