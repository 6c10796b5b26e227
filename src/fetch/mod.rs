// src/fetch/mod.rs
// =============================================================================
// This module contains the backoff fetch client.
//
// Submodules:
// - backoff: Retry wait schedule (exponential with jitter, Retry-After aware)
// - client: The reqwest wrapper with delayed and retrying fetches
// =============================================================================

mod backoff;
mod client;

pub use backoff::{parse_retry_after, BackoffPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use client::{FetchClient, RequestSpec, USER_AGENT};
