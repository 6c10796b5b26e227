// src/checker/outcome.rs
// =============================================================================
// The verdict for one URL.
//
// Serialized as JSON it looks like:
//   {"url": "https://shop.example/p/1", "result": "KO", "comments": "safety sheet missing"}
// =============================================================================

use serde::{Deserialize, Serialize};

/// Separator between reasons in `comments`.
pub const COMMENT_SEPARATOR: &str = " ; ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "KO")]
    Ko,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::Ko => "KO",
        }
    }
}

// `comments` is empty exactly when `result` is OK. The constructors are the
// only way the validator builds outcomes, which keeps that true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub url: String,
    pub result: Verdict,
    pub comments: String,
}

impl ValidationOutcome {
    pub fn ok(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Verdict::Ok,
            comments: String::new(),
        }
    }

    pub fn ko(url: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Verdict::Ko,
            comments: comment.into(),
        }
    }

    /// OK if there are no reasons, otherwise KO with the reasons joined.
    pub fn from_reasons(url: impl Into<String>, reasons: &[String]) -> Self {
        if reasons.is_empty() {
            Self::ok(url)
        } else {
            Self::ko(url, reasons.join(COMMENT_SEPARATOR))
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == Verdict::Ok
    }
}
