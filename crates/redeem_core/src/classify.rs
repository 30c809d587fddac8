use std::fmt;

use serde_json::Value;

/// Categorized outcome of one redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    AlreadyRedeemedOrExpired,
    NotFound,
    ApiError,
    Timeout,
    NetworkError,
    Unclassified,
}

impl Classification {
    pub fn is_success(self) -> bool {
        matches!(self, Classification::Success)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Success => write!(f, "success"),
            Classification::AlreadyRedeemedOrExpired => write!(f, "already used or expired"),
            Classification::NotFound => write!(f, "not found"),
            Classification::ApiError => write!(f, "api error"),
            Classification::Timeout => write!(f, "timeout"),
            Classification::NetworkError => write!(f, "network error"),
            Classification::Unclassified => write!(f, "unclassified response"),
        }
    }
}

/// Classification plus the remote error message, when the reply
/// carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResponse {
    pub classification: Classification,
    pub detail: Option<String>,
}

impl ClassifiedResponse {
    fn bare(classification: Classification) -> Self {
        Self {
            classification,
            detail: None,
        }
    }
}

/// Classify a completed HTTP exchange.
///
/// A structured reply always wins over the text heuristics, so echoed
/// error text like `{"ok": false, "error": "already redeemed"}` cannot
/// register as a success. Exchanges that never completed (timeouts,
/// transport failures) never reach this function; the attempt executor
/// maps those causes directly.
pub fn classify_response(status: u16, body: &str) -> ClassifiedResponse {
    let trimmed = body.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(ok) = value.get("ok").and_then(Value::as_bool) {
            if ok {
                return ClassifiedResponse::bare(Classification::Success);
            }
            let detail = value
                .get("error")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned);
            return ClassifiedResponse {
                classification: Classification::ApiError,
                detail,
            };
        }
        // JSON without a boolean `ok` gets the text treatment below.
    }

    let lowered = trimmed.to_lowercase();
    let classification = if lowered.contains("success") || lowered.contains("redeemed") {
        Classification::Success
    } else if lowered.contains("not found") {
        Classification::NotFound
    } else if lowered.contains("already used") || lowered.contains("expired") {
        Classification::AlreadyRedeemedOrExpired
    } else if !(200..300).contains(&status) {
        Classification::ApiError
    } else {
        Classification::Unclassified
    };
    ClassifiedResponse::bare(classification)
}
