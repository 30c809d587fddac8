use chrono::{DateTime, Utc};
use redeem_core::Classification;

/// Outcome of one redemption attempt. Immutable once produced;
/// appended to the run's result list in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    pub code: String,
    /// 1-based submission order. In pool mode this is the only record
    /// of submission order; completion order is unspecified.
    pub sequence: u32,
    /// `None` when the exchange never completed (timeout or transport
    /// failure).
    pub http_status: Option<u16>,
    pub body: Option<String>,
    pub classification: Classification,
    /// Remote error message, when the reply carried one.
    pub error_detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}
