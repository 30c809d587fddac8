use chrono::Utc;

use redeem_core::{classify_response, Classification};

use crate::transport::{Transport, TransportError};
use crate::types::AttemptResult;

/// Perform one submission and classify the reply. Mutates no shared
/// state; the dispatcher applies all counter updates.
pub async fn run_attempt(transport: &dyn Transport, code: &str, sequence: u32) -> AttemptResult {
    let (http_status, body, classification, error_detail) = match transport.submit(code).await {
        Ok(reply) => {
            let classified = classify_response(reply.status, &reply.body);
            (
                Some(reply.status),
                Some(reply.body),
                classified.classification,
                classified.detail,
            )
        }
        Err(TransportError::Timeout) => (None, None, Classification::Timeout, None),
        Err(TransportError::Network(message)) => {
            (None, None, Classification::NetworkError, Some(message))
        }
    };

    AttemptResult {
        code: code.to_owned(),
        sequence,
        http_status,
        body,
        classification,
        error_detail,
        timestamp: Utc::now(),
    }
}
