//! Payload extraction from raw tool output.
//!
//! The tool interleaves human-readable status lines (connection banners,
//! progress notices) with exactly one trailing JSON payload. Everything before
//! the first `[` or `{` is discarded and the rest is decoded as one value.

use crate::error::{BirdwatcherError, BirdwatcherResult};
use serde_json::Value;

/// Byte offset of the first array- or object-opening character.
pub fn payload_start(output: &str) -> Option<usize> {
    output.find(|c: char| c == '[' || c == '{')
}

/// Decode the structured payload embedded in `output`.
///
/// Output without any opening token is an empty listing, not an error.
pub fn extract_payload(output: &str) -> BirdwatcherResult<Value> {
    let Some(start) = payload_start(output) else {
        tracing::trace!(bytes = output.len(), "No JSON payload in birdwatcher output");
        return Ok(Value::Array(Vec::new()));
    };
    tracing::trace!(offset = start, "Decoding birdwatcher payload");

    serde_json::from_str(&output[start..]).map_err(|source| BirdwatcherError::PayloadMalformed {
        source,
        output: output.to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
