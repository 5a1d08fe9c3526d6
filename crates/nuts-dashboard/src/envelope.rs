//! Signing-time extraction from compact JWS transaction envelopes.
//!
//! Only the protected header matters here: it is decoded and searched for the
//! `sigt` claim. Payload and signature segments are never inspected.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::constants::SIGNING_TIME_CLAIM;
use crate::error::EnvelopeError;

/// The part of a transaction the dashboard cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionRecord {
    pub signing_time: DateTime<Utc>,
}

/// Decode a compact envelope (`header.payload.signature`) into a [`TransactionRecord`].
pub fn decode(envelope: &str) -> Result<TransactionRecord, EnvelopeError> {
    let segments: Vec<&str> = envelope.split('.').collect();
    if segments.len() != 3 {
        return Err(EnvelopeError::StructuralInvalid(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let header = decode_header(segments[0])?;
    let seconds = header
        .get(SIGNING_TIME_CLAIM)
        .and_then(integral_seconds)
        .ok_or(EnvelopeError::MissingTimestamp)?;
    let signing_time =
        DateTime::from_timestamp(seconds, 0).ok_or(EnvelopeError::MissingTimestamp)?;

    Ok(TransactionRecord { signing_time })
}

fn decode_header(segment: &str) -> Result<Map<String, Value>, EnvelopeError> {
    let bytes = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(segment)
        .map_err(|e| EnvelopeError::StructuralInvalid(format!("header is not base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| EnvelopeError::StructuralInvalid(format!("header is not a JSON object: {e}")))
}

/// Accepts JSON integers, and floats only when they carry no fractional part.
fn integral_seconds(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
