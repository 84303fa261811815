// src/repositories/decode.rs
//
// Shared decoding helpers for raw store documents.
//
// A document that fails to decode is dropped from its page, never fatal.
// Every drop is reported to a DecodeObserver.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::store::RawDocument;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("document '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("document '{id}' has invalid field '{field}': {reason}")]
    InvalidField {
        id: String,
        field: &'static str,
        reason: String,
    },
}

impl DecodeError {
    pub fn field(&self) -> &'static str {
        match self {
            DecodeError::MissingField { field, .. } | DecodeError::InvalidField { field, .. } => {
                *field
            }
        }
    }
}

/// Hook for records dropped during decoding
pub trait DecodeObserver: Send + Sync {
    fn record_dropped(&self, collection: &str, error: &DecodeError);

    /// Drops seen so far (0 for observers that do not count)
    fn dropped_count(&self) -> u64 {
        0
    }
}

/// Default observer: warn log plus a counter
#[derive(Debug, Default)]
pub struct LoggingDecodeObserver {
    dropped: AtomicU64,
}

impl LoggingDecodeObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecodeObserver for LoggingDecodeObserver {
    fn record_dropped(&self, collection: &str, error: &DecodeError) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        log::warn!("Dropping {} record: {}", collection, error);
    }

    fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// ============================================================================
// FIELD ACCESS
// ============================================================================

pub(crate) fn missing(doc: &RawDocument, field: &'static str) -> DecodeError {
    DecodeError::MissingField {
        id: doc.id.clone(),
        field,
    }
}

pub(crate) fn invalid(doc: &RawDocument, field: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        id: doc.id.clone(),
        field,
        reason: reason.into(),
    }
}

/// Present and non-null
pub(crate) fn required<'a>(doc: &'a RawDocument, field: &'static str) -> Result<&'a Value, DecodeError> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(missing(doc, field)),
        Some(value) => Ok(value),
    }
}

pub(crate) fn required_str<'a>(doc: &'a RawDocument, field: &'static str) -> Result<&'a str, DecodeError> {
    required(doc, field)?
        .as_str()
        .ok_or_else(|| invalid(doc, field, "expected a string"))
}

pub(crate) fn optional_str<'a>(doc: &'a RawDocument, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

/// Whole numbers only; `2016.0` is accepted, `2016.5` is not
pub(crate) fn as_whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Identifiers are strings; integer identifiers are rendered in decimal
pub(crate) fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// RFC3339 timestamp; anything else reads as absent
pub(crate) fn optional_timestamp(doc: &RawDocument, field: &str) -> Option<DateTime<Utc>> {
    let raw = optional_str(doc, field)?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            log::debug!("Ignoring unparsable {} on '{}': {}", field, doc.id, e);
            None
        }
    }
}
