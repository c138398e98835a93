//! Recursive, shape-preserving masking of sensitive result data.
//!
//! The masker walks a `serde_json::Value` and replaces values at sensitive
//! keys with a fixed marker, preserving structural congruence: same container
//! kinds, key sets and sequence lengths at every level. It never mutates its
//! input. Masking is idempotent — the marker and the partially-preserved card
//! suffix are not re-matched as sensitive.
//!
//! String scalars are additionally canonicalized: card-like digit runs are
//! masked down to a four-digit suffix, and timestamp-shaped strings are
//! rewritten to RFC 3339 so every timestamp leaves the gateway in one format.

use crate::security::PatternLibrary;
use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Fixed redaction marker for values at sensitive keys.
pub const MASK_MARKER: &str = "***MASKED***";

/// Recognized top-level result shapes.
///
/// Masking dispatches structurally: the `{"data": rows}` envelope gets its
/// `data` field masked, bare rows and row-sets are masked whole, and any
/// other shape passes through unchanged (fail-open only for shapes the
/// masker does not recognize as row data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// `{"data": <rows>, ...metadata}`
    DataEnvelope,
    /// A sequence of row mappings.
    Rows,
    /// A single row mapping.
    Row,
    /// Anything else: scalar, free text, mixed sequence.
    Opaque,
}

impl ResultShape {
    /// Classify a result value.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("data") => Self::DataEnvelope,
            Value::Object(_) => Self::Row,
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                Self::Rows
            }
            _ => Self::Opaque,
        }
    }
}

/// Recursive data masker.
#[derive(Debug, Clone)]
pub struct DataMasker {
    patterns: Arc<PatternLibrary>,
}

impl DataMasker {
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    /// Mask an execution result, dispatching on its recognized shape.
    pub fn mask_result(&self, result: &Value) -> Value {
        match (ResultShape::classify(result), result) {
            (ResultShape::DataEnvelope, Value::Object(map)) => {
                let mut masked = Map::with_capacity(map.len());
                for (key, value) in map {
                    if key == "data" {
                        masked.insert(key.clone(), self.mask(value));
                    } else {
                        masked.insert(key.clone(), value.clone());
                    }
                }
                Value::Object(masked)
            }
            (ResultShape::Rows | ResultShape::Row, _) => self.mask(result),
            _ => result.clone(),
        }
    }

    /// Recursively mask a value. Sensitive key names win over recursion:
    /// the whole subtree under a matching key collapses to the marker.
    pub fn mask(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut masked = Map::with_capacity(map.len());
                for (key, value) in map {
                    if self.patterns.sensitive_key.is_match(key) {
                        masked.insert(key.clone(), Value::String(MASK_MARKER.into()));
                    } else {
                        masked.insert(key.clone(), self.mask(value));
                    }
                }
                Value::Object(masked)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.mask(v)).collect()),
            Value::String(s) => Value::String(self.mask_string(s)),
            other => other.clone(),
        }
    }

    /// Scalar heuristics: timestamp canonicalization, then card-run masking.
    fn mask_string(&self, s: &str) -> String {
        if let Some(canonical) = canonicalize_timestamp(s) {
            return canonical;
        }

        self.patterns
            .card_number
            .replace_all(s, |caps: &regex::Captures<'_>| {
                let digits = &caps[0];
                format!("****{}", &digits[digits.len() - 4..])
            })
            .into_owned()
    }
}

/// Rewrite a timestamp-shaped string to RFC 3339. Returns `None` for
/// anything that does not parse as a full date-time.
fn canonicalize_timestamp(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_rfc3339());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().to_rfc3339());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn masker() -> DataMasker {
        DataMasker::new(Arc::new(PatternLibrary::new()))
    }

    #[test]
    fn test_data_envelope_rows_masked() {
        let masker = masker();
        let result = json!({
            "data": [{"password": "x"}, {"password": "y"}],
            "row_count": 2
        });

        let masked = masker.mask_result(&result);
        let rows = masked["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["password"], MASK_MARKER);
        assert_eq!(rows[1]["password"], MASK_MARKER);
        assert_eq!(masked["row_count"], 2);
    }

    #[test]
    fn test_sensitive_key_wins_over_recursion() {
        let masker = masker();
        let value = json!({"secret": {"inner": "visible?"}, "name": "ok"});
        let masked = masker.mask(&value);
        assert_eq!(masked["secret"], MASK_MARKER);
        assert_eq!(masked["name"], "ok");
    }

    #[test]
    fn test_shape_preserved() {
        let masker = masker();
        let value = json!([{"email": "a@b.com", "id": 1}, {"email": "c@d.com", "id": 2}]);
        let masked = masker.mask_result(&value);
        let rows = masked.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[0]["email"], MASK_MARKER);
        assert_eq!(
            rows[0].as_object().unwrap().len(),
            2,
            "key set must be preserved"
        );
    }

    #[test]
    fn test_card_run_masked_with_suffix() {
        let masker = masker();
        let value = json!({"note": "paid with 4111111111111111 yesterday"});
        let masked = masker.mask(&value);
        assert_eq!(masked["note"], "paid with ****1111 yesterday");
    }

    #[test]
    fn test_short_digit_runs_untouched() {
        let masker = masker();
        let value = json!({"zip": "90210", "order": "123456789012"});
        let masked = masker.mask(&value);
        assert_eq!(masked["zip"], "90210");
        assert_eq!(masked["order"], "123456789012");
    }

    #[test]
    fn test_opaque_passthrough() {
        let masker = masker();
        for value in [json!("plain text"), json!(42), json!(null), json!([1, 2, 3])] {
            assert_eq!(masker.mask_result(&value), value);
        }
    }

    #[test]
    fn test_timestamp_canonicalized() {
        let masker = masker();
        let value = json!({"created_at": "2024-03-01 12:30:00"});
        let masked = masker.mask(&value);
        assert_eq!(masked["created_at"], "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_input_not_mutated() {
        let masker = masker();
        let value = json!({"password": "x"});
        let _ = masker.mask(&value);
        assert_eq!(value["password"], "x");
    }

    #[test]
    fn test_idempotent() {
        let masker = masker();
        for value in [
            json!({"data": [{"password": "x", "card": "4111111111111111"}]}),
            json!({"token": {"deep": [1, 2]}}),
            json!([{"email": "a@b.com"}]),
            json!({"created_at": "2024-03-01T12:30:00Z"}),
            json!("free 4111111111111111 text"),
            json!(3.5),
        ] {
            let once = masker.mask_result(&value);
            let twice = masker.mask_result(&once);
            assert_eq!(once, twice, "not idempotent for {}", value);
        }
    }

    #[test]
    fn test_shape_classification() {
        assert_eq!(
            ResultShape::classify(&json!({"data": []})),
            ResultShape::DataEnvelope
        );
        assert_eq!(ResultShape::classify(&json!({"id": 1})), ResultShape::Row);
        assert_eq!(
            ResultShape::classify(&json!([{"id": 1}])),
            ResultShape::Rows
        );
        assert_eq!(ResultShape::classify(&json!("text")), ResultShape::Opaque);
        assert_eq!(ResultShape::classify(&json!([1, 2])), ResultShape::Opaque);
    }
}
