//! Identity of a logical request for dedup purposes.
//!
//! Two calls share a fingerprint when they target the same method + path and
//! carry the same parameters after normalization: object keys sorted, `null`
//! members dropped. Key order and explicit nulls therefore never make two
//! otherwise identical requests look different.

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod fingerprint_test;

use std::fmt::Write;

use serde_json::Value;

use super::transport::ApiRequest;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    endpoint: String,
    params: String,
    /// Distinguishes concurrent calls that must not cancel each other.
    sequence: Option<u64>,
}

impl Fingerprint {
    /// Fingerprint shared by every identical request.
    #[must_use]
    pub fn of(request: &ApiRequest) -> Self {
        Self {
            endpoint: format!("{} {}", request.method.as_str(), request.path),
            params: normalize_params(&request.params),
            sequence: None,
        }
    }

    /// Fingerprint unique to one call.
    #[must_use]
    pub fn unique(request: &ApiRequest, sequence: u64) -> Self {
        Self { sequence: Some(sequence), ..Self::of(request) }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Canonical string form of `value`.
#[must_use]
pub fn normalize_params(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().filter(|(_, v)| !v.is_null()).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, member)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(member, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{scalar}");
        }
    }
}
