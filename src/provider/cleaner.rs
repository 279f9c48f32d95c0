//! Field-level coercion for feed payloads.
//!
//! The feed is loosely typed: numbers sometimes arrive as strings and any
//! field may be `null` or missing. Everything that cannot be read as a finite
//! number becomes `None`, which the engines treat as a failed comparison.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse a numeric string the way the feed's consumers compare them.
/// "0.15" → 0.15 | " 1095 " → 1095.0 | "1e3" → 1000.0 | "N/A" → None
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn normalise_code(s: &str) -> String {
    s.trim().to_uppercase()
}

// ── Serde adapters ────────────────────────────────────────────────────────────

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_to_f64))
}

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
