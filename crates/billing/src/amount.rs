//! Lenient amount coercion for loosely typed payment rows.
//!
//! Rows arrive from forms and database views where amounts may be numbers,
//! numeric strings, `null`, or junk. Anything that is not a finite number is
//! zero. Coercion never fails.

use gymdesk_core::Money;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Coerce an arbitrary JSON value (major units) into `Money`.
pub fn coerce(value: &JsonValue) -> Money {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|v| v.checked_mul(Money::SCALE).map(Money::from_minor))
            .or_else(|| n.as_f64().and_then(Money::from_major_f64))
            .unwrap_or(Money::ZERO),
        JsonValue::String(s) => coerce_str(s),
        _ => Money::ZERO,
    }
}

/// Coerce a major-unit string into `Money`; unparsable text is zero.
pub fn coerce_str(s: &str) -> Money {
    Money::parse_decimal(s).unwrap_or(Money::ZERO)
}

/// Coerce an optional string column (e.g. `NUMERIC::text` from SQL).
pub fn coerce_opt_str(s: Option<&str>) -> Money {
    s.map(coerce_str).unwrap_or(Money::ZERO)
}

/// Serde adapter: `#[serde(default, deserialize_with = "amount::lenient")]`.
pub fn lenient<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(coerce(&value))
}
