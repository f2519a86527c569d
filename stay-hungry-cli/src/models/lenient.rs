//! Deserializers for report fields that the API sends inconsistently.
//!
//! Aggregates computed by the database (SUM, AVG, DECIMAL columns) come back as
//! numeric strings, flags come back as `0`/`1`, and some rows omit fields
//! entirely. Everything here maps those shapes onto plain Rust values.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Loose::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Loose::Number(n) => Some(*n),
            Loose::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Number, numeric string or null into `Option<f64>`.
pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

/// Same as [`f64_opt`] with missing values read as zero.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(f64_opt(deserializer)?.unwrap_or(0.0))
}

pub fn u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(f64_opt(deserializer)?
        .filter(|v| *v >= 0.0)
        .map(|v| v.trunc() as u32))
}

pub fn i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(f64_opt(deserializer)?.map(|v| v.trunc() as i64))
}

/// `true`, `1`, `"1"` and `"true"` are truthy; anything else (including null) is false.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Text(s)) => matches!(s.trim(), "1" | "true"),
        Some(other) => other.as_f64().map(|v| v != 0.0).unwrap_or(false),
        None => false,
    })
}

/// Strings, numbers or null into a display string (dates and labels).
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Text(s)) => s,
        Some(Loose::Number(n)) => n.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}
