//! Shared Serde deserializers
//!
//! Configuration values may come from a typed file (YAML/JSON numbers) or
//! from raw environment variables (always strings). These helpers accept
//! both.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrFloat {
    Float(f64),
    String(String),
}

/// Deserialize an `f64` from a native number or a numeric string
pub fn deserialize_f64_flexible<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match StringOrFloat::deserialize(deserializer)? {
        StringOrFloat::Float(f) => Ok(f),
        StringOrFloat::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("Invalid number '{}': {}", s, e))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

/// Deserialize an optional string where `null` and `""` both mean absent
///
/// A bare number (YAML `number: 15550001`) is taken as its decimal text. A
/// leading `+` is already gone at that point, so phone numbers should still
/// be quoted.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value.map(String::from).and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
