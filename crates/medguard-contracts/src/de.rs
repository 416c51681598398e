//! Lenient deserializers for fields produced by upstream stages.
//!
//! Upstream extraction output is loosely typed: fields arrive missing, as
//! `null`, or with the wrong numeric flavour. None of that is an error here.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `null` as `T::default()`. Pair with `#[serde(default)]` so an
/// absent field also defaults.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an age from an integer, float, numeric string, or `null`.
pub(crate) fn lenient_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(age_from_value).unwrap_or(0))
}

/// Best-effort conversion of a JSON value to a non-negative age in years.
///
/// Negative, non-numeric, and non-finite values resolve to 0.
pub(crate) fn age_from_value(value: &Value) -> u32 {
    let years = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match years {
        Some(y) if y.is_finite() && y > 0.0 => y.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

/// Deserialize a dosage/frequency field: missing or `null` becomes `"N/A"`,
/// numbers and booleans are rendered as text.
pub(crate) fn dose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(text_from_value)
        .unwrap_or_else(|| crate::dose::NOT_AVAILABLE.to_string()))
}

/// Render a scalar JSON value as text. Empty strings and non-scalars yield `None`.
pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize a medication list: `null` or a non-array becomes empty and
/// non-string items are skipped.
pub(crate) fn medication_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(strings_from_value).unwrap_or_default())
}

/// Deserialize a name → medication list map with the same leniency as
/// `medication_list` applied to every value. A `null` map is empty.
pub(crate) fn medication_map<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(name, meds)| (name, strings_from_value(&meds)))
        .collect())
}

fn strings_from_value(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
