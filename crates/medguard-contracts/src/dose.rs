//! Standard-dose lookup types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::de::{dose_text, text_from_value};

/// Sentinel for an unknown dosage or frequency.
pub const NOT_AVAILABLE: &str = "N/A";

/// Standard dosage and frequency for one medication.
///
/// On the wire the medication name is `med`; `medication` is accepted as an
/// alias. Missing or `null` dosage/frequency decode as `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseEntry {
    #[serde(rename = "med", alias = "medication")]
    pub medication: String,

    #[serde(default = "not_available", deserialize_with = "dose_text")]
    pub dosage: String,

    #[serde(default = "not_available", deserialize_with = "dose_text")]
    pub frequency: String,
}

impl DoseEntry {
    /// An entry whose dosage and frequency are both unknown.
    pub fn unknown(medication: impl Into<String>) -> Self {
        Self {
            medication: medication.into(),
            dosage: NOT_AVAILABLE.to_string(),
            frequency: NOT_AVAILABLE.to_string(),
        }
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Lower-cased medication name → `DoseEntry`.
///
/// Serializes as a plain JSON object so an upstream stage can hand back a
/// lookup it received earlier. Decoding such an object is lenient: an entry
/// without `med` takes its name from the key, and values that are not
/// objects are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DoseLookup {
    entries: BTreeMap<String, DoseEntry>,
}

impl DoseLookup {
    /// Build a lookup keyed by each entry's lower-cased medication name.
    ///
    /// When two entries fold to the same key the later one wins.
    pub fn from_entries(entries: impl IntoIterator<Item = DoseEntry>) -> Self {
        let mut lookup = Self::default();
        for entry in entries {
            lookup.insert(entry);
        }
        lookup
    }

    /// Insert `entry`, replacing any entry under the same folded name.
    pub fn insert(&mut self, entry: DoseEntry) {
        self.entries.insert(entry.medication.to_lowercase(), entry);
    }

    /// Look up `medication` case-insensitively.
    pub fn get(&self, medication: &str) -> Option<&DoseEntry> {
        self.entries.get(&medication.to_lowercase())
    }

    /// Dosage and frequency for `medication`, `"N/A"` for both when absent.
    pub fn dose_for(&self, medication: &str) -> (String, String) {
        match self.get(medication) {
            Some(entry) => (entry.dosage.clone(), entry.frequency.clone()),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, entry)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DoseEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de> Deserialize<'de> for DoseLookup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .filter_map(|(key, value)| {
                keyed_entry(&key, &value).map(|entry| (key.to_lowercase(), entry))
            })
            .collect();
        Ok(Self { entries })
    }
}

/// Read one `key: {med, dosage, frequency}` pair of a serialized lookup.
fn keyed_entry(key: &str, value: &Value) -> Option<DoseEntry> {
    let fields = value.as_object()?;
    let medication = fields
        .get("med")
        .or_else(|| fields.get("medication"))
        .and_then(text_from_value)
        .unwrap_or_else(|| key.to_string());
    if medication.trim().is_empty() {
        return None;
    }

    let text = |name: &str| {
        fields
            .get(name)
            .and_then(text_from_value)
            .unwrap_or_else(not_available)
    };
    Some(DoseEntry {
        medication,
        dosage: text("dosage"),
        frequency: text("frequency"),
    })
}
