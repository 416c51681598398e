//! The risk map: which candidate medications are unsafe for which patient
//! attribute.
//!
//! Built once per request, either supplied precomputed by an upstream stage
//! or generated by the oracle. Never mutated once handed to the evaluator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::de::{medication_list, medication_map};

/// Allergy, pregnancy, and condition mappings to unsafe medications.
///
/// Every field defaults to empty when absent or `null`, as does a `null`
/// list inside a map; non-string list items are skipped. An entirely empty
/// map flags nothing, so it is the fail-soft value for unusable oracle
/// output. The guard rules of the evaluator still apply on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMap {
    /// Allergy name → medications unsafe for patients with that allergy.
    #[serde(default, deserialize_with = "medication_map")]
    pub allergy_map: BTreeMap<String, Vec<String>>,

    /// Medications unsafe during pregnancy.
    #[serde(default, deserialize_with = "medication_list")]
    pub pregnancy_map: Vec<String>,

    /// Condition name → medications that may worsen it.
    #[serde(default, deserialize_with = "medication_map")]
    pub condition_map: BTreeMap<String, Vec<String>>,
}

impl RiskMap {
    /// True when no mapping flags any medication.
    pub fn is_empty(&self) -> bool {
        self.allergy_map.values().all(Vec::is_empty)
            && self.pregnancy_map.is_empty()
            && self.condition_map.values().all(Vec::is_empty)
    }

    /// Every medication name mentioned anywhere in the map, in field order.
    pub fn medications(&self) -> impl Iterator<Item = &str> {
        self.allergy_map
            .values()
            .flatten()
            .chain(self.pregnancy_map.iter())
            .chain(self.condition_map.values().flatten())
            .map(String::as_str)
    }

    /// Drop every medication name that is not in `candidates`
    /// (case-insensitive). Returns the number of names removed.
    ///
    /// Keys whose lists become empty are kept; an empty list flags nothing.
    pub fn retain_candidates(&mut self, candidates: &[String]) -> usize {
        let folded: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();
        let keep = |med: &String| folded.contains(&med.to_lowercase());

        let mut removed = 0;
        let mut prune = |meds: &mut Vec<String>| {
            let before = meds.len();
            meds.retain(keep);
            removed += before - meds.len();
        };

        self.allergy_map.values_mut().for_each(&mut prune);
        prune(&mut self.pregnancy_map);
        self.condition_map.values_mut().for_each(&mut prune);
        removed
    }
}

/// Case-insensitive membership test over a medication list.
pub fn lists_medication(meds: &[String], medication: &str) -> bool {
    let medication = medication.to_lowercase();
    meds.iter().any(|m| m.to_lowercase() == medication)
}
