//! Constrained prompts for the two knowledge artifacts.
//!
//! Both prompts scope the oracle to the candidate list, restrict grounding
//! to a fixed set of references, and demand a single bare JSON object.

use medguard_contracts::patient::PatientRecord;

/// System instruction for the risk-map prompt.
pub const RISK_MAP_SYSTEM: &str = "Cautious medical safety assistant.";

/// System instruction for the dose prompt.
pub const DOSE_SYSTEM: &str = "Cautious medical assistant. No hallucinations.";

/// References the oracle is told to ground on. Named for the oracle's
/// benefit only; nothing here checks that it complied.
pub const REFERENCE_SOURCES: &[&str] = &["FDA", "RxList", "MedlinePlus"];

/// Response-length cap used when none is configured.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Build the risk-map prompt for `patient`.
pub fn risk_map_prompt(patient: &PatientRecord) -> String {
    format!(
        r#"You are a cautious medical assistant AI.

Patient info: {patient}
Suggested medications: {candidates}

Rules:
1. Only map medications in the suggested list.
2. Do NOT invent medications.
3. Allergies -> unsafe meds.
4. Pregnancy -> unsafe meds.
5. Conditions -> problematic meds.
6. Only use {sources}.
7. Output EXACT JSON:
   {{
     "allergy_map": {{}},
     "pregnancy_map": [],
     "condition_map": {{}}
   }}
8. No text outside JSON."#,
        patient = patient_json(patient),
        candidates = candidate_list(patient),
        sources = REFERENCE_SOURCES.join(", "),
    )
}

/// Build the dose prompt for `patient`.
pub fn dose_prompt(patient: &PatientRecord) -> String {
    format!(
        r#"You are a cautious medical assistant AI.

Patient info: {patient}
Suggested medications: {candidates}

Rules:
1. Only use medications in the list.
2. No invented doses.
3. Use {sources} only.
4. JSON only:
   {{
     "medication_doses": [
       {{"med": "", "dosage": "", "frequency": ""}}
     ]
   }}
5. If unknown -> dosage = "N/A", frequency = "N/A"."#,
        patient = patient_json(patient),
        candidates = candidate_list(patient),
        sources = REFERENCE_SOURCES.join(", "),
    )
}

fn patient_json(patient: &PatientRecord) -> String {
    serde_json::to_string_pretty(patient).unwrap_or_else(|_| format!("{:?}", patient))
}

fn candidate_list(patient: &PatientRecord) -> String {
    serde_json::to_string(&patient.suggested_meds).unwrap_or_else(|_| "[]".to_string())
}
