//! Fictional patients and scripted oracle answers for the reference
//! scenarios.
//!
//! Patients are assembled from the JSON an upstream extraction stage and a
//! suggestion stage would hand over, so the scenarios exercise the same
//! intake path as a live pipeline. Oracle answers are the raw text a
//! completion API might return, including the malformed kind.

use serde_json::json;

use medguard_contracts::patient::PatientRecord;

// ── Patients ──────────────────────────────────────────────────────────────────

/// A 9-year-old with asthma and influenza.
pub fn pediatric_asthma_patient() -> PatientRecord {
    PatientRecord::from_stage_outputs(
        &json!({
            "allergies": [],
            "conditions": ["Asthma", "Influenza"],
            "pregnant": false,
            "age": 9
        }),
        &json!({
            "valid_drugs": ["Ibuprofen", "Aspirin", "Montelukast", "Acetaminophen"]
        }),
    )
}

/// A 31-year-old pregnant patient with chronic hypertension.
pub fn pregnant_hypertensive_patient() -> PatientRecord {
    PatientRecord::from_stage_outputs(
        &json!({
            "allergies": null,
            "conditions": ["Hypertension"],
            "pregnant": true,
            "age": 31
        }),
        &json!({
            "valid_drugs": ["Lisinopril", "Labetalol", "Nifedipine"]
        }),
    )
}

/// A 45-year-old with penicillin and sulfa allergies and a sinus infection.
pub fn multi_allergy_patient() -> PatientRecord {
    PatientRecord::from_stage_outputs(
        &json!({
            "allergies": ["Penicillin", "sulfa"],
            "conditions": ["acute sinusitis"],
            "pregnant": false,
            "age": 45
        }),
        &json!({
            "valid_drugs": ["Amoxicillin", "Sulfamethoxazole-Trimethoprim", "Doxycycline"]
        }),
    )
}

/// A 7-year-old with asthma and hay fever. The extraction stage could not
/// determine the age precisely and sent it as a string.
pub fn outage_patient() -> PatientRecord {
    PatientRecord::from_stage_outputs(
        &json!({
            "allergies": [],
            "conditions": ["asthma", "allergic rhinitis"],
            "pregnant": false,
            "age": "7"
        }),
        &json!({
            "valid_drugs": ["Ibuprofen", "Cetirizine"]
        }),
    )
}

/// A request carrying risk map and doses computed by an earlier stage.
pub fn precomputed_request_json() -> String {
    json!({
        "allergies": ["latex"],
        "conditions": ["type 2 diabetes", "Peptic Ulcer"],
        "age": 67,
        "pregnant": false,
        "suggested_meds": ["Metformin", "Warfarin", "Prednisone"],
        "agent2_med_maps": {
            "allergy_map": {},
            "pregnancy_map": ["warfarin"],
            "condition_map": {
                "type 2 diabetes": ["prednisone"]
            }
        },
        "agent2_dose_dict": {
            "metformin": { "med": "Metformin", "dosage": "500 mg", "frequency": "twice daily with meals" },
            "prednisone": { "med": "Prednisone", "dosage": "10 mg", "frequency": "once daily" }
        }
    })
    .to_string()
}

// ── Scripted oracle answers ───────────────────────────────────────────────────

/// Risk map for the pediatric asthma patient. The oracle misses the NSAID
/// risk and names a medication that was never suggested.
pub fn pediatric_risk_map() -> String {
    json!({
        "allergy_map": {},
        "pregnancy_map": [],
        "condition_map": {
            "asthma": ["propranolol"],
            "influenza": []
        }
    })
    .to_string()
}

pub fn pediatric_doses() -> String {
    json!({
        "medication_doses": [
            { "med": "Ibuprofen", "dosage": "10 mg/kg", "frequency": "every 6-8 hours as needed" },
            { "med": "Aspirin", "dosage": "N/A", "frequency": "N/A" },
            { "med": "Montelukast", "dosage": "5 mg", "frequency": "once daily in the evening" },
            { "med": "Acetaminophen", "dosage": "15 mg/kg", "frequency": "every 4-6 hours as needed" }
        ]
    })
    .to_string()
}

pub fn pregnancy_risk_map() -> String {
    json!({
        "allergy_map": {},
        "pregnancy_map": ["Lisinopril"],
        "condition_map": {
            "Hypertension": []
        }
    })
    .to_string()
}

/// Dose answer with a numeric dosage and a missing frequency.
pub fn pregnancy_doses() -> String {
    json!({
        "medication_doses": [
            { "med": "Lisinopril", "dosage": "10 mg", "frequency": "once daily" },
            { "med": "Labetalol", "dosage": "100 mg", "frequency": "twice daily" },
            { "med": "Nifedipine", "dosage": 30 }
        ]
    })
    .to_string()
}

pub fn allergy_risk_map() -> String {
    json!({
        "allergy_map": {
            "penicillin": ["Amoxicillin"],
            "sulfa": ["sulfamethoxazole-trimethoprim"]
        },
        "pregnancy_map": [],
        "condition_map": {}
    })
    .to_string()
}

pub fn allergy_doses() -> String {
    json!({
        "medication_doses": [
            { "med": "Amoxicillin", "dosage": "500 mg", "frequency": "every 8 hours" },
            { "med": "Sulfamethoxazole-Trimethoprim", "dosage": "800/160 mg", "frequency": "every 12 hours" },
            { "med": "Doxycycline", "dosage": "100 mg", "frequency": "every 12 hours" }
        ]
    })
    .to_string()
}

/// A dose answer wrapped in prose, as a chat model sometimes produces.
pub fn chatty_doses() -> String {
    "Sure! Here are the standard doses:\n{\"medication_doses\": []}".to_string()
}
