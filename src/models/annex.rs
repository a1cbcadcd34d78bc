use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Patient demographics carried by the FEV RIPS annex.
///
/// The annex is EPS-validated, so when present these fields outrank what the
/// history or invoice claim about the patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnexPatient {
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub full_name: Option<String>,
    pub sex: Option<String>,
    pub birth_date: Option<NaiveDateTime>,
    pub municipality_code: Option<String>,
    pub residence_zone: Option<String>,
}

/// One medication entry from the annex (`servicios.medicamentos`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnexMedicationLine {
    pub provider_code: String,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub authorization_number: Option<String>,
    pub medication_code: String,
    pub medication_name: Option<String>,
    pub medication_type: Option<String>,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    pub quantity: Decimal,
    pub unit_measure: Option<String>,
    pub treatment_days: Option<i32>,
    pub diagnosis_code: Option<String>,
    pub related_diagnosis: Option<String>,
    pub mipres_id: Option<String>,
    pub administration_date: Option<NaiveDateTime>,
    pub pharmaceutical_form: Option<String>,
    pub concentration: Option<String>,
}

/// One "other services" entry from the annex (`servicios.otrosServicios`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnexOtherServiceLine {
    pub provider_code: String,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub authorization_number: Option<String>,
    pub service_code: String,
    pub service_name: Option<String>,
    pub service_type: Option<String>,
    pub service_date: Option<NaiveDateTime>,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    pub quantity: Decimal,
    pub diagnosis_code: Option<String>,
    pub related_diagnosis: Option<String>,
    pub mipres_id: Option<String>,
}

/// Normalized contents of a FEV RIPS JSON annex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnexInfo {
    pub patient: AnnexPatient,
    pub medications: Vec<AnnexMedicationLine>,
    pub other_services: Vec<AnnexOtherServiceLine>,
}

impl AnnexInfo {
    /// True when the annex carried no usable patient identity.
    pub fn has_identity(&self) -> bool {
        self.patient.document_number.is_some()
    }
}
