use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::FieldProvenance;

/// One consultation or service block found in the clinical history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationInfo {
    /// Consultation or service code (CUPS or internal).
    pub code: String,
    pub description: Option<String>,
    pub performed_at: Option<NaiveDateTime>,
    pub purpose_text: Option<String>,
    pub authorization_number: Option<String>,
    /// How this consultation was located in the document.
    pub provenance: FieldProvenance,
}

/// Data extracted from a clinical-history PDF.
///
/// The extractor refuses to emit this without a document number, but the
/// field stays optional: the record builder also accepts hand-completed
/// histories where identity is still pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryInfo {
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub full_name: Option<String>,
    /// Admission episode identifier ("Atención: ...").
    pub admission_id: Option<String>,
    pub admission_datetime: Option<NaiveDateTime>,
    /// None while the patient is still admitted.
    pub discharge_datetime: Option<NaiveDateTime>,
    pub service_type: Option<String>,
    pub entry_service: Option<String>,
    pub principal_diagnosis_text: Option<String>,
    pub principal_diagnosis_code: Option<String>,
    pub secondary_diagnosis_codes: Vec<String>,
    pub service_purpose: Option<String>,
    pub triage_level: Option<String>,
    pub consultations: Vec<ConsultationInfo>,
    /// Provenance of the principal diagnosis fields.
    pub diagnosis_provenance: FieldProvenance,
}

impl HistoryInfo {
    /// Discharge must not precede admission when both are present.
    pub fn stay_is_consistent(&self) -> bool {
        match (self.admission_datetime, self.discharge_datetime) {
            (Some(admission), Some(discharge)) => discharge >= admission,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn base() -> HistoryInfo {
        HistoryInfo {
            document_type: Some("CC".into()),
            document_number: Some("1232835680".into()),
            full_name: None,
            admission_id: None,
            admission_datetime: None,
            discharge_datetime: None,
            service_type: None,
            entry_service: None,
            principal_diagnosis_text: None,
            principal_diagnosis_code: None,
            secondary_diagnosis_codes: vec![],
            service_purpose: None,
            triage_level: None,
            consultations: vec![],
            diagnosis_provenance: FieldProvenance::Deterministic,
        }
    }

    #[test]
    fn open_stay_is_consistent() {
        let mut history = base();
        history.admission_datetime = Some(at(10, 8));
        assert!(history.stay_is_consistent());
    }

    #[test]
    fn discharge_before_admission_is_inconsistent() {
        let mut history = base();
        history.admission_datetime = Some(at(10, 8));
        history.discharge_datetime = Some(at(9, 8));
        assert!(!history.stay_is_consistent());
    }
}
