//! The JSON output document for one processed case.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    HistoryInfo, InvoiceInfo, PatientIdentity, RipsRecordSet, Sourced, ValidationReport,
};

/// Everything downstream consumers need for one invoice: the record set,
/// the diagnostics, and enough source context to audit the merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub generated_at: String,
    pub invoice: InvoiceSummary,
    pub patient: PatientSummary,
    pub records: RipsRecordSet,
    pub validation_messages: Vec<ValidationMessage>,
    pub error_count: usize,
    pub warning_count: usize,
    /// Non-fatal processing events (e.g. a dropped annex).
    pub processing_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub invoice_id: String,
    pub issue_date: NaiveDateTime,
    pub customer_name: Option<String>,
    pub total_amount: Decimal,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub full_name: Option<String>,
    pub principal_diagnosis_code: Option<String>,
    pub diagnosis_provenance: String,
    /// Resolved identity with source and discarded alternatives.
    pub identity: Sourced<PatientIdentity>,
}

/// One validation finding in output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub severity: String,
    pub code: String,
    pub message: String,
}

impl CaseReport {
    pub fn assemble(
        invoice: &InvoiceInfo,
        history: &HistoryInfo,
        records: RipsRecordSet,
        validation: &ValidationReport,
        processing_notes: Vec<String>,
    ) -> Self {
        let resolved = records.identity.value.clone().unwrap_or_default();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            invoice: InvoiceSummary {
                invoice_id: invoice.invoice_id.clone(),
                issue_date: invoice.issue_date,
                customer_name: invoice.customer_name.clone(),
                total_amount: invoice.total_amount,
                line_count: invoice.lines.len(),
            },
            patient: PatientSummary {
                document_type: resolved.document_type,
                document_number: resolved.document_number,
                full_name: history.full_name.clone(),
                principal_diagnosis_code: history.principal_diagnosis_code.clone(),
                diagnosis_provenance: history.diagnosis_provenance.to_string(),
                identity: records.identity.clone(),
            },
            validation_messages: validation
                .findings
                .iter()
                .map(|finding| ValidationMessage {
                    severity: finding.severity.as_str().to_string(),
                    code: finding.code.clone(),
                    message: finding.message.clone(),
                })
                .collect(),
            error_count: validation.error_count,
            warning_count: validation.warning_count,
            records,
            processing_notes,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RipsConfig;
    use crate::models::FieldProvenance;
    use crate::models::ServiceLine;
    use crate::pipeline::builder::RecordBuilder;
    use crate::pipeline::validation::ValidationEngine;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn fixtures() -> (InvoiceInfo, HistoryInfo) {
        let invoice = InvoiceInfo {
            invoice_id: "FERO45871".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            supplier_tax_id: None,
            supplier_name: None,
            customer_tax_id: None,
            customer_name: Some("EPS SURA".into()),
            total_amount: dec!(35000),
            currency: "COP".into(),
            lines: vec![ServiceLine {
                line_id: Some("1".into()),
                cups_code: Some("993520".into()),
                description: None,
                quantity: dec!(1),
                unit_value: dec!(35000),
                line_total: dec!(35000),
            }],
        };
        let history = HistoryInfo {
            document_type: Some("CC".into()),
            document_number: Some("1232835680".into()),
            full_name: Some("ANA GARCIA".into()),
            admission_id: None,
            admission_datetime: None,
            discharge_datetime: None,
            service_type: None,
            entry_service: None,
            principal_diagnosis_text: None,
            principal_diagnosis_code: Some("J189".into()),
            secondary_diagnosis_codes: vec![],
            service_purpose: None,
            triage_level: None,
            consultations: vec![],
            diagnosis_provenance: FieldProvenance::Deterministic,
        };
        (invoice, history)
    }

    #[test]
    fn report_serializes_with_validation_messages() {
        let (invoice, history) = fixtures();
        let set = RecordBuilder::new(&invoice, &history, None).build();
        let validation = ValidationEngine::new(&RipsConfig::default()).run(&set);
        let report = CaseReport::assemble(&invoice, &history, set, &validation, vec![]);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"validation_messages\""));
        assert!(json.contains("\"VAL000\""));
        assert!(json.contains("\"993520\""));
        assert!(json.contains("\"1232835680\""));
    }

    #[test]
    fn report_round_trips_through_json() {
        let (invoice, history) = fixtures();
        let set = RecordBuilder::new(&invoice, &history, None).build();
        let validation = ValidationEngine::new(&RipsConfig::default()).run(&set);
        let report = CaseReport::assemble(&invoice, &history, set, &validation, vec!["note".into()]);

        let json = report.to_json().unwrap();
        let parsed: CaseReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.invoice.invoice_id, "FERO45871");
        assert_eq!(parsed.processing_notes, vec!["note"]);
        assert_eq!(parsed.records.procedures.len(), 1);
    }
}
