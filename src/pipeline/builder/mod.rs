//! RecordBuilder — the reconciliation engine.
//!
//! Merges invoice, history, and optional annex into the canonical RIPS
//! record set under one precedence policy: the annex is EPS-validated
//! demographic truth, the history owns clinical codes, the invoice owns
//! money. Building never fails: data-quality problems are deferred to the
//! validation engine, and manual completion downstream is an accepted
//! workflow step.

pub mod codes;
pub mod merge;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::DEFAULT_DOCUMENT_TYPE;
use crate::models::{
    AnnexInfo, ConsultationRecord, HistoryInfo, InvoiceInfo, InvoiceRecord, MedicationRecord,
    OtherServiceRecord, PatientIdentity, ProcedureRecord, RecordSource, RipsRecordSet, Sourced,
    UserRecord,
};

use codes::{map_attention_type, map_service_purpose};
use merge::resolve_field;

/// Diagnosis type reported on consultation records when the history does
/// not state one (1 = confirmed new).
const DEFAULT_DIAGNOSIS_TYPE: &str = "1";

pub struct RecordBuilder<'a> {
    invoice: &'a InvoiceInfo,
    history: &'a HistoryInfo,
    annex: Option<&'a AnnexInfo>,
    provider_code: Option<String>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(
        invoice: &'a InvoiceInfo,
        history: &'a HistoryInfo,
        annex: Option<&'a AnnexInfo>,
    ) -> Self {
        Self {
            invoice,
            history,
            annex,
            provider_code: None,
        }
    }

    /// Override the provider code (defaults to the supplier tax id).
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Build the full record set. Best-effort: missing fields stay None
    /// and are surfaced by validation, not by failure here.
    pub fn build(&self) -> RipsRecordSet {
        let identity = self.resolve_identity();
        let resolved = identity.value.clone().unwrap_or_default();

        let set = RipsRecordSet {
            invoice: self.build_invoice_record(&resolved),
            user: self.build_user_record(&resolved),
            procedures: self.build_procedure_records(&resolved),
            consultations: self.build_consultation_records(&resolved),
            medications: self.build_medication_records(&resolved),
            other_services: self.build_other_service_records(&resolved),
            identity,
        };

        tracing::info!(
            invoice = %self.invoice.invoice_id,
            document_number = ?resolved.document_number,
            procedures = set.procedures.len(),
            consultations = set.consultations.len(),
            medications = set.medications.len(),
            other_services = set.other_services.len(),
            "RIPS record set built"
        );
        set
    }

    /// Identity precedence: Annex > History. The invoice's customer block
    /// names the payer EPS, never the patient, so it cannot supply a
    /// patient document.
    fn resolve_identity(&self) -> Sourced<PatientIdentity> {
        let annex_identity = self
            .annex
            .map(|a| &a.patient)
            .filter(|p| p.document_number.is_some())
            .map(|p| PatientIdentity {
                document_type: p.document_type.clone().map(|t| t.to_uppercase()),
                document_number: p.document_number.clone().map(|n| n.replace(' ', "")),
            });
        let history_identity = self
            .history
            .document_number
            .as_ref()
            .map(|number| PatientIdentity {
                document_type: self.history.document_type.clone().map(|t| t.to_uppercase()),
                document_number: Some(number.replace(' ', "")),
            });

        let mut resolved = resolve_field(vec![
            (annex_identity, RecordSource::Annex),
            (history_identity, RecordSource::History),
        ]);

        // A resolved number without a document type gets the default.
        if let Some(identity) = resolved.value.as_mut() {
            if identity.document_type.is_none() {
                identity.document_type = Some(DEFAULT_DOCUMENT_TYPE.to_string());
            }
        }
        resolved
    }

    fn resolved_provider_code(&self) -> Option<String> {
        self.provider_code
            .clone()
            .or_else(|| self.invoice.supplier_tax_id.clone())
    }

    /// Clinical service date: the admission, else the invoice issue date.
    fn service_date(&self) -> NaiveDateTime {
        self.history
            .admission_datetime
            .unwrap_or(self.invoice.issue_date)
    }

    fn build_invoice_record(&self, identity: &PatientIdentity) -> InvoiceRecord {
        InvoiceRecord {
            id: Uuid::new_v4(),
            provider_code: self.resolved_provider_code(),
            provider_name: self.invoice.supplier_name.clone(),
            invoice_number: self.invoice.invoice_id.clone(),
            invoice_date: self.invoice.issue_date,
            total_value: self.invoice.total_amount,
            identity: identity.clone(),
            contract_number: None,
            policy_number: None,
            copayment_value: Decimal::ZERO,
            commission_value: Decimal::ZERO,
            discount_value: Decimal::ZERO,
        }
    }

    fn build_user_record(&self, identity: &PatientIdentity) -> Option<UserRecord> {
        identity.document_number.as_ref()?;

        let full_name = resolve_field(vec![
            (
                self.annex.and_then(|a| a.patient.full_name.clone()),
                RecordSource::Annex,
            ),
            (self.history.full_name.clone(), RecordSource::History),
        ]);
        let (first_name, second_name, last_name, second_last_name) =
            split_full_name(full_name.value.as_deref());

        let annex_patient = self.annex.map(|a| &a.patient);
        let age = annex_patient
            .and_then(|p| p.birth_date)
            .and_then(|birth| age_at(birth, self.service_date()));
        let municipality_code = annex_patient.and_then(|p| p.municipality_code.clone());

        Some(UserRecord {
            id: Uuid::new_v4(),
            identity: identity.clone(),
            first_name,
            second_name,
            last_name,
            second_last_name,
            age,
            age_unit: age.map(|_| "A".to_string()),
            sex: annex_patient.and_then(|p| p.sex.clone()),
            department_code: municipality_code
                .as_ref()
                .filter(|code| code.len() >= 2)
                .map(|code| code[..2].to_string()),
            municipality_code,
            residence_zone: annex_patient.and_then(|p| p.residence_zone.clone()),
        })
    }

    /// One procedure record per invoice service line. The invoice is the
    /// sole monetary source; the history is the sole diagnosis source.
    fn build_procedure_records(&self, identity: &PatientIdentity) -> Vec<ProcedureRecord> {
        let provider_code = self.resolved_provider_code();
        let service_date = self.service_date();
        let attention_type = map_attention_type(self.history.service_type.as_deref());
        let purpose = map_service_purpose(self.history.service_purpose.as_deref());
        let diagnosis_code = self.history.principal_diagnosis_code.clone();

        self.invoice
            .lines
            .iter()
            .map(|line| {
                let enriched = diagnosis_code.is_some() || self.line_has_context(line.cups_code.as_deref());
                if !enriched {
                    tracing::debug!(
                        cups = ?line.cups_code,
                        "Service line built without history/annex context"
                    );
                }
                ProcedureRecord {
                    id: Uuid::new_v4(),
                    identity: identity.clone(),
                    provider_code: provider_code.clone(),
                    invoice_number: self.invoice.invoice_id.clone(),
                    service_date,
                    authorization_number: None,
                    service_code: line.line_id.clone(),
                    cups_code: line.cups_code.clone(),
                    diagnosis_code: diagnosis_code.clone(),
                    related_diagnosis: self.history.secondary_diagnosis_codes.first().cloned(),
                    service_purpose_code: purpose.clone(),
                    attention_type_code: attention_type.clone(),
                    copayment_value: Decimal::ZERO,
                    net_value: line.subtotal(),
                    enriched,
                }
            })
            .collect()
    }

    /// Whether any history consultation or annex line mentions this code.
    fn line_has_context(&self, cups_code: Option<&str>) -> bool {
        let Some(code) = cups_code else { return false };
        let in_history = self
            .history
            .consultations
            .iter()
            .any(|c| c.code == code);
        let in_annex = self.annex.is_some_and(|a| {
            a.medications.iter().any(|m| m.medication_code == code)
                || a.other_services.iter().any(|s| s.service_code == code)
        });
        in_history || in_annex
    }

    fn build_consultation_records(&self, identity: &PatientIdentity) -> Vec<ConsultationRecord> {
        let provider_code = self.resolved_provider_code();
        let diagnosis_code = self.history.principal_diagnosis_code.clone();
        let mut related = self.history.secondary_diagnosis_codes.iter();
        let related1 = related.next().cloned();
        let related2 = related.next().cloned();
        let related3 = related.next().cloned();

        self.history
            .consultations
            .iter()
            .map(|consultation| {
                let value = self.match_line_value(&consultation.code);
                let purpose_text = consultation
                    .purpose_text
                    .as_deref()
                    .or(self.history.service_purpose.as_deref());
                ConsultationRecord {
                    id: Uuid::new_v4(),
                    identity: identity.clone(),
                    provider_code: provider_code.clone(),
                    invoice_number: self.invoice.invoice_id.clone(),
                    consultation_date: consultation.performed_at.unwrap_or_else(|| self.service_date()),
                    authorization_number: consultation.authorization_number.clone(),
                    consultation_code: consultation.code.clone(),
                    purpose_code: map_service_purpose(purpose_text),
                    external_cause: None,
                    principal_diagnosis: diagnosis_code.clone(),
                    related_diagnosis1: related1.clone(),
                    related_diagnosis2: related2.clone(),
                    related_diagnosis3: related3.clone(),
                    diagnosis_type: Some(DEFAULT_DIAGNOSIS_TYPE.to_string()),
                    consultation_value: value,
                    copayment_value: Decimal::ZERO,
                    net_value: value,
                    provenance: consultation.provenance,
                }
            })
            .collect()
    }

    /// The billed value of the invoice line carrying this code, zero when
    /// the invoice does not itemize it.
    fn match_line_value(&self, cups_code: &str) -> Decimal {
        self.invoice
            .lines
            .iter()
            .find(|line| line.cups_code.as_deref() == Some(cups_code))
            .map(|line| line.subtotal())
            .unwrap_or(Decimal::ZERO)
    }

    fn build_medication_records(&self, identity: &PatientIdentity) -> Vec<MedicationRecord> {
        let Some(annex) = self.annex else { return vec![] };
        let provider_code = self.resolved_provider_code();
        let fallback_diagnosis = self.history.principal_diagnosis_code.clone();

        annex
            .medications
            .iter()
            .map(|med| {
                self.warn_on_foreign_identity("AM", med.document_number.as_deref(), identity);
                MedicationRecord {
                    id: Uuid::new_v4(),
                    identity: identity.clone(),
                    provider_code: non_empty(&med.provider_code).or_else(|| provider_code.clone()),
                    invoice_number: self.invoice.invoice_id.clone(),
                    authorization_number: med.authorization_number.clone(),
                    medication_code: med.medication_code.clone(),
                    medication_name: med.medication_name.clone(),
                    medication_type: med.medication_type.clone(),
                    pharmaceutical_form: med.pharmaceutical_form.clone(),
                    concentration: med.concentration.clone(),
                    unit_measure: med.unit_measure.clone(),
                    treatment_days: med.treatment_days,
                    quantity: med.quantity,
                    unit_value: med.unit_value,
                    total_value: med.total_value,
                    mipres_id: med.mipres_id.clone(),
                    principal_diagnosis: med.diagnosis_code.clone().or_else(|| fallback_diagnosis.clone()),
                    related_diagnosis: med.related_diagnosis.clone(),
                    administration_date: med.administration_date,
                }
            })
            .collect()
    }

    fn build_other_service_records(&self, identity: &PatientIdentity) -> Vec<OtherServiceRecord> {
        let Some(annex) = self.annex else { return vec![] };
        let provider_code = self.resolved_provider_code();
        let fallback_diagnosis = self.history.principal_diagnosis_code.clone();

        annex
            .other_services
            .iter()
            .map(|service| {
                self.warn_on_foreign_identity("AT", service.document_number.as_deref(), identity);
                OtherServiceRecord {
                    id: Uuid::new_v4(),
                    identity: identity.clone(),
                    provider_code: non_empty(&service.provider_code).or_else(|| provider_code.clone()),
                    invoice_number: self.invoice.invoice_id.clone(),
                    authorization_number: service.authorization_number.clone(),
                    service_code: service.service_code.clone(),
                    service_name: service.service_name.clone(),
                    service_type: service.service_type.clone(),
                    service_date: service.service_date,
                    quantity: service.quantity,
                    unit_value: service.unit_value,
                    total_value: service.total_value,
                    mipres_id: service.mipres_id.clone(),
                    principal_diagnosis: service.diagnosis_code.clone().or_else(|| fallback_diagnosis.clone()),
                    related_diagnosis: service.related_diagnosis.clone(),
                }
            })
            .collect()
    }

    /// Annex lines occasionally carry a different patient than the resolved
    /// one (shared dispensation files). The record is coerced to the
    /// resolved identity; the original is logged for audit.
    fn warn_on_foreign_identity(
        &self,
        record_tag: &str,
        line_document: Option<&str>,
        identity: &PatientIdentity,
    ) {
        if let (Some(line_doc), Some(resolved_doc)) = (line_document, identity.document_number.as_deref()) {
            if line_doc != resolved_doc {
                tracing::warn!(
                    record = record_tag,
                    line_document = line_doc,
                    resolved_document = resolved_doc,
                    "Annex line identity coerced to resolved patient"
                );
            }
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// Split a printed full name into the four RIPS name columns.
/// Names print given-names-first on these documents.
fn split_full_name(
    full_name: Option<&str>,
) -> (Option<String>, Option<String>, Option<String>, Option<String>) {
    let Some(full_name) = full_name else {
        return (None, None, None, None);
    };
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let owned = |s: &&str| Some(s.to_string());

    match tokens.as_slice() {
        [] => (None, None, None, None),
        [first] => (owned(first), None, None, None),
        [first, last] => (owned(first), None, owned(last), None),
        [first, last, second_last] => (owned(first), None, owned(last), owned(second_last)),
        [first, middle @ .., last, second_last] => (
            owned(first),
            Some(middle.join(" ")),
            owned(last),
            owned(second_last),
        ),
    }
}

/// Whole years between birth and the reference date; None when the birth
/// date lies in the future.
fn age_at(birth: NaiveDateTime, reference: NaiveDateTime) -> Option<i32> {
    if birth > reference {
        return None;
    }
    use chrono::Datelike;
    let mut years = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    Some(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnexMedicationLine, AnnexPatient, ConsultationInfo, ServiceLine};
    use crate::models::FieldProvenance;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    fn invoice_fixture() -> InvoiceInfo {
        let line = |id: &str, code: &str, desc: &str| ServiceLine {
            line_id: Some(id.into()),
            cups_code: Some(code.into()),
            description: Some(desc.into()),
            quantity: dec!(1),
            unit_value: dec!(35000),
            line_total: dec!(35000),
        };
        InvoiceInfo {
            invoice_id: "FERO45871".into(),
            issue_date: datetime(2024, 5, 2),
            supplier_tax_id: Some("900123456-1".into()),
            supplier_name: Some("IPS SALUD TOTAL SAS".into()),
            customer_tax_id: Some("800088702-2".into()),
            customer_name: Some("EPS SURA".into()),
            total_amount: dec!(70000),
            currency: "COP".into(),
            lines: vec![
                line("1", "993520", "VACUNA TRIPLE VIRAL"),
                line("2", "993510", "VACUNA FIEBRE AMARILLA"),
            ],
        }
    }

    fn history_fixture(document_number: Option<&str>) -> HistoryInfo {
        HistoryInfo {
            document_type: document_number.map(|_| "CC".to_string()),
            document_number: document_number.map(str::to_string),
            full_name: Some("ANA MARIA GARCIA PEREZ".into()),
            admission_id: None,
            admission_datetime: Some(datetime(2024, 5, 1)),
            discharge_datetime: None,
            service_type: Some("URGENCIAS".into()),
            entry_service: None,
            principal_diagnosis_text: Some("NEUMONIA BACTERIANA".into()),
            principal_diagnosis_code: Some("J189".into()),
            secondary_diagnosis_codes: vec!["E11.9".into()],
            service_purpose: Some("Consulta de urgencias".into()),
            triage_level: Some("II".into()),
            consultations: vec![ConsultationInfo {
                code: "890701".into(),
                description: Some("CONSULTA URGENCIAS".into()),
                performed_at: Some(datetime(2024, 5, 1)),
                purpose_text: Some("Consulta de urgencias".into()),
                authorization_number: Some("AUT-1".into()),
                provenance: FieldProvenance::Deterministic,
            }],
            diagnosis_provenance: FieldProvenance::Deterministic,
        }
    }

    fn annex_fixture() -> AnnexInfo {
        AnnexInfo {
            patient: AnnexPatient {
                document_type: Some("CC".into()),
                document_number: Some("1232835680".into()),
                full_name: Some("GARCIA PEREZ ANA MARIA".into()),
                sex: Some("F".into()),
                birth_date: Some(datetime(1990, 7, 21)),
                municipality_code: Some("05001".into()),
                residence_zone: Some("01".into()),
            },
            medications: vec![AnnexMedicationLine {
                provider_code: "050010123401".into(),
                document_type: Some("CC".into()),
                document_number: Some("1232835680".into()),
                authorization_number: None,
                medication_code: "19902435-1".into(),
                medication_name: Some("AMOXICILINA 500MG".into()),
                medication_type: None,
                unit_value: dec!(1200.5),
                total_value: dec!(12005),
                quantity: dec!(10),
                unit_measure: None,
                treatment_days: Some(7),
                diagnosis_code: None,
                related_diagnosis: None,
                mipres_id: None,
                administration_date: None,
                pharmaceutical_form: None,
                concentration: Some("500".into()),
            }],
            other_services: vec![],
        }
    }

    #[test]
    fn no_identity_sources_yield_empty_identity_not_failure() {
        let invoice = invoice_fixture();
        let history = history_fixture(None);
        let set = RecordBuilder::new(&invoice, &history, None).build();

        assert_eq!(set.procedures.len(), 2);
        assert_eq!(set.procedures[0].cups_code.as_deref(), Some("993520"));
        assert_eq!(set.procedures[1].cups_code.as_deref(), Some("993510"));
        assert!(set.procedures.iter().all(|r| r.identity.document_number.is_none()));
        assert!(set.user.is_none());
        assert!(set.identity.value.is_none());
    }

    #[test]
    fn annex_identity_propagates_to_every_record() {
        let invoice = invoice_fixture();
        let history = history_fixture(None);
        let annex = annex_fixture();
        let set = RecordBuilder::new(&invoice, &history, Some(&annex)).build();

        for (_, _, identity) in set.identities() {
            assert_eq!(identity.document_type.as_deref(), Some("CC"));
            assert_eq!(identity.document_number.as_deref(), Some("1232835680"));
        }
        assert_eq!(set.identity.source, Some(RecordSource::Annex));
    }

    #[test]
    fn history_identity_used_when_annex_absent() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("99887766"));
        let set = RecordBuilder::new(&invoice, &history, None).build();

        assert_eq!(set.identity.source, Some(RecordSource::History));
        assert_eq!(
            set.invoice.identity.document_number.as_deref(),
            Some("99887766")
        );
    }

    #[test]
    fn conflicting_history_identity_is_discarded_with_audit_trail() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("99887766"));
        let annex = annex_fixture();
        let set = RecordBuilder::new(&invoice, &history, Some(&annex)).build();

        let resolved = set.identity.value.as_ref().unwrap();
        assert_eq!(resolved.document_number.as_deref(), Some("1232835680"));
        assert_eq!(set.identity.discarded.len(), 1);
        assert_eq!(set.identity.discarded[0].source, RecordSource::History);
        assert_eq!(
            set.identity.discarded[0].value.document_number.as_deref(),
            Some("99887766")
        );
    }

    #[test]
    fn procedure_records_carry_invoice_money_and_history_codes() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("1232835680"));
        let set = RecordBuilder::new(&invoice, &history, None).build();

        let record = &set.procedures[0];
        assert_eq!(record.net_value, dec!(35000));
        assert_eq!(record.diagnosis_code.as_deref(), Some("J189"));
        assert_eq!(record.related_diagnosis.as_deref(), Some("E11.9"));
        assert_eq!(record.attention_type_code.as_deref(), Some("02"));
        assert_eq!(record.service_purpose_code.as_deref(), Some("10"));
        assert!(record.enriched);
        assert_eq!(set.procedures_total(), dec!(70000));
    }

    #[test]
    fn lines_without_context_are_tagged_unenriched() {
        let invoice = invoice_fixture();
        let mut history = history_fixture(Some("1232835680"));
        history.principal_diagnosis_code = None;
        history.consultations.clear();
        let set = RecordBuilder::new(&invoice, &history, None).build();

        assert!(set.procedures.iter().all(|r| !r.enriched));
        // Money still reconciles even without enrichment.
        assert_eq!(set.procedures_total(), dec!(70000));
    }

    #[test]
    fn consultation_value_matched_from_invoice_lines() {
        let invoice = invoice_fixture();
        let mut history = history_fixture(Some("1232835680"));
        history.consultations[0].code = "993520".into();
        let set = RecordBuilder::new(&invoice, &history, None).build();

        assert_eq!(set.consultations.len(), 1);
        assert_eq!(set.consultations[0].net_value, dec!(35000));
        assert_eq!(set.consultations[0].purpose_code.as_deref(), Some("10"));
    }

    #[test]
    fn unmatched_consultation_value_is_zero() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("1232835680"));
        let set = RecordBuilder::new(&invoice, &history, None).build();
        assert_eq!(set.consultations[0].net_value, Decimal::ZERO);
    }

    #[test]
    fn user_record_demographics_come_from_annex() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("1232835680"));
        let annex = annex_fixture();
        let set = RecordBuilder::new(&invoice, &history, Some(&annex)).build();

        let user = set.user.expect("user record");
        assert_eq!(user.sex.as_deref(), Some("F"));
        assert_eq!(user.municipality_code.as_deref(), Some("05001"));
        assert_eq!(user.department_code.as_deref(), Some("05"));
        assert_eq!(user.age, Some(33));
        assert_eq!(user.age_unit.as_deref(), Some("A"));
        // Name resolved from the annex, split into RIPS columns.
        assert_eq!(user.first_name.as_deref(), Some("GARCIA"));
        assert_eq!(user.second_name.as_deref(), Some("PEREZ"));
        assert_eq!(user.last_name.as_deref(), Some("ANA"));
        assert_eq!(user.second_last_name.as_deref(), Some("MARIA"));
    }

    #[test]
    fn medication_records_inherit_resolved_identity_and_fallback_diagnosis() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("1232835680"));
        let annex = annex_fixture();
        let set = RecordBuilder::new(&invoice, &history, Some(&annex)).build();

        assert_eq!(set.medications.len(), 1);
        let med = &set.medications[0];
        assert_eq!(med.identity.document_number.as_deref(), Some("1232835680"));
        assert_eq!(med.principal_diagnosis.as_deref(), Some("J189"));
        assert_eq!(med.provider_code.as_deref(), Some("050010123401"));
    }

    #[test]
    fn provider_code_override_wins_over_supplier_tax_id() {
        let invoice = invoice_fixture();
        let history = history_fixture(Some("1232835680"));
        let set = RecordBuilder::new(&invoice, &history, None)
            .with_provider_code("123456789012")
            .build();
        assert_eq!(set.invoice.provider_code.as_deref(), Some("123456789012"));
        assert_eq!(set.procedures[0].provider_code.as_deref(), Some("123456789012"));
    }

    #[test]
    fn split_name_variants() {
        assert_eq!(split_full_name(Some("ANA")), (Some("ANA".into()), None, None, None));
        assert_eq!(
            split_full_name(Some("ANA GARCIA")),
            (Some("ANA".into()), None, Some("GARCIA".into()), None)
        );
        assert_eq!(
            split_full_name(Some("ANA MARIA ISABEL GARCIA PEREZ")),
            (
                Some("ANA".into()),
                Some("MARIA ISABEL".into()),
                Some("GARCIA".into()),
                Some("PEREZ".into())
            )
        );
    }

    #[test]
    fn age_not_computed_for_future_birth_date() {
        assert_eq!(age_at(datetime(2030, 1, 1), datetime(2024, 5, 1)), None);
        assert_eq!(age_at(datetime(1990, 7, 21), datetime(2024, 5, 1)), Some(33));
        assert_eq!(age_at(datetime(1990, 5, 1), datetime(2024, 5, 1)), Some(34));
    }
}
