use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{FieldProvenance, RecordSource};

/// Patient identity as carried by every RIPS record.
///
/// Missing is modeled as None, never as an empty string, so "we could not
/// resolve a document number" stays distinguishable from "a blank value was
/// extracted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub document_type: Option<String>,
    pub document_number: Option<String>,
}

impl PatientIdentity {
    pub fn is_resolved(&self) -> bool {
        self.document_number.is_some()
    }
}

/// A value that went through multi-source resolution.
///
/// Conflicting values are never discarded silently: the losers are retained
/// with their source so the merge stays auditable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: Option<T>,
    pub source: Option<RecordSource>,
    pub discarded: Vec<DiscardedValue<T>>,
}

/// A candidate value that lost the precedence tie-break.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscardedValue<T> {
    pub value: T,
    pub source: RecordSource,
}

/// RIPS invoice header record (AF file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: Uuid,
    pub provider_code: Option<String>,
    pub provider_name: Option<String>,
    pub invoice_number: String,
    pub invoice_date: NaiveDateTime,
    pub total_value: Decimal,
    pub identity: PatientIdentity,
    pub contract_number: Option<String>,
    pub policy_number: Option<String>,
    pub copayment_value: Decimal,
    pub commission_value: Decimal,
    pub discount_value: Decimal,
}

/// RIPS user record (US file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub identity: PatientIdentity,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub age: Option<i32>,
    /// "A" years, "M" months, "D" days.
    pub age_unit: Option<String>,
    pub sex: Option<String>,
    pub department_code: Option<String>,
    pub municipality_code: Option<String>,
    pub residence_zone: Option<String>,
}

/// RIPS procedure record (AP file). One per invoice service line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub id: Uuid,
    pub identity: PatientIdentity,
    pub provider_code: Option<String>,
    pub invoice_number: String,
    pub service_date: NaiveDateTime,
    pub authorization_number: Option<String>,
    /// Positional line identifier from the invoice.
    pub service_code: Option<String>,
    pub cups_code: Option<String>,
    pub diagnosis_code: Option<String>,
    pub related_diagnosis: Option<String>,
    pub service_purpose_code: Option<String>,
    pub attention_type_code: Option<String>,
    pub copayment_value: Decimal,
    pub net_value: Decimal,
    /// False when no history/annex context matched this invoice line. The
    /// record is still built so financial totals reconcile.
    pub enriched: bool,
}

/// RIPS consultation record (AC file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub id: Uuid,
    pub identity: PatientIdentity,
    pub provider_code: Option<String>,
    pub invoice_number: String,
    pub consultation_date: NaiveDateTime,
    pub authorization_number: Option<String>,
    pub consultation_code: String,
    pub purpose_code: Option<String>,
    pub external_cause: Option<String>,
    pub principal_diagnosis: Option<String>,
    pub related_diagnosis1: Option<String>,
    pub related_diagnosis2: Option<String>,
    pub related_diagnosis3: Option<String>,
    pub diagnosis_type: Option<String>,
    pub consultation_value: Decimal,
    pub copayment_value: Decimal,
    pub net_value: Decimal,
    pub provenance: FieldProvenance,
}

/// RIPS medication record (AM file). Sourced from the annex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: Uuid,
    pub identity: PatientIdentity,
    pub provider_code: Option<String>,
    pub invoice_number: String,
    pub authorization_number: Option<String>,
    pub medication_code: String,
    pub medication_name: Option<String>,
    pub medication_type: Option<String>,
    pub pharmaceutical_form: Option<String>,
    pub concentration: Option<String>,
    pub unit_measure: Option<String>,
    pub treatment_days: Option<i32>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    pub mipres_id: Option<String>,
    pub principal_diagnosis: Option<String>,
    pub related_diagnosis: Option<String>,
    pub administration_date: Option<NaiveDateTime>,
}

/// RIPS other-services record (AT file). Sourced from the annex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherServiceRecord {
    pub id: Uuid,
    pub identity: PatientIdentity,
    pub provider_code: Option<String>,
    pub invoice_number: String,
    pub authorization_number: Option<String>,
    pub service_code: String,
    pub service_name: Option<String>,
    pub service_type: Option<String>,
    pub service_date: Option<NaiveDateTime>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    pub mipres_id: Option<String>,
    pub principal_diagnosis: Option<String>,
    pub related_diagnosis: Option<String>,
}

/// The full record set built for one invoice. Single patient, single
/// invoice: every record must carry the same identity, which is the primary
/// structural invariant the validation engine checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RipsRecordSet {
    pub invoice: InvoiceRecord,
    pub user: Option<UserRecord>,
    pub procedures: Vec<ProcedureRecord>,
    pub consultations: Vec<ConsultationRecord>,
    pub medications: Vec<MedicationRecord>,
    pub other_services: Vec<OtherServiceRecord>,
    /// The resolved identity with its source and discarded alternatives.
    pub identity: Sourced<PatientIdentity>,
}

impl RipsRecordSet {
    pub fn procedures_total(&self) -> Decimal {
        self.procedures.iter().map(|r| r.net_value).sum()
    }

    pub fn consultations_total(&self) -> Decimal {
        self.consultations.iter().map(|r| r.net_value).sum()
    }

    pub fn medications_total(&self) -> Decimal {
        self.medications.iter().map(|r| r.total_value).sum()
    }

    pub fn other_services_total(&self) -> Decimal {
        self.other_services.iter().map(|r| r.total_value).sum()
    }

    /// (record tag, id, identity) for every record in file order.
    pub fn identities(&self) -> Vec<(&'static str, Uuid, &PatientIdentity)> {
        let mut out = Vec::new();
        out.push(("AF", self.invoice.id, &self.invoice.identity));
        if let Some(user) = &self.user {
            out.push(("US", user.id, &user.identity));
        }
        for r in &self.procedures {
            out.push(("AP", r.id, &r.identity));
        }
        for r in &self.consultations {
            out.push(("AC", r.id, &r.identity));
        }
        for r in &self.medications {
            out.push(("AM", r.id, &r.identity));
        }
        for r in &self.other_services {
            out.push(("AT", r.id, &r.identity));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_identity_is_not_empty_string() {
        let identity = PatientIdentity::default();
        assert!(!identity.is_resolved());
        assert_eq!(identity.document_number, None);
    }

    #[test]
    fn sourced_default_has_no_value_and_no_audit_trail() {
        let merged: Sourced<PatientIdentity> = Sourced::default();
        assert!(merged.value.is_none());
        assert!(merged.source.is_none());
        assert!(merged.discarded.is_empty());
    }
}
