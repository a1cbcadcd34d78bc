//! The individual validation rules. Each rule is a pure function over the
//! record set producing zero or more findings; none of them can abort a
//! run.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{RipsRecordSet, Severity, ValidationFinding};

/// Expected shape of a CUPS procedure code: 4-7 digits, optional check
/// digit.
static CUPS_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,7}(?:-[0-9])?$").unwrap());

/// DOC001 (error): conflicting identities across records.
/// DOC002 (warning): records with no patient identity at all.
pub fn check_identity_consistency(set: &RipsRecordSet) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    let target = set.identity.value.as_ref();

    let mut mismatched = Vec::new();
    let mut missing = Vec::new();
    for (tag, id, identity) in set.identities() {
        match (target, identity.document_number.as_deref()) {
            (Some(target), Some(_)) if identity != target => mismatched.push((tag, id)),
            (_, None) => missing.push(id),
            _ => {}
        }
    }

    if !mismatched.is_empty() {
        let detail: Vec<String> = mismatched.iter().map(|(tag, _)| tag.to_string()).collect();
        findings.push(
            ValidationFinding::new(
                Severity::Error,
                "DOC001",
                format!(
                    "patient identity differs across records ({})",
                    detail.join(", ")
                ),
            )
            .with_records(mismatched.into_iter().map(|(_, id)| id).collect()),
        );
    }

    if !missing.is_empty() {
        findings.push(
            ValidationFinding::new(
                Severity::Warning,
                "DOC002",
                format!("missing patient identity on {} record(s)", missing.len()),
            )
            .with_records(missing),
        );
    }

    findings
}

/// TOT001 (warning): authoritative record total drifts from the invoice
/// total beyond the tolerance. TOT002 (info): AC/AM/AT values present next
/// to AP. Informational: they are not double-counted.
pub fn check_value_reconciliation(
    set: &RipsRecordSet,
    tolerance: Decimal,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    let procedures_total = set.procedures_total();
    let extras_total =
        set.consultations_total() + set.medications_total() + set.other_services_total();

    let authoritative = if procedures_total > Decimal::ZERO {
        if extras_total > Decimal::ZERO {
            findings.push(ValidationFinding::new(
                Severity::Info,
                "TOT002",
                "AC/AM/AT values present alongside AP; procedure records drive reconciliation",
            ));
        }
        procedures_total
    } else {
        extras_total
    };

    let difference = set.invoice.total_value - authoritative;
    if difference.abs() > tolerance {
        findings.push(
            ValidationFinding::new(
                Severity::Warning,
                "TOT001",
                format!(
                    "invoice total ({}) differs from record total ({}) by {}",
                    set.invoice.total_value, authoritative, difference
                ),
            )
            .with_records(vec![set.invoice.id]),
        );
    }

    findings
}

/// DX001 (warning): no record in the set carries a principal diagnosis.
pub fn check_diagnosis_presence(set: &RipsRecordSet) -> Vec<ValidationFinding> {
    let any_diagnosis = set.procedures.iter().any(|r| r.diagnosis_code.is_some())
        || set.consultations.iter().any(|r| r.principal_diagnosis.is_some())
        || set.medications.iter().any(|r| r.principal_diagnosis.is_some())
        || set.other_services.iter().any(|r| r.principal_diagnosis.is_some());

    if any_diagnosis {
        return vec![];
    }
    vec![ValidationFinding::new(
        Severity::Warning,
        "DX001",
        "no principal diagnosis present on the record set",
    )]
}

/// CUPS001 (warning): the set carries no procedure code at all.
pub fn check_procedure_code_presence(set: &RipsRecordSet) -> Vec<ValidationFinding> {
    let any_code = set
        .procedures
        .iter()
        .any(|r| r.cups_code.as_deref().is_some_and(|c| !c.is_empty()));
    if any_code {
        return vec![];
    }
    vec![ValidationFinding::new(
        Severity::Warning,
        "CUPS001",
        "no procedure codes present on the record set",
    )]
}

/// CUPS002 (error): procedure codes that do not look like CUPS codes.
pub fn check_code_format(set: &RipsRecordSet) -> Vec<ValidationFinding> {
    let offenders: Vec<_> = set
        .procedures
        .iter()
        .filter(|r| {
            r.cups_code
                .as_deref()
                .is_some_and(|code| !CUPS_FORMAT.is_match(code))
        })
        .collect();

    if offenders.is_empty() {
        return vec![];
    }
    let codes: Vec<String> = offenders
        .iter()
        .filter_map(|r| r.cups_code.clone())
        .collect();
    vec![ValidationFinding::new(
        Severity::Error,
        "CUPS002",
        format!("malformed procedure codes: {}", codes.join(", ")),
    )
    .with_records(offenders.into_iter().map(|r| r.id).collect())]
}
