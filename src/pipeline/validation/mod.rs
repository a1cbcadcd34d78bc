//! Validation engine for built RIPS record sets.
//!
//! A state-machine-free rule list: every rule always runs against the full
//! record set, so one pass surfaces every problem at once. Findings are
//! returned as data; the engine never raises for data quality.

pub mod rules;

use crate::config::RipsConfig;
use crate::models::{RipsRecordSet, Severity, ValidationFinding, ValidationReport};

pub struct ValidationEngine {
    config: RipsConfig,
}

impl ValidationEngine {
    pub fn new(config: &RipsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Run every rule, in report order, and aggregate the findings.
    /// Deterministic: the same set always yields the same report.
    pub fn run(&self, set: &RipsRecordSet) -> ValidationReport {
        let mut findings: Vec<ValidationFinding> = Vec::new();
        findings.extend(rules::check_identity_consistency(set));
        findings.extend(rules::check_value_reconciliation(
            set,
            self.config.value_tolerance,
        ));
        findings.extend(rules::check_diagnosis_presence(set));
        findings.extend(rules::check_procedure_code_presence(set));
        findings.extend(rules::check_code_format(set));

        if findings.is_empty() {
            findings.push(ValidationFinding::new(
                Severity::Info,
                "VAL000",
                "records validated without inconsistencies",
            ));
        }

        let report = ValidationReport::from_findings(findings);
        tracing::info!(
            errors = report.error_count,
            warnings = report.warning_count,
            findings = report.findings.len(),
            "Validation complete"
        );
        report
    }
}
