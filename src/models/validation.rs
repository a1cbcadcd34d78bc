use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Severity;

/// One finding produced by a validation rule.
///
/// Findings are data, not control flow: the engine reports them, it never
/// raises them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: Severity,
    /// Stable rule code ("DOC001", "TOT001", ...).
    pub code: String,
    pub message: String,
    pub affected_record_ids: Vec<Uuid>,
}

impl ValidationFinding {
    pub fn new(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
            affected_record_ids: vec![],
        }
    }

    pub fn with_records(mut self, ids: Vec<Uuid>) -> Self {
        self.affected_record_ids = ids;
        self
    }
}

/// The ordered findings of a full validation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationReport {
    pub fn from_findings(findings: Vec<ValidationFinding>) -> Self {
        let error_count = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warning_count = findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
        Self {
            findings,
            error_count,
            warning_count,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_by_severity() {
        let report = ValidationReport::from_findings(vec![
            ValidationFinding::new(Severity::Error, "DOC001", "identity mismatch"),
            ValidationFinding::new(Severity::Warning, "TOT001", "totals differ"),
            ValidationFinding::new(Severity::Info, "VAL000", "clean"),
        ]);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn info_only_report_is_clean() {
        let report = ValidationReport::from_findings(vec![ValidationFinding::new(
            Severity::Info,
            "VAL000",
            "clean",
        )]);
        assert!(report.is_clean());
    }
}
