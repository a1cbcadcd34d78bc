//! Batch processing of many invoice/history pairs.
//!
//! One task per pair, no shared mutable state: a failure in one pair never
//! aborts the others, and the summary reports every pair's status so a
//! partially successful run still yields a complete picture.

pub mod runner;

pub use runner::BatchRunner;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::report::CaseReport;

/// Why a pair could not be processed yet. Pending is not failure: the
/// missing input is expected to appear (or be supplied manually) later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    MissingInvoice,
    MissingHistory,
    MissingAnnex,
}

impl PendingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingInvoice => "missing_invoice",
            Self::MissingHistory => "missing_history",
            Self::MissingAnnex => "missing_annex",
        }
    }
}

/// One unit of batch work: the files belonging to a single invoice.
/// The annex path is optional enrichment; a listed-but-unreadable annex
/// parks the pair as pending instead of silently under-building records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPair {
    pub label: String,
    pub invoice_pdf: Option<PathBuf>,
    pub history_pdf: Option<PathBuf>,
    pub annex_json: Option<PathBuf>,
}

/// Terminal status of one pair.
#[derive(Debug, Serialize, Deserialize)]
pub enum PairOutcome {
    Completed(Box<CaseReport>),
    Pending(PendingReason),
    Failed(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PairResult {
    pub label: String,
    pub outcome: PairOutcome,
    pub duration_ms: u64,
}

/// Aggregated results of a batch run, in submission order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub results: Vec<PairResult>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Completed(_)))
    }

    pub fn pending(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Pending(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PairOutcome::Failed(_)))
    }

    fn count(&self, predicate: fn(&PairOutcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|r| predicate(&r.outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_outcome() {
        let summary = BatchSummary {
            results: vec![
                PairResult {
                    label: "FERO1".into(),
                    outcome: PairOutcome::Pending(PendingReason::MissingInvoice),
                    duration_ms: 0,
                },
                PairResult {
                    label: "FERO2".into(),
                    outcome: PairOutcome::Failed("boom".into()),
                    duration_ms: 12,
                },
            ],
        };
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.completed(), 0);
        assert_eq!(summary.pending(), 1);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn pending_reason_codes_are_stable() {
        assert_eq!(PendingReason::MissingInvoice.as_str(), "missing_invoice");
        assert_eq!(PendingReason::MissingHistory.as_str(), "missing_history");
        assert_eq!(PendingReason::MissingAnnex.as_str(), "missing_annex");
    }
}
