//! ripsgen — RIPS record extraction and reconciliation.
//!
//! Turns semi-structured PDF invoices and clinical histories, plus an
//! optional FEV RIPS annex, into validated RIPS record sets:
//!
//! ```text
//! invoice PDF ─┐
//! history PDF ─┼─► extractors ─► RecordBuilder ─► ValidationEngine ─► CaseReport
//! annex JSON ──┘        │
//!                       └─ ClinicalEntityExtractor (model | heuristic fallback)
//! ```
//!
//! Extraction is a pure transform over embedded PDF text (no OCR). The
//! record builder never fails: it produces a best-effort set and defers
//! data-quality problems to the validation engine, whose findings are data,
//! not control flow.

pub mod config;
pub mod models;
pub mod pipeline;

pub use config::{NlpConfig, RipsConfig};
pub use models::{
    AnnexInfo, ClinicalEntity, HistoryInfo, InvoiceInfo, RipsRecordSet, ValidationFinding,
    ValidationReport,
};
pub use pipeline::{
    AnnexNormalizer, BatchRunner, CaseError, CaseProcessor, CaseReport, ClinicalEntityExtractor,
    HistoryExtractor, InvoiceExtractor, RecordBuilder, ValidationEngine,
};
