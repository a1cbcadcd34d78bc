pub mod annex;
pub mod batch;
pub mod builder;
pub mod extraction;
pub mod nlp;
pub mod processor;
pub mod report;
pub mod validation;


pub use annex::{AnnexFormatError, AnnexNormalizer};
pub use batch::{BatchRunner, BatchSummary, DocumentPair, PairOutcome, PendingReason};
pub use builder::RecordBuilder;
pub use extraction::{ExtractionError, HistoryExtractor, InvoiceExtractor, ParseError};
pub use nlp::ClinicalEntityExtractor;
pub use processor::{CaseError, CaseProcessor};
pub use report::CaseReport;
pub use validation::ValidationEngine;
