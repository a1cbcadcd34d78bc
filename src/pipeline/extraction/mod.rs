//! Field and table extraction from PDF invoices and clinical histories.
//!
//! Both extractors are pure transforms over the embedded text layer: PDF
//! bytes in, typed info out. Scanned images are out of scope; a PDF with
//! no text layer simply extracts to nothing and fails on the mandatory
//! fields.

pub mod dates;
pub mod history;
pub mod invoice;
pub mod numeric;
pub mod pdf;
pub mod table;

pub use history::HistoryExtractor;
pub use invoice::InvoiceExtractor;
pub use pdf::{extract_document_text, PdfExtractor, PdfTextExtractor};

use thiserror::Error;

/// Unparseable invoice structure. Fatal for that document only; a batch
/// keeps going.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("no recognizable invoice header or service table")]
    InvoiceLayoutUnrecognized,

    #[error("invoice issue date not found")]
    IssueDateNotFound,
}

/// Mandatory history field absent. The patient document number is the one
/// field the history extractor refuses to degrade on; everything else
/// becomes None and is left to annex enrichment or manual review.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("no patient document number found in history text")]
    DocumentNumberNotFound,
}
