//! Single-case orchestration: invoice + history + optional annex in, case
//! report out.

use thiserror::Error;

use crate::config::RipsConfig;
use crate::pipeline::annex::AnnexNormalizer;
use crate::pipeline::builder::RecordBuilder;
use crate::pipeline::extraction::{ExtractionError, HistoryExtractor, InvoiceExtractor, ParseError};
use crate::pipeline::nlp::ClinicalEntityExtractor;
use crate::pipeline::report::CaseReport;
use crate::pipeline::validation::ValidationEngine;

/// Failures that abort a single case. Annex problems are not among them:
/// a malformed annex is dropped and processing continues without it.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("invoice extraction failed: {0}")]
    Invoice(#[from] ExtractionError),

    #[error("history extraction failed: {0}")]
    History(#[from] ParseError),
}

/// Processes one invoice + history (+ optional annex) into a [`CaseReport`].
///
/// Owns the clinical entity extractor so model weights load once and are
/// shared read-only across calls, safe for concurrent reuse.
pub struct CaseProcessor {
    config: RipsConfig,
    nlp: ClinicalEntityExtractor,
}

impl CaseProcessor {
    pub fn new(config: RipsConfig) -> Self {
        let nlp = ClinicalEntityExtractor::from_config(&config);
        Self { config, nlp }
    }

    pub fn process(
        &self,
        invoice_pdf: &[u8],
        history_pdf: &[u8],
        annex_json: Option<&str>,
    ) -> Result<CaseReport, CaseError> {
        let mut notes = Vec::new();

        let invoice = InvoiceExtractor.extract(invoice_pdf)?;
        let history = HistoryExtractor::new(&self.nlp).extract(history_pdf)?;

        let annex = match annex_json {
            Some(json) => match AnnexNormalizer.normalize(json) {
                Ok(annex) => Some(annex),
                Err(e) => {
                    tracing::warn!(error = %e, "Annex dropped, continuing without it");
                    notes.push(format!("annex dropped: {e}"));
                    None
                }
            },
            None => None,
        };

        let records = RecordBuilder::new(&invoice, &history, annex.as_ref()).build();
        let validation = ValidationEngine::new(&self.config).run(&records);

        Ok(CaseReport::assemble(
            &invoice, &history, records, &validation, notes,
        ))
    }
}
