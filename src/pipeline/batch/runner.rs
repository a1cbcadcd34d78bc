use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RipsConfig;
use crate::pipeline::processor::CaseProcessor;

use super::{BatchSummary, DocumentPair, PairOutcome, PairResult, PendingReason};

/// Runs pairs concurrently, one task each, collecting per-pair results.
///
/// The case processor is shared read-only across tasks so model weights
/// load once for the whole batch. No ordering is guaranteed between pairs;
/// results are reported in submission order.
pub struct BatchRunner {
    config: RipsConfig,
}

impl BatchRunner {
    pub fn new(config: RipsConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, pairs: Vec<DocumentPair>) -> BatchSummary {
        let processor = Arc::new(CaseProcessor::new(self.config.clone()));
        let budget = self.config.pair_budget;

        let handles: Vec<_> = pairs
            .into_iter()
            .map(|pair| {
                let processor = Arc::clone(&processor);
                tokio::spawn(process_pair(processor, pair, budget))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => results.push(PairResult {
                    label: String::from("unknown"),
                    outcome: PairOutcome::Failed(format!("task panicked: {e}")),
                    duration_ms: 0,
                }),
            }
        }

        let summary = BatchSummary { results };
        tracing::info!(
            total = summary.total(),
            completed = summary.completed(),
            pending = summary.pending(),
            failed = summary.failed(),
            "Batch run complete"
        );
        summary
    }
}

async fn process_pair(
    processor: Arc<CaseProcessor>,
    pair: DocumentPair,
    budget: Duration,
) -> PairResult {
    let start = Instant::now();
    let label = pair.label.clone();
    let outcome = run_pair(processor, pair, budget).await;

    if let PairOutcome::Failed(reason) = &outcome {
        tracing::warn!(label = %label, reason = %reason, "Pair failed");
    }

    PairResult {
        label,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

async fn run_pair(
    processor: Arc<CaseProcessor>,
    pair: DocumentPair,
    budget: Duration,
) -> PairOutcome {
    let Some(invoice_path) = pair.invoice_pdf else {
        return PairOutcome::Pending(PendingReason::MissingInvoice);
    };
    let Ok(invoice_bytes) = tokio::fs::read(&invoice_path).await else {
        return PairOutcome::Pending(PendingReason::MissingInvoice);
    };

    let Some(history_path) = pair.history_pdf else {
        return PairOutcome::Pending(PendingReason::MissingHistory);
    };
    let Ok(history_bytes) = tokio::fs::read(&history_path).await else {
        return PairOutcome::Pending(PendingReason::MissingHistory);
    };

    let annex_json = match &pair.annex_json {
        None => None,
        Some(path) => match tokio::fs::read_to_string(path).await {
            Ok(content) => Some(content),
            Err(_) => return PairOutcome::Pending(PendingReason::MissingAnnex),
        },
    };

    // PDF parsing can go pathological on malformed inputs; the budget
    // bounds it and a blown budget is recorded, never retried.
    let work = tokio::task::spawn_blocking(move || {
        processor.process(&invoice_bytes, &history_bytes, annex_json.as_deref())
    });

    match tokio::time::timeout(budget, work).await {
        Err(_) => PairOutcome::Failed("processing budget exceeded".into()),
        Ok(Err(join_error)) => PairOutcome::Failed(format!("task aborted: {join_error}")),
        Ok(Ok(Ok(report))) => PairOutcome::Completed(Box::new(report)),
        Ok(Ok(Err(case_error))) => PairOutcome::Failed(case_error.to_string()),
    }
}
