use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

/// Application-level constants
pub const APP_NAME: &str = "ripsgen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Currency assumed for invoices when none is stated.
pub const DEFAULT_CURRENCY: &str = "COP";

/// Document type assumed when no source supplies one.
pub const DEFAULT_DOCUMENT_TYPE: &str = "CC";

/// Tunable parameters for extraction, reconciliation and validation.
///
/// The thresholds are configuration, not constants: the reconciliation
/// tolerance and the heuristic confidence were calibrated against a labeled
/// invoice set and may need re-tuning per provider.
#[derive(Debug, Clone)]
pub struct RipsConfig {
    /// Maximum absolute difference tolerated between the invoice total and
    /// the summed record values before a reconciliation warning fires.
    pub value_tolerance: Decimal,
    /// Confidence assigned to every heuristic (regex) entity match.
    /// Must stay below `model_confidence_floor` so model output always
    /// outranks heuristics during merge.
    pub heuristic_confidence: f32,
    /// Minimum confidence a model-sourced entity needs to be emitted.
    pub model_confidence_floor: f32,
    /// Wall-clock budget for one invoice+history pair in batch mode.
    pub pair_budget: Duration,
    /// NLP strategy selection.
    pub nlp: NlpConfig,
}

impl Default for RipsConfig {
    fn default() -> Self {
        Self {
            // One peso: absorbs per-line rounding without hiding real gaps.
            value_tolerance: Decimal::ONE,
            heuristic_confidence: 0.35,
            model_confidence_floor: 0.50,
            pair_budget: Duration::from_secs(60),
            nlp: NlpConfig::default(),
        }
    }
}

/// Configuration for the clinical entity extractor's model strategy.
#[derive(Debug, Clone)]
pub struct NlpConfig {
    /// When false the model strategy is never attempted.
    pub model_enabled: bool,
    /// Directory holding `model.onnx` + `tokenizer.json`. None means the
    /// default models directory.
    pub model_dir: Option<PathBuf>,
    /// When true, never fetch weights over the network; unresolvable local
    /// weights silently select the heuristic strategy.
    pub local_files_only: bool,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            model_enabled: false,
            model_dir: None,
            local_files_only: true,
        }
    }
}

/// Get the application data directory (~/.ripsgen)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".ripsgen")
}

/// Get the models directory (ONNX clinical NER weights)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Get the clinical NER model directory
pub fn ner_model_dir() -> PathBuf {
    models_dir().join("clinical-ner-es")
}
