use std::path::PathBuf;

use crate::config::{ner_model_dir, NlpConfig};

#[cfg(feature = "onnx-ner")]
use super::model::OnnxNerModel;

/// The extraction strategy resolved once at extractor construction.
///
/// Callers never branch on which variant ran: both expose the same entity
/// stream through [`super::ClinicalEntityExtractor::extract`].
pub enum ExtractionStrategy {
    #[cfg(feature = "onnx-ner")]
    Model(Box<OnnxNerModel>),
    Heuristic,
}

impl ExtractionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "onnx-ner")]
            Self::Model(_) => "model",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Pure function of configuration and weight resolvability.
///
/// Missing weights, a disabled model, or a load failure all select the
/// heuristic strategy silently; the extractor must never fail its caller
/// over an absent model.
pub fn select_strategy(config: &NlpConfig) -> ExtractionStrategy {
    if !config.model_enabled {
        return ExtractionStrategy::Heuristic;
    }

    let model_dir = resolve_model_dir(config);

    #[cfg(feature = "onnx-ner")]
    {
        match OnnxNerModel::load(&model_dir) {
            Ok(model) => {
                tracing::info!(dir = %model_dir.display(), "Clinical NER model loaded");
                return ExtractionStrategy::Model(Box::new(model));
            }
            Err(e) => {
                tracing::warn!(
                    dir = %model_dir.display(),
                    error = %e,
                    "Clinical NER model unavailable, using heuristic extraction"
                );
            }
        }
    }

    #[cfg(not(feature = "onnx-ner"))]
    tracing::warn!(
        dir = %model_dir.display(),
        "Built without the onnx-ner feature, using heuristic extraction"
    );

    ExtractionStrategy::Heuristic
}

fn resolve_model_dir(config: &NlpConfig) -> PathBuf {
    config.model_dir.clone().unwrap_or_else(ner_model_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_model_selects_heuristic() {
        let config = NlpConfig {
            model_enabled: false,
            model_dir: None,
            local_files_only: true,
        };
        assert_eq!(select_strategy(&config).name(), "heuristic");
    }

    #[test]
    fn unresolvable_weights_fall_back_without_error() {
        let config = NlpConfig {
            model_enabled: true,
            model_dir: Some(std::path::PathBuf::from("/nonexistent/model/dir")),
            local_files_only: true,
        };
        // Must not panic or error regardless of how the crate was built.
        assert_eq!(select_strategy(&config).name(), "heuristic");
    }
}
