//! Hybrid clinical entity extraction.
//!
//! Two interchangeable strategies behind one facade: an ONNX
//! token-classification model (feature `onnx-ner`) and a regex/keyword
//! heuristic. The strategy is picked once from configuration and weight
//! resolvability; callers always get the same lazy entity stream and never
//! see a failure caused by a missing model.

pub mod heuristic;
#[cfg(feature = "onnx-ner")]
pub mod model;
pub mod strategy;

pub use strategy::{select_strategy, ExtractionStrategy};

use std::path::PathBuf;

use thiserror::Error;

use crate::config::RipsConfig;
use crate::models::ClinicalEntity;

use heuristic::{heuristic_entities, HeuristicEntities};

/// Internal NLP failures. These never reach extraction callers: any model
/// error degrades to the heuristic strategy.
#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Model weights not found at: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Extracts diagnosis/procedure candidates from free clinical text.
///
/// Model weights load at most once, at construction, and are shared
/// read-only across every subsequent call.
pub struct ClinicalEntityExtractor {
    strategy: ExtractionStrategy,
    heuristic_confidence: f32,
    #[cfg_attr(not(feature = "onnx-ner"), allow(dead_code))]
    model_confidence_floor: f32,
}

impl ClinicalEntityExtractor {
    pub fn from_config(config: &RipsConfig) -> Self {
        Self {
            strategy: select_strategy(&config.nlp),
            heuristic_confidence: config.heuristic_confidence,
            model_confidence_floor: config.model_confidence_floor,
        }
    }

    /// Which strategy answers extraction calls ("model" or "heuristic").
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// A finite, restartable entity sequence over `text`.
    ///
    /// Infallible toward the caller: when the model strategy raises, the
    /// call logs and re-answers heuristically for this text.
    pub fn extract<'t>(&'t self, text: &'t str) -> EntityStream<'t> {
        match &self.strategy {
            #[cfg(feature = "onnx-ner")]
            ExtractionStrategy::Model(model) => {
                match model.infer(text, self.model_confidence_floor) {
                    Ok(entities) => EntityStream::Model(entities.into_iter()),
                    Err(e) => {
                        tracing::warn!(error = %e, "Model extraction failed, answering heuristically");
                        EntityStream::Heuristic(heuristic_entities(text, self.heuristic_confidence))
                    }
                }
            }
            ExtractionStrategy::Heuristic => {
                EntityStream::Heuristic(heuristic_entities(text, self.heuristic_confidence))
            }
        }
    }
}

/// The uniform entity sequence both strategies produce.
pub enum EntityStream<'t> {
    Heuristic(HeuristicEntities<'t>),
    Model(std::vec::IntoIter<ClinicalEntity>),
}

impl Iterator for EntityStream<'_> {
    type Item = ClinicalEntity;

    fn next(&mut self) -> Option<ClinicalEntity> {
        match self {
            Self::Heuristic(inner) => inner.next(),
            Self::Model(inner) => inner.next(),
        }
    }
}
