use serde::{Deserialize, Serialize};

use super::enums::{EntityKind, EntitySource};

/// A candidate diagnosis or procedure mention found in free text.
///
/// Entities are ephemeral: the history extractor consumes them immediately
/// to fill gaps deterministic parsing left open, and they are never
/// persisted on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalEntity {
    pub kind: EntityKind,
    /// Normalized code (CIE-10 for diagnoses, CUPS for procedures) when one
    /// could be read out of the mention.
    pub code: Option<String>,
    /// The mention as it appears in the source text.
    pub text: String,
    /// In [0, 1]. Heuristic matches carry a fixed confidence strictly below
    /// any model match.
    pub confidence: f32,
    pub source: EntitySource,
    /// Character span in the source text the entity was derived from.
    pub span: (usize, usize),
}

impl ClinicalEntity {
    pub fn is_diagnosis(&self) -> bool {
        self.kind == EntityKind::Diagnosis
    }

    pub fn is_procedure(&self) -> bool {
        self.kind == EntityKind::Procedure
    }
}
