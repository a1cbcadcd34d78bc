use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Matches, Regex};

use crate::models::{ClinicalEntity, EntityKind, EntitySource};

/// CIE-10 diagnosis code: letter (U excluded), two digits, optional
/// subcategory ("J18", "A09.9", "S52.5").
static CIE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-TV-Z][0-9]{2}(?:\.[0-9A-Z])?)\b").unwrap());

/// CUPS procedure code: 4 to 7 digits with an optional check digit.
static CUPS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4,7}(?:-[0-9])?)\b").unwrap());

/// A bare number only counts as a procedure when its surroundings talk
/// about one.
const PROCEDURE_KEYWORDS: &[&str] = &[
    "procedimiento",
    "sutura",
    "curación",
    "curacion",
    "infiltración",
    "infiltracion",
    "aplicación",
    "aplicacion",
    "vacunación",
    "vacunacion",
    "consulta",
    "terapia",
];

/// Half-width of the context window inspected around a CUPS candidate.
const CONTEXT_WINDOW: usize = 80;

/// Lazy entity stream over the heuristic regexes. Restartable: every call
/// to [`heuristic_entities`] walks the text from the start again.
pub struct HeuristicEntities<'t> {
    text: &'t str,
    confidence: f32,
    diagnoses: Matches<'static, 't>,
    procedures: Matches<'static, 't>,
    seen_codes: HashSet<String>,
    diagnoses_done: bool,
}

/// Iterate diagnosis codes first, then keyword-supported procedure codes.
pub fn heuristic_entities(text: &str, confidence: f32) -> HeuristicEntities<'_> {
    HeuristicEntities {
        text,
        confidence,
        diagnoses: CIE_PATTERN.find_iter(text),
        procedures: CUPS_PATTERN.find_iter(text),
        seen_codes: HashSet::new(),
        diagnoses_done: false,
    }
}

impl Iterator for HeuristicEntities<'_> {
    type Item = ClinicalEntity;

    fn next(&mut self) -> Option<ClinicalEntity> {
        if !self.diagnoses_done {
            for found in self.diagnoses.by_ref() {
                let code = found.as_str().to_string();
                if !self.seen_codes.insert(code.clone()) {
                    continue;
                }
                return Some(ClinicalEntity {
                    kind: EntityKind::Diagnosis,
                    code: Some(code),
                    text: found.as_str().to_string(),
                    confidence: self.confidence,
                    source: EntitySource::Heuristic,
                    span: (found.start(), found.end()),
                });
            }
            self.diagnoses_done = true;
            self.seen_codes.clear();
        }

        for found in self.procedures.by_ref() {
            let code = found.as_str().to_string();
            if self.seen_codes.contains(&code) {
                continue;
            }
            let window = context_window(self.text, found.start(), found.end());
            if !looks_like_procedure(window) {
                continue;
            }
            self.seen_codes.insert(code.clone());
            return Some(ClinicalEntity {
                kind: EntityKind::Procedure,
                code: Some(code),
                text: window.trim().to_string(),
                confidence: self.confidence,
                source: EntitySource::Heuristic,
                span: (found.start(), found.end()),
            });
        }
        None
    }
}

/// First CIE-10 code inside `text`, if any. Shared with the model strategy
/// to normalize mention text into a code.
pub fn match_cie(text: &str) -> Option<String> {
    CIE_PATTERN.captures(text).map(|caps| caps[1].to_string())
}

/// First CUPS code inside `text`, if any.
pub fn match_cups(text: &str) -> Option<String> {
    CUPS_PATTERN.captures(text).map(|caps| caps[1].to_string())
}

pub fn looks_like_procedure(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROCEDURE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Byte window around a match, clamped to char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let mut lo = start.saturating_sub(CONTEXT_WINDOW);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_WINDOW).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "Paciente con diagnóstico J18.9 neumonía. Se realiza procedimiento \
                        de sutura 998511 sin complicaciones. Control con código A09.";

    #[test]
    fn finds_cie_codes_as_diagnoses() {
        let codes: Vec<_> = heuristic_entities(NOTE, 0.35)
            .filter(|e| e.is_diagnosis())
            .filter_map(|e| e.code)
            .collect();
        assert_eq!(codes, vec!["J18.9", "A09"]);
    }

    #[test]
    fn cups_requires_procedure_context() {
        let entities: Vec<_> = heuristic_entities(NOTE, 0.35)
            .filter(|e| e.is_procedure())
            .collect();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].code.as_deref(), Some("998511"));

        let no_context = "factura numero 998511 valor total";
        assert_eq!(heuristic_entities(no_context, 0.35).filter(|e| e.is_procedure()).count(), 0);
    }

    #[test]
    fn duplicate_codes_emitted_once() {
        let text = "J18.9 y de nuevo J18.9";
        assert_eq!(heuristic_entities(text, 0.35).count(), 1);
    }

    #[test]
    fn all_entities_are_heuristic_sourced_with_fixed_confidence() {
        for entity in heuristic_entities(NOTE, 0.35) {
            assert_eq!(entity.source, crate::models::EntitySource::Heuristic);
            assert!((entity.confidence - 0.35).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn restartable_sequence() {
        let first: Vec<_> = heuristic_entities(NOTE, 0.35).map(|e| e.code).collect();
        let second: Vec<_> = heuristic_entities(NOTE, 0.35).map(|e| e.code).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn spans_point_into_source_text() {
        for entity in heuristic_entities(NOTE, 0.35).filter(|e| e.is_diagnosis()) {
            let (start, end) = entity.span;
            assert_eq!(&NOTE[start..end], entity.code.as_deref().unwrap());
        }
    }
}
