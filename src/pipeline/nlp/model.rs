//! ONNX token-classification strategy — behind the `onnx-ner` feature.
//!
//! Expects a directory with `model.onnx` and `tokenizer.json` exporting a
//! BIO-tagged clinical NER head (O / B-DIAG / I-DIAG / B-PROC / I-PROC).

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;

use crate::models::{ClinicalEntity, EntityKind, EntitySource};

use super::heuristic::{match_cie, match_cups};
use super::NlpError;

/// Label order of the exported classification head.
const LABELS: &[&str] = &["O", "B-DIAG", "I-DIAG", "B-PROC", "I-PROC"];

/// Clinical NER model running on ONNX Runtime.
///
/// Loaded at most once per extractor; the session is wrapped in a Mutex
/// because `Session::run` needs `&mut self` while extraction exposes
/// `&self` for shared reuse.
pub struct OnnxNerModel {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl OnnxNerModel {
    /// Load model weights and tokenizer from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, NlpError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(NlpError::ModelNotFound(model_path));
        }
        if !tokenizer_path.exists() {
            return Err(NlpError::ModelNotFound(tokenizer_path));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| NlpError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| NlpError::ModelInit(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| NlpError::ModelInit(format!("ONNX load failed: {e}")))?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| NlpError::ModelInit(format!("Tokenizer load failed: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Run token classification and aggregate BIO spans into entities.
    /// Entities below `confidence_floor` are dropped.
    pub fn infer(
        &self,
        text: &str,
        confidence_floor: f32,
    ) -> Result<Vec<ClinicalEntity>, NlpError> {
        use ort::value::TensorRef;

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| NlpError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = input_ids.len();

        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| NlpError::Inference(e.to_string()))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask)
            .map_err(|e| NlpError::Inference(e.to_string()))?;

        let ids_tensor = TensorRef::from_array_view(&ids_array)
            .map_err(|e| NlpError::Inference(e.to_string()))?;
        let mask_tensor = TensorRef::from_array_view(&mask_array)
            .map_err(|e| NlpError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| NlpError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor])
            .map_err(|e| NlpError::Inference(format!("ONNX inference failed: {e}")))?;

        // Logits shape: [1, seq_len, |LABELS|]
        let (shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| NlpError::Inference(format!("Output extraction: {e}")))?;

        if shape.len() != 3 || shape[2] as usize != LABELS.len() {
            return Err(NlpError::Inference(format!(
                "Unexpected output shape {shape:?}, expected [1, {seq_len}, {}]",
                LABELS.len()
            )));
        }

        let offsets = encoding.get_offsets();
        let entities = aggregate_bio_spans(text, logits, seq_len, offsets)
            .into_iter()
            .filter(|e| e.confidence >= confidence_floor)
            .collect();
        Ok(entities)
    }
}

/// Collapse per-token BIO predictions into entity spans with averaged
/// confidence.
fn aggregate_bio_spans(
    text: &str,
    logits: &[f32],
    seq_len: usize,
    offsets: &[(usize, usize)],
) -> Vec<ClinicalEntity> {
    let mut entities = Vec::new();
    let mut current: Option<(EntityKind, usize, usize, f32, usize)> = None;

    for token_idx in 0..seq_len {
        let row = &logits[token_idx * LABELS.len()..(token_idx + 1) * LABELS.len()];
        let (label_idx, prob) = softmax_argmax(row);
        let (start, end) = offsets.get(token_idx).copied().unwrap_or((0, 0));
        // Special tokens carry empty offsets.
        let is_special = start == 0 && end == 0 && token_idx != 0;

        let label = LABELS[label_idx];
        let continues = matches!(
            (&current, label),
            (Some((EntityKind::Diagnosis, ..)), "I-DIAG") | (Some((EntityKind::Procedure, ..)), "I-PROC")
        );

        if continues && !is_special {
            if let Some((_, _, span_end, prob_sum, count)) = current.as_mut() {
                *span_end = end;
                *prob_sum += prob;
                *count += 1;
            }
            continue;
        }

        if let Some(done) = current.take() {
            push_entity(&mut entities, text, done);
        }

        if !is_special {
            match label {
                "B-DIAG" => current = Some((EntityKind::Diagnosis, start, end, prob, 1)),
                "B-PROC" => current = Some((EntityKind::Procedure, start, end, prob, 1)),
                _ => {}
            }
        }
    }

    if let Some(done) = current.take() {
        push_entity(&mut entities, text, done);
    }
    entities
}

fn push_entity(
    entities: &mut Vec<ClinicalEntity>,
    text: &str,
    (kind, start, end, prob_sum, count): (EntityKind, usize, usize, f32, usize),
) {
    if end <= start || end > text.len() {
        return;
    }
    let mention = text[start..end].to_string();
    let code = match kind {
        EntityKind::Diagnosis => match_cie(&mention),
        EntityKind::Procedure => match_cups(&mention),
    };
    entities.push(ClinicalEntity {
        kind,
        code,
        text: mention,
        confidence: prob_sum / count as f32,
        source: EntitySource::Model,
        span: (start, end),
    });
}

fn softmax_argmax(row: &[f32]) -> (usize, f32) {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    let (idx, value) = exp
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap_or((0, &1.0));
    (idx, value / sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bio_spans_aggregate_into_entities() {
        // Two tokens tagged B-DIAG/I-DIAG over "J18.9", one O token.
        let text = "J18.9 neumonia";
        let logits = [
            // B-DIAG strongly
            0.0, 8.0, 0.0, 0.0, 0.0, //
            // I-DIAG strongly
            0.0, 0.0, 8.0, 0.0, 0.0, //
            // O
            8.0, 0.0, 0.0, 0.0, 0.0,
        ];
        let offsets = [(0, 3), (3, 5), (6, 14)];
        let entities = aggregate_bio_spans(text, &logits, 3, &offsets);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].kind, EntityKind::Diagnosis);
        assert_eq!(entities[0].text, "J18.9");
        assert_eq!(entities[0].code.as_deref(), Some("J18.9"));
        assert!(entities[0].confidence > 0.9);
    }

    #[test]
    fn missing_weights_report_model_not_found() {
        let err = OnnxNerModel::load(Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, NlpError::ModelNotFound(_)));
    }

    #[test]
    fn softmax_argmax_picks_dominant_label() {
        let (idx, prob) = softmax_argmax(&[0.0, 10.0, 0.0, 0.0, 0.0]);
        assert_eq!(idx, 1);
        assert!(prob > 0.99);
    }
}
