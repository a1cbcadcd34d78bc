use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::models::{ConsultationInfo, EntitySource, FieldProvenance, HistoryInfo};
use crate::pipeline::nlp::ClinicalEntityExtractor;

use super::dates::parse_datetime;
use super::pdf::extract_document_text;
use super::ParseError;

static DOC_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Identificaci[oó]n:\s*([A-Z]{1,4})\s*-?\s*([0-9A-Za-z-]+)").unwrap()
});
/// Header band: "CC 1232835680 - APELLIDOS NOMBRES".
static DOC_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(CC|TI|RC|CE|PA|NUIP|MS)\s*-?\s*([0-9A-Za-z-]{4,})\s*-\s*[A-ZÁÉÍÓÚÑ]").unwrap()
});
static DOC_ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(CC|TI|RC|CE|PA|NUIP|MS)\s*-?\s*([0-9A-Za-z-]{4,})\b").unwrap()
});
static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Nombre:\s*([A-ZÁÉÍÓÚÑ0-9 .,'?-]+)").unwrap());
static ADMISSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Atenci[oó]n:\s*([0-9A-Za-z-]+)").unwrap());
static ADMISSION_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Fecha y Hora de Ingreso:\s*([0-9/: -]+)").unwrap());
static DISCHARGE_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Cierre Historia\s*Fecha y Hora:\s*([0-9/: -]+)").unwrap());
static SERVICE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Servicio de ingreso:\s*([A-Za-zÁÉÍÓÚÑ/ ]+)").unwrap());
static DXP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DXP:\s*([A-Z0-9]{3,6})").unwrap());
static DXR_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DXR:\s*([A-Z][0-9]{2}(?:\.[0-9A-Z])?)").unwrap());
static DX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DX DIAGNOSTICOS:\s*([A-ZÁÉÍÓÚÑ0-9 ,./-]+)").unwrap()
});
static DX_LINE_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Diagn[oó]stico(?: Principal)?:\s*([A-ZÁÉÍÓÚÑ0-9 ,./-]+)").unwrap()
});
static PURPOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Finalidad:\s*([A-Za-zÁÉÍÓÚÑ ]+)").unwrap());
static TRIAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Triage\s*(I{1,3}|IV|V)").unwrap());
static SECTION_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Fecha y Hora:\s*([0-9/: -]+)").unwrap());
static AUTHORIZATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Autorizaci[oó]n:\s*([A-Za-z0-9-]+)").unwrap());
static CONSULTATION_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Tipo de Consulta:\s*\(([0-9A-Za-z]+)\)\s*([^\n]+)").unwrap()
});
/// Service blocks: "Cod: 993520 Nomb: VACUNA ... Cant:/DXP:/DXR:/Descripción:".
static COD_NOMB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Cod:\s*([A-Z0-9]+)\s+Nomb:\s*(.+?)(?:\s+Cant:|\s+DXP:|\s+DXR:|\s+Descripción:)")
        .unwrap()
});

/// Extracts clinical data from a history PDF.
///
/// Deterministic label matching first; when the principal diagnosis or the
/// procedure blocks cannot be located, the clinical entity extractor fills
/// the gaps from the unstructured narrative, tagged with its provenance.
pub struct HistoryExtractor<'a> {
    nlp: &'a ClinicalEntityExtractor,
}

impl<'a> HistoryExtractor<'a> {
    pub fn new(nlp: &'a ClinicalEntityExtractor) -> Self {
        Self { nlp }
    }

    /// Extract from raw PDF bytes.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<HistoryInfo, ParseError> {
        let text =
            extract_document_text(pdf_bytes).map_err(|e| ParseError::PdfParsing(e.to_string()))?;
        self.extract_from_text(&text)
    }

    /// Extract from already-recovered PDF text. Fails only when no patient
    /// document number can be located.
    pub fn extract_from_text(&self, text: &str) -> Result<HistoryInfo, ParseError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let normalized = lines.join("\n");

        let (document_type, document_number) =
            extract_document_info(&normalized).ok_or(ParseError::DocumentNumberNotFound)?;

        let service_type = first_match(&SERVICE_TYPE, &normalized);
        let (diagnosis_code, diagnosis_text) = extract_diagnosis(&normalized);
        let mut consultations = extract_consultations(&normalized);

        let mut info = HistoryInfo {
            document_type: Some(document_type),
            document_number: Some(document_number),
            full_name: extract_full_name(&lines, &normalized),
            admission_id: first_match(&ADMISSION_ID, &normalized),
            admission_datetime: extract_datetime(&ADMISSION_AT, &normalized),
            discharge_datetime: extract_datetime(&DISCHARGE_AT, &normalized),
            entry_service: extract_entry_service(&lines, service_type.clone()),
            service_type,
            principal_diagnosis_text: diagnosis_text,
            principal_diagnosis_code: diagnosis_code,
            secondary_diagnosis_codes: extract_secondary_codes(&normalized),
            service_purpose: first_match(&PURPOSE, &normalized),
            triage_level: first_match(&TRIAGE, &normalized),
            consultations: vec![],
            diagnosis_provenance: FieldProvenance::Deterministic,
        };

        // NLP fallback: only over the gaps deterministic parsing left open.
        if info.principal_diagnosis_code.is_none() {
            self.fill_diagnosis_from_narrative(&mut info, text);
        }
        if consultations.is_empty() {
            consultations = self.consultations_from_narrative(text);
        }
        info.consultations = consultations;

        tracing::debug!(
            document_number = ?info.document_number,
            diagnosis = ?info.principal_diagnosis_code,
            provenance = %info.diagnosis_provenance,
            consultation_count = info.consultations.len(),
            "History extracted"
        );

        Ok(info)
    }

    fn fill_diagnosis_from_narrative(&self, info: &mut HistoryInfo, text: &str) {
        let best = self
            .nlp
            .extract(text)
            .filter(|e| e.is_diagnosis() && e.code.is_some())
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence));

        if let Some(entity) = best {
            info.principal_diagnosis_code = entity.code.clone();
            if info.principal_diagnosis_text.is_none() {
                info.principal_diagnosis_text = Some(entity.text.clone());
            }
            info.diagnosis_provenance = provenance_of(entity.source);
            tracing::info!(
                code = ?info.principal_diagnosis_code,
                provenance = %info.diagnosis_provenance,
                "Principal diagnosis filled from narrative"
            );
        }
    }

    fn consultations_from_narrative(&self, text: &str) -> Vec<ConsultationInfo> {
        let mut seen = HashSet::new();
        let mut candidates: Vec<_> = self
            .nlp
            .extract(text)
            .filter(|e| e.is_procedure() && e.code.is_some())
            .collect();
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        candidates
            .into_iter()
            .filter(|e| seen.insert(e.code.clone()))
            .map(|e| ConsultationInfo {
                code: e.code.clone().unwrap_or_default(),
                description: Some(e.text.clone()),
                performed_at: None,
                purpose_text: None,
                authorization_number: None,
                provenance: provenance_of(e.source),
            })
            .collect()
    }
}

fn provenance_of(source: EntitySource) -> FieldProvenance {
    match source {
        EntitySource::Model => FieldProvenance::ModelFallback,
        EntitySource::Heuristic => FieldProvenance::HeuristicFallback,
    }
}

fn extract_document_info(text: &str) -> Option<(String, String)> {
    for pattern in [&*DOC_LABELED, &*DOC_HEADER, &*DOC_ANYWHERE] {
        if let Some(caps) = pattern.captures(text) {
            return Some((caps[1].to_uppercase(), caps[2].to_string()));
        }
    }
    None
}

fn extract_full_name(lines: &[&str], text: &str) -> Option<String> {
    if let Some(caps) = NAME.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    // Header band fallback: "CC 1232835680 - GARCIA PEREZ ANA MARIA".
    for line in lines {
        for doc_type in ["CC", "TI", "RC", "CE", "PA", "NUIP", "MS"] {
            if line.starts_with(&format!("{doc_type} ")) {
                if let Some((_, name)) = line.split_once(" - ") {
                    return Some(name.trim().to_string());
                }
            }
        }
    }
    None
}

/// The service that admitted the patient prints in uppercase shortly after
/// the "Cierre Historia" marker; fall back to the labeled service type.
fn extract_entry_service(lines: &[&str], fallback: Option<String>) -> Option<String> {
    if let Some(idx) = lines
        .iter()
        .position(|l| l.to_lowercase().starts_with("cierre historia"))
    {
        for candidate in lines[idx + 1..].iter().take(4) {
            let has_letters = candidate.chars().any(char::is_alphabetic);
            if has_letters && !candidate.chars().any(char::is_lowercase) {
                return Some(candidate.to_string());
            }
        }
    }
    fallback
}

fn extract_diagnosis(text: &str) -> (Option<String>, Option<String>) {
    let code = DXP_CODE.captures(text).map(|caps| caps[1].to_string());
    let line = first_match(&DX_LINE, text).or_else(|| first_match(&DX_LINE_FALLBACK, text));
    (code, line)
}

fn extract_secondary_codes(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    DXR_CODE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

/// Consultation and service blocks are bullet-separated; each section
/// shares one datetime/purpose/authorization context.
fn extract_consultations(text: &str) -> Vec<ConsultationInfo> {
    let mut consultations = Vec::new();
    let mut seen: HashSet<(String, Option<NaiveDateTime>)> = HashSet::new();

    for raw_section in text.split('•') {
        let section = raw_section.trim();
        if section.is_empty() {
            continue;
        }
        let performed_at = extract_datetime(&SECTION_AT, section);
        let purpose_text = first_match(&PURPOSE, section);
        let authorization = first_match(&AUTHORIZATION, section);

        for caps in CONSULTATION_TYPE.captures_iter(section) {
            push_consultation(
                &mut consultations,
                &mut seen,
                caps[1].to_string(),
                caps[2].trim().to_string(),
                performed_at,
                purpose_text.clone(),
                authorization.clone(),
            );
        }

        for caps in COD_NOMB.captures_iter(section) {
            let description = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
            push_consultation(
                &mut consultations,
                &mut seen,
                caps[1].to_string(),
                description,
                performed_at,
                purpose_text.clone(),
                authorization.clone(),
            );
        }
    }
    consultations
}

#[allow(clippy::too_many_arguments)]
fn push_consultation(
    consultations: &mut Vec<ConsultationInfo>,
    seen: &mut HashSet<(String, Option<NaiveDateTime>)>,
    code: String,
    description: String,
    performed_at: Option<NaiveDateTime>,
    purpose_text: Option<String>,
    authorization_number: Option<String>,
) {
    if !seen.insert((code.clone(), performed_at)) {
        return;
    }
    consultations.push(ConsultationInfo {
        code,
        description: Some(description),
        performed_at,
        purpose_text,
        authorization_number,
        provenance: FieldProvenance::Deterministic,
    });
}

fn first_match(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

fn extract_datetime(pattern: &Regex, text: &str) -> Option<NaiveDateTime> {
    first_match(pattern, text).and_then(|candidate| parse_datetime(&candidate))
}
