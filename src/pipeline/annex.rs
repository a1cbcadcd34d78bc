//! Normalization of the FEV RIPS JSON annex.
//!
//! The annex schema is externally defined and not under our control, so
//! parsing is lenient: only the top-level shape is mandatory,
//! every sub-field tolerates absence, empty strings, and number-or-string
//! typing drift.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::models::{AnnexInfo, AnnexMedicationLine, AnnexOtherServiceLine, AnnexPatient};

/// Malformed annex payload. The annex is optional enrichment: callers drop
/// it on this error and continue without it.
#[derive(Error, Debug)]
pub enum AnnexFormatError {
    #[error("annex is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("annex top-level shape is not the expected object")]
    UnexpectedShape,
}

/// Parses a FEV RIPS annex into [`AnnexInfo`].
pub struct AnnexNormalizer;

impl AnnexNormalizer {
    pub fn normalize(&self, json: &str) -> Result<AnnexInfo, AnnexFormatError> {
        let root: Value =
            serde_json::from_str(json).map_err(|e| AnnexFormatError::InvalidJson(e.to_string()))?;
        if !root.is_object() {
            return Err(AnnexFormatError::UnexpectedShape);
        }

        let Some(usuario) = root
            .get("usuarios")
            .and_then(Value::as_array)
            .and_then(|users| users.first())
        else {
            // An annex without users enriches nothing but is still valid.
            tracing::debug!("Annex carries no usuarios entry");
            return Ok(AnnexInfo::default());
        };

        let patient = AnnexPatient {
            document_type: get_string(usuario, "tipoDocumentoIdentificacion"),
            document_number: get_string(usuario, "numDocumentoIdentificacion"),
            full_name: get_string(usuario, "nombreUsuario"),
            sex: get_string(usuario, "codSexo").map(|s| s.to_uppercase()),
            birth_date: get_string(usuario, "fechaNacimiento").and_then(|s| parse_annex_date(&s)),
            municipality_code: get_string(usuario, "codMunicipioResidencia"),
            residence_zone: get_string(usuario, "codZonaTerritorialResidencia"),
        };

        let servicios = usuario.get("servicios");
        let medications = collect_entries(servicios, "medicamentos", parse_medication);
        let other_services = collect_entries(servicios, "otrosServicios", parse_other_service);

        tracing::debug!(
            document_number = ?patient.document_number,
            medication_count = medications.len(),
            other_service_count = other_services.len(),
            "Annex normalized"
        );

        Ok(AnnexInfo {
            patient,
            medications,
            other_services,
        })
    }
}

fn collect_entries<T>(
    servicios: Option<&Value>,
    key: &str,
    parse: fn(&Value) -> T,
) -> Vec<T> {
    servicios
        .and_then(|s| s.get(key))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse).collect())
        .unwrap_or_default()
}

fn parse_medication(item: &Value) -> AnnexMedicationLine {
    AnnexMedicationLine {
        provider_code: get_string(item, "codPrestador").unwrap_or_default(),
        document_type: get_string(item, "tipoDocumentoIdentificacion"),
        document_number: get_string(item, "numDocumentoIdentificacion"),
        authorization_number: get_string(item, "numAutorizacion"),
        medication_code: get_string(item, "codTecnologiaSalud").unwrap_or_default(),
        medication_name: get_string(item, "nomTecnologiaSalud"),
        medication_type: get_string(item, "tipoMedicamento"),
        unit_value: get_decimal(item, "vrUnitMedicamento"),
        total_value: get_decimal(item, "vrServicio"),
        quantity: get_decimal(item, "cantidadMedicamento"),
        unit_measure: get_string(item, "unidadMinDispensa"),
        treatment_days: item.get("diasTratamiento").and_then(Value::as_i64).map(|d| d as i32),
        diagnosis_code: get_string(item, "codDiagnosticoPrincipal"),
        related_diagnosis: get_string(item, "codDiagnosticoRelacionado"),
        mipres_id: get_string(item, "idMIPRES"),
        administration_date: get_string(item, "fechaDispensAdmon").and_then(|s| parse_annex_date(&s)),
        pharmaceutical_form: get_string(item, "formaFarmaceutica"),
        concentration: get_string(item, "concentracionMedicamento"),
    }
}

fn parse_other_service(item: &Value) -> AnnexOtherServiceLine {
    AnnexOtherServiceLine {
        provider_code: get_string(item, "codPrestador").unwrap_or_default(),
        document_type: get_string(item, "tipoDocumentoIdentificacion"),
        document_number: get_string(item, "numDocumentoIdentificacion"),
        authorization_number: get_string(item, "numAutorizacion"),
        service_code: get_string(item, "codTecnologiaSalud").unwrap_or_default(),
        service_name: get_string(item, "nomTecnologiaSalud"),
        service_type: get_string(item, "tipoOS"),
        service_date: get_string(item, "fechaSuministroTecnologia").and_then(|s| parse_annex_date(&s)),
        unit_value: get_decimal(item, "vrUnitOS"),
        total_value: get_decimal(item, "vrServicio"),
        quantity: get_decimal(item, "cantidadOS"),
        diagnosis_code: get_string(item, "codDiagnosticoPrincipal"),
        related_diagnosis: get_string(item, "codDiagnosticoRelacionado"),
        mipres_id: get_string(item, "idMIPRES"),
    }
}

/// Read a field as text, tolerating numeric typing and normalizing empty
/// strings to None.
fn get_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a monetary/quantity field, tolerating number or string typing.
fn get_decimal(value: &Value, key: &str) -> Decimal {
    match value.get(key) {
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => s.replace(',', "").parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Annex dates arrive as `2004-08-15`, `2024-05-02 10:30`, or ISO-8601
/// timestamps, occasionally with slashes.
fn parse_annex_date(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim().replace('/', "-");
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.fZ",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&value, fmt) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(&value[..value.len().min(10)], "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
