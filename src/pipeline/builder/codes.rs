//! Normalization maps from free-text service descriptions to RIPS codes.

/// Attention-type codes keyed by substrings of the admitting service.
const ATTENTION_TYPE_MAP: &[(&str, &str)] = &[
    ("urgencias", "02"),
    ("consulta externa", "01"),
    ("consulta", "01"),
    ("hospitalización", "04"),
    ("hospitalizacion", "04"),
    ("vacunacion", "13"),
];

/// Service-purpose codes keyed by substrings of the "Finalidad" text.
const SERVICE_PURPOSE_MAP: &[(&str, &str)] = &[
    ("consulta de primera vez", "01"),
    ("consulta de control", "02"),
    ("programa pf", "03"),
    ("detección", "04"),
    ("deteccion", "04"),
    ("consulta de urgencias", "10"),
    ("no aplica", "14"),
    ("vacunacion", "14"),
    ("terapia", "07"),
];

pub fn map_attention_type(raw: Option<&str>) -> Option<String> {
    lookup(raw, ATTENTION_TYPE_MAP)
}

pub fn map_service_purpose(raw: Option<&str>) -> Option<String> {
    lookup(raw, SERVICE_PURPOSE_MAP)
}

fn lookup(raw: Option<&str>, table: &[(&str, &str)]) -> Option<String> {
    let normalized = raw?.to_lowercase();
    table
        .iter()
        .find(|(key, _)| normalized.contains(key))
        .map(|(_, code)| code.to_string())
}
