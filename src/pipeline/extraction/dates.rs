use chrono::{NaiveDate, NaiveDateTime};

/// Datetime layouts seen in clinical histories, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
];

/// Date-only layouts seen in invoices and histories.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y"];

/// Parse a labeled datetime value, tolerating date-only candidates
/// (midnight is assumed).
pub fn parse_datetime(candidate: &str) -> Option<NaiveDateTime> {
    let candidate = candidate.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(candidate, fmt) {
            return Some(parsed);
        }
    }
    let date_part = candidate.split_whitespace().next()?;
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(date_part, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Find the first recognizable date anywhere in `text`.
/// Used for the invoice issue date, which floats near the header.
pub fn find_first_date(text: &str) -> Option<NaiveDateTime> {
    use regex::Regex;
    use std::sync::LazyLock;

    static CANDIDATES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
        vec![
            (Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap(), "%d/%m/%Y"),
            (Regex::new(r"\d{2}-\d{2}-\d{4}").unwrap(), "%d-%m-%Y"),
            (Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap(), "%Y-%m-%d"),
            (Regex::new(r"\d{1,2}/\d{1,2}/\d{2}").unwrap(), "%d/%m/%y"),
        ]
    });

    for (pattern, fmt) in CANDIDATES.iter() {
        if let Some(found) = pattern.find(text) {
            if let Ok(parsed) = NaiveDate::parse_from_str(found.as_str(), fmt) {
                return parsed.and_hms_opt(0, 0, 0);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_datetime_parses() {
        let parsed = parse_datetime("15/03/2024 08:30:00").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2024-03-15 08:30");
    }

    #[test]
    fn date_only_assumes_midnight() {
        let parsed = parse_datetime("15/03/2024").unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn trailing_tokens_are_ignored_for_date_only() {
        let parsed = parse_datetime("15/03/2024 urgencias").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-03-15");
    }

    #[test]
    fn first_date_found_in_free_text() {
        let text = "FACTURA ELECTRONICA\nFecha de emision: 02/05/2024\nTotal $70.000";
        let parsed = find_first_date(text).unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-05-02");
    }

    #[test]
    fn no_date_returns_none() {
        assert!(find_first_date("sin fechas aqui").is_none());
        assert!(parse_datetime("mañana").is_none());
    }
}
