use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::config::DEFAULT_CURRENCY;
use crate::models::{InvoiceInfo, ServiceLine};

use super::dates::find_first_date;
use super::numeric::{parse_money, parse_quantity};
use super::pdf::extract_document_text;
use super::table::{detect_service_table, ServiceTable};
use super::ExtractionError;

static INVOICE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNo[.: ]+([A-Za-z0-9-]+)").unwrap());
/// Electronic invoices keep a FERO-prefixed consecutive even when the
/// "No." label is lost to layout noise.
static INVOICE_ID_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(FE[A-Z]{1,3}[0-9]{3,})\b").unwrap());
static SUPPLIER_NIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^nit[.: ]").unwrap());
static NIT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{3,}-[0-9])").unwrap());
static LABELED_NIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNIT[:. ]+([0-9-]+)").unwrap());
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*[0-9.,]+").unwrap());
/// Free-text service line: id, 4-7 digit code, description, quantity,
/// unit value, line total. Fallback for invoices printed without a table.
static LINE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d{1,3})\s+([0-9]{4,7}(?:-[0-9])?)\s+(.+?)\s+([\d.,]+)\s+\$\s*([\d.,]+)\s+\$\s*([\d.,]+)\s*$")
        .unwrap()
});

/// Extracts structured data from an electronic invoice PDF (FERO layout).
///
/// Table extraction runs first; invoices whose items are printed as free
/// text fall back to line-pattern matching. Pure transform, no side
/// effects.
pub struct InvoiceExtractor;

impl InvoiceExtractor {
    /// Extract from raw PDF bytes.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<InvoiceInfo, ExtractionError> {
        let text = extract_document_text(pdf_bytes)?;
        self.extract_from_text(&text)
    }

    /// Extract from already-recovered PDF text.
    pub fn extract_from_text(&self, text: &str) -> Result<InvoiceInfo, ExtractionError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let invoice_id = extract_invoice_id(&lines, text);

        let service_lines = match detect_service_table(&lines) {
            Some(table) => lines_from_table(&table),
            None => lines_from_text(text),
        };

        if invoice_id.is_none() && service_lines.is_empty() {
            return Err(ExtractionError::InvoiceLayoutUnrecognized);
        }

        let issue_date = find_first_date(text).ok_or(ExtractionError::IssueDateNotFound)?;

        let total_amount = extract_total(&lines)
            .or_else(|| {
                if service_lines.is_empty() {
                    None
                } else {
                    Some(service_lines.iter().map(ServiceLine::subtotal).sum())
                }
            })
            .unwrap_or(Decimal::ZERO);

        let info = InvoiceInfo {
            invoice_id: invoice_id.unwrap_or_default(),
            issue_date,
            supplier_tax_id: extract_supplier_tax_id(&lines),
            supplier_name: lines.first().map(|s| s.to_string()),
            customer_tax_id: extract_customer_tax_id(&lines),
            customer_name: extract_customer_name(&lines),
            total_amount,
            currency: DEFAULT_CURRENCY.to_string(),
            lines: service_lines,
        };

        tracing::debug!(
            invoice_id = %info.invoice_id,
            line_count = info.lines.len(),
            total = %info.total_amount,
            "Invoice extracted"
        );

        Ok(info)
    }
}

fn extract_invoice_id(lines: &[&str], full_text: &str) -> Option<String> {
    for line in lines {
        if let Some(caps) = INVOICE_ID.captures(line) {
            return Some(caps[1].trim().to_string());
        }
    }
    INVOICE_ID_FALLBACK
        .captures(full_text)
        .map(|caps| caps[1].to_string())
}

fn extract_supplier_tax_id(lines: &[&str]) -> Option<String> {
    for line in lines {
        if SUPPLIER_NIT.is_match(line) {
            if let Some(caps) = NIT_VALUE.captures(line) {
                return Some(caps[1].to_string());
            }
        }
    }
    None
}

/// The customer block sits under a lone "Cliente" marker; the name is the
/// first non-empty line after it.
fn extract_customer_name(lines: &[&str]) -> Option<String> {
    let idx = lines.iter().position(|l| l.eq_ignore_ascii_case("cliente"))?;
    lines[idx + 1..]
        .iter()
        .take(4)
        .find(|candidate| !candidate.eq_ignore_ascii_case("cliente"))
        .map(|s| s.to_string())
}

fn extract_customer_tax_id(lines: &[&str]) -> Option<String> {
    if let Some(idx) = lines.iter().position(|l| l.eq_ignore_ascii_case("cliente")) {
        for candidate in lines[idx + 1..].iter().take(9) {
            if let Some(caps) = LABELED_NIT.captures(candidate) {
                return Some(caps[1].to_string());
            }
        }
        return None;
    }
    // Fallback: the first labeled NIT anywhere.
    lines
        .iter()
        .find_map(|line| LABELED_NIT.captures(line).map(|caps| caps[1].to_string()))
}

fn extract_total(lines: &[&str]) -> Option<Decimal> {
    extract_amount_after_label(lines, "total").or_else(|| extract_amount_after_label(lines, "subtotal"))
}

fn extract_amount_after_label(lines: &[&str], label: &str) -> Option<Decimal> {
    for (idx, line) in lines.iter().enumerate() {
        if !line.to_lowercase().starts_with(label) {
            continue;
        }
        if let Some(amount) = find_amount_in_line(line) {
            return Some(amount);
        }
        for candidate in lines[idx + 1..].iter().take(3) {
            if let Some(amount) = find_amount_in_line(candidate) {
                return Some(amount);
            }
        }
    }
    None
}

/// The last `$` amount on a line; totals columns print the grand value
/// rightmost.
fn find_amount_in_line(line: &str) -> Option<Decimal> {
    AMOUNT
        .find_iter(line)
        .last()
        .map(|m| parse_money(m.as_str()))
}

fn lines_from_table(table: &ServiceTable) -> Vec<ServiceLine> {
    let columns = &table.columns;
    let mut out = Vec::new();

    for row in &table.rows {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(|s| s.as_str());

        let first = row.first().map(String::as_str).unwrap_or("");
        if first.is_empty() || first.to_uppercase().starts_with("SUBTOTAL") {
            continue;
        }

        let code = cell(columns.code).filter(|s| !s.is_empty()).map(str::to_string);
        let quantity = cell(columns.quantity).map(parse_quantity).unwrap_or(Decimal::ZERO);
        let unit_value = cell(columns.unit_value).map(parse_money).unwrap_or(Decimal::ZERO);
        let mut line_total = cell(columns.line_total).map(parse_money).unwrap_or(Decimal::ZERO);
        if line_total == Decimal::ZERO && unit_value > Decimal::ZERO && quantity > Decimal::ZERO {
            line_total = unit_value * quantity;
        }

        out.push(ServiceLine {
            line_id: Some(first.to_string()),
            cups_code: code,
            description: cell(columns.description).map(clean_description),
            quantity,
            unit_value,
            line_total,
        });
    }
    out
}

/// Line-pattern fallback for invoices without a detectable table.
fn lines_from_text(text: &str) -> Vec<ServiceLine> {
    LINE_ITEM
        .captures_iter(text)
        .map(|caps| {
            let unit_value = parse_money(&caps[5]);
            let quantity = parse_quantity(&caps[4]);
            let mut line_total = parse_money(&caps[6]);
            if line_total == Decimal::ZERO && unit_value > Decimal::ZERO && quantity > Decimal::ZERO {
                line_total = unit_value * quantity;
            }
            ServiceLine {
                line_id: Some(caps[1].to_string()),
                cups_code: Some(caps[2].to_string()),
                description: Some(clean_description(&caps[3])),
                quantity,
                unit_value,
                line_total,
            }
        })
        .collect()
}

fn clean_description(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TABLE_INVOICE: &str = "\
IPS SALUD TOTAL SAS
NIT: 900123456-1
FACTURA ELECTRONICA DE VENTA
No. FERO45871
Fecha de emision: 02/05/2024
Cliente
EPS SURA
NIT: 800088702-2
Item  Codigo  Nombre  IVA  Desc  Cantidad  Vlr Unitario  Vlr Total
1  993520  VACUNA TRIPLE VIRAL  0  0  1  $35.000  $35.000
2  993510  VACUNA FIEBRE AMARILLA  0  0  1  $35.000  $35.000
SUBTOTAL  $70.000
Total  $70.000";

    const FREE_TEXT_INVOICE: &str = "\
IPS SALUD TOTAL SAS
Factura No: FV-2024-118
Fecha: 02/05/2024
Detalle de servicios
1 993520 VACUNA TRIPLE VIRAL 1 $ 35.000 $ 35.000
2 993510 VACUNA FIEBRE AMARILLA 1 $ 35.000 $ 35.000
Total a pagar
$ 70.000";

    #[test]
    fn table_invoice_extracts_lines_and_totals() {
        let info = InvoiceExtractor.extract_from_text(TABLE_INVOICE).unwrap();
        assert_eq!(info.invoice_id, "FERO45871");
        assert_eq!(info.lines.len(), 2);
        assert_eq!(info.lines[0].cups_code.as_deref(), Some("993520"));
        assert_eq!(info.lines[1].cups_code.as_deref(), Some("993510"));
        assert_eq!(info.total_amount, dec!(70000));
        assert!(info.total_is_consistent(dec!(1.00)));
    }

    #[test]
    fn free_text_invoice_falls_back_to_line_patterns() {
        let info = InvoiceExtractor.extract_from_text(FREE_TEXT_INVOICE).unwrap();
        assert_eq!(info.invoice_id, "FV-2024-118");
        assert_eq!(info.lines.len(), 2);
        assert_eq!(info.lines[0].line_total, dec!(35000));
    }

    #[test]
    fn customer_block_is_read_after_cliente_marker() {
        let info = InvoiceExtractor.extract_from_text(TABLE_INVOICE).unwrap();
        assert_eq!(info.customer_name.as_deref(), Some("EPS SURA"));
        assert_eq!(info.customer_tax_id.as_deref(), Some("800088702-2"));
    }

    #[test]
    fn supplier_fields_from_header() {
        let info = InvoiceExtractor.extract_from_text(TABLE_INVOICE).unwrap();
        assert_eq!(info.supplier_name.as_deref(), Some("IPS SALUD TOTAL SAS"));
        assert_eq!(info.supplier_tax_id.as_deref(), Some("900123456-1"));
    }

    #[test]
    fn unrecognizable_text_is_rejected() {
        let result = InvoiceExtractor.extract_from_text("informe de gestion anual\nsin tablas");
        assert!(matches!(result, Err(ExtractionError::InvoiceLayoutUnrecognized)));
    }

    #[test]
    fn missing_date_is_an_error() {
        let text = "No. FERO1\n1  993520  VACUNA  0  0  1  $35.000  $35.000";
        let result = InvoiceExtractor.extract_from_text(text);
        assert!(matches!(result, Err(ExtractionError::IssueDateNotFound)));
    }

    #[test]
    fn total_falls_back_to_sum_of_lines() {
        let text = "\
No. FERO2
Fecha: 02/05/2024
Item  Codigo  Nombre  Cantidad  Vlr Unitario  Vlr Total
1  993520  VACUNA TRIPLE VIRAL  1  $35.000  $35.000";
        let info = InvoiceExtractor.extract_from_text(text).unwrap();
        assert_eq!(info.total_amount, dec!(35000));
    }
}
