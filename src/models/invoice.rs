use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One itemized service line of an electronic invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLine {
    /// Positional line identifier as printed on the invoice ("1", "2", ...).
    pub line_id: Option<String>,
    /// CUPS procedure code billed by this line.
    pub cups_code: Option<String>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub line_total: Decimal,
}

impl ServiceLine {
    /// Billed value of the line: the printed total, else quantity × unit.
    pub fn subtotal(&self) -> Decimal {
        if self.line_total > Decimal::ZERO {
            self.line_total
        } else {
            self.quantity * self.unit_value
        }
    }
}

/// General data of an electronic invoice (FERO layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceInfo {
    pub invoice_id: String,
    pub issue_date: NaiveDateTime,
    pub supplier_tax_id: Option<String>,
    pub supplier_name: Option<String>,
    pub customer_tax_id: Option<String>,
    pub customer_name: Option<String>,
    pub total_amount: Decimal,
    pub currency: String,
    pub lines: Vec<ServiceLine>,
}

impl InvoiceInfo {
    /// Sum of all service-line subtotals.
    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(ServiceLine::subtotal).sum()
    }

    /// Whether the printed total matches the summed lines within `tolerance`.
    pub fn total_is_consistent(&self, tolerance: Decimal) -> bool {
        (self.total_amount - self.lines_total()).abs() <= tolerance
    }
}
