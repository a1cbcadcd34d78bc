use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a monetary amount as printed on Colombian invoices.
///
/// Accepted shapes: `$ 35.000` and `$ 1.234.567,89` (dot thousands, comma
/// decimal), `1,234,567.89`, `35000.50`, bare `35000`. Currency markers and
/// spaces are stripped. Unparseable input degrades to zero rather than
/// failing: a single garbled cell must not abort the whole invoice.
pub fn parse_money(raw: &str) -> Decimal {
    let value = raw
        .trim()
        .replace('$', "")
        .replace("COP", "")
        .replace(' ', "");
    if value.is_empty() {
        return Decimal::ZERO;
    }

    // Unify separators: treat commas as dots, then collapse all but the
    // last dot as thousands separators.
    let mut value = value.replace(',', ".");
    if value.matches('.').count() > 1 {
        let parts: Vec<&str> = value.split('.').collect();
        let (last, init) = parts.split_last().unwrap_or((&"", &[]));
        value = format!("{}.{}", init.concat(), last);
    }

    // A lone dot with exactly three trailing digits is a thousands
    // separator, not a decimal point: "$35.000" is thirty-five thousand
    // pesos. Decimal fractions on these invoices come with two digits.
    if let Some((int_part, frac)) = value.split_once('.') {
        if frac.len() == 3 && frac.chars().all(|c| c.is_ascii_digit()) {
            value = format!("{int_part}{frac}");
        }
    }

    if let Ok(amount) = Decimal::from_str(&value) {
        return amount;
    }

    // Last resort: keep the digits and read the trailing two as cents.
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Decimal::ZERO;
    }
    if digits.len() <= 2 {
        return Decimal::from_str(&digits).unwrap_or(Decimal::ZERO) / Decimal::from(100);
    }
    let (int_part, cents) = digits.split_at(digits.len() - 2);
    Decimal::from_str(&format!("{int_part}.{cents}")).unwrap_or(Decimal::ZERO)
}

/// Parse a quantity cell. Same locale handling as money, zero on failure.
pub fn parse_quantity(raw: &str) -> Decimal {
    parse_money(raw)
}
