/// Minimum ratio of tabular-looking lines for a block to count as a table.
const TABULAR_THRESHOLD: f64 = 0.60;

/// A service-line table reconstructed from the invoice text layer.
///
/// pdf-extract returns plain text, so the table has to be rebuilt from
/// alignment: rows are lines whose cells are separated by tabs, pipes, or
/// runs of 2+ spaces, under a header that names the code/description
/// columns.
#[derive(Debug, Clone)]
pub struct ServiceTable {
    pub columns: ColumnMap,
    pub rows: Vec<Vec<String>>,
}

/// Column indices resolved from the header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub code: Option<usize>,
    pub description: Option<usize>,
    pub quantity: Option<usize>,
    pub unit_value: Option<usize>,
    pub line_total: Option<usize>,
}

impl ColumnMap {
    fn from_header(cells: &[String]) -> Self {
        let mut map = Self::default();
        for (idx, cell) in cells.iter().enumerate() {
            let lower = cell.to_lowercase();
            if map.code.is_none() && (lower.contains("codigo") || lower.contains("código")) {
                map.code = Some(idx);
            } else if map.description.is_none()
                && (lower.contains("nombre") || lower.contains("descripcion") || lower.contains("descripción"))
            {
                map.description = Some(idx);
            } else if map.quantity.is_none() && lower.starts_with("cant") {
                map.quantity = Some(idx);
            } else if map.unit_value.is_none() && lower.contains("unitario") {
                map.unit_value = Some(idx);
            } else if map.line_total.is_none() && lower.contains("total") {
                map.line_total = Some(idx);
            }
        }
        map
    }

    /// A usable service table needs at least the code and description columns.
    fn is_service_header(&self) -> bool {
        self.code.is_some() && self.description.is_some()
    }
}

/// Scan the invoice lines for a service table. Rows are collected below the
/// header until the block stops looking tabular or a SUBTOTAL/TOTAL
/// terminator appears.
pub fn detect_service_table(lines: &[&str]) -> Option<ServiceTable> {
    let header_idx = lines.iter().position(|line| {
        is_tabular_line(line) && ColumnMap::from_header(&split_cells(line)).is_service_header()
    })?;

    let columns = ColumnMap::from_header(&split_cells(lines[header_idx]));
    let mut rows = Vec::new();
    let mut scanned = 0usize;
    let mut tabular = 0usize;

    for line in &lines[header_idx + 1..] {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let upper = trimmed.to_uppercase();
        if upper.starts_with("SUBTOTAL") || upper.starts_with("TOTAL") {
            break;
        }
        scanned += 1;
        if is_tabular_line(trimmed) {
            tabular += 1;
            rows.push(split_cells(trimmed));
        } else if scanned > 2 && (tabular as f64 / scanned as f64) < TABULAR_THRESHOLD {
            break;
        }
    }

    if rows.is_empty() {
        None
    } else {
        Some(ServiceTable { columns, rows })
    }
}

/// Heuristic: a line looks tabular if it has multiple columns separated by
/// tabs, pipes, or multi-space gaps.
pub fn is_tabular_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() < 5 {
        return false;
    }
    if trimmed.matches('\t').count() >= 2 || trimmed.matches('|').count() >= 2 {
        return true;
    }
    count_multi_space_gaps(trimmed) >= 2
}

/// Split a tabular line into cells on tabs, pipes, or runs of 2+ spaces.
pub fn split_cells(line: &str) -> Vec<String> {
    let normalized = line.trim().replace('|', "\t");
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut space_run = 0usize;

    for ch in normalized.chars() {
        match ch {
            '\t' => {
                push_cell(&mut cells, &mut current);
                space_run = 0;
            }
            ' ' => {
                space_run += 1;
                if space_run >= 2 {
                    push_cell(&mut cells, &mut current);
                } else {
                    current.push(' ');
                }
            }
            _ => {
                space_run = 0;
                current.push(ch);
            }
        }
    }
    push_cell(&mut cells, &mut current);
    cells
}

fn push_cell(cells: &mut Vec<String>, current: &mut String) {
    let cell = current.trim().to_string();
    if !cell.is_empty() {
        cells.push(cell);
    }
    current.clear();
}

/// Count runs of 2+ consecutive spaces separating non-empty segments.
fn count_multi_space_gaps(text: &str) -> usize {
    let mut count = 0;
    let mut in_gap = false;
    let mut gap_len = 0;
    let mut seen_text = false;

    for ch in text.chars() {
        if ch == ' ' {
            gap_len += 1;
            if gap_len >= 2 && !in_gap && seen_text {
                in_gap = true;
                count += 1;
            }
        } else {
            seen_text = true;
            in_gap = false;
            gap_len = 0;
        }
    }
    count
}
