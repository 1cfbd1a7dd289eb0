// 🖨️ Text table rendering for the report
//
// Every column is right-aligned to its widest cell (header included) and
// columns are separated by one space. No row index.
//
// Cell formatting depends on what the column holds:
//   only integers           → plain integers
//   numbers (or int + NULL) → floats, same decimals for every row, NULL = NaN
//   anything else           → as-is, NULL = None

use comfy_table::{presets, CellAlignment, Table};
use rusqlite::types::Value;

const MAX_DECIMALS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float { decimals: usize },
    Object,
}

fn classify(values: &[&Value]) -> CellKind {
    let mut has_null = false;
    let mut has_real = false;
    let mut has_value = false;

    for value in values {
        match value {
            Value::Null => has_null = true,
            Value::Integer(_) => has_value = true,
            Value::Real(_) => {
                has_value = true;
                has_real = true;
            }
            Value::Text(_) | Value::Blob(_) => return CellKind::Object,
        }
    }

    if !has_value {
        return CellKind::Object;
    }
    if !has_real && !has_null {
        return CellKind::Integer;
    }

    let decimals = values
        .iter()
        .filter_map(|v| match v {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        })
        .map(decimals_needed)
        .max()
        .unwrap_or(1);

    CellKind::Float { decimals }
}

/// Fewest decimals (1..=6) that print `value` without losing precision
fn decimals_needed(value: f64) -> usize {
    (1..=MAX_DECIMALS)
        .find(|&d| {
            format!("{:.*}", d, value)
                .parse::<f64>()
                .map(|printed| printed == value)
                .unwrap_or(false)
        })
        .unwrap_or(MAX_DECIMALS)
}

fn format_cell(value: &Value, kind: CellKind) -> String {
    match (value, kind) {
        (Value::Null, CellKind::Float { .. }) => "NaN".to_string(),
        (Value::Null, _) => "None".to_string(),
        (Value::Integer(i), CellKind::Float { decimals }) => format!("{:.*}", decimals, *i as f64),
        (Value::Integer(i), _) => i.to_string(),
        (Value::Real(f), CellKind::Float { decimals }) => format!("{:.*}", decimals, f),
        (Value::Real(f), _) => f.to_string(),
        (Value::Text(s), _) => s.clone(),
        (Value::Blob(b), _) => format!("<{} bytes>", b.len()),
    }
}

/// Render headers and rows as a right-aligned text table
pub fn render_table(columns: &[String], rows: &[Vec<Value>]) -> String {
    let kinds: Vec<CellKind> = (0..columns.len())
        .map(|idx| classify(&rows.iter().map(|row| &row[idx]).collect::<Vec<_>>()))
        .collect();

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(columns.to_vec());

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&kinds)
            .map(|(value, kind)| format_cell(value, *kind))
            .collect();
        table.add_row(cells);
    }

    // No borders: the left padding of every column but the first is the separator
    for (idx, column) in table.column_iter_mut().enumerate() {
        column.set_cell_alignment(CellAlignment::Right);
        column.set_padding(if idx == 0 { (0, 0) } else { (1, 0) });
    }

    table.to_string()
}
