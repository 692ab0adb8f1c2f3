//! Conversions from raw spreadsheet cells to record fields.

use calamine::Data;
use tracing::warn;

use rxbatch_contracts::records::CellValue;

/// Loose view of a cell. Empty cells, empty strings and error cells are `None`.
pub fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Bool(b) => Some(CellValue::Text(b.to_string())),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}

/// Text view of a cell; numbers render without a trailing `.0`.
pub fn cell_text(cell: &Data) -> Option<String> {
    cell_value(cell).map(|v| v.to_string())
}

/// Non-negative integer view of a cell.
///
/// Negative, fractional and non-numeric values are treated as absent and
/// reported with `warn!`, naming `column` and `row`.
pub fn cell_count(cell: &Data, column: &str, row: usize) -> Option<u32> {
    let value = cell_value(cell)?;
    let parsed = value
        .as_number()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32);
    if parsed.is_none() {
        warn!(column = %column, row, value = %value, "ignoring value that is not a non-negative integer");
    }
    parsed
}
