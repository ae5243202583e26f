use std::path::{Path, PathBuf};

use assetid_core::{CellValue, Table};
use calamine::{open_workbook_auto, Data, Reader};
use thiserror::Error;

use crate::TableFormat;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("sheet `{sheet}` not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },
    #[error("failed to read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Read one table from a workbook sheet or a CSV file, chosen by extension.
///
/// `sheet` is ignored for CSV input.
pub fn read_table(path: &Path, sheet: &str) -> Result<Table, ReadError> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Workbook) => read_workbook_table(path, sheet),
        Some(TableFormat::Csv) => read_csv_table(path),
        None => Err(ReadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Sheet names of a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, ReadError> {
    let workbook = open_workbook_auto(path).map_err(|source| ReadError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(workbook.sheet_names())
}

/// First used row is the header row; fully empty data rows are dropped.
pub fn read_workbook_table(path: &Path, sheet: &str) -> Result<Table, ReadError> {
    let workbook_err = |source| ReadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let names = workbook.sheet_names();
    if !names.iter().any(|name| name == sheet) {
        return Err(ReadError::SheetNotFound {
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }

    let range = workbook.worksheet_range(sheet).map_err(workbook_err)?;
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        log::warn!("sheet `{sheet}` in {} is empty", path.display());
        return Ok(Table::default());
    };

    let headers = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_text(i, convert_value(cell)))
        .collect();
    let mut table = Table::new(headers);
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(convert_value).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        // calamine ranges are rectangular, so every row matches the header width.
        table.rows.push(cells);
    }

    log::debug!(
        "read {} rows x {} columns from `{sheet}`",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Header row first. Short rows are padded; extra cells get `Column{n}` headers.
pub fn read_csv_table(path: &Path) -> Result<Table, ReadError> {
    let csv_err = |source| ReadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .enumerate()
        .map(|(i, h)| header_text(i, CellValue::from(h)))
        .collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let cells: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(field)
                }
            })
            .collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(cells);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(headers.len());
    headers.extend((headers.len()..width).map(|i| format!("Column{}", i + 1)));
    for row in &mut rows {
        row.resize(width, CellValue::Empty);
    }

    Ok(Table { headers, rows })
}

fn header_text(index: usize, value: CellValue) -> String {
    let text = value.to_text();
    if text.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        text
    }
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::Bool(v) => CellValue::Boolean(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::Text(v.clone()),
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::DateTimeIso(v) => CellValue::Text(v.clone()),
        Data::DurationIso(v) => CellValue::Text(v.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_headers_get_positional_names() {
        assert_eq!(header_text(2, CellValue::Empty), "Unnamed: 2");
        assert_eq!(header_text(0, CellValue::Number(2024.0)), "2024");
        assert_eq!(header_text(1, CellValue::from("Floor")), "Floor");
    }

    #[test]
    fn error_cells_read_as_empty() {
        assert_eq!(
            convert_value(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Empty
        );
        assert_eq!(convert_value(&Data::Int(3)), CellValue::Number(3.0));
    }
}
