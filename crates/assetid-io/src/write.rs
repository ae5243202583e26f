use std::io::Write;
use std::path::{Path, PathBuf};

use assetid_core::{CellValue, Table};
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::atomic::{atomic_write, AtomicWriteError};
use crate::TableFormat;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("failed to write csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("table is too large for a worksheet ({rows} rows x {columns} columns)")]
    TooLarge { rows: usize, columns: usize },
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Write `table` as `.xlsx` (into a sheet named `sheet`) or `.csv`, chosen by extension.
///
/// The destination is replaced atomically.
pub fn write_table(path: &Path, table: &Table, sheet: &str) -> Result<(), WriteError> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => write_csv(path, table),
        Some(TableFormat::Workbook) if is_xlsx(path) => {
            let bytes = xlsx_bytes(table, sheet)?;
            atomic_write(path, |file| file.write_all(&bytes)).map_err(|err| io_error(path, err))
        }
        _ => Err(WriteError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"))
}

fn io_error(path: &Path, err: AtomicWriteError<std::io::Error>) -> WriteError {
    let source = match err {
        AtomicWriteError::Io(err) | AtomicWriteError::Writer(err) => err,
    };
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize `table` to an in-memory `.xlsx` with a single worksheet.
pub fn xlsx_bytes(table: &Table, sheet: &str) -> Result<Vec<u8>, WriteError> {
    let too_large = || WriteError::TooLarge {
        rows: table.row_count(),
        columns: table.column_count(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (col, header) in table.headers.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| too_large())?;
        worksheet.write_string(0, col, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1).map_err(|_| too_large())?;
        for (col, value) in row.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| too_large())?;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) if s.is_empty() => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
                CellValue::Number(n) if n.is_finite() => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                CellValue::Number(_) => {}
                CellValue::Boolean(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_csv(path: &Path, table: &Table) -> Result<(), WriteError> {
    let result = atomic_write(path, |file| -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(CellValue::to_text))?;
        }
        writer.flush()?;
        Ok(())
    });

    result.map_err(|err| match err {
        AtomicWriteError::Io(source) => WriteError::Io {
            path: path.to_path_buf(),
            source,
        },
        AtomicWriteError::Writer(source) => WriteError::Csv {
            path: path.to_path_buf(),
            source,
        },
    })
}
