//! Table ingestion and egress for `assetid`.
//!
//! Workbooks are read with `calamine` and written with `rust_xlsxwriter`; CSV goes through the
//! `csv` crate. All writes replace the destination atomically.

mod atomic;
mod read;
mod write;

use std::path::{Path, PathBuf};

pub use atomic::{atomic_write, AtomicWriteError};
pub use read::{read_csv_table, read_table, read_workbook_table, sheet_names, ReadError};
pub use write::{write_table, xlsx_bytes, WriteError};

/// Sheet read when the caller does not name one.
pub const DEFAULT_SHEET: &str = "Asset,location";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    /// `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`
    Workbook,
    Csv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(TableFormat::Workbook),
            "csv" => Some(TableFormat::Csv),
            _ => None,
        }
    }
}

/// `<dir>/<stem>_processed.xlsx` next to `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "assets".to_string());
    input.with_file_name(format!("{stem}_processed.xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_extensions() {
        assert_eq!(TableFormat::from_path(Path::new("a/b.XLSX")), Some(TableFormat::Workbook));
        assert_eq!(TableFormat::from_path(Path::new("b.ods")), Some(TableFormat::Workbook));
        assert_eq!(TableFormat::from_path(Path::new("b.csv")), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_path(Path::new("b.json")), None);
        assert_eq!(TableFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("data/register.xlsx")),
            PathBuf::from("data/register_processed.xlsx")
        );
        assert_eq!(
            default_output_path(Path::new("register.csv")),
            PathBuf::from("register_processed.xlsx")
        );
    }
}
