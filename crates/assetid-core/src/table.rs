use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a table's shape does not line up with its header row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row {row} has {found} cells but the header row has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("column `{name}` has {found} values but the table has {expected} rows")]
    ColumnLength {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// A single parsed cell.
///
/// Ingestion layers map their native cell types onto this small set; id generation only ever
/// looks at the textual form (see [`CellValue::to_text`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl CellValue {
    /// Textual representation used for id derivation.
    ///
    /// Integral numbers render without a fractional part so a floor stored as `3.0` yields `3`.
    /// Empty cells and non-finite numbers render as an empty string.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => !n.is_finite(),
            CellValue::Boolean(_) => false,
        }
    }
}

fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return String::new();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// An already-parsed sheet: ordered header names plus ordered rows.
///
/// Rows are expected to have exactly one cell per header; [`Table::validate_shape`] checks
/// that before a batch run touches the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table, rejecting rows whose width differs from the header row.
    pub fn from_rows(
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, TableError> {
        let table = Self { headers, rows };
        table.validate_shape()?;
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), TableError> {
        if row.len() != self.headers.len() {
            return Err(TableError::RaggedRow {
                row: self.rows.len(),
                expected: self.headers.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn validate_shape(&self) -> Result<(), TableError> {
        let expected = self.headers.len();
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(TableError::RaggedRow {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Index of the first column whose header equals `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the first column whose trimmed header equals `name` ignoring case.
    pub fn column_index_ignore_case(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == name.to_lowercase())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    /// Cell in `row` under the column named exactly `name`.
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        let col = self.column_index(name)?;
        self.cell(row, col)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<&CellValue>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|r| r.get(col)).collect())
    }

    /// Overwrite the column named `name`, or append it after the last column.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                name: name.to_string(),
                expected: self.rows.len(),
                found: values.len(),
            });
        }

        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}
