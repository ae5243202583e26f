//! Warnings for equipment classes and types outside the standard catalog.
//!
//! Findings never block processing; they tell the operator which values need to exist in the
//! target system before import.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::config::CatalogConfig;
use crate::schema::fields;
use crate::table::Table;

/// Template rows carry this marker instead of data.
pub const PLACEHOLDER: &str = "Mandatory";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentField {
    /// `Asset System`
    Class,
    /// `Asset / Equipment`
    Type,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NonStandardValue {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    pub field: EquipmentField,
    pub value: String,
}

impl fmt::Display for NonStandardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            EquipmentField::Class => write!(
                f,
                "Row {}: Non-standard equipment class '{}' in Asset System column",
                self.row, self.value
            ),
            EquipmentField::Type => write!(
                f,
                "Row {}: Non-standard equipment type '{}' in Asset/Equipment column",
                self.row, self.value
            ),
        }
    }
}

/// Case-insensitive sets of accepted equipment types and classes.
#[derive(Clone, Debug, Default)]
pub struct EquipmentCatalog {
    types: HashSet<String>,
    classes: HashSet<String>,
}

impl EquipmentCatalog {
    pub fn new<T, C>(types: T, classes: C) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            types: types.into_iter().map(|t| normalize(t.as_ref())).collect(),
            classes: classes.into_iter().map(|c| normalize(c.as_ref())).collect(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.equipment_types, &config.equipment_classes)
    }

    pub fn is_standard_type(&self, value: &str) -> bool {
        self.types.contains(&normalize(value))
    }

    pub fn is_standard_class(&self, value: &str) -> bool {
        self.classes.contains(&normalize(value))
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EquipmentCheck {
    /// Class findings first, then type findings, each in row order.
    pub findings: Vec<NonStandardValue>,
    pub non_standard_classes: BTreeSet<String>,
    pub non_standard_types: BTreeSet<String>,
}

impl EquipmentCheck {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Plain-text warning log: findings, sorted summaries, and a closing note.
    pub fn render(&self) -> String {
        if self.is_clean() {
            return String::new();
        }

        let mut lines = vec![
            "Equipment Validation Warnings:".to_string(),
            "==========================".to_string(),
        ];
        lines.extend(self.findings.iter().map(ToString::to_string));

        for (title, values) in [
            ("Non-standard Equipment Classes found:", &self.non_standard_classes),
            ("Non-standard Equipment Types found:", &self.non_standard_types),
        ] {
            if values.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(title.to_string());
            lines.push("================================".to_string());
            lines.extend(values.iter().map(|v| format!("- {v}")));
        }

        lines.push(String::new());
        lines.push(
            "Note: You can proceed with the upload, but make sure to create these equipment \
             classes/types in your system."
                .to_string(),
        );
        lines.join("\n")
    }
}

/// Check `Asset System` and `Asset / Equipment` values against `catalog`.
///
/// Rows where either column holds the [`PLACEHOLDER`] are skipped, as are empty cells.
/// Missing columns yield no findings for that field.
pub fn check_equipment_values(table: &Table, catalog: &EquipmentCatalog) -> EquipmentCheck {
    let class_col = table.column_index_ignore_case(fields::ASSET_SYSTEM);
    let type_col = table.column_index_ignore_case(fields::ASSET_EQUIPMENT);

    let cell_text = |row: usize, col: Option<usize>| {
        col.and_then(|c| table.cell(row, c))
            .map(|v| v.to_text().trim().to_string())
            .unwrap_or_default()
    };

    let candidate_rows: Vec<(usize, String, String)> = (0..table.row_count())
        .map(|row| (row, cell_text(row, class_col), cell_text(row, type_col)))
        .filter(|(_, class, kind)| class != PLACEHOLDER && kind != PLACEHOLDER)
        .collect();

    let mut check = EquipmentCheck::default();
    for (row, class, _) in &candidate_rows {
        if !class.is_empty() && !catalog.is_standard_class(class) {
            check.findings.push(NonStandardValue {
                row: row + 2,
                field: EquipmentField::Class,
                value: class.clone(),
            });
            check.non_standard_classes.insert(class.clone());
        }
    }
    for (row, _, kind) in &candidate_rows {
        if !kind.is_empty() && !catalog.is_standard_type(kind) {
            check.findings.push(NonStandardValue {
                row: row + 2,
                field: EquipmentField::Type,
                value: kind.clone(),
            });
            check.non_standard_types.insert(kind.clone());
        }
    }

    if !check.is_clean() {
        log::warn!(
            "found {} non-standard equipment types/classes",
            check.findings.len()
        );
    }
    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    fn table(rows: &[(&str, &str)]) -> Table {
        Table::from_rows(
            vec!["Asset System".into(), "Asset / Equipment".into()],
            rows.iter()
                .map(|(class, kind)| vec![CellValue::from(*class), CellValue::from(*kind)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn flags_unknown_values_with_sheet_row_numbers() {
        let catalog = EquipmentCatalog::from_config(&CatalogConfig::default());
        let check = check_equipment_values(
            &table(&[
                ("HVAC", "Exhaust Fan"),
                ("Mandatory", "Mandatory"),
                ("Landscaping", "Chiller"),
                ("hvac", "Mystery Box"),
                ("", ""),
            ]),
            &catalog,
        );

        let rendered: Vec<String> = check.findings.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "Row 4: Non-standard equipment class 'Landscaping' in Asset System column",
                "Row 5: Non-standard equipment type 'Mystery Box' in Asset/Equipment column",
            ]
        );
        assert_eq!(
            check.non_standard_types.iter().collect::<Vec<_>>(),
            vec!["Mystery Box"]
        );
    }

    #[test]
    fn placeholder_in_either_column_skips_the_row() {
        let catalog = EquipmentCatalog::new(["fan"], ["hvac"]);
        let check = check_equipment_values(&table(&[("Unknown", "Mandatory")]), &catalog);
        assert!(check.is_clean());
        assert_eq!(check.render(), "");
    }

    #[test]
    fn render_lists_sorted_summaries() {
        let catalog = EquipmentCatalog::new(Vec::<String>::new(), ["hvac"]);
        let check = check_equipment_values(
            &table(&[("Zeta", ""), ("Alpha", ""), ("Zeta", "")]),
            &catalog,
        );
        let text = check.render();
        assert!(text.starts_with("Equipment Validation Warnings:\n"));
        assert!(text.contains("Non-standard Equipment Classes found:\n================================\n- Alpha\n- Zeta"));
        assert!(!text.contains("Types found"));
        assert!(text.ends_with("classes/types in your system."));
    }
}
