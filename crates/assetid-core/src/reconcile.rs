//! Resolve loosely named input headers to canonical field names.

use serde::Serialize;

use crate::schema::CanonicalSchema;
use crate::table::{Table, TableError};

/// A logical field bound to the header that satisfied it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    pub field: String,
    pub header: String,
}

/// Result of [`reconcile`]: bindings for resolved fields and the unresolved ones, both in
/// schema order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub bindings: Vec<FieldBinding>,
    pub missing: Vec<String>,
}

impl ColumnMapping {
    /// Actual header bound to `field`.
    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.field == field)
            .map(|b| b.header.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Bind each schema field to the first header (in header order) matching any of its synonyms.
///
/// Headers are compared trimmed and case-insensitively. A header is not consumed by a match, so
/// one header may satisfy several fields.
pub fn reconcile<S: AsRef<str>>(headers: &[S], schema: &CanonicalSchema) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for field in schema.fields() {
        let hit = headers
            .iter()
            .map(AsRef::as_ref)
            .find(|header| field.accepts(header));
        match hit {
            Some(header) => mapping.bindings.push(FieldBinding {
                field: field.name.clone(),
                header: header.to_string(),
            }),
            None => mapping.missing.push(field.name.clone()),
        }
    }

    mapping
}

/// Copy each bound column under its canonical name, leaving the original columns in place.
///
/// A column that already carries the canonical name is overwritten; bindings whose header
/// already equals the field name are skipped.
pub fn apply_column_mapping(table: &Table, mapping: &ColumnMapping) -> Result<Table, TableError> {
    let mut out = table.clone();
    for binding in &mapping.bindings {
        if binding.header == binding.field {
            continue;
        }
        let Some(col) = table.column_index(&binding.header) else {
            continue;
        };
        let values = table
            .rows
            .iter()
            .map(|row| row.get(col).cloned().unwrap_or_default())
            .collect();
        out.set_column(&binding.field, values)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaField;
    use crate::table::CellValue;
    use pretty_assertions::assert_eq;

    fn binding(field: &str, header: &str) -> FieldBinding {
        FieldBinding {
            field: field.to_string(),
            header: header.to_string(),
        }
    }

    #[test]
    fn resolves_synonyms_case_insensitively() {
        let schema = CanonicalSchema::new(vec![
            SchemaField::new("Building", &["building", "site"]),
            SchemaField::new("Floor", &["floor", "level"]),
            SchemaField::new("Sublocation", &["sublocation", "area"]),
        ]);

        let mapping = reconcile(&["Site", "Level", "Area"], &schema);
        assert_eq!(
            mapping,
            ColumnMapping {
                bindings: vec![
                    binding("Building", "Site"),
                    binding("Floor", "Level"),
                    binding("Sublocation", "Area"),
                ],
                missing: vec![],
            }
        );
    }

    #[test]
    fn first_matching_header_wins_and_missing_fields_keep_schema_order() {
        let mapping = reconcile(
            &[" ZONE ", "Location", "Priority", "Room"],
            &CanonicalSchema::asset_id(),
        );

        assert_eq!(mapping.header_for("Sublocation"), Some(" ZONE "));
        assert_eq!(mapping.header_for("Subspace"), Some("Room"));
        assert_eq!(mapping.header_for("Location Criticality"), Some("Priority"));
        assert_eq!(
            mapping.missing,
            vec![
                "Building".to_string(),
                "Floor".to_string(),
                "Sublocation Criticality".to_string(),
                "Subspace Criticality".to_string(),
            ]
        );
        assert!(!mapping.is_complete());
    }

    #[test]
    fn one_header_can_satisfy_several_fields() {
        let schema = CanonicalSchema::new(vec![
            SchemaField::new("Sublocation", &["space"]),
            SchemaField::new("Subspace", &["space"]),
        ]);
        let mapping = reconcile(&["Space"], &schema);
        assert_eq!(mapping.header_for("Sublocation"), Some("Space"));
        assert_eq!(mapping.header_for("Subspace"), Some("Space"));
    }

    #[test]
    fn mapping_is_applied_by_copy() {
        let table = Table::from_rows(
            vec!["Site".into(), "Floor".into()],
            vec![vec!["HQ".into(), CellValue::Number(2.0)]],
        )
        .unwrap();
        let mapping = reconcile(&table.headers, &CanonicalSchema::asset_id());

        let mapped = apply_column_mapping(&table, &mapping).unwrap();
        assert_eq!(mapped.headers, vec!["Site", "Floor", "Building"]);
        assert_eq!(mapped.value(0, "Building"), Some(&CellValue::from("HQ")));
        assert_eq!(mapped.value(0, "Site"), Some(&CellValue::from("HQ")));
        // Source table is untouched.
        assert_eq!(table.headers, vec!["Site", "Floor"]);
    }
}
