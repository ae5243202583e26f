use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical column names the generator reads.
pub mod fields {
    pub const BUILDING: &str = "Building";
    pub const FLOOR: &str = "Floor";
    pub const SUBLOCATION: &str = "Sublocation";
    pub const SUBSPACE: &str = "Subspace";
    pub const LOCATION_CRITICALITY: &str = "Location Criticality";
    pub const SUBLOCATION_CRITICALITY: &str = "Sublocation Criticality";
    pub const SUBSPACE_CRITICALITY: &str = "Subspace Criticality";
    pub const ASSET_EQUIPMENT: &str = "Asset / Equipment";
    pub const ASSET_SYSTEM: &str = "Asset System";
}

/// One logical field and the header spellings accepted for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    /// Compared case-insensitively against trimmed headers.
    pub synonyms: Vec<String>,
}

impl SchemaField {
    pub fn new(name: &str, synonyms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn accepts(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.synonyms
            .iter()
            .any(|s| s.trim().to_lowercase() == header)
    }
}

/// Ordered logical fields; order decides reconciliation and missing-field reporting order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSchema {
    fields: Vec<SchemaField>,
}

impl CanonicalSchema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    /// Schema used for asset id generation.
    pub fn asset_id() -> Self {
        use fields::*;
        Self::new(vec![
            SchemaField::new(BUILDING, &["building", "facility", "site", "property"]),
            SchemaField::new(FLOOR, &["floor", "level", "storey"]),
            SchemaField::new(
                SUBLOCATION,
                &["sublocation", "sub location", "location", "area", "zone"],
            ),
            SchemaField::new(SUBSPACE, &["subspace", "sub space", "room", "space"]),
            SchemaField::new(
                LOCATION_CRITICALITY,
                &["location criticality", "criticality", "priority"],
            ),
            SchemaField::new(
                SUBLOCATION_CRITICALITY,
                &["sublocation criticality", "space criticality"],
            ),
            SchemaField::new(
                SUBSPACE_CRITICALITY,
                &["subspace criticality", "room criticality"],
            ),
        ])
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Replace the synonyms of named fields; unknown names are appended as new fields.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (name, synonyms) in overrides {
            match self.fields.iter_mut().find(|f| &f.name == name) {
                Some(field) => field.synonyms = synonyms.clone(),
                None => self.fields.push(SchemaField {
                    name: name.clone(),
                    synonyms: synonyms.clone(),
                }),
            }
        }
        self
    }
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self::asset_id()
    }
}
