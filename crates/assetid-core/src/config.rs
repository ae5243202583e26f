//! Run settings and the optional TOML configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abbrev::tables::{EQUIPMENT_ABBREVIATIONS, EQUIPMENT_CLASSES};
use crate::abbrev::DEFAULT_MAX_LENGTH;
use crate::generator::{EquipmentChain, SegmentStyle};
use crate::schema::CanonicalSchema;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid id settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Which id columns a batch run populates.
///
/// All four keys are required when deserializing; unknown keys are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdSettings {
    pub create_location_id: bool,
    pub create_space_id: bool,
    pub create_subspace_id: bool,
    pub create_equipment_id: bool,
}

impl IdSettings {
    pub fn all() -> Self {
        Self {
            create_location_id: true,
            create_space_id: true,
            create_subspace_id: true,
            create_equipment_id: true,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn any_enabled(&self) -> bool {
        self.create_location_id
            || self.create_space_id
            || self.create_subspace_id
            || self.create_equipment_id
    }
}

impl Default for IdSettings {
    /// Equipment ids only.
    fn default() -> Self {
        Self {
            create_location_id: false,
            create_space_id: false,
            create_subspace_id: false,
            create_equipment_id: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub segment_style: SegmentStyle,
    pub equipment_chain: EquipmentChain,
    pub max_code_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            segment_style: SegmentStyle::default(),
            equipment_chain: EquipmentChain::default(),
            max_code_length: DEFAULT_MAX_LENGTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// TOML file holding an `openai_api_key` entry; consulted after the environment.
    pub secrets_path: PathBuf,
    pub api_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 10,
            secrets_path: PathBuf::from("secrets.toml"),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Extra static abbreviations merged over the built-in tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AbbreviationConfig {
    pub location: BTreeMap<String, String>,
    pub equipment: BTreeMap<String, String>,
}

/// Standard equipment values for the equipment value checker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub equipment_types: Vec<String>,
    pub equipment_classes: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let equipment_classes: Vec<String> =
            EQUIPMENT_CLASSES.iter().map(|s| s.to_string()).collect();
        let equipment_types = EQUIPMENT_ABBREVIATIONS
            .iter()
            .map(|(label, _)| *label)
            .filter(|label| *label != "none" && !EQUIPMENT_CLASSES.contains(label))
            .map(str::to_string)
            .collect();
        Self {
            equipment_types,
            equipment_classes,
        }
    }
}

/// Contents of an `assetid.toml` file. Every section is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetIdConfig {
    pub generator: GeneratorConfig,
    pub oracle: OracleConfig,
    /// Logical field -> synonyms, replacing the built-in list for that field.
    pub schema: BTreeMap<String, Vec<String>>,
    pub abbreviations: AbbreviationConfig,
    pub catalog: CatalogConfig,
}

impl AssetIdConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// The asset id schema with any configured synonym overrides applied.
    pub fn canonical_schema(&self) -> CanonicalSchema {
        CanonicalSchema::asset_id().with_overrides(&self.schema)
    }
}
