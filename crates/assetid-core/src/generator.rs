//! Location -> space -> subspace -> equipment identifiers for a single record.
//!
//! An empty string means "not generated"; every generated id has at least one non-empty
//! hyphen-separated segment.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::abbrev::{AbbreviationCache, AbbreviationOracle, Abbreviator, Flavor};
use crate::config::{AssetIdConfig, GeneratorConfig, IdSettings};
use crate::record::AssetRecord;
use crate::text::{clean, WhitespacePolicy};

/// How sublocation and subspace segments are derived.
///
/// Fixed for the lifetime of an [`IdGenerator`], so one run never mixes styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStyle {
    /// Location-flavored abbreviation: `Food Court` -> `FC`.
    #[default]
    Abbreviate,
    /// Canonicalized text with underscores: `Food Court` -> `FOOD_COURT`.
    Clean,
}

/// Which parts of the hierarchy an equipment id requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentChain {
    /// Only the location id; missing sublocation/subspace segments are skipped.
    #[default]
    Location,
    /// Location, sublocation and subspace must all be present.
    Full,
}

/// Per-run sequence numbers keyed by base id.
///
/// The first request for a base id gets 1; every request consumes a number.
#[derive(Clone, Debug, Default)]
pub struct EquipmentCounters {
    next: HashMap<String, u32>,
}

impl EquipmentCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-then-increment.
    pub fn next(&mut self, base_id: &str) -> u32 {
        let slot = self.next.entry(base_id.to_string()).or_insert(1);
        let value = *slot;
        *slot += 1;
        value
    }

    /// Number the next request for `base_id` would receive.
    pub fn peek(&self, base_id: &str) -> u32 {
        self.next.get(base_id).copied().unwrap_or(1)
    }

    /// Distinct base ids seen so far.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}

/// Ids produced for one record; disabled levels stay empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedIds {
    pub location_id: String,
    pub space_id: String,
    pub subspace_id: String,
    pub equipment_id: String,
}

#[derive(Debug)]
pub struct IdGenerator {
    location: Abbreviator,
    equipment: Abbreviator,
    config: GeneratorConfig,
}

impl IdGenerator {
    /// Built-in tables, no oracle.
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_abbreviators(
            Abbreviator::new(Flavor::Location),
            Abbreviator::new(Flavor::Equipment),
            config,
        )
    }

    pub fn with_abbreviators(
        location: Abbreviator,
        equipment: Abbreviator,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            location,
            equipment,
            config,
        }
    }

    /// Both abbreviators seeded from `config`, sharing `oracle`.
    pub fn from_config(
        config: &AssetIdConfig,
        oracle: Option<Arc<dyn AbbreviationOracle>>,
    ) -> Self {
        let location = Abbreviator::with_cache(
            Flavor::Location,
            AbbreviationCache::seeded(Flavor::Location, &config.abbreviations.location),
        )
        .with_oracle(oracle.clone());
        let equipment = Abbreviator::with_cache(
            Flavor::Equipment,
            AbbreviationCache::seeded(Flavor::Equipment, &config.abbreviations.equipment),
        )
        .with_oracle(oracle);
        Self::with_abbreviators(location, equipment, config.generator.clone())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn abbreviator_mut(&mut self, flavor: Flavor) -> &mut Abbreviator {
        match flavor {
            Flavor::Location => &mut self.location,
            Flavor::Equipment => &mut self.equipment,
        }
    }

    /// `{BUILDING_CODE}-{FLOOR}`; empty unless building and floor both survive cleaning.
    pub fn location_id(&mut self, record: &AssetRecord) -> String {
        let building = record.building.trim();
        let floor = clean(&record.floor, WhitespacePolicy::Strip);
        if floor.is_empty() || clean(building, WhitespacePolicy::Strip).is_empty() {
            return String::new();
        }

        let building_code = self.location.abbreviate(building, self.config.max_code_length);
        format!("{building_code}-{floor}")
    }

    /// `{location_id}-{SUBLOCATION}`.
    pub fn space_id(&mut self, record: &AssetRecord) -> String {
        let location_id = self.location_id(record);
        if location_id.is_empty() {
            return String::new();
        }
        let segment = self.segment(&record.sublocation);
        if segment.is_empty() {
            return String::new();
        }
        format!("{location_id}-{segment}")
    }

    /// `{space_id}-{SUBSPACE}`.
    pub fn subspace_id(&mut self, record: &AssetRecord) -> String {
        let space_id = self.space_id(record);
        if space_id.is_empty() {
            return String::new();
        }
        let segment = self.segment(&record.subspace);
        if segment.is_empty() {
            return String::new();
        }
        format!("{space_id}-{segment}")
    }

    /// `{base_id}-{N}` where base id joins the location id, the present sublocation and
    /// subspace segments, and the equipment code. Consumes one counter value per generated id.
    pub fn equipment_id(&mut self, record: &AssetRecord, counters: &mut EquipmentCounters) -> String {
        let location_id = self.location_id(record);
        if location_id.is_empty() {
            return String::new();
        }

        let sublocation = self.segment(&record.sublocation);
        let subspace = self.segment(&record.subspace);
        if self.config.equipment_chain == EquipmentChain::Full
            && (sublocation.is_empty() || subspace.is_empty())
        {
            return String::new();
        }

        let code = self.equipment_code(record);
        let base_id = [
            location_id.as_str(),
            sublocation.as_str(),
            subspace.as_str(),
            code.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

        let sequence = counters.next(&base_id);
        format!("{base_id}-{sequence}")
    }

    /// Abbreviation of `Asset / Equipment`, else of `Asset System`, else `EQP`.
    pub fn equipment_code(&mut self, record: &AssetRecord) -> String {
        for value in [&record.asset_equipment, &record.asset_system] {
            let value = value.trim();
            if !value.is_empty() && !value.eq_ignore_ascii_case("none") {
                return self.equipment.abbreviate(value, self.config.max_code_length);
            }
        }
        Flavor::Equipment.default_code().to_string()
    }

    /// Every enabled level for one record.
    pub fn generate(
        &mut self,
        record: &AssetRecord,
        settings: &IdSettings,
        counters: &mut EquipmentCounters,
    ) -> GeneratedIds {
        let mut ids = GeneratedIds::default();
        if settings.create_location_id {
            ids.location_id = self.location_id(record);
        }
        if settings.create_space_id {
            ids.space_id = self.space_id(record);
        }
        if settings.create_subspace_id {
            ids.subspace_id = self.subspace_id(record);
        }
        if settings.create_equipment_id {
            ids.equipment_id = self.equipment_id(record, counters);
        }
        ids
    }

    fn segment(&mut self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        match self.config.segment_style {
            SegmentStyle::Abbreviate => self.location.abbreviate(text, self.config.max_code_length),
            SegmentStyle::Clean => clean(text, WhitespacePolicy::Underscore),
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}
