//! `assetid-core` derives hierarchical, human-readable identifiers for facility asset
//! registers.
//!
//! The pipeline for one table:
//! - [`reconcile`] loosely named headers against a [`CanonicalSchema`]
//! - [`apply_column_mapping`] to expose the canonical columns
//! - run an [`IdGenerator`] over every row, sharing one [`EquipmentCounters`] table
//!
//! [`generate_asset_ids`] wires these together. Spreadsheet I/O lives in `assetid-io`.

pub mod abbrev;
mod batch;
pub mod config;
mod equipment_check;
mod generator;
mod reconcile;
mod record;
pub mod schema;
mod table;
pub mod text;

pub use abbrev::{
    AbbreviationCache, AbbreviationOracle, Abbreviator, CodeSource, Flavor, OracleRequest,
    DEFAULT_MAX_LENGTH,
};
pub use batch::{
    generate_asset_ids, AssetIdProcessor, BatchError, BatchOutput, BatchReport, IdCounts,
    LogNotifier, Notifier, EQUIPMENT_ID_COLUMN, LOCATION_ID_COLUMN, SPACE_ID_COLUMN,
    SUBSPACE_ID_COLUMN,
};
pub use config::{AssetIdConfig, ConfigError, GeneratorConfig, IdSettings, OracleConfig};
pub use equipment_check::{
    check_equipment_values, EquipmentCatalog, EquipmentCheck, EquipmentField, NonStandardValue,
    PLACEHOLDER,
};
pub use generator::{EquipmentChain, EquipmentCounters, GeneratedIds, IdGenerator, SegmentStyle};
pub use reconcile::{apply_column_mapping, reconcile, ColumnMapping, FieldBinding};
pub use record::{AssetRecord, RecordColumns};
pub use schema::{CanonicalSchema, SchemaField};
pub use table::{CellValue, Table, TableError};
pub use text::{clean, WhitespacePolicy};
