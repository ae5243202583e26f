//! Whole-table id generation.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::abbrev::AbbreviationOracle;
use crate::config::{AssetIdConfig, IdSettings};
use crate::generator::{EquipmentCounters, IdGenerator};
use crate::reconcile::{apply_column_mapping, reconcile, ColumnMapping};
use crate::record::RecordColumns;
use crate::schema::CanonicalSchema;
use crate::table::{CellValue, Table, TableError};

pub const LOCATION_ID_COLUMN: &str = "location_id";
pub const SPACE_ID_COLUMN: &str = "space_id";
pub const SUBSPACE_ID_COLUMN: &str = "subspace_id";
pub const EQUIPMENT_ID_COLUMN: &str = "equipment_id";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("malformed table: {0}")]
    Table(#[from] TableError),
}

/// Operator-facing sink for warnings and batch failures.
pub trait Notifier {
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes operator messages through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn warning(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Number of non-empty ids written per column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IdCounts {
    pub location_id: usize,
    pub space_id: usize,
    pub subspace_id: usize,
    pub equipment_id: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub rows: usize,
    pub mapping: ColumnMapping,
    pub generated: IdCounts,
    /// Distinct equipment base ids numbered during the run.
    pub equipment_bases: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchOutput {
    pub table: Table,
    pub report: BatchReport,
}

/// Generate the enabled id columns for every row of `table`.
///
/// The input table is not modified. Output is a copy with canonical columns added by the
/// column mapping and the enabled id columns appended in the order location, space, subspace,
/// equipment. Sequence numbers are assigned in row order from a counter table that lives only
/// for this call. On failure the message is passed to `notifier` before the error is returned,
/// and no partial table is produced.
pub fn generate_asset_ids(
    table: &Table,
    settings: &IdSettings,
    schema: &CanonicalSchema,
    generator: &mut IdGenerator,
    notifier: &dyn Notifier,
) -> Result<BatchOutput, BatchError> {
    run_batch(table, settings, schema, generator, notifier).map_err(|err| {
        notifier.error(&format!("Error processing asset IDs: {err}"));
        err
    })
}

fn run_batch(
    table: &Table,
    settings: &IdSettings,
    schema: &CanonicalSchema,
    generator: &mut IdGenerator,
    notifier: &dyn Notifier,
) -> Result<BatchOutput, BatchError> {
    table.validate_shape()?;

    let mapping = reconcile(&table.headers, schema);
    if !mapping.missing.is_empty() {
        notifier.warning(&format!(
            "Some columns are missing or renamed: {}. Using column mapping to proceed.",
            mapping.missing.join(", ")
        ));
    }
    let mut out = apply_column_mapping(table, &mapping)?;

    let columns = RecordColumns::resolve(&out);
    let mut counters = EquipmentCounters::new();
    let mut location_ids = Vec::with_capacity(out.row_count());
    let mut space_ids = Vec::with_capacity(out.row_count());
    let mut subspace_ids = Vec::with_capacity(out.row_count());
    let mut equipment_ids = Vec::with_capacity(out.row_count());

    for row in 0..out.row_count() {
        let record = columns.record(&out, row);
        let ids = generator.generate(&record, settings, &mut counters);
        location_ids.push(ids.location_id);
        space_ids.push(ids.space_id);
        subspace_ids.push(ids.subspace_id);
        equipment_ids.push(ids.equipment_id);
    }

    let mut generated = IdCounts::default();
    let outputs = [
        (settings.create_location_id, LOCATION_ID_COLUMN, location_ids, &mut generated.location_id),
        (settings.create_space_id, SPACE_ID_COLUMN, space_ids, &mut generated.space_id),
        (settings.create_subspace_id, SUBSPACE_ID_COLUMN, subspace_ids, &mut generated.subspace_id),
        (settings.create_equipment_id, EQUIPMENT_ID_COLUMN, equipment_ids, &mut generated.equipment_id),
    ];
    for (enabled, name, ids, count) in outputs {
        if !enabled {
            continue;
        }
        *count = ids.iter().filter(|id| !id.is_empty()).count();
        out.set_column(name, ids.into_iter().map(CellValue::Text).collect())?;
    }

    log::info!(
        "generated ids for {} rows ({} equipment base ids)",
        out.row_count(),
        counters.len()
    );

    Ok(BatchOutput {
        report: BatchReport {
            rows: out.row_count(),
            mapping,
            generated,
            equipment_bases: counters.len(),
        },
        table: out,
    })
}

/// Schema plus generator, configured once and reused across tables.
///
/// Abbreviation caches persist across [`AssetIdProcessor::process`] calls; counters do not.
#[derive(Debug)]
pub struct AssetIdProcessor {
    schema: CanonicalSchema,
    generator: IdGenerator,
}

impl AssetIdProcessor {
    pub fn new(schema: CanonicalSchema, generator: IdGenerator) -> Self {
        Self { schema, generator }
    }

    pub fn from_config(config: &AssetIdConfig, oracle: Option<Arc<dyn AbbreviationOracle>>) -> Self {
        Self::new(
            config.canonical_schema(),
            IdGenerator::from_config(config, oracle),
        )
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    pub fn generator_mut(&mut self) -> &mut IdGenerator {
        &mut self.generator
    }

    pub fn process(
        &mut self,
        table: &Table,
        settings: &IdSettings,
        notifier: &dyn Notifier,
    ) -> Result<BatchOutput, BatchError> {
        generate_asset_ids(table, settings, &self.schema, &mut self.generator, notifier)
    }
}
