use crate::schema::fields;
use crate::table::Table;

/// The fields of one input row that id generation reads.
///
/// Values are the cell text as read (untrimmed); absent columns and empty cells are `""`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetRecord {
    pub building: String,
    pub floor: String,
    pub sublocation: String,
    pub subspace: String,
    pub asset_equipment: String,
    pub asset_system: String,
}

/// Column positions of the record fields within one table, resolved once per table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordColumns {
    building: Option<usize>,
    floor: Option<usize>,
    sublocation: Option<usize>,
    subspace: Option<usize>,
    asset_equipment: Option<usize>,
    asset_system: Option<usize>,
}

impl RecordColumns {
    /// Location fields are looked up by their exact canonical names (the column mapping has
    /// already been applied); the equipment columns also accept any casing.
    pub fn resolve(table: &Table) -> Self {
        let equipment_column = |name: &str| {
            table
                .column_index(name)
                .or_else(|| table.column_index_ignore_case(name))
        };
        Self {
            building: table.column_index(fields::BUILDING),
            floor: table.column_index(fields::FLOOR),
            sublocation: table.column_index(fields::SUBLOCATION),
            subspace: table.column_index(fields::SUBSPACE),
            asset_equipment: equipment_column(fields::ASSET_EQUIPMENT),
            asset_system: equipment_column(fields::ASSET_SYSTEM),
        }
    }

    pub fn record(&self, table: &Table, row: usize) -> AssetRecord {
        let text = |col: Option<usize>| {
            col.and_then(|c| table.cell(row, c))
                .map(|v| v.to_text())
                .unwrap_or_default()
        };
        AssetRecord {
            building: text(self.building),
            floor: text(self.floor),
            sublocation: text(self.sublocation),
            subspace: text(self.subspace),
            asset_equipment: text(self.asset_equipment),
            asset_system: text(self.asset_system),
        }
    }
}
