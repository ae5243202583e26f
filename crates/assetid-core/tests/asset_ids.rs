use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use assetid_core::{
    generate_asset_ids, AbbreviationOracle, AssetIdConfig, AssetIdProcessor, CanonicalSchema,
    CellValue, GeneratorConfig, IdGenerator, IdSettings, LogNotifier, OracleRequest,
    SegmentStyle, Table, EQUIPMENT_ID_COLUMN, LOCATION_ID_COLUMN, SPACE_ID_COLUMN,
    SUBSPACE_ID_COLUMN,
};
use pretty_assertions::assert_eq;

fn text_row(values: &[&str]) -> Vec<CellValue> {
    values
        .iter()
        .map(|v| {
            if v.is_empty() {
                CellValue::Empty
            } else {
                CellValue::from(*v)
            }
        })
        .collect()
}

fn register(rows: &[&[&str]]) -> Table {
    Table::from_rows(
        vec![
            "Building".into(),
            "Floor".into(),
            "Sublocation".into(),
            "Subspace".into(),
            "Asset / Equipment".into(),
            "Asset System".into(),
        ],
        rows.iter().map(|r| text_row(r)).collect(),
    )
    .unwrap()
}

fn column(table: &Table, name: &str) -> Vec<String> {
    table
        .column_values(name)
        .unwrap()
        .into_iter()
        .map(CellValue::to_text)
        .collect()
}

#[test]
fn food_court_exhaust_fans() {
    let table = register(&[
        &["Nobles Residential Compound", "3", "Food Court", "", "Exhaust Fan", ""],
        &["Nobles Residential Compound", "3", "Food Court", "", "Exhaust Fan", ""],
    ]);
    let mut generator = IdGenerator::default();

    let output = generate_asset_ids(
        &table,
        &IdSettings::all(),
        &CanonicalSchema::asset_id(),
        &mut generator,
        &LogNotifier,
    )
    .unwrap();

    let out = &output.table;
    assert_eq!(column(out, LOCATION_ID_COLUMN), vec!["NRC-3", "NRC-3"]);
    assert_eq!(column(out, SPACE_ID_COLUMN), vec!["NRC-3-FC", "NRC-3-FC"]);
    assert_eq!(column(out, SUBSPACE_ID_COLUMN), vec!["", ""]);
    assert_eq!(
        column(out, EQUIPMENT_ID_COLUMN),
        vec!["NRC-3-FC-EXF-1", "NRC-3-FC-EXF-2"]
    );

    // Id columns are appended after the input columns, in fixed order.
    assert_eq!(
        &out.headers[out.headers.len() - 4..],
        &["location_id", "space_id", "subspace_id", "equipment_id"]
    );
    assert_eq!(output.report.generated.subspace_id, 0);
    assert_eq!(output.report.generated.equipment_id, 2);
    assert_eq!(output.report.equipment_bases, 1);
}

#[test]
fn clean_segments_spell_out_sublocations() {
    let table = register(&[&["Nobles Residential Compound", "3", "Food Court", "", "Exhaust Fan", ""]]);
    let mut generator = IdGenerator::new(GeneratorConfig {
        segment_style: SegmentStyle::Clean,
        ..GeneratorConfig::default()
    });

    let output = generate_asset_ids(
        &table,
        &IdSettings::all(),
        &CanonicalSchema::asset_id(),
        &mut generator,
        &LogNotifier,
    )
    .unwrap();

    assert_eq!(column(&output.table, SPACE_ID_COLUMN), vec!["NRC-3-FOOD_COURT"]);
    assert_eq!(
        column(&output.table, EQUIPMENT_ID_COLUMN),
        vec!["NRC-3-FOOD_COURT-EXF-1"]
    );
}

#[test]
fn equipment_sequences_are_per_base_id_and_per_run() {
    let table = register(&[
        &["Tower", "1", "Lobby", "", "", ""],
        &["Tower", "1", "Lobby", "", "none", "None"],
        &["Tower", "1", "Lobby", "", "", "HVAC"],
        &["Tower", "2", "Lobby", "", "", ""],
        &["Tower", "1", "Lobby", "", "", ""],
        &["", "1", "Lobby", "", "Chiller", ""],
    ]);
    let mut processor = AssetIdProcessor::from_config(&AssetIdConfig::default(), None);
    let settings = IdSettings::default();

    let first = processor.process(&table, &settings, &LogNotifier).unwrap();
    let expected = vec![
        "TOWE-1-LOBB-EQP-1",
        "TOWE-1-LOBB-EQP-2",
        "TOWE-1-LOBB-HVC-1",
        "TOWE-2-LOBB-EQP-1",
        "TOWE-1-LOBB-EQP-3",
        "",
    ];
    assert_eq!(column(&first.table, EQUIPMENT_ID_COLUMN), expected);

    // A fresh run starts numbering again.
    let second = processor.process(&table, &settings, &LogNotifier).unwrap();
    assert_eq!(column(&second.table, EQUIPMENT_ID_COLUMN), expected);
    assert_eq!(second.table.column_index(LOCATION_ID_COLUMN), None);
}

#[test]
fn renamed_headers_are_reconciled_and_kept() {
    let table = Table::from_rows(
        vec!["Site".into(), "Level".into(), "Area".into(), "Room".into()],
        vec![vec![
            "Gents Gym Area".into(),
            CellValue::Number(0.0),
            "Display Area".into(),
            "Store 2".into(),
        ]],
    )
    .unwrap();
    let mut generator = IdGenerator::default();

    let output = generate_asset_ids(
        &table,
        &IdSettings::all(),
        &CanonicalSchema::asset_id(),
        &mut generator,
        &LogNotifier,
    )
    .unwrap();

    assert_eq!(
        output.report.mapping.missing,
        vec![
            "Location Criticality",
            "Sublocation Criticality",
            "Subspace Criticality"
        ]
    );
    let out = &output.table;
    assert_eq!(out.headers[..4], ["Site", "Level", "Area", "Room"]);
    assert_eq!(column(out, "Building"), vec!["Gents Gym Area"]);
    assert_eq!(column(out, SUBSPACE_ID_COLUMN), vec!["GGA-0-DSP-S2"]);
    assert_eq!(column(out, EQUIPMENT_ID_COLUMN), vec!["GGA-0-DSP-S2-EQP-1"]);
}

#[test]
fn oracle_is_consulted_once_per_label_across_the_batch() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let oracle = move |req: &OracleRequest<'_>| {
        seen.set(seen.get() + 1);
        match req.label {
            "booster pump" => Some("bstp".to_string()),
            _ => None,
        }
    };
    let oracle: Arc<dyn AbbreviationOracle> = Arc::new(oracle);
    let mut processor = AssetIdProcessor::from_config(&AssetIdConfig::default(), Some(oracle));

    let table = register(&[
        &["Food Court", "1", "", "", "Booster Pump", ""],
        &["Food Court", "1", "", "", "booster pump", ""],
        &["Food Court", "1", "", "", "Exhaust Fan", ""],
    ]);
    let output = processor
        .process(&table, &IdSettings::default(), &LogNotifier)
        .unwrap();

    assert_eq!(
        column(&output.table, EQUIPMENT_ID_COLUMN),
        vec!["FC-1-BSTP-1", "FC-1-BSTP-2", "FC-1-EXF-1"]
    );
    // Static hits never reach the oracle; the pump label is asked once.
    assert_eq!(calls.get(), 1);
}
