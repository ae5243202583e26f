use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use assetid_core::abbrev::{normalize_label, oracle_from_config};
use assetid_core::{
    check_equipment_values, reconcile, AbbreviationOracle, AssetIdConfig, AssetIdProcessor,
    BatchReport, CodeSource, ColumnMapping, EquipmentCatalog, Flavor, IdSettings, LogNotifier,
    Table,
};
use assetid_io::{default_output_path, read_table, write_table, DEFAULT_SHEET};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "assetid",
    version,
    about = "Generate location, space, subspace and equipment ids for facility asset registers."
)]
pub struct Args {
    /// Increase log verbosity (`-v` info, `-vv` debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read an asset register, append id columns and write the result.
    Generate(GenerateArgs),
    /// Warn about equipment classes and types outside the standard catalog.
    CheckEquipment(CheckArgs),
    /// Abbreviate a single label.
    Abbreviate(AbbreviateArgs),
    /// Show how the input headers map onto the canonical fields.
    Columns(ColumnsArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FlavorArg {
    Location,
    Equipment,
}

impl From<FlavorArg> for Flavor {
    fn from(value: FlavorArg) -> Self {
        match value {
            FlavorArg::Location => Flavor::Location,
            FlavorArg::Equipment => Flavor::Equipment,
        }
    }
}

#[derive(ClapArgs)]
struct InputArgs {
    /// Workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) or `.csv` file.
    input: PathBuf,

    /// Worksheet to read. Ignored for CSV input.
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,
}

#[derive(ClapArgs)]
struct GenerateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file; `.xlsx` or `.csv`. Defaults to `<input-stem>_processed.xlsx`.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON file with the four `create_*_id` flags.
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["location", "space", "subspace", "equipment"]
    )]
    settings: Option<PathBuf>,

    /// Create `location_id`.
    #[arg(long)]
    location: bool,

    /// Create `space_id`.
    #[arg(long)]
    space: bool,

    /// Create `subspace_id`.
    #[arg(long)]
    subspace: bool,

    /// Create `equipment_id`. This is the only column created when no flag is given.
    #[arg(long)]
    equipment: bool,

    #[command(flatten)]
    config: ConfigArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ClapArgs)]
struct ConfigArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Never call the remote abbreviation service.
    #[arg(long)]
    no_oracle: bool,
}

#[derive(ClapArgs)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,

    /// TOML configuration file (only `[catalog]` is used).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ClapArgs)]
struct AbbreviateArgs {
    label: String,

    #[arg(long, value_enum, default_value_t = FlavorArg::Location)]
    flavor: FlavorArg,

    /// Maximum code length. Defaults to `[generator] max_code_length`.
    #[arg(long, value_name = "N")]
    max_length: Option<usize>,

    #[command(flatten)]
    config: ConfigArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ClapArgs)]
struct ColumnsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// TOML configuration file (only `[schema]` is used).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Generate(args) => generate(args),
        Command::CheckEquipment(args) => check_equipment(args),
        Command::Abbreviate(args) => abbreviate(args),
        Command::Columns(args) => columns(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<AssetIdConfig> {
    match path {
        Some(path) => AssetIdConfig::load(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(AssetIdConfig::default()),
    }
}

fn build_oracle(config: &AssetIdConfig, disabled: bool) -> Option<Arc<dyn AbbreviationOracle>> {
    if disabled {
        log::debug!("abbreviation oracle disabled by --no-oracle");
        return None;
    }
    oracle_from_config(&config.oracle).map(Arc::from)
}

fn resolve_settings(args: &GenerateArgs) -> Result<IdSettings> {
    if let Some(path) = args.settings.as_deref() {
        return IdSettings::load_json(path)
            .with_context(|| format!("load settings {}", path.display()));
    }
    if args.location || args.space || args.subspace || args.equipment {
        return Ok(IdSettings {
            create_location_id: args.location,
            create_space_id: args.space,
            create_subspace_id: args.subspace,
            create_equipment_id: args.equipment,
        });
    }
    Ok(IdSettings::default())
}

fn read_input(input: &InputArgs) -> Result<Table> {
    read_table(&input.input, &input.sheet)
        .with_context(|| format!("read {}", input.input.display()))
}

#[derive(Debug, Serialize)]
struct GenerateReport<'a> {
    input: String,
    output: String,
    settings: IdSettings,
    #[serde(flatten)]
    report: &'a BatchReport,
}

fn generate(args: GenerateArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    if !settings.any_enabled() {
        log::warn!("no id columns enabled; output will only carry mapped columns");
    }
    let config = load_config(args.config.config.as_deref())?;
    let oracle = build_oracle(&config, args.config.no_oracle);

    let table = read_input(&args.input)?;
    let mut processor = AssetIdProcessor::from_config(&config, oracle);
    let output = processor.process(&table, &settings, &LogNotifier)?;

    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input.input));
    write_table(&out_path, &output.table, &args.input.sheet)
        .with_context(|| format!("write {}", out_path.display()))?;

    let report = GenerateReport {
        input: args.input.input.display().to_string(),
        output: out_path.display().to_string(),
        settings,
        report: &output.report,
    };
    match args.format {
        OutputFormat::Json => write_json(&report),
        OutputFormat::Text => {
            let mut text = format!(
                "Processed {} rows: {} -> {}\n",
                report.report.rows, report.input, report.output
            );
            text.push_str(&render_mapping(&report.report.mapping));
            let counts = &report.report.generated;
            text.push_str("Generated ids:\n");
            for (enabled, name, count) in [
                (settings.create_location_id, "location_id", counts.location_id),
                (settings.create_space_id, "space_id", counts.space_id),
                (settings.create_subspace_id, "subspace_id", counts.subspace_id),
                (settings.create_equipment_id, "equipment_id", counts.equipment_id),
            ] {
                if enabled {
                    text.push_str(&format!("  {name}: {count}\n"));
                }
            }
            write_stdout(&text)
        }
    }
}

fn check_equipment(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let catalog = EquipmentCatalog::from_config(&config.catalog);
    let table = read_input(&args.input)?;

    let check = check_equipment_values(&table, &catalog);
    log::info!(
        "{} non-standard equipment values in {} rows",
        check.findings.len(),
        table.row_count()
    );

    match args.format {
        OutputFormat::Json => write_json(&check),
        OutputFormat::Text if check.is_clean() => {
            write_stdout("No non-standard equipment classes or types found.\n")
        }
        OutputFormat::Text => write_stdout(&format!("{}\n", check.render())),
    }
}

#[derive(Debug, Serialize)]
struct AbbreviationReport<'a> {
    label: &'a str,
    flavor: Flavor,
    code: String,
    source: &'static str,
}

fn abbreviate(args: AbbreviateArgs) -> Result<()> {
    let config = load_config(args.config.config.as_deref())?;
    let oracle = build_oracle(&config, args.config.no_oracle);
    let max_length = args.max_length.unwrap_or(config.generator.max_code_length);
    let flavor = Flavor::from(args.flavor);

    let mut processor = AssetIdProcessor::from_config(&config, oracle);
    let abbreviator = processor.generator_mut().abbreviator_mut(flavor);
    let code = abbreviator.abbreviate(&args.label, max_length);
    let source = match abbreviator.cache().source(&normalize_label(&args.label)) {
        Some(CodeSource::Static) => "static",
        Some(CodeSource::Oracle) => "oracle",
        Some(CodeSource::Heuristic) => "heuristic",
        None => "default",
    };

    match args.format {
        OutputFormat::Json => write_json(&AbbreviationReport {
            label: &args.label,
            flavor,
            code,
            source,
        }),
        OutputFormat::Text => write_stdout(&format!("{code}\n")),
    }
}

fn columns(args: ColumnsArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let schema = config.canonical_schema();
    let table = read_input(&args.input)?;

    let mapping = reconcile(&table.headers, &schema);
    match args.format {
        OutputFormat::Json => write_json(&mapping),
        OutputFormat::Text => write_stdout(&render_mapping(&mapping)),
    }
}

fn render_mapping(mapping: &ColumnMapping) -> String {
    let mut text = String::from("Column mapping:\n");
    for binding in &mapping.bindings {
        text.push_str(&format!("  {} <- {}\n", binding.field, binding.header));
    }
    if !mapping.missing.is_empty() {
        text.push_str(&format!("Missing fields: {}\n", mapping.missing.join(", ")));
    }
    text
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    write_stdout(&text)
}

/// A closed stdout (e.g. piping into `head`) is not an error.
fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match handle.write_all(text.as_bytes()).and_then(|()| handle.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
