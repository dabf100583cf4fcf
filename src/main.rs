use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use grant_explorer::data::artifacts::{load_artifacts, write_artifacts};
use grant_explorer::data::loader::load_file;
use grant_explorer::data::normalize::amount_value;
use grant_explorer::data::text::format_usd;
use grant_explorer::state::RangeKind;
use grant_explorer::{ExplorerConfig, ExplorerState, GrantDataset, Range, Record};

#[derive(Parser)]
#[command(name = "grant-explorer")]
#[command(about = "Build and query research-grant explorer data")]
struct Cli {
    /// JSON file overriding the column configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a sheet export and write grants.json + options.json
    Build {
        /// .csv, .json or .parquet export of the grant sheet
        input: PathBuf,
        /// Directory receiving the artifacts
        #[arg(long, default_value = "public/data")]
        out_dir: PathBuf,
    },

    /// Filter the built artifacts and print the matching grants
    Query {
        /// Directory holding grants.json and options.json
        #[arg(long, default_value = "public/data")]
        data_dir: PathBuf,
        /// Select a value, e.g. --select "Agency=NIH" (repeatable)
        #[arg(long = "select", value_parser = parse_selection)]
        selections: Vec<(String, String)>,
        /// Fiscal year range, e.g. 2010..2020
        #[arg(long, value_parser = parse_range)]
        year: Option<Range>,
        /// Funding range in dollars, e.g. 0..500000
        #[arg(long, value_parser = parse_range)]
        amount: Option<Range>,
        /// Free-text search; every word must match
        #[arg(long, default_value = "")]
        search: String,
        /// Print the matching records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ExplorerConfig::from_path(path)?,
        None => ExplorerConfig::default(),
    };

    match cli.command {
        Command::Build { input, out_dir } => build(&input, &out_dir, &config),
        Command::Query {
            data_dir,
            selections,
            year,
            amount,
            search,
            json,
        } => {
            let dataset = load_artifacts(&data_dir, &config)?;
            let mut state = ExplorerState::new(config);
            state.set_dataset(dataset);
            for (column, value) in &selections {
                state.toggle_filter_value(column, value);
            }
            if let Some(range) = year {
                state.set_range(RangeKind::FiscalYear, range);
            }
            if let Some(range) = amount {
                state.set_range(RangeKind::Amount, range);
            }
            state.set_query(search);
            print_view(&state, json)
        }
    }
}

fn build(input: &Path, out_dir: &Path, config: &ExplorerConfig) -> Result<()> {
    let rows = load_file(input).with_context(|| format!("loading {}", input.display()))?;
    let dataset = GrantDataset::from_raw(&rows, config);
    write_artifacts(out_dir, &dataset.records, &dataset.options)?;
    info!(
        "{} grants, {} columns, {} filterable",
        dataset.len(),
        dataset.column_names.len(),
        dataset.options.len()
    );
    Ok(())
}

fn print_view(state: &ExplorerState, json: bool) -> Result<()> {
    let records = state.visible_records();
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{}", state.summary_line());
    println!("Total funding: {}", state.formatted_total());
    if !state.query.trim().is_empty() {
        println!("Search: {}", state.query.trim());
    }
    println!();
    for record in records {
        println!("{}", sheet_row(record, &state.config));
    }
    Ok(())
}

/// Title | Year | Agency | Amount, with "—" for missing cells.
fn sheet_row(record: &Record, config: &ExplorerConfig) -> String {
    let title = record
        .text("Project Title")
        .unwrap_or_else(|| "(untitled)".to_string());
    let year = record
        .text(&config.year_column)
        .unwrap_or_else(|| "—".to_string());
    let agency = record.text("Agency").unwrap_or_else(|| "—".to_string());
    let amount = record
        .get(&config.amount_column)
        .and_then(amount_value)
        .map(format_usd)
        .unwrap_or_else(|| "—".to_string());
    format!("{title} | {year} | {agency} | {amount}")
}

fn parse_selection(s: &str) -> Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got {s:?}"))?;
    Ok((column.trim().to_string(), value.trim().to_string()))
}

fn parse_range(s: &str) -> Result<Range, String> {
    let (min, max) = s
        .split_once("..")
        .ok_or_else(|| format!("expected MIN..MAX, got {s:?}"))?;
    let bound = |b: &str| {
        b.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad range bound {b:?}: {e}"))
    };
    Ok(Range::new(bound(min)?, bound(max)?))
}
