//! Turning the raw extracts into the intermediate per-table CSV files.
//!
//! The three source files are processed as independent tasks; the output
//! directory is ready once all three have written their tables.

pub mod records;
pub mod resolve;
pub mod split;

pub use records::*;
pub use resolve::*;
pub use split::*;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::parser::{read_rows, write_rows};
use crate::paths::DataDir;
use crate::schema::tables::*;
use crate::schema::TableSchema;
use crate::ui::{Phase, Ui};

/// Number of unresolved names spelled out in the log
const UNRESOLVED_PREVIEW: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct WrangleOptions {
    pub name_policy: NamePolicy,
}

/// One intermediate file written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Default)]
pub struct WrangleReport {
    pub tables: Vec<TableSummary>,
    pub unresolved: Vec<UnresolvedName>,
}

impl WrangleReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Run all three source transformations and land their output under
/// `processed/`.
///
/// Tables are written to a staging directory first; `processed/` is only
/// replaced once every task has succeeded.
pub fn wrangle<U: Ui>(
    data: &DataDir,
    options: &WrangleOptions,
    ui: &mut U,
) -> Result<WrangleReport> {
    ui.set_phase(Phase::Wrangling);
    ui.set_info(data.root().display().to_string());

    let staging = data.begin_staging()?;
    info!("Wrangling {} into {}", data.root().display(), staging.display());

    let report = match wrangle_into(data, &staging, options) {
        Ok(report) => report,
        Err(err) => {
            data.discard_staging();
            return Err(err);
        }
    };
    let out_dir = data.publish_staging()?;

    report_unresolved(&report.unresolved);
    for summary in &report.tables {
        ui.log(format!("{}: {} rows", summary.table, summary.rows));
    }
    info!(
        "Wrangling complete: {} files, {} rows in {}",
        report.tables.len(),
        report.total_rows(),
        out_dir.display()
    );

    Ok(report)
}

fn wrangle_into(
    data: &DataDir,
    out_dir: &Path,
    options: &WrangleOptions,
) -> Result<WrangleReport> {
    let (evolutions, (core, moves)) = rayon::join(
        || process_evolutions(data, out_dir, options.name_policy),
        || {
            rayon::join(
                || process_core_dataset(data, out_dir),
                || process_moves(data, out_dir),
            )
        },
    );

    let (evolutions, unresolved) = evolutions?;
    let mut report = WrangleReport {
        tables: core?,
        unresolved,
    };
    report.tables.extend(moves?);
    report.tables.push(evolutions);

    Ok(report)
}

/// core dataset -> pokemon, abilities, legendary status, statistics, pokedex entries
fn process_core_dataset(data: &DataDir, out_dir: &Path) -> Result<Vec<TableSummary>> {
    let path = data.core_file();
    info!("Processing {}", path.display());

    let rows: Vec<CoreRow> = read_rows(&path)?;
    let tables = split_core(&rows);

    Ok(vec![
        write_table(out_dir, &POKEMON, &tables.pokemon)?,
        write_table(out_dir, &POKEMON_ABILITIES, &tables.abilities)?,
        write_table(out_dir, &POKEMON_LEGENDARY_STATUS, &tables.legendary)?,
        write_table(out_dir, &POKEMON_STATISTICS, &tables.statistics)?,
        write_table(out_dir, &POKEMON_POKEDEX_ENTRIES, &tables.pokedex_entries)?,
    ])
}

/// moves/height/weight -> measurements, best moves
fn process_moves(data: &DataDir, out_dir: &Path) -> Result<Vec<TableSummary>> {
    let path = data.moves_file();
    info!("Processing {}", path.display());

    let rows: Vec<MovesRow> = read_rows(&path)?;
    let tables = split_moves(&rows);

    Ok(vec![
        write_table(out_dir, &POKEMON_MEASUREMENTS, &tables.measurements)?,
        write_table(out_dir, &POKEMON_BEST_MOVES, &tables.best_moves)?,
    ])
}

/// evolution log -> evolutions, ids looked up by name in the core dataset
fn process_evolutions(
    data: &DataDir,
    out_dir: &Path,
    policy: NamePolicy,
) -> Result<(TableSummary, Vec<UnresolvedName>)> {
    let core: Vec<CoreRow> = read_rows(&data.core_file())?;
    let index = NameIndex::from_core(&core, policy).context("Failed to build name lookup")?;
    info!("Lookup map created with {} entries", index.len());

    let path = data.evolution_file();
    let log: Vec<EvolutionLogRow> = read_rows(&path)?;
    info!("Processing {} evolution log entries", log.len());

    let resolution = resolve_evolutions(&index, &log);
    let summary = write_table(out_dir, &EVOLUTIONS, &resolution.edges)?;

    Ok((summary, resolution.unresolved))
}

fn write_table<T: Serialize>(
    out_dir: &Path,
    schema: &TableSchema,
    rows: &[T],
) -> Result<TableSummary> {
    let path = out_dir.join(schema.source_file);
    write_rows(&path, &schema.column_names(), rows)?;
    info!("{} created ({} rows)", schema.source_file, rows.len());

    Ok(TableSummary {
        table: schema.name,
        rows: rows.len(),
    })
}

fn report_unresolved(unresolved: &[UnresolvedName]) {
    if unresolved.is_empty() {
        return;
    }

    let preview: Vec<String> = unresolved
        .iter()
        .take(UNRESOLVED_PREVIEW)
        .map(|u| u.to_string())
        .collect();
    warn!(
        "Could not find ids for {} unique names; first {}: {}",
        unresolved.len(),
        preview.len(),
        preview.join(", ")
    );
}
