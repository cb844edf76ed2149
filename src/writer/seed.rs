//! The seed run: replace every table's contents from the intermediate
//! files inside one transaction.
//!
//! Clearing → primary load → valid-id extraction → dependent loads →
//! edge loads → commit. Any error drops the transaction, which rolls
//! the database back to its state before the run.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use super::loader::{PreparedTable, TableLoadStats, TableLoader};
use super::sqlite::{clear_tables, insert_rows, select_ids, Store};
use crate::schema::{LoadPlan, TableSchema};
use crate::ui::{Phase, Ui};

#[derive(Debug, Default)]
pub struct SeedReport {
    /// In load order: primary, dependents, edges
    pub tables: Vec<TableLoadStats>,
}

impl SeedReport {
    pub fn total_inserted(&self) -> u64 {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableLoadStats> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Seeds a store from a directory of intermediate tables
pub struct Seeder {
    plan: LoadPlan,
}

impl Seeder {
    pub fn new() -> Result<Self> {
        Ok(Self::with_plan(LoadPlan::new()?))
    }

    pub fn with_plan(plan: LoadPlan) -> Self {
        Self { plan }
    }

    pub fn seed<U: Ui>(&self, store: &mut Store, dir: &Path, ui: &mut U) -> Result<SeedReport> {
        store.create_tables(&self.plan.all_tables())?;

        let tx = store.transaction()?;
        let mut report = SeedReport::default();

        ui.set_phase(Phase::Clearing);
        info!("Clearing old data");
        clear_tables(&tx, &self.plan.clear_order())?;

        ui.set_phase(Phase::LoadingPrimary);
        let primary = TableLoader::new(self.plan.primary);
        let rows = primary.read(dir)?;
        let inserted = insert_rows(&tx, primary.schema(), &rows.rows, ui)?;
        ui.clear_progress();
        info!("Seeded {} rows into {}", inserted, primary.schema().name);
        report.tables.push(TableLoadStats {
            table: primary.schema().name,
            inserted,
            dropped: 0,
            quarantined: rows.quarantined,
            duplicates: rows.rows.len() - inserted as usize,
        });

        ui.set_phase(Phase::ExtractingIds);
        let valid_ids = select_ids(&tx, self.plan.primary)?;

        ui.set_phase(Phase::LoadingDependents);
        for prepared in prepare_all(&self.plan.dependents, dir, &valid_ids)? {
            report.tables.push(prepared.insert(&tx, ui)?);
        }

        ui.set_phase(Phase::LoadingEdges);
        for prepared in prepare_all(&self.plan.edges, dir, &valid_ids)? {
            report.tables.push(prepared.insert(&tx, ui)?);
        }

        ui.set_phase(Phase::Committing);
        tx.commit().context("Failed to commit seed transaction")?;
        analyze_committed(store);

        for stats in &report.tables {
            ui.log(format!(
                "{}: {} inserted, {} dropped, {} quarantined, {} duplicates",
                stats.table, stats.inserted, stats.dropped, stats.quarantined, stats.duplicates
            ));
        }
        info!("Seed complete: {} rows", report.total_inserted());

        Ok(report)
    }
}

/// Statistics refresh after the commit. The new data is already durable, so
/// a failure here is only logged. Returns whether the refresh ran.
fn analyze_committed(store: &Store) -> bool {
    match store.finalize() {
        Ok(()) => true,
        Err(err) => {
            warn!("Seed committed, but refreshing statistics failed: {:#}", err);
            false
        }
    }
}

/// Read and filter independent tables concurrently; the first failure wins
/// and no table is inserted.
fn prepare_all(
    schemas: &[&'static TableSchema],
    dir: &Path,
    valid_ids: &HashSet<i64>,
) -> Result<Vec<PreparedTable>> {
    schemas
        .par_iter()
        .map(|schema| TableLoader::new(*schema).prepare(dir, valid_ids))
        .collect()
}

/// Seed with the default plan
pub fn seed_store<U: Ui>(store: &mut Store, dir: &Path, ui: &mut U) -> Result<SeedReport> {
    Seeder::new()?.seed(store, dir, ui)
}
