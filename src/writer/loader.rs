use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Transaction;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use super::sqlite::insert_rows;
use crate::filter::{retain_valid, FilterOutcome};
use crate::parser::{column_positions, open_input, parse_record, ParsedRow};
use crate::schema::TableSchema;
use crate::ui::Ui;

/// Rows read from one intermediate file, before the integrity check
#[derive(Debug, Default)]
pub struct TableRows {
    pub rows: Vec<ParsedRow>,
    /// Rows missing a required value
    pub quarantined: usize,
    /// Later rows for a pokemon that already has one in this table
    pub duplicates: usize,
}

/// Rows that passed the integrity check, ready to insert
#[derive(Debug)]
pub struct PreparedTable {
    pub schema: &'static TableSchema,
    pub rows: Vec<ParsedRow>,
    pub quarantined: usize,
    pub duplicates: usize,
    pub dropped: usize,
}

/// Per-table outcome of a seed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoadStats {
    pub table: &'static str,
    pub inserted: u64,
    /// Rejected by the integrity filter
    pub dropped: usize,
    pub quarantined: usize,
    /// Skipped as duplicates, in the file or by the primary key
    pub duplicates: usize,
}

/// Loads one table, driven entirely by its schema: read the intermediate
/// file, drop rows that reference unknown pokemon, insert the rest.
#[derive(Debug, Clone, Copy)]
pub struct TableLoader {
    schema: &'static TableSchema,
}

impl TableLoader {
    pub fn new(schema: &'static TableSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    /// Parse the table's file, quarantining incomplete rows and, for
    /// dependent tables, keeping only the first row per pokemon.
    pub fn read(&self, dir: &Path) -> Result<TableRows> {
        let path = dir.join(self.schema.source_file);
        let file = open_input(&path)?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {:?}", path))?
            .clone();
        let positions = column_positions(&headers, self.schema)?;
        let dedup_column = self.schema.dedup_column();

        let mut table = TableRows::default();
        let mut seen: HashSet<i64> = HashSet::new();

        for record in reader.records() {
            let record = record.with_context(|| format!("Failed to read record in {:?}", path))?;
            let row = parse_record(&record, &positions, self.schema);

            if row.is_missing_required(self.schema) {
                table.quarantined += 1;
                continue;
            }
            if let Some(key) = dedup_column.and_then(|idx| row.integer(idx)) {
                if !seen.insert(key) {
                    table.duplicates += 1;
                    continue;
                }
            }

            table.rows.push(row);
        }

        if table.quarantined > 0 {
            warn!(
                "{}: skipped {} rows missing required values",
                self.schema.name, table.quarantined
            );
        }
        if table.duplicates > 0 {
            warn!(
                "{}: skipped {} duplicate rows",
                self.schema.name, table.duplicates
            );
        }

        Ok(table)
    }

    /// Read and apply the integrity filter
    pub fn prepare(&self, dir: &Path, valid_ids: &HashSet<i64>) -> Result<PreparedTable> {
        let table = self.read(dir)?;
        let FilterOutcome { kept, dropped } = retain_valid(self.schema, table.rows, valid_ids);

        Ok(PreparedTable {
            schema: self.schema,
            rows: kept,
            quarantined: table.quarantined,
            duplicates: table.duplicates,
            dropped,
        })
    }
}

impl PreparedTable {
    pub fn insert<U: Ui>(self, tx: &Transaction, ui: &mut U) -> Result<TableLoadStats> {
        let inserted = insert_rows(tx, self.schema, &self.rows, ui)?;
        let skipped = self.rows.len() - inserted as usize;

        info!("Seeded {} rows into {}", inserted, self.schema.name);
        ui.clear_progress();

        Ok(TableLoadStats {
            table: self.schema.name,
            inserted,
            dropped: self.dropped,
            quarantined: self.quarantined,
            duplicates: self.duplicates + skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlValue;
    use crate::schema::tables::{EVOLUTIONS, POKEMON_BEST_MOVES};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_dedups_and_quarantines() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("pokemon_best_moves.csv"),
            "pokemon_id,moves\n1,tackle\n,growl\n1,vine whip\n2,\n",
        )
        .unwrap();

        let table = TableLoader::new(&POKEMON_BEST_MOVES).read(dir.path()).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.quarantined, 1);
        assert_eq!(table.duplicates, 1);
        assert_eq!(table.rows[0].values[1], SqlValue::Text("tackle".to_string()));
        assert_eq!(table.rows[1].values[1], SqlValue::Null);
    }

    #[test]
    fn test_edges_are_not_deduplicated() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("evolutions.csv"),
            "evolving_from_id,evolving_to_id,evolving_from,evolving_to,trigger,condition,value\n\
             133,134,eevee,vaporeon,use-item,item,water-stone\n\
             133,135,eevee,jolteon,use-item,item,thunder-stone\n",
        )
        .unwrap();

        let valid: HashSet<i64> = [133, 134].into_iter().collect();
        let prepared = TableLoader::new(&EVOLUTIONS).prepare(dir.path(), &valid).unwrap();

        assert_eq!(prepared.rows.len(), 1);
        assert_eq!(prepared.dropped, 1);
        assert_eq!(prepared.duplicates, 0);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(TableLoader::new(&EVOLUTIONS).read(dir.path()).is_err());
    }
}
