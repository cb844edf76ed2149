use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert, quote};
use crate::parser::ParsedRow;
use crate::schema::TableSchema;
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

/// Owns the database connection handed to every load and query step
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database; an existing database is kept so a
    /// failed seed leaves the previous generation in place.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self { conn })
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Create any missing tables for the given schemas
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        debug!("Ensuring {} tables exist", schemas.len());

        for schema in schemas {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Start the single transaction a seed run happens in
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction()
            .context("Failed to begin transaction")
    }

    pub fn count_rows(&self, table: &str) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(count as u64)
    }

    /// Refresh planner statistics after a full reload
    pub fn finalize(&self) -> Result<()> {
        self.conn
            .execute_batch("ANALYZE; PRAGMA optimize;")
            .context("Failed to analyze database")
    }
}

/// Delete every row of each table, in the order given
pub fn clear_tables(tx: &Transaction, tables: &[&TableSchema]) -> Result<()> {
    for schema in tables {
        let deleted = tx
            .execute(&format!("DELETE FROM {}", schema.name), [])
            .with_context(|| format!("Failed to clear {}", schema.name))?;
        debug!("Cleared {} rows from {}", deleted, schema.name);
    }
    Ok(())
}

/// Primary keys currently in `schema`'s table
pub fn select_ids(tx: &Transaction, schema: &TableSchema) -> Result<HashSet<i64>> {
    let key = schema.primary_key.unwrap_or("id");
    let sql = format!("SELECT {} FROM {}", quote(key), schema.name);

    let mut stmt = tx.prepare(&sql)?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<HashSet<i64>>>()
        .with_context(|| format!("Failed to read ids from {}", schema.name))?;

    info!("{} valid ids in {}", ids.len(), schema.name);
    Ok(ids)
}

/// Insert rows in batches, skipping conflicts. Returns the number of rows
/// actually inserted.
pub fn insert_rows<U: Ui>(
    tx: &Transaction,
    schema: &TableSchema,
    rows: &[ParsedRow],
    ui: &mut U,
) -> Result<u64> {
    let sql = generate_insert(schema);
    let total = rows.len() as u64;
    let mut inserted: u64 = 0;
    let mut processed: u64 = 0;

    for batch in rows.chunks(BATCH_SIZE) {
        inserted += insert_batch(tx, &sql, batch)
            .with_context(|| format!("Failed to insert into {}", schema.name))?;
        processed += batch.len() as u64;
        ui.set_progress(processed, total, schema.name);
    }

    Ok(inserted)
}

/// Insert a batch of rows into the database
fn insert_batch(tx: &Transaction, sql: &str, batch: &[ParsedRow]) -> Result<u64> {
    let mut stmt = tx.prepare_cached(sql)?;
    let mut inserted = 0;

    for row in batch {
        for (idx, value) in row.values.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        inserted += stmt.raw_execute()? as u64;
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlValue;
    use crate::schema::tables::{ALL_TABLES, POKEMON};
    use crate::ui::SilentUi;

    fn pokemon(id: i64, name: &str) -> ParsedRow {
        ParsedRow::new(vec![
            SqlValue::Integer(id),
            SqlValue::Text(name.to_string()),
            SqlValue::Null,
            SqlValue::Null,
        ])
    }

    #[test]
    fn test_create_tables_is_repeatable() {
        let store = Store::open_in_memory().unwrap();
        store.create_tables(ALL_TABLES).unwrap();
        store.create_tables(ALL_TABLES).unwrap();

        for table in ALL_TABLES {
            assert_eq!(store.count_rows(table.name).unwrap(), 0);
        }
    }

    #[test]
    fn test_insert_skips_duplicate_keys() {
        let mut store = Store::open_in_memory().unwrap();
        store.create_tables(&[&POKEMON]).unwrap();

        let tx = store.transaction().unwrap();
        let rows = vec![
            pokemon(1, "Bulbasaur"),
            pokemon(1, "Bulbasaur again"),
            pokemon(2, "Ivysaur"),
        ];
        let inserted = insert_rows(&tx, &POKEMON, &rows, &mut SilentUi::new()).unwrap();
        let ids = select_ids(&tx, &POKEMON).unwrap();
        tx.commit().unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(ids, [1, 2].into_iter().collect());
        assert_eq!(store.count_rows("pokemon").unwrap(), 2);
    }

    #[test]
    fn test_finalize_fails_on_read_only_connection() {
        let store = Store::open_in_memory().unwrap();
        store.create_tables(ALL_TABLES).unwrap();
        store.finalize().unwrap();

        store.connection().execute_batch("PRAGMA query_only = ON;").unwrap();
        assert!(store.finalize().is_err());
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        store.create_tables(&[&POKEMON]).unwrap();

        {
            let tx = store.transaction().unwrap();
            insert_rows(&tx, &POKEMON, &[pokemon(1, "Bulbasaur")], &mut SilentUi::new()).unwrap();
        }

        assert_eq!(store.count_rows("pokemon").unwrap(), 0);
    }
}
