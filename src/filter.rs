use std::collections::HashSet;
use tracing::{debug, warn};

use crate::parser::ParsedRow;
use crate::schema::TableSchema;

/// Rows that survived the integrity check, and how many did not
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<ParsedRow>,
    pub dropped: usize,
}

/// True when every non-null reference is a known id; a null reference
/// (chain root or leaf) always passes.
pub fn references_valid<I>(references: I, valid_ids: &HashSet<i64>) -> bool
where
    I: IntoIterator<Item = Option<i64>>,
{
    references
        .into_iter()
        .flatten()
        .all(|id| valid_ids.contains(&id))
}

/// Drop rows whose foreign keys point at pokemon that were never persisted
pub fn retain_valid(
    schema: &TableSchema,
    rows: Vec<ParsedRow>,
    valid_ids: &HashSet<i64>,
) -> FilterOutcome {
    let key_columns = schema.foreign_key_indexes();
    let total = rows.len();

    let kept: Vec<ParsedRow> = rows
        .into_iter()
        .filter(|row| {
            references_valid(key_columns.iter().map(|&idx| row.integer(idx)), valid_ids)
        })
        .collect();

    let dropped = total - kept.len();
    if dropped > 0 {
        warn!(
            "{}: dropped {} of {} rows referencing unknown pokemon",
            schema.name, dropped, total
        );
    } else {
        debug!("{}: all {} rows reference known pokemon", schema.name, total);
    }

    FilterOutcome { kept, dropped }
}
