use csv::StringRecord;

use super::fields::{parse_integer, trim_text};
use crate::error::SeedError;
use crate::schema::{ColumnType, TableSchema};

/// A parsed row ready for insertion, values in schema column order
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub values: Vec<SqlValue>,
}

impl ParsedRow {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn integer(&self, idx: usize) -> Option<i64> {
        match self.values.get(idx) {
            Some(SqlValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Whether any non-nullable column ended up NULL
    pub fn is_missing_required(&self, schema: &TableSchema) -> bool {
        schema
            .columns
            .iter()
            .zip(&self.values)
            .any(|(col, value)| !col.nullable && matches!(value, SqlValue::Null))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

/// Where each schema column lives in a file's header (`None` if absent)
pub fn column_positions(
    headers: &StringRecord,
    schema: &TableSchema,
) -> Result<Vec<Option<usize>>, SeedError> {
    let positions: Vec<Option<usize>> = schema
        .columns
        .iter()
        .map(|col| headers.iter().position(|h| h.trim() == col.name))
        .collect();

    let missing: Vec<String> = schema
        .columns
        .iter()
        .zip(&positions)
        .filter(|(col, pos)| !col.nullable && pos.is_none())
        .map(|(col, _)| col.name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SeedError::MissingColumns {
            table: schema.name.to_string(),
            columns: missing,
        });
    }

    Ok(positions)
}

/// Convert one CSV record into a row for the given table schema
pub fn parse_record(
    record: &StringRecord,
    positions: &[Option<usize>],
    schema: &TableSchema,
) -> ParsedRow {
    let values = schema
        .columns
        .iter()
        .zip(positions)
        .map(|(col, pos)| {
            let raw = pos.and_then(|p| record.get(p)).unwrap_or("");
            extract_value(raw, col.col_type)
        })
        .collect();

    ParsedRow { values }
}

fn extract_value(raw: &str, col_type: ColumnType) -> SqlValue {
    match col_type {
        ColumnType::Integer => parse_integer(raw)
            .map(SqlValue::Integer)
            .unwrap_or(SqlValue::Null),
        ColumnType::Boolean => {
            let flag = trim_text(raw).is_some_and(|s| s.eq_ignore_ascii_case("true"));
            SqlValue::Integer(i64::from(flag))
        }
        ColumnType::Text => optional_text(raw)
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null),
    }
}

/// Text cell, with the placeholder spellings `null` and `n/a` treated as missing
fn optional_text(raw: &str) -> Option<String> {
    trim_text(raw)
        .filter(|s| !s.eq_ignore_ascii_case("null") && !s.eq_ignore_ascii_case("n/a"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{POKEMON, POKEMON_LEGENDARY_STATUS};

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_record_reorders_columns() {
        let headers = record(&["type_02", "name", "pokemon_id", "type_01"]);
        let positions = column_positions(&headers, &POKEMON).unwrap();
        let row = parse_record(&record(&["n/a", "Bulbasaur", "1", "Grass"]), &positions, &POKEMON);

        assert_eq!(
            row.values,
            vec![
                SqlValue::Integer(1),
                SqlValue::Text("Bulbasaur".to_string()),
                SqlValue::Text("Grass".to_string()),
                SqlValue::Null,
            ]
        );
        assert!(!row.is_missing_required(&POKEMON));
    }

    #[test]
    fn test_missing_optional_column_is_null() {
        let headers = record(&["pokemon_id", "name"]);
        let positions = column_positions(&headers, &POKEMON).unwrap();
        let row = parse_record(&record(&["4", "Charmander"]), &positions, &POKEMON);

        assert_eq!(row.values[2], SqlValue::Null);
        assert_eq!(row.values[3], SqlValue::Null);
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let headers = record(&["name", "type_01"]);
        let err = column_positions(&headers, &POKEMON).unwrap_err();

        match err {
            SeedError::MissingColumns { table, columns } => {
                assert_eq!(table, "pokemon");
                assert_eq!(columns, vec!["pokemon_id".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_required_value_missing() {
        let headers = record(&["pokemon_id", "name"]);
        let positions = column_positions(&headers, &POKEMON).unwrap();
        let row = parse_record(&record(&["", "MissingNo"]), &positions, &POKEMON);

        assert!(row.is_missing_required(&POKEMON));
    }

    #[test]
    fn test_boolean_column() {
        let headers = record(&["pokemon_id", "is_legendary"]);
        let positions = column_positions(&headers, &POKEMON_LEGENDARY_STATUS).unwrap();

        let yes = parse_record(&record(&["150", "True"]), &positions, &POKEMON_LEGENDARY_STATUS);
        let no = parse_record(&record(&["1", ""]), &positions, &POKEMON_LEGENDARY_STATUS);

        assert_eq!(yes.values[1], SqlValue::Integer(1));
        assert_eq!(no.values[1], SqlValue::Integer(0));
    }
}
