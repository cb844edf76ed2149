use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    if schema.primary_key.is_none() {
        columns.push("    id INTEGER PRIMARY KEY".to_string());
    }

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if schema.primary_key == Some(col.name) {
            " PRIMARY KEY"
        } else {
            ""
        };

        columns.push(format!(
            "    {} {}{}{}",
            quote(col.name),
            col.col_type.sql_type(),
            pk,
            null_constraint
        ));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            quote(fk.column),
            fk.references_table,
            quote(fk.references_column)
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name,
                fk.column,
                schema.name,
                quote(fk.column)
            )
        })
        .collect()
}

/// INSERT statement covering every schema column; conflicts are skipped
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema.columns.iter().map(|c| quote(c.name)).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();

    format!(
        "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Quote an identifier; some column names (`trigger`, `value`) are SQL keywords
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{EVOLUTIONS, POKEMON, POKEMON_STATISTICS};

    #[test]
    fn test_generate_create_table_primary() {
        let sql = generate_create_table(&POKEMON);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS pokemon"));
        assert!(sql.contains(r#""pokemon_id" INTEGER PRIMARY KEY NOT NULL"#));
        assert!(sql.contains(r#""name" TEXT NOT NULL"#));
        assert!(!sql.contains("    id INTEGER"));
    }

    #[test]
    fn test_generate_create_table_dependent() {
        let sql = generate_create_table(&POKEMON_STATISTICS);
        assert!(sql.contains("id INTEGER PRIMARY KEY,"));
        assert!(sql.contains(r#""pokemon_id" INTEGER NOT NULL"#));
        assert!(sql.contains(r#"FOREIGN KEY ("pokemon_id") REFERENCES pokemon("pokemon_id")"#));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&EVOLUTIONS);
        assert_eq!(indexes.len(), 2);
        assert!(indexes.iter().any(|i| i.contains("idx_evolutions_evolving_from_id")));
    }

    #[test]
    fn test_generate_insert() {
        assert_eq!(
            generate_insert(&POKEMON),
            r#"INSERT OR IGNORE INTO pokemon ("pokemon_id", "name", "type_01", "type_02") VALUES (?, ?, ?, ?)"#
        );
    }
}
