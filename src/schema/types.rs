use std::collections::HashSet;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Text,
    /// Stored as INTEGER 0/1, read from `true`/anything-else
    Boolean,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

/// One column of an intermediate table
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
        }
    }
}

/// Reference from a column to another table's key
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            references_table,
            references_column,
        }
    }
}

/// Where a table sits in the load sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// Loaded first; its keys are the valid-id set for everything else
    Primary,
    /// At most one row per referenced creature
    Dependent,
    /// Rows with nullable references, loaded after all dependents
    Edge,
}

/// Static description of one table: its file, columns and references
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Intermediate CSV file, relative to the processed directory
    pub source_file: &'static str,
    pub role: TableRole,
    /// Natural primary key; tables without one get a surrogate `id`
    pub primary_key: Option<&'static str>,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Names of the tables this one references
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    /// Column names in file and insert order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Positions of the foreign key columns within `columns`
    pub fn foreign_key_indexes(&self) -> Vec<usize> {
        self.foreign_keys
            .iter()
            .filter_map(|fk| self.column_index(fk.column))
            .collect()
    }

    /// Column dependents are deduplicated on (their single foreign key)
    pub fn dedup_column(&self) -> Option<usize> {
        match self.role {
            TableRole::Dependent => self.foreign_key_indexes().first().copied(),
            TableRole::Primary | TableRole::Edge => None,
        }
    }
}
