//! Table schema definitions for the processed pokedex tables.
//!
//! Column order here is the header order of the intermediate CSV files and
//! the insert order into SQLite.

use super::types::*;

const POKEMON_FK: &[ForeignKey] = &[ForeignKey::new("pokemon_id", "pokemon", "pokemon_id")];

// =============================================================================
// Primary table
// =============================================================================

pub static POKEMON: TableSchema = TableSchema {
    name: "pokemon",
    source_file: "pokemon.csv",
    role: TableRole::Primary,
    primary_key: Some("pokemon_id"),
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
        Column::new("type_01", ColumnType::Text),
        Column::new("type_02", ColumnType::Text),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Dependent tables (one row per pokemon)
// =============================================================================

pub static POKEMON_ABILITIES: TableSchema = TableSchema {
    name: "pokemon_abilities",
    source_file: "pokemon_abilities.csv",
    role: TableRole::Dependent,
    primary_key: None,
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::new("ability_01", ColumnType::Text),
        Column::new("ability_02", ColumnType::Text),
        Column::new("hidden_ability", ColumnType::Text),
        Column::new("egg_group_01", ColumnType::Text),
        Column::new("egg_group_02", ColumnType::Text),
    ],
    foreign_keys: POKEMON_FK,
};

pub static POKEMON_LEGENDARY_STATUS: TableSchema = TableSchema {
    name: "pokemon_legendary_status",
    source_file: "pokemon_legendary_status.csv",
    role: TableRole::Dependent,
    primary_key: None,
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("is_legendary", ColumnType::Boolean),
    ],
    foreign_keys: POKEMON_FK,
};

pub static POKEMON_STATISTICS: TableSchema = TableSchema {
    name: "pokemon_statistics",
    source_file: "pokemon_statistics.csv",
    role: TableRole::Dependent,
    primary_key: None,
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::new("hp", ColumnType::Integer),
        Column::new("attack", ColumnType::Integer),
        Column::new("defense", ColumnType::Integer),
        Column::new("sp_attack", ColumnType::Integer),
        Column::new("sp_defense", ColumnType::Integer),
        Column::new("speed", ColumnType::Integer),
    ],
    foreign_keys: POKEMON_FK,
};

pub static POKEMON_POKEDEX_ENTRIES: TableSchema = TableSchema {
    name: "pokemon_pokedex_entries",
    source_file: "pokemon_pokedex_entries.csv",
    role: TableRole::Dependent,
    primary_key: None,
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::new("pokedex_entry", ColumnType::Text),
    ],
    foreign_keys: POKEMON_FK,
};

pub static POKEMON_MEASUREMENTS: TableSchema = TableSchema {
    name: "pokemon_measurements",
    source_file: "pokemon_measurements.csv",
    role: TableRole::Dependent,
    primary_key: None,
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::new("base_experience", ColumnType::Integer),
        Column::new("height", ColumnType::Integer),
        Column::new("weight", ColumnType::Integer),
    ],
    foreign_keys: POKEMON_FK,
};

pub static POKEMON_BEST_MOVES: TableSchema = TableSchema {
    name: "pokemon_best_moves",
    source_file: "pokemon_best_moves.csv",
    role: TableRole::Dependent,
    primary_key: None,
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::new("moves", ColumnType::Text),
    ],
    foreign_keys: POKEMON_FK,
};

// =============================================================================
// Edge tables (nullable references)
// =============================================================================

pub static EVOLUTIONS: TableSchema = TableSchema {
    name: "evolutions",
    source_file: "evolutions.csv",
    role: TableRole::Edge,
    primary_key: None,
    columns: &[
        Column::new("evolving_from_id", ColumnType::Integer),
        Column::new("evolving_to_id", ColumnType::Integer),
        Column::new("evolving_from", ColumnType::Text),
        Column::new("evolving_to", ColumnType::Text),
        Column::new("trigger", ColumnType::Text),
        Column::new("condition", ColumnType::Text),
        Column::new("value", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("evolving_from_id", "pokemon", "pokemon_id"),
        ForeignKey::new("evolving_to_id", "pokemon", "pokemon_id"),
    ],
};

/// All tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[
    &POKEMON,
    &POKEMON_ABILITIES,
    &POKEMON_LEGENDARY_STATUS,
    &POKEMON_STATISTICS,
    &POKEMON_POKEDEX_ENTRIES,
    &POKEMON_MEASUREMENTS,
    &POKEMON_BEST_MOVES,
    &EVOLUTIONS,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_foreign_key_is_a_column() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                assert!(
                    table.column_index(fk.column).is_some(),
                    "{}.{} is not a column",
                    table.name,
                    fk.column
                );
                assert!(ALL_TABLES.iter().any(|t| t.name == fk.references_table));
            }
        }
    }

    #[test]
    fn test_dedup_column_only_for_dependents() {
        assert_eq!(POKEMON.dedup_column(), None);
        assert_eq!(EVOLUTIONS.dedup_column(), None);
        assert_eq!(POKEMON_STATISTICS.dedup_column(), Some(0));
    }
}
