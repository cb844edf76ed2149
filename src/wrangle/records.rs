//! Typed shapes of the raw extracts and of the intermediate tables.
//!
//! Raw rows keep every cell as text (absent columns read as empty); the
//! intermediate records carry already-normalized values and serialize in
//! the column order of the matching `TableSchema`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Raw extracts
// =============================================================================

/// One row of `pokemon_core_dataset.csv`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoreRow {
    pub dex_number: String,
    pub name: String,
    pub type_01: String,
    pub type_02: String,
    pub ability_01: String,
    pub ability_02: String,
    pub hidden_ability: String,
    pub egg_group_01: String,
    pub egg_group_02: String,
    pub is_legendary: String,
    pub hp: String,
    pub attack: String,
    pub defense: String,
    pub sp_attack: String,
    pub sp_defense: String,
    pub speed: String,
    pub bio: String,
}

/// One row of `pokemon_evolution_long.csv`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvolutionLogRow {
    #[serde(rename = "Evolving_from")]
    pub evolving_from: String,
    #[serde(rename = "Evolving_to")]
    pub evolving_to: String,
    pub trigger: String,
    #[serde(rename = "Condition")]
    pub condition: String,
    pub value: String,
}

/// One row of `pokemon_moves_height_weight.csv`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovesRow {
    pub id: String,
    pub base_experience: String,
    pub height: String,
    pub weight: String,
    pub moves: String,
}

// =============================================================================
// Intermediate tables
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonRecord {
    pub pokemon_id: Option<i64>,
    pub name: Option<String>,
    pub type_01: Option<String>,
    pub type_02: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilitiesRecord {
    pub pokemon_id: Option<i64>,
    pub ability_01: Option<String>,
    pub ability_02: Option<String>,
    pub hidden_ability: Option<String>,
    pub egg_group_01: Option<String>,
    pub egg_group_02: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendaryRecord {
    pub pokemon_id: Option<i64>,
    pub is_legendary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub pokemon_id: Option<i64>,
    pub hp: Option<i64>,
    pub attack: Option<i64>,
    pub defense: Option<i64>,
    pub sp_attack: Option<i64>,
    pub sp_defense: Option<i64>,
    pub speed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokedexEntryRecord {
    pub pokemon_id: Option<i64>,
    pub pokedex_entry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementsRecord {
    pub pokemon_id: Option<i64>,
    pub base_experience: Option<i64>,
    pub height: Option<i64>,
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMovesRecord {
    pub pokemon_id: Option<i64>,
    pub moves: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionRecord {
    pub evolving_from_id: Option<i64>,
    pub evolving_to_id: Option<i64>,
    pub evolving_from: String,
    pub evolving_to: String,
    pub trigger: Option<String>,
    pub condition: Option<String>,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::*;
    use crate::schema::TableSchema;

    /// The header serde would derive must match the schema's column order
    fn assert_header<T: Serialize>(record: &T, schema: &TableSchema) {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();

        assert_eq!(header, schema.column_names().join(","), "{}", schema.name);
    }

    #[test]
    fn test_record_fields_follow_schema_order() {
        assert_header(
            &PokemonRecord {
                pokemon_id: None,
                name: None,
                type_01: None,
                type_02: None,
            },
            &POKEMON,
        );
        assert_header(
            &AbilitiesRecord {
                pokemon_id: None,
                ability_01: None,
                ability_02: None,
                hidden_ability: None,
                egg_group_01: None,
                egg_group_02: None,
            },
            &POKEMON_ABILITIES,
        );
        assert_header(
            &LegendaryRecord {
                pokemon_id: None,
                is_legendary: None,
            },
            &POKEMON_LEGENDARY_STATUS,
        );
        assert_header(
            &StatisticsRecord {
                pokemon_id: None,
                hp: None,
                attack: None,
                defense: None,
                sp_attack: None,
                sp_defense: None,
                speed: None,
            },
            &POKEMON_STATISTICS,
        );
        assert_header(
            &PokedexEntryRecord {
                pokemon_id: None,
                pokedex_entry: None,
            },
            &POKEMON_POKEDEX_ENTRIES,
        );
        assert_header(
            &MeasurementsRecord {
                pokemon_id: None,
                base_experience: None,
                height: None,
                weight: None,
            },
            &POKEMON_MEASUREMENTS,
        );
        assert_header(
            &BestMovesRecord {
                pokemon_id: None,
                moves: None,
            },
            &POKEMON_BEST_MOVES,
        );
        assert_header(
            &EvolutionRecord {
                evolving_from_id: None,
                evolving_to_id: None,
                evolving_from: String::new(),
                evolving_to: String::new(),
                trigger: None,
                condition: None,
                value: None,
            },
            &EVOLUTIONS,
        );
    }
}
