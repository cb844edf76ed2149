//! Splitting the wide source tables into one narrow table per entity group.
//!
//! Every output keeps the source's row order and row count, keyed by the
//! parsed identifier of the source row.

use super::records::*;
use crate::parser::{parse_identifier, parse_integer, trim_text};

/// The five tables cut from the core dataset
#[derive(Debug, Default)]
pub struct CoreTables {
    pub pokemon: Vec<PokemonRecord>,
    pub abilities: Vec<AbilitiesRecord>,
    pub legendary: Vec<LegendaryRecord>,
    pub statistics: Vec<StatisticsRecord>,
    pub pokedex_entries: Vec<PokedexEntryRecord>,
}

/// The two tables cut from the moves/height/weight extract
#[derive(Debug, Default)]
pub struct MovesTables {
    pub measurements: Vec<MeasurementsRecord>,
    pub best_moves: Vec<BestMovesRecord>,
}

pub fn split_core(rows: &[CoreRow]) -> CoreTables {
    let mut tables = CoreTables::default();

    for row in rows {
        let pokemon_id = parse_identifier(&row.dex_number);

        tables.pokemon.push(PokemonRecord {
            pokemon_id,
            name: trim_text(&row.name),
            type_01: trim_text(&row.type_01),
            type_02: trim_text(&row.type_02),
        });
        tables.abilities.push(AbilitiesRecord {
            pokemon_id,
            ability_01: trim_text(&row.ability_01),
            ability_02: trim_text(&row.ability_02),
            hidden_ability: trim_text(&row.hidden_ability),
            egg_group_01: trim_text(&row.egg_group_01),
            egg_group_02: trim_text(&row.egg_group_02),
        });
        tables.legendary.push(LegendaryRecord {
            pokemon_id,
            is_legendary: trim_text(&row.is_legendary),
        });
        tables.statistics.push(StatisticsRecord {
            pokemon_id,
            hp: parse_integer(&row.hp),
            attack: parse_integer(&row.attack),
            defense: parse_integer(&row.defense),
            sp_attack: parse_integer(&row.sp_attack),
            sp_defense: parse_integer(&row.sp_defense),
            speed: parse_integer(&row.speed),
        });
        tables.pokedex_entries.push(PokedexEntryRecord {
            pokemon_id,
            pokedex_entry: trim_text(&row.bio),
        });
    }

    tables
}

pub fn split_moves(rows: &[MovesRow]) -> MovesTables {
    let mut tables = MovesTables::default();

    for row in rows {
        let pokemon_id = parse_identifier(&row.id);

        tables.measurements.push(MeasurementsRecord {
            pokemon_id,
            base_experience: parse_integer(&row.base_experience),
            height: parse_integer(&row.height),
            weight: parse_integer(&row.weight),
        });
        tables.best_moves.push(BestMovesRecord {
            pokemon_id,
            moves: trim_text(&row.moves),
        });
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_row(dex: &str, name: &str) -> CoreRow {
        CoreRow {
            dex_number: dex.to_string(),
            name: name.to_string(),
            type_01: "Grass".to_string(),
            type_02: " Poison ".to_string(),
            egg_group_02: "Grass\u{a0}".to_string(),
            is_legendary: "False".to_string(),
            hp: "45".to_string(),
            speed: "n/a".to_string(),
            bio: "  A strange seed was planted on its back at birth. ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_core_keeps_row_count_and_order() {
        let rows = vec![
            core_row("#0001", "Bulbasaur"),
            core_row("", "MissingNo"),
            core_row("#0003", "Venusaur"),
        ];
        let tables = split_core(&rows);

        for len in [
            tables.pokemon.len(),
            tables.abilities.len(),
            tables.legendary.len(),
            tables.statistics.len(),
            tables.pokedex_entries.len(),
        ] {
            assert_eq!(len, 3);
        }

        let ids: Vec<_> = tables.pokemon.iter().map(|p| p.pokemon_id).collect();
        assert_eq!(ids, vec![Some(1), None, Some(3)]);
        assert_eq!(tables.statistics[1].pokemon_id, None);
    }

    #[test]
    fn test_split_core_normalizes_fields() {
        let tables = split_core(&[core_row("#0001", "Bulbasaur")]);

        assert_eq!(tables.pokemon[0].type_02.as_deref(), Some("Poison"));
        assert_eq!(tables.abilities[0].egg_group_02.as_deref(), Some("Grass"));
        assert_eq!(tables.abilities[0].ability_01, None);
        assert_eq!(tables.statistics[0].hp, Some(45));
        assert_eq!(tables.statistics[0].speed, None);
        assert_eq!(
            tables.pokedex_entries[0].pokedex_entry.as_deref(),
            Some("A strange seed was planted on its back at birth.")
        );
        assert_eq!(tables.legendary[0].is_legendary.as_deref(), Some("False"));
    }

    #[test]
    fn test_split_moves() {
        let rows = vec![MovesRow {
            id: "25".to_string(),
            base_experience: "112".to_string(),
            height: "4".to_string(),
            weight: "60".to_string(),
            moves: " thunderbolt, quick-attack ".to_string(),
        }];
        let tables = split_moves(&rows);

        assert_eq!(
            tables.measurements,
            vec![MeasurementsRecord {
                pokemon_id: Some(25),
                base_experience: Some(112),
                height: Some(4),
                weight: Some(60),
            }]
        );
        assert_eq!(tables.best_moves[0].moves.as_deref(), Some("thunderbolt, quick-attack"));
    }
}
