//! Read side of the store: every pokemon joined with its dependent records.
//!
//! Both queries run inside one read transaction, so they only ever see a
//! committed seed run.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Abilities {
    pub ability_01: Option<String>,
    pub ability_02: Option<String>,
    pub hidden_ability: Option<String>,
    pub egg_group_01: Option<String>,
    pub egg_group_02: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub hp: Option<i64>,
    pub attack: Option<i64>,
    pub defense: Option<i64>,
    pub sp_attack: Option<i64>,
    pub sp_defense: Option<i64>,
    pub speed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurements {
    pub base_experience: Option<i64>,
    pub height: Option<i64>,
    pub weight: Option<i64>,
}

/// One evolution edge, seen from either end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionLink {
    pub from_id: Option<i64>,
    pub to_id: Option<i64>,
    pub from_name: String,
    pub to_name: String,
    pub trigger: Option<String>,
    pub condition: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokemonDetail {
    pub pokemon_id: i64,
    pub name: String,
    pub type_01: Option<String>,
    pub type_02: Option<String>,
    pub abilities: Option<Abilities>,
    pub is_legendary: Option<bool>,
    pub statistics: Option<Statistics>,
    pub pokedex_entry: Option<String>,
    pub measurements: Option<Measurements>,
    pub best_moves: Option<String>,
    /// Edges where this pokemon is the source
    pub evolves_to: Vec<EvolutionLink>,
    /// Edges where this pokemon is the target
    pub evolves_from: Vec<EvolutionLink>,
}

const DETAIL_SELECT: &str = "
    SELECT p.pokemon_id, p.name, p.type_01, p.type_02,
           a.pokemon_id, a.ability_01, a.ability_02, a.hidden_ability, a.egg_group_01, a.egg_group_02,
           l.is_legendary,
           s.pokemon_id, s.hp, s.attack, s.defense, s.sp_attack, s.sp_defense, s.speed,
           e.pokedex_entry,
           m.pokemon_id, m.base_experience, m.height, m.weight,
           b.moves
    FROM pokemon p
    LEFT JOIN pokemon_abilities a ON a.pokemon_id = p.pokemon_id
    LEFT JOIN pokemon_legendary_status l ON l.pokemon_id = p.pokemon_id
    LEFT JOIN pokemon_statistics s ON s.pokemon_id = p.pokemon_id
    LEFT JOIN pokemon_pokedex_entries e ON e.pokemon_id = p.pokemon_id
    LEFT JOIN pokemon_measurements m ON m.pokemon_id = p.pokemon_id
    LEFT JOIN pokemon_best_moves b ON b.pokemon_id = p.pokemon_id";

const EDGE_SELECT: &str = r#"
    SELECT "evolving_from_id", "evolving_to_id", "evolving_from", "evolving_to",
           "trigger", "condition", "value"
    FROM evolutions"#;

fn detail_from_row(row: &Row) -> rusqlite::Result<PokemonDetail> {
    let abilities = match row.get::<_, Option<i64>>(4)? {
        Some(_) => Some(Abilities {
            ability_01: row.get(5)?,
            ability_02: row.get(6)?,
            hidden_ability: row.get(7)?,
            egg_group_01: row.get(8)?,
            egg_group_02: row.get(9)?,
        }),
        None => None,
    };
    let statistics = match row.get::<_, Option<i64>>(11)? {
        Some(_) => Some(Statistics {
            hp: row.get(12)?,
            attack: row.get(13)?,
            defense: row.get(14)?,
            sp_attack: row.get(15)?,
            sp_defense: row.get(16)?,
            speed: row.get(17)?,
        }),
        None => None,
    };
    let measurements = match row.get::<_, Option<i64>>(19)? {
        Some(_) => Some(Measurements {
            base_experience: row.get(20)?,
            height: row.get(21)?,
            weight: row.get(22)?,
        }),
        None => None,
    };

    Ok(PokemonDetail {
        pokemon_id: row.get(0)?,
        name: row.get(1)?,
        type_01: row.get(2)?,
        type_02: row.get(3)?,
        abilities,
        is_legendary: row.get::<_, Option<i64>>(10)?.map(|flag| flag != 0),
        statistics,
        pokedex_entry: row.get(18)?,
        measurements,
        best_moves: row.get(23)?,
        evolves_to: Vec::new(),
        evolves_from: Vec::new(),
    })
}

fn link_from_row(row: &Row) -> rusqlite::Result<EvolutionLink> {
    Ok(EvolutionLink {
        from_id: row.get(0)?,
        to_id: row.get(1)?,
        from_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        to_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        trigger: row.get(4)?,
        condition: row.get(5)?,
        value: row.get(6)?,
    })
}

fn load_edges(conn: &Connection, filter: &str, id: Option<i64>) -> Result<Vec<EvolutionLink>> {
    let sql = format!("{} {} ORDER BY id", EDGE_SELECT, filter);
    let mut stmt = conn.prepare(&sql)?;

    let links: rusqlite::Result<Vec<_>> = match id {
        Some(id) => stmt.query_map(params![id], link_from_row)?.collect(),
        None => stmt.query_map([], link_from_row)?.collect(),
    };
    let links = links.context("Failed to read evolutions")?;

    Ok(links)
}

fn attach_edges(detail: &mut PokemonDetail, edges: &[EvolutionLink]) {
    for edge in edges {
        if edge.from_id == Some(detail.pokemon_id) {
            detail.evolves_to.push(edge.clone());
        }
        if edge.to_id == Some(detail.pokemon_id) {
            detail.evolves_from.push(edge.clone());
        }
    }
}

/// Every pokemon with its dependent records, ordered by id
pub fn list_all(conn: &Connection) -> Result<Vec<PokemonDetail>> {
    let tx = conn.unchecked_transaction()?;

    let mut details = {
        let mut stmt = tx.prepare(&format!("{} ORDER BY p.pokemon_id", DETAIL_SELECT))?;
        let rows = stmt
            .query_map([], detail_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read pokemon")?;
        rows
    };

    let edges = load_edges(&tx, "", None)?;
    let mut by_id: HashMap<i64, usize> = HashMap::new();
    for (idx, detail) in details.iter().enumerate() {
        by_id.insert(detail.pokemon_id, idx);
    }
    for edge in &edges {
        if let Some(&idx) = edge.from_id.and_then(|id| by_id.get(&id)) {
            details[idx].evolves_to.push(edge.clone());
        }
        if let Some(&idx) = edge.to_id.and_then(|id| by_id.get(&id)) {
            details[idx].evolves_from.push(edge.clone());
        }
    }

    tx.finish()?;
    Ok(details)
}

/// One pokemon with its dependent records, `None` if the id is unknown
pub fn get_by_id(conn: &Connection, pokemon_id: i64) -> Result<Option<PokemonDetail>> {
    let tx = conn.unchecked_transaction()?;

    let detail = tx
        .query_row(
            &format!("{} WHERE p.pokemon_id = ?1", DETAIL_SELECT),
            params![pokemon_id],
            detail_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to read pokemon #{}", pokemon_id))?;

    let detail = match detail {
        Some(mut detail) => {
            let edges = load_edges(
                &tx,
                r#"WHERE "evolving_from_id" = ?1 OR "evolving_to_id" = ?1"#,
                Some(pokemon_id),
            )?;
            attach_edges(&mut detail, &edges);
            Some(detail)
        }
        None => None,
    };

    tx.finish()?;
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::ALL_TABLES;
    use crate::writer::Store;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.create_tables(ALL_TABLES).unwrap();
        store
            .connection()
            .execute_batch(
                r#"
                INSERT INTO pokemon VALUES (2, 'Ivysaur', 'Grass', 'Poison');
                INSERT INTO pokemon VALUES (1, 'Bulbasaur', 'Grass', 'Poison');
                INSERT INTO pokemon_statistics (pokemon_id, hp, attack, defense, sp_attack, sp_defense, speed)
                    VALUES (1, 45, 49, 49, 65, 65, 45);
                INSERT INTO pokemon_legendary_status (pokemon_id, is_legendary) VALUES (1, 0);
                INSERT INTO pokemon_best_moves (pokemon_id, moves) VALUES (2, 'razor leaf');
                INSERT INTO evolutions ("evolving_from_id", "evolving_to_id", "evolving_from", "evolving_to", "trigger", "condition", "value")
                    VALUES (1, 2, 'bulbasaur', 'ivysaur', 'level-up', 'level', '16');
                "#,
            )
            .unwrap();
        store
    }

    #[test]
    fn test_list_all_orders_by_id() {
        let store = seeded_store();
        let all = list_all(store.connection()).unwrap();

        let ids: Vec<_> = all.iter().map(|p| p.pokemon_id).collect();
        assert_eq!(ids, vec![1, 2]);

        let bulbasaur = &all[0];
        assert_eq!(bulbasaur.statistics.as_ref().and_then(|s| s.hp), Some(45));
        assert_eq!(bulbasaur.is_legendary, Some(false));
        assert_eq!(bulbasaur.abilities, None);
        assert_eq!(bulbasaur.evolves_to.len(), 1);
        assert!(bulbasaur.evolves_from.is_empty());

        let ivysaur = &all[1];
        assert_eq!(ivysaur.best_moves.as_deref(), Some("razor leaf"));
        assert_eq!(ivysaur.statistics, None);
        assert_eq!(ivysaur.evolves_from[0].from_id, Some(1));
    }

    #[test]
    fn test_get_by_id() {
        let store = seeded_store();

        let ivysaur = get_by_id(store.connection(), 2).unwrap().unwrap();
        assert_eq!(ivysaur.name, "Ivysaur");
        assert_eq!(ivysaur.evolves_from.len(), 1);
        assert!(ivysaur.evolves_to.is_empty());

        assert_eq!(get_by_id(store.connection(), 999).unwrap(), None);
    }
}
