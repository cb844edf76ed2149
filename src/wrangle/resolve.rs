//! Resolving free-text names in the evolution log to pokedex ids.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::records::{CoreRow, EvolutionLogRow, EvolutionRecord};
use crate::error::SeedError;
use crate::parser::{lower_text, normalize_name, parse_identifier};

/// What to do when two display names share a canonical name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamePolicy {
    /// Later rows overwrite earlier ones (logged)
    #[default]
    LastWins,
    /// Conflicting ids for one canonical name abort wrangling
    Strict,
}

/// Canonical name -> pokedex id
#[derive(Debug, Default)]
pub struct NameIndex {
    ids: HashMap<String, i64>,
}

impl NameIndex {
    /// Build from `(display name, raw identifier)` pairs, skipping pairs
    /// where either side is empty after cleanup.
    pub fn build<'a, I>(entries: I, policy: NamePolicy) -> Result<Self, SeedError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut ids = HashMap::new();

        for (name, raw_id) in entries {
            let name = normalize_name(name);
            let Some(id) = parse_identifier(raw_id) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            if let Some(previous) = ids.insert(name.clone(), id) {
                if previous != id {
                    if policy == NamePolicy::Strict {
                        return Err(SeedError::DuplicateName {
                            name,
                            first: previous,
                            second: id,
                        });
                    }
                    warn!(
                        "Canonical name '{}' maps to #{} and #{}, keeping #{}",
                        name, previous, id, id
                    );
                }
            }
        }

        Ok(Self { ids })
    }

    pub fn from_core(rows: &[CoreRow], policy: NamePolicy) -> Result<Self, SeedError> {
        Self::build(
            rows.iter().map(|r| (r.name.as_str(), r.dex_number.as_str())),
            policy,
        )
    }

    pub fn get(&self, canonical: &str) -> Option<i64> {
        self.ids.get(canonical).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A name that did not resolve to an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedName {
    pub normalized: String,
    pub original: String,
}

impl std::fmt::Display for UnresolvedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' (original: '{}')", self.normalized, self.original)
    }
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub edges: Vec<EvolutionRecord>,
    /// Unique by normalized name, in first-seen order
    pub unresolved: Vec<UnresolvedName>,
}

/// Resolve both ends of every evolution log row. Rows are never dropped;
/// an unknown name leaves its id empty.
pub fn resolve_evolutions(index: &NameIndex, rows: &[EvolutionLogRow]) -> Resolution {
    let mut resolution = Resolution::default();
    let mut seen: HashSet<String> = HashSet::new();

    let mut lookup = |original: &str, resolution: &mut Resolution| -> (String, Option<i64>) {
        let normalized = normalize_name(original);
        let id = index.get(&normalized);

        if id.is_none() && !normalized.is_empty() && seen.insert(normalized.clone()) {
            resolution.unresolved.push(UnresolvedName {
                normalized: normalized.clone(),
                original: original.to_string(),
            });
        }

        (normalized, id)
    };

    for row in rows {
        let (evolving_from, evolving_from_id) = lookup(&row.evolving_from, &mut resolution);
        let (evolving_to, evolving_to_id) = lookup(&row.evolving_to, &mut resolution);

        resolution.edges.push(EvolutionRecord {
            evolving_from_id,
            evolving_to_id,
            evolving_from,
            evolving_to,
            trigger: lower_text(&row.trigger),
            condition: lower_text(&row.condition),
            value: lower_text(&row.value),
        });
    }

    debug!(
        "Resolved {} evolution rows, {} unresolved names",
        resolution.edges.len(),
        resolution.unresolved.len()
    );
    resolution
}
