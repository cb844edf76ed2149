use super::tables::ALL_TABLES;
use super::types::{TableRole, TableSchema};
use crate::error::SeedError;
use std::collections::{HashMap, HashSet};

/// Orders tables so every table comes after the tables it references
pub struct DependencyResolver {
    tables: Vec<&'static TableSchema>,
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::with_tables(ALL_TABLES.to_vec())
    }

    pub fn with_tables(tables: Vec<&'static TableSchema>) -> Self {
        let deps = tables
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { tables, deps }
    }

    /// All tables in load order (parents before children)
    pub fn load_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        // Declaration order keeps siblings stable between runs
        for table in &self.tables {
            self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<_> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                if dep == name {
                    continue;
                }
                if !self.deps.contains_key(dep) {
                    return Err(format!("{} references unknown table: {}", name, dep));
                }
                self.visit(dep, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = self.table(name) {
            result.push(table);
        }

        Ok(())
    }

    fn table(&self, name: &str) -> Option<&'static TableSchema> {
        self.tables.iter().copied().find(|t| t.name == name)
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// The tables of one seed run, split by role and in load order
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub primary: &'static TableSchema,
    pub dependents: Vec<&'static TableSchema>,
    pub edges: Vec<&'static TableSchema>,
}

impl LoadPlan {
    pub fn new() -> Result<Self, SeedError> {
        Self::from_resolver(&DependencyResolver::new())
    }

    pub fn from_resolver(resolver: &DependencyResolver) -> Result<Self, SeedError> {
        let order = resolver.load_order().map_err(SeedError::InvalidPlan)?;

        let mut primaries = order.iter().filter(|t| t.role == TableRole::Primary);
        let primary = match (primaries.next(), primaries.next()) {
            (Some(primary), None) => *primary,
            _ => {
                return Err(SeedError::InvalidPlan(
                    "expected exactly one primary table".to_string(),
                ))
            }
        };

        let by_role = |role: TableRole| -> Vec<&'static TableSchema> {
            order.iter().copied().filter(|t| t.role == role).collect()
        };

        Ok(Self {
            primary,
            dependents: by_role(TableRole::Dependent),
            edges: by_role(TableRole::Edge),
        })
    }

    /// Edges first, then dependents, then the primary table
    pub fn clear_order(&self) -> Vec<&'static TableSchema> {
        let mut order: Vec<_> = self.edges.iter().rev().copied().collect();
        order.extend(self.dependents.iter().rev().copied());
        order.push(self.primary);
        order
    }

    pub fn all_tables(&self) -> Vec<&'static TableSchema> {
        let mut tables = vec![self.primary];
        tables.extend(self.dependents.iter().copied());
        tables.extend(self.edges.iter().copied());
        tables
    }
}
