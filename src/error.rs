//! Typed failures callers may want to match on.
//!
//! Everything else travels as `anyhow::Error` with context attached at the
//! I/O or SQL boundary where it happened.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    /// An input or intermediate file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A CSV header lacks columns the table cannot be loaded without
    #[error("{table}: header is missing required column(s): {}", .columns.join(", "))]
    MissingColumns {
        table: String,
        columns: Vec<String>,
    },

    /// Two display names normalize to the same canonical name with different ids
    #[error("Canonical name '{name}' maps to both #{first} and #{second}")]
    DuplicateName { name: String, first: i64, second: i64 },

    /// The table schemas do not describe exactly one primary table
    #[error("Invalid load plan: {0}")]
    InvalidPlan(String),
}
