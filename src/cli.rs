use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pokedex-seed")]
#[command(version, about = "Wrangle pokedex CSV extracts and seed them into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize and split the raw extracts into processed/ tables
    Wrangle {
        /// Data directory holding the raw CSV extracts
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Fail when two names normalize to the same canonical name
        #[arg(long)]
        strict_names: bool,
    },

    /// Replace the database contents with the processed tables
    Seed {
        /// Data directory holding processed/
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// SQLite database path (default: <data-dir>/pokedex.sqlite)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Wrangle, then seed
    Run {
        /// Data directory holding the raw CSV extracts
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// SQLite database path (default: <data-dir>/pokedex.sqlite)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Fail when two names normalize to the same canonical name
        #[arg(long)]
        strict_names: bool,
    },

    /// Print every seeded pokemon as JSON
    List {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print one seeded pokemon as JSON
    Show {
        /// Pokedex number
        id: i64,

        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// List all tables in load order
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        let args = ["pokedex-seed", "seed", "--data-dir", "/tmp/data", "-q"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Seed { data_dir, db } => {
                assert_eq!(data_dir, Some(PathBuf::from("/tmp/data")));
                assert_eq!(db, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["pokedex-seed", "show", "25"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { id: 25, .. }));
    }
}
