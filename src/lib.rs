pub mod cli;
pub mod error;
pub mod filter;
pub mod parser;
pub mod paths;
pub mod query;
pub mod schema;
pub mod ui;
pub mod wrangle;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::SeedError;
pub use paths::DataDir;
pub use query::{get_by_id, list_all, PokemonDetail};
pub use ui::{Phase, ProgressUi, RecordingUi, SilentUi, Ui};
pub use wrangle::{wrangle, NamePolicy, WrangleOptions, WrangleReport};
pub use writer::{seed_store, SeedReport, Seeder, Store};
