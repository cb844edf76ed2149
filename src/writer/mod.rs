pub mod loader;
pub mod schema_gen;
pub mod seed;
pub mod sqlite;

pub use loader::*;
pub use seed::*;
pub use sqlite::*;
