pub mod csv_io;
pub mod fields;
pub mod record;

pub use csv_io::*;
pub use fields::*;
pub use record::*;
