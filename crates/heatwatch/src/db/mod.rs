pub mod heat_index_data;
pub mod sqlite;

pub use heat_index_data::*;
pub use sqlite::*;
