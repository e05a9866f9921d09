pub mod path;
pub mod table;
