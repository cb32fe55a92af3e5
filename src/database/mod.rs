//! DuckDB side of an upload: column typing, table DDL, the store handle and
//! the bulk loader.
pub mod column;
pub mod loader;
pub mod store;
pub mod table;
