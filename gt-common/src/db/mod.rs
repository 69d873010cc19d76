//! Database initialization and schema

pub mod init;

pub use init::{init_database, init_memory_database, SCHEMA_VERSION};
