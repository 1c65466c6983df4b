pub mod keydb_store;
pub mod memory_store;
pub mod populate;
pub mod service;
pub mod store;
