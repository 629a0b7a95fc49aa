//! Account Store backends
//!
//! # Components
//!
//! - `memory` - Volatile `DashMap`-backed store
//! - `json_file` - One JSON document per account, atomically replaced
//! - `faulty` - Decorator that injects persist failures

pub mod faulty;
pub mod json_file;
pub mod memory;

pub use faulty::FaultyStore;
pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
