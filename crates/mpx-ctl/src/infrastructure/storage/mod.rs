//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads and writes the seat configuration and device
//! map documents as JSON files in one directory.

pub mod config;

pub use config::{ConfigStore, StoreError};
