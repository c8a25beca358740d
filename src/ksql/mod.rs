pub mod client;
pub mod config;
pub mod sql;

// Re-export client types for the CLI and tests
pub use client::{KsqlDbClient, KsqlDbError, KsqlDbResult};
pub use config::KsqlDbConfig;
