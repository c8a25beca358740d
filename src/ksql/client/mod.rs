//! ksqlDB REST client
//!
//! Submits compiled statements to a ksqlDB server and manages the persistent queries they
//! start.

pub mod error;
pub mod ksqldb_client;
pub mod types;

pub use error::{KsqlDbError, KsqlDbResult};
pub use ksqldb_client::KsqlDbClient;
pub use types::{CommandState, CommandStatus, KsqlEntity, ServerInfo};
