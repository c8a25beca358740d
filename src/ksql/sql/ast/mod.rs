//! Abstract syntax of ksqlDB statements.
//!
//! Every node family is a closed enum, so adding a grammar variant forces every compiler
//! that matches on it to be updated. All nodes decode from the camelCase JSON documents
//! accepted by [`crate::compile_json`].

pub mod clause;
pub mod condition;
pub mod expression;
pub mod keywords;
pub mod query;
pub mod statement;
pub mod types;
pub mod window;

pub use clause::*;
pub use condition::*;
pub use expression::*;
pub use keywords::*;
pub use query::*;
pub use statement::*;
pub use types::*;
pub use window::*;
