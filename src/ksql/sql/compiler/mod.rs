//! Statement compilers.
//!
//! Each node family has a stateless unit-struct compiler implementing [`SqlBuilder`].
//! `validate` is pure and reports every problem it can find; `build` re-runs validation and
//! only then assembles text, so no text is ever produced for an invalid node.
//!
//! ```rust
//! use ksqlgen::ksql::sql::ast::{DataType, CastItem};
//! use ksqlgen::ksql::sql::compiler::{CastCompiler, SqlBuilder};
//!
//! let sql = CastCompiler::build(&CastItem::array(DataType::BigInt.into())).unwrap();
//! assert_eq!(sql, "ARRAY<BIGINT>");
//! ```

pub mod cast;
pub mod clauses;
mod common;
pub mod commands;
pub mod condition;
pub mod dispatcher;
pub mod expression;
pub mod select;
pub mod transformation;
pub mod window;

pub use cast::CastCompiler;
pub use clauses::{FromCompiler, GroupByCompiler, PartitionCompiler};
pub use commands::{
    CreateCompiler, DescribeCompiler, DropCompiler, ExplainCompiler, InsertCompiler,
    ListCompiler, PropertyCompiler, ShowCompiler, TerminateCompiler,
};
pub use condition::{HavingCompiler, WhereCompiler};
pub use dispatcher::KsqlStatementCompiler;
pub use expression::{ExpressionCompiler, NonAggregateCompiler};
pub use select::SelectCompiler;
pub use transformation::{ComparisonCompiler, TransformationCompiler};
pub use window::{WindowBindingCompiler, WindowCompiler, WindowReferenceCompiler};

use crate::ksql::sql::error::CompileResult;

mod sealed {
    /// Text assembly for an already validated node
    pub trait Render {
        type Node: ?Sized;

        fn render(node: &Self::Node) -> String;
    }
}

/// Validate-then-render contract shared by every compiler
pub trait SqlBuilder: sealed::Render {
    /// Check the node and all of its children without producing text.
    fn validate(node: &Self::Node) -> CompileResult<()>;

    /// Validate, then render. Fails closed: any validation error is returned and no text
    /// is produced.
    fn build(node: &Self::Node) -> CompileResult<String> {
        Self::validate(node)?;
        Ok(Self::render(node))
    }
}
