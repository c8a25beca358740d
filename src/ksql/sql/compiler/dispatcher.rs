//! Top-level statement routing.

use super::commands::{
    CreateCompiler, DescribeCompiler, DropCompiler, ExplainCompiler, InsertCompiler,
    ListCompiler, PropertyCompiler, ShowCompiler, TerminateCompiler,
};
use super::sealed::Render;
use super::select::SelectCompiler;
use super::SqlBuilder;
use crate::ksql::sql::ast::KsqlStatement;
use crate::ksql::sql::error::CompileResult;

/// Routes a [`KsqlStatement`] to the compiler for its kind
pub struct KsqlStatementCompiler;

impl Render for KsqlStatementCompiler {
    type Node = KsqlStatement;

    fn render(statement: &KsqlStatement) -> String {
        match statement {
            KsqlStatement::Select(query) => SelectCompiler::render(query),
            KsqlStatement::Insert(query) => InsertCompiler::render(query),
            KsqlStatement::Create(statement) => CreateCompiler::render(statement),
            KsqlStatement::Drop(statement) => DropCompiler::render(statement),
            KsqlStatement::Terminate(query) => TerminateCompiler::render(query),
            KsqlStatement::Property(statement) => PropertyCompiler::render(statement),
            KsqlStatement::List(statement) => ListCompiler::render(statement),
            KsqlStatement::Show(statement) => ShowCompiler::render(statement),
            KsqlStatement::Describe(query) => DescribeCompiler::render(query),
            KsqlStatement::Explain(query) => ExplainCompiler::render(query),
        }
    }
}

impl SqlBuilder for KsqlStatementCompiler {
    fn validate(statement: &KsqlStatement) -> CompileResult<()> {
        match statement {
            KsqlStatement::Select(query) => SelectCompiler::validate(query),
            KsqlStatement::Insert(query) => InsertCompiler::validate(query),
            KsqlStatement::Create(statement) => CreateCompiler::validate(statement),
            KsqlStatement::Drop(statement) => DropCompiler::validate(statement),
            KsqlStatement::Terminate(query) => TerminateCompiler::validate(query),
            KsqlStatement::Property(statement) => PropertyCompiler::validate(statement),
            KsqlStatement::List(statement) => ListCompiler::validate(statement),
            KsqlStatement::Show(statement) => ShowCompiler::validate(statement),
            KsqlStatement::Describe(query) => DescribeCompiler::validate(query),
            KsqlStatement::Explain(query) => ExplainCompiler::validate(query),
        }
    }
}
