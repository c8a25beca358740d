//! Transformation compiler.
//!
//! Kind-specific rendering happens in [`TransformationCompiler::render_kind`]; the optional
//! `AS alias` suffix is applied once on top of it for every kind.

use super::cast::CastCompiler;
use super::common::{collect, ensure, is_identifier, join_with, within};
use super::expression::ExpressionCompiler;
use super::sealed::Render;
use super::window::{WindowBindingCompiler, WindowReferenceCompiler};
use super::SqlBuilder;
use crate::ksql::sql::ast::{
    AggregateCall, CaseTransformation, Comparison, Expression, FunctionCall, LogicalOperator,
    LogicalTransformation, OrderByColumn, OverClause, Predicate, Transformation,
    TransformationKind, WindowFunctionCall,
};
use crate::ksql::sql::error::{CompileError, CompileResult};
use std::fmt::Display;

/// Compiles every transformation kind
pub struct TransformationCompiler;

/// Compiles `left OP right`, `left OP (...)`, `left OP a AND b` and `left OP`
pub struct ComparisonCompiler;

fn validate_parameters(parameters: &[Expression]) -> CompileResult<()> {
    collect(None, parameters.iter().map(ExpressionCompiler::validate))
}

/// `F(a, b)`, or `F(*)` without parameters
pub(crate) fn render_call(function: impl Display, parameters: &[Expression]) -> String {
    if parameters.is_empty() {
        format!("{}(*)", function)
    } else {
        format!(
            "{}({})",
            function,
            join_with(parameters, ", ", ExpressionCompiler::render)
        )
    }
}

pub(crate) fn render_order_by_column(column: &OrderByColumn) -> String {
    let mut sql = ExpressionCompiler::render(&column.expression);
    if let Some(direction) = column.direction {
        sql.push(' ');
        sql.push_str(direction.as_str());
    }
    if let Some(nulls) = column.nulls {
        sql.push(' ');
        sql.push_str(nulls.as_str());
    }
    sql
}

impl TransformationCompiler {
    fn validate_function<F>(call: &FunctionCall<F>) -> CompileResult<()> {
        validate_parameters(&call.parameters)
    }

    fn validate_logical(logical: &LogicalTransformation) -> CompileResult<()> {
        let count = logical.expressions.len();
        match logical.operator {
            LogicalOperator::Not => ensure(count == 1, || {
                format!("NOT requires exactly one expression, got {}", count)
            })?,
            LogicalOperator::And | LogicalOperator::Or => ensure(count > 0, || {
                format!("{} requires at least one expression", logical.operator)
            })?,
        }
        collect(
            Some("Invalid logical expression"),
            logical.expressions.iter().map(ExpressionCompiler::validate),
        )
    }

    fn validate_case(case: &CaseTransformation) -> CompileResult<()> {
        ensure(!case.conditions.is_empty(), || {
            "CASE requires at least one WHEN branch".to_string()
        })?;
        let branches = case.conditions.iter().flat_map(|branch| {
            [
                ExpressionCompiler::validate(&branch.when),
                ExpressionCompiler::validate(&branch.then),
            ]
        });
        let otherwise = match &case.else_result {
            Some(expression) => ExpressionCompiler::validate(expression),
            None => Err(CompileError::semantic("Invalid condition, else is required")),
        };
        collect(None, branches.chain(std::iter::once(otherwise)))
    }

    fn validate_aggregate(call: &AggregateCall) -> CompileResult<()> {
        let window = match &call.window {
            Some(window) => within("Invalid aggregate window", WindowBindingCompiler::validate(window)),
            None => Ok(()),
        };
        collect(None, [validate_parameters(&call.parameters), window])
    }

    fn validate_window_function(call: &WindowFunctionCall) -> CompileResult<()> {
        validate_parameters(&call.parameters)?;
        let over = match &call.over {
            Some(over) => over,
            None => return Ok(()),
        };
        if let Some(partition_by) = &over.partition_by {
            collect(
                Some("Invalid OVER partition"),
                partition_by.iter().map(ExpressionCompiler::validate),
            )?;
        }
        if let Some(order_by) = &over.order_by {
            collect(
                Some("Invalid OVER order"),
                order_by
                    .iter()
                    .map(|column| ExpressionCompiler::validate(&column.expression)),
            )?;
        }
        match &over.alias {
            Some(alias) => ensure(is_identifier(alias), || format!("Invalid window alias: '{}'", alias)),
            None => Ok(()),
        }
    }

    fn validate_kind(kind: &TransformationKind) -> CompileResult<()> {
        match kind {
            TransformationKind::String(call) => Self::validate_function(call),
            TransformationKind::Numeric(call) => Self::validate_function(call),
            TransformationKind::Date(call) => Self::validate_function(call),
            TransformationKind::Collection(call) => Self::validate_function(call),
            TransformationKind::Cast(cast) => {
                within("Invalid cast type", CastCompiler::validate(&cast.target_type))?;
                ExpressionCompiler::validate(&cast.source_expression)
            }
            TransformationKind::Arithmetic(arithmetic) => {
                ExpressionCompiler::validate(&arithmetic.left)?;
                ExpressionCompiler::validate(&arithmetic.right)
            }
            TransformationKind::Comparison(comparison) => ComparisonCompiler::validate(comparison),
            TransformationKind::Logical(logical) => Self::validate_logical(logical),
            TransformationKind::Case(case) => Self::validate_case(case),
            TransformationKind::Aggregate(call) => Self::validate_aggregate(call),
            TransformationKind::WindowFunction(call) => Self::validate_window_function(call),
            TransformationKind::StructAccess(access) => {
                ExpressionCompiler::validate(&access.base)?;
                ensure(!access.field.trim().is_empty(), || {
                    "Struct field name is required".to_string()
                })
            }
            TransformationKind::ArrayAccess(access) => {
                ExpressionCompiler::validate(&access.array)?;
                ExpressionCompiler::validate(&access.index)
            }
            TransformationKind::MapAccess(access) => {
                ExpressionCompiler::validate(&access.map)?;
                ExpressionCompiler::validate(&access.key)
            }
            TransformationKind::Extract(extract) => ExpressionCompiler::validate(&extract.source),
            TransformationKind::WindowBoundary(boundary) => match &boundary.window {
                Some(window) => within("Invalid window reference", WindowReferenceCompiler::validate(window)),
                None => Ok(()),
            },
        }
    }

    fn render_logical(logical: &LogicalTransformation) -> String {
        match logical.operator {
            LogicalOperator::Not => format!(
                "(NOT {})",
                join_with(&logical.expressions, " ", ExpressionCompiler::render)
            ),
            LogicalOperator::And | LogicalOperator::Or => format!(
                "({})",
                join_with(
                    &logical.expressions,
                    &format!(" {} ", logical.operator),
                    ExpressionCompiler::render
                )
            ),
        }
    }

    fn render_case(case: &CaseTransformation) -> String {
        let mut sql = String::from("CASE");
        for branch in &case.conditions {
            sql.push_str(&format!(
                " WHEN {} THEN {}",
                ExpressionCompiler::render(&branch.when),
                ExpressionCompiler::render(&branch.then)
            ));
        }
        if let Some(otherwise) = &case.else_result {
            sql.push_str(&format!(" ELSE {}", ExpressionCompiler::render(otherwise)));
        }
        sql.push_str(" END");
        sql
    }

    fn render_over(over: &OverClause) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(partition_by) = over.partition_by.as_ref().filter(|p| !p.is_empty()) {
            parts.push(format!(
                "PARTITION BY {}",
                join_with(partition_by, ", ", ExpressionCompiler::render)
            ));
        }
        if let Some(order_by) = over.order_by.as_ref().filter(|o| !o.is_empty()) {
            parts.push(format!(
                "ORDER BY {}",
                join_with(order_by, ", ", render_order_by_column)
            ));
        }
        if !parts.is_empty() {
            Some(format!("OVER ({})", parts.join(" ")))
        } else {
            over.alias.as_ref().map(|alias| format!("OVER {}", alias))
        }
    }

    pub(crate) fn render_kind(kind: &TransformationKind) -> String {
        match kind {
            TransformationKind::String(call) => render_call(call.function, &call.parameters),
            TransformationKind::Numeric(call) => render_call(call.function, &call.parameters),
            TransformationKind::Date(call) => render_call(call.function, &call.parameters),
            TransformationKind::Collection(call) => render_call(call.function, &call.parameters),
            TransformationKind::Cast(cast) => format!(
                "CAST({} AS {})",
                ExpressionCompiler::render(&cast.source_expression),
                CastCompiler::render(&cast.target_type)
            ),
            TransformationKind::Arithmetic(arithmetic) => format!(
                "({} {} {})",
                ExpressionCompiler::render(&arithmetic.left),
                arithmetic.operator,
                ExpressionCompiler::render(&arithmetic.right)
            ),
            TransformationKind::Comparison(comparison) => ComparisonCompiler::render(comparison),
            TransformationKind::Logical(logical) => Self::render_logical(logical),
            TransformationKind::Case(case) => Self::render_case(case),
            TransformationKind::Aggregate(call) => {
                let sql = render_call(call.function, &call.parameters);
                match &call.window {
                    Some(window) => format!("{} WINDOW {}", sql, WindowBindingCompiler::render(window)),
                    None => sql,
                }
            }
            TransformationKind::WindowFunction(call) => {
                let sql = render_call(call.function, &call.parameters);
                match call.over.as_ref().and_then(Self::render_over) {
                    Some(over) => format!("{} {}", sql, over),
                    None => sql,
                }
            }
            TransformationKind::StructAccess(access) => {
                format!("{}->{}", ExpressionCompiler::render(&access.base), access.field)
            }
            TransformationKind::ArrayAccess(access) => format!(
                "{}[{}]",
                ExpressionCompiler::render(&access.array),
                ExpressionCompiler::render(&access.index)
            ),
            TransformationKind::MapAccess(access) => format!(
                "{}[{}]",
                ExpressionCompiler::render(&access.map),
                ExpressionCompiler::render(&access.key)
            ),
            TransformationKind::Extract(extract) => format!(
                "EXTRACT({} FROM {})",
                extract.field,
                ExpressionCompiler::render(&extract.source)
            ),
            TransformationKind::WindowBoundary(boundary) => match &boundary.window {
                Some(window) => format!("{} {}", boundary.boundary, WindowReferenceCompiler::render(window)),
                None => boundary.boundary.to_string(),
            },
        }
    }
}

impl Render for TransformationCompiler {
    type Node = Transformation;

    fn render(transformation: &Transformation) -> String {
        let sql = Self::render_kind(&transformation.kind);
        match &transformation.alias {
            Some(alias) => format!("{} AS {}", sql, alias),
            None => sql,
        }
    }
}

impl SqlBuilder for TransformationCompiler {
    fn validate(transformation: &Transformation) -> CompileResult<()> {
        Self::validate_kind(&transformation.kind)?;
        match &transformation.alias {
            Some(alias) => ensure(is_identifier(alias), || format!("Invalid alias: '{}'", alias)),
            None => Ok(()),
        }
    }
}

impl ComparisonCompiler {
    pub(crate) fn validate_predicate(predicate: &Predicate) -> CompileResult<()> {
        match predicate {
            Predicate::Binary { right, .. } => ExpressionCompiler::validate(right),
            Predicate::Membership { right, .. } => collect(
                Some("Invalid in condition"),
                right.iter().map(ExpressionCompiler::validate),
            ),
            Predicate::Range { start, end, .. } => {
                within("Invalid between condition", ExpressionCompiler::validate(start))?;
                within("Invalid between condition", ExpressionCompiler::validate(end))
            }
            Predicate::NullCheck { .. } => Ok(()),
        }
    }

    /// Apply a predicate to already rendered left-hand text.
    pub(crate) fn render_predicate(left: &str, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Binary { operator, right } => {
                format!("{} {} {}", left, operator, ExpressionCompiler::render(right))
            }
            Predicate::Membership { operator, right } => format!(
                "{} {} ({})",
                left,
                operator,
                join_with(right, ", ", ExpressionCompiler::render)
            ),
            Predicate::Range {
                operator,
                start,
                end,
            } => format!(
                "{} {} {} AND {}",
                left,
                operator,
                ExpressionCompiler::render(start),
                ExpressionCompiler::render(end)
            ),
            Predicate::NullCheck { operator } => format!("{} {}", left, operator),
        }
    }
}

impl Render for ComparisonCompiler {
    type Node = Comparison;

    fn render(comparison: &Comparison) -> String {
        Self::render_predicate(
            &ExpressionCompiler::render(&comparison.left),
            &comparison.predicate,
        )
    }
}

impl SqlBuilder for ComparisonCompiler {
    fn validate(comparison: &Comparison) -> CompileResult<()> {
        ExpressionCompiler::validate(&comparison.left)?;
        Self::validate_predicate(&comparison.predicate)
    }
}
