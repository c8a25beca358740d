//! Expression compilers.

use super::common::ensure;
use super::sealed::Render;
use super::transformation::TransformationCompiler;
use super::SqlBuilder;
use crate::ksql::sql::ast::{Expression, ExpressionClass, LiteralValue, NonAggregateExpression};
use crate::ksql::sql::error::{CompileError, CompileResult};

/// Compiles columns, literals and wrapped transformations
pub struct ExpressionCompiler;

/// Compiles expressions that must not be aggregates, window functions or window boundaries
pub struct NonAggregateCompiler;

impl ExpressionCompiler {
    pub(crate) fn render_literal(value: &LiteralValue) -> String {
        match value {
            LiteralValue::Null => "NULL".to_string(),
            LiteralValue::Boolean(value) => value.to_string(),
            LiteralValue::Integer(value) => value.to_string(),
            LiteralValue::Float(value) => value.to_string(),
            LiteralValue::String(value) => format!("'{}'", value),
        }
    }

    pub(crate) fn validate_literal(value: &LiteralValue) -> CompileResult<()> {
        match value {
            LiteralValue::Float(value) => {
                ensure(value.is_finite(), || format!("Invalid literal value: {}", value))
            }
            LiteralValue::Null
            | LiteralValue::Boolean(_)
            | LiteralValue::Integer(_)
            | LiteralValue::String(_) => Ok(()),
        }
    }

    /// Check that an expression belongs to one of the allowed classes.
    pub(crate) fn ensure_class(
        expression: &Expression,
        allowed: &[ExpressionClass],
        context: &str,
    ) -> CompileResult<()> {
        let class = expression.class();
        if allowed.contains(&class) {
            return Ok(());
        }
        let kind = expression
            .as_transformation()
            .map(|transformation| transformation.kind.type_name())
            .unwrap_or("COLUMN");
        Err(CompileError::semantic(format!(
            "{} transformation is not allowed in {}",
            kind, context
        )))
    }
}

impl Render for ExpressionCompiler {
    type Node = Expression;

    fn render(expression: &Expression) -> String {
        match expression {
            Expression::Column { source_column } => source_column.clone(),
            Expression::Literal { value } => Self::render_literal(value),
            Expression::Transformation { value } => TransformationCompiler::render(value),
        }
    }
}

impl SqlBuilder for ExpressionCompiler {
    fn validate(expression: &Expression) -> CompileResult<()> {
        match expression {
            Expression::Column { source_column } => ensure(!source_column.trim().is_empty(), || {
                "Column name is required".to_string()
            }),
            Expression::Literal { value } => Self::validate_literal(value),
            Expression::Transformation { value } => TransformationCompiler::validate(value),
        }
    }
}

impl Render for NonAggregateCompiler {
    type Node = NonAggregateExpression;

    fn render(expression: &NonAggregateExpression) -> String {
        ExpressionCompiler::render(expression.expression())
    }
}

impl SqlBuilder for NonAggregateCompiler {
    fn validate(expression: &NonAggregateExpression) -> CompileResult<()> {
        ExpressionCompiler::ensure_class(
            expression.expression(),
            &[ExpressionClass::NonAggregate],
            "a non-aggregate context",
        )?;
        ExpressionCompiler::validate(expression.expression())
    }
}
