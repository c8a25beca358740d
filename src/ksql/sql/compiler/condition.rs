//! WHERE and HAVING condition compilers.

use super::common::{collect, ensure, within};
use super::expression::ExpressionCompiler;
use super::sealed::Render;
use super::transformation::{render_call, ComparisonCompiler};
use super::window::WindowReferenceCompiler;
use super::SqlBuilder;
use crate::ksql::sql::ast::{
    AggregateCondition, Comparison, Expression, ExpressionClass, HavingCondition,
    JunctionOperator, Predicate, TransformationKind, WhereCondition,
};
use crate::ksql::sql::error::{CompileError, CompileResult};

/// Compiles row filters
pub struct WhereCompiler;

/// Compiles filters over aggregated or windowed values
pub struct HavingCompiler;

fn ensure_junction_arity(operator: JunctionOperator, count: usize) -> CompileResult<()> {
    ensure(count > 0, || format!("{} requires at least one condition", operator))
}

fn render_junction<T>(operator: JunctionOperator, conditions: &[T], render: impl Fn(&T) -> String) -> String {
    let parts: Vec<String> = conditions.iter().map(render).collect();
    format!("({})", parts.join(&format!(" {} ", operator)))
}

impl Render for WhereCompiler {
    type Node = WhereCondition;

    fn render(condition: &WhereCondition) -> String {
        match condition {
            WhereCondition::Comparison(comparison) => ComparisonCompiler::render(comparison),
            WhereCondition::Logical {
                operator,
                conditions,
            } => render_junction(*operator, conditions, Self::render),
            WhereCondition::Not(condition) => format!("NOT ({})", Self::render(condition)),
        }
    }
}

impl SqlBuilder for WhereCompiler {
    fn validate(condition: &WhereCondition) -> CompileResult<()> {
        match condition {
            WhereCondition::Comparison(comparison) => ComparisonCompiler::validate(comparison),
            WhereCondition::Logical {
                operator,
                conditions,
            } => {
                ensure_junction_arity(*operator, conditions.len())?;
                collect(
                    Some("Invalid logical condition"),
                    conditions.iter().map(Self::validate),
                )
            }
            WhereCondition::Not(condition) => Self::validate(condition),
        }
    }
}

impl HavingCompiler {
    fn validate_aggregate(condition: &AggregateCondition) -> CompileResult<()> {
        let context = match &condition.predicate {
            Predicate::Membership { .. } => "Invalid in condition",
            Predicate::Range { .. } => "Invalid between condition",
            Predicate::Binary { .. } => "Invalid other condition",
            Predicate::NullCheck { operator } => {
                return Err(CompileError::semantic(format!(
                    "{} is not supported for aggregate HAVING conditions",
                    operator
                )))
            }
        };
        let parameters = condition.parameters.iter().map(ExpressionCompiler::validate);
        let window = condition
            .window
            .iter()
            .map(|window| within("Invalid window reference", WindowReferenceCompiler::validate(window)));
        let predicate = Self::validate_right_operands(&condition.predicate);
        collect(Some(context), parameters.chain(window).chain(std::iter::once(predicate)))
    }

    /// Right-hand operands of a HAVING predicate must be plain values.
    fn validate_right_operands(predicate: &Predicate) -> CompileResult<()> {
        let operands: Vec<&Expression> = match predicate {
            Predicate::Binary { right, .. } => vec![right],
            Predicate::Membership { right, .. } => right.iter().collect(),
            Predicate::Range { start, end, .. } => vec![start, end],
            Predicate::NullCheck { .. } => Vec::new(),
        };
        collect(
            None,
            operands.into_iter().map(|operand| {
                ExpressionCompiler::ensure_class(
                    operand,
                    &[ExpressionClass::NonAggregate],
                    "a HAVING right operand",
                )
            }),
        )?;
        ComparisonCompiler::validate_predicate(predicate)
    }

    fn validate_comparison(comparison: &Comparison) -> CompileResult<()> {
        let computed = comparison
            .left
            .as_transformation()
            .map(|transformation| &transformation.kind);
        match computed {
            Some(TransformationKind::Arithmetic(_))
            | Some(TransformationKind::Aggregate(_))
            | Some(TransformationKind::Numeric(_))
            | Some(TransformationKind::WindowBoundary(_)) => {}
            Some(other) => {
                return Err(CompileError::semantic(format!(
                    "HAVING comparison requires an arithmetic, aggregate, numeric or window boundary left operand, got {}",
                    other.type_name()
                )))
            }
            None => {
                return Err(CompileError::semantic(
                    "HAVING comparison requires a computed left operand",
                ))
            }
        }
        ExpressionCompiler::validate(&comparison.left)?;
        Self::validate_right_operands(&comparison.predicate)
    }
}

impl Render for HavingCompiler {
    type Node = HavingCondition;

    fn render(condition: &HavingCondition) -> String {
        match condition {
            HavingCondition::Aggregate(aggregate) => {
                let mut call = render_call(aggregate.function, &aggregate.parameters);
                if let Some(window) = &aggregate.window {
                    call = format!("{} WINDOW {}", call, WindowReferenceCompiler::render(window));
                }
                ComparisonCompiler::render_predicate(&call, &aggregate.predicate)
            }
            HavingCondition::Comparison(comparison) => ComparisonCompiler::render(comparison),
            HavingCondition::Logical {
                operator,
                conditions,
            } => render_junction(*operator, conditions, Self::render),
        }
    }
}

impl SqlBuilder for HavingCompiler {
    fn validate(condition: &HavingCondition) -> CompileResult<()> {
        match condition {
            HavingCondition::Aggregate(aggregate) => Self::validate_aggregate(aggregate),
            HavingCondition::Comparison(comparison) => Self::validate_comparison(comparison),
            HavingCondition::Logical {
                operator,
                conditions,
            } => {
                ensure_junction_arity(*operator, conditions.len())?;
                collect(
                    Some("Invalid logical condition"),
                    conditions.iter().map(Self::validate),
                )
            }
        }
    }
}
