//! Boolean condition trees for WHERE and HAVING.

use super::expression::{Comparison, Expression, Predicate, RawOperand};
use super::keywords::{AggregateFunction, ComparisonOperator, JunctionOperator, LogicalOperator};
use super::window::WindowReference;
use serde::Deserialize;

/// Row filter
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawWhereCondition")]
pub enum WhereCondition {
    Comparison(Comparison),
    /// n-ary AND / OR
    Logical {
        operator: JunctionOperator,
        conditions: Vec<WhereCondition>,
    },
    Not(Box<WhereCondition>),
}

/// Filter over aggregated or windowed values
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawHavingCondition")]
pub enum HavingCondition {
    /// `F(params)[ WINDOW ref] <predicate>`
    Aggregate(AggregateCondition),
    /// Comparison whose left side is a computed quantity
    Comparison(Comparison),
    Logical {
        operator: JunctionOperator,
        conditions: Vec<HavingCondition>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCondition {
    pub function: AggregateFunction,
    pub parameters: Vec<Expression>,
    pub window: Option<WindowReference>,
    pub predicate: Predicate,
}

impl WhereCondition {
    pub fn and(conditions: Vec<WhereCondition>) -> Self {
        WhereCondition::Logical {
            operator: JunctionOperator::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<WhereCondition>) -> Self {
        WhereCondition::Logical {
            operator: JunctionOperator::Or,
            conditions,
        }
    }

    pub fn negate(condition: WhereCondition) -> Self {
        WhereCondition::Not(Box::new(condition))
    }
}

impl From<Comparison> for WhereCondition {
    fn from(comparison: Comparison) -> Self {
        WhereCondition::Comparison(comparison)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum RawWhereCondition {
    Comparison(Comparison),
    Logical(RawWhereLogical),
}

#[derive(Deserialize)]
struct RawWhereLogical {
    operator: LogicalOperator,
    #[serde(default)]
    conditions: Option<Vec<WhereCondition>>,
    #[serde(default)]
    condition: Option<Box<WhereCondition>>,
}

impl TryFrom<RawWhereCondition> for WhereCondition {
    type Error = String;

    fn try_from(raw: RawWhereCondition) -> Result<Self, Self::Error> {
        match raw {
            RawWhereCondition::Comparison(comparison) => Ok(WhereCondition::Comparison(comparison)),
            RawWhereCondition::Logical(logical) => match (logical.operator, logical.conditions, logical.condition) {
                (LogicalOperator::Not, None, Some(condition)) => Ok(WhereCondition::Not(condition)),
                (LogicalOperator::Not, _, _) => {
                    Err("NOT requires a single `condition` operand".to_string())
                }
                (LogicalOperator::And, Some(conditions), None) => Ok(WhereCondition::and(conditions)),
                (LogicalOperator::Or, Some(conditions), None) => Ok(WhereCondition::or(conditions)),
                (operator, _, _) => Err(format!("{} requires a `conditions` list", operator)),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum RawHavingCondition {
    Aggregate(RawAggregateCondition),
    Comparison(Comparison),
    Logical {
        operator: JunctionOperator,
        conditions: Vec<HavingCondition>,
    },
}

#[derive(Deserialize)]
struct RawAggregateCondition {
    function: AggregateFunction,
    #[serde(default)]
    parameters: Vec<Expression>,
    #[serde(default)]
    window: Option<WindowReference>,
    operator: ComparisonOperator,
    #[serde(default)]
    right: Option<RawOperand>,
    #[serde(default)]
    start: Option<Expression>,
    #[serde(default)]
    end: Option<Expression>,
}

impl TryFrom<RawHavingCondition> for HavingCondition {
    type Error = String;

    fn try_from(raw: RawHavingCondition) -> Result<Self, Self::Error> {
        match raw {
            RawHavingCondition::Aggregate(raw) => {
                if raw.operator.as_null_check().is_some() {
                    return Err(format!(
                        "{} is not supported for aggregate HAVING conditions",
                        raw.operator
                    ));
                }
                let predicate = Predicate::decode(raw.operator, raw.right, raw.start, raw.end)?;
                Ok(HavingCondition::Aggregate(AggregateCondition {
                    function: raw.function,
                    parameters: raw.parameters,
                    window: raw.window,
                    predicate,
                }))
            }
            RawHavingCondition::Comparison(comparison) => Ok(HavingCondition::Comparison(comparison)),
            RawHavingCondition::Logical {
                operator,
                conditions,
            } => Ok(HavingCondition::Logical {
                operator,
                conditions,
            }),
        }
    }
}
