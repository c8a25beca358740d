//! Expressions and transformations.
//!
//! [`Expression`] and [`Transformation`] are mutually recursive: a transformation takes
//! expressions as operands and an expression may wrap a transformation.

use super::clause::OrderByColumn;
use super::keywords::*;
use super::types::CastItem;
use super::window::{WindowBinding, WindowReference};
use serde::Deserialize;

/// A value-producing term
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expression {
    /// Column reference, emitted verbatim
    Column {
        #[serde(rename = "sourceColumn")]
        source_column: String,
    },
    /// Constant value
    Literal { value: LiteralValue },
    /// Computed value
    Transformation { value: Box<Transformation> },
}

/// Literal payload accepted by the engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// How an expression may be used in select lists and ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionClass {
    NonAggregate,
    Aggregate,
    WindowFunction,
    WindowBoundary,
}

/// An expression whose top level is not an aggregate, window function or window boundary.
///
/// Used for GROUP BY keys, PARTITION BY columns and HAVING right-hand operands.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct NonAggregateExpression(pub Expression);

/// A computed expression with an optional output alias
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transformation {
    #[serde(flatten)]
    pub kind: TransformationKind,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationKind {
    String(FunctionCall<StringFunction>),
    Numeric(FunctionCall<NumericFunction>),
    Date(FunctionCall<DateFunction>),
    Collection(FunctionCall<CollectionFunction>),
    Cast(CastTransformation),
    Arithmetic(ArithmeticTransformation),
    Comparison(Comparison),
    Logical(LogicalTransformation),
    Case(CaseTransformation),
    Aggregate(AggregateCall),
    #[serde(rename = "WINDOW")]
    WindowFunction(WindowFunctionCall),
    StructAccess(StructAccess),
    ArrayAccess(ArrayAccess),
    MapAccess(MapAccess),
    Extract(ExtractTransformation),
    WindowBoundary(WindowBoundaryTransformation),
}

/// `FUNCTION(arg, ...)` over a closed function vocabulary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionCall<F> {
    pub function: F,
    #[serde(default)]
    pub parameters: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastTransformation {
    pub target_type: CastItem,
    pub source_expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArithmeticTransformation {
    pub operator: ArithmeticOperator,
    pub left: Expression,
    pub right: Expression,
}

/// A left operand tested by a predicate
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawComparison")]
pub struct Comparison {
    pub left: Expression,
    pub predicate: Predicate,
}

/// Right-hand side of a comparison; the operator family fixes the operand shape
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `left OP right`
    Binary {
        operator: BinaryComparisonOperator,
        right: Expression,
    },
    /// `left OP (r1, r2, ...)`
    Membership {
        operator: MembershipOperator,
        right: Vec<Expression>,
    },
    /// `left OP start AND end`
    Range {
        operator: RangeOperator,
        start: Expression,
        end: Expression,
    },
    /// `left OP`
    NullCheck { operator: NullCheckOperator },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogicalTransformation {
    pub operator: LogicalOperator,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseTransformation {
    pub conditions: Vec<CaseBranch>,
    #[serde(default, rename = "else")]
    pub else_result: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseBranch {
    pub when: Expression,
    pub then: Expression,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    #[serde(default)]
    pub parameters: Vec<Expression>,
    #[serde(default)]
    pub window: Option<WindowBinding>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowFunctionCall {
    pub function: WindowFunction,
    #[serde(default)]
    pub parameters: Vec<Expression>,
    #[serde(default)]
    pub over: Option<OverClause>,
}

/// `OVER (PARTITION BY ... ORDER BY ...)` or `OVER alias`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverClause {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub partition_by: Option<Vec<Expression>>,
    #[serde(default)]
    pub order_by: Option<Vec<OrderByColumn>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StructAccess {
    #[serde(rename = "struct")]
    pub base: Expression,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrayAccess {
    pub array: Expression,
    pub index: Expression,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapAccess {
    pub map: Expression,
    pub key: Expression,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractTransformation {
    pub field: TimeExtractField,
    pub source: Expression,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowBoundaryTransformation {
    pub boundary: WindowBoundary,
    #[serde(default)]
    pub window: Option<WindowReference>,
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column {
            source_column: name.into(),
        }
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Expression::Literal {
            value: value.into(),
        }
    }

    pub fn null() -> Self {
        Expression::Literal {
            value: LiteralValue::Null,
        }
    }

    pub fn transformation(transformation: Transformation) -> Self {
        Expression::Transformation {
            value: Box::new(transformation),
        }
    }

    /// Classify the top level of this expression.
    pub fn class(&self) -> ExpressionClass {
        match self {
            Expression::Column { .. } | Expression::Literal { .. } => ExpressionClass::NonAggregate,
            Expression::Transformation { value } => match value.kind {
                TransformationKind::Aggregate(_) => ExpressionClass::Aggregate,
                TransformationKind::WindowFunction(_) => ExpressionClass::WindowFunction,
                TransformationKind::WindowBoundary(_) => ExpressionClass::WindowBoundary,
                TransformationKind::String(_)
                | TransformationKind::Numeric(_)
                | TransformationKind::Date(_)
                | TransformationKind::Collection(_)
                | TransformationKind::Cast(_)
                | TransformationKind::Arithmetic(_)
                | TransformationKind::Comparison(_)
                | TransformationKind::Logical(_)
                | TransformationKind::Case(_)
                | TransformationKind::StructAccess(_)
                | TransformationKind::ArrayAccess(_)
                | TransformationKind::MapAccess(_)
                | TransformationKind::Extract(_) => ExpressionClass::NonAggregate,
            },
        }
    }

    pub fn as_transformation(&self) -> Option<&Transformation> {
        match self {
            Expression::Transformation { value } => Some(value),
            _ => None,
        }
    }
}

impl From<Transformation> for Expression {
    fn from(transformation: Transformation) -> Self {
        Expression::transformation(transformation)
    }
}

impl From<TransformationKind> for Expression {
    fn from(kind: TransformationKind) -> Self {
        Expression::transformation(Transformation::new(kind))
    }
}

impl NonAggregateExpression {
    pub fn column(name: impl Into<String>) -> Self {
        NonAggregateExpression(Expression::column(name))
    }

    pub fn expression(&self) -> &Expression {
        &self.0
    }
}

impl From<Expression> for NonAggregateExpression {
    fn from(expression: Expression) -> Self {
        NonAggregateExpression(expression)
    }
}

impl Transformation {
    pub fn new(kind: TransformationKind) -> Self {
        Self { kind, alias: None }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl TransformationKind {
    /// Wire discriminant of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            TransformationKind::String(_) => "STRING",
            TransformationKind::Numeric(_) => "NUMERIC",
            TransformationKind::Date(_) => "DATE",
            TransformationKind::Collection(_) => "COLLECTION",
            TransformationKind::Cast(_) => "CAST",
            TransformationKind::Arithmetic(_) => "ARITHMETIC",
            TransformationKind::Comparison(_) => "COMPARISON",
            TransformationKind::Logical(_) => "LOGICAL",
            TransformationKind::Case(_) => "CASE",
            TransformationKind::Aggregate(_) => "AGGREGATE",
            TransformationKind::WindowFunction(_) => "WINDOW",
            TransformationKind::StructAccess(_) => "STRUCT_ACCESS",
            TransformationKind::ArrayAccess(_) => "ARRAY_ACCESS",
            TransformationKind::MapAccess(_) => "MAP_ACCESS",
            TransformationKind::Extract(_) => "EXTRACT",
            TransformationKind::WindowBoundary(_) => "WINDOW_BOUNDARY",
        }
    }
}

impl<F> FunctionCall<F> {
    pub fn new(function: F, parameters: Vec<Expression>) -> Self {
        Self {
            function,
            parameters,
        }
    }
}

impl AggregateCall {
    pub fn new(function: AggregateFunction, parameters: Vec<Expression>) -> Self {
        Self {
            function,
            parameters,
            window: None,
        }
    }
}

impl Comparison {
    pub fn new(left: Expression, predicate: Predicate) -> Self {
        Self { left, predicate }
    }

    pub fn binary(left: Expression, operator: BinaryComparisonOperator, right: Expression) -> Self {
        Self::new(left, Predicate::Binary { operator, right })
    }
}

impl Predicate {
    /// Engine token of the operator
    pub fn operator_str(&self) -> &'static str {
        match self {
            Predicate::Binary { operator, .. } => operator.as_str(),
            Predicate::Membership { operator, .. } => operator.as_str(),
            Predicate::Range { operator, .. } => operator.as_str(),
            Predicate::NullCheck { operator } => operator.as_str(),
        }
    }

    /// Build a predicate from the loose wire form, where `right` may be a single
    /// expression, a list or a `{start, end}` range.
    pub(crate) fn decode(
        operator: ComparisonOperator,
        right: Option<RawOperand>,
        start: Option<Expression>,
        end: Option<Expression>,
    ) -> Result<Self, String> {
        if let Some(operator) = operator.as_null_check() {
            return match right {
                None => Ok(Predicate::NullCheck { operator }),
                Some(_) => Err(format!("{} does not take a right operand", operator)),
            };
        }
        if let Some(operator) = operator.as_membership() {
            return match right {
                Some(RawOperand::List(right)) => Ok(Predicate::Membership { operator, right }),
                _ => Err(format!("{} requires a list of right operands", operator)),
            };
        }
        if let Some(operator) = operator.as_range() {
            return match (right, start, end) {
                (Some(RawOperand::Range { start, end }), _, _) | (None, Some(start), Some(end)) => {
                    Ok(Predicate::Range {
                        operator,
                        start,
                        end,
                    })
                }
                _ => Err(format!("{} requires start and end operands", operator)),
            };
        }
        match (operator.as_binary(), right) {
            (Some(operator), Some(RawOperand::Single(right))) => {
                Ok(Predicate::Binary { operator, right })
            }
            _ => Err(format!("{} requires a single right operand", operator)),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Boolean(value)
    }
}

/// Right operand as it appears on the wire
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawOperand {
    List(Vec<Expression>),
    Range { start: Expression, end: Expression },
    Single(Expression),
}

#[derive(Deserialize)]
pub(crate) struct RawComparison {
    operator: ComparisonOperator,
    #[serde(default)]
    left: Option<Expression>,
    #[serde(default)]
    expression: Option<Expression>,
    #[serde(default)]
    right: Option<RawOperand>,
    #[serde(default)]
    start: Option<Expression>,
    #[serde(default)]
    end: Option<Expression>,
}

impl TryFrom<RawComparison> for Comparison {
    type Error = String;

    fn try_from(raw: RawComparison) -> Result<Self, Self::Error> {
        let left = raw
            .left
            .or(raw.expression)
            .ok_or_else(|| format!("{} comparison requires a left operand", raw.operator))?;
        let predicate = Predicate::decode(raw.operator, raw.right, raw.start, raw.end)?;
        Ok(Comparison { left, predicate })
    }
}
