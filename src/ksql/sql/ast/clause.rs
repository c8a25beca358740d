//! SELECT clauses: FROM, joins, GROUP BY, PARTITION BY, ORDER BY.

use super::condition::HavingCondition;
use super::expression::{Expression, NonAggregateExpression};
use super::keywords::{DataSourceType, JoinType, NullHandling, OrderDirection};
use super::query::SelectQuery;
use super::statement::FormatConfig;
use super::window::{WindowBinding, WindowDuration, WindowSpec};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromClause {
    pub source_type: DataSourceType,
    pub source: Source,
    #[serde(default)]
    pub source_options: Option<SourceOptions>,
    #[serde(default)]
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// A named stream or table
    Direct(DirectSource),
    /// `(SELECT ...) AS alias`
    Subquery(SubquerySource),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectSource {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub source_type: DataSourceType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubquerySource {
    pub query: Box<SelectQuery>,
    pub alias: String,
}

/// Options attached to a FROM source.
///
/// Only `window`, `partitionBy` and `timestamp` have FROM-clause syntax and render. The
/// remaining options describe the source's topic and storage; they are validated but
/// never emitted. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceOptions {
    /// STREAM only
    #[serde(default)]
    pub window: Option<WindowSpec>,
    /// STREAM only
    #[serde(default)]
    pub partition_by: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<TimestampConfig>,
    #[serde(default)]
    pub format: Option<FormatConfig>,
    #[serde(default)]
    pub retention: Option<RetentionConfig>,
    #[serde(default)]
    pub emit_changes: Option<bool>,
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub partitions: Option<i64>,
    #[serde(default)]
    pub replicas: Option<i64>,
    /// TABLE only
    #[serde(default)]
    pub cluster_by: Option<Vec<String>>,
    /// TABLE only
    #[serde(default)]
    pub state_store_name: Option<String>,
    /// TABLE only
    #[serde(default)]
    pub caching: Option<bool>,
}

/// Source retention by size, by time, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct RetentionConfig {
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub time: Option<WindowDuration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimestampConfig {
    pub column: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Join {
    #[serde(rename = "type")]
    pub join_type: JoinType,
    pub source: JoinSource,
    #[serde(default)]
    pub window: Option<JoinWindow>,
    #[serde(default)]
    pub conditions: Vec<JoinCondition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSource {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub source_type: DataSourceType,
}

/// `WITHIN (before BEFORE, after AFTER[, GRACE PERIOD g])`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWindow {
    pub before: WindowDuration,
    pub after: WindowDuration,
    #[serde(default)]
    pub grace_period: Option<WindowDuration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCondition {
    pub left_field: String,
    pub right_field: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartitionBy {
    pub columns: Vec<NonAggregateExpression>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupByColumn {
    pub expression: NonAggregateExpression,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Grouping, widening from plain keys to keys with HAVING/PARTITION BY to a windowed
/// aggregation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawGroupBy")]
pub enum GroupBy {
    Simple(SimpleGroupBy),
    Aggregate(AggregateGroupBy),
    Windowed(WindowedGroupBy),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleGroupBy {
    pub columns: Vec<GroupByColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateGroupBy {
    pub columns: Vec<GroupByColumn>,
    pub having: Option<HavingCondition>,
    pub partition_by: Option<PartitionBy>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowedGroupBy {
    pub columns: Vec<GroupByColumn>,
    #[serde(default)]
    pub having: Option<HavingCondition>,
    #[serde(default)]
    pub partition_by: Option<PartitionBy>,
    pub window: WindowBinding,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBy {
    pub columns: Vec<OrderByColumn>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderByColumn {
    pub expression: Expression,
    #[serde(default)]
    pub direction: Option<OrderDirection>,
    #[serde(default)]
    pub nulls: Option<NullHandling>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectColumn {
    pub expression: Expression,
    #[serde(default)]
    pub alias: Option<String>,
}

impl FromClause {
    pub fn direct(source_type: DataSourceType, name: impl Into<String>) -> Self {
        Self {
            source_type,
            source: Source::Direct(DirectSource {
                name: name.into(),
                alias: None,
                source_type,
            }),
            source_options: None,
            joins: Vec::new(),
        }
    }

    pub fn stream(name: impl Into<String>) -> Self {
        Self::direct(DataSourceType::Stream, name)
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::direct(DataSourceType::Table, name)
    }
}

impl GroupByColumn {
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            expression: NonAggregateExpression::column(name),
            alias: None,
        }
    }
}

impl SelectColumn {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl OrderByColumn {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            direction: None,
            nulls: None,
        }
    }
}

impl GroupBy {
    pub fn columns(&self) -> &[GroupByColumn] {
        match self {
            GroupBy::Simple(group_by) => &group_by.columns,
            GroupBy::Aggregate(group_by) => &group_by.columns,
            GroupBy::Windowed(group_by) => &group_by.columns,
        }
    }

    pub fn having(&self) -> Option<&HavingCondition> {
        match self {
            GroupBy::Simple(_) => None,
            GroupBy::Aggregate(group_by) => group_by.having.as_ref(),
            GroupBy::Windowed(group_by) => group_by.having.as_ref(),
        }
    }

    pub fn partition_by(&self) -> Option<&PartitionBy> {
        match self {
            GroupBy::Simple(_) => None,
            GroupBy::Aggregate(group_by) => group_by.partition_by.as_ref(),
            GroupBy::Windowed(group_by) => group_by.partition_by.as_ref(),
        }
    }

    pub fn window(&self) -> Option<&WindowBinding> {
        match self {
            GroupBy::Simple(_) | GroupBy::Aggregate(_) => None,
            GroupBy::Windowed(group_by) => Some(&group_by.window),
        }
    }
}

impl From<WindowedGroupBy> for GroupBy {
    fn from(group_by: WindowedGroupBy) -> Self {
        GroupBy::Windowed(group_by)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGroupBy {
    columns: Vec<GroupByColumn>,
    #[serde(default)]
    having: Option<HavingCondition>,
    #[serde(default)]
    partition_by: Option<PartitionBy>,
    #[serde(default)]
    window: Option<WindowBinding>,
}

impl From<RawGroupBy> for GroupBy {
    fn from(raw: RawGroupBy) -> Self {
        match (raw.window, raw.having, raw.partition_by) {
            (Some(window), having, partition_by) => GroupBy::Windowed(WindowedGroupBy {
                columns: raw.columns,
                having,
                partition_by,
                window,
            }),
            (None, None, None) => GroupBy::Simple(SimpleGroupBy {
                columns: raw.columns,
            }),
            (None, having, partition_by) => GroupBy::Aggregate(AggregateGroupBy {
                columns: raw.columns,
                having,
                partition_by,
            }),
        }
    }
}
