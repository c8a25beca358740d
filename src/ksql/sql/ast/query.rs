//! SELECT queries.

use super::clause::{FromClause, GroupBy, OrderBy, PartitionBy, SelectColumn, WindowedGroupBy};
use super::condition::WhereCondition;
use super::keywords::EmitType;
use serde::Deserialize;

/// A continuous or pull query.
///
/// The variant decides which expressions the select list and ORDER BY may hold:
/// `Simple` only non-aggregates, `Aggregate` adds aggregate calls, `Windowed` also admits
/// window boundaries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSelectQuery")]
pub enum SelectQuery {
    Star(SelectStar),
    Simple(SimpleSelect),
    Aggregate(AggregateSelect),
    Windowed(WindowedSelect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStar {
    pub from: FromClause,
    pub where_clause: Option<WhereCondition>,
    pub limit: Option<u64>,
    pub emit: Option<EmitType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSelect {
    pub columns: Vec<SelectColumn>,
    pub from: FromClause,
    pub where_clause: Option<WhereCondition>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub emit: Option<EmitType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSelect {
    pub columns: Vec<SelectColumn>,
    pub from: FromClause,
    pub where_clause: Option<WhereCondition>,
    pub group_by: GroupBy,
    pub partition_by: Option<PartitionBy>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub emit: Option<EmitType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSelect {
    pub columns: Vec<SelectColumn>,
    pub from: FromClause,
    pub where_clause: Option<WhereCondition>,
    pub group_by: WindowedGroupBy,
    pub partition_by: Option<PartitionBy>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u64>,
    pub emit: Option<EmitType>,
}

impl SelectQuery {
    pub fn from_clause(&self) -> &FromClause {
        match self {
            SelectQuery::Star(query) => &query.from,
            SelectQuery::Simple(query) => &query.from,
            SelectQuery::Aggregate(query) => &query.from,
            SelectQuery::Windowed(query) => &query.from,
        }
    }

    pub fn where_clause(&self) -> Option<&WhereCondition> {
        match self {
            SelectQuery::Star(query) => query.where_clause.as_ref(),
            SelectQuery::Simple(query) => query.where_clause.as_ref(),
            SelectQuery::Aggregate(query) => query.where_clause.as_ref(),
            SelectQuery::Windowed(query) => query.where_clause.as_ref(),
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            SelectQuery::Star(query) => query.limit,
            SelectQuery::Simple(query) => query.limit,
            SelectQuery::Aggregate(query) => query.limit,
            SelectQuery::Windowed(query) => query.limit,
        }
    }

    pub fn emit(&self) -> Option<EmitType> {
        match self {
            SelectQuery::Star(query) => query.emit,
            SelectQuery::Simple(query) => query.emit,
            SelectQuery::Aggregate(query) => query.emit,
            SelectQuery::Windowed(query) => query.emit,
        }
    }
}

impl SelectStar {
    pub fn new(from: FromClause) -> Self {
        Self {
            from,
            where_clause: None,
            limit: None,
            emit: None,
        }
    }
}

impl SimpleSelect {
    pub fn new(columns: Vec<SelectColumn>, from: FromClause) -> Self {
        Self {
            columns,
            from,
            where_clause: None,
            order_by: None,
            limit: None,
            emit: None,
        }
    }
}

impl AggregateSelect {
    pub fn new(columns: Vec<SelectColumn>, from: FromClause, group_by: GroupBy) -> Self {
        Self {
            columns,
            from,
            where_clause: None,
            group_by,
            partition_by: None,
            order_by: None,
            limit: None,
            emit: None,
        }
    }
}

impl WindowedSelect {
    pub fn new(columns: Vec<SelectColumn>, from: FromClause, group_by: WindowedGroupBy) -> Self {
        Self {
            columns,
            from,
            where_clause: None,
            group_by,
            partition_by: None,
            order_by: None,
            limit: None,
            emit: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum RawSelectQuery {
    Star(RawSelectBody),
    Column(RawSelectBody),
}

/// Every field a SELECT may carry on the wire
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSelectBody {
    #[serde(default)]
    columns: Vec<SelectColumn>,
    from: FromClause,
    #[serde(default, rename = "where")]
    where_clause: Option<WhereCondition>,
    #[serde(default)]
    group_by: Option<GroupBy>,
    #[serde(default)]
    partition_by: Option<PartitionBy>,
    #[serde(default)]
    order_by: Option<OrderBy>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    emit: Option<EmitType>,
}

impl RawSelectBody {
    pub(crate) fn into_star(self) -> SelectQuery {
        SelectQuery::Star(SelectStar {
            from: self.from,
            where_clause: self.where_clause,
            limit: self.limit,
            emit: self.emit,
        })
    }

    pub(crate) fn into_columns(self) -> Result<SelectQuery, String> {
        let query = match self.group_by {
            None => {
                if self.partition_by.is_some() {
                    return Err("partitionBy requires a groupBy on the select".to_string());
                }
                SelectQuery::Simple(SimpleSelect {
                    columns: self.columns,
                    from: self.from,
                    where_clause: self.where_clause,
                    order_by: self.order_by,
                    limit: self.limit,
                    emit: self.emit,
                })
            }
            Some(GroupBy::Windowed(group_by)) => SelectQuery::Windowed(WindowedSelect {
                columns: self.columns,
                from: self.from,
                where_clause: self.where_clause,
                group_by,
                partition_by: self.partition_by,
                order_by: self.order_by,
                limit: self.limit,
                emit: self.emit,
            }),
            Some(group_by) => SelectQuery::Aggregate(AggregateSelect {
                columns: self.columns,
                from: self.from,
                where_clause: self.where_clause,
                group_by,
                partition_by: self.partition_by,
                order_by: self.order_by,
                limit: self.limit,
                emit: self.emit,
            }),
        };
        Ok(query)
    }
}

impl TryFrom<RawSelectQuery> for SelectQuery {
    type Error = String;

    fn try_from(raw: RawSelectQuery) -> Result<Self, Self::Error> {
        match raw {
            RawSelectQuery::Star(body) => Ok(body.into_star()),
            RawSelectQuery::Column(body) => body.into_columns(),
        }
    }
}
