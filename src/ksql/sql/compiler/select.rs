//! SELECT statement compiler.
//!
//! Clauses are emitted in the engine's order:
//! `SELECT .. FROM .. WHERE .. PARTITION BY .. [WINDOW ..] GROUP BY .. HAVING .. ORDER BY .. LIMIT .. EMIT ..;`

use super::clauses::{FromCompiler, GroupByCompiler, PartitionCompiler};
use super::common::{collect, ensure, is_identifier, join_with};
use super::condition::WhereCompiler;
use super::expression::ExpressionCompiler;
use super::sealed::Render;
use super::transformation::render_order_by_column;
use super::SqlBuilder;
use crate::ksql::sql::ast::{
    ExpressionClass, GroupByColumn, HavingCondition, OrderBy, PartitionBy, SelectColumn,
    SelectQuery, WindowBinding,
};
use crate::ksql::sql::error::CompileResult;

/// Compiles every SELECT variant
pub struct SelectCompiler;

const SIMPLE_COLUMNS: &[ExpressionClass] = &[ExpressionClass::NonAggregate];
const AGGREGATE_COLUMNS: &[ExpressionClass] = &[
    ExpressionClass::NonAggregate,
    ExpressionClass::Aggregate,
    ExpressionClass::WindowFunction,
];
const WINDOWED_COLUMNS: &[ExpressionClass] = &[
    ExpressionClass::NonAggregate,
    ExpressionClass::Aggregate,
    ExpressionClass::WindowFunction,
    ExpressionClass::WindowBoundary,
];
const SIMPLE_ORDER: &[ExpressionClass] = &[ExpressionClass::NonAggregate];
const AGGREGATE_ORDER: &[ExpressionClass] =
    &[ExpressionClass::NonAggregate, ExpressionClass::Aggregate];
const WINDOWED_ORDER: &[ExpressionClass] = &[
    ExpressionClass::NonAggregate,
    ExpressionClass::Aggregate,
    ExpressionClass::WindowBoundary,
];

struct Grouping<'a> {
    columns: &'a [GroupByColumn],
    having: Option<&'a HavingCondition>,
    partition_by: Option<&'a PartitionBy>,
    window: Option<&'a WindowBinding>,
}

/// Borrowed view over the column-list select variants
struct ColumnSelect<'a> {
    kind: &'static str,
    columns: &'a [SelectColumn],
    grouping: Option<Grouping<'a>>,
    partition_by: Option<&'a PartitionBy>,
    order_by: Option<&'a OrderBy>,
    column_classes: &'static [ExpressionClass],
    order_classes: &'static [ExpressionClass],
}

impl<'a> ColumnSelect<'a> {
    fn of(query: &'a SelectQuery) -> Option<Self> {
        match query {
            SelectQuery::Star(_) => None,
            SelectQuery::Simple(select) => Some(ColumnSelect {
                kind: "a simple select",
                columns: &select.columns,
                grouping: None,
                partition_by: None,
                order_by: select.order_by.as_ref(),
                column_classes: SIMPLE_COLUMNS,
                order_classes: SIMPLE_ORDER,
            }),
            SelectQuery::Aggregate(select) => Some(ColumnSelect {
                kind: "an aggregate select",
                columns: &select.columns,
                grouping: Some(Grouping {
                    columns: select.group_by.columns(),
                    having: select.group_by.having(),
                    partition_by: select.group_by.partition_by(),
                    window: select.group_by.window(),
                }),
                partition_by: select.partition_by.as_ref(),
                order_by: select.order_by.as_ref(),
                column_classes: AGGREGATE_COLUMNS,
                order_classes: AGGREGATE_ORDER,
            }),
            SelectQuery::Windowed(select) => Some(ColumnSelect {
                kind: "a windowed select",
                columns: &select.columns,
                grouping: Some(Grouping {
                    columns: &select.group_by.columns,
                    having: select.group_by.having.as_ref(),
                    partition_by: select.group_by.partition_by.as_ref(),
                    window: Some(&select.group_by.window),
                }),
                partition_by: select.partition_by.as_ref(),
                order_by: select.order_by.as_ref(),
                column_classes: WINDOWED_COLUMNS,
                order_classes: WINDOWED_ORDER,
            }),
        }
    }

    fn validate_columns(&self) -> CompileResult<()> {
        ensure(!self.columns.is_empty(), || {
            "Select columns are required".to_string()
        })?;
        collect(
            Some("Invalid select column"),
            self.columns.iter().map(|column| {
                ExpressionCompiler::ensure_class(&column.expression, self.column_classes, self.kind)?;
                ExpressionCompiler::validate(&column.expression)?;
                match &column.alias {
                    Some(alias) => ensure(is_identifier(alias), || format!("Invalid alias: '{}'", alias)),
                    None => Ok(()),
                }
            }),
        )
    }

    fn validate_order_by(&self, order_by: &OrderBy) -> CompileResult<()> {
        ensure(!order_by.columns.is_empty(), || {
            "Order by columns are required".to_string()
        })?;
        collect(
            Some("Invalid order by column"),
            order_by.columns.iter().map(|column| {
                ExpressionCompiler::ensure_class(&column.expression, self.order_classes, "ORDER BY")?;
                ExpressionCompiler::validate(&column.expression)
            }),
        )
    }

    fn validate(&self) -> CompileResult<()> {
        self.validate_columns()?;
        if let Some(grouping) = &self.grouping {
            GroupByCompiler::validate_parts(
                grouping.columns,
                grouping.having,
                grouping.partition_by,
                grouping.window,
            )?;
        }
        if let Some(order_by) = self.order_by {
            self.validate_order_by(order_by)?;
        }
        match self.partition_by {
            Some(partition_by) => PartitionCompiler::validate(partition_by),
            None => Ok(()),
        }
    }
}

impl SelectCompiler {
    /// Render a select without the statement terminator, for embedding in other statements.
    pub(crate) fn render_query(query: &SelectQuery) -> String {
        let view = ColumnSelect::of(query);
        let mut parts = Vec::new();

        match &view {
            Some(view) => parts.push(format!(
                "SELECT {}",
                join_with(view.columns, ", ", |column| {
                    let expression = ExpressionCompiler::render(&column.expression);
                    match &column.alias {
                        Some(alias) => format!("{} AS {}", expression, alias),
                        None => expression,
                    }
                })
            )),
            None => parts.push("SELECT *".to_string()),
        }

        parts.push(FromCompiler::render(query.from_clause()));

        if let Some(condition) = query.where_clause() {
            parts.push(format!("WHERE {}", WhereCompiler::render(condition)));
        }

        if let Some(view) = &view {
            if let Some(partition_by) = view.partition_by {
                parts.push(PartitionCompiler::render(partition_by));
            }
            if let Some(grouping) = &view.grouping {
                parts.push(GroupByCompiler::render_parts(
                    grouping.columns,
                    grouping.having,
                    grouping.partition_by,
                    grouping.window,
                ));
            }
            if let Some(order_by) = view.order_by {
                parts.push(format!(
                    "ORDER BY {}",
                    join_with(&order_by.columns, ", ", render_order_by_column)
                ));
            }
        }

        if let Some(limit) = query.limit() {
            parts.push(format!("LIMIT {}", limit));
        }

        if let Some(emit) = query.emit() {
            parts.push(format!("EMIT {}", emit));
        }

        parts.join(" ")
    }
}

impl Render for SelectCompiler {
    type Node = SelectQuery;

    fn render(query: &SelectQuery) -> String {
        format!("{};", Self::render_query(query))
    }
}

impl SqlBuilder for SelectCompiler {
    fn validate(query: &SelectQuery) -> CompileResult<()> {
        FromCompiler::validate(query.from_clause())?;
        if let Some(condition) = query.where_clause() {
            WhereCompiler::validate(condition)?;
        }
        match ColumnSelect::of(query) {
            Some(view) => view.validate(),
            None => Ok(()),
        }
    }
}
