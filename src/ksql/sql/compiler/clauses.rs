//! FROM, GROUP BY and PARTITION BY clause compilers.

use super::common::{
    check_duration, collect, ensure, is_identifier, is_qualified_identifier, join_with, quote,
    render_duration, within,
};
use super::condition::HavingCompiler;
use super::expression::NonAggregateCompiler;
use super::sealed::Render;
use super::select::SelectCompiler;
use super::window::{WindowBindingCompiler, WindowCompiler};
use super::SqlBuilder;
use crate::ksql::sql::ast::{
    DataSourceType, FromClause, GroupBy, GroupByColumn, HavingCondition, Join, JoinWindow,
    PartitionBy, Source, SourceOptions, TimestampConfig, WindowBinding,
};
use crate::ksql::sql::error::{CompileError, CompileResult};

/// Compiles `PARTITION BY expr, ...`
pub struct PartitionCompiler;

/// Compiles `FROM source[ options][ joins]`
pub struct FromCompiler;

/// Compiles `[WINDOW w ]GROUP BY ...[ HAVING ...][ PARTITION BY ...]`
pub struct GroupByCompiler;

fn ensure_alias(alias: &Option<String>) -> CompileResult<()> {
    match alias {
        Some(alias) => ensure(is_identifier(alias), || format!("Invalid alias: '{}'", alias)),
        None => Ok(()),
    }
}

fn ensure_positive(label: &str, value: Option<i64>) -> CompileResult<()> {
    match value {
        Some(value) => ensure(value > 0, || format!("Invalid {}: {}", label, value)),
        None => Ok(()),
    }
}

impl Render for PartitionCompiler {
    type Node = PartitionBy;

    fn render(partition: &PartitionBy) -> String {
        format!(
            "PARTITION BY {}",
            join_with(&partition.columns, ", ", NonAggregateCompiler::render)
        )
    }
}

impl SqlBuilder for PartitionCompiler {
    fn validate(partition: &PartitionBy) -> CompileResult<()> {
        ensure(!partition.columns.is_empty(), || {
            "Partition by columns are required".to_string()
        })?;
        collect(
            Some("Invalid partition by column"),
            partition.columns.iter().map(NonAggregateCompiler::validate),
        )
    }
}

impl FromCompiler {
    fn validate_source(clause: &FromClause) -> CompileResult<()> {
        match &clause.source {
            Source::Direct(direct) => {
                ensure(is_identifier(&direct.name), || {
                    format!("Invalid from source: '{}'", direct.name)
                })?;
                ensure_alias(&direct.alias)?;
                ensure(direct.source_type == clause.source_type, || {
                    format!(
                        "Source {} is a {} but the from clause reads a {}",
                        direct.name, direct.source_type, clause.source_type
                    )
                })
            }
            Source::Subquery(subquery) => {
                ensure(is_identifier(&subquery.alias), || {
                    format!("Invalid subquery alias: '{}'", subquery.alias)
                })?;
                within("Invalid subquery", SelectCompiler::validate(&subquery.query))
            }
        }
    }

    fn validate_options(source_type: DataSourceType, options: &SourceOptions) -> CompileResult<()> {
        let stream_only = |present: bool, option: &str| {
            ensure(source_type == DataSourceType::Stream || !present, || {
                format!("{} is only supported for STREAM sources", option)
            })
        };
        let table_only = |present: bool, option: &str| {
            ensure(source_type == DataSourceType::Table || !present, || {
                format!("{} is only supported for TABLE sources", option)
            })
        };
        let window = match &options.window {
            Some(window) => WindowCompiler::validate(window),
            None => Ok(()),
        };
        let partition_columns = options.partition_by.iter().flatten().map(|column| {
            ensure(is_qualified_identifier(column), || {
                format!("Invalid partition by column: '{}'", column)
            })
        });
        let cluster_columns = options.cluster_by.iter().flatten().map(|column| {
            ensure(is_qualified_identifier(column), || {
                format!("Invalid cluster by column: '{}'", column)
            })
        });
        let timestamp = options.timestamp.iter().map(|timestamp| {
            ensure(!timestamp.column.trim().is_empty(), || {
                "Timestamp column is required".to_string()
            })
        });
        let retention = options.retention.iter().flat_map(|retention| {
            [
                ensure_positive("retention size", retention.size),
                retention.time.as_ref().map_or(Ok(()), check_duration),
            ]
        });
        let topic = options.topic_name.iter().map(|topic| {
            ensure(!topic.trim().is_empty(), || "Topic name must not be empty".to_string())
        });
        let store = options.state_store_name.iter().map(|store| {
            ensure(!store.trim().is_empty(), || "State store name must not be empty".to_string())
        });
        let context = match source_type {
            DataSourceType::Stream => "Invalid stream source options",
            DataSourceType::Table => "Invalid table source options",
        };
        collect(
            Some(context),
            [
                stream_only(options.window.is_some(), "WINDOW"),
                stream_only(options.partition_by.is_some(), "PARTITION BY"),
                table_only(options.cluster_by.is_some(), "CLUSTER BY"),
                table_only(options.state_store_name.is_some(), "STATE_STORE_NAME"),
                table_only(options.caching.is_some(), "CACHING"),
                window,
                ensure_positive("partitions", options.partitions),
                ensure_positive("replicas", options.replicas),
            ]
            .into_iter()
            .chain(partition_columns)
            .chain(cluster_columns)
            .chain(timestamp)
            .chain(retention)
            .chain(topic)
            .chain(store),
        )
    }

    fn validate_join_window(window: &JoinWindow) -> CompileResult<()> {
        let grace = window.grace_period.as_ref().map_or(Ok(()), check_duration);
        collect(
            Some("Invalid join window"),
            [check_duration(&window.before), check_duration(&window.after), grace],
        )
    }

    fn validate_join(source_type: DataSourceType, join: &Join) -> CompileResult<()> {
        ensure(is_identifier(&join.source.name), || {
            format!("Invalid join source: '{}'", join.source.name)
        })?;
        ensure_alias(&join.source.alias)?;
        match (source_type, join.source.source_type, &join.window) {
            (DataSourceType::Table, DataSourceType::Stream, _) => {
                return Err(CompileError::semantic(format!(
                    "TABLE sources cannot join STREAM {}",
                    join.source.name
                )))
            }
            (DataSourceType::Stream, DataSourceType::Stream, None) => {
                return Err(CompileError::semantic(format!(
                    "STREAM-STREAM join with {} requires a WITHIN window",
                    join.source.name
                )))
            }
            (DataSourceType::Stream, DataSourceType::Stream, Some(window)) => {
                Self::validate_join_window(window)?
            }
            (_, DataSourceType::Table, Some(_)) => {
                return Err(CompileError::semantic(format!(
                    "Join with TABLE {} does not take a WITHIN window",
                    join.source.name
                )))
            }
            (_, DataSourceType::Table, None) => {}
        }
        ensure(!join.conditions.is_empty(), || {
            "Join conditions are required".to_string()
        })?;
        collect(
            None,
            join.conditions.iter().map(|condition| {
                ensure(
                    !condition.left_field.trim().is_empty() && !condition.right_field.trim().is_empty(),
                    || "Join condition requires both fields".to_string(),
                )
            }),
        )
    }

    fn render_source(source: &Source) -> String {
        match source {
            Source::Direct(direct) => match &direct.alias {
                Some(alias) => format!("{} AS {}", direct.name, alias),
                None => direct.name.clone(),
            },
            Source::Subquery(subquery) => format!(
                "({}) AS {}",
                SelectCompiler::render_query(&subquery.query),
                subquery.alias
            ),
        }
    }

    fn render_timestamp(timestamp: &TimestampConfig) -> String {
        let mut sql = format!("TIMESTAMP({}", timestamp.column);
        if let Some(format) = &timestamp.format {
            sql.push_str(&format!(", {}", quote(format)));
        }
        if let Some(timezone) = &timestamp.timezone {
            sql.push_str(&format!(", {}", quote(timezone)));
        }
        sql.push(')');
        sql
    }

    fn render_options(options: &SourceOptions) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(window) = &options.window {
            parts.push(format!("WINDOW {}", WindowCompiler::render(window)));
        }
        if let Some(partition_by) = &options.partition_by {
            parts.push(format!("PARTITION BY {}", partition_by.join(", ")));
        }
        if let Some(timestamp) = &options.timestamp {
            parts.push(Self::render_timestamp(timestamp));
        }
        parts
    }

    fn render_join(join: &Join) -> String {
        let mut sql = format!("{} JOIN {}", join.join_type, join.source.name);
        if let Some(alias) = &join.source.alias {
            sql.push_str(&format!(" AS {}", alias));
        }
        if let Some(window) = &join.window {
            sql.push_str(&format!(
                " WITHIN ({} BEFORE, {} AFTER",
                render_duration(&window.before),
                render_duration(&window.after)
            ));
            if let Some(grace) = &window.grace_period {
                sql.push_str(&format!(", GRACE PERIOD {}", render_duration(grace)));
            }
            sql.push(')');
        }
        sql.push_str(" ON ");
        sql.push_str(&join_with(&join.conditions, " AND ", |condition| {
            format!("{} = {}", condition.left_field, condition.right_field)
        }));
        sql
    }
}

impl Render for FromCompiler {
    type Node = FromClause;

    fn render(clause: &FromClause) -> String {
        let mut parts = vec![format!("FROM {}", Self::render_source(&clause.source))];
        if let Some(options) = &clause.source_options {
            parts.extend(Self::render_options(options));
        }
        parts.extend(clause.joins.iter().map(Self::render_join));
        parts.join(" ")
    }
}

impl SqlBuilder for FromCompiler {
    fn validate(clause: &FromClause) -> CompileResult<()> {
        Self::validate_source(clause)?;
        if let Some(options) = &clause.source_options {
            Self::validate_options(clause.source_type, options)?;
        }
        let context = match clause.source_type {
            DataSourceType::Stream => "Invalid stream join",
            DataSourceType::Table => "Invalid table join",
        };
        collect(
            Some(context),
            clause
                .joins
                .iter()
                .map(|join| Self::validate_join(clause.source_type, join)),
        )
    }
}

impl GroupByCompiler {
    /// Validate grouping parts shared by every GROUP BY shape.
    pub(crate) fn validate_parts(
        columns: &[GroupByColumn],
        having: Option<&HavingCondition>,
        partition_by: Option<&PartitionBy>,
        window: Option<&WindowBinding>,
    ) -> CompileResult<()> {
        ensure(!columns.is_empty(), || {
            "Group by columns are required".to_string()
        })?;
        collect(
            Some("Invalid group by column"),
            columns.iter().map(|column| {
                NonAggregateCompiler::validate(&column.expression)?;
                ensure_alias(&column.alias)
            }),
        )?;
        if let Some(having) = having {
            HavingCompiler::validate(having)?;
        }
        if let Some(partition_by) = partition_by {
            PartitionCompiler::validate(partition_by)?;
        }
        match window {
            Some(window) => within("Invalid group by window", WindowBindingCompiler::validate(window)),
            None => Ok(()),
        }
    }

    pub(crate) fn render_parts(
        columns: &[GroupByColumn],
        having: Option<&HavingCondition>,
        partition_by: Option<&PartitionBy>,
        window: Option<&WindowBinding>,
    ) -> String {
        let mut sql = format!(
            "GROUP BY {}",
            join_with(columns, ", ", |column| {
                let expression = NonAggregateCompiler::render(&column.expression);
                match &column.alias {
                    Some(alias) => format!("{} AS {}", expression, alias),
                    None => expression,
                }
            })
        );
        if let Some(having) = having {
            sql.push_str(&format!(" HAVING {}", HavingCompiler::render(having)));
        }
        if let Some(partition_by) = partition_by {
            sql.push(' ');
            sql.push_str(&PartitionCompiler::render(partition_by));
        }
        match window {
            Some(window) => format!("WINDOW {} {}", WindowBindingCompiler::render(window), sql),
            None => sql,
        }
    }
}

impl Render for GroupByCompiler {
    type Node = GroupBy;

    fn render(group_by: &GroupBy) -> String {
        Self::render_parts(
            group_by.columns(),
            group_by.having(),
            group_by.partition_by(),
            group_by.window(),
        )
    }
}

impl SqlBuilder for GroupByCompiler {
    fn validate(group_by: &GroupBy) -> CompileResult<()> {
        Self::validate_parts(
            group_by.columns(),
            group_by.having(),
            group_by.partition_by(),
            group_by.window(),
        )
    }
}
