//! DDL, DML and administrative statement compilers.

use super::cast::CastCompiler;
use super::common::{
    collect, ensure, is_describe_name, is_identifier, is_property_name, is_qualified_identifier,
    is_query_id, join_with, quote, within,
};
use super::expression::ExpressionCompiler;
use super::sealed::Render;
use super::select::SelectCompiler;
use super::SqlBuilder;
use crate::ksql::sql::ast::{
    CreateBody, CreateOptions, CreateStatement, DataSourceType, DescribeQuery, DropStatement,
    ExplainQuery, ExplainTarget, InsertQuery, InsertSchema, InsertStatement, InsertTarget,
    InsertValue, InsertValues, ListStatement, LiteralValue, PropertyAction, PropertyStatement,
    SchemaField, ShowStatement, TerminateQuery,
};
use crate::ksql::sql::error::{CompileError, CompileResult};
use std::collections::HashSet;

/// Compiles `INSERT INTO ... VALUES` and `INSERT INTO ... SELECT`
pub struct InsertCompiler;

/// Compiles `CREATE STREAM|TABLE`
pub struct CreateCompiler;

/// Compiles `DROP STREAM|TABLE`
pub struct DropCompiler;

/// Compiles `TERMINATE query_id`
pub struct TerminateCompiler;

/// Compiles `SET 'prop'='value'` and `SHOW prop`
pub struct PropertyCompiler;

/// Compiles `LIST STREAMS|TABLES`
pub struct ListCompiler;

/// Compiles `SHOW QUERIES|PROPERTIES|TOPICS|VARIABLES`
pub struct ShowCompiler;

/// Compiles `DESCRIBE name`
pub struct DescribeCompiler;

/// Compiles `EXPLAIN [ANALYZE] statement`
pub struct ExplainCompiler;

fn extended(flag: bool) -> &'static str {
    if flag {
        " EXTENDED"
    } else {
        ""
    }
}

fn ensure_source_name(name: &str) -> CompileResult<()> {
    ensure(is_identifier(name), || format!("Invalid source name: '{}'", name))
}

// INSERT

impl InsertCompiler {
    fn validate_target(target: &InsertTarget) -> CompileResult<()> {
        ensure(is_identifier(&target.name), || {
            format!("Invalid target name: '{}'", target.name)
        })?;
        match &target.columns {
            Some(columns) => {
                ensure(!columns.is_empty(), || "Target columns are required".to_string())?;
                collect(
                    Some("Invalid target columns"),
                    columns.iter().map(|column| {
                        ensure(is_identifier(column), || format!("'{}'", column))
                    }),
                )
            }
            None => Ok(()),
        }
    }

    fn validate_schema(schema: &InsertSchema) -> CompileResult<()> {
        collect(
            Some("Invalid schema"),
            schema.fields.iter().map(|field| {
                ensure(is_identifier(&field.name), || {
                    format!("Invalid schema field: '{}'", field.name)
                })?;
                CastCompiler::validate(&field.field_type)
            }),
        )
    }

    fn validate_values(insert: &InsertValues) -> CompileResult<()> {
        ensure(!insert.data.is_empty(), || "No values to insert".to_string())?;
        collect(
            Some("Invalid values"),
            insert.data.iter().map(|value| {
                ensure(is_identifier(&value.column), || {
                    format!("Invalid column: '{}'", value.column)
                })?;
                ExpressionCompiler::validate_literal(&value.value.value)
            }),
        )?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = insert.data.iter().find(|value| !seen.insert(&value.column)) {
            return Err(CompileError::semantic(format!(
                "Duplicate insert column: {}",
                duplicate.column
            )));
        }

        match &insert.target.columns {
            Some(columns) => ensure(
                columns.iter().eq(insert.data.iter().map(|value| &value.column)),
                || {
                    format!(
                        "Target columns ({}) do not match inserted columns ({})",
                        columns.join(", "),
                        join_with(&insert.data, ", ", |value| value.column.clone())
                    )
                },
            ),
            None => Ok(()),
        }
    }

    fn render_value(value: &InsertValue) -> String {
        match &value.value.value {
            LiteralValue::String(text) => quote(text),
            other => ExpressionCompiler::render_literal(other),
        }
    }

    fn render_target_columns(target: &InsertTarget) -> String {
        match &target.columns {
            Some(columns) if !columns.is_empty() => format!(" ({})", columns.join(", ")),
            _ => String::new(),
        }
    }
}

impl Render for InsertCompiler {
    type Node = InsertQuery;

    fn render(query: &InsertQuery) -> String {
        match &query.statement {
            InsertStatement::Values(insert) => format!(
                "INSERT INTO {} ({}) VALUES ({});",
                insert.target.name,
                join_with(&insert.data, ", ", |value| value.column.clone()),
                join_with(&insert.data, ", ", Self::render_value)
            ),
            InsertStatement::Select(insert) => format!(
                "INSERT INTO {}{} {};",
                insert.target.name,
                Self::render_target_columns(&insert.target),
                SelectCompiler::render_query(&insert.data)
            ),
        }
    }
}

impl SqlBuilder for InsertCompiler {
    fn validate(query: &InsertQuery) -> CompileResult<()> {
        let (target, schema) = match &query.statement {
            InsertStatement::Values(insert) => (&insert.target, &insert.schema),
            InsertStatement::Select(insert) => (&insert.target, &insert.schema),
        };
        Self::validate_target(target)?;
        if let Some(schema) = schema {
            Self::validate_schema(schema)?;
        }
        match &query.statement {
            InsertStatement::Values(insert) => Self::validate_values(insert),
            InsertStatement::Select(insert) => {
                within("Invalid insert select", SelectCompiler::validate(&insert.data))
            }
        }
    }
}

// CREATE

impl CreateCompiler {
    fn validate_schema(schema: &[SchemaField]) -> CompileResult<()> {
        ensure(!schema.is_empty(), || "Schema is required".to_string())?;
        collect(
            None,
            schema.iter().map(|field| {
                ensure(is_identifier(&field.name), || {
                    format!("Invalid schema field: '{}'", field.name)
                })?;
                within(
                    &format!("Invalid schema field: {}", field.name),
                    CastCompiler::validate(&field.field_type),
                )
            }),
        )
    }

    fn validate_options(source_type: DataSourceType, options: &CreateOptions) -> CompileResult<()> {
        let positive = |label: &str, value: Option<i64>| match value {
            Some(value) if value <= 0 => Err(CompileError::semantic(format!("Invalid {}: {}", label, value))),
            _ => Ok(()),
        };
        let table_only = |present: bool, option: &str| {
            ensure(source_type == DataSourceType::Table || !present, || {
                format!("{} is only supported for TABLE sources", option)
            })
        };
        let topic = match &options.kafka_topic {
            Some(topic) => ensure(!topic.trim().is_empty(), || "Kafka topic must not be empty".to_string()),
            None => Ok(()),
        };
        let timestamp = match &options.timestamp_column {
            Some(column) => ensure(!column.name.trim().is_empty(), || {
                "Timestamp column name is required".to_string()
            }),
            None => Ok(()),
        };
        collect(
            Some("Invalid options"),
            [
                topic,
                positive("partitions", options.partitions),
                positive("replicas", options.replicas),
                timestamp,
                table_only(options.state_store_name.is_some(), "STATE_STORE_NAME"),
                table_only(options.caching.is_some(), "CACHING"),
            ],
        )
    }

    fn render_field(source_type: DataSourceType, field: &SchemaField) -> String {
        let definition = format!("{} {}", field.name, CastCompiler::render(&field.field_type));
        match (field.key, source_type) {
            (false, _) => definition,
            (true, DataSourceType::Stream) => format!("{} KEY", definition),
            (true, DataSourceType::Table) => format!("{} PRIMARY KEY", definition),
        }
    }

    fn render_options(options: &CreateOptions) -> String {
        let format = &options.format;
        let mut parts = vec![format!("VALUE_FORMAT={}", quote(format.value_format.as_str()))];
        if let Some(key_format) = format.key_format {
            parts.push(format!("KEY_FORMAT={}", quote(key_format.as_str())));
        }
        if let Some(url) = &format.schema_registry_url {
            parts.push(format!("SCHEMA_REGISTRY_URL={}", quote(url)));
        }
        if let Some(wrap) = format.wrap_single_value {
            parts.push(format!("WRAP_SINGLE_VALUE={}", wrap));
        }
        if let Some(topic) = &options.kafka_topic {
            parts.push(format!("KAFKA_TOPIC={}", quote(topic)));
        }
        if let Some(partitions) = options.partitions {
            parts.push(format!("PARTITIONS={}", partitions));
        }
        if let Some(replicas) = options.replicas {
            parts.push(format!("REPLICAS={}", replicas));
        }
        if let Some(timestamp) = &options.timestamp_column {
            parts.push(format!("TIMESTAMP={}", quote(&timestamp.name)));
            if let Some(format) = &timestamp.format {
                parts.push(format!("TIMESTAMP_FORMAT={}", quote(format)));
            }
        }
        if let Some(store) = &options.state_store_name {
            parts.push(format!("STATE_STORE_NAME={}", quote(store)));
        }
        if let Some(caching) = options.caching {
            parts.push(format!("CACHING={}", caching));
        }
        format!("WITH ({})", parts.join(", "))
    }

    /// Render without the statement terminator, for embedding in EXPLAIN.
    pub(crate) fn render_statement(statement: &CreateStatement) -> String {
        let mut sql = String::from("CREATE");
        if statement.if_not_exists {
            sql.push_str(" IF NOT EXISTS");
        }
        sql.push_str(&format!(" {} {}", statement.source_type, statement.source_name));
        match &statement.body {
            CreateBody::Source { schema } => format!(
                "{} ({}) {}",
                sql,
                join_with(schema, ", ", |field| Self::render_field(statement.source_type, field)),
                Self::render_options(&statement.options)
            ),
            CreateBody::AsSelect { select } => format!(
                "{} {} AS {}",
                sql,
                Self::render_options(&statement.options),
                SelectCompiler::render_query(select)
            ),
        }
    }
}

impl Render for CreateCompiler {
    type Node = CreateStatement;

    fn render(statement: &CreateStatement) -> String {
        format!("{};", Self::render_statement(statement))
    }
}

impl SqlBuilder for CreateCompiler {
    fn validate(statement: &CreateStatement) -> CompileResult<()> {
        ensure_source_name(&statement.source_name)?;
        match &statement.body {
            CreateBody::Source { schema } => Self::validate_schema(schema)?,
            CreateBody::AsSelect { select } => {
                within("Invalid select statement", SelectCompiler::validate(select))?
            }
        }
        Self::validate_options(statement.source_type, &statement.options)
    }
}

// DROP / TERMINATE / PROPERTY

impl Render for DropCompiler {
    type Node = DropStatement;

    fn render(statement: &DropStatement) -> String {
        format!(
            "DROP {}{} {}{};",
            statement.source_type,
            if statement.options.if_exists { " IF EXISTS" } else { "" },
            statement.source_name,
            if statement.options.delete_topic { " DELETE TOPIC" } else { "" }
        )
    }
}

impl SqlBuilder for DropCompiler {
    fn validate(statement: &DropStatement) -> CompileResult<()> {
        ensure(is_qualified_identifier(&statement.source_name), || {
            format!("Invalid source name: '{}'", statement.source_name)
        })
    }
}

impl Render for TerminateCompiler {
    type Node = TerminateQuery;

    fn render(query: &TerminateQuery) -> String {
        format!("TERMINATE {};", query.query_id)
    }
}

impl SqlBuilder for TerminateCompiler {
    fn validate(query: &TerminateQuery) -> CompileResult<()> {
        ensure(is_query_id(&query.query_id), || "Invalid query ID".to_string())
    }
}

impl Render for PropertyCompiler {
    type Node = PropertyStatement;

    fn render(statement: &PropertyStatement) -> String {
        match (statement.action, &statement.value) {
            (PropertyAction::Set, Some(value)) => {
                format!("SET {}={};", quote(&statement.property), quote(value))
            }
            (PropertyAction::Set, None) | (PropertyAction::Show, _) => {
                format!("SHOW {};", statement.property)
            }
        }
    }
}

impl SqlBuilder for PropertyCompiler {
    fn validate(statement: &PropertyStatement) -> CompileResult<()> {
        ensure(is_property_name(&statement.property), || {
            format!("Invalid property name: '{}'", statement.property)
        })?;
        match (statement.action, &statement.value) {
            (PropertyAction::Set, Some(value)) if !value.is_empty() => Ok(()),
            (PropertyAction::Set, _) => Err(CompileError::semantic("SET action requires a value")),
            (PropertyAction::Show, None) => Ok(()),
            (PropertyAction::Show, Some(_)) => Err(CompileError::semantic(
                "SHOW action does not require a value",
            )),
        }
    }
}

// LIST / SHOW / DESCRIBE / EXPLAIN

impl Render for ListCompiler {
    type Node = ListStatement;

    fn render(statement: &ListStatement) -> String {
        format!(
            "LIST {}{};",
            statement.source_type.plural(),
            extended(statement.extended)
        )
    }
}

impl SqlBuilder for ListCompiler {
    fn validate(_: &ListStatement) -> CompileResult<()> {
        Ok(())
    }
}

impl Render for ShowCompiler {
    type Node = ShowStatement;

    fn render(statement: &ShowStatement) -> String {
        format!("SHOW {}{};", statement.show_type, extended(statement.extended))
    }
}

impl SqlBuilder for ShowCompiler {
    fn validate(_: &ShowStatement) -> CompileResult<()> {
        Ok(())
    }
}

impl Render for DescribeCompiler {
    type Node = DescribeQuery;

    fn render(query: &DescribeQuery) -> String {
        format!("DESCRIBE {}{};", query.target.name, extended(query.extended))
    }
}

impl SqlBuilder for DescribeCompiler {
    fn validate(query: &DescribeQuery) -> CompileResult<()> {
        ensure(is_describe_name(&query.target.name), || {
            format!("Invalid target name: '{}'", query.target.name)
        })
    }
}

impl Render for ExplainCompiler {
    type Node = ExplainQuery;

    fn render(query: &ExplainQuery) -> String {
        let inner = match &query.statement {
            ExplainTarget::Select(select) => SelectCompiler::render_query(select),
            ExplainTarget::Create(create) => CreateCompiler::render_statement(create),
        };
        let analyze = if query.analyze { "ANALYZE " } else { "" };
        format!("EXPLAIN {}{};", analyze, inner)
    }
}

impl SqlBuilder for ExplainCompiler {
    fn validate(query: &ExplainQuery) -> CompileResult<()> {
        match &query.statement {
            ExplainTarget::Select(select) => SelectCompiler::validate(select),
            ExplainTarget::Create(create) => match create.body {
                CreateBody::AsSelect { .. } => CreateCompiler::validate(create),
                CreateBody::Source { .. } => Err(CompileError::semantic(
                    "Only AS SELECT create statements are supported",
                )),
            },
        }
    }
}
