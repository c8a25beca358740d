//! Top-level statements.

use super::expression::LiteralValue;
use super::keywords::{DataSourceType, PropertyAction, SerializationFormat, ShowType};
use super::query::{RawSelectBody, SelectQuery};
use super::types::CastItem;
use serde::Deserialize;

/// Any compilable ksqlDB statement
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawStatement")]
pub enum KsqlStatement {
    Select(SelectQuery),
    Insert(InsertQuery),
    Create(CreateStatement),
    Drop(DropStatement),
    Terminate(TerminateQuery),
    Property(PropertyStatement),
    List(ListStatement),
    Show(ShowStatement),
    Describe(DescribeQuery),
    Explain(ExplainQuery),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertQuery {
    pub statement: InsertStatement,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsertStatement {
    Values(InsertValues),
    Select(InsertSelect),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertTarget {
    pub name: String,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertValues {
    pub target: InsertTarget,
    pub data: Vec<InsertValue>,
    #[serde(default)]
    pub schema: Option<InsertSchema>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertSelect {
    pub target: InsertTarget,
    pub data: SelectQuery,
    #[serde(default)]
    pub schema: Option<InsertSchema>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertValue {
    pub column: String,
    pub value: LiteralExpression,
}

/// A literal operand in `VALUES (...)`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiteralExpression {
    pub value: LiteralValue,
}

/// Column types expected by an INSERT; checked, never rendered
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertSchema {
    pub fields: Vec<InsertSchemaField>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertSchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CastItem,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatement {
    pub source_type: DataSourceType,
    pub source_name: String,
    #[serde(default)]
    pub if_not_exists: bool,
    #[serde(flatten)]
    pub body: CreateBody,
    pub options: CreateOptions,
}

/// What a new source is built from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "createType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateBody {
    /// Declared columns over an existing topic
    Source { schema: Vec<SchemaField> },
    /// A persistent query
    AsSelect { select: Box<SelectQuery> },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CastItem,
    #[serde(default)]
    pub key: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    pub format: FormatConfig,
    #[serde(default)]
    pub kafka_topic: Option<String>,
    #[serde(default)]
    pub partitions: Option<i64>,
    #[serde(default)]
    pub replicas: Option<i64>,
    #[serde(default)]
    pub timestamp_column: Option<TimestampColumn>,
    /// TABLE only
    #[serde(default)]
    pub state_store_name: Option<String>,
    /// TABLE only
    #[serde(default)]
    pub caching: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatConfig {
    #[serde(default)]
    pub key_format: Option<SerializationFormat>,
    pub value_format: SerializationFormat,
    #[serde(default)]
    pub schema_registry_url: Option<String>,
    #[serde(default)]
    pub wrap_single_value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimestampColumn {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropStatement {
    pub source_type: DataSourceType,
    pub source_name: String,
    #[serde(default)]
    pub options: DropOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOptions {
    #[serde(default)]
    pub if_exists: bool,
    #[serde(default)]
    pub delete_topic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateQuery {
    pub query_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertyStatement {
    pub action: PropertyAction,
    pub property: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStatement {
    pub source_type: DataSourceType,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowStatement {
    pub show_type: ShowType,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescribeQuery {
    pub target: DescribeTarget,
    #[serde(default)]
    pub extended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescribeTarget {
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplainQuery {
    pub statement: ExplainTarget,
    #[serde(default)]
    pub analyze: bool,
}

/// Statements EXPLAIN can wrap
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawExplainTarget")]
pub enum ExplainTarget {
    Select(Box<SelectQuery>),
    Create(Box<CreateStatement>),
}

impl KsqlStatement {
    /// Wire discriminant of this statement
    pub fn type_name(&self) -> &'static str {
        match self {
            KsqlStatement::Select(SelectQuery::Star(_)) => "STAR",
            KsqlStatement::Select(_) => "COLUMN",
            KsqlStatement::Insert(_) => "INSERT",
            KsqlStatement::Create(_) => "CREATE",
            KsqlStatement::Drop(_) => "DROP",
            KsqlStatement::Terminate(_) => "TERMINATE",
            KsqlStatement::Property(_) => "PROPERTY",
            KsqlStatement::List(_) => "LIST",
            KsqlStatement::Show(_) => "SHOW",
            KsqlStatement::Describe(_) => "DESCRIBE",
            KsqlStatement::Explain(_) => "EXPLAIN",
        }
    }
}

impl InsertTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: None,
        }
    }
}

impl InsertValue {
    pub fn new(column: impl Into<String>, value: impl Into<LiteralValue>) -> Self {
        Self {
            column: column.into(),
            value: LiteralExpression {
                value: value.into(),
            },
        }
    }
}

impl CreateOptions {
    pub fn new(value_format: SerializationFormat) -> Self {
        Self {
            format: FormatConfig {
                key_format: None,
                value_format,
                schema_registry_url: None,
                wrap_single_value: None,
            },
            kafka_topic: None,
            partitions: None,
            replicas: None,
            timestamp_column: None,
            state_store_name: None,
            caching: None,
        }
    }
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: impl Into<CastItem>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            key: false,
        }
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }
}

impl TerminateQuery {
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum RawStatement {
    Star(RawSelectBody),
    Column(RawSelectBody),
    Insert(InsertQuery),
    Create(CreateStatement),
    Drop(DropStatement),
    Terminate(TerminateQuery),
    Property(PropertyStatement),
    List(ListStatement),
    Show(ShowStatement),
    Describe(DescribeQuery),
    Explain(ExplainQuery),
}

impl TryFrom<RawStatement> for KsqlStatement {
    type Error = String;

    fn try_from(raw: RawStatement) -> Result<Self, Self::Error> {
        let statement = match raw {
            RawStatement::Star(body) => KsqlStatement::Select(body.into_star()),
            RawStatement::Column(body) => KsqlStatement::Select(body.into_columns()?),
            RawStatement::Insert(insert) => KsqlStatement::Insert(insert),
            RawStatement::Create(create) => KsqlStatement::Create(create),
            RawStatement::Drop(drop) => KsqlStatement::Drop(drop),
            RawStatement::Terminate(terminate) => KsqlStatement::Terminate(terminate),
            RawStatement::Property(property) => KsqlStatement::Property(property),
            RawStatement::List(list) => KsqlStatement::List(list),
            RawStatement::Show(show) => KsqlStatement::Show(show),
            RawStatement::Describe(describe) => KsqlStatement::Describe(describe),
            RawStatement::Explain(explain) => KsqlStatement::Explain(explain),
        };
        Ok(statement)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum RawExplainTarget {
    Star(RawSelectBody),
    Column(RawSelectBody),
    Create(CreateStatement),
}

impl TryFrom<RawExplainTarget> for ExplainTarget {
    type Error = String;

    fn try_from(raw: RawExplainTarget) -> Result<Self, Self::Error> {
        match raw {
            RawExplainTarget::Star(body) => Ok(ExplainTarget::Select(Box::new(body.into_star()))),
            RawExplainTarget::Column(body) => {
                Ok(ExplainTarget::Select(Box::new(body.into_columns()?)))
            }
            RawExplainTarget::Create(create) => Ok(ExplainTarget::Create(Box::new(create))),
        }
    }
}
