//! Helpers shared by the compilers.

use crate::ksql::sql::ast::WindowDuration;
use crate::ksql::sql::error::{CompileError, CompileResult};
use regex::Regex;

lazy_static::lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern");
    static ref QUALIFIED_IDENTIFIER: Regex =
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
            .expect("qualified identifier pattern");
    static ref DESCRIBE_NAME: Regex =
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)*$")
            .expect("describe name pattern");
    static ref QUERY_ID: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("query id pattern");
    static ref PROPERTY_NAME: Regex =
        Regex::new(r"^[a-zA-Z0-9._-]+$").expect("property name pattern");
}

pub(crate) fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub(crate) fn is_qualified_identifier(name: &str) -> bool {
    QUALIFIED_IDENTIFIER.is_match(name)
}

pub(crate) fn is_describe_name(name: &str) -> bool {
    DESCRIBE_NAME.is_match(name)
}

pub(crate) fn is_query_id(id: &str) -> bool {
    QUERY_ID.is_match(id)
}

pub(crate) fn is_property_name(name: &str) -> bool {
    PROPERTY_NAME.is_match(name)
}

pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> CompileResult<()> {
    if condition {
        Ok(())
    } else {
        Err(CompileError::semantic(message()))
    }
}

/// Run every check and merge the failures into one error.
pub(crate) fn collect<I>(context: Option<&str>, results: I) -> CompileResult<()>
where
    I: IntoIterator<Item = CompileResult<()>>,
{
    let errors: Vec<CompileError> = results.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CompileError::aggregate(context, errors))
    }
}

/// Prefix a single child failure with the parent's context.
pub(crate) fn within(context: &str, result: CompileResult<()>) -> CompileResult<()> {
    result.map_err(|error| CompileError::aggregate(Some(context), vec![error]))
}

pub(crate) fn join_with<T>(items: &[T], separator: &str, render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(separator)
}

/// Single-quote a value, doubling embedded quotes.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn check_duration(duration: &WindowDuration) -> CompileResult<()> {
    ensure(duration.value > 0, || {
        format!("Invalid window duration: {} {}", duration.value, duration.unit)
    })
}

pub(crate) fn render_duration(duration: &WindowDuration) -> String {
    format!("{} {}", duration.value, duration.unit)
}
