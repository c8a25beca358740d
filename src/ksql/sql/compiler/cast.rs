//! Cast and column type compiler.

use super::common::{collect, ensure, is_identifier, join_with, within};
use super::sealed::Render;
use super::SqlBuilder;
use crate::ksql::sql::ast::{CastItem, StructField};
use crate::ksql::sql::error::{CompileError, CompileResult};

/// Compiles scalar and composite type declarations
pub struct CastCompiler;

impl CastCompiler {
    fn validate_field(field: &StructField) -> CompileResult<()> {
        ensure(is_identifier(&field.name), || {
            format!("Invalid struct field name: '{}'", field.name)
        })?;
        Self::validate(&field.field_type)
    }
}

impl Render for CastCompiler {
    type Node = CastItem;

    fn render(item: &CastItem) -> String {
        match item {
            CastItem::Scalar(data_type) => data_type.to_string(),
            CastItem::Array(element) => format!("ARRAY<{}>", Self::render(element)),
            CastItem::Map(value) => format!("MAP<STRING, {}>", Self::render(value)),
            CastItem::Struct(fields) => format!(
                "STRUCT<{}>",
                join_with(fields, ", ", |field| format!(
                    "{} {}",
                    field.name,
                    Self::render(&field.field_type)
                ))
            ),
        }
    }
}

impl SqlBuilder for CastCompiler {
    fn validate(item: &CastItem) -> CompileResult<()> {
        match item {
            CastItem::Scalar(_) => Ok(()),
            CastItem::Array(element) => within("Invalid array type", Self::validate(element)),
            CastItem::Map(value) => within("Invalid map type", Self::validate(value)),
            CastItem::Struct(fields) => {
                if fields.is_empty() {
                    return Err(CompileError::semantic("Struct must have at least one field"));
                }
                collect(
                    Some("Invalid struct type"),
                    fields.iter().map(Self::validate_field),
                )
            }
        }
    }
}
