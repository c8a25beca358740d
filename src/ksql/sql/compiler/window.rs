//! Window spec and window reference compilers.

use super::common::{check_duration, collect, ensure, join_with, render_duration};
use super::sealed::Render;
use super::SqlBuilder;
use crate::ksql::sql::ast::{
    HoppingWindow, SessionWindow, TumblingWindow, WindowBinding, WindowDuration, WindowReference,
    WindowSpec,
};
use crate::ksql::sql::error::{CompileError, CompileResult};

/// Compiles `TUMBLING`, `HOPPING` and `SESSION` window specs
pub struct WindowCompiler;

/// Compiles `name[ WITH (WINDOWSTART, ...)]`
pub struct WindowReferenceCompiler;

/// Compiles either an inline window spec or a window reference
pub struct WindowBindingCompiler;

fn optional_duration(duration: &Option<WindowDuration>) -> CompileResult<()> {
    duration.as_ref().map_or(Ok(()), check_duration)
}

fn retention_and_grace(retention: &Option<WindowDuration>, grace: &Option<WindowDuration>) -> String {
    let mut sql = String::new();
    if let Some(retention) = retention {
        sql.push_str(&format!(", RETENTION {}", render_duration(retention)));
    }
    if let Some(grace) = grace {
        sql.push_str(&format!(", GRACE PERIOD {}", render_duration(grace)));
    }
    sql
}

impl WindowCompiler {
    fn validate_tumbling(window: &TumblingWindow) -> CompileResult<()> {
        collect(
            Some("Invalid tumbling window"),
            [
                check_duration(&window.size),
                optional_duration(&window.retention),
                optional_duration(&window.grace_period),
            ],
        )
    }

    fn validate_hopping(window: &HoppingWindow) -> CompileResult<()> {
        collect(
            Some("Invalid hopping window"),
            [
                check_duration(&window.size),
                check_duration(&window.advance),
                optional_duration(&window.retention),
                optional_duration(&window.grace_period),
            ],
        )
    }

    fn validate_session(window: &SessionWindow) -> CompileResult<()> {
        if window.retention.is_some() || window.grace_period.is_some() {
            return Err(CompileError::semantic(
                "Session windows do not support retention or grace periods, only inactivity gap",
            ));
        }
        check_duration(&window.inactivity_gap)
    }

    fn render_session(window: &SessionWindow) -> String {
        let mut sql = format!("SESSION ({}", render_duration(&window.inactivity_gap));
        if let Some(config) = &window.session_config {
            let mut flags = Vec::new();
            if let Some(include_start) = config.include_start {
                flags.push(format!("INCLUDE_START := {}", include_start));
            }
            if let Some(include_end) = config.include_end {
                flags.push(format!("INCLUDE_END := {}", include_end));
            }
            if !flags.is_empty() {
                sql.push_str(&format!(", CONFIG({})", flags.join(", ")));
            }
        }
        sql.push(')');
        sql
    }
}

impl Render for WindowCompiler {
    type Node = WindowSpec;

    fn render(window: &WindowSpec) -> String {
        match window {
            WindowSpec::Tumbling(window) => format!(
                "TUMBLING (SIZE {}{})",
                render_duration(&window.size),
                retention_and_grace(&window.retention, &window.grace_period)
            ),
            WindowSpec::Hopping(window) => format!(
                "HOPPING (SIZE {}, ADVANCE BY {}{})",
                render_duration(&window.size),
                render_duration(&window.advance),
                retention_and_grace(&window.retention, &window.grace_period)
            ),
            WindowSpec::Session(window) => Self::render_session(window),
        }
    }
}

impl SqlBuilder for WindowCompiler {
    fn validate(window: &WindowSpec) -> CompileResult<()> {
        match window {
            WindowSpec::Tumbling(window) => Self::validate_tumbling(window),
            WindowSpec::Hopping(window) => Self::validate_hopping(window),
            WindowSpec::Session(window) => Self::validate_session(window),
        }
    }
}

impl Render for WindowReferenceCompiler {
    type Node = WindowReference;

    fn render(reference: &WindowReference) -> String {
        match &reference.boundaries {
            Some(boundaries) => format!(
                "{} WITH ({})",
                reference.name,
                join_with(boundaries, ", ", ToString::to_string)
            ),
            None => reference.name.clone(),
        }
    }
}

impl SqlBuilder for WindowReferenceCompiler {
    fn validate(reference: &WindowReference) -> CompileResult<()> {
        ensure(!reference.name.trim().is_empty(), || {
            "Window reference name is required".to_string()
        })?;
        match &reference.boundaries {
            Some(boundaries) => ensure(!boundaries.is_empty(), || {
                "Window boundaries are required".to_string()
            }),
            None => Ok(()),
        }
    }
}

impl Render for WindowBindingCompiler {
    type Node = WindowBinding;

    fn render(binding: &WindowBinding) -> String {
        match binding {
            WindowBinding::Definition(definition) => WindowCompiler::render(&definition.spec),
            WindowBinding::Reference(reference) => WindowReferenceCompiler::render(reference),
        }
    }
}

impl SqlBuilder for WindowBindingCompiler {
    fn validate(binding: &WindowBinding) -> CompileResult<()> {
        match binding {
            WindowBinding::Definition(definition) => {
                WindowCompiler::validate(&definition.spec)?;
                match &definition.boundaries {
                    Some(boundaries) => ensure(!boundaries.is_empty(), || {
                        "Window boundaries are required".to_string()
                    }),
                    None => Ok(()),
                }
            }
            WindowBinding::Reference(reference) => WindowReferenceCompiler::validate(reference),
        }
    }
}
