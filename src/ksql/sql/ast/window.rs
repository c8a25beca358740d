//! Window specifications and references.

use super::keywords::{WindowBoundary, WindowTimeUnit};
use serde::Deserialize;

/// A length of time such as `5 MINUTES`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WindowDuration {
    pub value: i64,
    pub unit: WindowTimeUnit,
}

impl WindowDuration {
    pub fn new(value: i64, unit: WindowTimeUnit) -> Self {
        Self { value, unit }
    }
}

/// Windowing strategy attached to an aggregation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowSpec {
    /// Fixed-size, non-overlapping windows
    Tumbling(TumblingWindow),
    /// Fixed-size windows advancing by a smaller step
    Hopping(HoppingWindow),
    /// Windows closed by a period of inactivity
    Session(SessionWindow),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TumblingWindow {
    pub size: WindowDuration,
    #[serde(default)]
    pub retention: Option<WindowDuration>,
    #[serde(default)]
    pub grace_period: Option<WindowDuration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoppingWindow {
    pub size: WindowDuration,
    pub advance: WindowDuration,
    #[serde(default)]
    pub retention: Option<WindowDuration>,
    #[serde(default)]
    pub grace_period: Option<WindowDuration>,
}

/// Session windows carry retention and grace fields only so that supplying them can be
/// reported; they never render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWindow {
    pub inactivity_gap: WindowDuration,
    #[serde(default)]
    pub session_config: Option<SessionConfig>,
    #[serde(default)]
    pub retention: Option<WindowDuration>,
    #[serde(default)]
    pub grace_period: Option<WindowDuration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default)]
    pub include_start: Option<bool>,
    #[serde(default)]
    pub include_end: Option<bool>,
}

/// A named window declared elsewhere, optionally exposing its boundaries
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowReference {
    pub name: String,
    #[serde(default)]
    pub boundaries: Option<Vec<WindowBoundary>>,
}

/// An inline window spec, optionally exposing its boundaries
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowDefinition {
    pub spec: WindowSpec,
    #[serde(default)]
    pub boundaries: Option<Vec<WindowBoundary>>,
}

/// Window attached to an aggregate call or a windowed GROUP BY
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WindowBinding {
    Definition(WindowDefinition),
    Reference(WindowReference),
}

impl TumblingWindow {
    pub fn new(size: WindowDuration) -> Self {
        Self {
            size,
            retention: None,
            grace_period: None,
        }
    }
}

impl HoppingWindow {
    pub fn new(size: WindowDuration, advance: WindowDuration) -> Self {
        Self {
            size,
            advance,
            retention: None,
            grace_period: None,
        }
    }
}

impl SessionWindow {
    pub fn new(inactivity_gap: WindowDuration) -> Self {
        Self {
            inactivity_gap,
            session_config: None,
            retention: None,
            grace_period: None,
        }
    }
}

impl WindowReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            boundaries: None,
        }
    }

    pub fn with_boundaries(mut self, boundaries: Vec<WindowBoundary>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }
}

impl WindowBinding {
    pub fn boundaries(&self) -> Option<&[WindowBoundary]> {
        match self {
            WindowBinding::Definition(definition) => definition.boundaries.as_deref(),
            WindowBinding::Reference(reference) => reference.boundaries.as_deref(),
        }
    }
}

impl From<WindowSpec> for WindowBinding {
    fn from(spec: WindowSpec) -> Self {
        WindowBinding::Definition(WindowDefinition {
            spec,
            boundaries: None,
        })
    }
}

impl From<WindowReference> for WindowBinding {
    fn from(reference: WindowReference) -> Self {
        WindowBinding::Reference(reference)
    }
}
