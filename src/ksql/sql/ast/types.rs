//! Cast and column type declarations.

use super::keywords::DataType;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A type usable in `CAST`, schema columns and composite type parameters.
///
/// On the wire a scalar is a bare token (`"INTEGER"`) and a composite type is an object
/// tagged `ARRAY`, `MAP` or `STRUCT`.
#[derive(Debug, Clone, PartialEq)]
pub enum CastItem {
    Scalar(DataType),
    /// `ARRAY<element>`
    Array(Box<CastItem>),
    /// `MAP<STRING, value>`; the key type is fixed by the engine
    Map(Box<CastItem>),
    /// `STRUCT<name type, ...>`
    Struct(Vec<StructField>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StructField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CastItem,
}

impl CastItem {
    pub fn array(element: CastItem) -> Self {
        CastItem::Array(Box::new(element))
    }

    pub fn map(value: CastItem) -> Self {
        CastItem::Map(Box::new(value))
    }
}

impl StructField {
    pub fn new(name: impl Into<String>, field_type: CastItem) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl From<DataType> for CastItem {
    fn from(data_type: DataType) -> Self {
        CastItem::Scalar(data_type)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum CompositeRepr {
    Array {
        #[serde(rename = "elementType")]
        element_type: CastItem,
    },
    Map {
        #[serde(rename = "valueType")]
        value_type: CastItem,
    },
    Struct {
        #[serde(default)]
        fields: Vec<StructField>,
    },
}

impl From<CompositeRepr> for CastItem {
    fn from(repr: CompositeRepr) -> Self {
        match repr {
            CompositeRepr::Array { element_type } => CastItem::array(element_type),
            CompositeRepr::Map { value_type } => CastItem::map(value_type),
            CompositeRepr::Struct { fields } => CastItem::Struct(fields),
        }
    }
}

impl<'de> Deserialize<'de> for CastItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CastItemVisitor;

        impl<'de> Visitor<'de> for CastItemVisitor {
            type Value = CastItem;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a scalar type name or an ARRAY, MAP or STRUCT type object")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<CastItem, E> {
                value
                    .parse::<DataType>()
                    .map(CastItem::Scalar)
                    .map_err(E::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<CastItem, A::Error> {
                CompositeRepr::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(CastItem::from)
            }
        }

        deserializer.deserialize_any(CastItemVisitor)
    }
}
