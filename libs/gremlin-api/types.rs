//! Graph entity types
//!
//! Shapes follow the JSON a Cosmos-style server returns for `g.V()`,
//! `g.E()` and `.properties()`. Ids arrive as strings from Cosmos and as
//! numbers from TinkerGraph-like servers; both are kept as strings.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Kind of a complex graph element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Vertex,
    Edge,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Vertex => write!(f, "vertex"),
            EntityType::Edge => write!(f, "edge"),
        }
    }
}

/// A loosely typed scalar as found in query results
///
/// The `as_*` accessors never fail and fall back to the type's default;
/// the `try_as_*` accessors report values that cannot be cast. Numbers,
/// numeric strings, booleans and null are castable between each other.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedValue(pub Value);

impl TypedValue {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &Value {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    fn cast_error(&self, target: &'static str) -> ApiError {
        ApiError::Conversion {
            value: self.0.to_string(),
            target,
        }
    }

    pub fn try_as_f64(&self) -> Result<f64> {
        match &self.0 {
            Value::Null => Ok(0.0),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64().ok_or_else(|| self.cast_error("f64")),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| self.cast_error("f64")),
            _ => Err(self.cast_error("f64")),
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.try_as_f64().unwrap_or_default()
    }

    /// Floats are truncated, out of range values are rejected
    pub fn try_as_i32(&self) -> Result<i32> {
        match &self.0 {
            Value::Null => Ok(0),
            Value::Bool(b) => Ok(i32::from(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).map_err(|_| self.cast_error("i32"))
                } else {
                    let f = n.as_f64().ok_or_else(|| self.cast_error("i32"))?.trunc();
                    if f >= i32::MIN as f64 && f <= i32::MAX as f64 {
                        Ok(f as i32)
                    } else {
                        Err(self.cast_error("i32"))
                    }
                }
            }
            Value::String(s) => trim_zero_decimal(s.trim())
                .parse::<i32>()
                .map_err(|_| self.cast_error("i32")),
            _ => Err(self.cast_error("i32")),
        }
    }

    pub fn as_i32(&self) -> i32 {
        self.try_as_i32().unwrap_or_default()
    }

    pub fn try_as_bool(&self) -> Result<bool> {
        match &self.0 {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
            Value::String(s) => match s.trim() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
                "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
                _ => Err(self.cast_error("bool")),
            },
            _ => Err(self.cast_error("bool")),
        }
    }

    pub fn as_bool(&self) -> bool {
        self.try_as_bool().unwrap_or_default()
    }

    pub fn try_as_string(&self) -> Result<String> {
        match &self.0 {
            Value::Null => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.cast_error("string")),
        }
    }

    pub fn as_string(&self) -> String {
        self.try_as_string().unwrap_or_default()
    }
}

impl From<Value> for TypedValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// "12.000" -> "12", "12.5" stays
fn trim_zero_decimal(s: &str) -> &str {
    match s.split_once('.') {
        Some((int, frac)) if !int.is_empty() && frac.chars().all(|c| c == '0') => int,
        _ => s,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// A property as returned by `.properties()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub value: TypedValue,
    pub label: String,
}

/// A value attached to a vertex property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueWithId {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub value: TypedValue,
}

/// Property name to its values; a property may hold several
pub type VertexPropertyMap = HashMap<String, Vec<ValueWithId>>;

/// A vertex as returned by `g.V()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub properties: VertexPropertyMap,
}

impl Vertex {
    /// First value of the named property
    pub fn property(&self, name: &str) -> Option<&TypedValue> {
        self.properties
            .get(name)
            .and_then(|values| values.first())
            .map(|v| &v.value)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (props {:?}) - type {}",
            self.id, self.label, self.properties, self.entity_type
        )
    }
}

/// An edge as returned by `g.E()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub in_v_label: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub in_v: String,
    pub out_v_label: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub out_v: String,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})-{}->{} ({}) - type {}",
            self.in_v_label, self.in_v, self.label, self.out_v_label, self.out_v, self.entity_type
        )
    }
}

fn as_list<'a>(data: &'a Value, expected: &'static str) -> Result<&'a Vec<Value>> {
    match data {
        Value::Null => Err(ApiError::MissingData),
        Value::Array(items) => Ok(items),
        other => Err(ApiError::UnexpectedShape {
            expected,
            got: other.to_string(),
        }),
    }
}

/// Wrap every element of a result list
///
/// Fails on null data; an empty list yields an empty result.
pub fn to_values(data: &Value) -> Result<Vec<TypedValue>> {
    Ok(as_list(data, "list of values")?
        .iter()
        .cloned()
        .map(TypedValue)
        .collect())
}

pub fn to_vertices(data: &Value) -> Result<Vec<Vertex>> {
    as_list(data, "list of vertices")?
        .iter()
        .map(|item| Ok(Vertex::deserialize(item)?))
        .collect()
}

pub fn to_edges(data: &Value) -> Result<Vec<Edge>> {
    as_list(data, "list of edges")?
        .iter()
        .map(|item| Ok(Edge::deserialize(item)?))
        .collect()
}

pub fn to_properties(data: &Value) -> Result<Vec<Property>> {
    as_list(data, "list of properties")?
        .iter()
        .map(|item| Ok(Property::deserialize(item)?))
        .collect()
}
