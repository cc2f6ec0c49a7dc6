//! Resolved view of a BYAML document.
//!
//! [`Value`] inlines names, strings and path points, so two documents can be
//! compared without regard to how their pools are ordered.

use crate::node::Node;
use crate::path::{decode_points, PathPoint};
use crate::{Byaml, Result};

/// A BYAML value with all pool references resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Path(Vec<PathPoint>),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Copy of this value with object entries sorted by name, recursively.
    ///
    /// Entry order is not preserved by every conversion (the binary writer
    /// sorts by name, XML puts attributes after elements), so structural
    /// comparisons go through this form.
    pub fn normalized(&self) -> Value {
        match self {
            Value::Array(items) => Value::Array(items.iter().map(Value::normalized).collect()),
            Value::Object(entries) => {
                let mut entries: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.normalized()))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Value::Object(entries)
            }
            other => other.clone(),
        }
    }

    /// Look up an object entry by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl Byaml {
    /// Resolve the whole tree.
    pub fn to_value(&self) -> Result<Value> {
        self.resolve(&self.root)
    }

    /// Resolve one node of this document.
    pub fn resolve(&self, node: &Node) -> Result<Value> {
        Ok(match node {
            Node::StringRef(i) => Value::String(self.string(*i)?.to_string()),
            Node::PathData(i) => Value::Path(decode_points(self.path(*i)?, self.endian)?),
            Node::Bool(v) => Value::Bool(*v),
            Node::Int32(v) => Value::Int(*v),
            Node::Float32(v) => Value::Float(*v),
            Node::Null => Value::Null,
            Node::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve(item))
                    .collect::<Result<_>>()?,
            ),
            Node::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(name, child)| -> Result<(String, Value)> {
                        Ok((self.name(*name)?.to_string(), self.resolve(child)?))
                    })
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Convert to pretty-printed JSON.
    #[cfg(feature = "json")]
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

#[cfg(feature = "json")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::Path(points) => serde::Serialize::serialize(points, serializer),
            Value::Array(items) => serde::Serialize::serialize(items, serializer),
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
