//! Recursive response-shape checking.
//!
//! An expected shape maps keys to either a type tag or a nested shape.
//! Checking walks the expected structure against an actual JSON value and
//! stops at the first key that is missing or carries the wrong type. Keys
//! present in the actual value but absent from the shape are ignored.
//!
//! Shapes can be written as JSON, which is convenient for fixtures:
//!
//! ```
//! use ramp_client::shape::Shape;
//! use serde_json::json;
//!
//! let shape = Shape::from_value(&json!({
//!     "id": "string",
//!     "context": { "acting_user_id": "?string" },
//! }))
//! .unwrap();
//!
//! assert!(shape
//!     .validate(&json!({ "id": "t-1", "context": { "acting_user_id": null } }))
//!     .is_ok());
//! ```

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Runtime type expected at a leaf of a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    /// Any container: a JSON array or a JSON object.
    Array,
    Object,
    Bool,
    Number,
    Integer,
    Null,
}

impl TypeTag {
    /// Whether `value` has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Array => value.is_array() || value.is_object(),
            Self::Object => value.is_object(),
            Self::Bool => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Null => value.is_null(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "bool" | "boolean" => Ok(Self::Bool),
            "number" | "float" => Ok(Self::Number),
            "integer" | "int" => Ok(Self::Integer),
            "null" => Ok(Self::Null),
            other => Err(ShapeError::UnknownTag(other.to_string())),
        }
    }
}

/// Errors building a [`Shape`] from its JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("unknown type tag '{0}'")]
    UnknownTag(String),

    #[error("expected a type tag string or a nested object at '{path}', found {found}")]
    InvalidNode { path: String, found: &'static str },
}

/// An expected response structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A leaf value of the given type; `nullable` also admits JSON null.
    Tag { tag: TypeTag, nullable: bool },
    /// A nested mapping whose listed keys must all be present.
    Object(BTreeMap<String, Shape>),
}

impl Shape {
    #[must_use]
    pub fn tag(tag: TypeTag) -> Self {
        Self::Tag {
            tag,
            nullable: false,
        }
    }

    #[must_use]
    pub fn nullable(tag: TypeTag) -> Self {
        Self::Tag {
            tag,
            nullable: true,
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::tag(TypeTag::String)
    }

    /// Build a nested shape from `(key, shape)` pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Shape)>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parse the JSON form of an expected structure.
    ///
    /// Strings are type tags (optionally prefixed with `?` for nullable),
    /// objects are nested shapes. Any other JSON node, or an unrecognised tag,
    /// is an error.
    pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
        Self::parse_node(value, &mut Vec::new())
    }

    fn parse_node(value: &Value, path: &mut Vec<String>) -> Result<Self, ShapeError> {
        match value {
            Value::String(s) => {
                let (nullable, name) = match s.strip_prefix('?') {
                    Some(rest) => (true, rest),
                    None => (false, s.as_str()),
                };
                Ok(Self::Tag {
                    tag: name.parse()?,
                    nullable,
                })
            }
            Value::Object(map) => {
                let mut fields = BTreeMap::new();
                for (key, child) in map {
                    path.push(key.clone());
                    let parsed = Self::parse_node(child, path);
                    path.pop();
                    fields.insert(key.clone(), parsed?);
                }
                Ok(Self::Object(fields))
            }
            other => Err(ShapeError::InvalidNode {
                path: render_path(path),
                found: json_type_name(other),
            }),
        }
    }

    /// Check `actual` against this shape, failing on the first mismatch.
    pub fn validate(&self, actual: &Value) -> Result<(), ShapeMismatch> {
        self.validate_at(actual, &mut Vec::new())
    }

    fn validate_at(&self, actual: &Value, path: &mut Vec<String>) -> Result<(), ShapeMismatch> {
        match self {
            Self::Tag { tag, nullable } => {
                if tag.matches(actual) || (*nullable && actual.is_null()) {
                    Ok(())
                } else {
                    Err(ShapeMismatch {
                        path: render_path(path),
                        kind: MismatchKind::TypeMismatch {
                            expected: *tag,
                            found: json_type_name(actual),
                        },
                    })
                }
            }
            Self::Object(fields) => {
                // An empty root accepts anything; nested shapes still need a mapping.
                if fields.is_empty() && path.is_empty() {
                    return Ok(());
                }
                let Some(map) = actual.as_object() else {
                    return Err(ShapeMismatch {
                        path: render_path(path),
                        kind: MismatchKind::NotAnObject {
                            found: json_type_name(actual),
                        },
                    });
                };
                for (key, expected) in fields {
                    path.push(key.clone());
                    let result = match map.get(key) {
                        Some(value) => expected.validate_at(value, path),
                        None => Err(ShapeMismatch {
                            path: render_path(path),
                            kind: MismatchKind::MissingKey,
                        }),
                    };
                    path.pop();
                    result?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Shape {
    type Err = ShapeError;

    /// Parse a single tag such as `"string"` or `"?integer"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(&Value::String(s.to_string()))
    }
}

/// The first point at which an actual value diverged from its shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {kind}", display_path(.path))]
pub struct ShapeMismatch {
    /// Dotted key path, empty for the root.
    pub path: String,
    pub kind: MismatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    MissingKey,
    NotAnObject { found: &'static str },
    TypeMismatch { expected: TypeTag, found: &'static str },
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => f.write_str("missing key"),
            Self::NotAnObject { found } => write!(f, "expected object, found {found}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

fn render_path(path: &[String]) -> String {
    path.join(".")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
