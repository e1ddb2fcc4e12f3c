//! Declared shapes for untrusted JSON.
//!
//! A [`Schema`] describes the structure a raw value must have before it is
//! treated as domain data. Parsing against a schema either yields a
//! normalised value (strings trimmed where requested, undeclared object
//! properties dropped) or a [`ValidationFailure`] listing every problem.
//!
//! Types that are built from request bodies implement [`Shape`], which pairs
//! a schema with serde deserialisation of the normalised value.
//!
//! # Example
//!
//! ```
//! use meridian_core::shape::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::object(vec![
//!     ("name", Schema::string().trim().min_length(1).required()),
//!     ("note", Schema::string()),
//! ]);
//!
//! let parsed = schema.parse(&json!({"name": "  Demo ", "extra": true})).unwrap();
//! assert_eq!(parsed, json!({"name": "Demo"}));
//!
//! let failure = schema.parse(&json!({"name": "   "})).unwrap_err();
//! assert!(failure.mentions("name"));
//! ```

use crate::error::ValidationFailure;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A declared shape for a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// String type.
    String {
        /// Whether this field is required.
        required: bool,
        /// Whether surrounding whitespace is stripped before length checks.
        trim: bool,
        /// Minimum length in characters.
        min_length: Option<usize>,
    },
    /// Object type. Properties keep their declaration order.
    Object {
        /// Whether this field is required.
        required: bool,
        /// Declared properties and their schemas.
        properties: Vec<(String, Schema)>,
    },
}

impl Schema {
    /// Creates a string schema.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            required: false,
            trim: false,
            min_length: None,
        }
    }

    /// Creates an object schema from a list of property definitions.
    #[must_use]
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        Self::Object {
            required: false,
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
        }
    }

    /// Marks this schema as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        match &mut self {
            Self::String { required, .. } | Self::Object { required, .. } => *required = true,
        }
        self
    }

    /// Returns whether this schema is marked as required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. } | Self::Object { required, .. } => *required,
        }
    }

    /// Strips surrounding whitespace from string values before checking them.
    #[must_use]
    pub fn trim(mut self) -> Self {
        if let Self::String { trim, .. } = &mut self {
            *trim = true;
        }
        self
    }

    /// Sets the minimum length for string schemas.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(len);
        }
        self
    }

    /// Parses a JSON value against this schema.
    ///
    /// Returns the normalised value on success. On failure every issue found
    /// is reported, not only the first one.
    pub fn parse(&self, value: &Value) -> Result<Value, ValidationFailure> {
        let mut failure = ValidationFailure::new();
        let normalized = self.parse_at(value, "$", &mut failure);
        if failure.is_empty() {
            Ok(normalized)
        } else {
            Err(failure)
        }
    }

    fn parse_at(&self, value: &Value, path: &str, failure: &mut ValidationFailure) -> Value {
        if value.is_null() {
            if self.is_required() {
                failure.push(path, "required field is null");
            }
            return Value::Null;
        }

        match self {
            Self::String {
                trim, min_length, ..
            } => {
                let Some(raw) = value.as_str() else {
                    failure.push(path, type_mismatch("string", value));
                    return Value::Null;
                };
                let text = if *trim { raw.trim() } else { raw };

                if let Some(min) = min_length {
                    let len = text.chars().count();
                    if len < *min {
                        failure.push(
                            path,
                            format!("string length {len} is less than minimum {min}"),
                        );
                    }
                }

                Value::String(text.to_string())
            }

            Self::Object { properties, .. } => {
                let Some(obj) = value.as_object() else {
                    failure.push(path, type_mismatch("object", value));
                    return Value::Null;
                };

                // Undeclared properties are ignored and do not survive normalisation.
                let mut normalized = Map::new();
                for (key, schema) in properties {
                    let prop_path = format!("{path}.{key}");
                    match obj.get(key) {
                        Some(prop_value) => {
                            let parsed = schema.parse_at(prop_value, &prop_path, failure);
                            normalized.insert(key.clone(), parsed);
                        }
                        None if schema.is_required() => {
                            failure.push(prop_path, format!("missing required property '{key}'"));
                        }
                        None => {}
                    }
                }
                Value::Object(normalized)
            }
        }
    }
}

/// Builds the message for a value of the wrong JSON type.
fn type_mismatch(expected: &str, value: &Value) -> String {
    let actual = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("expected {expected}, got {actual}")
}

/// A type that can only be built from JSON satisfying its declared schema.
///
/// The default [`Shape::from_json`] parses against [`Shape::schema`] and then
/// deserialises the normalised value, so serde never sees input the schema
/// rejected.
///
/// # Example
///
/// ```
/// use meridian_core::shape::{Schema, Shape};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Rename {
///     title: String,
/// }
///
/// impl Shape for Rename {
///     fn schema() -> Schema {
///         Schema::object(vec![("title", Schema::string().trim().min_length(1).required())])
///     }
/// }
///
/// let rename = Rename::from_json(&json!({"title": " Roadmap "})).unwrap();
/// assert_eq!(rename.title, "Roadmap");
/// assert!(Rename::from_json(&json!({})).is_err());
/// ```
pub trait Shape: DeserializeOwned {
    /// The declared schema for this type.
    fn schema() -> Schema;

    /// Parses a raw JSON value into this type.
    fn from_json(value: &Value) -> Result<Self, ValidationFailure> {
        let normalized = Self::schema().parse(value)?;
        serde_json::from_value(normalized)
            .map_err(|e| ValidationFailure::single("$", e.to_string()))
    }
}
