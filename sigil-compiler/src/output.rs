//! Compiled schema documents.
//!
//! These types are the engine's output. They serialize to the usual
//! JSON-Schema / OpenAPI component shape:
//!
//! ```json
//! {
//!   "name": "User",
//!   "schema": {
//!     "type": "object",
//!     "properties": {
//!       "name": { "type": "string" },
//!       "age": { "type": "integer", "format": "int32", "minimum": 18, "maximum": 100 }
//!     },
//!     "required": ["name"]
//!   }
//! }
//! ```

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use smol_str::SmolStr;

use sigil_schema::SchemaResult;

/// The `type` tag of a schema fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// Text, possibly refined by a format.
    String,
    /// Any number.
    Number,
    /// A whole number.
    Integer,
    /// True or false.
    Boolean,
    /// A list; its element schema lives in `items`.
    Array,
    /// A nested object with `properties` and `required`.
    Object,
}

impl SchemaType {
    /// Get the tag as written in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `format` refinement of a schema fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    /// An RFC 3339 timestamp string.
    #[serde(rename = "date-time")]
    DateTime,
    /// Raw bytes, as used for file uploads.
    Binary,
    /// An email address string.
    Email,
    /// A 32-bit signed integer.
    Int32,
    /// A double-precision float.
    Double,
}

impl SchemaFormat {
    /// Get the format as written in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Binary => "binary",
            Self::Email => "email",
            Self::Int32 => "int32",
            Self::Double => "double",
        }
    }

    /// Check if this format refines a `string`.
    pub fn is_string_format(&self) -> bool {
        matches!(self, Self::DateTime | Self::Binary | Self::Email)
    }
}

impl std::fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The schema of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    /// The `type` tag.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    /// Optional refinement of the type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SchemaFormat>,
    /// Inclusive lower bound for numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// Inclusive upper bound for numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Minimum array size. Array only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum array size. Array only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Item schema. Present exactly when `schema_type` is `array`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,
    /// Nested properties. Present exactly when `schema_type` is `object`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<SmolStr, PropertySchema>>,
    /// Nested required names. Present exactly when `schema_type` is `object`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<IndexSet<SmolStr>>,
}

impl PropertySchema {
    /// Create a bare fragment of the given type.
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            format: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            min_items: None,
            max_items: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    /// Create a formatted fragment.
    pub fn formatted(schema_type: SchemaType, format: SchemaFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::new(schema_type)
        }
    }

    /// Create an object fragment from a compiled nested schema body.
    pub fn object(
        properties: IndexMap<SmolStr, PropertySchema>,
        required: IndexSet<SmolStr>,
    ) -> Self {
        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::new(SchemaType::Object)
        }
    }

    /// An object with no known shape: degraded references and cycle stubs.
    pub fn empty_object() -> Self {
        Self::object(IndexMap::new(), IndexSet::new())
    }

    /// Create an array fragment with the given items.
    pub fn array(items: PropertySchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(SchemaType::Array)
        }
    }

    /// Check if this fragment is an array.
    pub fn is_array(&self) -> bool {
        self.schema_type == SchemaType::Array
    }

    /// Check if this fragment is an object.
    pub fn is_object(&self) -> bool {
        self.schema_type == SchemaType::Object
    }

    /// Enforce the shape invariants after annotations have rewritten the type.
    ///
    /// Non-array fragments lose `items` and item-count bounds. Object fragments
    /// always carry `properties` and `required`, others never do, and `required`
    /// only lists names present in `properties`.
    pub fn normalize(&mut self) {
        if !self.is_array() {
            self.items = None;
            self.min_items = None;
            self.max_items = None;
        }

        if self.is_object() {
            let properties = self.properties.get_or_insert_default();
            let required = self.required.get_or_insert_default();
            required.retain(|name| properties.contains_key(name));
        } else {
            self.properties = None;
            self.required = None;
        }
    }
}

/// The compiled schema of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Always `object`.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    /// Field schemas in declaration order.
    pub properties: IndexMap<SmolStr, PropertySchema>,
    /// Required field names, without duplicates.
    pub required: IndexSet<SmolStr>,
}

impl Schema {
    /// Create an object schema, dropping required names that are not properties.
    pub fn new(
        properties: IndexMap<SmolStr, PropertySchema>,
        mut required: IndexSet<SmolStr>,
    ) -> Self {
        required.retain(|name| properties.contains_key(name));
        Self {
            schema_type: SchemaType::Object,
            properties,
            required,
        }
    }

    /// Get a property schema by field name.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    /// Check if a field is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Embed this schema as a nested object property.
    pub fn to_property(&self) -> PropertySchema {
        PropertySchema::object(self.properties.clone(), self.required.clone())
    }
}

/// A model name together with its compiled schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledSchema {
    /// The model name.
    pub name: SmolStr,
    /// The compiled object schema.
    pub schema: Schema,
}

impl CompiledSchema {
    /// Pair a name with its schema.
    pub fn new(name: impl Into<SmolStr>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
