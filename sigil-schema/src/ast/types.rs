//! Declared field types.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Primitive type tags a field can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// Text.
    String,
    /// Any numeric value.
    Number,
    /// True / false.
    Boolean,
    /// A point in time.
    Date,
    /// Raw byte content.
    Binary,
    /// Untyped object.
    Object,
}

impl PrimitiveType {
    /// Parse a primitive type from its tag.
    ///
    /// Both the lowercase tags and the capitalised spellings used by common
    /// source languages are accepted.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "string" | "String" => Some(Self::String),
            "number" | "Number" => Some(Self::Number),
            "boolean" | "Boolean" | "bool" => Some(Self::Boolean),
            "date" | "Date" | "DateTime" => Some(Self::Date),
            "binary" | "Binary" => Some(Self::Binary),
            "object" | "Object" | "any" | "unknown" => Some(Self::Object),
            _ => None,
        }
    }

    /// Get the canonical tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Binary => "binary",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeclaredType {
    /// A primitive tag.
    Primitive(PrimitiveType),
    /// An array. `None` means the element type is a generic or unresolved placeholder.
    Array(Option<Box<DeclaredType>>),
    /// A named type: another model, or a nominal type such as a byte buffer.
    Reference(SmolStr),
    /// A lowercase tag that is not a known primitive.
    Unknown(SmolStr),
}

impl DeclaredType {
    /// Shorthand for a primitive type.
    pub fn primitive(p: PrimitiveType) -> Self {
        Self::Primitive(p)
    }

    /// Shorthand for a reference to a named type.
    pub fn reference(name: impl Into<SmolStr>) -> Self {
        Self::Reference(name.into())
    }

    /// Shorthand for an array of `element`.
    pub fn array_of(element: DeclaredType) -> Self {
        Self::Array(Some(Box::new(element)))
    }

    /// Parse a declared type from descriptor text.
    ///
    /// Recognises `X[]`, `Array<X>`, bare `Array`, primitive tags, capitalised
    /// names (references) and falls back to [`DeclaredType::Unknown`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if let Some(inner) = s.strip_suffix("[]") {
            return Self::array_of(Self::parse(inner));
        }
        if let Some(inner) = s.strip_prefix("Array<").and_then(|r| r.strip_suffix('>')) {
            if inner.trim().is_empty() {
                return Self::Array(None);
            }
            return Self::array_of(Self::parse(inner));
        }
        if s == "Array" || s == "array" {
            return Self::Array(None);
        }
        if let Some(p) = PrimitiveType::from_str(s) {
            return Self::Primitive(p);
        }

        match s.chars().next() {
            Some(c) if c.is_ascii_uppercase() => Self::Reference(s.into()),
            _ => Self::Unknown(s.into()),
        }
    }

    /// Check if this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Check if this names another type.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Get the declared element type of an array, if known.
    pub fn element(&self) -> Option<&DeclaredType> {
        match self {
            Self::Array(Some(element)) => Some(element),
            _ => None,
        }
    }

    /// Get the referenced type name, if any.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Self::Reference(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p),
            Self::Array(Some(element)) => write!(f, "{}[]", element),
            Self::Array(None) => write!(f, "Array"),
            Self::Reference(name) | Self::Unknown(name) => write!(f, "{}", name),
        }
    }
}

impl From<String> for DeclaredType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for DeclaredType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<DeclaredType> for String {
    fn from(t: DeclaredType) -> Self {
        t.to_string()
    }
}

impl From<PrimitiveType> for DeclaredType {
    fn from(p: PrimitiveType) -> Self {
        Self::Primitive(p)
    }
}
