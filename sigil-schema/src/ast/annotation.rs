//! Validation annotations attached to fields.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A literal annotation argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// A boolean literal.
    Boolean(bool),
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
    /// A string literal.
    String(String),
}

impl AnnotationValue {
    /// Try to get the value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a non-negative count (lengths, sizes).
    ///
    /// Integral floats such as `3.0` are accepted.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Int(i) => u64::try_from(*i).ok(),
            Self::Float(f) if *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64 => {
                Some(*f as u64)
            }
            _ => None,
        }
    }

    /// Try to get the value as a JSON number, keeping integers integral.
    pub fn as_number(&self) -> Option<serde_json::Number> {
        match self {
            Self::Int(i) => Some(serde_json::Number::from(*i)),
            Self::Float(f) => serde_json::Number::from_f64(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for AnnotationValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for AnnotationValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// The closed set of annotation kinds the compiler understands.
///
/// Names are matched after normalisation: separators (`-`, `_`, `.`, spaces)
/// are dropped and the rest is lower-cased, so `IsNotEmpty`, `isNotEmpty` and
/// `is-not-empty` all name [`AnnotationKind::IsNotEmpty`]. The canonical
/// spelling is kebab-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnnotationKind {
    /// `is-string`: type `string`, keeping only string formats.
    IsString,
    /// `is-integer` (also `is-int`): type `integer`, format `int32`.
    IsInteger,
    /// `is-number`: type `number`, optionally format `double`.
    IsNumber,
    /// `is-boolean`: type `boolean`.
    IsBoolean,
    /// `is-email`: format `email`.
    IsEmail,
    /// `is-date`: type `string`, format `date-time`.
    IsDate,
    /// `is-not-empty`: marks the field required.
    IsNotEmpty,
    /// `min-length(n)`: `minLength`.
    MinLength,
    /// `max-length(n)`: `maxLength`.
    MaxLength,
    /// `length(min, max?)`: `minLength` and optionally `maxLength`.
    Length,
    /// `min(n)`: `minimum`.
    Min,
    /// `max(n)`: `maximum`.
    Max,
    /// `is-positive`: `minimum` of 0.
    IsPositive,
    /// `is-array`: type `array`.
    IsArray,
    /// `array-not-empty`: `minItems` of 1, and marks the field required.
    ArrayNotEmpty,
    /// `array-min-size(n)`: `minItems`.
    ArrayMinSize,
    /// `array-max-size(n)`: `maxItems`.
    ArrayMaxSize,
    /// Any other kind. Kept verbatim and ignored by the compiler.
    Unknown(SmolStr),
}

impl AnnotationKind {
    /// Look up a kind by name.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '.' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "isstring" => Self::IsString,
            "isinteger" | "isint" => Self::IsInteger,
            "isnumber" => Self::IsNumber,
            "isboolean" => Self::IsBoolean,
            "isemail" => Self::IsEmail,
            "isdate" => Self::IsDate,
            "isnotempty" => Self::IsNotEmpty,
            "minlength" => Self::MinLength,
            "maxlength" => Self::MaxLength,
            "length" => Self::Length,
            "min" => Self::Min,
            "max" => Self::Max,
            "ispositive" => Self::IsPositive,
            "isarray" => Self::IsArray,
            "arraynotempty" => Self::ArrayNotEmpty,
            "arrayminsize" => Self::ArrayMinSize,
            "arraymaxsize" => Self::ArrayMaxSize,
            _ => Self::Unknown(name.into()),
        }
    }

    /// Get the canonical name.
    pub fn name(&self) -> &str {
        match self {
            Self::IsString => "is-string",
            Self::IsInteger => "is-integer",
            Self::IsNumber => "is-number",
            Self::IsBoolean => "is-boolean",
            Self::IsEmail => "is-email",
            Self::IsDate => "is-date",
            Self::IsNotEmpty => "is-not-empty",
            Self::MinLength => "min-length",
            Self::MaxLength => "max-length",
            Self::Length => "length",
            Self::Min => "min",
            Self::Max => "max",
            Self::IsPositive => "is-positive",
            Self::IsArray => "is-array",
            Self::ArrayNotEmpty => "array-not-empty",
            Self::ArrayMinSize => "array-min-size",
            Self::ArrayMaxSize => "array-max-size",
            Self::Unknown(name) => name.as_str(),
        }
    }

    /// Check if the compiler understands this kind.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Check if this kind overwrites the schema `type`.
    pub fn is_type_bearing(&self) -> bool {
        matches!(
            self,
            Self::IsString
                | Self::IsInteger
                | Self::IsNumber
                | Self::IsBoolean
                | Self::IsDate
                | Self::IsArray
        )
    }

    /// Check if this kind marks its field as required.
    pub fn marks_required(&self) -> bool {
        matches!(self, Self::IsNotEmpty | Self::ArrayNotEmpty)
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<String> for AnnotationKind {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<&str> for AnnotationKind {
    fn from(s: &str) -> Self {
        Self::from_name(s)
    }
}

impl From<AnnotationKind> for String {
    fn from(kind: AnnotationKind) -> Self {
        kind.name().to_string()
    }
}

/// A declarative validation annotation on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation kind.
    pub kind: AnnotationKind,
    /// Positional literal arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<AnnotationValue>,
    /// Applies to every element of an array field instead of the field itself.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub each: bool,
}

impl Annotation {
    /// Create an annotation with no arguments.
    pub fn new(kind: impl Into<AnnotationKind>) -> Self {
        Self {
            kind: kind.into(),
            args: vec![],
            each: false,
        }
    }

    /// Create an annotation with arguments.
    pub fn with_args(
        kind: impl Into<AnnotationKind>,
        args: impl IntoIterator<Item = AnnotationValue>,
    ) -> Self {
        Self {
            kind: kind.into(),
            args: args.into_iter().collect(),
            each: false,
        }
    }

    /// Scope this annotation to each array element.
    pub fn for_each(mut self) -> Self {
        self.each = true;
        self
    }

    /// Get the first positional argument.
    pub fn first_arg(&self) -> Option<&AnnotationValue> {
        self.args.first()
    }

    /// Get a positional argument.
    pub fn arg(&self, index: usize) -> Option<&AnnotationValue> {
        self.args.get(index)
    }

    /// Check if this annotation has the given kind.
    pub fn is(&self, kind: &AnnotationKind) -> bool {
        &self.kind == kind
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.kind)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "({})", args.join(", "))?;
        }
        if self.each {
            write!(f, "[each]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(min: i64, max: i64) -> Annotation {
        Annotation::with_args("Length", [AnnotationValue::Int(min), AnnotationValue::Int(max)])
    }

    // ==================== AnnotationKind Tests ====================

    #[test]
    fn test_kind_normalisation_variants() {
        for name in ["IsNotEmpty", "isNotEmpty", "is-not-empty", "is_not_empty", "IS NOT EMPTY"] {
            assert_eq!(AnnotationKind::from_name(name), AnnotationKind::IsNotEmpty, "{name}");
        }
    }

    #[test]
    fn test_kind_all_known() {
        let cases = [
            ("IsString", AnnotationKind::IsString),
            ("IsInt", AnnotationKind::IsInteger),
            ("is-integer", AnnotationKind::IsInteger),
            ("IsNumber", AnnotationKind::IsNumber),
            ("IsBoolean", AnnotationKind::IsBoolean),
            ("IsEmail", AnnotationKind::IsEmail),
            ("IsDate", AnnotationKind::IsDate),
            ("MinLength", AnnotationKind::MinLength),
            ("MaxLength", AnnotationKind::MaxLength),
            ("Length", AnnotationKind::Length),
            ("Min", AnnotationKind::Min),
            ("Max", AnnotationKind::Max),
            ("IsPositive", AnnotationKind::IsPositive),
            ("IsArray", AnnotationKind::IsArray),
            ("ArrayNotEmpty", AnnotationKind::ArrayNotEmpty),
            ("ArrayMinSize", AnnotationKind::ArrayMinSize),
            ("ArrayMaxSize", AnnotationKind::ArrayMaxSize),
        ];
        for (name, kind) in cases {
            assert_eq!(AnnotationKind::from_name(name), kind, "{name}");
            assert!(kind.is_known());
        }
    }

    #[test]
    fn test_kind_unknown_keeps_name() {
        let kind = AnnotationKind::from_name("IsUUID");
        assert_eq!(kind, AnnotationKind::Unknown("IsUUID".into()));
        assert!(!kind.is_known());
        assert_eq!(kind.name(), "IsUUID");
    }

    #[test]
    fn test_kind_canonical_name_round_trip() {
        let kind = AnnotationKind::ArrayMinSize;
        assert_eq!(kind.name(), "array-min-size");
        assert_eq!(AnnotationKind::from_name(kind.name()), kind);
    }

    #[test]
    fn test_kind_classification() {
        assert!(AnnotationKind::IsInteger.is_type_bearing());
        assert!(!AnnotationKind::IsEmail.is_type_bearing());
        assert!(AnnotationKind::IsNotEmpty.marks_required());
        assert!(AnnotationKind::ArrayNotEmpty.marks_required());
        assert!(!AnnotationKind::MinLength.marks_required());
    }

    // ==================== AnnotationValue Tests ====================

    #[test]
    fn test_value_as_count() {
        assert_eq!(AnnotationValue::Int(5).as_count(), Some(5));
        assert_eq!(AnnotationValue::Int(-1).as_count(), None);
        assert_eq!(AnnotationValue::Float(3.0).as_count(), Some(3));
        assert_eq!(AnnotationValue::Float(3.5).as_count(), None);
        assert_eq!(AnnotationValue::from("3").as_count(), None);
    }

    #[test]
    fn test_value_as_number_keeps_integers() {
        let n = AnnotationValue::Int(18).as_number().unwrap();
        assert!(n.is_i64());
        let f = AnnotationValue::Float(0.5).as_number().unwrap();
        assert_eq!(f.as_f64(), Some(0.5));
        assert!(AnnotationValue::Float(f64::NAN).as_number().is_none());
        assert!(AnnotationValue::Boolean(true).as_number().is_none());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(AnnotationValue::from("x").as_string(), Some("x"));
        assert_eq!(AnnotationValue::Int(2).as_float(), Some(2.0));
        assert_eq!(AnnotationValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(AnnotationValue::Int(2).as_bool(), None);
    }

    #[test]
    fn test_value_untagged_serde() {
        let values: Vec<AnnotationValue> =
            serde_json::from_str(r#"[2, 2.5, true, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AnnotationValue::Int(2),
                AnnotationValue::Float(2.5),
                AnnotationValue::Boolean(true),
                AnnotationValue::String("x".into()),
            ]
        );
    }

    // ==================== Annotation Tests ====================

    #[test]
    fn test_annotation_builders() {
        let a = length(2, 10);
        assert!(a.is(&AnnotationKind::Length));
        assert_eq!(a.first_arg(), Some(&AnnotationValue::Int(2)));
        assert_eq!(a.arg(1), Some(&AnnotationValue::Int(10)));
        assert!(a.arg(2).is_none());
        assert!(!a.each);
        assert!(a.for_each().each);
    }

    #[test]
    fn test_annotation_display() {
        let a = length(2, 10);
        assert_eq!(a.to_string(), "@length(2, 10)");
        assert_eq!(Annotation::new("IsEmail").for_each().to_string(), "@is-email[each]");
    }

    #[test]
    fn test_annotation_deserialize_defaults() {
        let a: Annotation = serde_json::from_str(r#"{"kind": "IsEmail"}"#).unwrap();
        assert_eq!(a.kind, AnnotationKind::IsEmail);
        assert!(a.args.is_empty());
        assert!(!a.each);

        let b: Annotation =
            serde_json::from_str(r#"{"kind": "MinLength", "args": [3], "each": true}"#).unwrap();
        assert_eq!(b.kind, AnnotationKind::MinLength);
        assert!(b.each);
    }

    #[test]
    fn test_annotation_serialize_canonical() {
        let a = Annotation::new("isNotEmpty");
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::json!({"kind": "is-not-empty"})
        );
    }
}
