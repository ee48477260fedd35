//! Field definitions for the Sigil model AST.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Annotation, AnnotationKind, DeclaredType};

/// A field in a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: SmolStr,
    /// Declared type.
    #[serde(rename = "type")]
    pub declared_type: DeclaredType,
    /// Annotations in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Field {
    /// Create a new field without annotations.
    pub fn new(name: impl Into<SmolStr>, declared_type: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            annotations: vec![],
        }
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add several annotations, keeping their order.
    pub fn with_annotations(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.annotations.extend(annotations);
        self
    }

    /// Get the field name as a string.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Check if the field is declared as an array.
    pub fn is_array(&self) -> bool {
        self.declared_type.is_array()
    }

    /// Check if the field references another named type.
    pub fn is_reference(&self) -> bool {
        self.declared_type.is_reference()
    }

    /// Check if this field carries an annotation of the given kind.
    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.annotations.iter().any(|a| a.is(kind))
    }

    /// Annotations scoped to the field itself.
    pub fn field_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| !a.each)
    }

    /// Annotations scoped to each array element.
    pub fn element_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| a.each)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.declared_type)?;
        for annotation in &self.annotations {
            write!(f, " {}", annotation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AnnotationValue, PrimitiveType};

    // ==================== Field Construction Tests ====================

    #[test]
    fn test_field_new() {
        let field = Field::new("email", PrimitiveType::String);

        assert_eq!(field.name(), "email");
        assert_eq!(
            field.declared_type,
            DeclaredType::Primitive(PrimitiveType::String)
        );
        assert!(field.annotations.is_empty());
    }

    #[test]
    fn test_field_from_type_text() {
        let field = Field::new("tags", "string[]");
        assert!(field.is_array());
        assert!(!field.is_reference());
    }

    #[test]
    fn test_field_reference() {
        let field = Field::new("author", "User");
        assert!(field.is_reference());
    }

    // ==================== Annotation Tests ====================

    #[test]
    fn test_field_annotation_order_preserved() {
        let field = Field::new("name", "string")
            .with_annotation(Annotation::with_args("MinLength", [AnnotationValue::Int(2)]))
            .with_annotation(Annotation::with_args("MaxLength", [AnnotationValue::Int(100)]));

        let kinds: Vec<_> = field.annotations.iter().map(|a| a.kind.clone()).collect();
        assert_eq!(kinds, vec![AnnotationKind::MinLength, AnnotationKind::MaxLength]);
    }

    #[test]
    fn test_field_has_annotation() {
        let field = Field::new("name", "string").with_annotation(Annotation::new("IsNotEmpty"));
        assert!(field.has_annotation(&AnnotationKind::IsNotEmpty));
        assert!(!field.has_annotation(&AnnotationKind::IsEmail));
    }

    #[test]
    fn test_field_scoped_annotations() {
        let field = Field::new("emails", "string[]").with_annotations([
            Annotation::new("ArrayNotEmpty"),
            Annotation::new("IsEmail").for_each(),
        ]);

        assert_eq!(field.field_annotations().count(), 1);
        assert_eq!(field.element_annotations().count(), 1);
        assert_eq!(
            field.element_annotations().next().unwrap().kind,
            AnnotationKind::IsEmail
        );
    }

    // ==================== Display and Serde Tests ====================

    #[test]
    fn test_field_display() {
        let field = Field::new("age", "number").with_annotation(Annotation::with_args(
            "Min",
            [AnnotationValue::Int(18)],
        ));
        assert_eq!(field.to_string(), "age: number @min(18)");
    }

    #[test]
    fn test_field_deserialize() {
        let field: Field = serde_json::from_str(
            r#"{
                "name": "avatar",
                "type": "UploadedFile",
                "annotations": [{"kind": "IsNotEmpty"}]
            }"#,
        )
        .unwrap();

        assert_eq!(field.name(), "avatar");
        assert_eq!(field.declared_type, DeclaredType::reference("UploadedFile"));
        assert_eq!(field.annotations.len(), 1);
    }

    #[test]
    fn test_field_deserialize_without_annotations() {
        let field: Field = serde_json::from_str(r#"{"name": "bio", "type": "string"}"#).unwrap();
        assert!(field.annotations.is_empty());
    }
}
