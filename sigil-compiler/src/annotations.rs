//! Validation annotation mapping.
//!
//! Annotations are applied in declaration order and each one overwrites the
//! keywords it controls, so the last writer wins. An annotation whose arguments
//! are missing or unusable is skipped as a whole.

use indexmap::IndexSet;
use smol_str::SmolStr;
use tracing::{debug, trace};

use sigil_schema::{Annotation, AnnotationKind};

use crate::output::{PropertySchema, SchemaFormat, SchemaType};

/// Applies annotations to a property fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationMapper {
    number_format: bool,
}

impl AnnotationMapper {
    /// Create a mapper. With `number_format`, `is-number` emits `format: "double"`.
    pub fn new(number_format: bool) -> Self {
        Self { number_format }
    }

    /// Apply field-scoped annotations in order.
    ///
    /// Annotations that mark the field as required add `field_name` to
    /// `required`. The set keeps each name once.
    pub fn apply<'a>(
        &self,
        annotations: impl IntoIterator<Item = &'a Annotation>,
        property: &mut PropertySchema,
        field_name: &str,
        required: &mut IndexSet<SmolStr>,
    ) {
        for annotation in annotations {
            if self.apply_one(annotation, property) {
                required.insert(SmolStr::new(field_name));
            }
        }
    }

    /// Apply a single annotation. Returns whether it marks its target required.
    pub fn apply_one(&self, annotation: &Annotation, property: &mut PropertySchema) -> bool {
        trace!(
            annotation = %annotation.kind,
            args = annotation.args.len(),
            "applying annotation"
        );
        match &annotation.kind {
            AnnotationKind::IsString => {
                property.schema_type = SchemaType::String;
                property.format = property.format.filter(SchemaFormat::is_string_format);
            }
            AnnotationKind::IsInteger => {
                property.schema_type = SchemaType::Integer;
                property.format = Some(SchemaFormat::Int32);
            }
            AnnotationKind::IsNumber => {
                property.schema_type = SchemaType::Number;
                property.format = self.number_format.then_some(SchemaFormat::Double);
            }
            AnnotationKind::IsBoolean => {
                property.schema_type = SchemaType::Boolean;
                property.format = None;
            }
            AnnotationKind::IsEmail => property.format = Some(SchemaFormat::Email),
            AnnotationKind::IsDate => {
                property.schema_type = SchemaType::String;
                property.format = Some(SchemaFormat::DateTime);
            }
            AnnotationKind::IsNotEmpty => return true,
            AnnotationKind::MinLength => {
                if let Some(n) = count_arg(annotation, 0) {
                    property.min_length = Some(n);
                }
            }
            AnnotationKind::MaxLength => {
                if let Some(n) = count_arg(annotation, 0) {
                    property.max_length = Some(n);
                }
            }
            AnnotationKind::Length => {
                if let Some(min) = count_arg(annotation, 0) {
                    property.min_length = Some(min);
                    if annotation.arg(1).is_some() {
                        if let Some(max) = count_arg(annotation, 1) {
                            property.max_length = Some(max);
                        }
                    }
                }
            }
            AnnotationKind::Min => {
                if let Some(n) = number_arg(annotation) {
                    property.minimum = Some(n);
                }
            }
            AnnotationKind::Max => {
                if let Some(n) = number_arg(annotation) {
                    property.maximum = Some(n);
                }
            }
            AnnotationKind::IsPositive => property.minimum = Some(serde_json::Number::from(0)),
            AnnotationKind::IsArray => {
                property.schema_type = SchemaType::Array;
                property.format = None;
            }
            AnnotationKind::ArrayNotEmpty => {
                property.min_items = Some(1);
                return true;
            }
            AnnotationKind::ArrayMinSize => {
                if let Some(n) = count_arg(annotation, 0) {
                    property.min_items = Some(n);
                }
            }
            AnnotationKind::ArrayMaxSize => {
                if let Some(n) = count_arg(annotation, 0) {
                    property.max_items = Some(n);
                }
            }
            AnnotationKind::Unknown(name) => {
                debug!(annotation = %name, "ignoring unknown annotation");
            }
        }
        false
    }
}

fn count_arg(annotation: &Annotation, index: usize) -> Option<u64> {
    let value = annotation.arg(index).and_then(|v| v.as_count());
    if value.is_none() {
        debug!(
            annotation = %annotation.kind,
            index,
            "ignoring annotation argument that is not a non-negative integer"
        );
    }
    value
}

fn number_arg(annotation: &Annotation) -> Option<serde_json::Number> {
    let value = annotation.first_arg().and_then(|v| v.as_number());
    if value.is_none() {
        debug!(annotation = %annotation.kind, "ignoring annotation without a numeric argument");
    }
    value
}
