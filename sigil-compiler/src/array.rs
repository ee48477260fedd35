//! Array item specialization.
//!
//! Builds the `items` schema of an array field from the declared element type
//! and the annotations scoped to each element. Element annotations are applied
//! after the element type, so they win where both set the same keyword.

use tracing::trace;

use sigil_schema::{Annotation, DeclaredType};

use crate::annotations::AnnotationMapper;
use crate::output::PropertySchema;

/// Builds item schemas for array fields.
#[derive(Debug, Clone, Copy)]
pub struct ArraySpecializer<'a> {
    mapper: &'a AnnotationMapper,
    default_item: &'a DeclaredType,
}

impl<'a> ArraySpecializer<'a> {
    /// Create a specializer. `default_item` is used when no element type is known.
    pub fn new(mapper: &'a AnnotationMapper, default_item: &'a DeclaredType) -> Self {
        Self {
            mapper,
            default_item,
        }
    }

    /// Build the item schema.
    ///
    /// `resolve` turns a declared type into a property fragment; it is how
    /// nested model references reach the compiler. Required signals from
    /// element annotations have no field to attach to and are dropped.
    pub fn specialize(
        &self,
        element: Option<&DeclaredType>,
        element_annotations: &[&Annotation],
        resolve: &mut dyn FnMut(&DeclaredType) -> PropertySchema,
    ) -> PropertySchema {
        let declared = element.unwrap_or(self.default_item);
        let mut item = resolve(declared);
        if item.is_array() {
            item.items = Some(Box::new(self.specialize(declared.element(), &[], resolve)));
        }

        for annotation in element_annotations {
            if self.mapper.apply_one(annotation, &mut item) {
                trace!(annotation = %annotation.kind, "required signal on array element dropped");
            }
        }

        if item.is_array() && item.items.is_none() {
            item.items = Some(Box::new(self.specialize(None, &[], resolve)));
        }
        item.normalize();
        item
    }
}
