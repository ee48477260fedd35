//! Declared type resolution.
//!
//! Maps a field's declared type to a base schema type and format. Nested model
//! references are handed back to the caller through a callback so the model
//! compiler can re-enter itself (and its cache) for them.

use std::sync::Arc;

use tracing::{debug, trace};

use sigil_schema::{DeclaredType, PrimitiveType};

use crate::options::CompilerOptions;
use crate::output::{CompiledSchema, PropertySchema, SchemaFormat, SchemaType};

/// What became of a referenced model.
#[derive(Debug, Clone)]
pub enum NestedSchema {
    /// The model compiled, or was already cached.
    Compiled(Arc<CompiledSchema>),
    /// The model is on the current compile path; a stub cuts the cycle.
    Stub,
    /// The resolver does not know the model.
    Missing,
}

/// The outcome of resolving one declared type.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// The schema type the declared type maps to.
    pub base_type: SchemaType,
    /// The format that goes with `base_type`, if any.
    pub base_format: Option<SchemaFormat>,
    /// The referenced model, for model references only.
    pub nested: Option<NestedSchema>,
}

impl ResolvedType {
    fn base(base_type: SchemaType) -> Self {
        Self {
            base_type,
            base_format: None,
            nested: None,
        }
    }

    fn formatted(base_type: SchemaType, format: SchemaFormat) -> Self {
        Self {
            base_type,
            base_format: Some(format),
            nested: None,
        }
    }

    /// Build the property fragment for this resolution.
    ///
    /// Compiled nested models contribute their properties and required names.
    /// Stubs and missing models become empty objects.
    pub fn into_property(self) -> PropertySchema {
        let mut property = match self.nested {
            Some(NestedSchema::Compiled(compiled)) => compiled.schema.to_property(),
            Some(NestedSchema::Stub | NestedSchema::Missing) => PropertySchema::empty_object(),
            None => PropertySchema::new(self.base_type),
        };
        property.schema_type = self.base_type;
        property.format = self.base_format;
        property
    }
}

/// Maps declared types to base schema types.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'o> {
    options: &'o CompilerOptions,
}

impl<'o> TypeResolver<'o> {
    /// Create a resolver over the given options.
    pub fn new(options: &'o CompilerOptions) -> Self {
        Self { options }
    }

    /// Resolve a declared type.
    ///
    /// `compile_nested` is called for references that name a model rather than
    /// a binary type. Arrays resolve to a bare `array`; their items are built
    /// separately.
    pub fn resolve(
        &self,
        declared: &DeclaredType,
        compile_nested: &mut dyn FnMut(&str) -> NestedSchema,
    ) -> ResolvedType {
        match declared {
            DeclaredType::Primitive(primitive) => Self::primitive(*primitive),
            DeclaredType::Array(_) => ResolvedType::base(SchemaType::Array),
            DeclaredType::Reference(name) if self.options.is_binary_type(name) => {
                trace!(type_name = %name, "binary type");
                ResolvedType::formatted(SchemaType::String, SchemaFormat::Binary)
            }
            DeclaredType::Reference(name) => ResolvedType {
                nested: Some(compile_nested(name)),
                ..ResolvedType::base(SchemaType::Object)
            },
            DeclaredType::Unknown(tag) => {
                debug!(type_tag = %tag, "unrecognized declared type, using object");
                ResolvedType::base(SchemaType::Object)
            }
        }
    }

    /// Resolve a primitive type tag.
    pub fn primitive(primitive: PrimitiveType) -> ResolvedType {
        match primitive {
            PrimitiveType::String => ResolvedType::base(SchemaType::String),
            PrimitiveType::Number => ResolvedType::base(SchemaType::Number),
            PrimitiveType::Boolean => ResolvedType::base(SchemaType::Boolean),
            PrimitiveType::Date => {
                ResolvedType::formatted(SchemaType::String, SchemaFormat::DateTime)
            }
            PrimitiveType::Binary => {
                ResolvedType::formatted(SchemaType::String, SchemaFormat::Binary)
            }
            PrimitiveType::Object => ResolvedType::base(SchemaType::Object),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Schema;
    use indexmap::{IndexMap, IndexSet};
    use smol_str::SmolStr;

    fn resolve(declared: &str) -> ResolvedType {
        let options = CompilerOptions::default();
        TypeResolver::new(&options).resolve(&DeclaredType::parse(declared), &mut |_| {
            NestedSchema::Missing
        })
    }

    // ==================== Primitive Tests ====================

    #[test]
    fn test_resolve_primitives() {
        let cases = [
            ("string", SchemaType::String, None),
            ("number", SchemaType::Number, None),
            ("boolean", SchemaType::Boolean, None),
            ("date", SchemaType::String, Some(SchemaFormat::DateTime)),
            ("binary", SchemaType::String, Some(SchemaFormat::Binary)),
            ("object", SchemaType::Object, None),
        ];
        for (declared, base_type, format) in cases {
            let resolved = resolve(declared);
            assert_eq!(resolved.base_type, base_type, "{declared}");
            assert_eq!(resolved.base_format, format, "{declared}");
            assert!(resolved.nested.is_none());
        }
    }

    #[test]
    fn test_resolve_array_is_bare() {
        let resolved = resolve("string[]");
        assert_eq!(resolved.base_type, SchemaType::Array);
        assert!(resolved.into_property().items.is_none());
    }

    #[test]
    fn test_resolve_unknown_is_object() {
        let resolved = resolve("map<string, number>");
        assert_eq!(resolved.base_type, SchemaType::Object);
        assert!(resolved.nested.is_none());
    }

    // ==================== Binary Family Tests ====================

    #[test]
    fn test_resolve_binary_family_skips_models() {
        let options = CompilerOptions::default();
        let resolver = TypeResolver::new(&options);
        let mut called = false;

        for name in ["Buffer", "Blob", "UploadedFile"] {
            let resolved = resolver.resolve(&DeclaredType::reference(name), &mut |_| {
                called = true;
                NestedSchema::Missing
            });
            assert_eq!(resolved.base_type, SchemaType::String);
            assert_eq!(resolved.base_format, Some(SchemaFormat::Binary));
        }
        assert!(!called);
    }

    // ==================== Reference Tests ====================

    #[test]
    fn test_resolve_reference_compiled() {
        let options = CompilerOptions::default();
        let mut properties = IndexMap::new();
        properties.insert(SmolStr::new("city"), PropertySchema::new(SchemaType::String));
        let required: IndexSet<SmolStr> = [SmolStr::new("city")].into_iter().collect();
        let address = Arc::new(CompiledSchema::new("Address", Schema::new(properties, required)));

        let mut requested = Vec::new();
        let resolved = TypeResolver::new(&options).resolve(
            &DeclaredType::reference("Address"),
            &mut |name| {
                requested.push(name.to_string());
                NestedSchema::Compiled(Arc::clone(&address))
            },
        );
        assert_eq!(requested, vec!["Address"]);

        let property = resolved.into_property();
        assert_eq!(property, address.schema.to_property());
        assert!(property.is_object());
        assert!(property.properties.unwrap().contains_key("city"));
        assert!(property.required.unwrap().contains("city"));
    }

    #[test]
    fn test_resolve_reference_missing_is_empty_object() {
        let property = resolve("Ghost").into_property();
        assert!(property.is_object());
        assert!(property.properties.unwrap().is_empty());
        assert!(property.required.unwrap().is_empty());
    }

    #[test]
    fn test_resolve_reference_stub_is_empty_object() {
        let options = CompilerOptions::default();
        let property = TypeResolver::new(&options)
            .resolve(&DeclaredType::reference("User"), &mut |_| NestedSchema::Stub)
            .into_property();
        assert!(property.is_object());
        assert_eq!(property.properties, Some(IndexMap::new()));
    }
}
