//! # sigil-compiler
//!
//! Compiles annotated data models into structural schema documents.
//!
//! Given a model name and a [`ModelResolver`](sigil_schema::ModelResolver),
//! the compiler produces a JSON-Schema / OpenAPI style object schema: one
//! property per field, required names collected from annotations, nested
//! models inlined, array items specialized and reference cycles cut with
//! object stubs.
//!
//! ## Example
//!
//! ```rust
//! use sigil_compiler::SchemaCompiler;
//! use sigil_schema::{Annotation, AnnotationKind, Field, Model, ModelRegistry, PrimitiveType};
//!
//! let user = Model::new("User").with_field(
//!     Field::new("email", PrimitiveType::String)
//!         .with_annotation(Annotation::new(AnnotationKind::IsEmail))
//!         .with_annotation(Annotation::new(AnnotationKind::IsNotEmpty)),
//! );
//! let registry = ModelRegistry::from_models([user]).unwrap();
//!
//! let compiler = SchemaCompiler::new(registry);
//! let compiled = compiler.compile("User").unwrap();
//! assert!(compiled.schema.is_required("email"));
//! ```

pub mod annotations;
pub mod array;
pub mod cache;
pub mod compiler;
pub mod options;
pub mod output;
pub mod resolve;

pub use annotations::AnnotationMapper;
pub use array::ArraySpecializer;
pub use cache::{CacheStats, Lookup, SchemaCache};
pub use compiler::SchemaCompiler;
pub use options::CompilerOptions;
pub use output::{CompiledSchema, PropertySchema, Schema, SchemaFormat, SchemaType};
pub use resolve::{NestedSchema, ResolvedType, TypeResolver};
