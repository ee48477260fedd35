//! # Sigil
//!
//! Compiles annotated data models into JSON-Schema / OpenAPI component schemas.
//!
//! Sigil provides:
//! - An input model for already-extracted classes: fields, declared types and
//!   validation annotations
//! - A schema compiler with nested-model inlining, array item specialization
//!   and cycle-safe caching
//! - `sigil.toml` configuration and JSON/TOML model descriptors
//!
//! ## Quick Start
//!
//! ```rust
//! use sigil::prelude::*;
//!
//! let descriptor = r#"{
//!     "models": [{
//!         "name": "User",
//!         "fields": [
//!             {"name": "name", "type": "string", "annotations": [{"kind": "IsNotEmpty"}]},
//!             {"name": "email", "type": "string", "annotations": [{"kind": "IsEmail"}]}
//!         ]
//!     }]
//! }"#;
//!
//! let registry = ModelRegistry::from_json_str(descriptor)?;
//! let compiler = SchemaCompiler::new(registry);
//! let user = compiler.compile("User")?;
//!
//! assert!(user.schema.is_required("name"));
//! println!("{}", user.to_json_pretty()?);
//! # Ok::<(), sigil::SchemaError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Input model, model resolution and configuration.
pub mod schema {
    pub use sigil_schema::*;
}

/// The schema compiler and its output types.
pub mod compiler {
    pub use sigil_compiler::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::Project;
    pub use crate::compiler::{
        CompiledSchema, CompilerOptions, PropertySchema, Schema, SchemaCompiler,
    };
    pub use crate::schema::{
        Annotation, AnnotationKind, DeclaredType, Field, Model, ModelRegistry, ModelResolver,
        PrimitiveType, SigilConfig,
    };
}

// Re-export key types at the crate root
pub use compiler::{CompiledSchema, SchemaCompiler};
pub use schema::{SchemaError, SchemaResult};

/// A loaded `sigil.toml` together with the compiler it configures.
///
/// The configuration is kept so hosts can act on the sections the compiler
/// does not read itself, such as `[logging]`.
#[derive(Debug)]
pub struct Project {
    /// The certified configuration.
    pub config: schema::SigilConfig,
    /// A compiler over the configured model descriptor.
    pub compiler: SchemaCompiler<schema::ModelRegistry>,
}

/// Load `sigil.toml`, certify it, and build a compiler over its model descriptor.
///
/// The descriptor path is taken relative to the configuration file's directory.
pub fn load(config_path: impl AsRef<std::path::Path>) -> SchemaResult<Project> {
    let config_path = config_path.as_ref();
    let config = schema::SigilConfig::load_certified(config_path)?;

    let descriptor = config_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .join(&config.source.descriptor);
    let registry = schema::ModelRegistry::from_file(descriptor)?;

    let compiler = SchemaCompiler::from_config(registry, &config)?;
    Ok(Project { config, compiler })
}
