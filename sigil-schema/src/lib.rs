//! # sigil-schema
//!
//! Input model for the Sigil schema compiler.
//!
//! This crate provides:
//! - AST types for already-extracted models, fields and validation annotations
//! - Declared-type parsing for descriptor documents
//! - The [`ModelResolver`] seam and an in-memory [`ModelRegistry`]
//! - Configuration parser for `sigil.toml` files
//!
//! ## Example
//!
//! ```rust,ignore
//! use sigil_schema::{ModelRegistry, SigilConfig};
//!
//! let config = SigilConfig::from_file("sigil.toml")?;
//! config.certify()?;
//!
//! let registry = ModelRegistry::from_file(&config.source.descriptor)?;
//! let user = registry.get("User").expect("descriptor defines User");
//! assert!(user.get_field("email").is_some());
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod registry;

pub use ast::*;
pub use config::{CompilerConfig, LoggingConfig, SigilConfig, SourceConfig};
pub use error::{SchemaError, SchemaResult};
pub use registry::{ModelRegistry, ModelResolver};
