//! Error types for model loading, configuration and compilation.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors surfaced to callers of Sigil.
///
/// Only startup and top-level failures are represented here. Problems found
/// while compiling nested fields (missing nested models, unknown annotation
/// kinds, reference cycles) are degraded in place and never become errors.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(sigil::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error. Compilation cannot start.
    #[error("configuration error: {message}")]
    #[diagnostic(
        code(sigil::schema::config_error),
        help("check the [source] and [compiler] sections of sigil.toml")
    )]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(sigil::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// JSON parsing or encoding error.
    #[error("failed to process JSON")]
    #[diagnostic(code(sigil::schema::json_error))]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// The model requested at the top level of a compilation does not exist.
    #[error("model `{name}` not found")]
    #[diagnostic(code(sigil::schema::model_not_found))]
    ModelNotFound { name: String },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(sigil::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// A descriptor document is structurally unusable.
    #[error("invalid model descriptor: {message}")]
    #[diagnostic(code(sigil::schema::invalid_descriptor))]
    InvalidDescriptor { message: String },
}

impl SchemaError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a model-not-found error.
    pub fn model_not_found(name: impl Into<String>) -> Self {
        Self::ModelNotFound { name: name.into() }
    }

    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Whether this error means compilation could not start at all.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::IoError { .. } | Self::TomlError { .. }
        )
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonError { source }
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(source: toml::de::Error) -> Self {
        Self::TomlError { source }
    }
}
