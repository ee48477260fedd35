//! Configuration file parsing for `sigil.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use crate::ast::PrimitiveType;
use crate::error::{SchemaError, SchemaResult};

/// Main configuration structure for `sigil.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SigilConfig {
    /// Where models come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Schema compiler settings.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Logging settings for hosts that install a subscriber.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SigilConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);

        toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })
    }

    /// Load, then certify, in one step.
    pub fn load_certified(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let config = Self::from_file(path)?;
        config.certify()?;
        Ok(config)
    }

    /// Check that models described by this configuration can be compiled at all.
    ///
    /// Fails with [`SchemaError::ConfigError`] when metadata emission is
    /// disabled (annotations would be missing from the extracted models), or
    /// when compiler settings are unusable.
    pub fn certify(&self) -> SchemaResult<()> {
        if !self.source.emit_metadata {
            return Err(SchemaError::config(
                "source.emit_metadata is disabled; field types and annotations cannot be extracted",
            ));
        }
        if self.source.descriptor.trim().is_empty() {
            return Err(SchemaError::config("source.descriptor must not be empty"));
        }
        if self.compiler.default_item_primitive().is_none() {
            return Err(SchemaError::config(format!(
                "compiler.default_item_type `{}` is not a primitive type",
                self.compiler.default_item_type
            )));
        }
        if self.compiler.binary_suffixes.iter().any(|s| s.is_empty()) {
            return Err(SchemaError::config(
                "compiler.binary_suffixes must not contain empty suffixes",
            ));
        }
        Ok(())
    }
}

/// Model source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Path to the model descriptor file.
    #[serde(default = "default_descriptor")]
    pub descriptor: String,

    /// Whether the build emits type metadata for annotated fields.
    #[serde(default = "default_true")]
    pub emit_metadata: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            descriptor: default_descriptor(),
            emit_metadata: true,
        }
    }
}

fn default_descriptor() -> String { "models.json".to_string() }
fn default_true() -> bool { true }

/// Schema compiler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Item type for arrays with no element information.
    #[serde(default = "default_item_type")]
    pub default_item_type: String,

    /// Emit `format: "double"` for `is-number`.
    #[serde(default)]
    pub number_format: bool,

    /// Nominal type names compiled as binary strings.
    #[serde(default = "default_binary_types")]
    pub binary_types: Vec<String>,

    /// Type-name suffixes compiled as binary strings (file uploads).
    #[serde(default = "default_binary_suffixes")]
    pub binary_suffixes: Vec<String>,
}

impl CompilerConfig {
    /// The configured default item type, if it names a primitive.
    pub fn default_item_primitive(&self) -> Option<PrimitiveType> {
        PrimitiveType::from_str(&self.default_item_type)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_item_type: default_item_type(),
            number_format: false,
            binary_types: default_binary_types(),
            binary_suffixes: default_binary_suffixes(),
        }
    }
}

fn default_item_type() -> String { "string".to_string() }

fn default_binary_types() -> Vec<String> {
    [
        "Buffer",
        "ArrayBuffer",
        "SharedArrayBuffer",
        "Uint8Array",
        "Uint8ClampedArray",
        "Int8Array",
        "Blob",
        "File",
        "Bytes",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_binary_suffixes() -> Vec<String> { vec!["File".to_string()] }

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `sigil_compiler=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String { "info".to_string() }

static ENV_VAR: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("environment variable pattern is valid")
});

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left untouched.
fn expand_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex_lite::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
