//! Compiler options.

use indexmap::IndexSet;
use smol_str::SmolStr;

use sigil_schema::{CompilerConfig, PrimitiveType, SchemaError, SchemaResult, SigilConfig};

/// Knobs that change how models compile.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    /// Item type for arrays with no element type information.
    pub default_item_type: PrimitiveType,
    /// Emit `format: "double"` for `is-number`.
    pub number_format: bool,
    /// Nominal type names compiled as `string/binary`.
    pub binary_types: IndexSet<SmolStr>,
    /// Type-name suffixes compiled as `string/binary`.
    pub binary_suffixes: Vec<SmolStr>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        let config = CompilerConfig::default();
        let item = config.default_item_primitive().unwrap_or(PrimitiveType::String);
        Self::from_parts(&config, item)
    }
}

impl CompilerOptions {
    /// Build options from a full configuration, certifying it first.
    pub fn from_config(config: &SigilConfig) -> SchemaResult<Self> {
        config.certify()?;
        Self::from_compiler_config(&config.compiler)
    }

    /// Build options from the `[compiler]` section alone.
    pub fn from_compiler_config(config: &CompilerConfig) -> SchemaResult<Self> {
        let default_item_type = config.default_item_primitive().ok_or_else(|| {
            SchemaError::config(format!(
                "compiler.default_item_type `{}` is not a primitive type",
                config.default_item_type
            ))
        })?;

        Ok(Self::from_parts(config, default_item_type))
    }

    fn from_parts(config: &CompilerConfig, default_item_type: PrimitiveType) -> Self {
        Self {
            default_item_type,
            number_format: config.number_format,
            binary_types: config.binary_types.iter().map(SmolStr::new).collect(),
            binary_suffixes: config
                .binary_suffixes
                .iter()
                .filter(|s| !s.is_empty())
                .map(SmolStr::new)
                .collect(),
        }
    }

    /// Set the default array item type.
    pub fn with_default_item_type(mut self, item: PrimitiveType) -> Self {
        self.default_item_type = item;
        self
    }

    /// Enable or disable `format: "double"` on `is-number`.
    pub fn with_number_format(mut self, enabled: bool) -> Self {
        self.number_format = enabled;
        self
    }

    /// Add a nominal binary type.
    pub fn with_binary_type(mut self, name: impl Into<SmolStr>) -> Self {
        self.binary_types.insert(name.into());
        self
    }

    /// Check if a nominal type name belongs to the binary family.
    pub fn is_binary_type(&self, name: &str) -> bool {
        self.binary_types.contains(name)
            || self
                .binary_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
    }
}
