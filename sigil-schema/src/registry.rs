//! Model resolution.
//!
//! The compiler never looks models up on its own. It is handed a
//! [`ModelResolver`], a pure `name -> Model | not-found` function, and uses it
//! for every nested or array-element reference. How the resolver obtains its
//! data (reflection, static analysis, a hand-built descriptor) is up to the
//! host. [`ModelRegistry`] is the in-memory resolver used for descriptor
//! documents and tests.
//!
//! # Descriptor format
//!
//! ```json
//! {
//!   "models": [
//!     {
//!       "name": "User",
//!       "fields": [
//!         { "name": "email", "type": "string", "annotations": [{ "kind": "IsEmail" }] },
//!         { "name": "tags",  "type": "string[]",
//!           "annotations": [{ "kind": "MinLength", "args": [2], "each": true }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! The same structure is accepted as TOML (`[[models]]` tables).

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use crate::ast::Model;
use crate::error::{SchemaError, SchemaResult};

/// Looks up models by name.
pub trait ModelResolver: Send + Sync {
    /// Resolve a model by name, or `None` if it does not exist.
    fn resolve_model(&self, name: &str) -> Option<Cow<'_, Model>>;
}

impl<F> ModelResolver for F
where
    F: Fn(&str) -> Option<Model> + Send + Sync,
{
    fn resolve_model(&self, name: &str) -> Option<Cow<'_, Model>> {
        self(name).map(Cow::Owned)
    }
}

/// An in-memory collection of models, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRegistry {
    models: IndexMap<SmolStr, Model>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryDocument {
    #[serde(default)]
    models: Vec<Model>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from models, rejecting duplicate names.
    pub fn from_models(models: impl IntoIterator<Item = Model>) -> SchemaResult<Self> {
        let mut registry = Self::new();
        for model in models {
            registry.insert(model)?;
        }
        Ok(registry)
    }

    /// Load a registry from a JSON descriptor.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        let document: RegistryDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }

    /// Load a registry from a TOML descriptor.
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        let document: RegistryDocument = toml::from_str(content)?;
        Self::from_document(document)
    }

    /// Load a registry from a descriptor file.
    ///
    /// The format is chosen by extension: `.toml` is TOML, anything else JSON.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let registry = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };
        debug!(path = %path.display(), models = registry.len(), "loaded model descriptor");
        Ok(registry)
    }

    fn from_document(document: RegistryDocument) -> SchemaResult<Self> {
        if let Some(model) = document.models.iter().find(|m| m.name.is_empty()) {
            return Err(SchemaError::invalid_descriptor(format!(
                "model with {} field(s) has an empty name",
                model.fields.len()
            )));
        }
        Self::from_models(document.models)
    }

    /// Add a model, rejecting a second model with the same name.
    pub fn insert(&mut self, model: Model) -> SchemaResult<()> {
        if self.models.contains_key(model.name()) {
            return Err(SchemaError::duplicate("model", model.name()));
        }
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Builder-style [`ModelRegistry::insert`].
    pub fn with_model(mut self, model: Model) -> SchemaResult<Self> {
        self.insert(model)?;
        Ok(self)
    }

    /// Get a model by name.
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Check if a model exists.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// All model names in insertion order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(|s| s.as_str())
    }

    /// All models in insertion order.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// References to model names that are neither registered nor known to `is_nominal`.
    ///
    /// Returned as `(model, field, referenced)` triples. These are not errors:
    /// the compiler degrades them to plain objects. Hosts can use this to warn early.
    pub fn dangling_references<'a>(
        &'a self,
        is_nominal: impl Fn(&str) -> bool,
    ) -> Vec<(&'a str, &'a str, &'a str)> {
        let mut dangling = Vec::new();
        for model in self.models.values() {
            for field in model.iter_fields() {
                let mut ty = &field.declared_type;
                while let Some(element) = ty.element() {
                    ty = element;
                }
                if let Some(name) = ty.reference_name() {
                    if !self.contains(name) && !is_nominal(name) {
                        dangling.push((model.name(), field.name(), name));
                    }
                }
            }
        }
        dangling
    }
}

impl ModelResolver for ModelRegistry {
    fn resolve_model(&self, name: &str) -> Option<Cow<'_, Model>> {
        self.get(name).map(Cow::Borrowed)
    }
}
