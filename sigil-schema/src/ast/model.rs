//! Model definitions for the Sigil AST.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::Field;
use crate::error::{SchemaError, SchemaResult};

/// An annotated data model, as handed over by the extraction step.
///
/// Fields keep their declaration order and are unique by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelDescriptor", into = "ModelDescriptor")]
pub struct Model {
    /// Model name. Identifies the model within one compilation run.
    pub name: SmolStr,
    /// Model fields in declaration order.
    pub fields: IndexMap<SmolStr, Field>,
}

impl Model {
    /// Create a new model with no fields.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Get the model name as a string.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Add a field, replacing any field with the same name in place.
    pub fn add_field(&mut self, field: Field) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Add a field, rejecting duplicate names.
    pub fn try_add_field(&mut self, field: Field) -> SchemaResult<()> {
        if self.fields.contains_key(field.name()) {
            return Err(SchemaError::duplicate(
                "field",
                format!("{}.{}", self.name, field.name),
            ));
        }
        self.add_field(field);
        Ok(())
    }

    /// Builder-style [`Model::add_field`].
    pub fn with_field(mut self, field: Field) -> Self {
        self.add_field(field);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Iterate over fields in declaration order.
    pub fn iter_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Names of the types this model's fields reference directly or as array elements.
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for field in self.fields.values() {
            let mut ty = &field.declared_type;
            while let Some(element) = ty.element() {
                ty = element;
            }
            if let Some(name) = ty.reference_name() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Serialized form of a [`Model`]: fields as an ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelDescriptor {
    name: SmolStr,
    #[serde(default)]
    fields: Vec<Field>,
}

impl TryFrom<ModelDescriptor> for Model {
    type Error = SchemaError;

    fn try_from(descriptor: ModelDescriptor) -> SchemaResult<Self> {
        let mut model = Model::new(descriptor.name);
        for field in descriptor.fields {
            model.try_add_field(field)?;
        }
        Ok(model)
    }
}

impl From<Model> for ModelDescriptor {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            fields: model.fields.into_values().collect(),
        }
    }
}
