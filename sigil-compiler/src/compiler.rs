//! The model compiler.
//!
//! [`SchemaCompiler`] walks a model's fields in order, resolves each declared
//! type (re-entering itself for nested models), specializes array items and
//! applies annotations. Results are cached under the name they were requested
//! by, and a reference to a model that is still being compiled becomes an
//! object stub.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use tracing::{debug, info, instrument, warn};

use sigil_schema::{
    Annotation, DeclaredType, Field, Model, ModelRegistry, ModelResolver, SchemaError,
    SchemaResult, SigilConfig,
};

use crate::annotations::AnnotationMapper;
use crate::array::ArraySpecializer;
use crate::cache::{CacheStats, Lookup, SchemaCache};
use crate::options::CompilerOptions;
use crate::output::{CompiledSchema, PropertySchema, Schema};
use crate::resolve::{NestedSchema, TypeResolver};

/// Compiles models into schemas.
///
/// A compiler owns its cache. Sharing one compiler (for example behind an
/// `Arc`) across threads is safe; each model is still compiled only once.
#[derive(Debug)]
pub struct SchemaCompiler<R> {
    resolver: R,
    options: CompilerOptions,
    mapper: AnnotationMapper,
    default_item: DeclaredType,
    cache: SchemaCache,
}

impl<R: ModelResolver> SchemaCompiler<R> {
    /// Create a compiler with default options.
    pub fn new(resolver: R) -> Self {
        Self::with_options(resolver, CompilerOptions::default())
    }

    /// Create a compiler with the given options.
    pub fn with_options(resolver: R, options: CompilerOptions) -> Self {
        Self {
            resolver,
            mapper: AnnotationMapper::new(options.number_format),
            default_item: DeclaredType::primitive(options.default_item_type),
            options,
            cache: SchemaCache::new(),
        }
    }

    /// Create a compiler from a `sigil.toml` configuration.
    ///
    /// Fails with [`SchemaError::ConfigError`] if the configuration does not certify.
    pub fn from_config(resolver: R, config: &SigilConfig) -> SchemaResult<Self> {
        Ok(Self::with_options(resolver, CompilerOptions::from_config(config)?))
    }

    /// Get the options.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Get the model resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Get the schema cache.
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Compile a model by name.
    ///
    /// Fails with [`SchemaError::ModelNotFound`] only when `name` itself is
    /// unknown. Missing nested models degrade to plain objects.
    #[instrument(level = "debug", skip(self))]
    pub fn compile(&self, name: &str) -> SchemaResult<Arc<CompiledSchema>> {
        if let Lookup::Hit(compiled) = self.cache.lookup(name) {
            debug!("schema cache hit");
            return Ok(compiled);
        }

        let _guard = self.cache.lock_compilation();
        self.prepare_run();
        if let Lookup::Hit(compiled) = self.cache.lookup(name) {
            return Ok(compiled);
        }

        let model = self
            .resolver
            .resolve_model(name)
            .ok_or_else(|| SchemaError::model_not_found(name))?;
        Ok(self.compile_fresh(SmolStr::new(name), &model))
    }

    /// Compile a model that is already in hand.
    ///
    /// Models are identified by name: if a model with this name is already
    /// cached, the cached schema is returned.
    #[instrument(level = "debug", skip_all, fields(model = %model.name))]
    pub fn compile_model(&self, model: &Model) -> Arc<CompiledSchema> {
        if let Lookup::Hit(compiled) = self.cache.lookup(model.name()) {
            return compiled;
        }

        let _guard = self.cache.lock_compilation();
        self.prepare_run();
        if let Lookup::Hit(compiled) = self.cache.lookup(model.name()) {
            return compiled;
        }
        self.compile_fresh(model.name.clone(), model)
    }

    /// Compile several models by name, keeping the given order.
    ///
    /// The result is keyed by the requested names. Stops at the first name the
    /// resolver does not know.
    pub fn compile_all<'n>(
        &self,
        names: impl IntoIterator<Item = &'n str>,
    ) -> SchemaResult<IndexMap<SmolStr, Schema>> {
        let mut schemas = IndexMap::new();
        for name in names {
            let compiled = self.compile(name)?;
            schemas.insert(SmolStr::new(name), compiled.schema.clone());
        }
        info!(count = schemas.len(), "compiled schemas");
        Ok(schemas)
    }

    fn prepare_run(&self) {
        let stale = self.cache.discard_in_progress();
        if stale > 0 {
            warn!(stale, "discarded markers from an interrupted compilation");
        }
    }

    /// Compile `model` and cache it under `key`.
    ///
    /// `key` is the name the model was requested by. A resolver may answer
    /// with a model of a different name, and cycle detection must follow the
    /// requested name or an aliased self reference would never hit the marker.
    fn compile_fresh(&self, key: SmolStr, model: &Model) -> Arc<CompiledSchema> {
        if key != model.name {
            debug!(requested = %key, model = %model.name, "resolver returned an aliased model");
        }
        debug!(model = %model.name, fields = model.fields.len(), "compiling model");
        self.cache.begin(&key);

        let mut properties = IndexMap::with_capacity(model.fields.len());
        let mut required = IndexSet::new();
        for field in model.iter_fields() {
            let property = self.compile_field(field, &mut required);
            properties.insert(field.name.clone(), property);
        }

        let compiled = Arc::new(CompiledSchema::new(
            model.name.clone(),
            Schema::new(properties, required),
        ));
        self.cache.complete(&key, Arc::clone(&compiled));
        compiled
    }

    fn compile_field(&self, field: &Field, required: &mut IndexSet<SmolStr>) -> PropertySchema {
        let mut property = self.resolve_property(&field.declared_type);
        let element_annotations: Vec<&Annotation> = field.element_annotations().collect();

        if property.is_array() {
            property.items = Some(Box::new(
                self.specialize_items(&field.declared_type, &element_annotations),
            ));
        }

        self.mapper
            .apply(field.field_annotations(), &mut property, field.name(), required);

        // An annotation can turn a scalar into an array after the fact.
        if property.is_array() && property.items.is_none() {
            property.items = Some(Box::new(
                self.specialize_items(&field.declared_type, &element_annotations),
            ));
        }

        property.normalize();
        property
    }

    fn specialize_items(
        &self,
        declared: &DeclaredType,
        annotations: &[&Annotation],
    ) -> PropertySchema {
        ArraySpecializer::new(&self.mapper, &self.default_item).specialize(
            declared.element(),
            annotations,
            &mut |ty| self.resolve_property(ty),
        )
    }

    fn resolve_property(&self, declared: &DeclaredType) -> PropertySchema {
        TypeResolver::new(&self.options)
            .resolve(declared, &mut |name| self.compile_reference(name))
            .into_property()
    }

    fn compile_reference(&self, name: &str) -> NestedSchema {
        match self.cache.lookup(name) {
            Lookup::Hit(compiled) => NestedSchema::Compiled(compiled),
            Lookup::InProgress => {
                debug!(model = name, "reference cycle, emitting object stub");
                self.cache.record_stub();
                NestedSchema::Stub
            }
            Lookup::Miss => match self.resolver.resolve_model(name) {
                Some(model) => {
                    NestedSchema::Compiled(self.compile_fresh(SmolStr::new(name), &model))
                }
                None => {
                    warn!(model = name, "referenced model not found, using plain object");
                    NestedSchema::Missing
                }
            },
        }
    }
}

impl SchemaCompiler<ModelRegistry> {
    /// Compile every model in the registry, in registration order.
    pub fn compile_registry(&self) -> IndexMap<SmolStr, Schema> {
        let mut schemas = IndexMap::with_capacity(self.resolver.len());
        for model in self.resolver.models() {
            let compiled = self.compile_model(model);
            schemas.insert(compiled.name.clone(), compiled.schema.clone());
        }
        info!(count = schemas.len(), "compiled registry");
        schemas
    }
}
