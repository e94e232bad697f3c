//! Schema finishing: turns assembled root fields into an executable
//! `async_graphql` dynamic schema.

use std::{any::Any, collections::BTreeSet, sync::Arc};

use {
    async_graphql::dynamic::{Object, Schema},
    schemagen_config::EngineConfig,
    schemagen_metadata::{ExecutionContext, OperationSource},
    tracing::debug,
};

use crate::{
    error::{ConfigurationError, Result},
    generator::{QueryGenerator, RootFields},
    mapping::TypeMappers,
};

/// Register everything in `roots` and finish the schema.
///
/// `data` is handed to operations through
/// [`ExecutionContext::data`](schemagen_metadata::ExecutionContext::data).
pub fn build_schema(
    roots: RootFields,
    config: &EngineConfig,
    data: Option<Arc<dyn Any + Send + Sync>>,
) -> Result<Schema> {
    let RootFields {
        queries,
        mutations,
        node_interface,
        abstract_types,
        types,
    } = roots;
    let parts = types.into_parts();

    for type_name in abstract_types.iter() {
        if parts
            .implementations
            .get(type_name)
            .is_none_or(BTreeSet::is_empty)
        {
            return Err(ConfigurationError::NoImplementations {
                type_name: type_name.to_string(),
            }
            .into());
        }
    }

    let names = &config.schema;
    let mutation_type = (!mutations.is_empty()).then_some(names.mutation_type.as_str());
    let mut builder = Schema::build(&names.query_type, mutation_type, None);

    let mut query = Object::new(&names.query_type);
    for field in queries {
        query = query.field(field.into_field());
    }
    builder = builder.register(query);

    if !mutations.is_empty() {
        let mut mutation = Object::new(&names.mutation_type);
        for field in mutations {
            mutation = mutation.field(field.into_field());
        }
        builder = builder.register(mutation);
    }

    let type_count = parts.definitions.len();
    for definition in parts.definitions {
        builder = builder.register(definition.into_dynamic());
    }
    for scalar in parts.scalars.iter().filter_map(|kind| kind.definition()) {
        builder = builder.register(scalar);
    }
    if !parts.node_types.is_empty() {
        builder = builder.register(node_interface.into_interface());
    }

    let mut context = ExecutionContext::new()
        .with_implementations(parts.implementations)
        .with_named_types(parts.domain_types);
    if let Some(data) = data {
        context = context.with_shared_data(data);
    }

    let schema = builder
        .data(Arc::new(context))
        .finish()
        .map_err(|e| ConfigurationError::schema(e.to_string()))?;
    debug!(
        types = type_count,
        scalars = parts.scalars.len(),
        nodes = parts.node_types.len(),
        "schema finished"
    );
    Ok(schema)
}

/// Config, mappers and host data in; executable schema out.
#[derive(Clone)]
pub struct SchemaGenerator {
    config: EngineConfig,
    mappers: TypeMappers,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl SchemaGenerator {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            mappers: TypeMappers::defaults(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_mappers(mut self, mappers: TypeMappers) -> Self {
        self.mappers = mappers;
        self
    }

    /// Host data available to every operation.
    #[must_use]
    pub fn with_data<T: Any + Send + Sync>(self, data: T) -> Self {
        self.with_shared_data(Arc::new(data))
    }

    #[must_use]
    pub fn with_shared_data(mut self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.data = Some(data);
        self
    }

    /// Assemble root fields without finishing a schema.
    pub fn assemble(&self, source: &dyn OperationSource) -> Result<RootFields> {
        QueryGenerator::new(self.config.clone())
            .with_mappers(self.mappers.clone())
            .assemble_roots(source)
    }

    pub fn generate(&self, source: &dyn OperationSource) -> Result<Schema> {
        let roots = self.assemble(source)?;
        build_schema(roots, &self.config, self.data.clone())
    }
}
