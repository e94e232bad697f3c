//! Root query and mutation assembly, including the relay `node` field.

use std::{collections::BTreeMap, sync::Arc};

use {
    async_graphql::dynamic::TypeRef,
    schemagen_config::EngineConfig,
    schemagen_metadata::{OperationDescriptor, OperationSource},
    tracing::{debug, warn},
};

use crate::{
    accumulator::AbstractTypes,
    definition::{
        ArgumentDefinition, FieldDefinition, InterfaceDefinition, InterfaceFieldDefinition,
        is_list, named_type,
    },
    error::{ConfigurationError, Result},
    generator::BuildContext,
    mapping::TypeMappers,
    registry::TypeRegistry,
    resolver::{NodeResolver, Resolver},
};

/// Everything assembled from one operation source.
#[derive(Debug)]
pub struct RootFields {
    pub queries: Vec<FieldDefinition>,
    pub mutations: Vec<FieldDefinition>,
    pub node_interface: InterfaceDefinition,
    /// Abstract types reachable from any root field or additional type.
    pub abstract_types: AbstractTypes,
    pub types: TypeRegistry,
}

impl RootFields {
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&FieldDefinition> {
        self.queries.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn mutation(&self, name: &str) -> Option<&FieldDefinition> {
        self.mutations.iter().find(|f| f.name == name)
    }

    /// The `node(id)` root field, when any node type has a lookup query.
    #[must_use]
    pub fn node_field(&self) -> Option<&FieldDefinition> {
        self.queries.iter().find(|f| f.resolver.as_node().is_some())
    }
}

/// Assembles root fields from an [`OperationSource`].
#[derive(Debug, Clone)]
pub struct QueryGenerator {
    config: EngineConfig,
    mappers: Arc<TypeMappers>,
}

impl QueryGenerator {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            mappers: Arc::new(TypeMappers::defaults()),
        }
    }

    #[must_use]
    pub fn with_mappers(mut self, mappers: TypeMappers) -> Self {
        self.mappers = Arc::new(mappers);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn assemble_roots(&self, source: &dyn OperationSource) -> Result<RootFields> {
        let mut ctx = BuildContext::new(self.config.clone(), Arc::clone(&self.mappers));
        let mut abstract_types = AbstractTypes::new();
        let mut lookup: BTreeMap<String, OperationDescriptor> = BTreeMap::new();

        let mut queries = Vec::new();
        for operation in source.queries() {
            let assembled = ctx.assemble(&operation, None)?;
            abstract_types.merge(&assembled.abstract_types);

            let ty = &assembled.field.ty;
            if !operation.is_paginated() && !is_list(ty) && ctx.registry().is_node(named_type(ty))
            {
                let type_name = named_type(ty);
                match lookup.get(type_name) {
                    Some(winner) => debug!(
                        type_name,
                        winner = winner.name(),
                        ignored = operation.name(),
                        "node type already has a lookup query"
                    ),
                    None => {
                        debug!(type_name, query = operation.name(), "registered node lookup");
                        lookup.insert(type_name.to_string(), operation.clone());
                    },
                }
            }
            debug!(query = operation.name(), "assembled root query");
            queries.push(assembled.field);
        }

        let mut mutations = Vec::new();
        for operation in source.mutations() {
            let assembled = ctx.assemble(&operation, None)?;
            abstract_types.merge(&assembled.abstract_types);
            debug!(mutation = operation.name(), "assembled root mutation");
            mutations.push(assembled.field);
        }

        for ty in source.additional_types() {
            ctx.output_type(&ty, &mut abstract_types)?;
        }

        if let Some(name) = ctx.registry().unresolved_reference() {
            return Err(ConfigurationError::UnresolvedReference {
                name: name.to_string(),
            }
            .into());
        }
        abstract_types.extend(ctx.registry().deferred_abstract_types());

        let relay = &self.config.relay;
        if lookup.values().any(OperationDescriptor::has_primary_resolver) {
            if queries.iter().any(|f| f.name == relay.node_field) {
                warn!(
                    field = %relay.node_field,
                    "a query already uses the node field name, skipping node lookup"
                );
            } else {
                let resolver =
                    NodeResolver::new(lookup, relay.id_field.clone(), Arc::clone(ctx.codec()));
                queries.push(FieldDefinition {
                    name: relay.node_field.clone(),
                    description: Some("Fetches an object given its global ID".into()),
                    ty: TypeRef::named(relay.node_interface.clone()),
                    arguments: vec![
                        ArgumentDefinition::new(
                            relay.id_field.clone(),
                            TypeRef::named_nn(TypeRef::ID),
                        )
                        .description("Global ID of the object"),
                    ],
                    resolver: Resolver::Node(Arc::new(resolver)),
                });
            }
        }

        Ok(RootFields {
            queries,
            mutations,
            node_interface: InterfaceDefinition {
                name: relay.node_interface.clone(),
                description: Some("An object with a globally unique ID".into()),
                fields: vec![InterfaceFieldDefinition {
                    name: relay.id_field.clone(),
                    description: Some("Global ID of the object".into()),
                    ty: TypeRef::named_nn(TypeRef::ID),
                    arguments: Vec::new(),
                }],
                interfaces: Vec::new(),
            },
            abstract_types,
            types: ctx.into_registry(),
        })
    }
}
