//! Schema assembly: the build context shared by mappers and assemblers.

pub mod query;
pub mod roots;

use std::sync::Arc;

use {
    async_graphql::dynamic::TypeRef,
    schemagen_config::EngineConfig,
    schemagen_metadata::DomainType,
};

use crate::{
    accumulator::AbstractTypes,
    definition::named_type,
    error::Result,
    mapping::TypeMappers,
    output::OutputShape,
    registry::TypeRegistry,
    relay::{ConnectionBuilder, GlobalIdCodec},
};

pub use {
    query::AssembledField,
    roots::{QueryGenerator, RootFields},
};

/// Mutable state of one schema assembly pass.
///
/// Passed by `&mut` through mapping and field assembly; nothing in it is
/// shared with resolvers except the `Arc`s they clone out.
pub struct BuildContext {
    config: EngineConfig,
    mappers: Arc<TypeMappers>,
    registry: TypeRegistry,
    connections: ConnectionBuilder,
    codec: Arc<GlobalIdCodec>,
}

impl BuildContext {
    #[must_use]
    pub fn new(config: EngineConfig, mappers: Arc<TypeMappers>) -> Self {
        let codec = Arc::new(GlobalIdCodec::from_kind(config.relay.id_serializer));
        Self::with_codec(config, mappers, codec)
    }

    #[must_use]
    pub fn with_codec(
        config: EngineConfig,
        mappers: Arc<TypeMappers>,
        codec: Arc<GlobalIdCodec>,
    ) -> Self {
        Self {
            connections: ConnectionBuilder::new(config.relay.clone()),
            config,
            mappers,
            registry: TypeRegistry::new(),
            codec,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn codec(&self) -> &Arc<GlobalIdCodec> {
        &self.codec
    }

    /// Resolve the output-side schema type of `ty`.
    pub fn output_type(&mut self, ty: &DomainType, acc: &mut AbstractTypes) -> Result<TypeRef> {
        let mappers = Arc::clone(&self.mappers);
        mappers.output_type(ty, acc, self)
    }

    /// Resolve the input-side schema type of `ty`.
    pub fn input_type(&mut self, ty: &DomainType, acc: &mut AbstractTypes) -> Result<TypeRef> {
        let mappers = Arc::clone(&self.mappers);
        mappers.input_type(ty, acc, self)
    }

    /// Map `element` and return the connection type wrapping it.
    pub fn wrap_as_connection(
        &mut self,
        element: &DomainType,
        acc: &mut AbstractTypes,
    ) -> Result<TypeRef> {
        let element_ref = self.output_type(element, acc)?;
        let connection = self
            .connections
            .connection_type(element, named_type(&element_ref))?;
        self.output_type(&DomainType::Object(connection), acc)
    }

    /// How resolver results of type `ty` are handed to the runtime.
    #[must_use]
    pub fn output_shape(&self, ty: &DomainType) -> OutputShape {
        match ty {
            DomainType::Primitive(_) => OutputShape::Value,
            DomainType::Optional(inner) => self.output_shape(inner),
            DomainType::List(inner) => OutputShape::List(Box::new(self.output_shape(inner))),
            DomainType::Page(_) => OutputShape::Object,
            DomainType::Enum(_) => OutputShape::Enum,
            DomainType::Object(object) if object.abstract_type => OutputShape::Abstract {
                type_name: object.name.clone(),
                discriminator: self.config.schema.discriminator.clone(),
            },
            DomainType::Object(_) => OutputShape::Object,
            DomainType::Reference(name) => match self.registry.domain_type(name) {
                Some(DomainType::Reference(_)) | None => OutputShape::Deferred {
                    type_name: name.clone(),
                    discriminator: self.config.schema.discriminator.clone(),
                },
                Some(target) => self.output_shape(target),
            },
        }
    }

    #[must_use]
    pub fn into_registry(self) -> TypeRegistry {
        self.registry
    }
}
