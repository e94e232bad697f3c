use {async_graphql::dynamic::TypeRef, schemagen_metadata::DomainType};

use crate::{
    accumulator::AbstractTypes,
    definition::{EnumDefinition, TypeDefinition},
    error::{ConfigurationError, Result},
    generator::BuildContext,
    mapping::TypeMapper,
    registry::Claim,
};

/// Enums are registered once and usable in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumMapper;

impl EnumMapper {
    fn map(ty: &DomainType, ctx: &mut BuildContext) -> Result<TypeRef> {
        let DomainType::Enum(enum_type) = ty else {
            return Err(ConfigurationError::unmapped(ty).into());
        };
        let registry = ctx.registry_mut();
        if let Claim::New = registry.claim(&enum_type.name, &enum_type.qualified_name)? {
            registry.record_domain(&enum_type.name, ty);
            registry.complete(
                TypeDefinition::Enum(EnumDefinition {
                    name: enum_type.name.clone(),
                    description: enum_type.description.clone(),
                    values: enum_type.values.clone(),
                }),
                AbstractTypes::new(),
            );
        }
        Ok(TypeRef::named_nn(enum_type.name.clone()))
    }
}

impl TypeMapper for EnumMapper {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        matches!(ty, DomainType::Enum(_))
    }

    fn to_output_type(
        &self,
        ty: &DomainType,
        _acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        Self::map(ty, ctx)
    }

    fn to_input_type(
        &self,
        ty: &DomainType,
        _acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        Self::map(ty, ctx)
    }
}
