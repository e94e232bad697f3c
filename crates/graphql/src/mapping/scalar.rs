use {async_graphql::dynamic::TypeRef, schemagen_metadata::DomainType};

use crate::{
    accumulator::AbstractTypes,
    error::{ConfigurationError, Result},
    generator::BuildContext,
    mapping::TypeMapper,
    scalars::scalar_kind,
};

/// Primitives map to the same non-null scalar in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarMapper;

impl ScalarMapper {
    fn map(ty: &DomainType, ctx: &mut BuildContext) -> Result<TypeRef> {
        let kind = scalar_kind(ty).ok_or_else(|| ConfigurationError::unmapped(ty))?;
        ctx.registry_mut().use_scalar(kind);
        Ok(TypeRef::named_nn(kind.name()))
    }
}

impl TypeMapper for ScalarMapper {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        matches!(ty, DomainType::Primitive(_))
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
