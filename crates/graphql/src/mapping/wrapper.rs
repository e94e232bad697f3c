use {async_graphql::dynamic::TypeRef, schemagen_metadata::DomainType};

use crate::{
    accumulator::AbstractTypes,
    error::{ConfigurationError, Result},
    generator::BuildContext,
    mapping::{TypeMapper, nullable},
};

/// `Optional<T>`: the mapping of `T` without its non-null wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalMapper;

fn optional_inner(ty: &DomainType) -> Result<&DomainType> {
    match ty {
        DomainType::Optional(inner) => Ok(inner.as_ref()),
        other => Err(ConfigurationError::unmapped(other).into()),
    }
}

impl TypeMapper for OptionalMapper {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        matches!(ty, DomainType::Optional(_))
    }

    fn to_output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        Ok(nullable(ctx.output_type(optional_inner(ty)?, acc)?))
    }

    fn to_input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        Ok(nullable(ctx.input_type(optional_inner(ty)?, acc)?))
    }
}

/// `List<T>`: a non-null list of the mapping of `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListMapper;

fn list_inner(ty: &DomainType) -> Result<&DomainType> {
    match ty {
        DomainType::List(inner) => Ok(inner.as_ref()),
        other => Err(ConfigurationError::unmapped(other).into()),
    }
}

fn non_null_list(element: TypeRef) -> TypeRef {
    TypeRef::NonNull(Box::new(TypeRef::List(Box::new(element))))
}

impl TypeMapper for ListMapper {
    fn name(&self) -> &'static str {
        "list"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        matches!(ty, DomainType::List(_))
    }

    fn to_output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        Ok(non_null_list(ctx.output_type(list_inner(ty)?, acc)?))
    }

    fn to_input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        Ok(non_null_list(ctx.input_type(list_inner(ty)?, acc)?))
    }
}
