use {async_graphql::dynamic::TypeRef, schemagen_metadata::DomainType, tracing::trace};

use crate::{
    accumulator::AbstractTypes,
    error::{ConfigurationError, Result},
    generator::BuildContext,
    mapping::TypeMapper,
};

/// A by-name reference to a named type, used to tie recursive or mutually
/// recursive domain graphs together.
///
/// Output references to types not mapped yet are deferred and checked when
/// assembly finishes; input references must already be known.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceMapper;

fn target(ty: &DomainType, ctx: &BuildContext) -> Result<Option<DomainType>> {
    let DomainType::Reference(name) = ty else {
        return Err(ConfigurationError::unmapped(ty).into());
    };
    Ok(match ctx.registry().domain_type(name) {
        Some(DomainType::Reference(_)) | None => None,
        Some(target) => Some(target.clone()),
    })
}

impl TypeMapper for ReferenceMapper {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        matches!(ty, DomainType::Reference(_))
    }

    fn to_output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        match target(ty, ctx)? {
            Some(target) => ctx.output_type(&target, acc),
            None => {
                let name = ty.key();
                trace!(type_name = %name, "deferring reference");
                ctx.registry_mut().defer_reference(&name);
                Ok(TypeRef::named_nn(name))
            },
        }
    }

    fn to_input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        match target(ty, ctx)? {
            Some(target) => ctx.input_type(&target, acc),
            None => Err(ConfigurationError::UnresolvedReference { name: ty.key() }.into()),
        }
    }
}
