//! Type mapper dispatch.
//!
//! Each [`TypeMapper`] handles one shape of domain type. [`TypeMappers`]
//! tries them in registration order and the first one that supports a type
//! maps it; mappers recurse through the [`BuildContext`] for nested types.

mod enumeration;
mod object;
mod reference;
mod scalar;
mod wrapper;

use std::sync::Arc;

use {async_graphql::dynamic::TypeRef, schemagen_metadata::DomainType, tracing::trace};

use crate::{
    accumulator::AbstractTypes,
    error::{ConfigurationError, Result},
    generator::BuildContext,
};

pub use {
    enumeration::EnumMapper,
    object::{InterfaceMapper, ObjectMapper},
    reference::ReferenceMapper,
    scalar::ScalarMapper,
    wrapper::{ListMapper, OptionalMapper},
};

/// One mapping strategy.
pub trait TypeMapper: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn supports(&self, ty: &DomainType) -> bool;

    fn to_output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef>;

    fn to_input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef>;
}

/// Ordered set of mappers. Registration order is significant.
#[derive(Clone, Default)]
pub struct TypeMappers {
    mappers: Vec<Arc<dyn TypeMapper>>,
}

impl std::fmt::Debug for TypeMappers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl TypeMappers {
    /// No mappers at all; every type is unmapped.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in mappers, in their default order.
    #[must_use]
    pub fn defaults() -> Self {
        Self::empty().with_defaults()
    }

    /// Append `mapper`; it is consulted after every mapper registered so far.
    #[must_use]
    pub fn register(mut self, mapper: impl TypeMapper + 'static) -> Self {
        self.mappers.push(Arc::new(mapper));
        self
    }

    /// Append the built-in mappers.
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.register(ScalarMapper)
            .register(OptionalMapper)
            .register(ListMapper)
            .register(EnumMapper)
            .register(ReferenceMapper)
            .register(InterfaceMapper)
            .register(ObjectMapper)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    /// The first mapper that supports `ty`.
    pub fn select(&self, ty: &DomainType) -> Result<&dyn TypeMapper> {
        let mapper = self
            .mappers
            .iter()
            .find(|m| m.supports(ty))
            .ok_or_else(|| ConfigurationError::unmapped(ty))?;
        trace!(domain_type = %ty, mapper = mapper.name(), "selected type mapper");
        Ok(mapper.as_ref())
    }

    pub fn output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        self.select(ty)?.to_output_type(ty, acc, ctx)
    }

    pub fn input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        self.select(ty)?.to_input_type(ty, acc, ctx)
    }
}

/// Drop the outermost non-null wrapper, if any.
pub(crate) fn nullable(ty: TypeRef) -> TypeRef {
    match ty {
        TypeRef::NonNull(inner) => *inner,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {
        super::*,
        crate::Error,
        schemagen_config::EngineConfig,
        schemagen_metadata::{EnumType, ObjectType, OperationDescriptor, Primitive},
    };

    fn context() -> BuildContext {
        BuildContext::new(EngineConfig::default(), Arc::new(TypeMappers::defaults()))
    }

    fn output(ctx: &mut BuildContext, ty: &DomainType) -> String {
        ctx.output_type(ty, &mut AbstractTypes::new())
            .unwrap()
            .to_string()
    }

    #[test]
    fn default_order() {
        assert_eq!(TypeMappers::defaults().names(), [
            "scalar",
            "optional",
            "list",
            "enum",
            "reference",
            "interface",
            "object"
        ]);
    }

    #[test]
    fn wrappers_control_nullability() {
        let mut ctx = context();
        assert_eq!(output(&mut ctx, &Primitive::I32.into()), "Int!");
        assert_eq!(
            output(&mut ctx, &DomainType::optional(Primitive::I64.into())),
            "Long"
        );
        assert_eq!(
            output(&mut ctx, &DomainType::list(Primitive::String.into())),
            "[String!]!"
        );
        assert_eq!(
            output(
                &mut ctx,
                &DomainType::optional(DomainType::list(DomainType::optional(
                    Primitive::Uuid.into()
                )))
            ),
            "[UUID]"
        );
    }

    #[test]
    fn no_mapper_is_unmapped() {
        let mut ctx = BuildContext::new(EngineConfig::default(), Arc::new(TypeMappers::empty()));
        let err = ctx
            .output_type(&Primitive::Bool.into(), &mut AbstractTypes::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::UnmappedType { ref domain_type })
                if domain_type == "bool"
        ));
    }

    #[test]
    fn pages_outside_results_are_unmapped() {
        let mut ctx = context();
        let ty = DomainType::list(DomainType::page(Primitive::I32.into()));
        let err = ctx.output_type(&ty, &mut AbstractTypes::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::UnmappedType { .. })
        ));
    }

    #[test]
    fn mapping_is_idempotent() {
        let mut ctx = context();
        let color: DomainType = EnumType::new("Color", ["RED"]).into();
        let user: DomainType = ObjectType::builder("User")
            .field(OperationDescriptor::new("favorite", color.clone()))
            .build()
            .into();
        let first = output(&mut ctx, &user);
        let second = output(&mut ctx, &user);
        assert_eq!(first, "User!");
        assert_eq!(first, second);
        let input_first = ctx.input_type(&user, &mut AbstractTypes::new()).unwrap();
        let input_second = ctx.input_type(&user, &mut AbstractTypes::new()).unwrap();
        assert_eq!(input_first, input_second);
        assert_eq!(input_first.to_string(), "UserInput!");
    }

    #[test]
    fn distinct_types_with_one_name_collide() {
        let mut ctx = context();
        let a: DomainType = ObjectType::builder("Item")
            .qualified_name("shop::Item")
            .field(OperationDescriptor::new("sku", Primitive::String))
            .build()
            .into();
        let b: DomainType = ObjectType::builder("Item")
            .qualified_name("blog::Item")
            .field(OperationDescriptor::new("slug", Primitive::String))
            .build()
            .into();
        output(&mut ctx, &a);
        let err = ctx.output_type(&b, &mut AbstractTypes::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::TypeNameCollision { .. })
        ));
    }
}
