//! Turns one operation into a schema field.

use std::sync::Arc;

use {
    async_graphql::dynamic::TypeRef,
    schemagen_metadata::OperationDescriptor,
    tracing::{debug, trace},
};

use crate::{
    accumulator::AbstractTypes,
    decode::ArgumentDecoder,
    definition::{ArgumentDefinition, FieldDefinition, is_list, named_type},
    error::{ConfigurationError, Result},
    generator::BuildContext,
    output::OutputShape,
    relay::connection::pagination_arguments,
    resolver::{GenericResolver, GlobalIdResolver, Resolver},
    scalars::json_to_gql_value,
};

/// A generated field and the abstract types reachable from it.
#[derive(Debug, Clone)]
pub struct AssembledField {
    pub field: FieldDefinition,
    pub abstract_types: AbstractTypes,
}

impl BuildContext {
    /// Build the field for `operation`.
    ///
    /// `enclosing` names the object type the field is declared on; root
    /// fields have none. Fields of type `ID` encode global IDs of their
    /// enclosing type, so they cannot appear on a root.
    pub fn assemble(
        &mut self,
        operation: &OperationDescriptor,
        enclosing: Option<&str>,
    ) -> Result<AssembledField> {
        let mut abstract_types = AbstractTypes::new();

        let ty = if operation.is_paginated() {
            self.wrap_as_connection(operation.element_type(), &mut abstract_types)?
        } else {
            self.output_type(operation.result_type(), &mut abstract_types)?
        };

        let mut arguments = Vec::with_capacity(operation.arguments().len());
        for argument in operation.arguments() {
            // Each argument gets its own accumulator so one argument's types
            // never leak into another's.
            let mut reachable = AbstractTypes::new();
            let argument_ty = self.input_type(&argument.argument_type, &mut reachable)?;
            trace!(
                operation = operation.name(),
                argument = %argument.name,
                abstract_types = reachable.len(),
                "mapped argument"
            );
            abstract_types.merge(&reachable);
            arguments.push(ArgumentDefinition {
                name: argument.name.clone(),
                description: argument.description.clone(),
                ty: argument_ty,
                default_value: argument.default_value.as_option().map(json_to_gql_value),
            });
        }

        if operation.is_paginated() {
            for argument in pagination_arguments() {
                if !arguments.iter().any(|a| a.name == argument.name) {
                    arguments.push(argument);
                }
            }
        }

        let decoder = ArgumentDecoder::new(
            operation,
            abstract_types.clone(),
            self.config().schema.discriminator.clone(),
        );

        let resolver = if is_global_id(operation, &ty) {
            let Some(enclosing) = enclosing else {
                return Err(ConfigurationError::missing_enclosing_type(operation.name()).into());
            };
            Resolver::GlobalId(Arc::new(GlobalIdResolver::new(
                operation.clone(),
                enclosing,
                decoder,
                Arc::clone(self.codec()),
            )))
        } else {
            let shape = if operation.is_paginated() {
                OutputShape::Object
            } else {
                self.output_shape(operation.result_type())
            };
            Resolver::Generic(Arc::new(GenericResolver::new(
                operation.clone(),
                decoder,
                shape,
            )))
        };

        debug!(
            operation = operation.name(),
            enclosing = enclosing.unwrap_or("<root>"),
            field_type = %ty,
            ?resolver,
            "assembled field"
        );

        Ok(AssembledField {
            field: FieldDefinition {
                name: operation.name().to_string(),
                description: operation.description_text().map(str::to_string),
                ty,
                arguments,
                resolver,
            },
            abstract_types,
        })
    }
}

fn is_global_id(operation: &OperationDescriptor, ty: &TypeRef) -> bool {
    !operation.is_paginated() && !is_list(ty) && named_type(ty) == TypeRef::ID
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {
        super::*,
        crate::{Error, mapping::TypeMappers},
        schemagen_config::EngineConfig,
        schemagen_metadata::{ArgumentDescriptor, DomainType, ObjectType, Primitive},
        serde_json::json,
    };

    fn context() -> BuildContext {
        BuildContext::new(EngineConfig::default(), Arc::new(TypeMappers::defaults()))
    }

    fn user() -> DomainType {
        ObjectType::builder("User")
            .field(OperationDescriptor::new("id", Primitive::Id))
            .field(OperationDescriptor::new("name", Primitive::String))
            .build()
            .into()
    }

    #[test]
    fn paginated_operations_get_connection_and_cursor_arguments() {
        let mut ctx = context();
        let op = OperationDescriptor::new("users", DomainType::page(user()))
            .argument(ArgumentDescriptor::new("nameLike", DomainType::optional(Primitive::String.into())));
        let assembled = ctx.assemble(&op, None).unwrap();

        assert_eq!(assembled.field.ty.to_string(), "UserConnection!");
        assert_eq!(assembled.field.argument_names(), [
            "nameLike", "first", "after", "last", "before"
        ]);
        assert_eq!(
            assembled.field.resolver.as_generic().unwrap().shape(),
            &OutputShape::Object
        );
        assert!(ctx.registry().contains("UserEdge"));
        assert!(ctx.registry().contains("PageInfo"));
    }

    #[test]
    fn declared_pagination_arguments_are_not_duplicated() {
        let mut ctx = context();
        let op = OperationDescriptor::new("users", DomainType::page(user()))
            .argument(ArgumentDescriptor::new("first", Primitive::U8));
        let assembled = ctx.assemble(&op, None).unwrap();
        assert_eq!(assembled.field.argument_names(), ["first", "after", "last", "before"]);
        assert_eq!(assembled.field.argument("first").unwrap().ty.to_string(), "Int!");
    }

    #[test]
    fn id_fields_on_roots_need_an_enclosing_type() {
        let mut ctx = context();
        let op = OperationDescriptor::new("currentUserId", Primitive::Id);
        let err = ctx.assemble(&op, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::MissingEnclosingType { .. })
        ));

        let assembled = ctx.assemble(&op, Some("Session")).unwrap();
        let resolver = assembled.field.resolver.as_global_id().unwrap();
        assert_eq!(resolver.enclosing_type(), "Session");
    }

    #[test]
    fn id_lists_stay_generic() {
        let mut ctx = context();
        let op = OperationDescriptor::new("ids", DomainType::list(Primitive::Id.into()));
        let assembled = ctx.assemble(&op, None).unwrap();
        assert!(assembled.field.resolver.as_generic().is_some());
    }

    #[test]
    fn defaults_and_abstract_arguments() {
        let publication = ObjectType::builder("Publication")
            .abstract_type()
            .field(OperationDescriptor::new("title", Primitive::String))
            .build();
        let op = OperationDescriptor::new("search", DomainType::list(Primitive::String.into()))
            .argument(ArgumentDescriptor::new("limit", Primitive::I32).default_value(json!(10)))
            .argument(ArgumentDescriptor::new(
                "filter",
                DomainType::optional(publication.into()),
            ));

        let mut ctx = context();
        let assembled = ctx.assemble(&op, None).unwrap();
        let limit = assembled.field.argument("limit").unwrap();
        assert_eq!(limit.default_value, Some(async_graphql::Value::from(10)));
        assert!(assembled.field.argument("filter").unwrap().default_value.is_none());
        assert!(assembled.abstract_types.contains("Publication"));

        let decoder = assembled.field.resolver.as_generic().unwrap().decoder();
        assert!(decoder.abstract_types().contains("Publication"));
    }
}
