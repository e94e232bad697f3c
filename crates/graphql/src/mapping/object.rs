use std::sync::Arc;

use {
    async_graphql::dynamic::TypeRef,
    schemagen_metadata::{DomainType, ObjectType},
};

use crate::{
    accumulator::AbstractTypes,
    definition::{
        ArgumentDefinition, InputObjectDefinition, InterfaceDefinition, ObjectDefinition,
        TypeDefinition,
    },
    error::{ConfigurationError, Result},
    generator::BuildContext,
    mapping::TypeMapper,
    registry::Claim,
};

fn object_of(ty: &DomainType) -> Result<&Arc<ObjectType>> {
    match ty {
        DomainType::Object(object) => Ok(object),
        other => Err(ConfigurationError::unmapped(other).into()),
    }
}

fn input_key(object: &ObjectType) -> String {
    format!("{} as input", object.qualified_name)
}

fn input_name(object: &ObjectType, ctx: &BuildContext) -> String {
    format!("{}{}", object.name, ctx.config().schema.input_suffix)
}

/// Map every abstract supertype and return their schema names.
fn map_supertypes(
    object: &ObjectType,
    acc: &mut AbstractTypes,
    ctx: &mut BuildContext,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for parent in object.supertypes() {
        if parent.abstract_type {
            let name = parent.name.clone();
            ctx.output_type(&DomainType::Object(parent), acc)?;
            names.push(name);
        }
    }
    Ok(names)
}

/// Input fields of an object: the fields that take no arguments.
fn input_fields(
    object: &ObjectType,
    acc: &mut AbstractTypes,
    ctx: &mut BuildContext,
) -> Result<Vec<ArgumentDefinition>> {
    let mut fields = Vec::new();
    for field in object.all_fields() {
        if !field.arguments().is_empty() || field.is_paginated() {
            continue;
        }
        fields.push(ArgumentDefinition {
            name: field.name().to_string(),
            description: field.description_text().map(str::to_string),
            ty: ctx.input_type(field.result_type(), acc)?,
            default_value: None,
        });
    }
    Ok(fields)
}

/// Abstract object types become interfaces on output and discriminated
/// input objects on input. Both directions record the type in the
/// accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceMapper;

impl TypeMapper for InterfaceMapper {
    fn name(&self) -> &'static str {
        "interface"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        ty.is_abstract()
    }

    fn to_output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        let object = object_of(ty)?;
        acc.insert(object.name.clone());

        match ctx
            .registry_mut()
            .claim(&object.name, &object.qualified_name)?
        {
            Claim::Existing(reachable) => acc.merge(&reachable),
            Claim::New => {
                ctx.registry_mut().record_domain(&object.name, ty);
                let mut reachable = AbstractTypes::new();
                reachable.insert(object.name.clone());
                let interfaces = map_supertypes(object, &mut reachable, ctx)?;

                let mut fields = Vec::new();
                for field in object.all_fields() {
                    let assembled = ctx.assemble(field, Some(&object.name))?;
                    reachable.merge(&assembled.abstract_types);
                    fields.push(assembled.field.to_interface_field());
                }

                ctx.registry_mut().complete(
                    TypeDefinition::Interface(InterfaceDefinition {
                        name: object.name.clone(),
                        description: object.description.clone(),
                        fields,
                        interfaces,
                    }),
                    reachable.clone(),
                );
                acc.merge(&reachable);
            },
        }
        Ok(TypeRef::named_nn(object.name.clone()))
    }

    fn to_input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        let object = object_of(ty)?;
        acc.insert(object.name.clone());
        let name = input_name(object, ctx);

        match ctx.registry_mut().claim(&name, &input_key(object))? {
            Claim::Existing(reachable) => acc.merge(&reachable),
            Claim::New => {
                let mut reachable = AbstractTypes::new();
                reachable.insert(object.name.clone());
                let mut fields = input_fields(object, &mut reachable, ctx)?;

                let discriminator = ctx.config().schema.discriminator.clone();
                if !fields.iter().any(|f| f.name == discriminator) {
                    fields.push(
                        ArgumentDefinition::new(discriminator, TypeRef::named_nn(TypeRef::STRING))
                            .description(format!(
                                "Name of the concrete type implementing {}",
                                object.name
                            )),
                    );
                }

                ctx.registry_mut().complete(
                    TypeDefinition::InputObject(InputObjectDefinition {
                        name: name.clone(),
                        description: object.description.clone(),
                        fields,
                    }),
                    reachable.clone(),
                );
                acc.merge(&reachable);
            },
        }
        Ok(TypeRef::named_nn(name))
    }
}

/// Concrete object types. Output objects implement their abstract
/// supertypes, and the node interface when they expose a global ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectMapper;

impl TypeMapper for ObjectMapper {
    fn name(&self) -> &'static str {
        "object"
    }

    fn supports(&self, ty: &DomainType) -> bool {
        matches!(ty, DomainType::Object(object) if !object.abstract_type)
    }

    fn to_output_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        let object = object_of(ty)?;

        match ctx
            .registry_mut()
            .claim(&object.name, &object.qualified_name)?
        {
            Claim::Existing(reachable) => acc.merge(&reachable),
            Claim::New => {
                ctx.registry_mut().record_domain(&object.name, ty);
                let mut reachable = AbstractTypes::new();
                let mut interfaces = map_supertypes(object, &mut reachable, ctx)?;
                for parent in &interfaces {
                    ctx.registry_mut().add_implementation(parent, &object.name);
                }

                let mut fields = Vec::new();
                for field in object.all_fields() {
                    let assembled = ctx.assemble(field, Some(&object.name))?;
                    reachable.merge(&assembled.abstract_types);
                    fields.push(assembled.field);
                }

                let relay = &ctx.config().relay;
                let is_node = fields.iter().any(|f| {
                    f.name == relay.id_field
                        && f.resolver.is_global_id()
                        && f.ty == TypeRef::named_nn(TypeRef::ID)
                });
                if is_node {
                    interfaces.push(relay.node_interface.clone());
                    ctx.registry_mut().mark_node(&object.name);
                }

                ctx.registry_mut().complete(
                    TypeDefinition::Object(ObjectDefinition {
                        name: object.name.clone(),
                        description: object.description.clone(),
                        fields,
                        interfaces,
                    }),
                    reachable.clone(),
                );
                acc.merge(&reachable);
            },
        }
        Ok(TypeRef::named_nn(object.name.clone()))
    }

    fn to_input_type(
        &self,
        ty: &DomainType,
        acc: &mut AbstractTypes,
        ctx: &mut BuildContext,
    ) -> Result<TypeRef> {
        let object = object_of(ty)?;
        let name = input_name(object, ctx);

        match ctx.registry_mut().claim(&name, &input_key(object))? {
            Claim::Existing(reachable) => acc.merge(&reachable),
            Claim::New => {
                let mut reachable = AbstractTypes::new();
                let fields = input_fields(object, &mut reachable, ctx)?;
                ctx.registry_mut().complete(
                    TypeDefinition::InputObject(InputObjectDefinition {
                        name: name.clone(),
                        description: object.description.clone(),
                        fields,
                    }),
                    reachable.clone(),
                );
                acc.merge(&reachable);
            },
        }
        Ok(TypeRef::named_nn(name))
    }
}
