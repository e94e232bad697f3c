//! Inspectable schema definitions produced by assembly.
//!
//! Assembly builds these plain structs so tests and callers can look at what
//! was generated; they become `async_graphql::dynamic` values only when the
//! schema is finished.

use async_graphql::{
    Value,
    dynamic::{
        Enum, Field, InputObject, InputValue, Interface, InterfaceField, Object, Type, TypeRef,
    },
};

use crate::resolver::Resolver;

/// The innermost named type of a type reference.
#[must_use]
pub fn named_type(ty: &TypeRef) -> &str {
    match ty {
        TypeRef::Named(name) => name,
        TypeRef::NonNull(inner) | TypeRef::List(inner) => named_type(inner),
    }
}

/// Whether a list wrapper appears anywhere in the reference.
#[must_use]
pub fn is_list(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Named(_) => false,
        TypeRef::List(_) => true,
        TypeRef::NonNull(inner) => is_list(inner),
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    /// `None` when the argument declares no default at all.
    pub default_value: Option<Value>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn into_input_value(self) -> InputValue {
        let mut value = InputValue::new(self.name, self.ty);
        if let Some(description) = self.description {
            value = value.description(description);
        }
        if let Some(default) = self.default_value {
            value = value.default_value(default);
        }
        value
    }
}

/// A field of an object or root type together with its resolver.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub arguments: Vec<ArgumentDefinition>,
    pub resolver: Resolver,
}

impl FieldDefinition {
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn argument_names(&self) -> Vec<&str> {
        self.arguments.iter().map(|a| a.name.as_str()).collect()
    }

    /// The same field without its resolver, as declared on an interface.
    #[must_use]
    pub fn to_interface_field(&self) -> InterfaceFieldDefinition {
        InterfaceFieldDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            ty: self.ty.clone(),
            arguments: self.arguments.clone(),
        }
    }

    pub fn into_field(self) -> Field {
        let mut field = self.resolver.into_field(self.name, self.ty);
        if let Some(description) = self.description {
            field = field.description(description);
        }
        for argument in self.arguments {
            field = field.argument(argument.into_input_value());
        }
        field
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceFieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub arguments: Vec<ArgumentDefinition>,
}

impl InterfaceFieldDefinition {
    fn into_interface_field(self) -> InterfaceField {
        let mut field = InterfaceField::new(self.name, self.ty);
        if let Some(description) = self.description {
            field = field.description(description);
        }
        for argument in self.arguments {
            field = field.argument(argument.into_input_value());
        }
        field
    }
}

#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub interfaces: Vec<String>,
}

impl ObjectDefinition {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn into_object(self) -> Object {
        let mut object = Object::new(self.name);
        if let Some(description) = self.description {
            object = object.description(description);
        }
        for field in self.fields {
            object = object.field(field.into_field());
        }
        for interface in self.interfaces {
            object = object.implement(interface);
        }
        object
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<InterfaceFieldDefinition>,
    pub interfaces: Vec<String>,
}

impl InterfaceDefinition {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&InterfaceFieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn into_interface(self) -> Interface {
        let mut interface = Interface::new(self.name);
        if let Some(description) = self.description {
            interface = interface.description(description);
        }
        for field in self.fields {
            interface = interface.field(field.into_interface_field());
        }
        for parent in self.interfaces {
            interface = interface.implement(parent);
        }
        interface
    }
}

#[derive(Debug, Clone)]
pub struct InputObjectDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<ArgumentDefinition>,
}

impl InputObjectDefinition {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

/// Any named, non-scalar type the generator registers.
#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Object(ObjectDefinition),
    Interface(InterfaceDefinition),
    InputObject(InputObjectDefinition),
    Enum(EnumDefinition),
}

impl TypeDefinition {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::InputObject(def) => &def.name,
            Self::Enum(def) => &def.name,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectDefinition> {
        match self {
            Self::Object(def) => Some(def),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_interface(&self) -> Option<&InterfaceDefinition> {
        match self {
            Self::Interface(def) => Some(def),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_input_object(&self) -> Option<&InputObjectDefinition> {
        match self {
            Self::InputObject(def) => Some(def),
            _ => None,
        }
    }

    pub fn into_dynamic(self) -> Type {
        match self {
            Self::Object(def) => def.into_object().into(),
            Self::Interface(def) => def.into_interface().into(),
            Self::InputObject(def) => {
                let mut input = InputObject::new(def.name);
                if let Some(description) = def.description {
                    input = input.description(description);
                }
                for field in def.fields {
                    input = input.field(field.into_input_value());
                }
                input.into()
            },
            Self::Enum(def) => {
                let mut item = Enum::new(def.name);
                if let Some(description) = def.description {
                    item = item.description(description);
                }
                for value in def.values {
                    item = item.item(value);
                }
                item.into()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_type_sees_through_wrappers() {
        let ty = TypeRef::named_nn_list_nn("UserEdge");
        assert_eq!(named_type(&ty), "UserEdge");
        assert!(is_list(&ty));
        assert!(!is_list(&TypeRef::named_nn(TypeRef::ID)));
    }
}
