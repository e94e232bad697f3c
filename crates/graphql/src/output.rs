//! Hands raw JSON results to the execution runtime in the form it expects
//! for the field's schema type.

use {
    async_graphql::{Name, Value, dynamic::FieldValue},
    schemagen_metadata::{DomainType, ExecutionContext},
    serde_json::Value as Json,
};

use crate::{error::DecodeError, scalars::json_to_gql_value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputShape {
    /// Scalars, passed through as values.
    Value,
    /// Enum values, returned by the domain as their name.
    Enum,
    /// Concrete objects; child resolvers read the JSON object.
    Object,
    /// Values of an interface type, resolved to the concrete type named by
    /// the discriminator field.
    Abstract {
        type_name: String,
        discriminator: String,
    },
    List(Box<OutputShape>),
    /// A by-name reference whose target was not mapped yet when the field
    /// was assembled; resolved against the named-type table on each call.
    Deferred {
        type_name: String,
        discriminator: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {expected}, got {found}")]
    Mismatch {
        expected: &'static str,
        found: String,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn mismatch(expected: &'static str, found: &Json) -> ShapeError {
    ShapeError::Mismatch {
        expected,
        found: found.to_string(),
    }
}

impl OutputShape {
    /// `null` becomes `None`, leaving nullability checks to the runtime.
    pub fn to_field_value<'a>(
        &self,
        value: Json,
        context: &ExecutionContext,
    ) -> Result<Option<FieldValue<'a>>, ShapeError> {
        if value.is_null() {
            return Ok(None);
        }
        let field_value = match self {
            Self::Value => FieldValue::value(json_to_gql_value(&value)),
            Self::Enum => match value {
                Json::String(name) => FieldValue::value(Value::Enum(Name::new(name))),
                other => return Err(mismatch("an enum value name", &other)),
            },
            Self::Object => {
                if !value.is_object() {
                    return Err(mismatch("an object", &value));
                }
                FieldValue::owned_any(value)
            },
            Self::Abstract {
                type_name,
                discriminator,
            } => {
                let concrete = match value.get(discriminator) {
                    Some(Json::String(concrete)) => concrete.clone(),
                    _ => {
                        return Err(DecodeError::MissingDiscriminator {
                            type_name: type_name.clone(),
                            discriminator: discriminator.clone(),
                        }
                        .into());
                    },
                };
                FieldValue::owned_any(value).with_type(concrete)
            },
            Self::List(inner) => match value {
                Json::Array(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(
                            inner
                                .to_field_value(item, context)?
                                .unwrap_or(FieldValue::NULL),
                        );
                    }
                    FieldValue::list(values)
                },
                other => return Err(mismatch("a list", &other)),
            },
            Self::Deferred {
                type_name,
                discriminator,
            } => return Self::resolve_deferred(type_name, discriminator, context)
                .to_field_value(value, context),
        };
        Ok(Some(field_value))
    }

    fn resolve_deferred(type_name: &str, discriminator: &str, context: &ExecutionContext) -> Self {
        match context.named_type(type_name) {
            Some(DomainType::Object(object)) if object.abstract_type => Self::Abstract {
                type_name: type_name.to_string(),
                discriminator: discriminator.to_string(),
            },
            _ => Self::Object,
        }
    }
}
