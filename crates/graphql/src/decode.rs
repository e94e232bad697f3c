//! Converts incoming argument values into JSON for domain code, guided by
//! each argument's declared domain type.

use {
    async_graphql::{Name, Value, indexmap::IndexMap},
    schemagen_metadata::{DomainType, ExecutionContext, ObjectType, OperationDescriptor},
    serde_json::{Map, Value as Json},
};

use crate::{
    accumulator::AbstractTypes,
    error::DecodeError,
    scalars::{accepts, gql_value_to_json},
};

/// Decodes the arguments of one operation.
///
/// Values of abstract types listed in `abstract_types` must name their
/// concrete type in the discriminator field; the field is kept in the output
/// so domain code can route on it.
#[derive(Debug, Clone)]
pub struct ArgumentDecoder {
    arguments: Vec<(String, DomainType)>,
    abstract_types: AbstractTypes,
    discriminator: String,
}

impl ArgumentDecoder {
    #[must_use]
    pub fn new(
        operation: &OperationDescriptor,
        abstract_types: AbstractTypes,
        discriminator: impl Into<String>,
    ) -> Self {
        Self {
            arguments: operation
                .arguments()
                .iter()
                .map(|a| (a.name.clone(), a.argument_type.clone()))
                .collect(),
            abstract_types,
            discriminator: discriminator.into(),
        }
    }

    #[must_use]
    pub fn abstract_types(&self) -> &AbstractTypes {
        &self.abstract_types
    }

    /// Decode every supplied argument. Arguments the operation does not
    /// declare, such as pagination arguments, are converted as-is.
    pub fn decode(
        &self,
        values: &IndexMap<Name, Value>,
        context: &ExecutionContext,
    ) -> Result<Map<String, Json>, DecodeError> {
        let mut decoded = Map::new();
        for (name, value) in values {
            let name = name.as_str();
            let json = match self.arguments.iter().find(|(arg, _)| arg == name) {
                Some((_, ty)) => self.decode_value(name, ty, value, context)?,
                None => to_json(name, value)?,
            };
            decoded.insert(name.to_string(), json);
        }
        Ok(decoded)
    }

    fn decode_value(
        &self,
        path: &str,
        ty: &DomainType,
        value: &Value,
        context: &ExecutionContext,
    ) -> Result<Json, DecodeError> {
        match ty {
            DomainType::Optional(inner) => match value {
                Value::Null => Ok(Json::Null),
                _ => self.decode_value(path, inner, value, context),
            },
            _ if matches!(value, Value::Null) => {
                Err(DecodeError::invalid_argument(path, "must not be null"))
            },
            DomainType::Primitive(primitive) => {
                let json = to_json(path, value)?;
                if accepts(*primitive, &json) {
                    Ok(json)
                } else {
                    Err(DecodeError::invalid_argument(
                        path,
                        format!("{json} is not a valid {}", primitive.rust_name()),
                    ))
                }
            },
            DomainType::List(inner) => match value {
                Value::List(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.decode_value(&format!("{path}[{i}]"), inner, item, context))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Json::Array),
                // A single value coerces to a one-element list.
                single => Ok(Json::Array(vec![self.decode_value(
                    &format!("{path}[0]"),
                    inner,
                    single,
                    context,
                )?])),
            },
            DomainType::Enum(enum_type) => {
                let name = match value {
                    Value::Enum(name) => name.as_str(),
                    Value::String(name) => name.as_str(),
                    _ => {
                        return Err(DecodeError::invalid_argument(path, "expected an enum value"));
                    },
                };
                if enum_type.contains(name) {
                    Ok(Json::String(name.to_string()))
                } else {
                    Err(DecodeError::invalid_argument(
                        path,
                        format!("{name} is not a value of {}", enum_type.name),
                    ))
                }
            },
            DomainType::Object(object) => self.decode_object(path, object, value, context),
            DomainType::Reference(name) => match context.named_type(name) {
                Some(DomainType::Reference(_)) | None => Err(DecodeError::invalid_argument(
                    path,
                    format!("unknown type {name}"),
                )),
                Some(target) => self.decode_value(path, target, value, context),
            },
            DomainType::Page(_) => Err(DecodeError::invalid_argument(
                path,
                "pages cannot be used as input",
            )),
        }
    }

    fn decode_object(
        &self,
        path: &str,
        object: &ObjectType,
        value: &Value,
        context: &ExecutionContext,
    ) -> Result<Json, DecodeError> {
        let Value::Object(fields) = value else {
            return Err(DecodeError::invalid_argument(path, "expected an input object"));
        };

        let concrete = if object.abstract_type && self.abstract_types.contains(&object.name) {
            let type_name = match fields.get(self.discriminator.as_str()) {
                Some(Value::String(name)) => name.as_str(),
                Some(Value::Enum(name)) => name.as_str(),
                _ => {
                    return Err(DecodeError::MissingDiscriminator {
                        type_name: object.name.clone(),
                        discriminator: self.discriminator.clone(),
                    });
                },
            };
            if !context.is_implementation(&object.name, type_name) {
                return Err(DecodeError::UnknownImplementation {
                    abstract_type: object.name.clone(),
                    type_name: type_name.to_string(),
                });
            }
            match context.named_type(type_name) {
                Some(DomainType::Object(concrete)) => Some(concrete),
                _ => None,
            }
        } else {
            None
        };
        let schema_type = concrete.map_or(object, |c| c.as_ref());

        let mut decoded = Map::new();
        for (key, field_value) in fields {
            let key = key.as_str();
            let field_path = format!("{path}.{key}");
            let json = match schema_type.field(key) {
                Some(field) if key != self.discriminator => {
                    self.decode_value(&field_path, field.result_type(), field_value, context)?
                },
                _ => to_json(&field_path, field_value)?,
            };
            decoded.insert(key.to_string(), json);
        }
        Ok(Json::Object(decoded))
    }
}

fn to_json(path: &str, value: &Value) -> Result<Json, DecodeError> {
    gql_value_to_json(value.clone()).map_err(|e| DecodeError::invalid_argument(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {
        super::*,
        schemagen_metadata::{ArgumentDescriptor, EnumType, Primitive},
        serde_json::json,
        std::{
            collections::{BTreeMap, BTreeSet},
            sync::Arc,
        },
    };

    use crate::scalars::json_to_gql_value;

    fn publication() -> Arc<ObjectType> {
        ObjectType::builder("Publication")
            .abstract_type()
            .field(OperationDescriptor::new("title", Primitive::String))
            .build()
    }

    fn book(parent: Arc<ObjectType>) -> Arc<ObjectType> {
        ObjectType::builder("Book")
            .implements(parent)
            .field(OperationDescriptor::new("pages", Primitive::U16))
            .build()
    }

    fn context() -> ExecutionContext {
        let parent = publication();
        ExecutionContext::new()
            .with_implementations(BTreeMap::from([(
                "Publication".to_string(),
                BTreeSet::from(["Book".to_string()]),
            )]))
            .with_named_types(BTreeMap::from([
                ("Book".to_string(), DomainType::Object(book(Arc::clone(&parent)))),
                ("Publication".to_string(), DomainType::Object(parent)),
            ]))
    }

    fn decoder(ty: DomainType) -> ArgumentDecoder {
        let operation = OperationDescriptor::new("op", Primitive::Bool)
            .argument(ArgumentDescriptor::new("arg", ty));
        ArgumentDecoder::new(&operation, ["Publication"].into_iter().collect(), "_type")
    }

    fn args(value: Json) -> IndexMap<Name, Value> {
        IndexMap::from([(Name::new("arg"), json_to_gql_value(&value))])
    }

    #[test]
    fn abstract_values_route_to_concrete_fields() {
        let decoder = decoder(DomainType::Object(publication()));
        let decoded = decoder
            .decode(
                &args(json!({"_type": "Book", "title": "Dune", "pages": 412})),
                &context(),
            )
            .unwrap();
        assert_eq!(
            decoded["arg"],
            json!({"_type": "Book", "title": "Dune", "pages": 412})
        );

        let err = decoder
            .decode(
                &args(json!({"_type": "Book", "pages": 70_000})),
                &context(),
            )
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidArgument { ref path, .. } if path == "arg.pages"));
    }

    #[test]
    fn abstract_values_need_known_implementations() {
        let decoder = decoder(DomainType::Object(publication()));
        let err = decoder
            .decode(&args(json!({"title": "Dune"})), &context())
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminator { .. }));

        let err = decoder
            .decode(&args(json!({"_type": "Magazine"})), &context())
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownImplementation { ref type_name, .. } if type_name == "Magazine"
        ));
    }

    #[test]
    fn enums_lists_and_optionals() {
        let color = EnumType::new("Color", ["RED", "GREEN"]);
        let decoder = decoder(DomainType::list(DomainType::optional(color.into())));
        let values = IndexMap::from([(
            Name::new("arg"),
            Value::List(vec![Value::Enum(Name::new("RED")), Value::Null]),
        )]);
        let decoded = decoder.decode(&values, &context()).unwrap();
        assert_eq!(decoded["arg"], json!(["RED", null]));

        let values = IndexMap::from([(Name::new("arg"), Value::Enum(Name::new("BLUE")))]);
        assert!(decoder.decode(&values, &context()).is_err());
    }

    #[test]
    fn references_resolve_through_context() {
        let book = decoder(DomainType::reference("Book"));
        let decoded = book
            .decode(&args(json!({"title": "Emma", "pages": 3})), &context())
            .unwrap();
        assert_eq!(decoded["arg"]["pages"], 3);

        let missing = decoder(DomainType::reference("Missing"));
        assert!(missing.decode(&args(json!({})), &context()).is_err());
    }

    #[test]
    fn undeclared_arguments_pass_through() {
        let decoder = decoder(Primitive::I32.into());
        let values = IndexMap::from([
            (Name::new("arg"), Value::Number(5.into())),
            (Name::new("first"), Value::Number(10.into())),
        ]);
        let decoded = decoder.decode(&values, &context()).unwrap();
        assert_eq!(Json::Object(decoded), json!({"arg": 5, "first": 10}));
    }

    #[test]
    fn null_only_for_optionals() {
        let decoder = decoder(Primitive::I32.into());
        let values = IndexMap::from([(Name::new("arg"), Value::Null)]);
        assert!(decoder.decode(&values, &context()).is_err());
    }
}
