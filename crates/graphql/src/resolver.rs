//! The three resolver kinds a generated field can carry.

use std::{collections::BTreeMap, fmt, sync::Arc};

use {
    async_graphql::{
        Name, Value,
        dynamic::{Field, FieldFuture, FieldValue, ResolverContext, TypeRef},
        indexmap::IndexMap,
    },
    schemagen_metadata::{ExecutionContext, Invocation, OperationDescriptor},
    serde_json::Value as Json,
    tracing::debug,
};

use crate::{
    decode::ArgumentDecoder,
    error::{DecodeError, Error, LookupError, Result, gql_err},
    output::{OutputShape, ShapeError},
    relay::GlobalIdCodec,
};

/// Runs the operation with decoded arguments and returns its result as-is.
#[derive(Debug)]
pub struct GenericResolver {
    operation: OperationDescriptor,
    decoder: ArgumentDecoder,
    shape: OutputShape,
}

impl GenericResolver {
    #[must_use]
    pub fn new(operation: OperationDescriptor, decoder: ArgumentDecoder, shape: OutputShape) -> Self {
        Self {
            operation,
            decoder,
            shape,
        }
    }

    #[must_use]
    pub fn shape(&self) -> &OutputShape {
        &self.shape
    }

    #[must_use]
    pub fn decoder(&self) -> &ArgumentDecoder {
        &self.decoder
    }

    pub async fn call(
        &self,
        source: Option<Json>,
        arguments: &IndexMap<Name, Value>,
        context: Arc<ExecutionContext>,
    ) -> Result<Json> {
        let arguments = self.decoder.decode(arguments, &context)?;
        let call = Invocation {
            source,
            arguments,
            context,
        };
        self.operation
            .invoke(call)
            .await
            .map_err(|e| Error::invocation(self.operation.name(), e))
    }
}

/// Runs the operation and encodes its result as a global ID of the
/// enclosing type.
#[derive(Debug)]
pub struct GlobalIdResolver {
    operation: OperationDescriptor,
    enclosing_type: String,
    decoder: ArgumentDecoder,
    codec: Arc<GlobalIdCodec>,
}

impl GlobalIdResolver {
    #[must_use]
    pub fn new(
        operation: OperationDescriptor,
        enclosing_type: impl Into<String>,
        decoder: ArgumentDecoder,
        codec: Arc<GlobalIdCodec>,
    ) -> Self {
        Self {
            operation,
            enclosing_type: enclosing_type.into(),
            decoder,
            codec,
        }
    }

    #[must_use]
    pub fn enclosing_type(&self) -> &str {
        &self.enclosing_type
    }

    /// `None` when the operation produced no id.
    pub async fn call(
        &self,
        source: Option<Json>,
        arguments: &IndexMap<Name, Value>,
        context: Arc<ExecutionContext>,
    ) -> Result<Option<String>> {
        let arguments = self.decoder.decode(arguments, &context)?;
        let call = Invocation {
            source,
            arguments,
            context,
        };
        let raw = self
            .operation
            .invoke(call)
            .await
            .map_err(|e| Error::invocation(self.operation.name(), e))?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(self.codec.encode_value(&self.enclosing_type, &raw)?))
    }
}

/// Fetches any node by global ID through the query that produces its type.
#[derive(Debug)]
pub struct NodeResolver {
    lookup: BTreeMap<String, OperationDescriptor>,
    id_argument: String,
    codec: Arc<GlobalIdCodec>,
}

impl NodeResolver {
    #[must_use]
    pub fn new(
        lookup: BTreeMap<String, OperationDescriptor>,
        id_argument: impl Into<String>,
        codec: Arc<GlobalIdCodec>,
    ) -> Self {
        Self {
            lookup,
            id_argument: id_argument.into(),
            codec,
        }
    }

    /// Type names reachable through this resolver.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.lookup.keys().map(String::as_str)
    }

    #[must_use]
    pub fn operation_for(&self, type_name: &str) -> Option<&OperationDescriptor> {
        self.lookup.get(type_name)
    }

    /// Decode `global_id` and invoke the producing query with the raw id.
    /// Returns the concrete type name with the query's result.
    pub async fn call(
        &self,
        global_id: &str,
        context: Arc<ExecutionContext>,
    ) -> Result<(String, Json)> {
        let (type_name, raw_id) = self.codec.decode_value(global_id)?;
        let Some(operation) = self.lookup.get(&type_name) else {
            return Err(LookupError::UnknownType { type_name }.into());
        };
        if !operation.has_primary_resolver() {
            return Err(LookupError::NoPrimaryResolver {
                operation: operation.name().to_string(),
            }
            .into());
        }
        let call = Invocation::new(context).with_argument(self.id_argument.clone(), raw_id);
        let result = operation
            .invoke(call)
            .await
            .map_err(|e| Error::invocation(operation.name(), e))?;
        Ok((type_name, result))
    }
}

/// A field's resolver, chosen at assembly time.
#[derive(Clone)]
pub enum Resolver {
    Generic(Arc<GenericResolver>),
    GlobalId(Arc<GlobalIdResolver>),
    Node(Arc<NodeResolver>),
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(r) => write!(f, "Generic({})", r.operation.name()),
            Self::GlobalId(r) => write!(f, "GlobalId({}.{})", r.enclosing_type, r.operation.name()),
            Self::Node(r) => write!(f, "Node({} types)", r.lookup.len()),
        }
    }
}

fn execution_context(ctx: &ResolverContext<'_>) -> Arc<ExecutionContext> {
    ctx.data_opt::<Arc<ExecutionContext>>()
        .cloned()
        .unwrap_or_default()
}

fn parent_value(ctx: &ResolverContext<'_>) -> Option<Json> {
    ctx.parent_value.downcast_ref::<Json>().cloned()
}

fn shape_err(operation: &str, err: ShapeError) -> Error {
    match err {
        ShapeError::Decode(e) => e.into(),
        other => Error::invocation(operation, anyhow::Error::new(other)),
    }
}

impl Resolver {
    #[must_use]
    pub fn is_global_id(&self) -> bool {
        matches!(self, Self::GlobalId(_))
    }

    #[must_use]
    pub fn as_generic(&self) -> Option<&GenericResolver> {
        match self {
            Self::Generic(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_global_id(&self) -> Option<&GlobalIdResolver> {
        match self {
            Self::GlobalId(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&NodeResolver> {
        match self {
            Self::Node(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn into_field(self, name: String, ty: TypeRef) -> Field {
        Field::new(name, ty, move |ctx| {
            let resolver = self.clone();
            FieldFuture::new(async move {
                resolver.resolve(ctx).await.map_err(|e| {
                    debug!(error = %e, "field resolution failed");
                    gql_err(e)
                })
            })
        })
    }

    async fn resolve<'a>(&self, ctx: ResolverContext<'a>) -> Result<Option<FieldValue<'a>>> {
        let context = execution_context(&ctx);
        match self {
            Self::Generic(r) => {
                let value = r
                    .call(
                        parent_value(&ctx),
                        ctx.args.as_index_map(),
                        Arc::clone(&context),
                    )
                    .await?;
                r.shape
                    .to_field_value(value, &context)
                    .map_err(|e| shape_err(r.operation.name(), e))
            },
            Self::GlobalId(r) => {
                let id = r
                    .call(parent_value(&ctx), ctx.args.as_index_map(), context)
                    .await?;
                Ok(id.map(|id| FieldValue::value(Value::String(id))))
            },
            Self::Node(r) => {
                let global_id = match ctx.args.as_index_map().get(r.id_argument.as_str()) {
                    Some(Value::String(id)) => id.clone(),
                    _ => {
                        return Err(DecodeError::malformed_id("", "missing id argument").into());
                    },
                };
                let (type_name, value) = r.call(&global_id, context).await?;
                if value.is_null() {
                    return Ok(None);
                }
                Ok(Some(FieldValue::owned_any(value).with_type(type_name)))
            },
        }
    }
}
