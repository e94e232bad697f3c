//! Operation and argument descriptors plus the invocation contract.

use std::{fmt, future::Future, sync::Arc};

use {
    async_trait::async_trait,
    serde::de::DeserializeOwned,
    serde_json::{Map, Value},
};

use crate::{context::ExecutionContext, domain::DomainType};

/// Everything a thunk receives when its field is requested.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The parent object's value, or `None` for root operations.
    pub source: Option<Value>,
    /// Decoded argument values keyed by argument name.
    pub arguments: Map<String, Value>,
    pub context: Arc<ExecutionContext>,
}

impl Invocation {
    #[must_use]
    pub fn new(context: Arc<ExecutionContext>) -> Self {
        Self {
            source: None,
            arguments: Map::new(),
            context,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Value) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Deserialize an argument, treating absent and `null` alike.
    pub fn argument_as<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<Option<T>> {
        match self.arguments.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| anyhow::anyhow!("argument `{name}`: {e}")),
        }
    }
}

/// Domain behaviour behind an operation.
///
/// The returned future is the deferred result; the engine awaits it on the
/// request task.
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, call: Invocation) -> anyhow::Result<Value>;
}

/// Adapts a closure returning a future into an [`Invoke`].
pub struct FnInvoke<F>(pub F);

#[async_trait]
impl<F, Fut> Invoke for FnInvoke<F>
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn invoke(&self, call: Invocation) -> anyhow::Result<Value> {
        (self.0)(call).await
    }
}

/// How an operation produces its value.
#[derive(Clone)]
pub enum OperationResolver {
    /// Directly invocable domain logic.
    Primary(Arc<dyn Invoke>),
    /// Placeholder: reads the same-named property of the parent value.
    Property,
}

impl fmt::Debug for OperationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(_) => f.write_str("Primary"),
            Self::Property => f.write_str("Property"),
        }
    }
}

/// Default value of an argument. Absent and an explicit `null` default are
/// different things in the schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    #[default]
    Absent,
    Present(Value),
}

impl DefaultValue {
    #[must_use]
    pub fn as_option(&self) -> Option<&Value> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub argument_type: DomainType,
    pub default_value: DefaultValue,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, argument_type: impl Into<DomainType>) -> Self {
        Self {
            name: name.into(),
            description: None,
            argument_type: argument_type.into(),
            default_value: DefaultValue::Absent,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = DefaultValue::Present(value);
        self
    }
}

/// A named unit of domain behaviour exposed as a query, mutation or object
/// field. Built once during discovery and read-only afterwards.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    name: String,
    description: Option<String>,
    result_type: DomainType,
    arguments: Vec<ArgumentDescriptor>,
    paginated: bool,
    resolver: OperationResolver,
}

impl OperationDescriptor {
    /// A placeholder operation reading `name` off its parent value.
    ///
    /// Declaring a `Page<T>` result marks the operation paginated.
    pub fn new(name: impl Into<String>, result_type: impl Into<DomainType>) -> Self {
        let result_type = result_type.into();
        Self {
            name: name.into(),
            description: None,
            paginated: matches!(result_type, DomainType::Page(_)),
            result_type,
            arguments: Vec::new(),
            resolver: OperationResolver::Property,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: ArgumentDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn resolver(mut self, invoke: Arc<dyn Invoke>) -> Self {
        self.resolver = OperationResolver::Primary(invoke);
        self
    }

    /// Shorthand for [`resolver`](Self::resolver) with a closure.
    #[must_use]
    pub fn resolve_with<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.resolver(Arc::new(FnInvoke(f)))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The declared result type, `Page<T>` included.
    #[must_use]
    pub fn result_type(&self) -> &DomainType {
        &self.result_type
    }

    /// The result type with the page wrapper removed when paginated.
    #[must_use]
    pub fn element_type(&self) -> &DomainType {
        if self.paginated {
            self.result_type.page_element().unwrap_or(&self.result_type)
        } else {
            &self.result_type
        }
    }

    #[must_use]
    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }

    #[must_use]
    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    #[must_use]
    pub fn has_primary_resolver(&self) -> bool {
        matches!(self.resolver, OperationResolver::Primary(_))
    }

    #[must_use]
    pub fn operation_resolver(&self) -> &OperationResolver {
        &self.resolver
    }

    /// Run the operation. Placeholders return the parent's property, or
    /// `null` when there is no parent or no such property.
    pub async fn invoke(&self, call: Invocation) -> anyhow::Result<Value> {
        match &self.resolver {
            OperationResolver::Primary(invoke) => invoke.invoke(call).await,
            OperationResolver::Property => Ok(call
                .source
                .as_ref()
                .and_then(|source| source.get(&self.name))
                .cloned()
                .unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::domain::Primitive, serde_json::json};

    fn call() -> Invocation {
        Invocation::new(Arc::new(ExecutionContext::default()))
    }

    #[test]
    fn page_result_marks_operation_paginated() {
        let op = OperationDescriptor::new("users", DomainType::page(Primitive::String.into()));
        assert!(op.is_paginated());
        assert_eq!(op.element_type().key(), "String");
        assert_eq!(op.result_type().key(), "Page<String>");

        let plain = OperationDescriptor::new("name", Primitive::String);
        assert!(!plain.is_paginated());
        assert!(!plain.has_primary_resolver());
    }

    #[test]
    fn explicit_null_default_is_present() {
        let arg = ArgumentDescriptor::new("filter", Primitive::String).default_value(Value::Null);
        assert_eq!(arg.default_value, DefaultValue::Present(Value::Null));
        assert_eq!(arg.default_value.as_option(), Some(&Value::Null));
        assert_eq!(
            ArgumentDescriptor::new("x", Primitive::I32).default_value,
            DefaultValue::Absent
        );
    }

    #[tokio::test]
    async fn property_placeholder_reads_parent_value() {
        let op = OperationDescriptor::new("title", Primitive::String);
        let value = op
            .invoke(call().with_source(json!({ "title": "Dune" })))
            .await
            .unwrap();
        assert_eq!(value, json!("Dune"));
        assert_eq!(op.invoke(call()).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn primary_resolver_receives_arguments() {
        let op = OperationDescriptor::new("echo", Primitive::String).resolve_with(|call| async move {
            let text: Option<String> = call.argument_as("text")?;
            Ok(json!(text.unwrap_or_default().to_uppercase()))
        });
        assert!(op.has_primary_resolver());
        let value = op
            .invoke(call().with_argument("text", json!("hi")))
            .await
            .unwrap();
        assert_eq!(value, json!("HI"));
    }

    #[test]
    fn argument_as_reports_type_mismatch() {
        let call = call().with_argument("count", json!("many"));
        let err = call.argument_as::<u32>("count").unwrap_err();
        assert!(err.to_string().contains("argument `count`"));
    }
}
