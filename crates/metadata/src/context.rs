//! Shared, read-mostly state handed to every resolver invocation.

use std::{
    any::Any,
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use crate::domain::DomainType;

/// Execution context shared by all resolvers of one schema.
///
/// Built once after schema assembly and never mutated afterwards, so it can be
/// read concurrently by sibling resolvers.
#[derive(Default, Clone)]
pub struct ExecutionContext {
    implementations: BTreeMap<String, BTreeSet<String>>,
    named_types: BTreeMap<String, DomainType>,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach host application data (repositories, clients, …).
    #[must_use]
    pub fn with_data<T: Any + Send + Sync>(self, data: T) -> Self {
        self.with_shared_data(Arc::new(data))
    }

    #[must_use]
    pub fn with_shared_data(mut self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.data = Some(data);
        self
    }

    /// Abstract type name → names of its concrete implementations.
    #[must_use]
    pub fn with_implementations(
        mut self,
        implementations: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        self.implementations = implementations;
        self
    }

    /// Schema name → domain type for every named type in the schema.
    #[must_use]
    pub fn with_named_types(mut self, named_types: BTreeMap<String, DomainType>) -> Self {
        self.named_types = named_types;
        self
    }

    /// Host data, if present and of type `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref::<T>()
    }

    #[must_use]
    pub fn is_implementation(&self, abstract_type: &str, concrete: &str) -> bool {
        self.implementations
            .get(abstract_type)
            .is_some_and(|set| set.contains(concrete))
    }

    pub fn implementations(&self, abstract_type: &str) -> impl Iterator<Item = &str> {
        self.implementations
            .get(abstract_type)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    #[must_use]
    pub fn named_type(&self, name: &str) -> Option<&DomainType> {
        self.named_types.get(name)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("implementations", &self.implementations)
            .field("named_types", &self.named_types.keys().collect::<Vec<_>>())
            .field("data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Catalog {
        books: usize,
    }

    #[test]
    fn host_data_is_downcast_by_type() {
        let ctx = ExecutionContext::new().with_data(Catalog { books: 3 });
        assert_eq!(ctx.data::<Catalog>().map(|c| c.books), Some(3));
        assert!(ctx.data::<String>().is_none());
        assert!(ExecutionContext::new().data::<Catalog>().is_none());
    }

    #[test]
    fn implementation_table_lookups() {
        let mut table = BTreeMap::new();
        table.insert(
            "Shape".to_string(),
            BTreeSet::from(["Circle".to_string(), "Square".to_string()]),
        );
        let ctx = ExecutionContext::new().with_implementations(table);

        assert!(ctx.is_implementation("Shape", "Circle"));
        assert!(!ctx.is_implementation("Shape", "Triangle"));
        assert!(!ctx.is_implementation("Animal", "Circle"));
        assert_eq!(ctx.implementations("Shape").collect::<Vec<_>>(), [
            "Circle", "Square"
        ]);
    }
}
