//! Where operations come from.

use crate::{domain::DomainType, operation::OperationDescriptor};

/// The discovery collaborator: yields the operations to expose.
///
/// Order is significant; it is preserved in the generated root types and
/// decides which operation wins when two produce the same node type.
pub trait OperationSource: Send + Sync {
    fn queries(&self) -> Vec<OperationDescriptor>;

    fn mutations(&self) -> Vec<OperationDescriptor>;

    /// Types to map even when no operation reaches them, typically concrete
    /// implementations of abstract types.
    fn additional_types(&self) -> Vec<DomainType> {
        Vec::new()
    }
}

/// In-memory [`OperationSource`].
#[derive(Debug, Clone, Default)]
pub struct StaticOperationSource {
    queries: Vec<OperationDescriptor>,
    mutations: Vec<OperationDescriptor>,
    types: Vec<DomainType>,
}

impl StaticOperationSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, operation: OperationDescriptor) -> Self {
        self.queries.push(operation);
        self
    }

    #[must_use]
    pub fn mutation(mut self, operation: OperationDescriptor) -> Self {
        self.mutations.push(operation);
        self
    }

    #[must_use]
    pub fn additional_type(mut self, ty: impl Into<DomainType>) -> Self {
        self.types.push(ty.into());
        self
    }
}

impl OperationSource for StaticOperationSource {
    fn queries(&self) -> Vec<OperationDescriptor> {
        self.queries.clone()
    }

    fn mutations(&self) -> Vec<OperationDescriptor> {
        self.mutations.clone()
    }

    fn additional_types(&self) -> Vec<DomainType> {
        self.types.clone()
    }
}
