//! Domain model descriptors consumed by the schema generator.
//!
//! The host application describes its queryable surface here: the shape of
//! every domain type ([`DomainType`]), the operations exposed on the root
//! query/mutation types and on object types ([`OperationDescriptor`]), and the
//! source those operations are discovered from ([`OperationSource`]).
//!
//! Nothing in this crate knows about GraphQL. The `schemagen-graphql` crate
//! turns these descriptors into a schema and binds resolvers that call back
//! into [`Invoke`] implementations at query time.

pub mod context;
pub mod domain;
pub mod operation;
pub mod source;

pub use {
    context::ExecutionContext,
    domain::{DomainType, EnumType, ObjectType, ObjectTypeBuilder, Primitive},
    operation::{
        ArgumentDescriptor, DefaultValue, FnInvoke, Invocation, Invoke, OperationDescriptor,
        OperationResolver,
    },
    source::{OperationSource, StaticOperationSource},
};
