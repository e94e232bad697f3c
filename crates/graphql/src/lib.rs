//! GraphQL schema generation from domain model descriptors.
//!
//! [`SchemaGenerator`] takes the operations an
//! [`OperationSource`](schemagen_metadata::OperationSource) exposes, maps
//! every domain type they reach through an ordered list of
//! [`TypeMapper`](mapping::TypeMapper)s, and finishes an executable
//! `async_graphql` dynamic schema. Paginated operations become relay
//! connections, `ID` fields carry opaque global IDs, and every type with a
//! global ID can be fetched back through the root `node(id)` field.
//!
//! Assembly happens once, up front, and fails with a [`ConfigurationError`].
//! Resolution failures are per field: [`DecodeError`]s for bad input and
//! [`LookupError`]s for node IDs that point nowhere.

pub mod accumulator;
pub mod decode;
pub mod definition;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod output;
pub mod registry;
pub mod relay;
pub mod resolver;
pub mod scalars;
pub mod schema;

pub use {
    accumulator::AbstractTypes,
    error::{ConfigurationError, DecodeError, Error, LookupError, Result},
    generator::{AssembledField, BuildContext, QueryGenerator, RootFields},
    mapping::{TypeMapper, TypeMappers},
    relay::{GlobalIdCodec, IdSerializer, Page, PaginationArgs},
    resolver::Resolver,
    scalars::ScalarKind,
    schema::{SchemaGenerator, build_schema},
};
