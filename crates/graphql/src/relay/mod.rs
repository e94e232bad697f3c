//! Relay conventions: global object identification and cursor connections.

pub mod connection;
pub mod id;
pub mod page;

pub use {
    connection::ConnectionBuilder,
    id::{GlobalIdCodec, IdSerializer, JsonIdSerializer, PlainIdSerializer},
    page::{Edge, Page, PageInfo, PaginationArgs},
};
