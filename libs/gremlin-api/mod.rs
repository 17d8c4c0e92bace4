//! # Gremlin API
//!
//! Graph-side helpers on top of the session layer:
//!
//! - [`types`]: vertices, edges, properties and loosely typed values as
//!   returned by Cosmos-style Gremlin servers
//! - [`query`]: a small builder producing Gremlin query strings
//! - [`request`]: the Gremlin eval request and response envelopes

pub mod error;
pub mod query;
pub mod request;
pub mod types;

pub use error::{ApiError, Result};
pub use query::{
    escape, multi_param_query, multi_param_query_int, EdgeQuery, Graph, QueryBuilder,
    SimpleQuery, ValueQuery, VertexQuery,
};
pub use request::{GremlinRequest, GremlinResponse, ResponseStatus, MIME_TYPE};
pub use types::{
    to_edges, to_properties, to_values, to_vertices, Edge, EntityType, Property, TypedValue,
    ValueWithId, Vertex, VertexPropertyMap,
};
