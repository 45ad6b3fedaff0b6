//! Routing-table introspection.
//!
//! This module holds the routes a schema is generated from and the
//! enumerator that expands them into one endpoint per documented method.

mod enumerator;
mod route_table;

pub use enumerator::{Endpoint, EndpointEnumerator, EndpointInspector, normalize_path_template};
pub(crate) use enumerator::path_variables;
pub use route_table::{Route, RouteTable};
