//! Route auto-discovery via `inventory`.
//!
//! Crates register handler declarations at link time with
//! `inventory::submit!` and a [`RouteDescriptor`]. Calling
//! [`RouteTable::discover()`] collects every descriptor into a routing table
//! without wiring each route by hand.
//!
//! ```rust,ignore
//! fn book_list() -> ViewSpec {
//!     ViewSpec::new("BookListView").methods([Method::GET, Method::POST])
//! }
//!
//! inventory::submit! {
//!     RouteDescriptor { path: "/books/", actions: &[], view: book_list }
//! }
//! ```

use std::sync::Arc;

use http::Method;

use crate::introspection::{Route, RouteTable};
use crate::view::ViewSpec;

/// A route registered at link time.
pub struct RouteDescriptor {
    /// Path template (e.g. "/books/:pk/")
    pub path: &'static str,
    /// `(METHOD, action)` pairs for viewset routes; empty for plain routes
    pub actions: &'static [(&'static str, &'static str)],
    /// Builds the handler declaration
    pub view: fn() -> ViewSpec,
}

inventory::collect!(RouteDescriptor);

impl RouteDescriptor {
    fn to_route(&self) -> Route {
        let view = Arc::new((self.view)());
        if self.actions.is_empty() {
            return Route::new(self.path, view);
        }

        let actions = self.actions.iter().filter_map(|(method, action)| {
            match Method::from_bytes(method.to_ascii_uppercase().as_bytes()) {
                Ok(method) => Some((method, *action)),
                Err(_) => {
                    tracing::warn!(
                        path = self.path,
                        method,
                        "ignoring invalid method in route descriptor"
                    );
                    None
                }
            }
        });
        Route::viewset(self.path, view, actions)
    }
}

impl RouteTable {
    /// Collects every submitted [`RouteDescriptor`], ordered by path.
    pub fn discover() -> Self {
        let mut descriptors: Vec<&RouteDescriptor> = inventory::iter::<RouteDescriptor>
            .into_iter()
            .collect();
        descriptors.sort_by_key(|d| d.path);
        RouteTable::with_routes(descriptors.into_iter().map(RouteDescriptor::to_route).collect())
    }
}
