//! # Fundor
//!
//! OpenAPI 3.0 schema generation for REST handler registries.
//!
//! Handlers are declared as [`ViewSpec`](view::ViewSpec)s (backing entity,
//! field-set, permission classes, filter backends, paginator) and bound to
//! paths in a [`RouteTable`](introspection::RouteTable). The
//! [`SchemaGenerator`](openapi::SchemaGenerator) enumerates every
//! `(path, method)` pair, drops the ones the requesting principal may not
//! see and maps the rest to OpenAPI operations.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fundor::prelude::*;
//!
//! let book = Arc::new(Entity::new("Book", "library").field(EntityField::auto_pk("id")));
//! let serializer = Serializer::new("BookSerializer")
//!     .field(Field::new("id", FieldKind::integer()).read_only())
//!     .field(Field::new("title", FieldKind::String));
//!
//! let view = Arc::new(
//!     ViewSpec::new("BookViewSet")
//!         .entity(book)
//!         .serializer(serializer)
//!         .paginator(PageNumberPagination::default()),
//! );
//! let routes = RouteTable::new()
//!     .route(Route::viewset(
//!         "/books/",
//!         view.clone(),
//!         [(Method::GET, "list"), (Method::POST, "create")],
//!     ))
//!     .route(Route::viewset("/books/:pk/", view, [(Method::GET, "retrieve")]));
//!
//! let document = SchemaGenerator::new(routes)
//!     .title("Library")
//!     .version("1.0")
//!     .get_schema(None, true)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(document.paths["/books/"]["get"].operation_id, "listBooks");
//! assert!(document.paths.contains_key("/books/{id}/"));
//! ```

pub mod auth;
pub mod config;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod filters;
pub mod introspection;
pub mod observability;
pub mod openapi;
pub mod pagination;
pub mod serializer;
pub mod swagger;
pub mod view;

pub use inventory;
pub use schemars;

pub mod prelude {
    pub use crate::auth::{
        AllowAny, IsAuthenticated, ModelPermissions, Permission, Principal, RequestContext,
    };
    pub use crate::config::SchemaSettings;
    pub use crate::discovery::RouteDescriptor;
    pub use crate::entity::{Entity, EntityField, ModelFieldKind};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::filters::{OrderingFilter, SearchFilter};
    pub use crate::introspection::{Route, RouteTable};
    pub use crate::openapi::{Document, SchemaGenerator};
    pub use crate::pagination::{PageNumberPagination, PaginationConfig};
    pub use crate::serializer::{Field, FieldKind, Serializer, Validator};
    pub use crate::swagger::SwaggerUi;
    pub use crate::view::{FilterBackend, Paginator, Renderer, ViewInstance, ViewSpec};

    pub use http::Method;
}
