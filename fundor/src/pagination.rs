//! Page-number pagination for list operations.
//!
//! [`PageNumberPagination`] documents the `?page=1&per_page=20` query
//! parameters on collection endpoints and wraps their response schema in the
//! [`Paginated`] envelope:
//!
//! ```json
//! {"data": [...], "page": 1, "per_page": 20, "total": 57,
//!  "total_pages": 3, "has_prev": false, "has_next": true}
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use fundor::pagination::{PageNumberPagination, PaginationConfig};
//!
//! ViewSpec::new("BookViewSet").paginator(PageNumberPagination::new(PaginationConfig {
//!     default_per_page: 25,
//!     max_per_page: 50,
//! }));
//! ```

use serde::Serialize;
use serde_json::Number;

use crate::openapi::{Parameter, Properties, Schema};
use crate::view::{Paginator, ViewInstance};

const DEFAULT_PER_PAGE: u64 = 20;
const DEFAULT_MAX_PER_PAGE: u64 = 100;

/// Pagination defaults documented on every paginated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Default items per page when `per_page` is omitted (default: 20).
    pub default_per_page: u64,
    /// Maximum allowed `per_page` value (default: 100).
    pub max_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

/// Paginated response envelope, as serialized by a host handler.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    /// Builds the envelope for one page, deriving the page count and flags.
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        Self {
            data,
            page,
            per_page,
            total,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageNumberPagination {
    config: PaginationConfig,
}

impl PageNumberPagination {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }
}

impl Paginator for PageNumberPagination {
    fn schema_operation_parameters(&self, _view: &ViewInstance) -> Vec<Parameter> {
        let page = Schema {
            minimum: Some(Number::from(1u64)),
            default: Some(1.into()),
            ..Schema::of_type("integer")
        };
        let per_page = Schema {
            minimum: Some(Number::from(1u64)),
            maximum: Some(Number::from(self.config.max_per_page)),
            default: Some(self.config.default_per_page.into()),
            ..Schema::of_type("integer")
        };
        vec![
            Parameter::query("page", "A page number within the paginated result set.", page),
            Parameter::query("per_page", "Number of results to return per page.", per_page),
        ]
    }

    fn paginated_response_schema(&self, schema: Schema) -> Schema {
        let count = |example: u64| Schema::of_type("integer").with_example(example);
        let properties: Properties = [
            ("data".to_string(), schema),
            ("page".to_string(), count(1)),
            ("per_page".to_string(), count(self.config.default_per_page)),
            ("total".to_string(), count(123)),
            ("total_pages".to_string(), count(7)),
            ("has_prev".to_string(), Schema::of_type("boolean")),
            ("has_next".to_string(), Schema::of_type("boolean")),
        ]
        .into_iter()
        .collect();
        Schema::object(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewSpec;
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn view() -> ViewInstance {
        ViewInstance::new(Arc::new(ViewSpec::new("BookViewSet")), Method::GET, Some("list".into()))
    }

    #[test]
    fn test_pagination_config_default() {
        let config = PaginationConfig::default();
        assert_eq!(config.default_per_page, 20);
        assert_eq!(config.max_per_page, 100);
    }

    #[test]
    fn test_query_parameters() {
        let params = PageNumberPagination::default().schema_operation_parameters(&view());
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value[0]["name"], "page");
        assert_eq!(value[0]["in"], "query");
        assert_eq!(value[0]["required"], false);
        assert_eq!(value[1]["name"], "per_page");
        assert_eq!(value[1]["schema"]["maximum"], 100);
        assert_eq!(value[1]["schema"]["default"], 20);
    }

    #[test]
    fn test_custom_config_is_documented() {
        let paginator = PageNumberPagination::new(PaginationConfig {
            default_per_page: 25,
            max_per_page: 50,
        });
        let params = paginator.schema_operation_parameters(&view());
        assert_eq!(params[1].schema.maximum, Some(Number::from(50u64)));
        assert_eq!(params[1].schema.default, Some(json!(25)));
    }

    #[test]
    fn test_envelope_schema_matches_serialized_envelope() {
        let schema = PageNumberPagination::default()
            .paginated_response_schema(Schema::array_of(Schema::of_type("string")));
        let properties = schema.properties.as_ref().unwrap();

        let envelope = serde_json::to_value(Paginated::new(vec!["a"], 1, 20, 1)).unwrap();
        let keys: Vec<&str> = envelope.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(properties.names().collect::<Vec<_>>(), keys);
        assert!(properties.get("data").unwrap().is_type("array"));
    }

    #[test]
    fn test_paginated_flags() {
        let first: Paginated<u8> = Paginated::new(vec![], 1, 10, 30);
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last: Paginated<u8> = Paginated::new(vec![], 3, 10, 30);
        assert!(last.has_prev);
        assert!(!last.has_next);

        let single: Paginated<u8> = Paginated::new(vec![], 1, 10, 5);
        assert_eq!(single.total_pages, 1);
        assert!(!single.has_prev && !single.has_next);
    }
}
