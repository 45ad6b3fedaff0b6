//! Query-string filter backends.

use crate::openapi::{Parameter, Schema};
use crate::view::{FilterBackend, ViewInstance};

/// Free-text search over a handler's searchable fields (`?search=`).
#[derive(Debug, Clone)]
pub struct SearchFilter {
    param: String,
    fields: Vec<String>,
}

impl SearchFilter {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            param: "search".to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Overrides the query parameter name.
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl FilterBackend for SearchFilter {
    fn schema_operation_parameters(&self, _view: &ViewInstance) -> Vec<Parameter> {
        vec![Parameter::query(&self.param, "A search term.", Schema::of_type("string"))]
    }
}

/// Client-selected result ordering (`?ordering=-created`).
#[derive(Debug, Clone)]
pub struct OrderingFilter {
    param: String,
    fields: Vec<String>,
}

impl OrderingFilter {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            param: "ordering".to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl FilterBackend for OrderingFilter {
    fn schema_operation_parameters(&self, _view: &ViewInstance) -> Vec<Parameter> {
        vec![Parameter::query(
            &self.param,
            "Which field to use when ordering the results.",
            Schema::of_type("string"),
        )]
    }
}
