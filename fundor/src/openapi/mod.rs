//! OpenAPI 3.0 document generation.
//!
//! [`SchemaGenerator`] walks a [`RouteTable`](crate::introspection::RouteTable),
//! drops the handlers the requesting principal may not see and asks the
//! [`AutoSchema`] mapper for one [`Operation`] per remaining `(path, method)`.
//! The result is a [`Document`] whose paths are sorted lexicographically.

pub mod endpoint;
mod fields;
mod generator;
mod mapper;
mod schema;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

pub use fields::{map_field, map_serializer};
pub use generator::SchemaGenerator;
pub use mapper::AutoSchema;
pub use schema::{Properties, Schema};

pub const OPENAPI_VERSION: &str = "3.0.2";

/// `path -> lowercase method -> operation`. Paths are sorted, methods keep
/// documentation order (GET, POST, PUT, PATCH, DELETE).
pub type Paths = BTreeMap<String, IndexMap<String, Operation>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    pub components: Components,
    pub servers: Vec<Server>,
    pub paths: Paths,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

impl Default for Components {
    /// Token authentication through the `Authorization` header.
    fn default() -> Self {
        let mut security_schemes = BTreeMap::new();
        security_schemes.insert(
            "ApiKeyAuth".to_string(),
            SecurityScheme {
                scheme_type: "apiKey".to_string(),
                location: "header".to_string(),
                name: "Authorization".to_string(),
                value: "Token ".to_string(),
            },
        );
        Self { security_schemes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(rename = "in")]
    pub location: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub url: String,
    pub description: String,
}

impl Server {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    pub description: String,
    pub schema: Schema,
}

impl Parameter {
    /// An optional query-string parameter.
    pub fn query(name: impl Into<String>, description: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            required: false,
            description: description.into(),
            schema,
        }
    }

    /// A required path parameter.
    pub fn path(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            required: true,
            description: description.into(),
            schema: Schema::of_type("string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// `media type -> schema`, in declaration order.
pub type Content = Vec<(String, MediaType)>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    #[serde(serialize_with = "serialize_content")]
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(
        serialize_with = "serialize_optional_content",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Content>,
    pub description: String,
}

fn serialize_content<S: serde::Serializer>(
    content: &Content,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(content.iter().map(|(k, v)| (k, v)))
}

fn serialize_optional_content<S: serde::Serializer>(
    content: &Option<Content>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serialize_content(content.as_ref().unwrap_or(&Vec::new()), serializer)
}
