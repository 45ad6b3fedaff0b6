//! HTTP response for the OpenAPI document.

use bytes::Bytes;
use http::{Response, StatusCode, header};

use super::SchemaGenerator;
use crate::auth::RequestContext;
use crate::error::{Error, Result};

const NOT_CONFIGURED: &str = r#"{"error": "OpenAPI spec not configured"}"#;

/// Renders the document for `request` as pretty-printed JSON.
///
/// Answers `404` when the requester can see no path at all.
pub fn schema_response(
    generator: &SchemaGenerator,
    request: Option<&RequestContext>,
    public: bool,
) -> Result<Response<Bytes>> {
    let (status, body) = match generator.get_schema(request, public)? {
        Some(document) => (StatusCode::OK, Bytes::from(serde_json::to_vec_pretty(&document)?)),
        None => (StatusCode::NOT_FOUND, Bytes::from_static(NOT_CONFIGURED.as_bytes())),
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .map_err(|e| Error::serialization(format!("failed to build schema response: {}", e)))
}
