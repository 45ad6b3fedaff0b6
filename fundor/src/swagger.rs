//! Swagger UI page for browsing the generated document.

use bytes::Bytes;
use http::{Response, StatusCode, header};

use crate::error::{Error, Result};

pub const DEFAULT_TITLE: &str = "Swagger Rest Api";

const SWAGGER_UI_VERSION: &str = "5.9.0";

/// Swagger UI pointed at a schema URL, optionally pre-authorized with the
/// viewer's API token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwaggerUi {
    pub title: String,
    pub schema_url: String,
    pub token: Option<String>,
}

impl SwaggerUi {
    pub fn new(schema_url: impl Into<String>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            schema_url: schema_url.into(),
            token: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// API key sent as `Authorization: Token <key>`. Empty keys are ignored.
    pub fn token(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.token = (!key.is_empty()).then_some(key);
        self
    }

    /// `Token <key>` header value, if a key is set.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|key| format!("Token {}", key))
    }

    pub fn render(&self) -> Result<String> {
        let url = script_literal(&serde_json::to_string(&self.schema_url)?);
        let authorization = script_literal(&serde_json::to_string(&self.authorization())?);

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" type="text/css"
        href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
    <style>
        body {{ margin: 0; background: #fafafa; }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {{
            const authorization = {authorization};
            const ui = SwaggerUIBundle({{
                url: {url},
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis],
                onComplete: function() {{
                    if (authorization) {{
                        ui.preauthorizeApiKey("ApiKeyAuth", authorization);
                    }}
                }}
            }});
        }};
    </script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            version = SWAGGER_UI_VERSION,
            authorization = authorization,
            url = url,
        ))
    }
}

/// Serves the Swagger UI page as `text/html`.
pub fn swagger_ui_response(ui: &SwaggerUi) -> Result<Response<Bytes>> {
    let html = ui.render()?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Bytes::from(html))
        .map_err(|e| Error::serialization(format!("failed to build swagger response: {}", e)))
}

/// Keeps a JSON literal from closing the surrounding `<script>` element.
fn script_literal(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title() {
        let ui = SwaggerUi::new("/api/schema/");
        assert_eq!(ui.title, "Swagger Rest Api");
        assert!(ui.render().unwrap().contains("<title>Swagger Rest Api</title>"));
    }

    #[test]
    fn test_token_is_prefilled() {
        let ui = SwaggerUi::new("/api/schema/").token("abc123");
        assert_eq!(ui.authorization().as_deref(), Some("Token abc123"));
        assert!(ui.render().unwrap().contains(r#"const authorization = "Token abc123";"#));
    }

    #[test]
    fn test_missing_token_renders_null() {
        let ui = SwaggerUi::new("/api/schema/").token("");
        assert!(ui.token.is_none());
        assert!(ui.render().unwrap().contains("const authorization = null;"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = SwaggerUi::new("/s").title("<Books & Co>").render().unwrap();
        assert!(html.contains("<title>&lt;Books &amp; Co&gt;</title>"));
        assert!(html.contains(r#"url: "/s","#));
    }

    #[test]
    fn test_response_is_html() {
        let response = swagger_ui_response(&SwaggerUi::new("/api/schema/")).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }
}
