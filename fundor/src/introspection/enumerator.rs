//! Expands routes into `(path, method, route)` endpoints.

use http::Method;

use super::{Route, RouteTable};

/// Methods in documentation order. Anything else follows, `OPTIONS` and
/// `HEAD` are never documented.
const METHOD_ORDER: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// One documented `(path, method)` pair and the route serving it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: Method,
    pub route: Route,
}

impl Endpoint {
    pub fn action(&self) -> Option<&str> {
        self.route.action_for(&self.method)
    }
}

/// Source of endpoints for the generator.
pub trait EndpointInspector: Send + Sync {
    fn endpoints(&self, table: &RouteTable) -> Vec<Endpoint>;
}

/// Default inspector: one endpoint per documented method of every route,
/// in table order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointEnumerator;

impl EndpointEnumerator {
    fn ordered_methods(route: &Route) -> Vec<Method> {
        let declared = route.declared_methods();
        let mut methods: Vec<Method> = METHOD_ORDER
            .iter()
            .filter(|m| declared.contains(m))
            .cloned()
            .collect();
        for method in declared {
            let hidden = method == Method::OPTIONS || method == Method::HEAD;
            if !hidden && !methods.contains(&method) {
                methods.push(method);
            }
        }
        methods
    }
}

impl EndpointInspector for EndpointEnumerator {
    fn endpoints(&self, table: &RouteTable) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();
        for route in table.routes() {
            if route.view.exclude_from_schema {
                continue;
            }
            let path = normalize_path_template(&route.path);
            for method in Self::ordered_methods(route) {
                let endpoint = Endpoint {
                    path: path.clone(),
                    method,
                    route: route.clone(),
                };
                tracing::trace!(
                    method = %endpoint.method,
                    path = %endpoint.path,
                    handler = %route.view.name,
                    "enumerated endpoint"
                );
                endpoints.push(endpoint);
            }
        }
        endpoints
    }
}

/// Rewrites `:name` segments to `{name}` and ensures a leading `/`.
pub fn normalize_path_template(path: &str) -> String {
    let segments: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => segment.to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Placeholder names in a path template, in order of first appearance.
pub(crate) fn path_variables(path: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[end + 1..];
    }
    variables
}
