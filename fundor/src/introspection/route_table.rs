//! The routing table a schema is generated from.

use std::sync::Arc;

use http::Method;

use crate::view::ViewSpec;

/// A path template bound to a handler declaration.
///
/// Plain routes document the methods their view implements. Viewset routes
/// carry an action map and document exactly the mapped methods.
#[derive(Debug, Clone)]
pub struct Route {
    /// Path template; `:name` and `{name}` placeholders are both accepted.
    pub path: String,
    pub view: Arc<ViewSpec>,
    pub actions: Option<Vec<(Method, String)>>,
}

impl Route {
    pub fn new(path: impl Into<String>, view: Arc<ViewSpec>) -> Self {
        Self {
            path: path.into(),
            view,
            actions: None,
        }
    }

    /// A viewset-style route mapping methods to action names.
    pub fn viewset<I, S>(path: impl Into<String>, view: Arc<ViewSpec>, actions: I) -> Self
    where
        I: IntoIterator<Item = (Method, S)>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            view,
            actions: Some(
                actions
                    .into_iter()
                    .map(|(method, action)| (method, action.into()))
                    .collect(),
            ),
        }
    }

    /// Action bound to `method`, for viewset routes.
    pub fn action_for(&self, method: &Method) -> Option<&str> {
        self.actions
            .as_ref()?
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, action)| action.as_str())
    }

    /// Methods this route answers, before ordering and filtering.
    pub fn declared_methods(&self) -> Vec<Method> {
        match &self.actions {
            Some(actions) => actions.iter().map(|(m, _)| m.clone()).collect(),
            None => self.view.methods.clone(),
        }
    }
}

/// Ordered collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn with_routes(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
