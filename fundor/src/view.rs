//! Handler declarations and the per-request instances built from them.
//!
//! A [`ViewSpec`] is the immutable description of a request handler: its
//! backing entity, field-set, permission classes, filter backends and
//! paginator. The generator turns it into a transient [`ViewInstance`] bound
//! to one method and one request before mapping it to an operation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::auth::{Permission, RequestContext};
use crate::entity::Entity;
use crate::error::Result;
use crate::openapi::{Parameter, Schema};
use crate::serializer::Serializer;

/// Parsers a handler accepts when none are declared.
pub const DEFAULT_PARSERS: [&str; 3] = [
    "application/json",
    "application/x-www-form-urlencoded",
    "multipart/form-data",
];

/// Response renderer declared by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderer {
    Json,
    /// Human-browsable HTML rendering; never documented.
    BrowsableApi,
    Custom(String),
}

impl Renderer {
    /// Media type to document, `None` for renderers left out of schemas.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Renderer::Json => Some("application/json"),
            Renderer::BrowsableApi => None,
            Renderer::Custom(media_type) => Some(media_type),
        }
    }
}

/// Query-filtering backend consulted for list and detail operations.
pub trait FilterBackend: Send + Sync {
    fn schema_operation_parameters(&self, view: &ViewInstance) -> Vec<Parameter>;
}

/// Pagination style for collection-returning operations.
pub trait Paginator: Send + Sync {
    fn schema_operation_parameters(&self, view: &ViewInstance) -> Vec<Parameter>;

    /// Wraps the array schema of a list response in the paginated envelope.
    fn paginated_response_schema(&self, schema: Schema) -> Schema;
}

type SerializerFactory = Arc<dyn Fn(&ViewInstance) -> Result<Serializer> + Send + Sync>;

/// The field-set a handler declares, by type name, and how to build it.
#[derive(Clone)]
pub struct SerializerBinding {
    pub name: String,
    factory: SerializerFactory,
}

impl SerializerBinding {
    pub fn build(&self, view: &ViewInstance) -> Result<Serializer> {
        (self.factory)(view)
    }
}

impl fmt::Debug for SerializerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerBinding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable declaration of a request handler.
#[derive(Clone)]
pub struct ViewSpec {
    pub name: String,
    pub description: Option<String>,
    /// Per-action (or per-method) documentation text.
    pub action_docs: BTreeMap<String, String>,
    pub entity: Option<Arc<Entity>>,
    pub serializer: Option<SerializerBinding>,
    pub permissions: Vec<Arc<dyn Permission>>,
    pub filter_backends: Option<Vec<Arc<dyn FilterBackend>>>,
    pub paginator: Option<Arc<dyn Paginator>>,
    pub tags: Option<Vec<String>>,
    pub deprecated: bool,
    pub parsers: Vec<String>,
    pub renderers: Vec<Renderer>,
    /// Methods a plain (non-viewset) handler implements.
    pub methods: Vec<Method>,
    /// The handler returns one object on `GET`, never a collection.
    pub single_object: bool,
    pub exclude_from_schema: bool,
}

impl ViewSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            action_docs: BTreeMap::new(),
            entity: None,
            serializer: None,
            permissions: Vec::new(),
            filter_backends: None,
            paginator: None,
            tags: None,
            deprecated: false,
            parsers: DEFAULT_PARSERS.iter().map(|p| p.to_string()).collect(),
            renderers: vec![Renderer::Json, Renderer::BrowsableApi],
            methods: vec![Method::GET],
            single_object: false,
            exclude_from_schema: false,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn action_doc(mut self, action: impl Into<String>, text: impl Into<String>) -> Self {
        self.action_docs.insert(action.into(), text.into());
        self
    }

    pub fn entity(mut self, entity: Arc<Entity>) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Declares a fixed field-set.
    pub fn serializer(mut self, serializer: Serializer) -> Self {
        let name = serializer.name.clone();
        self.serializer = Some(SerializerBinding {
            name,
            factory: Arc::new(move |_| Ok(serializer.clone())),
        });
        self
    }

    /// Declares a field-set built per instance. The factory may fail with an
    /// API-level error, in which case the operation documents no fields.
    pub fn serializer_with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ViewInstance) -> Result<Serializer> + Send + Sync + 'static,
    {
        self.serializer = Some(SerializerBinding {
            name: name.into(),
            factory: Arc::new(factory),
        });
        self
    }

    pub fn permission(mut self, permission: impl Permission + 'static) -> Self {
        self.permissions.push(Arc::new(permission));
        self
    }

    pub fn filter_backend(mut self, backend: impl FilterBackend + 'static) -> Self {
        self.filter_backends
            .get_or_insert_with(Vec::new)
            .push(Arc::new(backend));
        self
    }

    pub fn paginator(mut self, paginator: impl Paginator + 'static) -> Self {
        self.paginator = Some(Arc::new(paginator));
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn parsers<I, S>(mut self, parsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parsers = parsers.into_iter().map(Into::into).collect();
        self
    }

    pub fn renderers(mut self, renderers: Vec<Renderer>) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn single_object(mut self) -> Self {
        self.single_object = true;
        self
    }

    pub fn exclude_from_schema(mut self) -> Self {
        self.exclude_from_schema = true;
        self
    }
}

impl fmt::Debug for ViewSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSpec")
            .field("name", &self.name)
            .field("entity", &self.entity.as_ref().map(|e| &e.name))
            .field("serializer", &self.serializer)
            .field("permissions", &self.permissions.len())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// A handler bound to one method and, optionally, one request.
#[derive(Debug, Clone)]
pub struct ViewInstance {
    pub spec: Arc<ViewSpec>,
    pub method: Method,
    /// Viewset action for this method, if the route declares an action map.
    pub action: Option<String>,
    pub request: Option<RequestContext>,
}

impl ViewInstance {
    pub fn new(spec: Arc<ViewSpec>, method: Method, action: Option<String>) -> Self {
        Self {
            spec,
            method,
            action,
            request: None,
        }
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.spec.entity.as_deref()
    }

    /// Action name if one is bound, otherwise the lowercase method.
    pub fn action_or_method(&self) -> String {
        self.action
            .clone()
            .unwrap_or_else(|| self.method.as_str().to_lowercase())
    }

    pub fn serializer(&self) -> Option<Result<Serializer>> {
        self.spec.serializer.as_ref().map(|binding| binding.build(self))
    }

    /// Runs every live permission hook against the bound request.
    pub fn check_permissions(&self) -> Result<()> {
        let Some(request) = &self.request else {
            return Ok(());
        };
        self.spec
            .permissions
            .iter()
            .try_for_each(|permission| permission.has_permission(request, self))
    }

    /// Whether the operation returns a collection of objects.
    pub fn is_list(&self, path: &str) -> bool {
        if let Some(action) = &self.action {
            return action == "list";
        }
        if self.method != Method::GET || self.spec.single_object {
            return false;
        }
        let last = path.trim_matches('/').rsplit('/').next().unwrap_or("");
        !last.contains('{')
    }

    /// Media types of the declared renderers, browsable renderers excluded.
    pub fn renderer_media_types(&self) -> Vec<String> {
        self.spec
            .renderers
            .iter()
            .filter_map(Renderer::media_type)
            .map(str::to_string)
            .collect()
    }
}
