use super::{AutoSchema, Components, Document, Info, OPENAPI_VERSION, Paths, Server};
use crate::auth::RequestContext;
use crate::config::SchemaSettings;
use crate::entity::Entity;
use crate::error::Result;
use crate::introspection::{Endpoint, EndpointEnumerator, EndpointInspector, RouteTable};
use crate::view::ViewInstance;

/// Builds an OpenAPI [`Document`] from a routing table.
///
/// Generation is a pure function of the route table, the settings and the
/// requesting principal: nothing is cached between calls.
pub struct SchemaGenerator {
    title: String,
    version: String,
    description: Option<String>,
    url: Option<String>,
    servers: Vec<Server>,
    routes: RouteTable,
    settings: SchemaSettings,
    inspector: Box<dyn EndpointInspector>,
}

impl SchemaGenerator {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            title: String::new(),
            version: String::new(),
            description: None,
            url: None,
            servers: Vec::new(),
            routes,
            settings: SchemaSettings::default(),
            inspector: Box::new(EndpointEnumerator),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mount point every documented path is joined onto.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.url = Some(url);
        self
    }

    pub fn server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn settings(mut self, settings: SchemaSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn inspector(mut self, inspector: impl EndpointInspector + 'static) -> Self {
        self.inspector = Box::new(inspector);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Builds the full document, or `None` when no path is visible.
    ///
    /// With `public` set (or without a request) no authorization filtering
    /// is applied.
    pub fn get_schema(
        &self,
        request: Option<&RequestContext>,
        public: bool,
    ) -> Result<Option<Document>> {
        let request = if public { None } else { request };
        let Some(paths) = self.get_paths(request)? else {
            return Ok(None);
        };

        tracing::debug!(paths = paths.len(), "generated OpenAPI document");
        Ok(Some(Document {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            components: Components::default(),
            servers: self.servers.clone(),
            paths,
        }))
    }

    /// `path -> method -> operation` for every endpoint the request may see.
    pub fn get_paths(&self, request: Option<&RequestContext>) -> Result<Option<Paths>> {
        let mapper = AutoSchema::new(self.settings.clone());
        let mut paths = Paths::new();

        for endpoint in self.inspector.endpoints(&self.routes) {
            let Some(view) = self.create_view(&endpoint, request)? else {
                continue;
            };
            if !self.has_view_permissions(&endpoint, &view)? {
                continue;
            }

            let path = self.coerce_path(&endpoint.path, &view);
            let operation = mapper.build_operation(&path, &endpoint.method, &view)?;
            paths
                .entry(self.mount(&path))
                .or_default()
                .insert(endpoint.method.as_str().to_lowercase(), operation);
        }

        Ok((!paths.is_empty()).then_some(paths))
    }

    /// Instantiates the handler for one endpoint, or `None` when the
    /// principal lacks a permission the handler's classes require.
    fn create_view(
        &self,
        endpoint: &Endpoint,
        request: Option<&RequestContext>,
    ) -> Result<Option<ViewInstance>> {
        let view = ViewInstance::new(
            endpoint.route.view.clone(),
            endpoint.method.clone(),
            endpoint.action().map(str::to_string),
        );
        let Some(request) = request else {
            return Ok(Some(view));
        };

        let view = view.with_request(request.for_method(&endpoint.method));
        if request.principal.is_superuser {
            return Ok(Some(view));
        }

        let entity = permission_entity(&view);
        for permission in &view.spec.permissions {
            let required = permission.required_permissions(&endpoint.method, entity.as_ref())?;
            if let Some(missing) = required.iter().find(|perm| !request.principal.has_perm(perm)) {
                tracing::debug!(
                    method = %endpoint.method,
                    path = %endpoint.path,
                    handler = %view.name(),
                    permission = %missing,
                    "excluding endpoint from schema"
                );
                return Ok(None);
            }
        }
        Ok(Some(view))
    }

    fn has_view_permissions(&self, endpoint: &Endpoint, view: &ViewInstance) -> Result<bool> {
        match view.check_permissions() {
            Ok(()) => Ok(true),
            Err(err) if err.is_visibility_denial() => {
                tracing::debug!(
                    method = %endpoint.method,
                    path = %endpoint.path,
                    handler = %view.name(),
                    error = %err,
                    "permission hook hid endpoint"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces `{pk}` with the entity's primary-key name when enabled.
    fn coerce_path(&self, path: &str, view: &ViewInstance) -> String {
        if !self.settings.coerce_path_pk || !path.contains("{pk}") {
            return path.to_string();
        }
        let pk_name = view.entity().map(Entity::pk_name).unwrap_or("id");
        path.replace("{pk}", &format!("{{{}}}", pk_name))
    }

    fn mount(&self, path: &str) -> String {
        match &self.url {
            Some(url) => format!("{}{}", url, path.trim_start_matches('/')),
            None => path.to_string(),
        }
    }
}

/// Entity the model permissions are checked against: the handler's own, or
/// the one behind its field-set.
fn permission_entity(view: &ViewInstance) -> Option<Entity> {
    if let Some(entity) = view.entity() {
        return Some(entity.clone());
    }
    view.serializer()
        .and_then(|serializer| serializer.ok())
        .and_then(|serializer| serializer.entity)
        .map(|entity| entity.as_ref().clone())
}

impl std::fmt::Debug for SchemaGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaGenerator")
            .field("title", &self.title)
            .field("version", &self.version)
            .field("url", &self.url)
            .field("routes", &self.routes.routes().len())
            .finish_non_exhaustive()
    }
}
