//! Operation mapping for a single `(path, method, view)` triple.

use std::collections::BTreeMap;

use http::Method;

use super::fields::map_serializer;
use super::{MediaType, Operation, Parameter, RequestBody, Response, Schema};
use crate::config::SchemaSettings;
use crate::error::Result;
use crate::introspection::path_variables;
use crate::serializer::Serializer;
use crate::view::ViewInstance;

/// Actions that may be combined with filter backends.
const FILTERED_ACTIONS: [&str; 5] = ["list", "retrieve", "update", "partial_update", "destroy"];

/// Builds OpenAPI operations by introspecting a view's declarations.
#[derive(Debug, Clone, Default)]
pub struct AutoSchema {
    settings: SchemaSettings,
}

impl AutoSchema {
    pub fn new(settings: SchemaSettings) -> Self {
        Self { settings }
    }

    pub fn build_operation(
        &self,
        path: &str,
        method: &Method,
        view: &ViewInstance,
    ) -> Result<Operation> {
        let serializer = if *method == Method::DELETE {
            None
        } else {
            self.serializer(path, method, view)?
        };

        let mut parameters = self.path_parameters(path, view);
        parameters.extend(self.pagination_parameters(path, view));
        parameters.extend(self.filter_parameters(method, view));

        Ok(Operation {
            operation_id: self.operation_id(path, method, view),
            description: self.description(method, view),
            tags: view.spec.tags.clone().filter(|tags| !tags.is_empty()),
            deprecated: view.spec.deprecated,
            parameters,
            request_body: self.request_body(method, view, serializer.as_ref()),
            responses: self.responses(path, method, view, serializer.as_ref()),
        })
    }

    /// Description taken from the per-action doc text, or from the view's
    /// own description, narrowed to the section for the current action.
    pub fn description(&self, method: &Method, view: &ViewInstance) -> String {
        let method_lower = method.as_str().to_lowercase();
        let action = view.action_or_method();

        match view.spec.action_docs.get(&action) {
            Some(doc) => self.description_section(&method_lower, &dedent(doc)),
            None => {
                let description = view.spec.description.as_deref().unwrap_or("");
                self.description_section(&action, &dedent(description))
            }
        }
    }

    fn description_section(&self, header: &str, description: &str) -> String {
        let mut sections: BTreeMap<String, String> = BTreeMap::new();
        sections.insert(String::new(), String::new());
        let mut current = String::new();

        for line in description.lines() {
            match line.split_once(':').filter(|_| is_section_header(line)) {
                Some((name, lead)) => {
                    current = name.to_string();
                    sections.insert(current.clone(), lead.trim().to_string());
                }
                None => {
                    let section = sections.entry(current.clone()).or_default();
                    section.push('\n');
                    section.push_str(line);
                }
            }
        }

        let alias = self
            .settings
            .coerce_method_names
            .get(header)
            .and_then(|alias| sections.get(alias));
        sections
            .get(header)
            .or(alias)
            .or_else(|| sections.get(""))
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }

    /// `<action><EntityName>`, e.g. `listBooks` or `partialUpdateBook`.
    pub fn operation_id(&self, path: &str, method: &Method, view: &ViewInstance) -> String {
        let method_lower = method.as_str().to_lowercase();
        let action = if view.is_list(path) {
            "list".to_string()
        } else {
            match view.action.as_deref() {
                Some(action) if verb_action(action).is_none() => camel_case(action),
                _ => verb_action(&method_lower)
                    .map(str::to_string)
                    .unwrap_or(method_lower),
            }
        };

        let mut name = if let Some(entity) = view.entity() {
            entity.name.clone()
        } else if let Some(binding) = &view.spec.serializer {
            binding
                .name
                .strip_suffix("Serializer")
                .unwrap_or(&binding.name)
                .to_string()
        } else {
            let name = view.name();
            let name = name
                .strip_suffix("APIView")
                .or_else(|| name.strip_suffix("View"))
                .unwrap_or(name);
            name.strip_suffix(capitalize(&action).as_str())
                .unwrap_or(name)
                .to_string()
        };

        if action == "list" && !name.ends_with('s') {
            name.push('s');
        }
        format!("{}{}", action, name)
    }

    fn path_parameters(&self, path: &str, view: &ViewInstance) -> Vec<Parameter> {
        let entity = view.entity();
        path_variables(path)
            .into_iter()
            .map(|variable| {
                let description = entity
                    .and_then(|entity| {
                        let field = entity.get_field(&variable)?;
                        match field.help_text.as_deref().filter(|t| !t.is_empty()) {
                            Some(help) => Some(help.to_string()),
                            None if field.primary_key => Some(entity.pk_description(field)),
                            None => None,
                        }
                    })
                    .unwrap_or_default();
                Parameter::path(variable, description)
            })
            .collect()
    }

    fn pagination_parameters(&self, path: &str, view: &ViewInstance) -> Vec<Parameter> {
        match &view.spec.paginator {
            Some(paginator) if view.is_list(path) => paginator.schema_operation_parameters(view),
            _ => Vec::new(),
        }
    }

    fn allows_filters(&self, method: &Method, view: &ViewInstance) -> bool {
        if view.spec.filter_backends.is_none() {
            return false;
        }
        match view.action.as_deref() {
            Some(action) => FILTERED_ACTIONS.contains(&action),
            None => [Method::GET, Method::PUT, Method::PATCH, Method::DELETE].contains(method),
        }
    }

    fn filter_parameters(&self, method: &Method, view: &ViewInstance) -> Vec<Parameter> {
        if !self.allows_filters(method, view) {
            return Vec::new();
        }
        view.spec
            .filter_backends
            .iter()
            .flatten()
            .flat_map(|backend| backend.schema_operation_parameters(view))
            .collect()
    }

    /// The view's field-set. API-level failures are logged and treated as
    /// "no field-set" so the rest of the document still gets built.
    fn serializer(
        &self,
        path: &str,
        method: &Method,
        view: &ViewInstance,
    ) -> Result<Option<Serializer>> {
        match view.serializer() {
            None => Ok(None),
            Some(Ok(serializer)) => Ok(Some(serializer)),
            Some(Err(err)) if err.is_visibility_denial() => {
                tracing::warn!(
                    handler = %view.name(),
                    method = %method,
                    path = %path,
                    error = %err,
                    "field-set failed during schema generation; fields will not be generated"
                );
                Ok(None)
            }
            Some(Err(err)) => Err(err),
        }
    }

    fn request_body(
        &self,
        method: &Method,
        view: &ViewInstance,
        serializer: Option<&Serializer>,
    ) -> Option<RequestBody> {
        if ![Method::PUT, Method::PATCH, Method::POST].contains(method) {
            return None;
        }
        let mut schema = map_serializer(serializer?);
        if *method == Method::PATCH {
            schema.required = None;
        }
        let schema = without_properties(schema, |s| s.read_only);

        let content = view
            .spec
            .parsers
            .iter()
            .map(|media_type| {
                (
                    media_type.clone(),
                    MediaType {
                        schema: schema.clone(),
                    },
                )
            })
            .collect();
        Some(RequestBody { content })
    }

    fn responses(
        &self,
        path: &str,
        method: &Method,
        view: &ViewInstance,
        serializer: Option<&Serializer>,
    ) -> BTreeMap<String, Response> {
        let mut responses = BTreeMap::new();
        if *method == Method::DELETE {
            responses.insert(
                "204".to_string(),
                Response {
                    content: None,
                    description: String::new(),
                },
            );
            return responses;
        }

        let item_schema = serializer
            .map(|s| without_properties(map_serializer(s), |schema| schema.write_only))
            .unwrap_or_default();

        let response_schema = if view.is_list(path) {
            let array = Schema::array_of(item_schema);
            match &view.spec.paginator {
                Some(paginator) => paginator.paginated_response_schema(array),
                None => array,
            }
        } else {
            item_schema
        };

        let content = view
            .renderer_media_types()
            .into_iter()
            .map(|media_type| {
                (
                    media_type,
                    MediaType {
                        schema: response_schema.clone(),
                    },
                )
            })
            .collect();
        responses.insert(
            "200".to_string(),
            Response {
                content: Some(content),
                description: String::new(),
            },
        );
        responses
    }
}

/// Drops the properties matching `exclude` and their `required` entries.
fn without_properties(mut schema: Schema, exclude: impl Fn(&Schema) -> bool) -> Schema {
    let Some(properties) = schema.properties.as_mut() else {
        return schema;
    };
    let mut dropped = Vec::new();
    properties.retain(|name, property| {
        let keep = !exclude(property);
        if !keep {
            dropped.push(name.to_string());
        }
        keep
    });
    if let Some(required) = schema.required.take() {
        let required: Vec<String> = required.into_iter().filter(|r| !dropped.contains(r)).collect();
        schema.required = (!required.is_empty()).then_some(required);
    }
    schema
}

fn verb_action(method_lower: &str) -> Option<&'static str> {
    match method_lower {
        "get" => Some("retrieve"),
        "post" => Some("create"),
        "put" => Some("update"),
        "patch" => Some("partialUpdate"),
        "delete" => Some("destroy"),
        _ => None,
    }
}

/// `partial_update` -> `partialUpdate`.
fn camel_case(action: &str) -> String {
    let mut parts = action.split('_').filter(|p| !p.is_empty());
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(&capitalize(part));
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A line such as `list: Returns all books.` opens a new section.
fn is_section_header(line: &str) -> bool {
    let mut chars = line.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
    }
    false
}

/// Removes the common indentation of every line after the first, then
/// trims the result.
fn dedent(content: &str) -> String {
    let indented: Vec<&str> = content
        .lines()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .collect();
    if indented.is_empty() {
        return content.trim().to_string();
    }

    let leading = |ch: char| {
        indented
            .iter()
            .map(|line| line.len() - line.trim_start_matches(ch).len())
            .min()
            .unwrap_or(0)
    };
    let prefix = match (leading(' '), leading('\t')) {
        (spaces, _) if spaces > 0 => " ".repeat(spaces),
        (_, tabs) if tabs > 0 => "\t".repeat(tabs),
        _ => return content.trim().to_string(),
    };

    content
        .lines()
        .map(|line| line.strip_prefix(prefix.as_str()).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
