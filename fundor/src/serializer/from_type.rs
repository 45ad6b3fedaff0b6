//! Field-sets derived from Rust types through `schemars`.

use schemars::JsonSchema;
use serde_json::{Map, Value};

use super::{Field, FieldKind, IpProtocol, Serializer, Validator};

/// Upper bound on chained `$ref` hops when resolving a single reference.
const MAX_REF_HOPS: usize = 32;

impl Serializer {
    /// Builds a field-set from the JSON schema of `T`.
    ///
    /// References back to a type that is already being expanded (recursive
    /// types) become free-form [`FieldKind::Json`] fields.
    ///
    /// ```
    /// use fundor::serializer::{FieldKind, Serializer};
    ///
    /// #[derive(schemars::JsonSchema)]
    /// struct Book {
    ///     /// Title shown in listings.
    ///     title: String,
    ///     pages: Option<u32>,
    /// }
    ///
    /// let serializer = Serializer::from_type::<Book>();
    /// assert_eq!(serializer.name, "Book");
    /// assert_eq!(serializer.fields[0].kind, FieldKind::String);
    /// assert!(serializer.fields[1].allow_null);
    /// ```
    pub fn from_type<T: JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T);
        let root = schema.as_value();
        let name = T::schema_name();
        SchemaWalk::new(root, &name).serializer(&name, root)
    }
}

/// Walks a JSON schema document, tracking which definitions are currently
/// being expanded so self-referencing types terminate.
struct SchemaWalk<'a> {
    root: &'a Value,
    root_name: String,
    expanding: Vec<String>,
}

impl<'a> SchemaWalk<'a> {
    fn new(root: &'a Value, root_name: &str) -> Self {
        Self {
            root,
            root_name: root_name.to_string(),
            expanding: vec![root_name.to_string()],
        }
    }

    fn serializer(&mut self, name: &str, object: &'a Value) -> Serializer {
        let required: Vec<&str> = object
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut serializer = Serializer::new(name);
        if let Some(properties) = object.get("properties").and_then(Value::as_object) {
            for (prop, schema) in properties {
                let mut field = self.field(prop, schema);
                field.required = required.contains(&prop.as_str()) && !field.read_only;
                serializer.fields.push(field);
            }
        }
        serializer
    }

    fn field(&mut self, name: &str, schema: &'a Value) -> Field {
        let (inner, nullable) = strip_null(schema);
        let resolved = self.resolve(inner);

        let mut field = Field::new(name, self.kind_of(name, inner));
        field.allow_null = nullable || allows_null(resolved);
        field.validators = validators_of(resolved);

        let layers = [schema, inner, resolved];
        let keyword = |key: &str| layers.iter().find_map(|layer| layer.get(key));
        let flag = |key: &str| keyword(key).and_then(Value::as_bool).unwrap_or(false);
        field.read_only = flag("readOnly");
        field.write_only = flag("writeOnly");
        field.default = keyword("default").cloned();
        field.help_text = keyword("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        field
    }

    fn kind_of(&mut self, name: &str, schema: &'a Value) -> FieldKind {
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.referenced_kind(reference);
        }
        if let Some(choices) = enum_values(schema) {
            return FieldKind::Choice(choices);
        }

        match primary_type(schema) {
            Some("string") => string_kind(schema),
            Some("integer") => FieldKind::integer(),
            Some("number") => FieldKind::float(),
            Some("boolean") => FieldKind::Boolean,
            Some("array") => self.array_kind(name, schema),
            Some("object") if schema.get("properties").is_some() => {
                FieldKind::Nested(self.serializer(name, schema))
            }
            _ => FieldKind::Json,
        }
    }

    fn referenced_kind(&mut self, reference: &str) -> FieldKind {
        let name = self.definition_name(reference);
        if self.expanding.contains(&name) {
            tracing::debug!(reference, "recursive reference mapped to a free-form object");
            return FieldKind::Json;
        }
        let Some(target) = self.lookup(reference) else {
            tracing::debug!(reference, "unresolved reference mapped to a free-form object");
            return FieldKind::Json;
        };

        self.expanding.push(name.clone());
        let kind = self.kind_of(&name, target);
        self.expanding.pop();
        kind
    }

    fn array_kind(&mut self, name: &str, schema: &'a Value) -> FieldKind {
        let Some(items) = schema.get("items") else {
            return FieldKind::List(None);
        };
        match self.kind_of(name, items) {
            FieldKind::Nested(serializer) => FieldKind::NestedList(serializer),
            FieldKind::Choice(choices) => FieldKind::MultipleChoice(choices),
            FieldKind::Json => FieldKind::List(None),
            child => FieldKind::List(Some(Box::new(child))),
        }
    }

    /// Follows `$ref` chains to the schema they point at. Unresolvable or
    /// overly long chains stop at the last schema reached.
    fn resolve(&self, mut schema: &'a Value) -> &'a Value {
        for _ in 0..MAX_REF_HOPS {
            let Some(target) = schema
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|reference| self.lookup(reference))
            else {
                break;
            };
            schema = target;
        }
        schema
    }

    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        if reference == "#" {
            return Some(self.root);
        }
        let (section, name) = reference
            .strip_prefix("#/$defs/")
            .map(|name| ("$defs", name))
            .or_else(|| {
                reference
                    .strip_prefix("#/definitions/")
                    .map(|name| ("definitions", name))
            })?;
        self.root.get(section)?.get(name)
    }

    fn definition_name(&self, reference: &str) -> String {
        if reference == "#" {
            return self.root_name.clone();
        }
        reference
            .rsplit('/')
            .next()
            .unwrap_or(reference)
            .to_string()
    }
}

/// Unwraps one level of `T | null` union. The returned variant is left
/// unresolved so its `$ref` still names the type.
fn strip_null(schema: &Value) -> (&Value, bool) {
    for key in ["anyOf", "oneOf"] {
        if let Some(variants) = schema.get(key).and_then(Value::as_array) {
            let non_null: Vec<&Value> = variants.iter().filter(|v| !is_null_type(v)).collect();
            if non_null.len() == 1 && non_null.len() < variants.len() {
                return (non_null[0], true);
            }
        }
    }
    (schema, allows_null(schema))
}

fn allows_null(schema: &Value) -> bool {
    schema
        .get("type")
        .and_then(Value::as_array)
        .is_some_and(|types| types.iter().any(|t| t == "null"))
}

fn is_null_type(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn primary_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(t) => Some(t.as_str()),
        Value::Array(types) => types.iter().filter_map(Value::as_str).find(|t| *t != "null"),
        _ => None,
    }
}

fn enum_values(schema: &Value) -> Option<Vec<Value>> {
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return Some(values.iter().filter(|v| !v.is_null()).cloned().collect());
    }
    let variants = schema.get("oneOf").and_then(Value::as_array)?;
    variants
        .iter()
        .map(|v| v.get("const").cloned())
        .collect::<Option<Vec<_>>>()
}

fn string_kind(schema: &Value) -> FieldKind {
    match schema.get("format").and_then(Value::as_str) {
        Some("date") => FieldKind::Date,
        Some("date-time") => FieldKind::DateTime,
        Some("email") => FieldKind::Email,
        Some("uri") => FieldKind::Url,
        Some("uuid") => FieldKind::Uuid,
        Some("ipv4") => FieldKind::IpAddress(IpProtocol::Ipv4),
        Some("ipv6") => FieldKind::IpAddress(IpProtocol::Ipv6),
        Some("ip") => FieldKind::IpAddress(IpProtocol::Both),
        Some("binary") => FieldKind::File,
        _ => FieldKind::String,
    }
}

fn validators_of(schema: &Value) -> Vec<Validator> {
    let empty = Map::new();
    let object = schema.as_object().unwrap_or(&empty);
    let mut validators = Vec::new();

    if let Some(pattern) = object.get("pattern").and_then(Value::as_str) {
        validators.push(Validator::Regex(pattern.to_string()));
    }
    for (key, make) in [
        ("maxLength", Validator::MaxLength as fn(u64) -> Validator),
        ("minLength", Validator::MinLength),
        ("maxItems", Validator::MaxLength),
        ("minItems", Validator::MinLength),
    ] {
        if let Some(limit) = object.get(key).and_then(Value::as_u64) {
            validators.push(make(limit));
        }
    }

    let bound = |key: &str| object.get(key).and_then(Value::as_f64);
    let exclusive = |key: &str| object.get(key).and_then(Value::as_bool).unwrap_or(false);
    if let Some(limit) = bound("maximum") {
        validators.push(if exclusive("exclusiveMaximum") {
            Validator::ExclusiveMaxValue(limit)
        } else {
            Validator::MaxValue(limit)
        });
    }
    if let Some(limit) = bound("minimum") {
        validators.push(if exclusive("exclusiveMinimum") {
            Validator::ExclusiveMinValue(limit)
        } else {
            Validator::MinValue(limit)
        });
    }
    if let Some(limit) = bound("exclusiveMaximum") {
        validators.push(Validator::ExclusiveMaxValue(limit));
    }
    if let Some(limit) = bound("exclusiveMinimum") {
        validators.push(Validator::ExclusiveMinValue(limit));
    }
    validators
}
