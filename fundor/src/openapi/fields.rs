//! Field-to-schema mapping.
//!
//! [`map_field`] dispatches once over [`FieldKind`] to get a base fragment,
//! applies the field's flags, then folds its validators over the result.
//! Validators run in declaration order and a later validator overwrites any
//! keyword an earlier one (or the field kind) set.

use serde_json::{Number, Value};

use super::schema::{Properties, Schema, bound_number, decimal_step, negate, pow10_number};
use crate::serializer::{Field, FieldKind, Serializer, Validator};

/// Largest value of a signed 32-bit integer.
const INT32_MAX: f64 = 2_147_483_647.0;

/// Maps a field-set to an object fragment (`properties` and `required`).
/// Hidden fields are skipped.
pub fn map_serializer(serializer: &Serializer) -> Schema {
    let mut properties = Properties::new();
    let mut required = Vec::new();

    for field in &serializer.fields {
        if matches!(field.kind, FieldKind::Hidden) {
            continue;
        }
        if field.required {
            required.push(field.name.clone());
        }
        properties.insert(field.name.clone(), map_field(field));
    }

    Schema {
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        ..Schema::default()
    }
}

/// Maps one field to its property fragment.
pub fn map_field(field: &Field) -> Schema {
    let mut schema = map_kind(&field.kind);
    schema.read_only = field.read_only;
    schema.write_only = field.write_only;
    schema.nullable = field.allow_null;
    schema.default = field.default.clone().filter(is_set);
    schema.description = field.help_text.clone();

    let is_list = field.kind.is_list();
    let schema = field
        .validators
        .iter()
        .fold(schema, |schema, validator| apply_validator(schema, validator, is_list));

    match field.kind {
        FieldKind::Integer { .. } => with_integer_format(schema),
        _ => schema,
    }
}

fn map_kind(kind: &FieldKind) -> Schema {
    match kind {
        FieldKind::Nested(serializer) => Schema {
            schema_type: Some("object".to_string()),
            ..map_serializer(serializer)
        },
        FieldKind::NestedList(serializer) => Schema::array_of(map_serializer(serializer)),
        FieldKind::ManyRelated(child) => Schema::array_of(map_kind(child)),
        FieldKind::PrimaryKeyRelated { auto_pk: true } => Schema::of_type("integer"),
        FieldKind::PrimaryKeyRelated { auto_pk: false } => Schema::of_type("string"),
        FieldKind::MultipleChoice(choices) => {
            Schema::array_of(Schema::enumeration(choices.clone()))
        }
        FieldKind::Choice(choices) => Schema::enumeration(choices.clone()),
        FieldKind::List(None) => Schema::array_of(Schema::default()),
        FieldKind::List(Some(child)) => {
            let mapped = map_kind(child);
            Schema::array_of(Schema {
                schema_type: mapped.schema_type,
                format: mapped.format,
                ..Schema::default()
            })
        }
        FieldKind::Date => Schema::of_type("string").with_format("date"),
        FieldKind::DateTime => Schema::of_type("string").with_format("date-time"),
        FieldKind::Email => Schema::of_type("string").with_format("email"),
        FieldKind::Url => Schema::of_type("string").with_format("uri"),
        FieldKind::Uuid => Schema::of_type("string").with_format("uuid"),
        FieldKind::IpAddress(protocol) => Schema {
            format: protocol.format().map(str::to_string),
            ..Schema::of_type("string")
        },
        FieldKind::Decimal {
            decimal_places,
            min_value,
            max_value,
            ..
        } => {
            let mut schema = Schema::of_type("number");
            if let Some(places) = decimal_places.filter(|p| *p > 0) {
                schema.multiple_of = Some(decimal_step(places));
            }
            if let Some(whole) = kind.max_whole_digits().filter(|w| *w > 0) {
                let maximum = pow10_number(whole);
                schema.minimum = Some(negate(&maximum));
                schema.maximum = Some(maximum);
            }
            with_bounds(schema, *min_value, *max_value)
        }
        FieldKind::Float {
            min_value,
            max_value,
        } => with_bounds(Schema::of_type("number"), *min_value, *max_value),
        FieldKind::Integer {
            min_value,
            max_value,
        } => {
            let mut schema = Schema::of_type("integer");
            if let Some(max) = max_value {
                schema.maximum = Some(Number::from(*max));
            }
            if let Some(min) = min_value {
                schema.minimum = Some(Number::from(*min));
            }
            with_integer_format(schema)
        }
        FieldKind::File => Schema::of_type("string").with_format("binary"),
        FieldKind::Boolean => Schema::of_type("boolean"),
        FieldKind::Json => Schema::of_type("object"),
        FieldKind::String | FieldKind::Hidden => Schema::of_type("string"),
    }
}

fn with_bounds(mut schema: Schema, min_value: Option<f64>, max_value: Option<f64>) -> Schema {
    if let Some(max) = max_value.and_then(bound_number) {
        schema.maximum = Some(max);
    }
    if let Some(min) = min_value.and_then(bound_number) {
        schema.minimum = Some(min);
    }
    schema
}

/// Tags integers whose bounds leave the 32-bit range with `int64`.
fn with_integer_format(mut schema: Schema) -> Schema {
    let exceeds = |bound: &Option<Number>| {
        bound
            .as_ref()
            .and_then(Number::as_f64)
            .is_some_and(|v| v > INT32_MAX)
    };
    if exceeds(&schema.maximum) || exceeds(&schema.minimum) {
        schema.format = Some("int64".to_string());
    } else if schema.format.as_deref() == Some("int64") {
        schema.format = None;
    }
    schema
}

/// Defaults that carry no information (null, false, zero or empty) are left out.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|v| v != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

fn apply_validator(mut schema: Schema, validator: &Validator, is_list: bool) -> Schema {
    match validator {
        Validator::Email => schema.format = Some("email".to_string()),
        Validator::Url => schema.format = Some("uri".to_string()),
        Validator::Regex(pattern) => schema.pattern = Some(pattern.clone()),
        Validator::MaxLength(limit) if is_list => schema.max_items = Some(*limit),
        Validator::MaxLength(limit) => schema.max_length = Some(*limit),
        Validator::MinLength(limit) if is_list => schema.min_items = Some(*limit),
        Validator::MinLength(limit) => schema.min_length = Some(*limit),
        Validator::MaxValue(limit) => {
            if let Some(max) = bound_number(*limit) {
                schema.maximum = Some(max);
                schema.exclusive_maximum = false;
            }
        }
        Validator::MinValue(limit) => {
            if let Some(min) = bound_number(*limit) {
                schema.minimum = Some(min);
                schema.exclusive_minimum = false;
            }
        }
        Validator::ExclusiveMaxValue(limit) => {
            if let Some(max) = bound_number(*limit) {
                schema.maximum = Some(max);
                schema.exclusive_maximum = true;
            }
        }
        Validator::ExclusiveMinValue(limit) => {
            if let Some(min) = bound_number(*limit) {
                schema.minimum = Some(min);
                schema.exclusive_minimum = true;
            }
        }
        Validator::Decimal {
            max_digits,
            decimal_places,
        } => {
            let places = decimal_places.unwrap_or(0);
            if places > 0 {
                schema.multiple_of = Some(decimal_step(places));
            }
            let whole = max_digits.map(|digits| digits.saturating_sub(places));
            if let Some(whole) = whole.filter(|w| *w > 0) {
                let maximum = pow10_number(whole);
                schema.minimum = Some(negate(&maximum));
                schema.maximum = Some(maximum);
            }
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::IpProtocol;
    use serde_json::json;

    fn to_json(schema: &Schema) -> Value {
        serde_json::to_value(schema).unwrap()
    }

    fn field(kind: FieldKind) -> Field {
        Field::new("f", kind)
    }

    #[test]
    fn test_scalar_formats() {
        assert_eq!(
            to_json(&map_field(&field(FieldKind::Date))),
            json!({"type": "string", "format": "date"})
        );
        assert_eq!(
            to_json(&map_field(&field(FieldKind::DateTime))),
            json!({"type": "string", "format": "date-time"})
        );
        assert_eq!(
            to_json(&map_field(&field(FieldKind::Url))),
            json!({"type": "string", "format": "uri"})
        );
        assert_eq!(
            to_json(&map_field(&field(FieldKind::File))),
            json!({"type": "string", "format": "binary"})
        );
        assert_eq!(to_json(&map_field(&field(FieldKind::Json))), json!({"type": "object"}));
        assert_eq!(to_json(&map_field(&field(FieldKind::Boolean))), json!({"type": "boolean"}));
    }

    #[test]
    fn test_ip_address_protocols() {
        assert_eq!(
            to_json(&map_field(&field(FieldKind::IpAddress(IpProtocol::Both)))),
            json!({"type": "string"})
        );
        assert_eq!(
            to_json(&map_field(&field(FieldKind::IpAddress(IpProtocol::Ipv4)))),
            json!({"type": "string", "format": "ipv4"})
        );
    }

    #[test]
    fn test_choices() {
        let choice = field(FieldKind::Choice(vec![json!("a"), json!("b")]));
        assert_eq!(to_json(&map_field(&choice)), json!({"enum": ["a", "b"]}));

        let multiple = field(FieldKind::MultipleChoice(vec![json!(1), json!(2)]));
        assert_eq!(
            to_json(&map_field(&multiple)),
            json!({"type": "array", "items": {"enum": [1, 2]}})
        );
    }

    #[test]
    fn test_list_fields() {
        assert_eq!(
            to_json(&map_field(&field(FieldKind::List(None)))),
            json!({"type": "array", "items": {}})
        );
        let typed = field(FieldKind::List(Some(Box::new(FieldKind::DateTime))));
        assert_eq!(
            to_json(&map_field(&typed)),
            json!({"type": "array", "items": {"type": "string", "format": "date-time"}})
        );
    }

    #[test]
    fn test_related_fields() {
        assert_eq!(
            to_json(&map_field(&field(FieldKind::PrimaryKeyRelated { auto_pk: true }))),
            json!({"type": "integer"})
        );
        assert_eq!(
            to_json(&map_field(&field(FieldKind::PrimaryKeyRelated { auto_pk: false }))),
            json!({"type": "string"})
        );
        let many = field(FieldKind::ManyRelated(Box::new(FieldKind::PrimaryKeyRelated {
            auto_pk: true,
        })));
        assert_eq!(
            to_json(&map_field(&many)),
            json!({"type": "array", "items": {"type": "integer"}})
        );
    }

    #[test]
    fn test_nested_serializers() {
        let author =
            Serializer::new("AuthorSerializer").field(Field::new("name", FieldKind::String));
        let nested = field(FieldKind::Nested(author.clone()));
        assert_eq!(
            to_json(&map_field(&nested)),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            })
        );

        let many = field(FieldKind::NestedList(author));
        assert_eq!(
            to_json(&map_field(&many)),
            json!({
                "type": "array",
                "items": {"properties": {"name": {"type": "string"}}, "required": ["name"]}
            })
        );
    }

    #[test]
    fn test_decimal_field() {
        let price = field(FieldKind::decimal(6, 2));
        assert_eq!(
            to_json(&map_field(&price)),
            json!({"type": "number", "multipleOf": 0.01, "maximum": 10000, "minimum": -10000})
        );
    }

    #[test]
    fn test_decimal_multiple_of_is_power_of_ten() {
        for places in 1..=8u32 {
            let schema = map_field(&field(FieldKind::decimal(12, places)));
            assert_eq!(schema.multiple_of, Some(1.0 / 10f64.powi(places as i32)));
        }
    }

    #[test]
    fn test_decimal_without_whole_digits_has_no_bounds() {
        let schema = map_field(&field(FieldKind::decimal(2, 2)));
        assert!(schema.maximum.is_none());
        assert!(schema.minimum.is_none());
    }

    #[test]
    fn test_integer_format_hint() {
        let small = field(FieldKind::integer_range(Some(0), Some(2_147_483_647)));
        assert_eq!(map_field(&small).format, None);

        let big = field(FieldKind::integer_range(None, Some(2_147_483_648)));
        assert_eq!(map_field(&big).format.as_deref(), Some("int64"));

        let unbounded = field(FieldKind::integer());
        assert_eq!(to_json(&map_field(&unbounded)), json!({"type": "integer"}));
    }

    #[test]
    fn test_integer_format_follows_validators() {
        let raised = field(FieldKind::integer()).validator(Validator::MaxValue(9_000_000_000.0));
        assert_eq!(map_field(&raised).format.as_deref(), Some("int64"));

        let lowered = field(FieldKind::integer_range(None, Some(9_000_000_000)))
            .validator(Validator::MaxValue(100.0));
        assert_eq!(map_field(&lowered).format, None);
    }

    #[test]
    fn test_flags_and_metadata() {
        let f = Field::new("status", FieldKind::String)
            .read_only()
            .nullable()
            .default("draft")
            .help_text("Publication status");
        assert_eq!(
            to_json(&map_field(&f)),
            json!({
                "type": "string",
                "readOnly": true,
                "nullable": true,
                "default": "draft",
                "description": "Publication status"
            })
        );
    }

    #[test]
    fn test_empty_defaults_are_omitted() {
        let empties = [
            json!(null),
            json!(false),
            json!(0),
            json!(0.0),
            json!(""),
            json!([]),
            json!({}),
        ];
        for empty in empties {
            let f = field(FieldKind::String).default(empty);
            assert!(map_field(&f).default.is_none());
        }
        let on = field(FieldKind::Boolean).default(true);
        assert_eq!(map_field(&on).default, Some(json!(true)));
        let three = field(FieldKind::integer()).default(3);
        assert_eq!(map_field(&three).default, Some(json!(3)));
    }

    #[test]
    fn test_exclusive_bound_validators() {
        let f = field(FieldKind::float())
            .validator(Validator::ExclusiveMinValue(0.0))
            .validator(Validator::ExclusiveMaxValue(1.0));
        assert_eq!(
            to_json(&map_field(&f)),
            json!({"type": "number", "maximum": 1, "minimum": 0,
                "exclusiveMaximum": true, "exclusiveMinimum": true})
        );

        let reset = field(FieldKind::float())
            .validator(Validator::ExclusiveMinValue(0.0))
            .validator(Validator::MinValue(5.0));
        let schema = map_field(&reset);
        assert_eq!(schema.minimum, Some(Number::from(5)));
        assert!(!schema.exclusive_minimum);
    }

    #[test]
    fn test_length_validators_on_lists_use_items() {
        let tags = field(FieldKind::List(Some(Box::new(FieldKind::String))))
            .validator(Validator::MinLength(1))
            .validator(Validator::MaxLength(5));
        let schema = map_field(&tags);
        assert_eq!(schema.min_items, Some(1));
        assert_eq!(schema.max_items, Some(5));
        assert!(schema.min_length.is_none());

        let name = field(FieldKind::String).validator(Validator::MaxLength(100));
        assert_eq!(map_field(&name).max_length, Some(100));
    }

    #[test]
    fn test_format_and_pattern_validators() {
        let f = field(FieldKind::String)
            .validator(Validator::Email)
            .validator(Validator::Regex("^.+@example\\.com$".into()));
        let schema = map_field(&f);
        assert_eq!(schema.format.as_deref(), Some("email"));
        assert_eq!(schema.pattern.as_deref(), Some("^.+@example\\.com$"));
    }

    #[test]
    fn test_later_validators_win() {
        let f = field(FieldKind::float())
            .validator(Validator::MaxValue(10.0))
            .validator(Validator::MaxValue(20.0))
            .validator(Validator::MinValue(-1.5));
        let schema = map_field(&f);
        assert_eq!(schema.maximum, Some(Number::from(20)));
        assert_eq!(schema.minimum, Number::from_f64(-1.5));
    }

    #[test]
    fn test_decimal_validator_overrides_field_bounds() {
        let f = field(FieldKind::decimal(6, 2)).validator(Validator::Decimal {
            max_digits: Some(4),
            decimal_places: Some(1),
        });
        assert_eq!(
            to_json(&map_field(&f)),
            json!({"type": "number", "multipleOf": 0.1, "maximum": 1000, "minimum": -1000})
        );
    }

    #[test]
    fn test_map_serializer_skips_hidden_and_collects_required() {
        let serializer = Serializer::new("BookSerializer")
            .field(Field::new("id", FieldKind::integer()).read_only())
            .field(Field::new("title", FieldKind::String))
            .field(Field::new("owner", FieldKind::Hidden));
        let schema = map_serializer(&serializer);

        assert_eq!(schema.required, Some(vec!["title".to_string()]));
        let props = schema.properties.unwrap();
        assert_eq!(props.names().collect::<Vec<_>>(), vec!["id", "title"]);
        assert!(schema.schema_type.is_none());
    }

    #[test]
    fn test_map_serializer_without_required_omits_list() {
        let serializer = Serializer::new("FilterSerializer")
            .field(Field::new("q", FieldKind::String).optional());
        assert!(map_serializer(&serializer).required.is_none());
    }
}
