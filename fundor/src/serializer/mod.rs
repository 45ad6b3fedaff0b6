//! Field-set descriptors.
//!
//! A [`Serializer`] is the named, ordered list of [`Field`]s a handler reads
//! and writes. Field kinds form a closed enum; each variant carries the
//! payload the schema mapper needs (choices, precision, bounds, ...).

mod from_type;

use std::sync::Arc;

use serde_json::Value;

use crate::entity::Entity;

/// Address family accepted by an IP address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpProtocol {
    #[default]
    Both,
    Ipv4,
    Ipv6,
}

impl IpProtocol {
    pub fn format(self) -> Option<&'static str> {
        match self {
            IpProtocol::Both => None,
            IpProtocol::Ipv4 => Some("ipv4"),
            IpProtocol::Ipv6 => Some("ipv6"),
        }
    }
}

/// Kind of a serializer field. Variants are listed in mapping priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A nested field-set.
    Nested(Serializer),
    /// A list of nested field-sets.
    NestedList(Serializer),
    /// Many related objects, each represented by `child`.
    ManyRelated(Box<FieldKind>),
    /// A related object referenced by its primary key.
    PrimaryKeyRelated {
        /// True when the related entity's key is an auto-incrementing integer.
        auto_pk: bool,
    },
    MultipleChoice(Vec<Value>),
    Choice(Vec<Value>),
    /// A list of scalar values. `None` means the items are not validated.
    List(Option<Box<FieldKind>>),
    Date,
    DateTime,
    Email,
    Url,
    Uuid,
    IpAddress(IpProtocol),
    Decimal {
        max_digits: Option<u32>,
        decimal_places: Option<u32>,
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    Float {
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    File,
    Boolean,
    /// Free-form JSON or dictionary values.
    Json,
    String,
    /// Present only on input and never documented.
    Hidden,
}

impl FieldKind {
    pub fn decimal(max_digits: u32, decimal_places: u32) -> Self {
        FieldKind::Decimal {
            max_digits: Some(max_digits),
            decimal_places: Some(decimal_places),
            min_value: None,
            max_value: None,
        }
    }

    pub fn integer() -> Self {
        FieldKind::Integer {
            min_value: None,
            max_value: None,
        }
    }

    pub fn integer_range(min_value: Option<i64>, max_value: Option<i64>) -> Self {
        FieldKind::Integer {
            min_value,
            max_value,
        }
    }

    pub fn float() -> Self {
        FieldKind::Float {
            min_value: None,
            max_value: None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::List(_))
    }

    /// Digits allowed before the decimal point, when both limits are known.
    pub fn max_whole_digits(&self) -> Option<u32> {
        match self {
            FieldKind::Decimal {
                max_digits: Some(digits),
                decimal_places: Some(places),
                ..
            } => Some(digits.saturating_sub(*places)),
            _ => None,
        }
    }
}

/// A validation rule attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    Email,
    Url,
    Regex(String),
    MaxLength(u64),
    MinLength(u64),
    MaxValue(f64),
    MinValue(f64),
    /// Upper bound the value must stay strictly below.
    ExclusiveMaxValue(f64),
    /// Lower bound the value must stay strictly above.
    ExclusiveMinValue(f64),
    Decimal {
        max_digits: Option<u32>,
        decimal_places: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub allow_null: bool,
    pub default: Option<Value>,
    pub help_text: Option<String>,
    pub validators: Vec<Validator>,
}

impl Field {
    /// A required, writable field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            read_only: false,
            write_only: false,
            allow_null: false,
            default: None,
            help_text: None,
            validators: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Read-only fields are never required.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Fields with a default are not required.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// A named, ordered field-set.
#[derive(Debug, Clone, PartialEq)]
pub struct Serializer {
    pub name: String,
    pub entity: Option<Arc<Entity>>,
    pub fields: Vec<Field>,
}

impl Serializer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: None,
            fields: Vec::new(),
        }
    }

    pub fn entity(mut self, entity: Arc<Entity>) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Type name with a trailing `Serializer` removed.
    pub fn base_name(&self) -> &str {
        self.name.strip_suffix("Serializer").unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_builder_flags() {
        let field = Field::new("id", FieldKind::integer()).read_only();
        assert!(field.read_only);
        assert!(!field.required);

        let field = Field::new("status", FieldKind::String).default("draft");
        assert_eq!(field.default, Some(Value::from("draft")));
        assert!(!field.required);
    }

    #[test]
    fn test_base_name_strips_suffix() {
        assert_eq!(Serializer::new("BookSerializer").base_name(), "Book");
        assert_eq!(Serializer::new("BookPayload").base_name(), "BookPayload");
    }

    #[test]
    fn test_max_whole_digits() {
        assert_eq!(FieldKind::decimal(6, 2).max_whole_digits(), Some(4));
        assert_eq!(FieldKind::decimal(2, 2).max_whole_digits(), Some(0));
        assert_eq!(FieldKind::float().max_whole_digits(), None);
    }

    #[test]
    fn test_ip_protocol_format() {
        assert_eq!(IpProtocol::Both.format(), None);
        assert_eq!(IpProtocol::Ipv4.format(), Some("ipv4"));
        assert_eq!(IpProtocol::Ipv6.format(), Some("ipv6"));
    }
}
