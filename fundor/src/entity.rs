//! Backing-entity descriptors.
//!
//! An [`Entity`] describes the persistent model a handler reads from: its
//! name, permission namespace and fields. The generator uses it for operation
//! ids, path parameter descriptions and `{pk}` coercion.

/// Storage kind of an entity field, as far as schema generation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFieldKind {
    /// Auto-incrementing integer key.
    AutoInteger,
    Integer,
    Uuid,
    Text,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityField {
    pub name: String,
    pub kind: ModelFieldKind,
    pub help_text: Option<String>,
    pub primary_key: bool,
}

impl EntityField {
    pub fn new(name: impl Into<String>, kind: ModelFieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            help_text: None,
            primary_key: false,
        }
    }

    /// An auto-incrementing integer primary key.
    pub fn auto_pk(name: impl Into<String>) -> Self {
        Self::new(name, ModelFieldKind::AutoInteger).primary_key()
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub app_label: String,
    pub verbose_name: String,
    pub fields: Vec<EntityField>,
}

impl Entity {
    /// Creates an entity whose verbose name is derived from `name`
    /// (`BookAuthor` becomes `book author`).
    pub fn new(name: impl Into<String>, app_label: impl Into<String>) -> Self {
        let name = name.into();
        let verbose_name = verbose_name_from(&name);
        Self {
            name,
            app_label: app_label.into(),
            verbose_name,
            fields: Vec::new(),
        }
    }

    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = verbose_name.into();
        self
    }

    pub fn field(mut self, field: EntityField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&EntityField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn pk(&self) -> Option<&EntityField> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Name of the primary-key field, `id` when none is declared.
    pub fn pk_name(&self) -> &str {
        self.pk().map_or("id", |f| f.name.as_str())
    }

    /// Lowercased name used in permission codenames.
    pub fn model_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Human description of a primary-key field.
    pub fn pk_description(&self, field: &EntityField) -> String {
        let value_type = match field.kind {
            ModelFieldKind::AutoInteger => "unique integer value",
            ModelFieldKind::Uuid => "UUID string",
            _ => "unique value",
        };
        format!("A {} identifying this {}.", value_type, self.verbose_name)
    }
}

fn verbose_name_from(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev_lower = chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev_lower || (next_lower && chars[i - 1].is_uppercase()) {
                out.push(' ');
            }
        }
        out.extend(c.to_lowercase());
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Entity {
        Entity::new("Book", "library")
            .field(EntityField::auto_pk("id"))
            .field(EntityField::new("title", ModelFieldKind::Text).help_text("Book title"))
    }

    #[test]
    fn test_verbose_name_derivation() {
        assert_eq!(verbose_name_from("Book"), "book");
        assert_eq!(verbose_name_from("BookAuthor"), "book author");
        assert_eq!(verbose_name_from("HTTPLog"), "http log");
    }

    #[test]
    fn test_pk_name() {
        assert_eq!(book().pk_name(), "id");

        let keyed = Entity::new("Ticket", "sales")
            .field(EntityField::new("code", ModelFieldKind::Text).primary_key());
        assert_eq!(keyed.pk_name(), "code");

        let bare = Entity::new("Ticket", "sales");
        assert_eq!(bare.pk_name(), "id");
    }

    #[test]
    fn test_pk_descriptions() {
        let entity = book();
        let pk = entity.pk().unwrap();
        assert_eq!(
            entity.pk_description(pk),
            "A unique integer value identifying this book."
        );

        let uuid = EntityField::new("uid", ModelFieldKind::Uuid).primary_key();
        assert_eq!(
            entity.pk_description(&uuid),
            "A UUID string identifying this book."
        );

        let text = EntityField::new("slug", ModelFieldKind::Text).primary_key();
        assert_eq!(
            entity.pk_description(&text),
            "A unique value identifying this book."
        );
    }

    #[test]
    fn test_get_field() {
        let entity = book();
        assert_eq!(
            entity.get_field("title").and_then(|f| f.help_text.as_deref()),
            Some("Book title")
        );
        assert!(entity.get_field("missing").is_none());
    }
}
