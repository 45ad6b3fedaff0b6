//! Schema generation settings.
//!
//! Settings are plain values handed to the generator. [`SchemaSettings::from_env`]
//! loads them from the process environment (and a `.env` file, if present).

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Environment variable toggling `{pk}` placeholder coercion.
pub const COERCE_PATH_PK_VAR: &str = "FUNDOR_SCHEMA_COERCE_PATH_PK";

/// Settings consumed by the schema generator and operation mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSettings {
    /// Replace `{pk}` in path templates with the entity's primary-key name.
    pub coerce_path_pk: bool,
    /// Aliases used when looking up per-action description sections.
    pub coerce_method_names: BTreeMap<String, String>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        let coerce_method_names = [("retrieve", "read"), ("destroy", "delete")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            coerce_path_pk: true,
            coerce_method_names,
        }
    }
}

impl SchemaSettings {
    /// Reads settings from the environment, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(raw) = dotenvy::var(COERCE_PATH_PK_VAR) {
            settings.coerce_path_pk = parse_bool(COERCE_PATH_PK_VAR, &raw)?;
        }

        Ok(settings)
    }

    pub fn with_coerce_path_pk(mut self, coerce: bool) -> Self {
        self.coerce_path_pk = coerce;
        self
    }

    pub fn with_method_alias(
        mut self,
        action: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        self.coerce_method_names.insert(action.into(), alias.into());
        self
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::misconfigured(format!(
            "{} must be a boolean, got {:?}",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let settings = SchemaSettings::default();
        assert!(settings.coerce_path_pk);
        assert_eq!(settings.coerce_method_names["retrieve"], "read");
        assert_eq!(settings.coerce_method_names["destroy"], "delete");
    }

    #[test]
    fn test_parse_bool_variants() {
        for raw in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_bool("X", raw).unwrap());
        }
        for raw in ["0", "false", "No", "off"] {
            assert!(!parse_bool("X", raw).unwrap());
        }
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        let err = parse_bool("X", "maybe").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Misconfigured);
        assert!(err.message.contains("X must be a boolean"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_coerce_flag() {
        unsafe { std::env::set_var(COERCE_PATH_PK_VAR, "false") };
        let settings = SchemaSettings::from_env().unwrap();
        unsafe { std::env::remove_var(COERCE_PATH_PK_VAR) };

        assert!(!settings.coerce_path_pk);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_value_is_error() {
        unsafe { std::env::set_var(COERCE_PATH_PK_VAR, "sometimes") };
        let result = SchemaSettings::from_env();
        unsafe { std::env::remove_var(COERCE_PATH_PK_VAR) };

        assert!(result.is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let settings = SchemaSettings::default()
            .with_coerce_path_pk(false)
            .with_method_alias("list", "all");
        assert!(!settings.coerce_path_pk);
        assert_eq!(settings.coerce_method_names["list"], "all");
    }
}
