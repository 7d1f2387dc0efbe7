//! Core traits for the Annalist entity core
//!
//! This module defines the traits that records throughout the crates
//! implement to provide consistent validation and value access.

use serde_json::{Map, Value};

use crate::error::AnnalResult;

/// A JSON object holding an entity's property values, keyed by CURIE
pub type EntityValues = Map<String, Value>;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for records that can be checked for well-formedness
///
/// # Example
///
/// ```rust,ignore
/// use annal_core::{AnnalError, AnnalResult, Validatable};
///
/// struct Vocab {
///     uri: String,
/// }
///
/// impl Validatable for Vocab {
///     fn validate(&self) -> AnnalResult<()> {
///         if self.uri.is_empty() {
///             return Err(AnnalError::unexpected("vocabulary without namespace URI"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the record
    fn validate(&self) -> AnnalResult<()>;

    /// Check if the record is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Value Access
// ============================================================================

/// Typed accessors over an entity values mapping
pub trait ValuesExt {
    /// String value of a property, if present and a string
    fn str_value(&self, key: &str) -> Option<&str>;

    /// String value of a property, or the empty string
    fn str_or_empty(&self, key: &str) -> &str {
        self.str_value(key).unwrap_or("")
    }

    /// Boolean value of a property; strings "true"/"yes"/"on" count as true
    fn bool_value(&self, key: &str) -> bool;

    /// A list of strings; a single string is treated as a one-element list
    fn string_list(&self, key: &str) -> Vec<String>;

    /// A list of references, each either a string or a `{"@id": ...}` object
    fn id_list(&self, key: &str) -> Vec<String>;
}

impl ValuesExt for EntityValues {
    fn str_value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn bool_value(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "true" | "yes" | "on"),
            _ => false,
        }
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => vec![],
        }
    }

    fn id_list(&self, key: &str) -> Vec<String> {
        let reference = |v: &Value| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(o) => o.get("@id").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(reference).collect(),
            Some(v) => reference(v).into_iter().collect(),
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn values(v: Value) -> EntityValues {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_str_value() {
        let v = values(json!({"rdfs:label": "Entity 1", "n": 3}));
        assert_eq!(v.str_value("rdfs:label"), Some("Entity 1"));
        assert_eq!(v.str_value("n"), None);
        assert_eq!(v.str_or_empty("missing"), "");
    }

    #[test]
    fn test_id_list_forms() {
        let v = values(json!({
            "annal:supertype_uri": [{"@id": "test:super"}, "test:other", 7],
            "single": {"@id": "x:y"}
        }));
        assert_eq!(
            v.id_list("annal:supertype_uri"),
            vec!["test:super".to_string(), "test:other".to_string()]
        );
        assert_eq!(v.id_list("single"), vec!["x:y".to_string()]);
        assert!(v.id_list("absent").is_empty());
    }

    #[test]
    fn test_bool_and_string_list() {
        let v = values(json!({"a": "Yes", "b": false, "p": ["VIEW", "CREATE"], "q": "VIEW"}));
        assert!(v.bool_value("a"));
        assert!(!v.bool_value("b"));
        assert_eq!(v.string_list("p"), vec!["VIEW", "CREATE"]);
        assert_eq!(v.string_list("q"), vec!["VIEW"]);
    }
}
