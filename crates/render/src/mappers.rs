//! Conversion between stored field values and form text
//!
//! Each render type has a mapper: `encode` gives the text shown in a form
//! input, `decode` turns submitted text back into the value to store.

use annal_core::vocab::annal;
use annal_core::{RenderType, ValueMode, extract_entity_id};
use serde_json::{Value, json};

pub trait ValueMapper: Send + Sync {
    fn encode(&self, value: &Value) -> String;
    fn decode(&self, text: &str) -> Value;
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Plain text, stored as submitted
pub struct TextMapper;

impl ValueMapper for TextMapper {
    fn encode(&self, value: &Value) -> String {
        value_text(value)
    }

    fn decode(&self, text: &str) -> Value {
        Value::String(text.to_string())
    }
}

/// Ids and URIs; surrounding whitespace is dropped
pub struct IdentifierMapper;

impl ValueMapper for IdentifierMapper {
    fn encode(&self, value: &Value) -> String {
        match value {
            Value::Object(o) => o.get("@id").map(value_text).unwrap_or_default(),
            other => value_text(other),
        }
    }

    fn decode(&self, text: &str) -> Value {
        Value::String(text.trim().to_string())
    }
}

/// Space-separated tokens stored as a list
pub struct TokenSetMapper;

impl ValueMapper for TokenSetMapper {
    fn encode(&self, value: &Value) -> String {
        match value {
            Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(" "),
            other => value_text(other),
        }
    }

    fn decode(&self, text: &str) -> Value {
        Value::Array(text.split_whitespace().map(|t| json!(t)).collect())
    }
}

/// Checkbox state; an unchecked box submits nothing
pub struct CheckBoxMapper;

impl CheckBoxMapper {
    pub fn is_checked(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::String(s) => matches!(s.to_lowercase().as_str(), "yes" | "true" | "on"),
            _ => false,
        }
    }
}

impl ValueMapper for CheckBoxMapper {
    fn encode(&self, value: &Value) -> String {
        let text = if Self::is_checked(value) { "Yes" } else { "No" };
        text.to_string()
    }

    fn decode(&self, text: &str) -> Value {
        Value::Bool(Self::is_checked(&Value::String(text.to_string())))
    }
}

/// Selected entity reference
pub struct SelectMapper;

impl ValueMapper for SelectMapper {
    fn encode(&self, value: &Value) -> String {
        IdentifierMapper.encode(value)
    }

    fn decode(&self, text: &str) -> Value {
        Value::String(text.trim().to_string())
    }
}

/// Type ids, submitted as `_type/<id>` choices and stored bare
pub struct TypeIdMapper;

impl ValueMapper for TypeIdMapper {
    fn encode(&self, value: &Value) -> String {
        value_text(value)
    }

    fn decode(&self, text: &str) -> Value {
        Value::String(extract_entity_id(text.trim()).to_string())
    }
}

/// URL to import; stored as an import record until the import has run
pub struct UriImportMapper;

impl ValueMapper for UriImportMapper {
    fn encode(&self, value: &Value) -> String {
        match value {
            Value::Object(o) => o.get(annal::IMPORT_URL).map(value_text).unwrap_or_default(),
            other => value_text(other),
        }
    }

    fn decode(&self, text: &str) -> Value {
        json!({ (annal::IMPORT_URL): text.trim() })
    }
}

/// Uploaded file record; the form only carries the upload name
pub struct FileUploadMapper;

impl ValueMapper for FileUploadMapper {
    fn encode(&self, value: &Value) -> String {
        match value {
            Value::Object(o) => o
                .get(annal::UPLOADED_FILE)
                .or_else(|| o.get(annal::RESOURCE_NAME))
                .map(value_text)
                .unwrap_or_default(),
            other => value_text(other),
        }
    }

    fn decode(&self, text: &str) -> Value {
        json!({ (annal::UPLOAD_NAME): text.trim() })
    }
}

/// The mapper for a render type and value mode
pub fn value_mapper(render_type: RenderType, value_mode: ValueMode) -> &'static dyn ValueMapper {
    match value_mode {
        ValueMode::Upload => return &FileUploadMapper,
        ValueMode::Import => return &UriImportMapper,
        ValueMode::Entity | ValueMode::Field => return &SelectMapper,
        ValueMode::Direct => {}
    }
    match render_type {
        RenderType::TokenSet => &TokenSetMapper,
        RenderType::CheckBox => &CheckBoxMapper,
        RenderType::UriImport => &UriImportMapper,
        RenderType::FileUpload => &FileUploadMapper,
        RenderType::EntityTypeId => &TypeIdMapper,
        RenderType::EntityId
        | RenderType::Identifier
        | RenderType::EntityRef
        | RenderType::UriLink
        | RenderType::UriImage
        | RenderType::RefAudio
        | RenderType::RefImage
        | RenderType::RefMultifield => &IdentifierMapper,
        r if r.is_enum() => &SelectMapper,
        _ => &TextMapper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_set() {
        let m = value_mapper(RenderType::TokenSet, ValueMode::Direct);
        assert_eq!(m.decode(" VIEW  CREATE "), json!(["VIEW", "CREATE"]));
        assert_eq!(m.encode(&json!(["VIEW", "CREATE"])), "VIEW CREATE");
    }

    #[test]
    fn test_checkbox() {
        let m = value_mapper(RenderType::CheckBox, ValueMode::Direct);
        assert_eq!(m.decode("on"), json!(true));
        assert_eq!(m.decode("Yes"), json!(true));
        assert_eq!(m.decode(""), json!(false));
        assert_eq!(m.encode(&json!(true)), "Yes");
    }

    #[test]
    fn test_value_mode_overrides_render_type() {
        let m = value_mapper(RenderType::Text, ValueMode::Import);
        assert_eq!(m.decode("http://example.com/a.png"), json!({"import_url": "http://example.com/a.png"}));
        assert_eq!(m.encode(&json!({"import_url": "u", "resource_name": "a.png"})), "u");

        let m = value_mapper(RenderType::RefImage, ValueMode::Upload);
        assert_eq!(m.decode("img_field"), json!({"upload_name": "img_field"}));
    }

    #[test]
    fn test_type_id_is_stored_bare() {
        let m = value_mapper(RenderType::EntityTypeId, ValueMode::Direct);
        assert_eq!(m.decode("_type/testtype"), json!("testtype"));
        assert_eq!(m.decode("testtype"), json!("testtype"));
    }

    #[test]
    fn test_identifier_trims_and_unwraps() {
        let m = value_mapper(RenderType::Identifier, ValueMode::Direct);
        assert_eq!(m.decode(" test:super "), json!("test:super"));
        assert_eq!(m.encode(&json!({"@id": "test:super"})), "test:super");
    }
}
