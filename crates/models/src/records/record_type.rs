//! Type records

use annal_core::vocab::annal;
use annal_core::{ValuesExt, extract_entity_id};
use serde_json::{Value, json};

use crate::entity::Entity;
use crate::records::ValuesBuilder;

/// A user-defined record class
#[derive(Debug, Clone)]
pub struct RecordType {
    entity: Entity,
}

impl RecordType {
    pub fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn id(&self) -> &str {
        self.entity.id()
    }

    pub fn label(&self) -> &str {
        self.entity.label()
    }

    /// Type URI; a type without a declared URI is identified by its view URL
    pub fn uri(&self) -> String {
        match self.entity.values().str_value(annal::URI) {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            _ => self.entity.view_url().to_string(),
        }
    }

    /// Declared direct supertype URIs
    pub fn supertype_uris(&self) -> Vec<String> {
        self.entity.values().id_list(annal::SUPERTYPE_URI)
    }

    /// Default view id for entities of this type
    pub fn default_view(&self) -> Option<&str> {
        self.entity
            .values()
            .str_value(annal::TYPE_VIEW)
            .filter(|s| !s.is_empty())
            .map(extract_entity_id)
    }

    /// Default list id for entities of this type
    pub fn default_list(&self) -> Option<&str> {
        self.entity
            .values()
            .str_value(annal::TYPE_LIST)
            .filter(|s| !s.is_empty())
            .map(extract_entity_id)
    }

    /// Values for a new type record
    pub fn values(label: &str, uri: &str, supertypes: &[&str]) -> ValuesBuilder {
        let supers: Vec<Value> = supertypes.iter().map(|s| json!({ "@id": s })).collect();
        ValuesBuilder::new()
            .with_label(label)
            .with(annal::URI, uri)
            .with(annal::SUPERTYPE_URI, supers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EntityClass;
    use crate::site::Site;
    use crate::store;
    use tempfile::TempDir;

    #[test]
    fn test_type_accessors() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/testsite/").unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        let values = RecordType::values("Test type", "test:testtype", &["test:super"])
            .with(annal::TYPE_VIEW, "_view/Default_view")
            .build();
        let e = store::create(&coll, &EntityClass::record_type(), "testtype", values).unwrap();
        let t = RecordType::from_entity(e);
        assert_eq!(t.uri(), "test:testtype");
        assert_eq!(t.supertype_uris(), vec!["test:super".to_string()]);
        assert_eq!(t.default_view(), Some("Default_view"));
        assert_eq!(t.default_list(), None);
    }
}
