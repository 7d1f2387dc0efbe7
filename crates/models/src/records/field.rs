//! Field description records
//!
//! Field records are migrated to the current schema on load (see
//! [`crate::migration`]), so the accessors here read current keys only.

use annal_core::vocab::{annal, rdfs};
use annal_core::{RenderType, ValueMode, ValuesExt, extract_entity_id};
use serde_json::Value;
use tracing::warn;

use crate::entity::Entity;
use crate::migration::{RENDER_TYPE_ENUM, VALUE_MODE_ENUM};
use crate::records::{FieldRef, ValuesBuilder};

/// A reusable field description
#[derive(Debug, Clone)]
pub struct RecordField {
    entity: Entity,
}

impl RecordField {
    pub fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn id(&self) -> &str {
        self.entity.id()
    }

    fn opt_str(&self, key: &str) -> Option<&str> {
        self.entity.values().str_value(key).filter(|s| !s.is_empty())
    }

    /// Form field name; defaults to the field id
    pub fn field_name(&self) -> &str {
        self.opt_str(annal::FIELD_NAME).unwrap_or(self.entity.id())
    }

    pub fn label(&self) -> &str {
        self.entity.values().str_or_empty(rdfs::LABEL)
    }

    pub fn help(&self) -> &str {
        self.entity.values().str_or_empty(rdfs::COMMENT)
    }

    pub fn tooltip(&self) -> &str {
        self.entity.values().str_or_empty(annal::TOOLTIP)
    }

    pub fn placeholder(&self) -> &str {
        self.entity.values().str_or_empty(annal::PLACEHOLDER)
    }

    pub fn property_uri(&self) -> &str {
        self.entity.values().str_or_empty(annal::PROPERTY_URI)
    }

    /// Properties this field's property is declared a subproperty of
    pub fn superproperty_uris(&self) -> Vec<String> {
        self.entity.values().id_list(annal::SUPERPROPERTY_URI)
    }

    pub fn placement(&self) -> &str {
        self.entity.values().str_or_empty(annal::FIELD_PLACEMENT)
    }

    pub fn value_type(&self) -> &str {
        self.entity.values().str_or_empty(annal::FIELD_VALUE_TYPE)
    }

    /// Render-type tag as stored (without the enumeration prefix)
    pub fn render_type_tag(&self) -> &str {
        self.opt_str(annal::FIELD_RENDER_TYPE)
            .map(extract_entity_id)
            .unwrap_or("Text")
    }

    /// Render type; an unrecognised tag is reported and treated as text
    pub fn render_type(&self) -> RenderType {
        let tag = self.render_type_tag();
        RenderType::from_tag(tag).unwrap_or_else(|| {
            warn!(field_id = self.id(), render_type = tag, "unknown render type");
            RenderType::Text
        })
    }

    pub fn value_mode(&self) -> ValueMode {
        self.opt_str(annal::FIELD_VALUE_MODE)
            .map(extract_entity_id)
            .and_then(ValueMode::from_tag)
            .unwrap_or_default()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.entity
            .values()
            .get(annal::DEFAULT_VALUE)
            .filter(|v| !v.is_null() && v.as_str() != Some(""))
    }

    /// Type id whose instances are offered as choices
    pub fn ref_type(&self) -> Option<&str> {
        self.opt_str(annal::FIELD_REF_TYPE).map(extract_entity_id)
    }

    /// Restriction expression on reference choices; `ALL` when absent
    pub fn ref_restriction(&self) -> &str {
        self.opt_str(annal::FIELD_REF_RESTRICTION).unwrap_or("ALL")
    }

    /// Property of the referenced entity whose value is surfaced
    pub fn ref_field(&self) -> Option<&str> {
        self.opt_str(annal::FIELD_REF_FIELD)
    }

    /// Inline field list for repeat groups
    pub fn field_fields(&self) -> Vec<FieldRef> {
        FieldRef::list_from(self.entity.values(), annal::FIELD_FIELDS)
    }

    /// Whether the field carries an inline field list (possibly empty)
    pub fn has_inline_fields(&self) -> bool {
        matches!(self.entity.values().get(annal::FIELD_FIELDS), Some(Value::Array(_)))
    }

    /// Id of a referenced field group
    pub fn group_ref(&self) -> Option<&str> {
        self.opt_str(annal::GROUP_REF).map(extract_entity_id)
    }

    pub fn repeat_label_add(&self) -> String {
        self.opt_str(annal::REPEAT_LABEL_ADD)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Add {}", self.id()))
    }

    pub fn repeat_label_delete(&self) -> String {
        self.opt_str(annal::REPEAT_LABEL_DELETE)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Remove {}", self.id()))
    }

    /// Values for a new field record
    pub fn values(label: &str, render_type: RenderType, property_uri: &str, placement: &str) -> ValuesBuilder {
        ValuesBuilder::new()
            .with_label(label)
            .with(
                annal::FIELD_RENDER_TYPE,
                format!("{}/{}", RENDER_TYPE_ENUM, render_type.tag()),
            )
            .with(annal::PROPERTY_URI, property_uri)
            .with(annal::FIELD_PLACEMENT, placement)
    }

    /// Value-mode value for a field record builder
    pub fn value_mode_value(mode: ValueMode) -> String {
        format!("{}/{}", VALUE_MODE_ENUM, mode.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EntityClass;
    use crate::site::Site;
    use crate::store;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_field(values: annal_core::EntityValues) -> RecordField {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/testsite/").unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        let e = store::create(&coll, &EntityClass::field(), "Test_field", values).unwrap();
        let loaded = store::load(&coll, &EntityClass::field(), "Test_field", None)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id(), e.id());
        RecordField::from_entity(loaded)
    }

    #[test]
    fn test_field_defaults() {
        let f = make_field(Default::default());
        assert_eq!(f.field_name(), "Test_field");
        assert_eq!(f.render_type(), RenderType::Text);
        assert_eq!(f.value_mode(), ValueMode::Direct);
        assert_eq!(f.ref_restriction(), "ALL");
        assert_eq!(f.ref_type(), None);
        assert!(f.default_value().is_none());
        assert_eq!(f.repeat_label_add(), "Add Test_field");
    }

    #[test]
    fn test_field_accessors() {
        let values = RecordField::values("Ref", RenderType::EnumOptional, "test:ref", "small:0,6")
            .with(annal::FIELD_NAME, "ref_field")
            .with(annal::FIELD_REF_TYPE, "_type/T")
            .with(annal::PLACEHOLDER, "(none)")
            .with(annal::SUPERPROPERTY_URI, json!([{"@id": "test:super"}]))
            .build();
        let f = make_field(values);
        assert_eq!(f.field_name(), "ref_field");
        assert_eq!(f.render_type(), RenderType::EnumOptional);
        assert_eq!(f.ref_type(), Some("T"));
        assert_eq!(f.placement(), "small:0,6");
        assert_eq!(f.superproperty_uris(), vec!["test:super".to_string()]);
    }

    #[test]
    fn test_legacy_field_loaded_migrated() {
        let values = json!({
            "annal:field_render_type": "RepeatGroupRow",
            "annal:options_typeref": "T",
        });
        let f = make_field(values.as_object().cloned().unwrap());
        assert_eq!(f.render_type(), RenderType::GroupSeqRow);
        assert_eq!(f.ref_type(), Some("T"));
    }
}
