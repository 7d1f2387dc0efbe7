//! List records

use annal_core::vocab::annal;
use annal_core::{ValuesExt, extract_entity_id};
use serde_json::Value;

use crate::entity::Entity;
use crate::records::{FieldRef, ValuesBuilder};

/// Describes how a set of entities is listed
#[derive(Debug, Clone)]
pub struct RecordList {
    entity: Entity,
}

impl RecordList {
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

    /// `List` or `Grid`
    pub fn display_type(&self) -> &str {
        let t = self.entity.values().str_value(annal::DISPLAY_TYPE).unwrap_or("List");
        extract_entity_id(t)
    }

    pub fn default_view(&self) -> Option<&str> {
        self.entity
            .values()
            .str_value(annal::DEFAULT_VIEW)
            .filter(|s| !s.is_empty())
            .map(extract_entity_id)
    }

    pub fn default_type(&self) -> Option<&str> {
        self.entity
            .values()
            .str_value(annal::DEFAULT_TYPE)
            .filter(|s| !s.is_empty())
            .map(extract_entity_id)
    }

    /// Selector applied to listed entities; `ALL` when absent
    pub fn entity_selector(&self) -> &str {
        self.entity
            .values()
            .str_value(annal::LIST_ENTITY_SELECTOR)
            .filter(|s| !s.is_empty())
            .unwrap_or("ALL")
    }

    pub fn field_refs(&self) -> Vec<FieldRef> {
        FieldRef::list_from(self.entity.values(), annal::LIST_FIELDS)
    }

    /// Values for a new list record
    pub fn values(label: &str, default_type: &str, selector: &str, fields: &[FieldRef]) -> ValuesBuilder {
        let refs: Vec<Value> = fields.iter().map(FieldRef::to_value).collect();
        ValuesBuilder::new()
            .with_label(label)
            .with(annal::DISPLAY_TYPE, "_enum_list_type/List")
            .with(annal::DEFAULT_TYPE, default_type)
            .with(annal::LIST_ENTITY_SELECTOR, selector)
            .with(annal::LIST_FIELDS, refs)
    }
}
