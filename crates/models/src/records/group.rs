//! Field group records

use annal_core::ValuesExt;
use annal_core::vocab::annal;
use serde_json::Value;

use crate::entity::Entity;
use crate::records::{FieldRef, ValuesBuilder};

/// An ordered list of field references describing a repeat group
#[derive(Debug, Clone)]
pub struct RecordGroup {
    entity: Entity,
}

impl RecordGroup {
    pub fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn id(&self) -> &str {
        self.entity.id()
    }

    pub fn record_type(&self) -> Option<&str> {
        self.entity
            .values()
            .str_value(annal::RECORD_TYPE)
            .filter(|s| !s.is_empty())
    }

    pub fn field_refs(&self) -> Vec<FieldRef> {
        FieldRef::list_from(self.entity.values(), annal::GROUP_FIELDS)
    }

    /// Values for a new group record
    pub fn values(label: &str, fields: &[FieldRef]) -> ValuesBuilder {
        let refs: Vec<Value> = fields.iter().map(FieldRef::to_value).collect();
        ValuesBuilder::new()
            .with_label(label)
            .with(annal::GROUP_FIELDS, refs)
    }
}
