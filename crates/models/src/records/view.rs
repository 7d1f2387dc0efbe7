//! View records and view-field references

use annal_core::vocab::annal;
use annal_core::{EntityValues, ValuesExt, extract_entity_id};
use serde_json::{Map, Value, json};

use crate::entity::Entity;
use crate::records::ValuesBuilder;

/// A reference from a view, list or group to a field description.
///
/// The property URI and placement, when present, override the values from
/// the field description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub field_id: String,
    pub property_uri: Option<String>,
    pub placement: Option<String>,
}

impl FieldRef {
    pub fn new(field_id: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            property_uri: None,
            placement: None,
        }
    }

    pub fn with_property(mut self, uri: impl Into<String>) -> Self {
        self.property_uri = Some(uri.into());
        self
    }

    pub fn with_placement(mut self, placement: impl Into<String>) -> Self {
        self.placement = Some(placement.into());
        self
    }

    /// Parse a stored reference; `None` if it has no field id
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field_id = obj.get(annal::FIELD_ID).and_then(Value::as_str)?;
        if field_id.is_empty() {
            return None;
        }
        let opt = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            field_id: extract_entity_id(field_id).to_string(),
            property_uri: opt(annal::PROPERTY_URI),
            placement: opt(annal::FIELD_PLACEMENT),
        })
    }

    /// Parse a list of references held under a key
    pub fn list_from(values: &EntityValues, key: &str) -> Vec<Self> {
        match values.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Self::from_value).collect(),
            _ => vec![],
        }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            annal::FIELD_ID.to_string(),
            json!(format!("_field/{}", self.field_id)),
        );
        if let Some(uri) = &self.property_uri {
            obj.insert(annal::PROPERTY_URI.to_string(), json!(uri));
        }
        if let Some(p) = &self.placement {
            obj.insert(annal::FIELD_PLACEMENT.to_string(), json!(p));
        }
        Value::Object(obj)
    }
}

/// An ordered description of how entities are viewed and edited
#[derive(Debug, Clone)]
pub struct RecordView {
    entity: Entity,
}

impl RecordView {
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

    /// URI of the type this view is intended for
    pub fn record_type(&self) -> Option<&str> {
        self.entity
            .values()
            .str_value(annal::RECORD_TYPE)
            .filter(|s| !s.is_empty())
    }

    /// Whether the edit form offers to add a field
    pub fn add_field(&self) -> bool {
        self.entity.values().bool_value(annal::ADD_FIELD)
    }

    pub fn field_refs(&self) -> Vec<FieldRef> {
        FieldRef::list_from(self.entity.values(), annal::VIEW_FIELDS)
    }

    /// Values for a new view record
    pub fn values(label: &str, record_type: &str, fields: &[FieldRef]) -> ValuesBuilder {
        let refs: Vec<Value> = fields.iter().map(FieldRef::to_value).collect();
        ValuesBuilder::new()
            .with_label(label)
            .with(annal::RECORD_TYPE, record_type)
            .with(annal::ADD_FIELD, true)
            .with(annal::VIEW_FIELDS, refs)
    }
}
