//! Per-collection field descriptions and subproperty closure

use std::collections::BTreeMap;

use annal_core::{AltScope, AnnalResult};
use tracing::{debug, warn};

use crate::closure::ClosureCache;
use crate::collection::Collection;
use crate::layout::EntityClass;
use crate::records::RecordField;
use crate::store;

#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    fields: BTreeMap<String, RecordField>,
    superproperties: ClosureCache,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache from every field visible in a collection
    pub fn load(coll: &Collection) -> AnnalResult<Self> {
        let mut cache = Self::new();
        let class = EntityClass::field();
        for field_id in store::children(coll, &class, Some(AltScope::All))? {
            if let Some(entity) = store::load(coll, &class, &field_id, Some(AltScope::All))? {
                cache.set_field(RecordField::from_entity(entity));
            }
        }
        debug!(coll_id = coll.id(), fields = cache.fields.len(), "loaded field cache");
        Ok(cache)
    }

    /// Add or replace a field; true if the field id was not previously known
    pub fn set_field(&mut self, field: RecordField) -> bool {
        let property = field.property_uri().to_string();
        if !property.is_empty() {
            for super_uri in field.superproperty_uris() {
                if let Err(e) = self.superproperties.add_rel(&property, &super_uri) {
                    warn!(field_id = field.id(), error = %e, "ignoring superproperty");
                }
            }
        }
        self.fields.insert(field.id().to_string(), field).is_none()
    }

    pub fn get_field(&self, field_id: &str) -> Option<&RecordField> {
        self.fields.get(field_id)
    }

    pub fn field_ids(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Properties declared (transitively) as subproperties of `uri`
    pub fn subproperty_uris(&mut self, uri: &str) -> Vec<String> {
        self.superproperties.rev_closure(uri).into_iter().collect()
    }

    /// Drop all entries; true if there was anything to drop
    pub fn flush_cache(&mut self) -> bool {
        let had_entries = !self.fields.is_empty();
        *self = Self::default();
        had_entries
    }
}
