//! Per-collection type registry with supertype/subtype closures
//!
//! ```text
//! type_id  ──► RecordType
//! type_uri ──► type_id
//! type_uri ──► supertypes*   (fwd closure, reflexive)
//! type_uri ──► subtypes*     (rev closure, reflexive)
//! ```
//!
//! The registry is filled from the collection's types at scope `all` on
//! first use and dropped by the collection whenever a type is written.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use annal_core::{AltScope, AnnalResult};
use tracing::{debug, warn};

use crate::closure::ClosureCache;
use crate::collection::Collection;
use crate::layout::EntityClass;
use crate::records::RecordType;
use crate::store;

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, RecordType>,
    uri_to_id: HashMap<String, String>,
    supertypes: ClosureCache,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every type visible in a collection
    pub fn load(coll: &Collection) -> AnnalResult<Self> {
        let mut registry = Self::new();
        let class = EntityClass::record_type();
        for type_id in store::children(coll, &class, Some(AltScope::All))? {
            if let Some(entity) = store::load(coll, &class, &type_id, Some(AltScope::All))? {
                registry.set_type(RecordType::from_entity(entity));
            }
        }
        debug!(coll_id = coll.id(), types = registry.types.len(), "loaded type cache");
        Ok(registry)
    }

    /// Add or replace a type; true if the type id was not previously known
    pub fn set_type(&mut self, record: RecordType) -> bool {
        let type_id = record.id().to_string();
        let introduced = self.remove_type(&type_id).is_none();
        let uri = record.uri();
        for super_uri in record.supertype_uris() {
            if let Err(e) = self.supertypes.add_rel(&uri, &super_uri) {
                warn!(type_id = type_id.as_str(), error = %e, "ignoring supertype");
            }
        }
        self.uri_to_id.insert(uri, type_id.clone());
        self.types.insert(type_id, record);
        introduced
    }

    /// Remove a type, returning it if it was present
    pub fn remove_type(&mut self, type_id: &str) -> Option<RecordType> {
        let removed = self.types.remove(type_id)?;
        let uri = removed.uri();
        self.uri_to_id.remove(&uri);
        self.supertypes.remove_val(&uri);
        // Remaining types may still name the removed URI as a supertype.
        for record in self.types.values() {
            if record.supertype_uris().contains(&uri) {
                let _ = self.supertypes.add_rel(&record.uri(), &uri);
            }
        }
        Some(removed)
    }

    /// Drop all entries; true if there was anything to drop
    pub fn flush_cache(&mut self) -> bool {
        let had_entries = !self.types.is_empty();
        *self = Self::default();
        had_entries
    }

    /// Check that declaring `supertypes` for `uri` introduces no cycle
    pub fn check_supertypes(&self, uri: &str, supertypes: &[String]) -> AnnalResult<()> {
        let mut trial = self.supertypes.clone();
        for super_uri in supertypes {
            trial.add_rel(uri, super_uri)?;
        }
        Ok(())
    }

    pub fn get_type(&self, type_id: &str) -> Option<&RecordType> {
        self.types.get(type_id)
    }

    pub fn get_type_by_uri(&self, uri: &str) -> Option<&RecordType> {
        self.uri_to_id.get(uri).and_then(|id| self.types.get(id))
    }

    pub fn type_ids(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    /// The type URI and all its transitive supertypes
    pub fn supertype_uris(&mut self, uri: &str) -> BTreeSet<String> {
        let mut uris = self.supertypes.fwd_closure(uri);
        uris.insert(uri.to_string());
        uris
    }

    /// The type URI and all its transitive subtypes
    pub fn subtype_uris(&mut self, uri: &str) -> BTreeSet<String> {
        let mut uris = self.supertypes.rev_closure(uri);
        uris.insert(uri.to_string());
        uris
    }

    /// Ids of the type and every known subtype
    pub fn subtype_ids(&mut self, type_id: &str) -> Vec<String> {
        let Some(uri) = self.types.get(type_id).map(RecordType::uri) else {
            return vec![type_id.to_string()];
        };
        let mut ids: Vec<String> = self
            .subtype_uris(&uri)
            .iter()
            .filter_map(|u| self.uri_to_id.get(u).cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
