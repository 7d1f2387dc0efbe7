//! Collections: the parents of all typed records
//!
//! A collection declares an ordered list of parent collections
//! (`annal:inherit_from`). Together with the implicit site-data collection
//! these form the alt-parent ancestry walked by `load` and `children`.
//!
//! Type and field caches are filled on first use and dropped whenever a
//! type, view, field, group or vocabulary is written through the collection.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use annal_core::vocab::annal;
use annal_core::{
    AltScope, AnnalError, AnnalResult, EntityKind, EntityValues, SITEDATA_ID, ValuesExt, check_id,
    extract_entity_id, is_builtin_id,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::entity::{Entity, EntityParent};
use crate::fieldcache::FieldCache;
use crate::layout::{EntityClass, coll_context_path};
use crate::records::{
    RecordField, RecordGroup, RecordList, RecordType, RecordView, RecordVocab, UserPermissions,
};
use crate::site::Site;
use crate::typecache::TypeRegistry;
use crate::{attachments, context, store};

#[derive(Debug, Clone)]
pub struct Collection {
    entity: Entity,
    site: Site,
    parents: Vec<String>,
    types: RefCell<Option<TypeRegistry>>,
    fields: RefCell<Option<FieldCache>>,
}

impl Collection {
    pub(crate) fn from_entity(site: &Site, entity: Entity) -> Self {
        let parents = entity
            .values()
            .id_list(annal::INHERIT_FROM)
            .iter()
            .map(|p| extract_entity_id(p).to_string())
            .collect();
        Self {
            entity,
            site: site.clone(),
            parents,
            types: RefCell::new(None),
            fields: RefCell::new(None),
        }
    }

    pub fn id(&self) -> &str {
        self.entity.id()
    }

    pub fn label(&self) -> &str {
        self.entity.label()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entity.get(key)
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn is_sitedata(&self) -> bool {
        self.entity.id() == SITEDATA_ID
    }

    /// Declared parent collection ids, in precedence order
    pub fn parent_ids(&self) -> &[String] {
        &self.parents
    }

    /// Path of the collection context file
    pub fn context_path(&self) -> PathBuf {
        self.entity.dir().join(coll_context_path())
    }

    /// URL of the collection context file
    pub fn context_url(&self) -> AnnalResult<Url> {
        self.entity
            .url()
            .join(&coll_context_path())
            .map_err(|e| AnnalError::unexpected(e.to_string()))
    }

    // ========================================================================
    // Ancestry
    // ========================================================================

    /// Alt-parents in precedence order under the given scope.
    ///
    /// Declared parents are visited breadth-first; the site-data collection
    /// always comes last. A parent reached twice is visited once.
    pub fn alt_ancestry(&self, altscope: Option<AltScope>) -> AnnalResult<Vec<Collection>> {
        let Some(scope) = altscope else {
            return Ok(vec![]);
        };
        if self.is_sitedata() {
            return Ok(vec![]);
        }
        if scope == AltScope::Site {
            return Ok(vec![self.site.site_data()?]);
        }
        let mut seen: HashSet<String> = [self.id().to_string(), SITEDATA_ID.to_string()].into();
        let mut queue: VecDeque<String> = self.parents.iter().cloned().collect();
        let mut ancestry = Vec::new();
        while let Some(parent_id) = queue.pop_front() {
            if !seen.insert(parent_id.clone()) {
                continue;
            }
            match self.site.collection(&parent_id)? {
                Some(parent) => {
                    queue.extend(parent.parent_ids().iter().cloned());
                    ancestry.push(parent);
                }
                None => warn!(coll_id = self.id(), parent_id = parent_id.as_str(), "missing parent collection"),
            }
        }
        ancestry.push(self.site.site_data()?);
        Ok(ancestry)
    }

    // ========================================================================
    // Entities
    // ========================================================================

    pub fn entity_exists(&self, type_id: &str, entity_id: &str) -> bool {
        store::exists(self, &EntityClass::for_type_id(type_id), entity_id)
    }

    /// Load an entity of any type, following alt-parents under `altscope`
    pub fn load_entity(
        &self,
        type_id: &str,
        entity_id: &str,
        altscope: Option<AltScope>,
    ) -> AnnalResult<Option<Entity>> {
        store::load(self, &EntityClass::for_type_id(type_id), entity_id, altscope)
    }

    /// Ids of a type's entities under `altscope`
    pub fn entity_ids(&self, type_id: &str, altscope: Option<AltScope>) -> AnnalResult<Vec<String>> {
        store::children(self, &EntityClass::for_type_id(type_id), altscope)
    }

    /// Allocate an unused id for a new entity of a type
    pub fn allocate_entity_id(&self, type_id: &str) -> String {
        store::allocate_new_id(self, &EntityClass::for_type_id(type_id))
    }

    /// Create a new entity; fails if one with the same id is stored here
    pub fn create_entity(&self, type_id: &str, entity_id: &str, values: EntityValues) -> AnnalResult<Entity> {
        let class = EntityClass::for_type_id(type_id);
        check_id(entity_id)?;
        if store::exists(self, &class, entity_id) {
            return Err(AnnalError::exists(type_id, entity_id));
        }
        self.write_entity(&class, entity_id, values)
    }

    /// Create or replace an entity stored in this collection
    pub fn update_entity(&self, type_id: &str, entity_id: &str, values: EntityValues) -> AnnalResult<Entity> {
        let class = EntityClass::for_type_id(type_id);
        self.write_entity(&class, entity_id, values)
    }

    fn write_entity(&self, class: &EntityClass, entity_id: &str, mut values: EntityValues) -> AnnalResult<Entity> {
        match class.kind() {
            EntityKind::Data if !values.contains_key(annal::TYPE) => {
                if let Some(record_type) = self.get_type(class.type_id())? {
                    values.insert(annal::TYPE.to_string(), Value::from(record_type.uri()));
                }
            }
            EntityKind::Type => self.check_type_values(entity_id, &values)?,
            _ => {}
        }
        let entity = store::create(self, class, entity_id, values)?;
        self.post_update(class.kind())?;
        Ok(entity)
    }

    fn check_type_values(&self, type_id: &str, values: &EntityValues) -> AnnalResult<()> {
        let supertypes = values.id_list(annal::SUPERTYPE_URI);
        if supertypes.is_empty() {
            return Ok(());
        }
        let uri = match values.str_value(annal::URI) {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            _ => store::entity_view_url(self, &EntityClass::record_type(), type_id)?.to_string(),
        };
        self.with_types(|types| types.check_supertypes(&uri, &supertypes))?
    }

    /// Remove an entity stored in this collection, with its attachments
    pub fn remove_entity(&self, type_id: &str, entity_id: &str) -> AnnalResult<()> {
        let class = EntityClass::for_type_id(type_id);
        store::remove(self, &class, entity_id)?;
        self.post_update(class.kind())
    }

    /// Where an entity would be stored in this collection; nothing is written
    pub fn locate_entity(&self, type_id: &str, entity_id: &str) -> AnnalResult<Entity> {
        Entity::locate(self, &EntityClass::for_type_id(type_id), entity_id)
    }

    /// Move an entity to a new id, carrying its attachments.
    ///
    /// Renaming a type record also moves every instance of the type.
    pub fn rename_entity(&self, type_id: &str, old_id: &str, new_id: &str) -> AnnalResult<Entity> {
        let class = EntityClass::for_type_id(type_id);
        check_id(new_id)?;
        if class.kind() == EntityKind::Type {
            check_type_rename(old_id, new_id)?;
        }
        if !store::exists(self, &class, old_id) {
            return Err(AnnalError::not_found(type_id, old_id));
        }
        if store::exists(self, &class, new_id) {
            return Err(AnnalError::exists(type_id, new_id));
        }
        let old = store::load(self, &class, old_id, None)?
            .ok_or_else(|| AnnalError::not_found(type_id, old_id))?;
        let renamed = store::create(self, &class, new_id, old.values().clone())?;
        attachments::copy_attachments(&old, &renamed)?;
        if class.kind() == EntityKind::Type {
            self.flush_cache();
            self.move_instances(old_id, new_id)?;
        }
        store::remove(self, &class, old_id)?;
        self.post_update(class.kind())?;
        info!(coll_id = self.id(), type_id, old_id, new_id, "renamed entity");
        Ok(renamed)
    }

    /// Move every locally stored instance of one type to another, with
    /// attachments, rewriting their type values. Both type records must
    /// still be readable.
    pub fn move_instances(&self, old_type_id: &str, new_type_id: &str) -> AnnalResult<usize> {
        let from = EntityClass::for_type_id(old_type_id);
        let to = EntityClass::for_type_id(new_type_id);
        let mut moved = 0;
        for id in store::children(self, &from, None)? {
            let Some(old) = store::load(self, &from, &id, None)? else {
                continue;
            };
            let mut values = old.values().clone();
            self.retype_values(&mut values, old_type_id, new_type_id)?;
            let entity = store::create(self, &to, &id, values)?;
            attachments::copy_attachments(&old, &entity)?;
            store::remove(self, &from, &id)?;
            moved += 1;
        }
        info!(coll_id = self.id(), old_type_id, new_type_id, moved, "moved type instances");
        Ok(moved)
    }

    /// Rewrite the type values of a record moving between two types
    pub fn retype_values(&self, values: &mut EntityValues, old_type_id: &str, new_type_id: &str) -> AnnalResult<()> {
        let old_uri = self.get_type(old_type_id)?.map(|t| t.uri());
        let new_uri = self.get_type(new_type_id)?.map(|t| t.uri());
        if let (Some(old_uri), Some(Value::Array(types))) = (&old_uri, values.get_mut("@type")) {
            types.retain(|t| t.as_str() != Some(old_uri.as_str()));
        }
        values.insert(annal::TYPE_ID.to_string(), Value::from(new_type_id));
        match new_uri {
            Some(uri) => {
                values.insert(annal::TYPE.to_string(), Value::from(uri));
            }
            None => {
                values.remove(annal::TYPE);
            }
        }
        Ok(())
    }

    /// Rewrite every locally stored record with migrated values
    pub fn migrate(&self) -> AnnalResult<usize> {
        let mut count = 0;
        let mut classes: Vec<EntityClass> = [
            EntityKind::Type,
            EntityKind::List,
            EntityKind::View,
            EntityKind::Field,
            EntityKind::Group,
            EntityKind::User,
            EntityKind::Vocab,
        ]
        .into_iter()
        .map(EntityClass::builtin)
        .collect();
        for type_id in store::children(self, &EntityClass::record_type(), None)? {
            classes.push(EntityClass::for_type_id(type_id));
        }
        for class in &classes {
            for id in store::children(self, class, None)? {
                if store::migrate_entity(self, class, &id)? {
                    count += 1;
                }
            }
        }
        self.flush_cache();
        self.regenerate_context()?;
        info!(coll_id = self.id(), count, "migrated collection");
        Ok(count)
    }

    fn post_update(&self, kind: EntityKind) -> AnnalResult<()> {
        if kind.affects_context() {
            self.flush_cache();
            self.regenerate_context()?;
        }
        Ok(())
    }

    /// Drop cached types and fields; true if anything was cached
    pub fn flush_cache(&self) -> bool {
        let types = self.types.borrow_mut().take().is_some();
        let fields = self.fields.borrow_mut().take().is_some();
        if types || fields {
            debug!(coll_id = self.id(), "flushed caches");
        }
        types || fields
    }

    /// Rebuild and write the collection context file
    pub fn regenerate_context(&self) -> AnnalResult<Value> {
        context::write_collection_context(self)
    }

    // ========================================================================
    // Caches
    // ========================================================================

    /// Run a function against the type registry, loading it if needed
    pub fn with_types<R>(&self, f: impl FnOnce(&mut TypeRegistry) -> R) -> AnnalResult<R> {
        let mut slot = self.types.borrow_mut();
        let registry = match slot.take() {
            Some(registry) => registry,
            None => TypeRegistry::load(self)?,
        };
        Ok(f(slot.insert(registry)))
    }

    /// Run a function against the field cache, loading it if needed
    pub fn with_fields<R>(&self, f: impl FnOnce(&mut FieldCache) -> R) -> AnnalResult<R> {
        let mut slot = self.fields.borrow_mut();
        let cache = match slot.take() {
            Some(cache) => cache,
            None => FieldCache::load(self)?,
        };
        Ok(f(slot.insert(cache)))
    }

    /// Ids of a type and all its subtypes
    pub fn subtype_ids(&self, type_id: &str) -> AnnalResult<Vec<String>> {
        self.with_types(|types| types.subtype_ids(type_id))
    }

    pub fn supertype_uris(&self, type_uri: &str) -> AnnalResult<BTreeSet<String>> {
        self.with_types(|types| types.supertype_uris(type_uri))
    }

    pub fn subproperty_uris(&self, property_uri: &str) -> AnnalResult<Vec<String>> {
        self.with_fields(|fields| fields.subproperty_uris(property_uri))
    }

    // ========================================================================
    // Metadata records
    // ========================================================================

    pub fn get_type(&self, type_id: &str) -> AnnalResult<Option<RecordType>> {
        self.with_types(|types| types.get_type(type_id).cloned())
    }

    pub fn get_field(&self, field_id: &str) -> AnnalResult<Option<RecordField>> {
        self.with_fields(|fields| fields.get_field(field_id).cloned())
    }

    pub fn get_view(&self, view_id: &str) -> AnnalResult<Option<RecordView>> {
        self.get_record(EntityClass::view(), view_id, RecordView::from_entity)
    }

    pub fn get_list(&self, list_id: &str) -> AnnalResult<Option<RecordList>> {
        self.get_record(EntityClass::list(), list_id, RecordList::from_entity)
    }

    pub fn get_group(&self, group_id: &str) -> AnnalResult<Option<RecordGroup>> {
        self.get_record(EntityClass::group(), group_id, RecordGroup::from_entity)
    }

    pub fn get_user(&self, user_id: &str) -> AnnalResult<Option<UserPermissions>> {
        self.get_record(EntityClass::user(), user_id, UserPermissions::from_entity)
    }

    pub fn get_vocab(&self, prefix: &str) -> AnnalResult<Option<RecordVocab>> {
        self.get_record(EntityClass::vocab(), prefix, RecordVocab::from_entity)
    }

    fn get_record<T>(&self, class: EntityClass, id: &str, wrap: fn(Entity) -> T) -> AnnalResult<Option<T>> {
        Ok(store::load(self, &class, id, Some(AltScope::All))?.map(wrap))
    }

    fn records<T>(&self, class: EntityClass, wrap: fn(Entity) -> T) -> AnnalResult<Vec<T>> {
        let mut records = Vec::new();
        for id in store::children(self, &class, Some(AltScope::All))? {
            if let Some(entity) = store::load(self, &class, &id, Some(AltScope::All))? {
                records.push(wrap(entity));
            }
        }
        Ok(records)
    }

    pub fn types(&self) -> AnnalResult<Vec<RecordType>> {
        self.records(EntityClass::record_type(), RecordType::from_entity)
    }

    pub fn views(&self) -> AnnalResult<Vec<RecordView>> {
        self.records(EntityClass::view(), RecordView::from_entity)
    }

    pub fn lists(&self) -> AnnalResult<Vec<RecordList>> {
        self.records(EntityClass::list(), RecordList::from_entity)
    }

    pub fn fields(&self) -> AnnalResult<Vec<RecordField>> {
        self.records(EntityClass::field(), RecordField::from_entity)
    }

    pub fn groups(&self) -> AnnalResult<Vec<RecordGroup>> {
        self.records(EntityClass::group(), RecordGroup::from_entity)
    }

    pub fn vocabs(&self) -> AnnalResult<Vec<RecordVocab>> {
        self.records(EntityClass::vocab(), RecordVocab::from_entity)
    }
}

impl EntityParent for Collection {
    fn parent_id(&self) -> &str {
        self.entity.id()
    }

    fn dir(&self) -> &Path {
        self.entity.dir()
    }

    fn url(&self) -> &Url {
        self.entity.url()
    }

    fn uses_altpath(&self) -> bool {
        self.is_sitedata()
    }

    fn includes_local(&self, altscope: Option<AltScope>) -> bool {
        self.is_sitedata() || altscope != Some(AltScope::Site)
    }

    fn alt_parents(&self, altscope: Option<AltScope>) -> AnnalResult<Vec<Collection>> {
        self.alt_ancestry(altscope)
    }
}

/// Built-in types keep their ids: neither side of a type rename may be one
pub fn check_type_rename(old_id: &str, new_id: &str) -> AnnalResult<()> {
    for id in [old_id, new_id] {
        if is_builtin_id(id) {
            return Err(AnnalError::BadRequest(format!(
                "built-in type '{}' cannot be renamed or redefined",
                id
            )));
        }
    }
    Ok(())
}
