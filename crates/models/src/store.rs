//! Entity store: load, save, enumerate and remove entities
//!
//! Bodies are JSON objects written with write-temp-then-rename, so readers
//! see either the previous or the new complete body.
//!
//! ```text
//! load(parent, class, id, scope)
//!   ├── <parent>/<relpath>/<entityfile>          local hit
//!   └── for alt in parent.alt_parents(scope)     first hit wins
//!         <alt>/<alt relpath>/<entityfile>
//! ```

use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use annal_core::vocab::annal;
use annal_core::{AltScope, AnnalError, AnnalResult, EntityValues, check_id};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::entity::{Entity, EntityParent, join_url};
use crate::layout::EntityClass;
use crate::migration;

/// Last id handed out by `allocate_new_id`
static LAST_ALLOCATED_ID: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// Body I/O
// ============================================================================

/// Write a JSON value atomically, replacing any existing file
pub(crate) fn write_json_atomic(path: &Path, value: &Value) -> AnnalResult<()> {
    let dir = path.parent().ok_or_else(|| AnnalError::FileWrite {
        path: path.to_path_buf(),
        message: "no parent directory".to_string(),
    })?;
    std::fs::create_dir_all(dir).map_err(|e| AnnalError::DirectoryCreate {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    let write_err = |message: String| AnnalError::FileWrite {
        path: path.to_path_buf(),
        message,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
    serde_json::to_writer_pretty(&mut tmp, value).map_err(|e| write_err(e.to_string()))?;
    tmp.write_all(b"\n").map_err(|e| write_err(e.to_string()))?;
    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;
    Ok(())
}

/// Read a body file; `Ok(None)` if it is absent
pub(crate) fn read_json_object(path: &Path) -> AnnalResult<Option<EntityValues>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AnnalError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(values)) => Ok(Some(values)),
        Ok(_) => Err(AnnalError::InvalidBody {
            path: path.to_path_buf(),
            message: "body is not a JSON object".to_string(),
        }),
        Err(e) => Err(AnnalError::InvalidBody {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

// ============================================================================
// Stamping
// ============================================================================

/// Fill in the housekeeping values every stored body carries
fn stamp(entity: &mut Entity) {
    let class = entity.class().clone();
    let id = entity.id().to_string();
    let view_path = entity.view_url().path().to_string();
    let contextref = class.contextref(entity.is_altpath());
    let values = entity.values_mut();

    let mut types: Vec<String> = match values.get("@type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => vec![],
    };
    if let Some(type_uri) = values.get(annal::TYPE).and_then(Value::as_str) {
        if !types.iter().any(|t| t == type_uri) {
            types.insert(0, type_uri.to_string());
        }
    }
    if !types.iter().any(|t| t == class.class_uri()) {
        types.push(class.class_uri().to_string());
    }
    let type_uri = values
        .get(annal::TYPE)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| types[0].clone());

    values.insert("@id".to_string(), Value::from(class.entityref()));
    values.insert("@type".to_string(), Value::from(types));
    values.insert("@context".to_string(), Value::from(vec![contextref]));
    values.insert(annal::ID.to_string(), Value::from(id));
    values.insert(annal::TYPE_ID.to_string(), Value::from(class.type_id()));
    values.insert(annal::TYPE.to_string(), Value::from(type_uri));
    values.insert(annal::URL.to_string(), Value::from(view_path));
}

/// Supply `@id`/`@type` defaults for a body read from disk
fn synthesise_defaults(entity: &mut Entity) {
    let class = entity.class().clone();
    let id = entity.id().to_string();
    let values = entity.values_mut();
    values
        .entry("@id")
        .or_insert_with(|| Value::from(class.entityref()));
    values
        .entry("@type")
        .or_insert_with(|| Value::from(vec![class.class_uri()]));
    values
        .entry(annal::ID)
        .or_insert_with(|| Value::from(id));
    values
        .entry(annal::TYPE_ID)
        .or_insert_with(|| Value::from(class.type_id()));
}

// ============================================================================
// Operations
// ============================================================================

/// True if the entity body exists directly under the parent
pub fn exists<P: EntityParent + ?Sized>(parent: &P, class: &EntityClass, id: &str) -> bool {
    if !annal_core::valid_id(id) && id != annal_core::SITEDATA_ID {
        return false;
    }
    parent
        .dir()
        .join(parent.relpath(class, id))
        .join(class.entityfile())
        .is_file()
}

/// Create (or overwrite) an entity with the supplied values
pub fn create<P: EntityParent + ?Sized>(
    parent: &P,
    class: &EntityClass,
    id: &str,
    values: EntityValues,
) -> AnnalResult<Entity> {
    let mut entity = Entity::locate(parent, class, id)?.with_values(values);
    save(&mut entity)?;
    debug!(type_id = class.type_id(), id, dir = %entity.dir().display(), "created entity");
    Ok(entity)
}

/// Write an entity's current values to its body file
pub fn save(entity: &mut Entity) -> AnnalResult<()> {
    let class = entity.class().clone();
    migration::migrate_values(&class, entity.values_mut());
    stamp(entity);
    std::fs::create_dir_all(entity.dir()).map_err(|e| AnnalError::DirectoryCreate {
        path: entity.dir().to_path_buf(),
        message: e.to_string(),
    })?;
    write_json_atomic(&entity.body_path(), &Value::Object(entity.values().clone()))
}

/// Load an entity, consulting alt-parents when it is not stored locally.
///
/// A missing body yields `Ok(None)`. An entity found in an alt-parent keeps
/// the requesting parent's view URL.
pub fn load<P: EntityParent + ?Sized>(
    parent: &P,
    class: &EntityClass,
    id: &str,
    altscope: Option<AltScope>,
) -> AnnalResult<Option<Entity>> {
    if id != annal_core::SITEDATA_ID {
        check_id(id)?;
    }
    let local = Entity::locate(parent, class, id)?;
    if let Some(values) = read_json_object(&local.body_path())? {
        return Ok(Some(finish_load(local, values)));
    }
    let view_url = local.view_url().clone();
    for alt in parent.alt_parents(altscope)? {
        let found = Entity::locate(&alt, class, id)?;
        if let Some(values) = read_json_object(&found.body_path())? {
            debug!(type_id = class.type_id(), id, from = alt.id(), "inherited entity");
            return Ok(Some(finish_load(found.with_view_url(view_url), values)));
        }
    }
    Ok(None)
}

fn finish_load(entity: Entity, mut values: EntityValues) -> Entity {
    migration::migrate_values(entity.class(), &mut values);
    let mut entity = entity.with_values(values);
    synthesise_defaults(&mut entity);
    entity
}

/// Remove an entity directory with its attachments
pub fn remove<P: EntityParent + ?Sized>(parent: &P, class: &EntityClass, id: &str) -> AnnalResult<()> {
    check_id(id)?;
    if !exists(parent, class, id) {
        return Err(AnnalError::not_found(class.type_id(), id));
    }
    let dir = parent.dir().join(parent.relpath(class, id));
    std::fs::remove_dir_all(&dir).map_err(|e| AnnalError::DirectoryRemove {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    debug!(type_id = class.type_id(), id, "removed entity");
    Ok(())
}

/// Ids stored directly under a parent, sorted
fn local_children<P: EntityParent + ?Sized>(parent: &P, class: &EntityClass) -> AnnalResult<Vec<String>> {
    let container = parent.dir().join(class.container_path(parent.uses_altpath()));
    let entries = match std::fs::read_dir(&container) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => {
            return Err(AnnalError::FileRead {
                path: container,
                message: e.to_string(),
            });
        }
    };
    let mut ids: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|id| class.is_listable_id(id))
        .filter(|id| container.join(id).join(class.entityfile()).is_file())
        .collect();
    ids.sort();
    Ok(ids)
}

/// Enumerate child ids of a class.
///
/// Local ids come first; ids found via alt-parents follow in precedence
/// order, with duplicates suppressed.
pub fn children<P: EntityParent + ?Sized>(
    parent: &P,
    class: &EntityClass,
    altscope: Option<AltScope>,
) -> AnnalResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    if parent.includes_local(altscope) {
        for id in local_children(parent, class)? {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }
    for alt in parent.alt_parents(altscope)? {
        for id in local_children(&alt, class)? {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// Allocate an unused 8-digit id
pub fn allocate_new_id<P: EntityParent + ?Sized>(parent: &P, class: &EntityClass) -> String {
    loop {
        let n = LAST_ALLOCATED_ID.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("{:08}", n);
        if !exists(parent, class, &id) {
            return id;
        }
    }
}

/// Rewrite a stored body under a parent, migrating legacy keys
pub fn migrate_entity<P: EntityParent + ?Sized>(
    parent: &P,
    class: &EntityClass,
    id: &str,
) -> AnnalResult<bool> {
    match load(parent, class, id, None)? {
        Some(mut entity) => {
            save(&mut entity)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// URL of an entity relative to a parent, without loading it
pub fn entity_view_url<P: EntityParent + ?Sized>(
    parent: &P,
    class: &EntityClass,
    id: &str,
) -> AnnalResult<url::Url> {
    join_url(parent.url(), &class.viewpath(id))
}

// ============================================================================
// Tests
// ============================================================================
