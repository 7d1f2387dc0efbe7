//! Stored entities and the parents that contain them
//!
//! An entity's URL and directory are never stored independently: both are
//! derived from the parent's URL and directory plus the class template.

use std::path::{Path, PathBuf};

use annal_core::vocab::{annal, rdfs};
use annal_core::{AltScope, AnnalError, AnnalResult, EntityValues, ValuesExt};
use serde_json::Value;
use url::Url;

use crate::collection::Collection;
use crate::layout::EntityClass;

// ============================================================================
// Entity Parent
// ============================================================================

/// A container of entities: the site (for collections) or a collection
pub trait EntityParent {
    /// Id of the parent itself
    fn parent_id(&self) -> &str;

    /// Directory of the parent
    fn dir(&self) -> &Path;

    /// URL of the parent; always ends with `/`
    fn url(&self) -> &Url;

    /// Whether this parent stores its entities at the class altpath
    fn uses_altpath(&self) -> bool {
        false
    }

    /// Storage path of an entity relative to this parent
    fn relpath(&self, class: &EntityClass, id: &str) -> String {
        if self.uses_altpath() {
            class.altpath(id)
        } else {
            class.entitypath(id)
        }
    }

    /// Whether the parent's own entities are visible under the given scope
    fn includes_local(&self, altscope: Option<AltScope>) -> bool {
        altscope != Some(AltScope::Site)
    }

    /// Alt-parents consulted, in precedence order, under the given scope
    fn alt_parents(&self, altscope: Option<AltScope>) -> AnnalResult<Vec<Collection>>;
}

/// Join a relative directory path onto a URL, keeping a trailing slash
pub(crate) fn join_url(base: &Url, relpath: &str) -> AnnalResult<Url> {
    let rel = if relpath.ends_with('/') || relpath.is_empty() {
        relpath.to_string()
    } else {
        format!("{}/", relpath)
    };
    base.join(&rel)
        .map_err(|e| AnnalError::unexpected(format!("cannot resolve '{}' against {}: {}", rel, base, e)))
}

// ============================================================================
// Entity
// ============================================================================

/// A stored record with its location and values
#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    class: EntityClass,
    parent_id: String,
    url: Url,
    view_url: Url,
    dir: PathBuf,
    altpath: bool,
    values: EntityValues,
}

impl Entity {
    /// Describe an entity at its primary location beneath a parent
    pub fn locate<P: EntityParent + ?Sized>(
        parent: &P,
        class: &EntityClass,
        id: &str,
    ) -> AnnalResult<Self> {
        // The site data collection is addressable by its reserved id.
        if id != annal_core::SITEDATA_ID {
            annal_core::identifiers::check_id(id)?;
        }
        let relpath = parent.relpath(class, id);
        Ok(Self {
            id: id.to_string(),
            class: class.clone(),
            parent_id: parent.parent_id().to_string(),
            url: join_url(parent.url(), &relpath)?,
            view_url: join_url(parent.url(), &class.viewpath(id))?,
            dir: parent.dir().join(&relpath),
            altpath: parent.uses_altpath(),
            values: EntityValues::new(),
        })
    }

    /// Re-home an entity found in an alt-parent under the requesting parent's view URL
    pub(crate) fn with_view_url(mut self, view_url: Url) -> Self {
        self.view_url = view_url;
        self
    }

    pub(crate) fn with_values(mut self, values: EntityValues) -> Self {
        self.values = values;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_id(&self) -> &str {
        self.class.type_id()
    }

    pub fn class(&self) -> &EntityClass {
        &self.class
    }

    /// Id of the parent the entity is stored under
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Storage URL, in lockstep with the directory
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL under which the entity is presented by the requesting collection
    pub fn view_url(&self) -> &Url {
        &self.view_url
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the entity is stored in the site-data layout
    pub fn is_altpath(&self) -> bool {
        self.altpath
    }

    /// Path of the body file
    pub fn body_path(&self) -> PathBuf {
        self.dir.join(self.class.entityfile())
    }

    pub fn values(&self) -> &EntityValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut EntityValues {
        &mut self.values
    }

    pub fn into_values(self) -> EntityValues {
        self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Label, defaulting to the id
    pub fn label(&self) -> &str {
        self.values.str_value(rdfs::LABEL).unwrap_or(&self.id)
    }

    pub fn comment(&self) -> &str {
        self.values.str_or_empty(rdfs::COMMENT)
    }

    /// The entity's own type URI (`annal:type`)
    pub fn type_uri(&self) -> &str {
        self.values
            .str_value(annal::TYPE)
            .unwrap_or_else(|| self.class.class_uri())
    }

    /// All `@type` values
    pub fn types(&self) -> Vec<String> {
        self.values.string_list("@type")
    }
}
