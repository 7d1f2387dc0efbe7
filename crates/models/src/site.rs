//! The site: root parent of all collections

use std::path::{Path, PathBuf};

use annal_core::vocab::{annal, rdfs};
use annal_core::{AltScope, AnnalError, AnnalResult, EntityValues, SITEDATA_ID, check_id};
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::collection::Collection;
use crate::entity::{Entity, EntityParent};
use crate::layout::EntityClass;
use crate::settings::SiteSettings;
use crate::sitedata::UserRecords;
use crate::{sitedata, store};

/// A site rooted at a base directory and served under a base URL
#[derive(Debug, Clone)]
pub struct Site {
    base_dir: PathBuf,
    url: Url,
}

impl Site {
    pub fn new(base_dir: impl AsRef<Path>, base_url: &str) -> AnnalResult<Self> {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let url = Url::parse(&base_url)
            .map_err(|e| AnnalError::InvalidConfig(format!("base URL '{}': {}", base_url, e)))?;
        Ok(Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            url,
        })
    }

    pub fn from_settings(settings: &SiteSettings) -> AnnalResult<Self> {
        Self::new(&settings.base_dir, &settings.base_url)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The site-data collection holding built-in definitions
    pub fn site_data(&self) -> AnnalResult<Collection> {
        let class = EntityClass::collection();
        let entity = match store::load(self, &class, SITEDATA_ID, None)? {
            Some(entity) => entity,
            None => Entity::locate(self, &class, SITEDATA_ID)?,
        };
        Ok(Collection::from_entity(self, entity))
    }

    /// Whether the site data has been written
    pub fn is_initialized(&self) -> bool {
        store::exists(self, &EntityClass::collection(), SITEDATA_ID)
    }

    /// Create the site directory and write the built-in site data
    pub fn initialize(&self) -> AnnalResult<Collection> {
        self.initialize_with(&SiteSettings::default())
    }

    /// As [`Site::initialize`], taking fallback permissions from settings
    pub fn initialize_with(&self, settings: &SiteSettings) -> AnnalResult<Collection> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| AnnalError::DirectoryCreate {
            path: self.base_dir.clone(),
            message: e.to_string(),
        })?;
        let coll = sitedata::write_site_data(self, settings, UserRecords::Replace)?;
        info!(base_dir = %self.base_dir.display(), "initialized site");
        Ok(coll)
    }

    /// Rewrite the built-in site data, keeping existing fallback user records.
    ///
    /// User collections are not touched.
    pub fn update_site_data(&self, settings: &SiteSettings) -> AnnalResult<Collection> {
        if !self.is_initialized() {
            return Err(AnnalError::CollectionNotFound(SITEDATA_ID.to_string()));
        }
        let coll = sitedata::write_site_data(self, settings, UserRecords::Keep)?;
        info!(base_dir = %self.base_dir.display(), "updated site data");
        Ok(coll)
    }

    /// Open a collection; `Ok(None)` if it does not exist
    pub fn collection(&self, coll_id: &str) -> AnnalResult<Option<Collection>> {
        if coll_id == SITEDATA_ID {
            return self.site_data().map(Some);
        }
        check_id(coll_id)?;
        Ok(store::load(self, &EntityClass::collection(), coll_id, None)?
            .map(|entity| Collection::from_entity(self, entity)))
    }

    /// Like [`Site::collection`], but a missing collection is an error
    pub fn require_collection(&self, coll_id: &str) -> AnnalResult<Collection> {
        self.collection(coll_id)?
            .ok_or_else(|| AnnalError::CollectionNotFound(coll_id.to_string()))
    }

    /// Ids of user collections, sorted
    pub fn collection_ids(&self) -> AnnalResult<Vec<String>> {
        Ok(store::children(self, &EntityClass::collection(), None)?
            .into_iter()
            .filter(|id| id != SITEDATA_ID)
            .collect())
    }

    /// Create a new collection and its context
    pub fn create_collection(&self, coll_id: &str, mut values: EntityValues) -> AnnalResult<Collection> {
        check_id(coll_id)?;
        let class = EntityClass::collection();
        if store::exists(self, &class, coll_id) {
            return Err(AnnalError::CollectionExists(coll_id.to_string()));
        }
        values
            .entry(rdfs::LABEL)
            .or_insert_with(|| Value::from(coll_id));
        values.insert(
            annal::SOFTWARE_VERSION.to_string(),
            Value::from(crate::VERSION),
        );
        let entity = store::create(self, &class, coll_id, values)?;
        let coll = Collection::from_entity(self, entity);
        coll.regenerate_context()?;
        info!(coll_id, "created collection");
        Ok(coll)
    }

    /// Remove a collection with everything stored in it
    pub fn remove_collection(&self, coll_id: &str) -> AnnalResult<()> {
        if coll_id == SITEDATA_ID {
            return Err(AnnalError::ReservedIdentifier(coll_id.to_string()));
        }
        check_id(coll_id)?;
        let class = EntityClass::collection();
        if !store::exists(self, &class, coll_id) {
            return Err(AnnalError::CollectionNotFound(coll_id.to_string()));
        }
        store::remove(self, &class, coll_id)?;
        info!(coll_id, "removed collection");
        Ok(())
    }
}

impl EntityParent for Site {
    fn parent_id(&self) -> &str {
        ""
    }

    fn dir(&self) -> &Path {
        &self.base_dir
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn includes_local(&self, _altscope: Option<AltScope>) -> bool {
        true
    }

    fn alt_parents(&self, _altscope: Option<AltScope>) -> AnnalResult<Vec<Collection>> {
        Ok(vec![])
    }
}
