//! Directory and URL layout of stored entities
//!
//! Every entity class declares where its instances live beneath their
//! parent. The same relative path is used for URLs and directories, so an
//! entity's URL and directory stay in lockstep.
//!
//! ```text
//! <site>/c/<coll>/_annalist_collection/coll_meta.jsonld
//! <site>/c/<coll>/_annalist_collection/types/<id>/type_meta.jsonld   (entitypath)
//! <site>/c/_annalist_site/d/_type/<id>/type_meta.jsonld               (altpath)
//! <site>/c/<coll>/d/<type_id>/<id>/entity_data.jsonld
//! ```

use annal_core::identifiers::COLL_META_DIR;
use annal_core::vocab::annal;
use annal_core::{EntityKind, INITIAL_VALUES_ID};

/// Directory holding collections beneath the site
pub const SITE_COLL_DIR: &str = "c";

/// Directory holding entity data beneath a collection
pub const COLL_DATA_DIR: &str = "d";

/// Name of the collection context file
pub const COLL_CONTEXT_FILE: &str = "coll_context.jsonld";

/// Body file of entity data records
pub const ENTITY_DATA_FILE: &str = "entity_data.jsonld";

/// Path of the context file relative to a collection directory
pub fn coll_context_path() -> String {
    format!("{}/{}", COLL_META_DIR, COLL_CONTEXT_FILE)
}

/// Class descriptor for stored entities: a kind tag plus the type id that
/// names the class within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityClass {
    kind: EntityKind,
    type_id: String,
}

impl EntityClass {
    /// Class for a type id; built-in ids select the matching metadata kind
    pub fn for_type_id(type_id: impl Into<String>) -> Self {
        let type_id = type_id.into();
        Self {
            kind: EntityKind::for_type_id(&type_id),
            type_id,
        }
    }

    /// Class for a built-in metadata kind
    pub fn builtin(kind: EntityKind) -> Self {
        Self {
            kind,
            type_id: kind.builtin_type_id().unwrap_or_default().to_string(),
        }
    }

    pub fn collection() -> Self {
        Self::builtin(EntityKind::Collection)
    }

    pub fn record_type() -> Self {
        Self::builtin(EntityKind::Type)
    }

    pub fn list() -> Self {
        Self::builtin(EntityKind::List)
    }

    pub fn view() -> Self {
        Self::builtin(EntityKind::View)
    }

    pub fn field() -> Self {
        Self::builtin(EntityKind::Field)
    }

    pub fn group() -> Self {
        Self::builtin(EntityKind::Group)
    }

    pub fn user() -> Self {
        Self::builtin(EntityKind::User)
    }

    pub fn vocab() -> Self {
        Self::builtin(EntityKind::Vocab)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Metadata subdirectory beneath `_annalist_collection`
    fn meta_dir(&self) -> Option<&'static str> {
        match self.kind {
            EntityKind::Type => Some("types"),
            EntityKind::List => Some("lists"),
            EntityKind::View => Some("views"),
            EntityKind::Field => Some("fields"),
            EntityKind::Group => Some("groups"),
            EntityKind::User => Some("users"),
            EntityKind::Vocab => Some("vocabs"),
            EntityKind::Enum => Some("enums"),
            EntityKind::Collection | EntityKind::Data => None,
        }
    }

    /// Directory containing all instances, relative to the parent
    pub fn container_path(&self, altpath: bool) -> String {
        match (self.kind, self.meta_dir()) {
            (EntityKind::Collection, _) => SITE_COLL_DIR.to_string(),
            (EntityKind::Data, _) => format!("{}/{}", COLL_DATA_DIR, self.type_id),
            (_, _) if altpath => format!("{}/{}", COLL_DATA_DIR, self.type_id),
            (EntityKind::Enum, Some(dir)) => format!("{}/{}/{}", COLL_META_DIR, dir, self.type_id),
            (_, Some(dir)) => format!("{}/{}", COLL_META_DIR, dir),
            (_, None) => COLL_DATA_DIR.to_string(),
        }
    }

    /// Entity directory relative to the parent, in primary layout
    pub fn entitypath(&self, id: &str) -> String {
        format!("{}/{}", self.container_path(false), id)
    }

    /// Entity directory relative to the parent, in site-data layout
    pub fn altpath(&self, id: &str) -> String {
        format!("{}/{}", self.container_path(true), id)
    }

    /// Body file relative to the entity directory
    pub fn entityfile(&self) -> &'static str {
        match self.kind {
            EntityKind::Collection => "_annalist_collection/coll_meta.jsonld",
            EntityKind::Type => "type_meta.jsonld",
            EntityKind::List => "list_meta.jsonld",
            EntityKind::View => "view_meta.jsonld",
            EntityKind::Field => "field_meta.jsonld",
            EntityKind::Group => "group_meta.jsonld",
            EntityKind::User => "user_meta.jsonld",
            EntityKind::Vocab => "vocab_meta.jsonld",
            EntityKind::Enum => "enum_meta.jsonld",
            EntityKind::Data => ENTITY_DATA_FILE,
        }
    }

    /// `@id` stored in the body: the entity directory relative to the body file
    pub fn entityref(&self) -> &'static str {
        match self.kind {
            EntityKind::Collection => "../",
            _ => "./",
        }
    }

    /// Class URI recorded in `@type`
    pub fn class_uri(&self) -> &'static str {
        match self.kind {
            EntityKind::Collection => annal::COLLECTION_CLASS,
            EntityKind::Type => annal::TYPE_CLASS,
            EntityKind::List => annal::LIST_CLASS,
            EntityKind::View => annal::VIEW_CLASS,
            EntityKind::Field => annal::FIELD_CLASS,
            EntityKind::Group => annal::GROUP_CLASS,
            EntityKind::User => annal::USER_CLASS,
            EntityKind::Vocab => annal::VOCAB_CLASS,
            EntityKind::Enum => annal::ENUM_CLASS,
            EntityKind::Data => annal::ENTITY_DATA_CLASS,
        }
    }

    /// View location relative to the owning collection (or site, for collections)
    pub fn viewpath(&self, id: &str) -> String {
        match self.kind {
            EntityKind::Collection => format!("{}/{}/", SITE_COLL_DIR, id),
            _ => format!("{}/{}/{}/", COLL_DATA_DIR, self.type_id, id),
        }
    }

    /// Relative reference from a body file to the collection context file
    pub fn contextref(&self, altpath: bool) -> String {
        let relpath = match self.kind {
            EntityKind::Collection => String::new(),
            _ if altpath => self.altpath("x"),
            _ => self.entitypath("x"),
        };
        let mut body_dir: Vec<&str> = relpath.split('/').filter(|s| !s.is_empty()).collect();
        if let Some((dirs, _file)) = self.entityfile().rsplit_once('/') {
            body_dir.extend(dirs.split('/'));
        }
        let target = [COLL_META_DIR, COLL_CONTEXT_FILE];
        let common = usize::from(body_dir.first() == Some(&COLL_META_DIR));
        let ups = body_dir.len() - common;
        let mut parts: Vec<&str> = std::iter::repeat_n("..", ups).collect();
        parts.extend(&target[common..]);
        parts.join("/")
    }

    /// Whether a directory entry can be enumerated as an instance
    pub fn is_listable_id(&self, id: &str) -> bool {
        if !annal_core::valid_id(id) || id == INITIAL_VALUES_ID {
            return false;
        }
        !(self.kind == EntityKind::Data && id.starts_with('_'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metadata_paths() {
        let t = EntityClass::record_type();
        assert_eq!(t.type_id(), "_type");
        assert_eq!(t.entitypath("testtype"), "_annalist_collection/types/testtype");
        assert_eq!(t.altpath("testtype"), "d/_type/testtype");
        assert_eq!(t.entityfile(), "type_meta.jsonld");
        assert_eq!(t.viewpath("testtype"), "d/_type/testtype/");
    }

    #[test]
    fn test_entity_data_paths() {
        let d = EntityClass::for_type_id("testtype");
        assert_eq!(d.kind(), EntityKind::Data);
        assert_eq!(d.entitypath("entity1"), "d/testtype/entity1");
        assert_eq!(d.altpath("entity1"), "d/testtype/entity1");
        assert_eq!(d.entityfile(), "entity_data.jsonld");
        assert_eq!(d.class_uri(), "annal:EntityData");
    }

    #[test]
    fn test_enum_paths() {
        let e = EntityClass::for_type_id("_enum_render_type");
        assert_eq!(e.kind(), EntityKind::Enum);
        assert_eq!(
            e.entitypath("Text"),
            "_annalist_collection/enums/_enum_render_type/Text"
        );
        assert_eq!(e.altpath("Text"), "d/_enum_render_type/Text");
    }

    #[test]
    fn test_collection_paths() {
        let c = EntityClass::collection();
        assert_eq!(c.entitypath("testcoll"), "c/testcoll");
        assert_eq!(c.entityfile(), "_annalist_collection/coll_meta.jsonld");
        assert_eq!(c.entityref(), "../");
        assert_eq!(c.viewpath("testcoll"), "c/testcoll/");
    }

    #[test]
    fn test_contextref() {
        assert_eq!(EntityClass::collection().contextref(false), "coll_context.jsonld");
        assert_eq!(
            EntityClass::field().contextref(false),
            "../../coll_context.jsonld"
        );
        assert_eq!(
            EntityClass::field().contextref(true),
            "../../../_annalist_collection/coll_context.jsonld"
        );
        assert_eq!(
            EntityClass::for_type_id("testtype").contextref(false),
            "../../../_annalist_collection/coll_context.jsonld"
        );
        assert_eq!(coll_context_path(), "_annalist_collection/coll_context.jsonld");
    }

    #[test]
    fn test_listable_ids() {
        let data = EntityClass::for_type_id("testtype");
        assert!(data.is_listable_id("entity1"));
        assert!(!data.is_listable_id("_initial_values"));
        assert!(!data.is_listable_id("_hidden"));
        let types = EntityClass::record_type();
        assert!(types.is_listable_id("_type"));
        assert!(!types.is_listable_id("_initial_values"));
        assert!(!types.is_listable_id("9bad"));
    }
}
