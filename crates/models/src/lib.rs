//! # Annal Models
//!
//! Entity storage for the Annalist entity core: the site, its collections,
//! and the typed records stored within them.
//!
//! ## Modules
//!
//! - [`layout`], [`entity`], [`store`]: path templates and JSON body storage
//! - [`site`], [`collection`]: the containment tree and alt-parent ancestry
//! - [`records`]: metadata records (types, views, lists, fields, groups, users, vocabularies)
//! - [`typecache`], [`fieldcache`], [`closure`]: subtype and subproperty closures
//! - [`permissions`]: user permission lookup and authorization
//! - [`context`]: JSON-LD context generation
//! - [`attachments`], [`resources`]: uploaded and imported resources
//! - [`sitedata`], [`settings`]: built-in definitions and site configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use annal_models::Site;
//!
//! let site = Site::new("/var/annalist", "http://localhost:8000/annalist/")?;
//! site.initialize()?;
//! let coll = site.create_collection("testcoll", Default::default())?;
//! let e = coll.create_entity("testtype", "entity1", Default::default())?;
//! ```

pub mod attachments;
pub mod closure;
pub mod collection;
pub mod context;
pub mod entity;
pub mod fieldcache;
pub mod layout;
pub mod migration;
pub mod permissions;
pub mod records;
pub mod resources;
pub mod settings;
pub mod site;
pub mod sitedata;
pub mod store;
pub mod typecache;

pub use attachments::{FileMode, UploadedFile};
pub use collection::{Collection, check_type_rename};
pub use entity::{Entity, EntityParent};
pub use layout::EntityClass;
pub use permissions::{EffectivePermissions, PermissionCache, authorize, get_user_permissions};
pub use records::{
    FieldRef, RecordField, RecordGroup, RecordList, RecordType, RecordView, RecordVocab,
    UserPermissions, ValuesBuilder,
};
pub use settings::SiteSettings;
pub use site::Site;
pub use typecache::TypeRegistry;

/// Software version stamped on collections
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
