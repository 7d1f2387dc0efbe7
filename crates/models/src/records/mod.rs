//! Metadata records that are themselves entities
//!
//! Each record type wraps a loaded [`Entity`] and exposes typed accessors
//! over its stored values:
//!
//! - **RecordType**: a user-defined record class
//! - **RecordView** / **RecordList**: how entities are viewed and listed
//! - **RecordField** / **RecordGroup**: reusable field descriptions
//! - **UserPermissions**: permission grants for a user
//! - **RecordVocab**: a namespace prefix used in the JSON-LD context

pub mod field;
pub mod group;
pub mod list;
pub mod record_type;
pub mod user;
pub mod view;
pub mod vocab;

pub use field::RecordField;
pub use group::RecordGroup;
pub use list::RecordList;
pub use record_type::RecordType;
pub use user::UserPermissions;
pub use view::{FieldRef, RecordView};
pub use vocab::RecordVocab;

use annal_core::EntityValues;
use annal_core::vocab::rdfs;
use serde_json::Value;

/// Builder for record values
#[derive(Debug, Clone, Default)]
pub struct ValuesBuilder {
    values: EntityValues,
}

impl ValuesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `rdfs:label`
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with(rdfs::LABEL, label.into())
    }

    /// Set `rdfs:comment`
    pub fn with_comment(self, comment: impl Into<String>) -> Self {
        self.with(rdfs::COMMENT, comment.into())
    }

    /// Set an arbitrary property
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> EntityValues {
        self.values
    }
}

impl From<ValuesBuilder> for EntityValues {
    fn from(builder: ValuesBuilder) -> Self {
        builder.build()
    }
}
