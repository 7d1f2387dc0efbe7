//! Vocabulary namespace records

use annal_core::vocab::{annal, rdfs};
use annal_core::{AnnalError, AnnalResult, Validatable, ValuesExt};

use crate::entity::Entity;
use crate::records::ValuesBuilder;

/// A namespace prefix; the record id is the prefix
#[derive(Debug, Clone)]
pub struct RecordVocab {
    entity: Entity,
}

impl RecordVocab {
    pub fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn prefix(&self) -> &str {
        self.entity.id()
    }

    pub fn uri(&self) -> &str {
        self.entity.values().str_or_empty(annal::URI)
    }

    pub fn see_also(&self) -> Vec<String> {
        self.entity.values().id_list(rdfs::SEE_ALSO)
    }

    pub fn values(label: &str, uri: &str) -> ValuesBuilder {
        ValuesBuilder::new().with_label(label).with(annal::URI, uri)
    }
}

impl Validatable for RecordVocab {
    fn validate(&self) -> AnnalResult<()> {
        let uri = self.uri();
        if uri.is_empty() {
            return Err(AnnalError::unexpected(format!(
                "vocabulary '{}' has no namespace URI",
                self.prefix()
            )));
        }
        if !(uri.ends_with('#') || uri.ends_with('/')) {
            return Err(AnnalError::unexpected(format!(
                "vocabulary '{}' namespace '{}' must end with '#' or '/'",
                self.prefix(),
                uri
            )));
        }
        Ok(())
    }
}
