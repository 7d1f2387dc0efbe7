//! User permission records

use std::collections::BTreeSet;

use annal_core::vocab::{annal, rdfs};
use annal_core::{AnnalError, AnnalResult, Permission, Validatable, ValuesExt};
use serde_json::Value;
use tracing::warn;

use crate::entity::Entity;
use crate::records::ValuesBuilder;

/// Permission grants for one user within a collection
#[derive(Debug, Clone)]
pub struct UserPermissions {
    entity: Entity,
}

impl UserPermissions {
    pub fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn id(&self) -> &str {
        self.entity.id()
    }

    /// Authenticated identity the record is bound to
    pub fn user_uri(&self) -> &str {
        self.entity.values().str_or_empty(annal::USER_URI)
    }

    /// Granted permissions; unrecognised tokens are reported and skipped
    pub fn permissions(&self) -> BTreeSet<Permission> {
        self.entity
            .values()
            .string_list(annal::USER_PERMISSION)
            .iter()
            .filter_map(|token| {
                let perm = Permission::from_token(token);
                if perm.is_none() {
                    warn!(user_id = self.id(), token = token.as_str(), "unknown permission token");
                }
                perm
            })
            .collect()
    }

    pub fn has_permission(&self, perm: Permission) -> bool {
        self.permissions().contains(&perm)
    }

    /// Values for a new user record
    pub fn values(label: &str, comment: &str, user_uri: &str, permissions: &[Permission]) -> ValuesBuilder {
        let tokens: Vec<Value> = permissions.iter().map(|p| Value::from(p.token())).collect();
        ValuesBuilder::new()
            .with_label(label)
            .with_comment(comment)
            .with(annal::USER_URI, user_uri)
            .with(annal::USER_PERMISSION, tokens)
    }
}

impl Validatable for UserPermissions {
    fn validate(&self) -> AnnalResult<()> {
        let values = self.entity.values();
        for key in [rdfs::LABEL, rdfs::COMMENT, annal::USER_URI] {
            if values.str_value(key).is_none_or(str::is_empty) {
                return Err(AnnalError::unexpected(format!(
                    "user record '{}' lacks {}",
                    self.id(),
                    key
                )));
            }
        }
        if !matches!(values.get(annal::USER_PERMISSION), Some(Value::Array(_))) {
            return Err(AnnalError::unexpected(format!(
                "user record '{}' lacks {}",
                self.id(),
                annal::USER_PERMISSION
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EntityClass;
    use crate::site::Site;
    use crate::store;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_user_permissions() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/testsite/").unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        let values = UserPermissions::values(
            "Alice",
            "Test user",
            "mailto:alice@example.org",
            &[Permission::View, Permission::Create],
        )
        .build();
        let e = store::create(&coll, &EntityClass::user(), "alice", values).unwrap();
        let u = UserPermissions::from_entity(e);
        assert_eq!(u.user_uri(), "mailto:alice@example.org");
        assert!(u.has_permission(Permission::Create));
        assert!(!u.has_permission(Permission::Delete));
        assert!(u.is_valid());
    }

    #[test]
    fn test_user_record_requires_all_parts() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/testsite/").unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        let values = json!({
            "rdfs:label": "Bob",
            "annal:user_uri": "mailto:bob@example.org",
            "annal:user_permission": ["VIEW", "NOSUCH"],
        });
        let e = store::create(
            &coll,
            &EntityClass::user(),
            "bob",
            values.as_object().cloned().unwrap(),
        )
        .unwrap();
        let u = UserPermissions::from_entity(e);
        assert!(!u.is_valid());
        assert_eq!(u.permissions().len(), 1);
    }
}
