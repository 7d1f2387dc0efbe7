//! User permission lookup and authorization
//!
//! ```text
//! anonymous      ─► _unknown_user_perms (scope all)
//! authenticated  ─► first record for user_id with matching user_uri,
//!                   searched in the collection then its ancestry
//!                   ∪ _default_user_perms (scope all)
//! ```

use std::collections::{BTreeSet, HashMap};

use annal_core::{
    AltScope, AnnalError, AnnalResult, DEFAULT_USER_ID, Permission, UNKNOWN_USER_ID,
    UNKNOWN_USER_URI,
};
use tracing::debug;

use crate::collection::Collection;
use crate::layout::EntityClass;
use crate::records::UserPermissions;
use crate::store;

/// Permissions in effect for a user within one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissions {
    /// Id of the collection holding the matched user record, if any
    pub source: Option<String>,
    pub permissions: BTreeSet<Permission>,
}

pub fn is_anonymous(user_id: &str) -> bool {
    user_id.is_empty() || user_id == UNKNOWN_USER_ID
}

/// Find the permissions in effect for `(user_id, user_uri)` in a collection.
///
/// Returns `Ok(None)` when neither a specific record nor a fallback record
/// exists.
pub fn get_user_permissions(
    coll: &Collection,
    user_id: &str,
    user_uri: &str,
) -> AnnalResult<Option<EffectivePermissions>> {
    let class = EntityClass::user();
    if is_anonymous(user_id) {
        let found = store::load(coll, &class, UNKNOWN_USER_ID, Some(AltScope::All))?;
        return Ok(found.map(|e| EffectivePermissions {
            source: Some(e.parent_id().to_string()),
            permissions: UserPermissions::from_entity(e).permissions(),
        }));
    }

    let mut result: Option<EffectivePermissions> = None;
    let mut search = vec![coll.clone()];
    search.extend(coll.alt_ancestry(Some(AltScope::All))?);
    for candidate in &search {
        if let Some(entity) = store::load(candidate, &class, user_id, None)? {
            let user = UserPermissions::from_entity(entity);
            if user.user_uri() == user_uri {
                result = Some(EffectivePermissions {
                    source: Some(candidate.id().to_string()),
                    permissions: user.permissions(),
                });
                break;
            }
            debug!(user_id, coll_id = candidate.id(), "user record URI mismatch");
        }
    }

    if let Some(default) = store::load(coll, &class, DEFAULT_USER_ID, Some(AltScope::All))? {
        let defaults = UserPermissions::from_entity(default).permissions();
        match result.as_mut() {
            Some(found) => found.permissions.extend(defaults),
            None => {
                result = Some(EffectivePermissions {
                    source: None,
                    permissions: defaults,
                })
            }
        }
    }
    Ok(result)
}

/// Check a permission, producing the denial appropriate to the user
pub fn authorize(
    granted: Option<&BTreeSet<Permission>>,
    required: Permission,
    user_id: &str,
    scope: &str,
) -> AnnalResult<()> {
    if granted.is_some_and(|perms| perms.contains(&required)) {
        return Ok(());
    }
    let scope = format!("{} on {}", required, scope);
    if is_anonymous(user_id) {
        Err(AnnalError::Unauthenticated { scope })
    } else {
        Err(AnnalError::Forbidden {
            user_id: user_id.to_string(),
            scope,
        })
    }
}

/// Per-request permission cache, keyed by collection id
#[derive(Debug, Clone)]
pub struct PermissionCache {
    user_id: String,
    user_uri: String,
    by_collection: HashMap<String, BTreeSet<Permission>>,
}

impl PermissionCache {
    pub fn new(user_id: impl Into<String>, user_uri: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_uri: user_uri.into(),
            by_collection: HashMap::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(UNKNOWN_USER_ID, UNKNOWN_USER_URI)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_uri(&self) -> &str {
        &self.user_uri
    }

    pub fn is_anonymous(&self) -> bool {
        is_anonymous(&self.user_id)
    }

    /// Permissions for the user in a collection, read at most once
    pub fn permissions(&mut self, coll: &Collection) -> AnnalResult<&BTreeSet<Permission>> {
        if !self.by_collection.contains_key(coll.id()) {
            let perms = get_user_permissions(coll, &self.user_id, &self.user_uri)?
                .map(|p| p.permissions)
                .unwrap_or_default();
            debug!(user_id = self.user_id.as_str(), coll_id = coll.id(), ?perms, "read permissions");
            self.by_collection.insert(coll.id().to_string(), perms);
        }
        self.by_collection
            .get(coll.id())
            .ok_or_else(|| AnnalError::internal("permission cache entry vanished"))
    }

    pub fn authorize(&mut self, coll: &Collection, required: Permission) -> AnnalResult<()> {
        let user_id = self.user_id.clone();
        let granted = self.permissions(coll)?;
        authorize(Some(granted), required, &user_id, &format!("collection {}", coll.id()))
    }

    pub fn clear(&mut self) {
        self.by_collection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;
    use annal_core::EntityValues;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Collection) {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/testsite/").unwrap();
        site.initialize().unwrap();
        let coll = site.create_collection("testcoll", EntityValues::new()).unwrap();
        (tmp, coll)
    }

    fn add_user(coll: &Collection, id: &str, uri: &str, perms: &[Permission]) {
        let values = UserPermissions::values(id, "test user", uri, perms).build();
        coll.create_entity("_user", id, values).unwrap();
    }

    #[test]
    fn test_specific_record_unions_defaults() {
        let (_tmp, coll) = setup();
        add_user(&coll, "alice", "mailto:alice@example.org", &[Permission::Create]);
        let perms = get_user_permissions(&coll, "alice", "mailto:alice@example.org")
            .unwrap()
            .unwrap();
        assert_eq!(perms.source.as_deref(), Some("testcoll"));
        assert!(perms.permissions.contains(&Permission::Create));
        assert!(perms.permissions.contains(&Permission::View));
    }

    #[test]
    fn test_uri_mismatch_falls_back_to_defaults() {
        let (_tmp, coll) = setup();
        add_user(&coll, "alice", "mailto:alice@example.org", &[Permission::Admin]);
        let perms = get_user_permissions(&coll, "alice", "mailto:other@example.org")
            .unwrap()
            .unwrap();
        assert_eq!(perms.source, None);
        assert!(!perms.permissions.contains(&Permission::Admin));
    }

    #[test]
    fn test_anonymous_uses_unknown_user_only() {
        let (_tmp, coll) = setup();
        let perms = get_user_permissions(&coll, UNKNOWN_USER_ID, UNKNOWN_USER_URI)
            .unwrap()
            .unwrap();
        assert_eq!(perms.permissions, [Permission::View].into());
    }

    #[test]
    fn test_authorize_denials() {
        let granted: BTreeSet<Permission> = [Permission::View].into();
        assert!(authorize(Some(&granted), Permission::View, "alice", "testcoll").is_ok());
        let err = authorize(Some(&granted), Permission::Create, "alice", "testcoll").unwrap_err();
        assert_eq!(err.http_status(), 403);
        let err = authorize(None, Permission::View, UNKNOWN_USER_ID, "testcoll").unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn test_permission_cache() {
        let (_tmp, coll) = setup();
        add_user(&coll, "alice", "mailto:alice@example.org", &[Permission::View]);
        let mut cache = PermissionCache::new("alice", "mailto:alice@example.org");
        assert!(cache.authorize(&coll, Permission::View).is_ok());
        assert!(cache.authorize(&coll, Permission::Create).unwrap_err().is_permission());
        assert!(PermissionCache::anonymous().is_anonymous());
    }
}
