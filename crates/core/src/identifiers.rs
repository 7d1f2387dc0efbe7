//! Entity identifiers
//!
//! Identifiers are letters, digits, `_` and `-`, and may not begin with a
//! digit or `-`. Ids beginning with `_` are reserved for built-in entities.
//! The one digit-initial form accepted is the 8-digit id produced by id
//! allocation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AnnalError, AnnalResult};

/// Id of the site-wide built-in data collection
pub const SITEDATA_ID: &str = "_annalist_site";

/// Directory name holding collection metadata
pub const COLL_META_DIR: &str = "_annalist_collection";

/// Reserved id for the initial-values placeholder of a type
pub const INITIAL_VALUES_ID: &str = "_initial_values";

/// Permission record for authenticated users with no specific record
pub const DEFAULT_USER_ID: &str = "_default_user_perms";

/// Permission record and identity for anonymous users
pub const UNKNOWN_USER_ID: &str = "_unknown_user_perms";

/// User URI reported for anonymous requests
pub const UNKNOWN_USER_URI: &str = "annal:User/_unknown_user_perms";

/// User URI stamped on the default permissions record
pub const DEFAULT_USER_URI: &str = "annal:User/_default_user_perms";

const RESERVED_IDS: &[&str] = &[SITEDATA_ID, COLL_META_DIR];

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_-]*|[0-9]{8})$").expect("identifier pattern is valid")
});

/// Test whether an id is a syntactically valid, non-reserved identifier
pub fn valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id) && !RESERVED_IDS.contains(&id)
}

/// True for ids of the form produced by id allocation
pub fn is_allocated_id(id: &str) -> bool {
    id.len() == 8 && id.bytes().all(|b| b.is_ascii_digit())
}

/// Check an id supplied at an API edge
pub fn check_id(id: &str) -> AnnalResult<()> {
    if RESERVED_IDS.contains(&id) {
        return Err(AnnalError::ReservedIdentifier(id.to_string()));
    }
    if !ID_PATTERN.is_match(id) {
        return Err(AnnalError::invalid_id(id));
    }
    Ok(())
}

/// True if the id is reserved for built-in use
pub fn is_builtin_id(id: &str) -> bool {
    id.starts_with('_')
}

/// True if the id denotes an initial-values placeholder
pub fn is_initial_values_id(id: &str) -> bool {
    id == INITIAL_VALUES_ID
}

/// Extract the entity id from a `type_id/entity_id` reference.
///
/// A bare id is returned unchanged.
pub fn extract_entity_id(reference: &str) -> &str {
    match reference.rsplit_once('/') {
        Some((_, id)) => id,
        None => reference,
    }
}

/// Split a `type_id/entity_id` reference, supplying a default type id
pub fn split_type_entity_id<'a>(reference: &'a str, default_type_id: &'a str) -> (&'a str, &'a str) {
    match reference.split_once('/') {
        Some((type_id, entity_id)) if !type_id.is_empty() => (type_id, entity_id),
        Some((_, entity_id)) => (default_type_id, entity_id),
        None => (default_type_id, reference),
    }
}

/// Build a `type_id/entity_id` reference
pub fn make_type_entity_id(type_id: &str, entity_id: &str) -> String {
    format!("{}/{}", type_id, entity_id)
}
