//! Route resolution for paths under the site base URL
//!
//! | Path | Route |
//! |------|-------|
//! | `` | site home |
//! | `c/<coll>/` or `c/<coll>/d/` | types of a collection |
//! | `c/<coll>/d/<type>/` | entities of a type |
//! | `c/<coll>/d/<type>/<entity>/` | one entity |
//! | `c/<coll>/d/<type>/<entity>/<name>` | an attachment of the entity |
//! | `c/<coll>/_annalist_collection/coll_context.jsonld` | collection context |

use annal_core::valid_id;
use annal_models::layout::coll_context_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Site,
    TypeList { coll_id: String },
    EntityList { coll_id: String, type_id: String },
    Entity { coll_id: String, type_id: String, entity_id: String },
    Attachment { coll_id: String, type_id: String, entity_id: String, name: String },
    Context { coll_id: String },
}

impl Route {
    pub fn coll_id(&self) -> Option<&str> {
        match self {
            Route::Site => None,
            Route::TypeList { coll_id }
            | Route::EntityList { coll_id, .. }
            | Route::Entity { coll_id, .. }
            | Route::Attachment { coll_id, .. }
            | Route::Context { coll_id } => Some(coll_id),
        }
    }
}

/// Resolve a request path against the site base path.
///
/// Returns `None` for paths outside the site or with malformed ids.
pub fn parse_route(base_path: &str, path: &str) -> Option<Route> {
    let rest = path.strip_prefix(base_path)?;
    if rest.is_empty() {
        return Some(Route::Site);
    }
    let trailing = rest.ends_with('/');
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    let id = |s: &str| valid_id(s).then(|| s.to_string());
    let route = match segments.as_slice() {
        ["c", coll] if trailing => Route::TypeList { coll_id: id(coll)? },
        ["c", coll, "d"] if trailing => Route::TypeList { coll_id: id(coll)? },
        ["c", coll, "d", type_id] if trailing => Route::EntityList {
            coll_id: id(coll)?,
            type_id: id(type_id)?,
        },
        ["c", coll, "d", type_id, entity_id] if trailing => Route::Entity {
            coll_id: id(coll)?,
            type_id: id(type_id)?,
            entity_id: id(entity_id)?,
        },
        ["c", coll, "d", type_id, entity_id, name] if !trailing => Route::Attachment {
            coll_id: id(coll)?,
            type_id: id(type_id)?,
            entity_id: id(entity_id)?,
            name: name.to_string(),
        },
        ["c", coll, meta, file] if !trailing && format!("{}/{}", meta, file) == coll_context_path() => {
            Route::Context { coll_id: id(coll)? }
        }
        _ => return None,
    };
    Some(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "/annalist/";

    #[test]
    fn test_entity_routes() {
        assert_eq!(parse_route(BASE, "/annalist/"), Some(Route::Site));
        assert_eq!(
            parse_route(BASE, "/annalist/c/testcoll/d/testtype/entity1/"),
            Some(Route::Entity {
                coll_id: "testcoll".into(),
                type_id: "testtype".into(),
                entity_id: "entity1".into()
            })
        );
        assert_eq!(
            parse_route(BASE, "/annalist/c/testcoll/d/_type/"),
            Some(Route::EntityList {
                coll_id: "testcoll".into(),
                type_id: "_type".into()
            })
        );
        assert_eq!(
            parse_route(BASE, "/annalist/c/testcoll/d/t/e1_new/img_field.jpg"),
            Some(Route::Attachment {
                coll_id: "testcoll".into(),
                type_id: "t".into(),
                entity_id: "e1_new".into(),
                name: "img_field.jpg".into()
            })
        );
        assert_eq!(
            parse_route(BASE, "/annalist/c/testcoll/_annalist_collection/coll_context.jsonld"),
            Some(Route::Context {
                coll_id: "testcoll".into()
            })
        );
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(parse_route(BASE, "/other/c/testcoll/"), None);
        assert_eq!(parse_route(BASE, "/annalist/c/testcoll/x/"), None);
        assert_eq!(parse_route(BASE, "/annalist/c/bad id/d/"), None);
        assert_eq!(parse_route(BASE, "/annalist/c/testcoll/d/t/e1"), None);
    }
}
