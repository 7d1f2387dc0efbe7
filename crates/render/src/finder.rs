//! Entity enumeration across a type and its subtypes

use annal_core::identifiers::is_initial_values_id;
use annal_core::{AltScope, AnnalResult};
use annal_models::{Collection, Entity};
use serde_json::Value;
use tracing::debug;

use crate::selector::{Selector, SelectorContext};

/// Finds entities of a type, filtered by a selector
pub struct EntityFinder<'a> {
    coll: &'a Collection,
    selector: Selector,
}

impl<'a> EntityFinder<'a> {
    pub fn new(coll: &'a Collection, selector: Selector) -> Self {
        Self { coll, selector }
    }

    /// Finder for a selector expression
    pub fn with_expression(coll: &'a Collection, expr: &str) -> AnnalResult<Self> {
        Ok(Self::new(coll, Selector::parse(expr)?))
    }

    /// Ids of the type and its subtypes
    fn type_ids(&self, type_id: &str) -> AnnalResult<Vec<String>> {
        let mut ids = self.coll.subtype_ids(type_id)?;
        if !ids.iter().any(|id| id == type_id) {
            ids.insert(0, type_id.to_string());
        }
        Ok(ids)
    }

    fn collect(
        &self,
        type_id: &str,
        altscope: Option<AltScope>,
        context: &SelectorContext,
        search: Option<&str>,
        found: &mut Vec<Entity>,
    ) -> AnnalResult<()> {
        for id in self.coll.entity_ids(type_id, altscope)? {
            if is_initial_values_id(&id) {
                continue;
            }
            let Some(entity) = self.coll.load_entity(type_id, &id, altscope)? else {
                continue;
            };
            if !self.selector.select(entity.values(), context) {
                continue;
            }
            if let Some(text) = search.filter(|s| !s.is_empty()) {
                if !contains_text(entity.values().values(), text) {
                    continue;
                }
            }
            found.push(entity);
        }
        Ok(())
    }

    /// Entities of a type and its subtypes, sorted by label and then id.
    ///
    /// `search`, when given, keeps entities with a string value containing
    /// the text (ignoring case).
    pub fn get_entities(
        &self,
        type_id: &str,
        altscope: Option<AltScope>,
        context: &SelectorContext,
        search: Option<&str>,
    ) -> AnnalResult<Vec<Entity>> {
        let mut found = Vec::new();
        for tid in self.type_ids(type_id)? {
            self.collect(&tid, altscope, context, search, &mut found)?;
        }
        sort_entities(&mut found);
        debug!(
            coll_id = self.coll.id(),
            type_id,
            selector = self.selector.source(),
            count = found.len(),
            "found entities"
        );
        Ok(found)
    }

    /// Entities of every type visible in the collection, sorted
    pub fn get_all_entities(
        &self,
        altscope: Option<AltScope>,
        context: &SelectorContext,
        search: Option<&str>,
    ) -> AnnalResult<Vec<Entity>> {
        let mut found = Vec::new();
        for record_type in self.coll.types()? {
            self.collect(record_type.id(), altscope, context, search, &mut found)?;
        }
        sort_entities(&mut found);
        Ok(found)
    }
}

fn sort_entities(entities: &mut [Entity]) {
    entities.sort_by(|a, b| {
        a.label()
            .cmp(b.label())
            .then_with(|| a.id().cmp(b.id()))
            .then_with(|| a.type_id().cmp(b.type_id()))
    });
}

fn contains_text<'v>(mut values: impl Iterator<Item = &'v Value>, text: &str) -> bool {
    let needle = text.to_lowercase();
    values.any(|v| value_contains(v, &needle))
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| value_contains(v, needle)),
        Value::Object(map) => map.values().any(|v| value_contains(v, needle)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annal_models::{RecordType, Site};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Collection) {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/annalist/").unwrap();
        site.initialize().unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        coll.create_entity(
            "_type",
            "animal",
            RecordType::values("Animal", "test:Animal", &[]).build(),
        )
        .unwrap();
        coll.create_entity(
            "_type",
            "dog",
            RecordType::values("Dog", "test:Dog", &["test:Animal"]).build(),
        )
        .unwrap();
        let values = |label: &str, colour: &str| {
            json!({"rdfs:label": label, "test:colour": colour})
                .as_object()
                .cloned()
                .unwrap()
        };
        coll.create_entity("animal", "cat", values("Cat", "black")).unwrap();
        coll.create_entity("dog", "rex", values("Rex", "brown")).unwrap();
        coll.create_entity("dog", "fido", values("Fido", "black")).unwrap();
        (tmp, coll)
    }

    fn ids(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(Entity::id).collect()
    }

    #[test]
    fn test_includes_subtypes_sorted_by_label() {
        let (_tmp, coll) = setup();
        let finder = EntityFinder::new(&coll, Selector::all());
        let found = finder
            .get_entities("animal", Some(AltScope::All), &SelectorContext::new(), None)
            .unwrap();
        assert_eq!(ids(&found), vec!["cat", "fido", "rex"]);

        let dogs = finder
            .get_entities("dog", Some(AltScope::All), &SelectorContext::new(), None)
            .unwrap();
        assert_eq!(ids(&dogs), vec!["fido", "rex"]);
    }

    #[test]
    fn test_selector_and_search_filter() {
        let (_tmp, coll) = setup();
        let finder = EntityFinder::with_expression(&coll, "[test:colour] == 'black'").unwrap();
        let found = finder
            .get_entities("animal", Some(AltScope::All), &SelectorContext::new(), None)
            .unwrap();
        assert_eq!(ids(&found), vec!["cat", "fido"]);

        let found = finder
            .get_entities("animal", Some(AltScope::All), &SelectorContext::new(), Some("FID"))
            .unwrap();
        assert_eq!(ids(&found), vec!["fido"]);
    }

    #[test]
    fn test_inherited_types_are_found() {
        let (_tmp, coll) = setup();
        let finder = EntityFinder::new(&coll, Selector::all());
        let types = finder
            .get_entities("_type", Some(AltScope::All), &SelectorContext::new(), None)
            .unwrap();
        let type_ids = ids(&types);
        assert!(type_ids.contains(&"animal"));
        assert!(type_ids.contains(&"_field"));
        assert!(type_ids.contains(&"_view"));

        let local = finder
            .get_entities("_type", None, &SelectorContext::new(), None)
            .unwrap();
        assert_eq!(ids(&local), vec!["animal", "dog"]);
    }
}
