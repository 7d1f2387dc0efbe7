//! Choice lists for enumerated and reference fields

use annal_core::{AltScope, AnnalResult, make_type_entity_id};
use annal_models::Collection;
use indexmap::IndexMap;
use serde::Serialize;

use crate::finder::EntityFinder;
use crate::selector::{Selector, SelectorContext};

/// One selectable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChoice {
    /// Value stored in the entity when chosen
    pub value: String,
    /// Entity id of the choice, or the value for fixed choices
    pub id: String,
    pub label: String,
    /// View URL path of the chosen entity
    pub link: Option<String>,
}

impl FieldChoice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            id: value.clone(),
            value,
            label: label.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Label shown in a selection list; the id is appended when it differs
    pub fn choice_label(&self) -> String {
        if self.label.is_empty() {
            self.id.clone()
        } else if self.id.is_empty() || self.label == self.id {
            self.label.clone()
        } else {
            format!("{} ({})", self.label, self.id)
        }
    }
}

/// Choices keyed by value, in presentation order
pub type ChoiceMap = IndexMap<String, FieldChoice>;

/// Enumerate the entities of a reference type, subtypes included, that
/// satisfy the restriction.
pub fn enumerate_choices(
    coll: &Collection,
    ref_type: &str,
    restriction: &Selector,
    context: &SelectorContext,
) -> AnnalResult<ChoiceMap> {
    let finder = EntityFinder::new(coll, restriction.clone());
    let entities = finder.get_entities(ref_type, Some(AltScope::Select), context, None)?;
    Ok(entities
        .into_iter()
        .map(|e| {
            let value = make_type_entity_id(e.type_id(), e.id());
            let choice = FieldChoice {
                value: value.clone(),
                id: e.id().to_string(),
                label: e.label().to_string(),
                link: Some(e.view_url().path().to_string()),
            };
            (value, choice)
        })
        .collect())
}

/// Prepend the empty choice offered by optional selections
pub fn with_empty_choice(choices: ChoiceMap, placeholder: &str) -> ChoiceMap {
    let mut out = ChoiceMap::with_capacity(choices.len() + 1);
    out.insert(String::new(), FieldChoice::new("", placeholder));
    out.extend(choices);
    out
}

/// Find the choice for a stored value; bare ids are taken as ids of the
/// reference type.
pub fn lookup_choice<'c>(choices: &'c ChoiceMap, ref_type: Option<&str>, value: &str) -> Option<&'c FieldChoice> {
    if let Some(choice) = choices.get(value) {
        return Some(choice);
    }
    let ref_type = ref_type?;
    if value.contains('/') {
        return None;
    }
    choices.get(&make_type_entity_id(ref_type, value))
}
