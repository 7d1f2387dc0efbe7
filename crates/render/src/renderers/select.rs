//! Selection from enumerated choices

use crate::bound::BoundField;
use crate::choices::lookup_choice;
use crate::mappers::value_mapper;
use crate::renderers::html::{escape, link, select};
use crate::renderers::{FieldRenderer, RenderContext};

/// Choice list for enumerated and entity-reference fields.
///
/// A stored value that is not among the choices is kept as an extra
/// option so that saving the form does not lose it.
pub struct SelectRenderer;

impl FieldRenderer for SelectRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let d = field.descriptor();
        let value = value_mapper(d.render_type, d.value_mode).encode(field.field_value());
        if value.is_empty() {
            return format!("<span class=\"value-blank\">{}</span>", escape(&d.placeholder));
        }
        let label = field.field_value_label().unwrap_or(value.as_str());
        match field.field_value_link() {
            Some(href) => link(href, label),
            None => format!("<span class=\"value-missing\">{}</span>", escape(label)),
        }
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let d = field.descriptor();
        let value = value_mapper(d.render_type, d.value_mode).encode(field.field_value());
        let selected = d
            .choices
            .as_ref()
            .and_then(|c| lookup_choice(c, d.ref_type.as_deref(), &value))
            .map(|c| c.value.clone())
            .unwrap_or_else(|| value.clone());

        let mut options: Vec<(&str, String)> = Vec::new();
        if let Some(choices) = &d.choices {
            options.extend(choices.values().map(|c| (c.value.as_str(), c.choice_label())));
        }
        if !options.iter().any(|(v, _)| *v == selected) {
            let label = if selected.is_empty() {
                d.placeholder.clone()
            } else {
                format!("{} (not found)", selected)
            };
            options.insert(0, (selected.as_str(), label));
        }
        select(&field.field_name(), &selected, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Extras;
    use crate::choices::{ChoiceMap, FieldChoice, with_empty_choice};
    use crate::renderers::tests_support::{NoTargets, descriptor};
    use crate::renderers::{RenderMode, RendererRegistry};
    use annal_core::{EntityValues, RenderType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn choices() -> ChoiceMap {
        [("T/a", "a", "Alpha"), ("T/b", "b", "Beta")]
            .into_iter()
            .map(|(value, id, label)| {
                let choice = FieldChoice {
                    value: value.to_string(),
                    id: id.to_string(),
                    label: label.to_string(),
                    link: Some(format!("/c/testcoll/d/{}/", value)),
                };
                (value.to_string(), choice)
            })
            .collect()
    }

    fn render(render_type: RenderType, choices: ChoiceMap, value: &str, mode: RenderMode) -> String {
        let mut d = descriptor(render_type, "test:ref");
        d.ref_type = Some("T".to_string());
        d.choices = Some(choices);
        let values: EntityValues = json!({"test:ref": value}).as_object().cloned().unwrap();
        let extras = Extras::default();
        let bound = BoundField::new(&d, &values, &extras);
        RendererRegistry::standard().render_value(&bound, mode, &NoTargets)
    }

    #[test]
    fn test_edit_lists_choices_in_order() {
        let html = render(RenderType::Enum, choices(), "b", RenderMode::Edit);
        assert_eq!(
            html,
            "<select name=\"test_field\">\
             <option value=\"T/a\">Alpha (a)</option>\
             <option value=\"T/b\" selected=\"selected\">Beta (b)</option>\
             </select>"
        );
    }

    #[test]
    fn test_unknown_value_is_kept() {
        let html = render(RenderType::Enum, choices(), "T/zz", RenderMode::Edit);
        assert!(html.contains("<option value=\"T/zz\" selected=\"selected\">T/zz (not found)</option>"));
    }

    #[test]
    fn test_optional_empty_choice() {
        let html = render(RenderType::EnumOptional, with_empty_choice(choices(), "(none)"), "", RenderMode::Edit);
        assert!(html.starts_with("<select name=\"test_field\"><option value=\"\" selected=\"selected\">(none)</option>"));
    }

    #[test]
    fn test_view_links_choice() {
        let html = render(RenderType::Enum, choices(), "a", RenderMode::View);
        assert_eq!(html, "<a href=\"/c/testcoll/d/T/a/\">Alpha</a>");
    }
}
