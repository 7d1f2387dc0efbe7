//! Renderers for literal values

use pulldown_cmark::{Event, Options, Parser};

use crate::bound::BoundField;
use crate::mappers::{CheckBoxMapper, value_mapper};
use crate::placement::placement_text;
use crate::renderers::html::{escape, select, text_input, textarea};
use crate::renderers::{FieldRenderer, RenderContext};

fn encoded(field: &BoundField<'_>) -> String {
    let d = field.descriptor();
    value_mapper(d.render_type, d.value_mode).encode(field.field_value())
}

/// Single-line text
pub struct TextRenderer;

impl FieldRenderer for TextRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        format!("<span>{}</span>", escape(&encoded(field)))
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        text_input(&field.field_name(), &encoded(field), &field.descriptor().placeholder)
    }
}

/// Multi-line text
pub struct TextareaRenderer {
    class: &'static str,
}

impl TextareaRenderer {
    pub fn new(class: &'static str) -> Self {
        Self { class }
    }
}

impl FieldRenderer for TextareaRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let class = if self.class.is_empty() { "value-text" } else { self.class };
        format!("<pre class=\"{}\">{}</pre>", class, escape(&field.field_value_text()))
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        textarea(
            &field.field_name(),
            &field.field_value_text(),
            &field.descriptor().placeholder,
            self.class,
        )
    }
}

/// Read-only text, shown the same way when editing
pub struct ShowTextRenderer;

impl FieldRenderer for ShowTextRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        format!("<span class=\"value-text\">{}</span>", escape(&field.field_value_text()))
    }

    fn render_edit(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        self.render_view(field, cx)
    }
}

/// Markdown text, rendered to HTML with raw HTML escaped
pub struct MarkdownRenderer {
    pub editable: bool,
}

fn markdown_html(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::from("<div class=\"markdown\">");
    pulldown_cmark::html::push_html(&mut out, parser);
    out.push_str("</div>");
    out
}

impl FieldRenderer for MarkdownRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        markdown_html(&field.field_value_text())
    }

    fn render_edit(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        if !self.editable {
            return self.render_view(field, cx);
        }
        textarea(
            &field.field_name(),
            &field.field_value_text(),
            &field.descriptor().placeholder,
            "markdown",
        )
    }
}

/// Yes/no flag
pub struct CheckBoxRenderer;

impl FieldRenderer for CheckBoxRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let text = if CheckBoxMapper::is_checked(field.field_value()) { "Yes" } else { "No" };
        format!("<span>{}</span>", text)
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let checked = if CheckBoxMapper::is_checked(field.field_value()) {
            " checked=\"checked\""
        } else {
            ""
        };
        format!(
            "<input type=\"checkbox\" name=\"{}\" value=\"Yes\"{} />",
            escape(&field.field_name()),
            checked
        )
    }
}

/// Field placement, chosen from the standard placements
pub struct PlacementRenderer;

impl FieldRenderer for PlacementRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let value = field.field_value_text();
        format!(
            "<span class=\"placement\">{}</span>",
            escape(placement_text(&value, &field.descriptor().placeholder))
        )
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let value = field.field_value_text();
        let d = field.descriptor();
        let mut options: Vec<(&str, String)> = vec![("", d.placeholder.clone())];
        if let Some(choices) = &d.choices {
            options.extend(choices.values().map(|c| (c.value.as_str(), c.label.clone())));
        }
        if !value.is_empty() && !options.iter().any(|(v, _)| *v == value) {
            options.push((value.as_str(), value.clone()));
        }
        select(&field.field_name(), &value, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Extras;
    use crate::descriptor::FieldDescriptor;
    use crate::renderers::tests_support::{NoTargets, descriptor};
    use crate::placement::placement_choices;
    use crate::renderers::{RenderMode, RendererRegistry};
    use annal_core::{EntityValues, RenderType};
    use serde_json::json;

    fn render(d: &FieldDescriptor, values: serde_json::Value, mode: RenderMode) -> String {
        let registry = RendererRegistry::standard();
        let values: EntityValues = values.as_object().cloned().unwrap();
        let extras = Extras::default();
        let bound = BoundField::new(d, &values, &extras);
        registry.render_value(&bound, mode, &NoTargets)
    }

    #[test]
    fn test_text_edit_and_view() {
        let d = descriptor(RenderType::Text, "rdfs:label");
        assert_eq!(
            render(&d, json!({"rdfs:label": "A <b>"}), RenderMode::Edit),
            "<input type=\"text\" name=\"test_field\" placeholder=\"(enter value)\" value=\"A &lt;b&gt;\" />"
        );
        assert_eq!(render(&d, json!({"rdfs:label": "A"}), RenderMode::View), "<span>A</span>");
    }

    #[test]
    fn test_token_set_is_space_separated() {
        let d = descriptor(RenderType::TokenSet, "annal:user_permission");
        let html = render(&d, json!({"annal:user_permission": ["VIEW", "CREATE"]}), RenderMode::Edit);
        assert!(html.contains("value=\"VIEW CREATE\""));
    }

    #[test]
    fn test_checkbox() {
        let d = descriptor(RenderType::CheckBox, "annal:add_field");
        let html = render(&d, json!({"annal:add_field": true}), RenderMode::Edit);
        assert!(html.contains("checked=\"checked\""));
        assert_eq!(render(&d, json!({}), RenderMode::View), "<span>No</span>");
    }

    #[test]
    fn test_markdown_rendered_to_html() {
        let d = descriptor(RenderType::Markdown, "rdfs:comment");
        assert_eq!(
            render(&d, json!({"rdfs:comment": "one *x*\n\nthree"}), RenderMode::View),
            "<div class=\"markdown\"><p>one <em>x</em></p>\n<p>three</p>\n</div>"
        );
        let html = render(&d, json!({"rdfs:comment": "## Head\n\n- a\n- b"}), RenderMode::View);
        assert!(html.contains("<h2>Head</h2>"));
        assert!(html.contains("<li>a</li>"));
    }

    #[test]
    fn test_markdown_escapes_raw_html() {
        let d = descriptor(RenderType::ShowMarkdown, "rdfs:comment");
        let html = render(&d, json!({"rdfs:comment": "hi <script>alert(1)</script>"}), RenderMode::Edit);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_placement_select() {
        let mut d = descriptor(RenderType::Placement, "annal:field_placement");
        d.choices = Some(placement_choices());
        let html = render(&d, json!({"annal:field_placement": "small:0,12;medium:0,6"}), RenderMode::Edit);
        assert!(html.contains("<option value=\"small:0,12;medium:0,6\" selected=\"selected\">######...... (0/6)</option>"));
        let html = render(&d, json!({"annal:field_placement": "small:0,12;medium:0,6"}), RenderMode::View);
        assert!(html.contains("######...... (0/6)"));
    }
}
