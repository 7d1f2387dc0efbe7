//! Links, images and audio, and fields shown through a referenced entity

use crate::bound::{BoundField, Extras};
use crate::mappers::value_mapper;
use crate::renderers::html::{attr, escape, link, text_input};
use crate::renderers::select::SelectRenderer;
use crate::renderers::{FieldRenderer, RenderContext, RenderMode, target_error};

fn edit_reference(field: &BoundField<'_>) -> String {
    let d = field.descriptor();
    let value = value_mapper(d.render_type, d.value_mode).encode(field.field_value());
    text_input(&field.field_name(), &value, &d.placeholder)
}

/// Link to the referenced resource, or an inline error
fn resource_link(field: &BoundField<'_>, cx: &RenderContext<'_>, f: impl FnOnce(&str) -> String) -> String {
    match field.target_value_link(cx.resolver) {
        Ok(Some(href)) => f(&href),
        Ok(None) => String::new(),
        Err(e) => target_error(&e),
    }
}

/// Image held in an attachment, possibly of another entity
pub struct RefImageRenderer;

impl FieldRenderer for RefImageRenderer {
    fn render_view(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        resource_link(field, cx, |href| {
            format!(
                "<a href=\"{0}\" target=\"_blank\"><img src=\"{0}\"{1} /></a>",
                escape(href),
                attr("alt", &format!("Image at {}", href))
            )
        })
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        edit_reference(field)
    }
}

/// Audio clip held in an attachment
pub struct RefAudioRenderer;

impl FieldRenderer for RefAudioRenderer {
    fn render_view(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        resource_link(field, cx, |href| {
            format!(
                "<audio controls=\"controls\"><source src=\"{0}\" />{1}</audio>",
                escape(href),
                link(href, "Audio")
            )
        })
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        edit_reference(field)
    }
}

/// URL shown as a link
pub struct UriLinkRenderer;

impl FieldRenderer for UriLinkRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let value = field.field_value_text();
        if value.is_empty() {
            return String::new();
        }
        link(&value, &value)
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        edit_reference(field)
    }
}

/// Image given by URL
pub struct UriImageRenderer;

impl FieldRenderer for UriImageRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let value = field.field_value_text();
        if value.is_empty() {
            return String::new();
        }
        format!(
            "<a href=\"{0}\" target=\"_blank\"><img src=\"{0}\"{1} /></a>",
            escape(&value),
            attr("alt", &format!("Image at {}", value))
        )
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        edit_reference(field)
    }
}

/// Fields of a referenced entity displayed in place of the reference.
///
/// Editing chooses the referenced entity.
pub struct RefMultifieldRenderer;

impl FieldRenderer for RefMultifieldRenderer {
    fn render_view(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        let d = field.descriptor();
        let target = match field.target_entity(cx.resolver) {
            Ok(Some(target)) => target,
            Ok(None) => return SelectRenderer.render_view(field, cx),
            Err(e) => return target_error(&e),
        };
        let Some(group) = &d.group else {
            return SelectRenderer.render_view(field, cx);
        };
        let extras = Extras {
            entity_url: Some(target.url.clone()),
            ..field.extras().clone()
        };
        let prefix = format!("{}{}__", field.name_prefix(), d.field_name);
        let mut out = String::from("<div class=\"row\">");
        for child in &group.fields {
            let bound = BoundField::with_prefix(child, &target.values, &extras, prefix.clone());
            out.push_str(&cx.registry.render_field(&bound, RenderMode::View, cx.resolver));
        }
        out.push_str("</div>");
        out
    }

    fn render_edit(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        SelectRenderer.render_edit(field, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::RendererRegistry;
    use crate::renderers::tests_support::{NoTargets, descriptor};
    use annal_core::{EntityValues, RenderType, ValueMode};
    use serde_json::json;
    use url::Url;

    #[test]
    fn test_uploaded_image_links_to_attachment() {
        let mut d = descriptor(RenderType::RefImage, "test:image");
        d.value_mode = ValueMode::Upload;
        let values: EntityValues = json!({"test:image": {"resource_name": "img_field.jpg"}})
            .as_object()
            .cloned()
            .unwrap();
        let extras = Extras {
            entity_url: Some(Url::parse("http://example.com/c/coll/d/t/e1/").unwrap()),
            ..Default::default()
        };
        let bound = BoundField::new(&d, &values, &extras);
        let html = RendererRegistry::standard().render_value(&bound, RenderMode::View, &NoTargets);
        assert!(html.contains("<img src=\"http://example.com/c/coll/d/t/e1/img_field.jpg\""));

        let html = RendererRegistry::standard().render_value(&bound, RenderMode::Edit, &NoTargets);
        assert!(html.contains("type=\"file\""));
    }

    #[test]
    fn test_missing_target_is_reported_inline() {
        let mut d = descriptor(RenderType::RefImage, "test:image");
        d.ref_type = Some("img".to_string());
        let values: EntityValues = json!({"test:image": "nopic"}).as_object().cloned().unwrap();
        let extras = Extras::default();
        let bound = BoundField::new(&d, &values, &extras);
        let html = RendererRegistry::standard().render_value(&bound, RenderMode::View, &NoTargets);
        assert_eq!(
            html,
            "<span class=\"field-error\">Target entity not found: img/nopic</span>"
        );
    }

    #[test]
    fn test_uri_link() {
        let d = descriptor(RenderType::UriLink, "rdfs:seeAlso");
        let values: EntityValues = json!({"rdfs:seeAlso": "http://example.org/"}).as_object().cloned().unwrap();
        let extras = Extras::default();
        let bound = BoundField::new(&d, &values, &extras);
        let html = RendererRegistry::standard().render_value(&bound, RenderMode::View, &NoTargets);
        assert_eq!(html, "<a href=\"http://example.org/\">http://example.org/</a>");
    }
}
