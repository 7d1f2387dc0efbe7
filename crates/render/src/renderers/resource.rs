//! Attachments supplied by import from a URL or by file upload

use annal_core::vocab::annal;
use serde_json::Value;

use crate::bound::BoundField;
use crate::mappers::{FileUploadMapper, UriImportMapper, ValueMapper};
use crate::renderers::html::{attr, button, escape, link, text_input};
use crate::renderers::{FieldRenderer, RenderContext};

/// URL of the attachment recorded in the field value, resolved against
/// the entity
fn attachment_url(field: &BoundField<'_>) -> Option<String> {
    let name = field.field_value().get(annal::RESOURCE_NAME)?.as_str()?;
    match field.extras().entity_url.as_ref().and_then(|u| u.join(name).ok()) {
        Some(url) => Some(url.to_string()),
        None => Some(name.to_string()),
    }
}

/// URL from which a resource is imported
pub struct UriImportRenderer;

impl FieldRenderer for UriImportRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let source = UriImportMapper.encode(field.field_value());
        match attachment_url(field) {
            Some(href) => link(&href, if source.is_empty() { &href } else { &source }),
            None if !source.is_empty() => link(&source, &source),
            None => String::new(),
        }
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let name = field.field_name();
        let mut out = text_input(
            &name,
            &UriImportMapper.encode(field.field_value()),
            &field.descriptor().placeholder,
        );
        out.push_str(&button(&format!("{}__import", name), "Import"));
        out
    }
}

/// File uploaded with the form
pub struct FileUploadRenderer;

impl FieldRenderer for FileUploadRenderer {
    fn render_view(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let label = FileUploadMapper.encode(field.field_value());
        match attachment_url(field) {
            Some(href) => link(&href, if label.is_empty() { &href } else { &label }),
            None => format!("<span>{}</span>", escape(&label)),
        }
    }

    fn render_edit(&self, field: &BoundField<'_>, _cx: &RenderContext<'_>) -> String {
        let mut out = format!("<input type=\"file\"{} />", attr("name", &field.field_name()));
        if let Value::Object(_) = field.field_value() {
            let current = FileUploadMapper.encode(field.field_value());
            if !current.is_empty() {
                out.push_str(&format!("<span class=\"value-upload\">{}</span>", escape(&current)));
            }
        }
        out
    }
}
