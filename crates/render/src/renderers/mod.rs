//! # Field renderers
//!
//! A renderer turns a bound field into an HTML fragment for viewing or for
//! editing. The [`RendererRegistry`] selects the renderer for a field from
//! its render type; in edit mode the value mode can override the choice:
//!
//! | Value mode | Edit renderer |
//! |------------|---------------|
//! | `Value_entity`, `Value_field` | select from choices |
//! | `Value_import` | URL import |
//! | `Value_upload` | file upload |
//!
//! Renderers for repeat groups call back into the registry for their
//! sub-fields.

pub mod group;
pub mod html;
pub mod media;
pub mod resource;
pub mod select;
pub mod text;

use std::collections::HashMap;

use annal_core::{RenderType, ValueMode};

use crate::bound::{BoundField, TargetError, TargetResolver};
use crate::descriptor::FieldDescriptor;

/// Presentation mode of a rendered view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    View,
    Edit,
}

/// What a renderer can reach besides the field itself
pub struct RenderContext<'r> {
    pub registry: &'r RendererRegistry,
    pub resolver: &'r dyn TargetResolver,
    pub mode: RenderMode,
}

pub trait FieldRenderer: Send + Sync {
    /// Fragment displaying the value
    fn render_view(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String;

    /// Fragment with form inputs for the value
    fn render_edit(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String;
}

/// Inline report of a target that could not be resolved
pub(crate) fn target_error(e: &TargetError) -> String {
    format!("<span class=\"field-error\">{}</span>", html::escape(&e.to_string()))
}

/// Renderers keyed by render type
pub struct RendererRegistry {
    renderers: HashMap<RenderType, Box<dyn FieldRenderer>>,
    select: Box<dyn FieldRenderer>,
    import: Box<dyn FieldRenderer>,
    upload: Box<dyn FieldRenderer>,
    fallback: Box<dyn FieldRenderer>,
}

impl RendererRegistry {
    /// Registry with a renderer for every render type
    pub fn standard() -> Self {
        use RenderType as R;
        let mut renderers: HashMap<RenderType, Box<dyn FieldRenderer>> = HashMap::new();
        for r in [R::Text, R::EntityId, R::Identifier, R::EntityRef, R::TokenSet] {
            renderers.insert(r, Box::new(text::TextRenderer));
        }
        renderers.insert(R::Textarea, Box::new(text::TextareaRenderer::new("")));
        renderers.insert(R::Codearea, Box::new(text::TextareaRenderer::new("codearea")));
        renderers.insert(R::Showtext, Box::new(text::ShowTextRenderer));
        renderers.insert(R::Markdown, Box::new(text::MarkdownRenderer { editable: true }));
        renderers.insert(R::ShowMarkdown, Box::new(text::MarkdownRenderer { editable: false }));
        renderers.insert(R::CheckBox, Box::new(text::CheckBoxRenderer));
        renderers.insert(R::Placement, Box::new(text::PlacementRenderer));
        for r in RenderType::all().iter().copied().filter(RenderType::is_enum) {
            renderers.insert(r, Box::new(select::SelectRenderer));
        }
        renderers.insert(R::EntityTypeId, Box::new(select::SelectRenderer));
        renderers.insert(R::RefImage, Box::new(media::RefImageRenderer));
        renderers.insert(R::RefAudio, Box::new(media::RefAudioRenderer));
        renderers.insert(R::UriLink, Box::new(media::UriLinkRenderer));
        renderers.insert(R::UriImage, Box::new(media::UriImageRenderer));
        renderers.insert(R::RefMultifield, Box::new(media::RefMultifieldRenderer));
        renderers.insert(R::UriImport, Box::new(resource::UriImportRenderer));
        renderers.insert(R::FileUpload, Box::new(resource::FileUploadRenderer));
        for r in [R::GroupSeq, R::GroupSet, R::RepeatListRow] {
            renderers.insert(r, Box::new(group::GroupRenderer { rows: false }));
        }
        for r in [R::GroupSeqRow, R::GroupSetRow] {
            renderers.insert(r, Box::new(group::GroupRenderer { rows: true }));
        }
        Self {
            renderers,
            select: Box::new(select::SelectRenderer),
            import: Box::new(resource::UriImportRenderer),
            upload: Box::new(resource::FileUploadRenderer),
            fallback: Box::new(text::TextRenderer),
        }
    }

    /// Renderer for a field in a mode
    pub fn renderer_for(&self, descriptor: &FieldDescriptor, mode: RenderMode) -> &dyn FieldRenderer {
        if mode == RenderMode::Edit && !descriptor.render_type.is_group() {
            match descriptor.value_mode {
                ValueMode::Entity | ValueMode::Field => return self.select.as_ref(),
                ValueMode::Import => return self.import.as_ref(),
                ValueMode::Upload => return self.upload.as_ref(),
                ValueMode::Direct => {}
            }
        }
        self.renderers
            .get(&descriptor.render_type)
            .map(|r| r.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// The value fragment of a field, without label or placement
    pub fn render_value(&self, field: &BoundField<'_>, mode: RenderMode, resolver: &dyn TargetResolver) -> String {
        let d = field.descriptor();
        if d.missing {
            return format!("<span class=\"missing\">{}</span>", html::escape(&d.placeholder));
        }
        let cx = RenderContext {
            registry: self,
            resolver,
            mode,
        };
        let renderer = self.renderer_for(d, mode);
        match mode {
            RenderMode::View => renderer.render_view(field, &cx),
            RenderMode::Edit => renderer.render_edit(field, &cx),
        }
    }

    /// A field with its label, laid out by its placement
    pub fn render_field(&self, field: &BoundField<'_>, mode: RenderMode, resolver: &dyn TargetResolver) -> String {
        html::field_wrapper(field, &self.render_value(field, mode, resolver))
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
