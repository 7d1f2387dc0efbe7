//! # View interpreter
//!
//! Turns view and list records into field descriptors, renders entity
//! values through them, and decodes submitted forms back into values.
//!
//! ```text
//! view record ──describe_view──▶ ViewDescription ──render_view_html──▶ HTML
//!                                      │
//!              form input ──decode_form┘──▶ DecodedForm ──apply_resources──▶ entity
//! ```
//!
//! Form names of fields inside repeat groups carry the item index, see
//! [`crate::renderers::group`]. A group is decoded item by item until an
//! index with none of the group's sub-fields present is reached.

use std::collections::HashMap;

use annal_core::vocab::annal;
use annal_core::{AnnalError, AnnalResult, EntityValues, RenderType, ValueMode, extract_entity_id};
use annal_models::attachments::{import_resource, remove_attachment, save_upload};
use annal_models::{Collection, Entity, UploadedFile};
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::bound::{BoundField, Extras, TargetResolver};
use crate::descriptor::{FieldDescriptor, describe_fields};
use crate::mappers::value_mapper;
use crate::renderers::group::{group_items, item_prefix};
use crate::renderers::html::{attr, escape};
use crate::renderers::{RenderMode, RendererRegistry};
use crate::selector::SelectorContext;

/// A view record resolved into field descriptors
#[derive(Debug, Clone)]
pub struct ViewDescription {
    pub view_id: String,
    pub label: String,
    /// URI of the type the view is meant for
    pub record_type: Option<String>,
    pub add_field: bool,
    pub fields: Vec<FieldDescriptor>,
}

/// A list record resolved into column descriptors
#[derive(Debug, Clone)]
pub struct ListDescription {
    pub list_id: String,
    pub label: String,
    pub display_type: String,
    pub default_type: Option<String>,
    pub default_view: Option<String>,
    pub entity_selector: String,
    pub columns: Vec<FieldDescriptor>,
}

/// Describe the fields of a view.
///
/// Selectors in field restrictions see the view record as `view`.
pub fn describe_view(coll: &Collection, view_id: &str) -> AnnalResult<ViewDescription> {
    let view_id = extract_entity_id(view_id);
    let view = coll
        .get_view(view_id)?
        .ok_or_else(|| AnnalError::not_found("_view", view_id))?;
    let mut context = SelectorContext::new();
    context.insert("view".to_string(), view.entity().values().clone());
    let fields = describe_fields(coll, &view.field_refs(), &context, &mut Vec::new())?;
    debug!(coll_id = coll.id(), view_id, fields = fields.len(), "described view");
    Ok(ViewDescription {
        view_id: view.id().to_string(),
        label: view.label().to_string(),
        record_type: view.record_type().map(str::to_string),
        add_field: view.add_field(),
        fields,
    })
}

/// Describe the columns of a list
pub fn describe_list(coll: &Collection, list_id: &str) -> AnnalResult<ListDescription> {
    let list_id = extract_entity_id(list_id);
    let list = coll
        .get_list(list_id)?
        .ok_or_else(|| AnnalError::not_found("_list", list_id))?;
    let mut context = SelectorContext::new();
    context.insert("list".to_string(), list.entity().values().clone());
    let columns = describe_fields(coll, &list.field_refs(), &context, &mut Vec::new())?;
    Ok(ListDescription {
        list_id: list.id().to_string(),
        label: list.label().to_string(),
        display_type: list.display_type().to_string(),
        default_type: list.default_type().map(str::to_string),
        default_view: list.default_view().map(str::to_string),
        entity_selector: list.entity_selector().to_string(),
        columns,
    })
}

/// Render every field of a view against an entity's values
pub fn render_view_html(
    registry: &RendererRegistry,
    view: &ViewDescription,
    values: &EntityValues,
    extras: &Extras,
    mode: RenderMode,
    resolver: &dyn TargetResolver,
) -> String {
    let mut out = String::from("<div class=\"view-fields row\">\n");
    for d in &view.fields {
        let field = BoundField::new(d, values, extras);
        out.push_str(&registry.render_field(&field, mode, resolver));
    }
    out.push_str("</div>\n");
    out
}

/// Render entities as the rows of a list
pub fn render_list_html(
    registry: &RendererRegistry,
    list: &ListDescription,
    entities: &[Entity],
    extras: &Extras,
    resolver: &dyn TargetResolver,
) -> String {
    let mut out = String::from("<table class=\"list\">\n<thead><tr><th></th>");
    for d in &list.columns {
        out.push_str(&format!("<th>{}</th>", escape(&d.label)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for entity in entities {
        let row_extras = Extras {
            entity_url: Some(entity.view_url().clone()),
            ..extras.clone()
        };
        let value = format!("{}/{}", entity.type_id(), entity.id());
        out.push_str(&format!(
            "<tr{}><td><input type=\"checkbox\" name=\"entity\"{} /></td>",
            attr("data-href", entity.view_url().path()),
            attr("value", &value)
        ));
        for d in &list.columns {
            let field = BoundField::new(d, entity.values(), &row_extras);
            out.push_str("<td>");
            out.push_str(&registry.render_value(&field, RenderMode::View, resolver));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

/// Submitted form fields and uploaded files
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    fields: IndexMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field; a repeated name accumulates values
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(name.into(), file);
        self
    }

    pub fn add_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.insert(name.into(), file);
    }

    /// First value submitted under a name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.files.contains_key(name)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}

/// Where an attachment's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    Upload(UploadedFile),
    Import(String),
}

/// An attachment to store once the entity exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResource {
    /// Property recording the attachment
    pub property: String,
    /// Attachment name, without extension
    pub name: String,
    pub value_type: String,
    pub source: ResourceSource,
}

/// Values decoded from a form
#[derive(Debug, Clone, Default)]
pub struct DecodedForm {
    pub values: EntityValues,
    pub resources: Vec<PendingResource>,
    /// Set when a repeat group's add or remove button was pressed
    pub continue_editing: bool,
}

/// Decode a submitted form into entity values.
///
/// Starts from `previous`, so values of fields absent from the view are
/// kept. Fields that cannot be written, such as missing-field
/// placeholders, are skipped.
pub fn decode_form(fields: &[FieldDescriptor], input: &FormInput, previous: &EntityValues) -> DecodedForm {
    let mut form = DecodedForm::default();
    let values = decode_fields(fields, input, "", previous, &mut form);
    form.values = values;
    form
}

fn decode_fields(
    fields: &[FieldDescriptor],
    input: &FormInput,
    prefix: &str,
    previous: &EntityValues,
    form: &mut DecodedForm,
) -> EntityValues {
    let mut values = previous.clone();
    for d in fields.iter().filter(|d| d.is_stored()) {
        let name = format!("{}{}", prefix, d.field_name);
        if d.is_group() {
            let items = decode_group(d, &name, input, previous, form);
            values.insert(d.property_uri.clone(), Value::Array(items));
            continue;
        }
        if let Some(value) = decode_field(d, &name, input, previous, form) {
            values.insert(d.property_uri.clone(), value);
        }
    }
    values
}

fn decode_group(
    d: &FieldDescriptor,
    name: &str,
    input: &FormInput,
    previous: &EntityValues,
    form: &mut DecodedForm,
) -> Vec<Value> {
    let Some(group) = &d.group else {
        return Vec::new();
    };
    let old_items = previous.get(&d.property_uri).map(group_items).unwrap_or_default();
    let mut items = Vec::new();
    for index in 0.. {
        let prefix = item_prefix(name, index);
        let present = group
            .fields
            .iter()
            .any(|f| input.contains(&format!("{}{}", prefix, f.field_name)));
        if !present {
            break;
        }
        let old = old_items.get(index).cloned().unwrap_or_default();
        items.push(Value::Object(decode_fields(&group.fields, input, &prefix, &old, form)));
    }

    if input.contains(&format!("{}__remove", name)) {
        let selected: Vec<usize> = input
            .get_all(&format!("{}__select_fields", name))
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        items = items
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !selected.contains(i))
            .map(|(_, item)| item)
            .collect();
        form.continue_editing = true;
    }
    if input.contains(&format!("{}__add", name)) {
        items.push(json!({}));
        form.continue_editing = true;
    }
    items
}

fn decode_field(
    d: &FieldDescriptor,
    name: &str,
    input: &FormInput,
    previous: &EntityValues,
    form: &mut DecodedForm,
) -> Option<Value> {
    match d.render_type {
        RenderType::Showtext | RenderType::ShowMarkdown => return None,
        RenderType::CheckBox if d.value_mode == ValueMode::Direct => {
            let text = input.get(name).unwrap_or("");
            return Some(value_mapper(d.render_type, d.value_mode).decode(text));
        }
        _ => {}
    }

    let upload = d.value_mode == ValueMode::Upload
        || (d.render_type == RenderType::FileUpload && d.value_mode == ValueMode::Direct);
    if upload {
        if let Some(file) = input.file(name).filter(|f| !f.filename.is_empty()) {
            form.resources.push(PendingResource {
                property: d.property_uri.clone(),
                name: d.field_name.clone(),
                value_type: d.value_type.clone(),
                source: ResourceSource::Upload(file.clone()),
            });
        }
        return None;
    }

    let text = input.get(name)?;
    let import = d.value_mode == ValueMode::Import
        || (d.render_type == RenderType::UriImport && d.value_mode == ValueMode::Direct);
    if import {
        let url = text.trim();
        if url.is_empty() {
            return Some(Value::String(String::new()));
        }
        let unchanged = previous
            .get(&d.property_uri)
            .and_then(|v| v.get(annal::IMPORT_URL))
            .and_then(Value::as_str)
            == Some(url);
        if unchanged && !input.contains(&format!("{}__import", name)) {
            return None;
        }
        form.resources.push(PendingResource {
            property: d.property_uri.clone(),
            name: d.field_name.clone(),
            value_type: d.value_type.clone(),
            source: ResourceSource::Import(url.to_string()),
        });
        return Some(value_mapper(d.render_type, d.value_mode).decode(url));
    }

    Some(value_mapper(d.render_type, d.value_mode).decode(text))
}

/// Store pending attachments in the entity's directory, recording each in
/// the entity values.
///
/// A failed import is logged and leaves its field without an attachment
/// record or file; a failed upload is an error.
pub fn apply_resources(entity: &mut Entity, resources: &[PendingResource]) -> AnnalResult<()> {
    for r in resources {
        match &r.source {
            ResourceSource::Upload(file) => {
                save_upload(entity, &r.property, &r.name, &r.value_type, file)?;
            }
            ResourceSource::Import(url) => {
                if let Err(e) = import_resource(entity, &r.property, &r.name, &r.value_type, url) {
                    warn!(entity_id = entity.id(), import_url = url.as_str(), error = %e, "import failed");
                    entity.values_mut().remove(&r.property);
                    remove_attachment(entity, &r.name)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use annal_core::vocab::rdfs;
    use annal_models::{FieldRef, RecordField, RecordType, RecordView, Site};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Collection) {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), "http://test.example.com/annalist/").unwrap();
        site.initialize().unwrap();
        let coll = site.create_collection("testcoll", Default::default()).unwrap();
        (tmp, coll)
    }

    #[test]
    fn test_duplicate_entity_id_fields_get_distinct_names() {
        let (_tmp, coll) = setup();
        let fields = [
            FieldRef::new("Entity_id").with_placement("small:0,6"),
            FieldRef::new("Entity_id").with_placement("small:6,6"),
        ];
        coll.create_entity("_view", "V", RecordView::values("V", "", &fields).build())
            .unwrap();
        let view = describe_view(&coll, "V").unwrap();
        let values = EntityValues::new();
        let html = render_view_html(
            &RendererRegistry::standard(),
            &view,
            &values,
            &Extras::default(),
            RenderMode::Edit,
            &coll,
        );
        assert!(html.contains("name=\"entity_id\""));
        assert!(html.contains("name=\"entity_id__2\""));

        let again = describe_view(&coll, "V").unwrap();
        let names: Vec<&str> = again.fields.iter().map(|f| f.field_name.as_str()).collect();
        assert_eq!(names, vec!["entity_id", "entity_id__2"]);
    }

    #[test]
    fn test_missing_view() {
        let (_tmp, coll) = setup();
        assert!(describe_view(&coll, "no_view").unwrap_err().is_not_found());
    }

    #[test]
    fn test_decode_view_form() {
        let (_tmp, coll) = setup();
        let view = describe_view(&coll, "Default_view").unwrap();
        let previous = json!({"test:extra": "kept"}).as_object().cloned().unwrap();
        let input = FormInput::new()
            .with("entity_id", "e1")
            .with("Entity_label", "Entity 1")
            .with("Entity_comment", "About e1");
        let form = decode_form(&view.fields, &input, &previous);
        assert_eq!(form.values[rdfs::LABEL], json!("Entity 1"));
        assert_eq!(form.values[rdfs::COMMENT], json!("About e1"));
        assert_eq!(form.values["test:extra"], json!("kept"));
        assert!(form.resources.is_empty());
        assert!(!form.continue_editing);
    }

    #[test]
    fn test_decode_repeat_group() {
        let (_tmp, coll) = setup();
        let view = describe_view(&coll, "View_view").unwrap();
        let group = view
            .fields
            .iter()
            .find(|f| f.is_group())
            .expect("view view has a field group");
        let sub = &group.group.as_ref().unwrap().fields[0];
        let name = |i: usize| format!("{}__{}__{}", group.field_name, i, sub.field_name);
        let input = FormInput::new()
            .with(name(0), "Entity_id")
            .with(name(1), "Entity_label")
            .with(format!("{}__select_fields", group.field_name), "0")
            .with(format!("{}__remove", group.field_name), "Remove");
        let form = decode_form(&view.fields, &input, &EntityValues::new());
        let items = form.values[&group.property_uri].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0][&sub.property_uri], json!("Entity_label"));
        assert!(form.continue_editing);
    }

    #[test]
    fn test_upload_becomes_pending_resource() {
        let (_tmp, coll) = setup();
        coll.create_entity(
            "_field",
            "img_field",
            RecordField::values("Image", RenderType::RefImage, "test:image", "small:0,12")
                .with(annal::FIELD_VALUE_MODE, RecordField::value_mode_value(ValueMode::Upload))
                .with(annal::FIELD_VALUE_TYPE, "annal:Image")
                .build(),
        )
        .unwrap();
        coll.create_entity("_type", "t", RecordType::values("T", "test:T", &[]).build())
            .unwrap();
        coll.create_entity(
            "_view",
            "img_view",
            RecordView::values("Image view", "test:T", &[FieldRef::new("Entity_id"), FieldRef::new("img_field")])
                .build(),
        )
        .unwrap();
        let view = describe_view(&coll, "img_view").unwrap();
        let file = UploadedFile {
            filename: "test-image.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: b"\xff\xd8\xff image bytes".to_vec(),
        };
        let input = FormInput::new().with("entity_id", "e1").with_file("img_field", file.clone());
        let form = decode_form(&view.fields, &input, &EntityValues::new());
        assert_eq!(form.resources.len(), 1);
        assert_eq!(form.resources[0].name, "img_field");

        let mut entity = coll.create_entity("t", "e1", form.values.clone()).unwrap();
        apply_resources(&mut entity, &form.resources).unwrap();
        assert_eq!(entity.get("test:image").unwrap()[annal::RESOURCE_NAME], json!("img_field.jpg"));
        assert_eq!(std::fs::read(entity.dir().join("img_field.jpg")).unwrap(), file.data);
    }

    #[test]
    fn test_failed_reimport_drops_stale_file() {
        let (tmp, coll) = setup();
        let mut entity = coll.create_entity("t", "e1", EntityValues::new()).unwrap();
        std::fs::write(entity.dir().join("imp.png"), b"earlier import").unwrap();
        entity.set("test:import", json!({"resource_name": "imp.png", "import_url": "file:///old.png"}));
        let missing = format!("file://{}", tmp.path().join("missing.png").display());
        let resources = [PendingResource {
            property: "test:import".to_string(),
            name: "imp".to_string(),
            value_type: "annal:Import".to_string(),
            source: ResourceSource::Import(missing),
        }];

        apply_resources(&mut entity, &resources).unwrap();
        assert!(entity.get("test:import").is_none());
        assert!(!entity.dir().join("imp.png").exists());
    }
}
