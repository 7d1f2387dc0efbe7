//! Repeat groups
//!
//! The value of a repeat group is a list of objects, one per repeated item.
//! Each item's sub-fields get form names of the form
//! `<group name>__<index>__<sub-field name>`.

use annal_core::EntityValues;
use serde_json::{Value, json};

use crate::bound::BoundField;
use crate::renderers::html::{button, escape};
use crate::renderers::{FieldRenderer, RenderContext};

/// Form name prefix for the sub-fields of one repeated item
pub fn item_prefix(group_name: &str, index: usize) -> String {
    format!("{}__{}__", group_name, index)
}

/// Items of a repeat group value; bare ids become `{"@id": ..}` items
pub fn group_items(value: &Value) -> Vec<EntityValues> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        _ => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(o) => Some(o.clone()),
            Value::String(s) => json!({ "@id": s }).as_object().cloned(),
            _ => None,
        })
        .collect()
}

/// Repeated items, each laid out as one block or one row
pub struct GroupRenderer {
    pub rows: bool,
}

impl GroupRenderer {
    fn render_items(&self, field: &BoundField<'_>, cx: &RenderContext<'_>, edit: bool) -> String {
        let d = field.descriptor();
        let Some(group) = &d.group else {
            return String::new();
        };
        let name = field.field_name();
        let row_class = if self.rows { "group-row" } else { "group-item" };
        let mut out = format!("<div class=\"group\"><div class=\"group-label\">{}</div>", escape(&group.label));
        for (i, item) in group_items(field.field_value()).iter().enumerate() {
            out.push_str(&format!("<div class=\"{} row\">", row_class));
            if edit {
                out.push_str(&format!(
                    "<input type=\"checkbox\" name=\"{}__select_fields\" value=\"{}\" />",
                    escape(&name),
                    i
                ));
            }
            let prefix = item_prefix(&name, i);
            for child in &group.fields {
                let bound = BoundField::with_prefix(child, item, field.extras(), prefix.clone());
                if self.rows {
                    out.push_str(&cx.registry.render_value(&bound, cx.mode, cx.resolver));
                } else {
                    out.push_str(&cx.registry.render_field(&bound, cx.mode, cx.resolver));
                }
            }
            out.push_str("</div>");
        }
        if edit {
            out.push_str(&button(&format!("{}__remove", name), &group.delete_label));
            out.push_str(&button(&format!("{}__add", name), &group.add_label));
        }
        out.push_str("</div>");
        out
    }
}

impl FieldRenderer for GroupRenderer {
    fn render_view(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        self.render_items(field, cx, false)
    }

    fn render_edit(&self, field: &BoundField<'_>, cx: &RenderContext<'_>) -> String {
        self.render_items(field, cx, true)
    }
}
