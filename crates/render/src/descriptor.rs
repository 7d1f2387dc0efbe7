//! Field descriptors
//!
//! A descriptor combines a field record with the view-field reference that
//! names it: property and placement overrides, resolved choices, and for
//! repeat groups the descriptors of the group's own fields.

use std::collections::HashSet;

use annal_core::{AnnalError, AnnalResult, RenderType, ValueMode};
use annal_models::{Collection, FieldRef, RecordField};
use serde_json::Value;
use tracing::{debug, warn};

use crate::choices::{ChoiceMap, enumerate_choices, with_empty_choice};
use crate::placement::{Placement, parse_placement, placement_choices};
use crate::selector::{Selector, SelectorContext};

/// Sub-fields of a repeat group
#[derive(Debug, Clone)]
pub struct GroupDescriptor {
    pub label: String,
    pub add_label: String,
    pub delete_label: String,
    pub fields: Vec<FieldDescriptor>,
}

/// Rendering contract for one field in one view
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub field_id: String,
    /// Form field name, unique within the enclosing view or group
    pub field_name: String,
    pub label: String,
    pub help: String,
    pub tooltip: String,
    pub placeholder: String,
    /// Property under which the value is stored, unique within the view
    pub property_uri: String,
    /// Declared subproperties of the property, consulted when reading
    pub subproperty_uris: Vec<String>,
    pub placement: Placement,
    pub placement_spec: String,
    pub value_type: String,
    pub render_type: RenderType,
    pub value_mode: ValueMode,
    pub ref_type: Option<String>,
    pub ref_field: Option<String>,
    pub ref_restriction: String,
    pub default_value: Option<Value>,
    pub choices: Option<ChoiceMap>,
    pub group: Option<GroupDescriptor>,
    /// Set when this stands in for a field that could not be described
    pub missing: bool,
}

/// Form names and properties already used at one level of a view
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    names: HashSet<String>,
    properties: HashSet<String>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldDescriptor {
    /// Stand-in for a field whose description is unavailable
    pub fn missing(field_id: &str, reason: &str) -> Self {
        Self {
            field_id: field_id.to_string(),
            field_name: field_id.to_string(),
            label: "Missing field".to_string(),
            help: reason.to_string(),
            tooltip: reason.to_string(),
            placeholder: format!("(field missing: '{}')", field_id),
            property_uri: String::new(),
            subproperty_uris: Vec::new(),
            placement: Placement::default(),
            placement_spec: String::new(),
            value_type: String::new(),
            render_type: RenderType::Showtext,
            value_mode: ValueMode::Direct,
            ref_type: None,
            ref_field: None,
            ref_restriction: "ALL".to_string(),
            default_value: None,
            choices: None,
            group: None,
            missing: true,
        }
    }

    pub fn is_group(&self) -> bool {
        self.render_type.is_group() && self.group.is_some()
    }

    /// Whether values are written into the entity
    pub fn is_stored(&self) -> bool {
        !self.missing && !self.property_uri.is_empty()
    }

    /// Suffix the form name and property where they clash with fields
    /// already seen, then record both.
    ///
    /// Only the clashing part is suffixed; the first occurrence keeps the
    /// unsuffixed value.
    pub fn resolve_duplicates(&mut self, tracker: &mut DuplicateTracker) {
        let name_clash = tracker.names.contains(&self.field_name);
        let prop_clash = !self.property_uri.is_empty() && tracker.properties.contains(&self.property_uri);
        if name_clash || prop_clash {
            let mut i = 1;
            let mut suffix = String::new();
            while (name_clash && tracker.names.contains(&format!("{}{}", self.field_name, suffix)))
                || (prop_clash && tracker.properties.contains(&format!("{}{}", self.property_uri, suffix)))
            {
                i += 1;
                suffix = format!("__{}", i);
            }
            if name_clash {
                self.field_name.push_str(&suffix);
            }
            if prop_clash {
                self.property_uri.push_str(&suffix);
            }
            debug!(
                field_id = self.field_id.as_str(),
                field_name = self.field_name.as_str(),
                property_uri = self.property_uri.as_str(),
                "renamed duplicate field"
            );
        }
        tracker.names.insert(self.field_name.clone());
        if !self.property_uri.is_empty() {
            tracker.properties.insert(self.property_uri.clone());
        }
    }
}

/// Describe a field named by a view, list or group.
///
/// `seen` holds the fields being expanded by enclosing groups. A field
/// that cannot be loaded is described by a placeholder; a field that
/// refers back to an enclosing group is an error.
pub fn descriptor_from_view_field(
    coll: &Collection,
    field_ref: &FieldRef,
    view_context: &SelectorContext,
    seen: &mut Vec<String>,
) -> AnnalResult<FieldDescriptor> {
    let Some(field) = coll.get_field(&field_ref.field_id)? else {
        warn!(
            coll_id = coll.id(),
            field_id = field_ref.field_id.as_str(),
            "view refers to missing field"
        );
        return Ok(FieldDescriptor::missing(
            &field_ref.field_id,
            &format!("Field '{}' is not defined", field_ref.field_id),
        ));
    };
    descriptor_from_field(
        coll,
        &field,
        field_ref.property_uri.as_deref(),
        field_ref.placement.as_deref(),
        view_context,
        seen,
    )
}

/// Describe a field record with optional property and placement overrides
pub fn descriptor_from_field(
    coll: &Collection,
    field: &RecordField,
    property_override: Option<&str>,
    placement_override: Option<&str>,
    view_context: &SelectorContext,
    seen: &mut Vec<String>,
) -> AnnalResult<FieldDescriptor> {
    let field_id = field.id().to_string();
    if seen.contains(&field_id) {
        return Err(AnnalError::RecursiveFieldGroup(field_id));
    }

    let property_uri = property_override
        .filter(|p| !p.is_empty())
        .unwrap_or(field.property_uri())
        .to_string();
    let subproperty_uris = if property_uri.is_empty() {
        Vec::new()
    } else {
        coll.subproperty_uris(&property_uri)?
            .into_iter()
            .filter(|p| *p != property_uri)
            .collect()
    };
    let placement_spec = placement_override
        .filter(|p| !p.is_empty())
        .unwrap_or(field.placement())
        .to_string();
    let render_type = field.render_type();
    let ref_type = field.ref_type().map(str::to_string);
    let ref_restriction = field.ref_restriction().to_string();

    let choices = if render_type == RenderType::Placement {
        Some(placement_choices())
    } else if let Some(ref_type) = &ref_type {
        let choices = match Selector::parse(&ref_restriction) {
            Ok(selector) => enumerate_choices(coll, ref_type, &selector, view_context)?,
            Err(e) => {
                warn!(
                    field_id = field_id.as_str(),
                    restriction = ref_restriction.as_str(),
                    error = %e,
                    "invalid field restriction"
                );
                ChoiceMap::new()
            }
        };
        Some(choices)
    } else {
        None
    };
    let choices = match choices {
        Some(c) if render_type.is_optional() => Some(with_empty_choice(c, field.placeholder())),
        other => other,
    };

    let group = if render_type.is_group() || render_type == RenderType::RefMultifield {
        let refs = if field.has_inline_fields() {
            field.field_fields()
        } else if let Some(group_id) = field.group_ref() {
            match coll.get_group(group_id)? {
                Some(group) => group.field_refs(),
                None => {
                    warn!(
                        coll_id = coll.id(),
                        field_id = field_id.as_str(),
                        group_id,
                        "field refers to missing group"
                    );
                    return Ok(FieldDescriptor::missing(
                        &field_id,
                        &format!("Field group '{}' is not defined", group_id),
                    ));
                }
            }
        } else {
            Vec::new()
        };
        seen.push(field_id.clone());
        let fields = describe_fields(coll, &refs, view_context, seen);
        seen.pop();
        Some(GroupDescriptor {
            label: field.label().to_string(),
            add_label: field.repeat_label_add(),
            delete_label: field.repeat_label_delete(),
            fields: fields?,
        })
    } else {
        None
    };

    Ok(FieldDescriptor {
        field_name: field.field_name().to_string(),
        label: field.label().to_string(),
        help: field.help().to_string(),
        tooltip: field.tooltip().to_string(),
        placeholder: field.placeholder().to_string(),
        property_uri,
        subproperty_uris,
        placement: parse_placement(&placement_spec),
        placement_spec,
        value_type: field.value_type().to_string(),
        render_type,
        value_mode: field.value_mode(),
        ref_type,
        ref_field: field.ref_field().map(str::to_string),
        ref_restriction,
        default_value: field.default_value().cloned(),
        choices,
        group,
        missing: false,
        field_id,
    })
}

/// Describe a list of field references with duplicates resolved
pub fn describe_fields(
    coll: &Collection,
    refs: &[FieldRef],
    view_context: &SelectorContext,
    seen: &mut Vec<String>,
) -> AnnalResult<Vec<FieldDescriptor>> {
    let mut tracker = DuplicateTracker::new();
    let mut fields = Vec::with_capacity(refs.len());
    for field_ref in refs {
        let mut descriptor = descriptor_from_view_field(coll, field_ref, view_context, seen)?;
        descriptor.resolve_duplicates(&mut tracker);
        fields.push(descriptor);
    }
    Ok(fields)
}
