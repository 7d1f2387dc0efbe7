//! Legacy schema migration for stored records
//!
//! Applied to every body on load and before save, so that records written by
//! earlier versions present current property names to the rest of the core.

use annal_core::vocab::annal;
use annal_core::{EntityKind, EntityValues, RenderType, ValueMode, extract_entity_id};
use serde_json::Value;

use crate::layout::EntityClass;

/// Render-type enumeration type id
pub const RENDER_TYPE_ENUM: &str = "_enum_render_type";

/// Value-mode enumeration type id
pub const VALUE_MODE_ENUM: &str = "_enum_value_mode";

/// Field keys renamed since earlier versions: (old, new)
const FIELD_KEY_RENAMES: &[(&str, &str)] = &[
    (annal::OPTIONS_TYPEREF, annal::FIELD_REF_TYPE),
    (annal::RESTRICT_VALUES, annal::FIELD_REF_RESTRICTION),
    (annal::TARGET_FIELD, annal::FIELD_REF_FIELD),
    (annal::FIELD_TARGET_TYPE, annal::FIELD_VALUE_TYPE),
];

/// Apply migrations appropriate to the entity class
pub fn migrate_values(class: &EntityClass, values: &mut EntityValues) {
    match class.kind() {
        EntityKind::Field => migrate_field(values),
        EntityKind::View | EntityKind::Group | EntityKind::List => {
            rename_key(values, annal::TARGET_TYPE, annal::RECORD_TYPE);
        }
        _ => {}
    }
}

fn rename_key(values: &mut EntityValues, old: &str, new: &str) {
    if let Some(v) = values.remove(old) {
        values.entry(new.to_string()).or_insert(v);
    }
}

fn non_empty(values: &EntityValues, key: &str) -> bool {
    values
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Bring a field description up to the current schema
pub fn migrate_field(values: &mut EntityValues) {
    for (old, new) in FIELD_KEY_RENAMES {
        rename_key(values, old, new);
    }

    // ── Render type ──
    let render_tag = values
        .get(annal::FIELD_RENDER_TYPE)
        .and_then(Value::as_str)
        .map(|s| extract_entity_id(s).to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| RenderType::Text.tag().to_string());
    let render_tag = RenderType::migrate_tag(&render_tag).to_string();
    values.insert(
        annal::FIELD_RENDER_TYPE.to_string(),
        Value::from(format!("{}/{}", RENDER_TYPE_ENUM, render_tag)),
    );

    // ── Value mode ──
    if !non_empty(values, annal::FIELD_VALUE_MODE) {
        let mode = if non_empty(values, annal::FIELD_REF_TYPE)
            && non_empty(values, annal::FIELD_REF_FIELD)
        {
            ValueMode::Field
        } else {
            match RenderType::from_tag(&render_tag) {
                Some(RenderType::RefMultifield) => ValueMode::Entity,
                Some(RenderType::UriImport) => ValueMode::Import,
                Some(RenderType::FileUpload) => ValueMode::Upload,
                _ => ValueMode::Direct,
            }
        };
        values.insert(
            annal::FIELD_VALUE_MODE.to_string(),
            Value::from(format!("{}/{}", VALUE_MODE_ENUM, mode.tag())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn values(v: Value) -> EntityValues {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_legacy_field_keys_renamed() {
        let mut v = values(json!({
            "annal:options_typeref": "testtype",
            "annal:restrict_values": "ALL",
            "annal:target_field": "rdfs:label",
            "annal:field_target_type": "annal:Slug"
        }));
        migrate_field(&mut v);
        assert_eq!(v.get(annal::FIELD_REF_TYPE), Some(&json!("testtype")));
        assert_eq!(v.get(annal::FIELD_REF_RESTRICTION), Some(&json!("ALL")));
        assert_eq!(v.get(annal::FIELD_REF_FIELD), Some(&json!("rdfs:label")));
        assert_eq!(v.get(annal::FIELD_VALUE_TYPE), Some(&json!("annal:Slug")));
        assert!(v.get(annal::OPTIONS_TYPEREF).is_none());
        assert_eq!(
            v.get(annal::FIELD_VALUE_MODE),
            Some(&json!("_enum_value_mode/Value_field"))
        );
    }

    #[test]
    fn test_render_type_migration() {
        let mut v = values(json!({"annal:field_render_type": "RepeatGroup"}));
        migrate_field(&mut v);
        assert_eq!(
            v.get(annal::FIELD_RENDER_TYPE),
            Some(&json!("_enum_render_type/Group_Seq"))
        );

        let mut v = values(json!({}));
        migrate_field(&mut v);
        assert_eq!(
            v.get(annal::FIELD_RENDER_TYPE),
            Some(&json!("_enum_render_type/Text"))
        );
        assert_eq!(
            v.get(annal::FIELD_VALUE_MODE),
            Some(&json!("_enum_value_mode/Value_direct"))
        );
    }

    #[test]
    fn test_value_mode_inferred_from_render_type() {
        let mut v = values(json!({"annal:field_render_type": "_enum_render_type/FileUpload"}));
        migrate_field(&mut v);
        assert_eq!(
            v.get(annal::FIELD_VALUE_MODE),
            Some(&json!("_enum_value_mode/Value_upload"))
        );
    }

    #[test]
    fn test_existing_value_mode_kept() {
        let mut v = values(json!({
            "annal:field_render_type": "_enum_render_type/URIImport",
            "annal:field_value_mode": "_enum_value_mode/Value_direct"
        }));
        migrate_field(&mut v);
        assert_eq!(
            v.get(annal::FIELD_VALUE_MODE),
            Some(&json!("_enum_value_mode/Value_direct"))
        );
    }

    #[test]
    fn test_view_target_type_renamed() {
        let mut v = values(json!({"annal:target_type": "test:type"}));
        migrate_values(&EntityClass::view(), &mut v);
        assert_eq!(v.get(annal::RECORD_TYPE), Some(&json!("test:type")));
    }
}
