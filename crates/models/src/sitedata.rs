//! Built-in site data
//!
//! The site-data collection (`c/_annalist_site/`) holds the definitions every
//! collection inherits: vocabularies, types, fields, views, lists, the
//! enumerations used by field selectors, and the fallback user permissions.

use annal_core::identifiers::DEFAULT_USER_URI;
use annal_core::vocab::{BUILTIN_PREFIXES, annal, rdfs};
use annal_core::{
    AnnalResult, DEFAULT_USER_ID, EntityKind, EntityValues, Permission, RenderType, SITEDATA_ID,
    UNKNOWN_USER_ID, UNKNOWN_USER_URI, ValueMode,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::collection::Collection;
use crate::layout::EntityClass;
use crate::migration::{RENDER_TYPE_ENUM, VALUE_MODE_ENUM};
use crate::records::{
    FieldRef, RecordField, RecordList, RecordType, RecordView, RecordVocab, UserPermissions,
    ValuesBuilder,
};
use crate::settings::SiteSettings;
use crate::site::Site;
use crate::store;

/// List display type enumeration
pub const LIST_TYPE_ENUM: &str = "_enum_list_type";

const FULL: &str = "small:0,12";
const LEFT: &str = "small:0,12;medium:0,6";
const RIGHT: &str = "small:0,12;medium:6,6";

/// Options for writing site data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRecords {
    /// Write the fallback user records, replacing existing ones
    Replace,
    /// Keep fallback user records that already exist
    Keep,
}

/// Write (or rewrite) the complete built-in site data
pub fn write_site_data(site: &Site, settings: &SiteSettings, users: UserRecords) -> AnnalResult<Collection> {
    let meta = ValuesBuilder::new()
        .with_label(settings.site_label.as_str())
        .with_comment("Built-in definitions shared by every collection")
        .with(annal::SOFTWARE_VERSION, crate::VERSION)
        .build();
    let entity = store::create(site, &EntityClass::collection(), SITEDATA_ID, meta)?;
    let sitedata = Collection::from_entity(site, entity);

    let mut count = 0;
    for (prefix, uri) in BUILTIN_PREFIXES {
        let values = RecordVocab::values(&format!("Vocabulary namespace for {}", prefix), uri).build();
        put(&sitedata, EntityClass::vocab(), prefix, values)?;
        count += 1;
    }
    for (id, values) in builtin_types() {
        put(&sitedata, EntityClass::record_type(), &id, values)?;
        count += 1;
    }
    for (id, values) in builtin_fields() {
        put(&sitedata, EntityClass::field(), id, values)?;
        count += 1;
    }
    for (id, values) in builtin_views() {
        put(&sitedata, EntityClass::view(), id, values)?;
        count += 1;
    }
    for (id, values) in builtin_lists() {
        put(&sitedata, EntityClass::list(), id, values)?;
        count += 1;
    }
    for (type_id, id, values) in builtin_enums() {
        put(&sitedata, EntityClass::for_type_id(type_id), &id, values)?;
        count += 1;
    }
    let user_records = [
        (
            DEFAULT_USER_ID,
            "Default permissions",
            "Permissions for any authenticated user",
            DEFAULT_USER_URI,
            &settings.default_user_permissions,
        ),
        (
            UNKNOWN_USER_ID,
            "Unknown user",
            "Permissions for unauthenticated users",
            UNKNOWN_USER_URI,
            &settings.unknown_user_permissions,
        ),
    ];
    for (id, label, comment, uri, perms) in user_records {
        if users == UserRecords::Keep && store::exists(&sitedata, &EntityClass::user(), id) {
            continue;
        }
        let values = UserPermissions::values(label, comment, uri, perms).build();
        put(&sitedata, EntityClass::user(), id, values)?;
        count += 1;
    }

    sitedata.regenerate_context()?;
    info!(count, "wrote site data");
    Ok(sitedata)
}

fn put(sitedata: &Collection, class: EntityClass, id: &str, values: EntityValues) -> AnnalResult<()> {
    store::create(sitedata, &class, id, values)?;
    debug!(type_id = class.type_id(), id, "wrote site data entity");
    Ok(())
}

fn refs(items: &[(&str, &str)]) -> Vec<FieldRef> {
    items
        .iter()
        .map(|(id, placement)| FieldRef::new(*id).with_placement(*placement))
        .collect()
}

fn ref_values(items: &[(&str, &str)]) -> Value {
    Value::from(refs(items).iter().map(FieldRef::to_value).collect::<Vec<_>>())
}

// ============================================================================
// Types
// ============================================================================

fn builtin_types() -> Vec<(String, EntityValues)> {
    let metadata = [
        (EntityKind::Collection, "Collection", annal::COLLECTION_CLASS, "Collection"),
        (EntityKind::Type, "Type", annal::TYPE_CLASS, "Type"),
        (EntityKind::List, "List", annal::LIST_CLASS, "List"),
        (EntityKind::View, "View", annal::VIEW_CLASS, "View"),
        (EntityKind::Field, "Field", annal::FIELD_CLASS, "Field"),
        (EntityKind::Group, "Field group", annal::GROUP_CLASS, "Group"),
        (EntityKind::User, "User permissions", annal::USER_CLASS, "User"),
        (EntityKind::Vocab, "Vocabulary namespace", annal::VOCAB_CLASS, "Vocab"),
    ];
    let mut types: Vec<(String, EntityValues)> = metadata
        .iter()
        .filter_map(|(kind, label, uri, stem)| {
            let id = kind.builtin_type_id()?;
            let values = RecordType::values(label, uri, &[])
                .with_comment(format!("Built-in type of {} records", label.to_lowercase()))
                .with(annal::TYPE_VIEW, format!("_view/{}_view", stem))
                .with(annal::TYPE_LIST, format!("_list/{}_list", stem))
                .build();
            Some((id.to_string(), values))
        })
        .collect();

    let enums = [
        (RENDER_TYPE_ENUM, "Field render type", "annal:Enum_render_type"),
        (VALUE_MODE_ENUM, "Field value mode", "annal:Enum_value_mode"),
        (LIST_TYPE_ENUM, "List display type", "annal:Enum_list_type"),
    ];
    for (id, label, uri) in enums {
        let values = RecordType::values(label, uri, &[annal::ENUM_CLASS])
            .with(annal::TYPE_VIEW, "_view/Enum_view")
            .with(annal::TYPE_LIST, "_list/Enum_list")
            .build();
        types.push((id.to_string(), values));
    }

    types.push((
        "Default_type".to_string(),
        RecordType::values("Default record", "annal:Default_type", &[])
            .with(annal::TYPE_VIEW, "_view/Default_view")
            .with(annal::TYPE_LIST, "_list/Default_list")
            .build(),
    ));
    types
}

// ============================================================================
// Fields
// ============================================================================

fn field(label: &str, render_type: RenderType, property: &str, placement: &str) -> ValuesBuilder {
    RecordField::values(label, render_type, property, placement)
}

fn enum_field(label: &str, render_type: RenderType, property: &str, placement: &str, ref_type: &str) -> ValuesBuilder {
    field(label, render_type, property, placement)
        .with(annal::FIELD_REF_TYPE, ref_type)
        .with(annal::FIELD_VALUE_TYPE, annal::SLUG)
        .with(annal::FIELD_VALUE_MODE, RecordField::value_mode_value(ValueMode::Direct))
}

fn repeat_field(label: &str, render_type: RenderType, property: &str, fields: &[(&str, &str)]) -> ValuesBuilder {
    field(label, render_type, property, FULL).with(annal::FIELD_FIELDS, ref_values(fields))
}

fn builtin_fields() -> Vec<(&'static str, EntityValues)> {
    use RenderType as R;
    let text = |label: &str, property: &str, placement: &str| {
        field(label, R::Text, property, placement).with(annal::FIELD_VALUE_TYPE, annal::TEXT)
    };
    let ident = |label: &str, property: &str, placement: &str| {
        field(label, R::Identifier, property, placement).with(annal::FIELD_VALUE_TYPE, annal::IDENTIFIER)
    };
    let fields: Vec<(&'static str, ValuesBuilder)> = vec![
        // ── Common ──
        (
            "Entity_id",
            field("Id", R::EntityId, annal::ID, LEFT)
                .with(annal::FIELD_NAME, "entity_id")
                .with(annal::FIELD_VALUE_TYPE, annal::SLUG)
                .with(annal::PLACEHOLDER, "(entity id)"),
        ),
        (
            "Entity_type",
            field("Type", R::EntityTypeId, annal::TYPE_ID, RIGHT)
                .with(annal::FIELD_NAME, "entity_type")
                .with(annal::FIELD_REF_TYPE, "_type")
                .with(annal::FIELD_VALUE_TYPE, annal::SLUG),
        ),
        (
            "Entity_label",
            text("Label", rdfs::LABEL, FULL).with(annal::PLACEHOLDER, "(label)"),
        ),
        (
            "Entity_comment",
            field("Comment", R::Markdown, rdfs::COMMENT, FULL)
                .with(annal::FIELD_VALUE_TYPE, annal::RICHTEXT)
                .with(annal::PLACEHOLDER, "(description)"),
        ),
        ("Entity_see_also", ident("See also", rdfs::SEE_ALSO, FULL)),
        // ── Types ──
        ("Type_uri", ident("URI", annal::URI, FULL)),
        (
            "Type_supertype_uris",
            repeat_field(
                "Supertype URIs",
                R::GroupSetRow,
                annal::SUPERTYPE_URI,
                &[("Type_supertype_uri", FULL)],
            )
            .with(annal::REPEAT_LABEL_ADD, "Add supertype")
            .with(annal::REPEAT_LABEL_DELETE, "Remove selected supertype(s)"),
        ),
        ("Type_supertype_uri", ident("Supertype URI", "@id", FULL)),
        (
            "Type_view",
            enum_field("Default view", R::View, annal::TYPE_VIEW, LEFT, "_view"),
        ),
        (
            "Type_list",
            enum_field("Default list", R::List, annal::TYPE_LIST, RIGHT, "_list"),
        ),
        // ── Views and lists ──
        ("View_record_type", ident("Record type", annal::RECORD_TYPE, FULL)),
        (
            "View_add_field",
            field("Add field?", R::CheckBox, annal::ADD_FIELD, LEFT),
        ),
        (
            "View_fields",
            repeat_field(
                "Fields",
                R::GroupSeqRow,
                annal::VIEW_FIELDS,
                &[
                    ("View_field_sel", "small:0,12;medium:0,4"),
                    ("View_field_property", "small:0,12;medium:4,4"),
                    ("View_field_placement", "small:0,12;medium:8,4"),
                ],
            )
            .with(annal::REPEAT_LABEL_ADD, "Add field")
            .with(annal::REPEAT_LABEL_DELETE, "Remove selected field(s)"),
        ),
        (
            "View_field_sel",
            enum_field("Field ref", R::Field, annal::FIELD_ID, FULL, "_field"),
        ),
        ("View_field_property", ident("Property URI", annal::PROPERTY_URI, FULL)),
        (
            "View_field_placement",
            field("Position/size", R::Placement, annal::FIELD_PLACEMENT, FULL)
                .with(annal::FIELD_VALUE_TYPE, annal::PLACEMENT),
        ),
        (
            "List_type",
            enum_field("List display type", R::Enum, annal::DISPLAY_TYPE, LEFT, LIST_TYPE_ENUM),
        ),
        (
            "List_default_type",
            enum_field("Default type", R::Type, annal::DEFAULT_TYPE, LEFT, "_type"),
        ),
        (
            "List_default_view",
            enum_field("Default view", R::View, annal::DEFAULT_VIEW, RIGHT, "_view"),
        ),
        (
            "List_entity_selector",
            text("Selector", annal::LIST_ENTITY_SELECTOR, FULL),
        ),
        (
            "List_fields",
            repeat_field(
                "Fields",
                R::GroupSeqRow,
                annal::LIST_FIELDS,
                &[
                    ("View_field_sel", "small:0,12;medium:0,4"),
                    ("View_field_property", "small:0,12;medium:4,4"),
                    ("View_field_placement", "small:0,12;medium:8,4"),
                ],
            ),
        ),
        // ── Fields and groups ──
        (
            "Field_render_type",
            enum_field("Field render type", R::Enum, annal::FIELD_RENDER_TYPE, LEFT, RENDER_TYPE_ENUM),
        ),
        (
            "Field_value_mode",
            enum_field("Value mode", R::Enum, annal::FIELD_VALUE_MODE, RIGHT, VALUE_MODE_ENUM),
        ),
        ("Field_value_type", ident("Value type", annal::FIELD_VALUE_TYPE, LEFT)),
        ("Field_property", ident("Property URI", annal::PROPERTY_URI, LEFT)),
        (
            "Field_superproperty_uris",
            repeat_field(
                "Superproperty URIs",
                R::GroupSetRow,
                annal::SUPERPROPERTY_URI,
                &[("Field_superproperty_uri", FULL)],
            ),
        ),
        ("Field_superproperty_uri", ident("Superproperty URI", "@id", FULL)),
        (
            "Field_placement",
            field("Position/size", R::Placement, annal::FIELD_PLACEMENT, RIGHT)
                .with(annal::FIELD_VALUE_TYPE, annal::PLACEMENT),
        ),
        ("Field_placeholder", text("Placeholder", annal::PLACEHOLDER, FULL)),
        ("Field_tooltip", text("Tooltip", annal::TOOLTIP, FULL)),
        ("Field_default", text("Default value", annal::DEFAULT_VALUE, FULL)),
        (
            "Field_typeref",
            enum_field("Refer to type", R::EnumOptional, annal::FIELD_REF_TYPE, LEFT, "_type")
                .with(annal::PLACEHOLDER, "(no type selected)"),
        ),
        (
            "Field_restrict",
            text("Value restriction", annal::FIELD_REF_RESTRICTION, RIGHT),
        ),
        ("Field_fieldref", ident("Refer to field", annal::FIELD_REF_FIELD, LEFT)),
        (
            "Field_fields",
            repeat_field(
                "Subfields",
                R::GroupSeqRow,
                annal::FIELD_FIELDS,
                &[
                    ("View_field_sel", "small:0,12;medium:0,4"),
                    ("View_field_property", "small:0,12;medium:4,4"),
                    ("View_field_placement", "small:0,12;medium:8,4"),
                ],
            ),
        ),
        (
            "Group_fields",
            repeat_field(
                "Fields",
                R::GroupSeqRow,
                annal::GROUP_FIELDS,
                &[
                    ("View_field_sel", "small:0,12;medium:0,4"),
                    ("View_field_property", "small:0,12;medium:4,4"),
                    ("View_field_placement", "small:0,12;medium:8,4"),
                ],
            ),
        ),
        // ── Users and vocabularies ──
        ("User_uri", text("User URI", annal::USER_URI, FULL)),
        (
            "User_permissions",
            field("Permissions", R::TokenSet, annal::USER_PERMISSION, FULL)
                .with(annal::FIELD_VALUE_TYPE, "annal:Permission"),
        ),
        ("Vocab_uri", ident("Vocabulary namespace URI", annal::URI, FULL)),
    ];
    fields.into_iter().map(|(id, v)| (id, v.build())).collect()
}

// ============================================================================
// Views and lists
// ============================================================================

const ENTITY_HEAD: &[(&str, &str)] = &[("Entity_id", LEFT), ("Entity_type", RIGHT), ("Entity_label", FULL)];

fn view(label: &str, record_type: &str, extra: &[(&str, &str)]) -> EntityValues {
    let mut items: Vec<(&str, &str)> = ENTITY_HEAD.to_vec();
    items.extend_from_slice(extra);
    items.push(("Entity_comment", FULL));
    RecordView::values(label, record_type, &refs(&items)).build()
}

fn builtin_views() -> Vec<(&'static str, EntityValues)> {
    vec![
        ("Default_view", view("Default record view", "", &[])),
        (
            "Type_view",
            view(
                "Type definition",
                annal::TYPE_CLASS,
                &[
                    ("Type_uri", FULL),
                    ("Type_supertype_uris", FULL),
                    ("Type_view", LEFT),
                    ("Type_list", RIGHT),
                ],
            ),
        ),
        (
            "View_view",
            view(
                "View definition",
                annal::VIEW_CLASS,
                &[
                    ("View_record_type", FULL),
                    ("View_add_field", LEFT),
                    ("View_fields", FULL),
                ],
            ),
        ),
        (
            "List_view",
            view(
                "List definition",
                annal::LIST_CLASS,
                &[
                    ("List_type", LEFT),
                    ("List_default_type", LEFT),
                    ("List_default_view", RIGHT),
                    ("List_entity_selector", FULL),
                    ("View_record_type", FULL),
                    ("List_fields", FULL),
                ],
            ),
        ),
        (
            "Field_view",
            view(
                "Field definition",
                annal::FIELD_CLASS,
                &[
                    ("Field_render_type", LEFT),
                    ("Field_value_mode", RIGHT),
                    ("Field_value_type", LEFT),
                    ("Field_property", LEFT),
                    ("Field_placement", RIGHT),
                    ("Field_superproperty_uris", FULL),
                    ("Field_placeholder", FULL),
                    ("Field_tooltip", FULL),
                    ("Field_default", FULL),
                    ("Field_typeref", LEFT),
                    ("Field_restrict", RIGHT),
                    ("Field_fieldref", LEFT),
                    ("Field_fields", FULL),
                ],
            ),
        ),
        (
            "Group_view",
            view(
                "Field group definition",
                annal::GROUP_CLASS,
                &[("View_record_type", FULL), ("Group_fields", FULL)],
            ),
        ),
        (
            "User_view",
            view(
                "User permissions",
                annal::USER_CLASS,
                &[("User_uri", FULL), ("User_permissions", FULL)],
            ),
        ),
        (
            "Vocab_view",
            view("Vocabulary namespace", annal::VOCAB_CLASS, &[("Vocab_uri", FULL), ("Entity_see_also", FULL)]),
        ),
        ("Enum_view", view("Enumerated value", annal::ENUM_CLASS, &[])),
        ("Collection_view", view("Collection metadata", annal::COLLECTION_CLASS, &[])),
    ]
}

fn builtin_lists() -> Vec<(&'static str, EntityValues)> {
    let columns = refs(&[("Entity_id", "small:0,3"), ("Entity_label", "small:3,9")]);
    let typed_columns = refs(&[
        ("Entity_id", "small:0,3"),
        ("Entity_type", "small:3,3"),
        ("Entity_label", "small:6,6"),
    ]);
    let list = |label: &str, type_id: &str, view_id: &str| {
        RecordList::values(label, &format!("_type/{}", type_id), "ALL", &columns)
            .with(annal::DEFAULT_VIEW, format!("_view/{}", view_id))
            .build()
    };
    vec![
        (
            "Default_list",
            RecordList::values("List entities", "", "ALL", &columns)
                .with(annal::DEFAULT_VIEW, "_view/Default_view")
                .build(),
        ),
        (
            "Default_list_all",
            RecordList::values("List entities with type information", "", "ALL", &typed_columns)
                .with(annal::DEFAULT_VIEW, "_view/Default_view")
                .build(),
        ),
        ("Collection_list", list("Collections", "_coll", "Collection_view")),
        ("Type_list", list("Types", "_type", "Type_view")),
        ("View_list", list("Views", "_view", "View_view")),
        ("List_list", list("Lists", "_list", "List_view")),
        ("Field_list", list("Fields", "_field", "Field_view")),
        ("Group_list", list("Field groups", "_group", "Group_view")),
        ("User_list", list("User permissions", "_user", "User_view")),
        ("Vocab_list", list("Vocabulary namespaces", "_vocab", "Vocab_view")),
        ("Enum_list", list("Enumerated values", "Default_type", "Enum_view")),
    ]
}

// ============================================================================
// Enumerations
// ============================================================================

fn builtin_enums() -> Vec<(&'static str, String, EntityValues)> {
    let value = |label: &str, uri: String| ValuesBuilder::new().with_label(label).with(annal::URI, uri).build();
    let mut enums = Vec::new();
    for rt in RenderType::all() {
        let tag = rt.tag();
        enums.push((RENDER_TYPE_ENUM, tag.to_string(), value(tag, format!("annal:RenderType/{}", tag))));
    }
    for mode in ValueMode::all() {
        let tag = mode.tag();
        enums.push((VALUE_MODE_ENUM, tag.to_string(), value(tag, format!("annal:ValueMode/{}", tag))));
    }
    for (tag, label) in [("List", "List"), ("Grid", "Grid")] {
        enums.push((LIST_TYPE_ENUM, tag.to_string(), value(label, format!("annal:ListType/{}", tag))));
    }
    enums
}

/// Permission tokens granted by default when none are configured
pub fn default_permissions() -> Vec<Permission> {
    vec![Permission::View]
}
