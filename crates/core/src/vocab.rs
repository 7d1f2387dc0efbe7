//! Vocabulary namespaces and CURIE constants
//!
//! Stored entity bodies use CURIEs (`prefix:local`) for every property key.
//! The constants here are the single source of those keys.

/// Annalist namespace URI
pub const ANNAL_NAMESPACE: &str = "http://purl.org/annalist/2014/#";
/// RDF namespace URI
pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RDFS namespace URI
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// OWL namespace URI
pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
/// XML Schema datatypes namespace URI
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// Built-in prefix declarations, in context order
pub const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF_NAMESPACE),
    ("rdfs", RDFS_NAMESPACE),
    ("owl", OWL_NAMESPACE),
    ("xsd", XSD_NAMESPACE),
    ("annal", ANNAL_NAMESPACE),
];

/// Annalist vocabulary terms
pub mod annal {
    // Entity housekeeping
    pub const ID: &str = "annal:id";
    pub const TYPE_ID: &str = "annal:type_id";
    pub const TYPE: &str = "annal:type";
    pub const URL: &str = "annal:url";
    pub const URI: &str = "annal:uri";
    pub const SOFTWARE_VERSION: &str = "annal:software_version";
    pub const INHERIT_FROM: &str = "annal:inherit_from";

    // Types
    pub const SUPERTYPE_URI: &str = "annal:supertype_uri";
    pub const TYPE_VIEW: &str = "annal:type_view";
    pub const TYPE_LIST: &str = "annal:type_list";

    // Views and lists
    pub const RECORD_TYPE: &str = "annal:record_type";
    pub const ADD_FIELD: &str = "annal:add_field";
    pub const OPEN_VIEW: &str = "annal:open_view";
    pub const VIEW_FIELDS: &str = "annal:view_fields";
    pub const LIST_FIELDS: &str = "annal:list_fields";
    pub const DISPLAY_TYPE: &str = "annal:display_type";
    pub const DEFAULT_VIEW: &str = "annal:default_view";
    pub const DEFAULT_TYPE: &str = "annal:default_type";
    pub const LIST_ENTITY_SELECTOR: &str = "annal:list_entity_selector";

    // Fields
    pub const FIELD_ID: &str = "annal:field_id";
    pub const FIELD_NAME: &str = "annal:field_name";
    pub const PROPERTY_URI: &str = "annal:property_uri";
    pub const SUPERPROPERTY_URI: &str = "annal:superproperty_uri";
    pub const FIELD_PLACEMENT: &str = "annal:field_placement";
    pub const FIELD_RENDER_TYPE: &str = "annal:field_render_type";
    pub const FIELD_VALUE_MODE: &str = "annal:field_value_mode";
    pub const FIELD_VALUE_TYPE: &str = "annal:field_value_type";
    pub const PLACEHOLDER: &str = "annal:placeholder";
    pub const TOOLTIP: &str = "annal:tooltip";
    pub const DEFAULT_VALUE: &str = "annal:default_value";
    pub const FIELD_REF_TYPE: &str = "annal:field_ref_type";
    pub const FIELD_REF_RESTRICTION: &str = "annal:field_ref_restriction";
    pub const FIELD_REF_FIELD: &str = "annal:field_ref_field";
    pub const FIELD_FIELDS: &str = "annal:field_fields";
    pub const GROUP_REF: &str = "annal:group_ref";
    pub const GROUP_FIELDS: &str = "annal:group_fields";
    pub const REPEAT_LABEL_ADD: &str = "annal:repeat_label_add";
    pub const REPEAT_LABEL_DELETE: &str = "annal:repeat_label_delete";

    // Legacy field keys
    pub const OPTIONS_TYPEREF: &str = "annal:options_typeref";
    pub const RESTRICT_VALUES: &str = "annal:restrict_values";
    pub const TARGET_FIELD: &str = "annal:target_field";
    pub const FIELD_TARGET_TYPE: &str = "annal:field_target_type";
    pub const TARGET_TYPE: &str = "annal:target_type";

    // Users
    pub const USER_URI: &str = "annal:user_uri";
    pub const USER_PERMISSION: &str = "annal:user_permission";

    // Attachments
    pub const RESOURCE_NAME: &str = "resource_name";
    pub const RESOURCE_TYPE: &str = "resource_type";
    pub const UPLOAD_NAME: &str = "upload_name";
    pub const UPLOADED_SIZE: &str = "uploaded_size";
    pub const UPLOADED_FILE: &str = "uploaded_file";
    pub const IMPORT_URL: &str = "import_url";

    // Classes
    pub const COLLECTION_CLASS: &str = "annal:Collection";
    pub const TYPE_CLASS: &str = "annal:Type";
    pub const LIST_CLASS: &str = "annal:List";
    pub const VIEW_CLASS: &str = "annal:View";
    pub const FIELD_CLASS: &str = "annal:Field";
    pub const GROUP_CLASS: &str = "annal:Field_group";
    pub const USER_CLASS: &str = "annal:User";
    pub const VOCAB_CLASS: &str = "annal:Vocabulary";
    pub const ENUM_CLASS: &str = "annal:Enum";
    pub const ENTITY_DATA_CLASS: &str = "annal:EntityData";

    // Value types
    pub const TEXT: &str = "annal:Text";
    pub const RICHTEXT: &str = "annal:Richtext";
    pub const IDENTIFIER: &str = "annal:Identifier";
    pub const IMAGE: &str = "annal:Image";
    pub const AUDIO: &str = "annal:Audio";
    pub const PLACEMENT: &str = "annal:Placement";
    pub const SLUG: &str = "annal:Slug";
}

/// RDFS vocabulary terms
pub mod rdfs {
    pub const LABEL: &str = "rdfs:label";
    pub const COMMENT: &str = "rdfs:comment";
    pub const SEE_ALSO: &str = "rdfs:seeAlso";
    pub const CLASS: &str = "rdfs:Class";
}

/// Expand a CURIE whose prefix is one of the built-in prefixes
pub fn expand_builtin(curie: &str) -> Option<String> {
    let (prefix, local) = curie.split_once(':')?;
    BUILTIN_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| format!("{}{}", ns, local))
}

/// True if the value is an absolute `http`, `https` or `file` URI
pub fn is_absolute_uri(value: &str) -> bool {
    matches!(
        value.split_once(':'),
        Some(("http", _)) | Some(("https", _)) | Some(("file", _))
    )
}

/// True if the value names an XML Schema datatype
pub fn is_xsd_datatype(value: &str) -> bool {
    value.starts_with("xsd:") || value.starts_with(XSD_NAMESPACE)
}
