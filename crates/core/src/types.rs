//! Closed enumerations shared across the Annalist crates
//!
//! These types encode, as tagged variants, the values that appear as free
//! strings in stored metadata:
//!
//! - **RenderType**: selects the renderer for a field
//! - **ValueMode**: how a field's value is obtained
//! - **Permission**: permission tokens granted to users
//! - **AltScope**: lookup mode for `load` and `children`
//! - **EntityKind**: the entity class tag used for path templates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnnalError;

// ============================================================================
// Render Types
// ============================================================================

/// Render-type tag of a field description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderType {
    // Literal-valued
    #[default]
    Text,
    Textarea,
    Codearea,
    Showtext,
    Placement,
    CheckBox,
    Markdown,
    ShowMarkdown,
    EntityId,
    EntityTypeId,
    TokenSet,

    // Reference-valued
    Identifier,
    EntityRef,
    RefAudio,
    RefImage,
    UriLink,
    UriImage,
    RefMultifield,
    Enum,
    EnumOptional,
    EnumChoice,
    EnumChoiceOpt,
    ViewChoice,
    Type,
    View,
    List,
    Field,

    // Structured
    UriImport,
    FileUpload,
    GroupSeq,
    GroupSeqRow,
    GroupSet,
    GroupSetRow,
    RepeatListRow,
}

impl RenderType {
    /// All render types, in registry order
    pub fn all() -> &'static [RenderType] {
        use RenderType::*;
        &[
            Text,
            Textarea,
            Codearea,
            Showtext,
            Placement,
            CheckBox,
            Markdown,
            ShowMarkdown,
            EntityId,
            EntityTypeId,
            TokenSet,
            Identifier,
            EntityRef,
            RefAudio,
            RefImage,
            UriLink,
            UriImage,
            RefMultifield,
            Enum,
            EnumOptional,
            EnumChoice,
            EnumChoiceOpt,
            ViewChoice,
            Type,
            View,
            List,
            Field,
            UriImport,
            FileUpload,
            GroupSeq,
            GroupSeqRow,
            GroupSet,
            GroupSetRow,
            RepeatListRow,
        ]
    }

    /// The stored tag (enumerated value id) for this render type
    pub fn tag(&self) -> &'static str {
        use RenderType::*;
        match self {
            Text => "Text",
            Textarea => "Textarea",
            Codearea => "Codearea",
            Showtext => "Showtext",
            Placement => "Placement",
            CheckBox => "CheckBox",
            Markdown => "Markdown",
            ShowMarkdown => "ShowMarkdown",
            EntityId => "EntityId",
            EntityTypeId => "EntityTypeId",
            TokenSet => "TokenSet",
            Identifier => "Identifier",
            EntityRef => "EntityRef",
            RefAudio => "RefAudio",
            RefImage => "RefImage",
            UriLink => "URILink",
            UriImage => "URIImage",
            RefMultifield => "RefMultifield",
            Enum => "Enum",
            EnumOptional => "Enum_optional",
            EnumChoice => "Enum_choice",
            EnumChoiceOpt => "Enum_choice_opt",
            ViewChoice => "View_choice",
            Type => "Type",
            View => "View",
            List => "List",
            Field => "Field",
            UriImport => "URIImport",
            FileUpload => "FileUpload",
            GroupSeq => "Group_Seq",
            GroupSeqRow => "Group_Seq_Row",
            GroupSet => "Group_Set",
            GroupSetRow => "Group_Set_Row",
            RepeatListRow => "RepeatListRow",
        }
    }

    /// Parse a stored tag, accepting legacy names
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "RepeatGroup" => return Some(RenderType::GroupSeq),
            "RepeatGroupRow" => return Some(RenderType::GroupSeqRow),
            "Slug" => return Some(RenderType::EntityRef),
            _ => {}
        }
        Self::all().iter().copied().find(|r| r.tag() == tag)
    }

    /// Map a legacy render-type tag to its current name
    pub fn migrate_tag(tag: &str) -> &str {
        match tag {
            "RepeatGroup" => "Group_Seq",
            "RepeatGroupRow" => "Group_Seq_Row",
            "Slug" => "EntityRef",
            other => other,
        }
    }

    /// Field value is stored as a literal string
    pub fn is_literal(&self) -> bool {
        use RenderType::*;
        matches!(
            self,
            Text | Textarea
                | Codearea
                | Showtext
                | Placement
                | CheckBox
                | Markdown
                | ShowMarkdown
                | EntityId
                | EntityTypeId
                | TokenSet
        )
    }

    /// Field value is stored as a URI reference
    pub fn is_id(&self) -> bool {
        use RenderType::*;
        matches!(
            self,
            Identifier
                | EntityRef
                | RefAudio
                | RefImage
                | UriLink
                | UriImage
                | RefMultifield
                | GroupSet
                | GroupSetRow
                | Enum
                | EnumOptional
                | EnumChoice
                | EnumChoiceOpt
                | ViewChoice
                | Type
                | View
                | List
                | Field
        )
    }

    /// Field value is a list interpreted as a set
    pub fn is_set(&self) -> bool {
        matches!(
            self,
            RenderType::TokenSet | RenderType::GroupSet | RenderType::GroupSetRow
        )
    }

    /// Field value is an ordered list
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            RenderType::GroupSeq | RenderType::GroupSeqRow | RenderType::RepeatListRow
        )
    }

    /// Field value is a structured JSON object
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            RenderType::UriImport
                | RenderType::FileUpload
                | RenderType::GroupSeq
                | RenderType::GroupSeqRow
                | RenderType::RepeatListRow
        )
    }

    /// Renders as a selection from enumerated choices
    pub fn is_enum(&self) -> bool {
        use RenderType::*;
        matches!(
            self,
            Enum | EnumOptional
                | EnumChoice
                | EnumChoiceOpt
                | ViewChoice
                | Type
                | View
                | List
                | Field
        )
    }

    /// Enum variant that offers an empty selection
    pub fn is_optional(&self) -> bool {
        matches!(self, RenderType::EnumOptional | RenderType::EnumChoiceOpt)
    }

    /// Renders a repeated group of sub-fields
    pub fn is_group(&self) -> bool {
        use RenderType::*;
        matches!(
            self,
            GroupSeq | GroupSeqRow | GroupSet | GroupSetRow | RepeatListRow
        )
    }
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for RenderType {
    type Err = AnnalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| AnnalError::unexpected(format!("render type '{}'", s)))
    }
}

// ============================================================================
// Value Modes
// ============================================================================

/// How a field's value is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueMode {
    /// Stored directly in the entity
    #[default]
    Direct,
    /// A reference to another entity
    Entity,
    /// Projected from a field of a referenced entity
    Field,
    /// Uploaded file attachment
    Upload,
    /// Imported from a URL into an attachment
    Import,
}

impl ValueMode {
    /// The stored tag for this value mode
    pub fn tag(&self) -> &'static str {
        match self {
            ValueMode::Direct => "Value_direct",
            ValueMode::Entity => "Value_entity",
            ValueMode::Field => "Value_field",
            ValueMode::Upload => "Value_upload",
            ValueMode::Import => "Value_import",
        }
    }

    /// Parse a stored tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.tag() == tag)
    }

    /// All value modes
    pub fn all() -> &'static [ValueMode] {
        &[
            ValueMode::Direct,
            ValueMode::Entity,
            ValueMode::Field,
            ValueMode::Upload,
            ValueMode::Import,
        ]
    }
}

impl fmt::Display for ValueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Permission token granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    View,
    Create,
    Update,
    Delete,
    Config,
    Admin,
    CreateCollection,
    DeleteCollection,
}

impl Permission {
    /// Token as stored in user records
    pub fn token(&self) -> &'static str {
        match self {
            Permission::View => "VIEW",
            Permission::Create => "CREATE",
            Permission::Update => "UPDATE",
            Permission::Delete => "DELETE",
            Permission::Config => "CONFIG",
            Permission::Admin => "ADMIN",
            Permission::CreateCollection => "CREATE_COLLECTION",
            Permission::DeleteCollection => "DELETE_COLLECTION",
        }
    }

    /// Parse a stored token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.token() == token)
    }

    /// All permission tokens
    pub fn all() -> &'static [Permission] {
        &[
            Permission::View,
            Permission::Create,
            Permission::Update,
            Permission::Delete,
            Permission::Config,
            Permission::Admin,
            Permission::CreateCollection,
            Permission::DeleteCollection,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Permission {
    type Err = AnnalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| AnnalError::unexpected(format!("permission '{}'", s)))
    }
}

// ============================================================================
// Alt Scope
// ============================================================================

/// Lookup mode for `load` and `children`.
///
/// The absence of a scope (`None` at call sites) restricts lookup to the
/// entity's own parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AltScope {
    /// Site data only
    Site,
    /// The full transitive alt-parent chain
    All,
    /// As `All`, collapsed to `Site` at the site root
    Select,
}

impl AltScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AltScope::Site => "site",
            AltScope::All => "all",
            AltScope::Select => "select",
        }
    }

    /// Parse a scope name from a request parameter
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "site" => Some(AltScope::Site),
            "all" => Some(AltScope::All),
            "select" => Some(AltScope::Select),
            _ => None,
        }
    }
}

impl fmt::Display for AltScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Entity Kinds
// ============================================================================

/// Entity class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Collection,
    Type,
    List,
    View,
    Field,
    Group,
    User,
    Vocab,
    /// Enumerated values; the type id names the enumeration
    Enum,
    /// Records of a user-defined type
    Data,
}

impl EntityKind {
    /// Fixed type id for built-in metadata kinds
    pub fn builtin_type_id(&self) -> Option<&'static str> {
        match self {
            EntityKind::Collection => Some("_coll"),
            EntityKind::Type => Some("_type"),
            EntityKind::List => Some("_list"),
            EntityKind::View => Some("_view"),
            EntityKind::Field => Some("_field"),
            EntityKind::Group => Some("_group"),
            EntityKind::User => Some("_user"),
            EntityKind::Vocab => Some("_vocab"),
            EntityKind::Enum | EntityKind::Data => None,
        }
    }

    /// Classify a type id
    pub fn for_type_id(type_id: &str) -> Self {
        match type_id {
            "_coll" => EntityKind::Collection,
            "_type" => EntityKind::Type,
            "_list" => EntityKind::List,
            "_view" => EntityKind::View,
            "_field" => EntityKind::Field,
            "_group" => EntityKind::Group,
            "_user" => EntityKind::User,
            "_vocab" => EntityKind::Vocab,
            t if t.starts_with("_enum_") => EntityKind::Enum,
            _ => EntityKind::Data,
        }
    }

    /// Structural metadata is guarded by CONFIG rather than the data scopes
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            EntityKind::Type
                | EntityKind::List
                | EntityKind::View
                | EntityKind::Field
                | EntityKind::Group
                | EntityKind::Enum
        )
    }

    /// Saving or removing this kind affects the collection context and caches
    pub fn affects_context(&self) -> bool {
        matches!(
            self,
            EntityKind::Type
                | EntityKind::View
                | EntityKind::Field
                | EntityKind::Group
                | EntityKind::Vocab
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
