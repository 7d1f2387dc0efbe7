//! Permissions required for each action on each kind of entity

use std::fmt;

use annal_core::{AnnalError, AnnalResult, EntityKind, Permission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    List,
    Search,
    New,
    Copy,
    Edit,
    Delete,
    Config,
    Admin,
}

impl Action {
    pub fn parse(s: &str) -> AnnalResult<Self> {
        Ok(match s {
            "view" => Action::View,
            "list" => Action::List,
            "search" => Action::Search,
            "new" => Action::New,
            "copy" => Action::Copy,
            "edit" => Action::Edit,
            "delete" => Action::Delete,
            "config" => Action::Config,
            "admin" => Action::Admin,
            other => return Err(AnnalError::BadRequest(format!("unknown action '{}'", other))),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::List => "list",
            Action::Search => "search",
            Action::New => "new",
            Action::Copy => "copy",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Config => "config",
            Action::Admin => "admin",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Action::View | Action::List | Action::Search)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission needed to perform an action on entities of a type
pub fn required_permission(type_id: &str, action: Action) -> Permission {
    let kind = EntityKind::for_type_id(type_id);
    if kind == EntityKind::User {
        return Permission::Admin;
    }
    if action.is_read() {
        return Permission::View;
    }
    if kind.is_config() {
        return Permission::Config;
    }
    match action {
        Action::New | Action::Copy => Permission::Create,
        Action::Edit => Permission::Update,
        Action::Delete => Permission::Delete,
        Action::Config => Permission::Config,
        Action::Admin => Permission::Admin,
        Action::View | Action::List | Action::Search => Permission::View,
    }
}

/// Site-level actions on collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteAction {
    CreateCollection,
    DeleteCollection,
}

impl SiteAction {
    pub fn required_permission(&self) -> Permission {
        match self {
            SiteAction::CreateCollection => Permission::CreateCollection,
            SiteAction::DeleteCollection => Permission::DeleteCollection,
        }
    }
}
