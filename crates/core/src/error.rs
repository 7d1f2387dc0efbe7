//! Error types for the Annalist entity core
//!
//! This module provides unified error handling across the storage, rendering
//! and request layers, including identifier errors, not-found conditions,
//! permission denials, storage failures and malformed metadata.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the Annalist entity core
#[derive(Debug, Error)]
pub enum AnnalError {
    // ========================================================================
    // Identifier Errors
    // ========================================================================
    /// Caller supplied a syntactically bad identifier
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Identifier is reserved for built-in use
    #[error("Reserved identifier: '{0}'")]
    ReservedIdentifier(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Entity not found after all alt-parents were consulted
    #[error("Entity not found: {type_id}/{entity_id}")]
    EntityNotFound { type_id: String, entity_id: String },

    /// Collection not found
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Attachment file not present beside its entity
    #[error("Attachment not found: {0}")]
    AttachmentNotFound(PathBuf),

    /// No route for the requested path
    #[error("Resource not found: {0}")]
    RouteNotFound(String),

    // ========================================================================
    // Conflict Errors
    // ========================================================================
    /// Entity already exists
    #[error("Entity already exists: {type_id}/{entity_id}")]
    EntityExists { type_id: String, entity_id: String },

    /// Collection already exists
    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    // ========================================================================
    // Target Resolution Errors
    // ========================================================================
    /// A reference field holds no usable id
    #[error("Target id not found for field '{0}'")]
    TargetIdNotFound(String),

    /// A reference id resolves to no entity
    #[error("Target entity not found: {type_id}/{entity_id}")]
    TargetEntityNotFound { type_id: String, entity_id: String },

    // ========================================================================
    // Structural Errors
    // ========================================================================
    /// A field group refers back to a field already being expanded
    #[error("Recursive field group reference: '{0}'")]
    RecursiveFieldGroup(String),

    /// A supertype declaration would close a cycle
    #[error("Supertype cycle introduced by '{0}'")]
    SupertypeCycle(String),

    /// Malformed metadata
    #[error("Unexpected value: {0}")]
    UnexpectedValue(String),

    // ========================================================================
    // Permission Errors
    // ========================================================================
    /// Anonymous caller lacks the required scope
    #[error("Authentication required for {scope}")]
    Unauthenticated { scope: String },

    /// Authenticated caller lacks the required scope
    #[error("User '{user_id}' is not permitted {scope}")]
    Forbidden { user_id: String, scope: String },

    // ========================================================================
    // Storage Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    /// Directory removal failed
    #[error("Failed to remove directory '{path}': {message}")]
    DirectoryRemove { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored body could not be parsed
    #[error("Invalid entity body '{path}': {message}")]
    InvalidBody { path: PathBuf, message: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Request could not be interpreted
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl AnnalError {
    /// Create an invalid identifier error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        AnnalError::InvalidIdentifier(id.into())
    }

    /// Create an entity-not-found error
    pub fn not_found(type_id: impl Into<String>, entity_id: impl Into<String>) -> Self {
        AnnalError::EntityNotFound {
            type_id: type_id.into(),
            entity_id: entity_id.into(),
        }
    }

    /// Create an entity-exists error
    pub fn exists(type_id: impl Into<String>, entity_id: impl Into<String>) -> Self {
        AnnalError::EntityExists {
            type_id: type_id.into(),
            entity_id: entity_id.into(),
        }
    }

    /// Create an unexpected value error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        AnnalError::UnexpectedValue(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AnnalError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        AnnalError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AnnalError::EntityNotFound { .. }
                | AnnalError::CollectionNotFound(_)
                | AnnalError::AttachmentNotFound(_)
                | AnnalError::RouteNotFound(_)
        )
    }

    /// Check if this error is a conflict with existing data
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AnnalError::EntityExists { .. } | AnnalError::CollectionExists(_)
        )
    }

    /// Check if this error is a permission denial
    pub fn is_permission(&self) -> bool {
        matches!(
            self,
            AnnalError::Unauthenticated { .. } | AnnalError::Forbidden { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            AnnalError::Io(_)
                | AnnalError::FileRead { .. }
                | AnnalError::FileWrite { .. }
                | AnnalError::DirectoryCreate { .. }
                | AnnalError::DirectoryRemove { .. }
        )
    }

    /// HTTP status the request adapter reports for this error
    pub fn http_status(&self) -> u16 {
        match self {
            AnnalError::InvalidIdentifier(_)
            | AnnalError::ReservedIdentifier(_)
            | AnnalError::BadRequest(_) => 400,
            AnnalError::Unauthenticated { .. } => 401,
            AnnalError::Forbidden { .. } => 403,
            e if e.is_not_found() => 404,
            e if e.is_conflict() => 409,
            _ => 500,
        }
    }

    /// Process exit code the management tool reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            e if e.is_not_found() => 3,
            e if e.is_conflict() => 4,
            e if e.is_permission() => 5,
            AnnalError::InvalidIdentifier(_) | AnnalError::ReservedIdentifier(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias using AnnalError
pub type AnnalResult<T> = Result<T, AnnalError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> AnnalResult<T>;
}

impl<T, E: Into<AnnalError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> AnnalResult<T> {
        self.map_err(|e| {
            let err: AnnalError = e.into();
            AnnalError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
