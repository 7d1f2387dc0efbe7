//! # Annal Core
//!
//! Core types, traits, and error handling for the Annalist entity core.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: closed enumerations for render types, value modes,
//!   permissions, lookup scopes and entity kinds
//! - **Identifiers**: id validation and `type_id/entity_id` references
//! - **Vocabulary**: namespace URIs and CURIE property keys
//! - **Traits**: `Validatable` and typed access to entity values
//! - **Errors**: unified error handling with `AnnalError` and `AnnalResult`
//!

pub mod error;
pub mod identifiers;
pub mod traits;
pub mod types;
pub mod vocab;

// Re-export commonly used items at crate root
pub use error::{AnnalError, AnnalResult, ResultExt};
pub use identifiers::{
    DEFAULT_USER_ID, INITIAL_VALUES_ID, SITEDATA_ID, UNKNOWN_USER_ID, UNKNOWN_USER_URI, check_id,
    extract_entity_id, is_builtin_id, make_type_entity_id, split_type_entity_id, valid_id,
};
pub use traits::{EntityValues, Validatable, ValuesExt};
pub use types::{AltScope, EntityKind, Permission, RenderType, ValueMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
