//! Site settings
//!
//! Settings are read from a TOML file. Every key is optional:
//!
//! ```toml
//! base_dir = "annalist_site"
//! base_url = "http://localhost:8000/annalist/"
//! site_label = "Annalist site"
//! log_level = "info"
//! default_user_permissions = ["VIEW"]
//! unknown_user_permissions = ["VIEW"]
//! ```

use std::path::{Path, PathBuf};

use annal_core::{AnnalError, AnnalResult, Permission};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sitedata::default_permissions;

fn default_base_dir() -> PathBuf {
    PathBuf::from("annalist_site")
}

fn default_base_url() -> String {
    "http://localhost:8000/annalist/".to_string()
}

fn default_site_label() -> String {
    "Annalist site".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Directory holding the site data and collections
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// URL at which the site is served
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_site_label")]
    pub site_label: String,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Permissions written to `_default_user_perms`
    #[serde(default = "default_permissions")]
    pub default_user_permissions: Vec<Permission>,

    /// Permissions written to `_unknown_user_perms`
    #[serde(default = "default_permissions")]
    pub unknown_user_permissions: Vec<Permission>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            base_url: default_base_url(),
            site_label: default_site_label(),
            log_level: default_log_level(),
            default_user_permissions: default_permissions(),
            unknown_user_permissions: default_permissions(),
        }
    }
}

impl SiteSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> AnnalResult<Self> {
        toml::from_str(text).map_err(|e| AnnalError::InvalidConfig(e.to_string()))
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> AnnalResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnnalError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&text).map_err(|e| {
            AnnalError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Render settings as TOML
    pub fn to_toml_string(&self) -> AnnalResult<String> {
        toml::to_string_pretty(self).map_err(|e| AnnalError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_for_missing_keys() {
        let settings = SiteSettings::from_toml_str("site_label = \"Test site\"").unwrap();
        assert_eq!(settings.site_label, "Test site");
        assert_eq!(settings.base_dir, PathBuf::from("annalist_site"));
        assert_eq!(settings.default_user_permissions, vec![Permission::View]);
    }

    #[test]
    fn test_load_permissions_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("annalist.toml");
        std::fs::write(
            &path,
            "base_url = \"http://example.org/site/\"\ndefault_user_permissions = [\"VIEW\", \"CREATE\"]\n",
        )
        .unwrap();
        let settings = SiteSettings::load(&path).unwrap();
        assert_eq!(settings.base_url, "http://example.org/site/");
        assert_eq!(
            settings.default_user_permissions,
            vec![Permission::View, Permission::Create]
        );
    }

    #[test]
    fn test_invalid_settings() {
        let err = SiteSettings::from_toml_str("default_user_permissions = [\"FLY\"]").unwrap_err();
        assert!(matches!(err, AnnalError::InvalidConfig(_)));
        assert!(SiteSettings::load(Path::new("/no/such/annalist.toml")).is_err());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = SiteSettings::default().to_toml_string().unwrap();
        assert_eq!(SiteSettings::from_toml_str(&text).unwrap(), SiteSettings::default());
    }
}
