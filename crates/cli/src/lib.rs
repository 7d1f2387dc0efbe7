//! # Annalist manager
//!
//! Command-line management of an Annalist site.
//!
//! ## Commands
//!
//! - `initialize-site` - Create the site directory and built-in site data
//! - `update-site-data` - Rewrite the built-in site data in place
//! - `create-collection` / `delete-collection` / `list-collections`
//! - `regenerate-context` - Rewrite a collection's JSON-LD context
//! - `create-user` - Grant a user permissions in a collection
//! - `migrate-collection` - Rewrite collection records in the current format
//!
//! Exit codes: 0 success, 2 usage, 3 not found, 4 conflict, 5 permission,
//! 1 anything else.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use annal_core::{AnnalError, Permission};
use annal_models::SiteSettings;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

pub mod commands;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "annalist.toml";

#[derive(Debug, Parser)]
#[command(name = "annalist-manager", version = VERSION)]
#[command(about = "Manage an Annalist site and its collections")]
pub struct Cli {
    /// Settings file
    #[arg(short, long, global = true, env = "ANNALIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Site base directory (overrides the settings file)
    #[arg(long, global = true, env = "ANNALIST_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Site base URL (overrides the settings file)
    #[arg(long, global = true, env = "ANNALIST_BASE_URL")]
    pub base_url: Option<String>,

    /// Log filter, e.g. `debug` or `annal_models=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the site directory and built-in site data
    InitializeSite,

    /// Rewrite the built-in site data, keeping user collections
    UpdateSiteData,

    /// Create a new collection
    CreateCollection {
        coll_id: String,

        /// Collection label (defaults to the id)
        #[arg(long)]
        label: Option<String>,

        /// Collections to inherit definitions from, in precedence order
        #[arg(long = "parent")]
        parents: Vec<String>,
    },

    /// Delete a collection and everything in it
    DeleteCollection { coll_id: String },

    /// List collection ids
    ListCollections,

    /// Rewrite a collection's JSON-LD context file
    RegenerateContext { coll_id: String },

    /// Create a user permissions record in a collection
    CreateUser {
        coll_id: String,
        user_id: String,
        user_uri: String,

        /// Permission tokens, e.g. VIEW CREATE UPDATE
        #[arg(required = true, value_parser = parse_permission)]
        permissions: Vec<Permission>,

        /// Replace an existing record
        #[arg(long)]
        force: bool,
    },

    /// Rewrite stored records of a collection in the current format
    MigrateCollection { coll_id: String },
}

fn parse_permission(s: &str) -> Result<Permission, String> {
    Permission::from_token(&s.to_ascii_uppercase()).ok_or_else(|| {
        let tokens: Vec<&str> = Permission::all().iter().map(|p| p.token()).collect();
        format!("unknown permission '{}' (expected one of {})", s, tokens.join(", "))
    })
}

impl Cli {
    /// Settings from `--config`, then `./annalist.toml`, then defaults,
    /// with command-line overrides applied
    pub fn settings(&self) -> anyhow::Result<SiteSettings> {
        let mut settings = match &self.config {
            Some(path) => SiteSettings::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                SiteSettings::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => SiteSettings::default(),
        };
        if let Some(base_dir) = &self.base_dir {
            settings.base_dir = base_dir.clone();
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        Ok(settings)
    }

    /// Log filter: `--log-level`, then `RUST_LOG`, then the settings file
    pub fn env_filter(&self, settings: &SiteSettings) -> EnvFilter {
        if let Some(level) = &self.log_level {
            return EnvFilter::new(level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
    }
}

/// Install a stderr log subscriber
pub fn init_logging(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit code for a failed command
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<AnnalError>() {
        Some(e) => u8::try_from(e.exit_code()).unwrap_or(1),
        None => 1,
    }
}

/// Run a parsed command line: load settings, start logging, execute
pub fn run(cli: Cli) -> ExitCode {
    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => return report(&e),
    };
    init_logging(cli.env_filter(&settings));
    match commands::execute(&cli.command, &settings) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn report(error: &anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", "error:".red().bold(), error);
    ExitCode::from(exit_code(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_create_user() {
        let cli = Cli::try_parse_from([
            "annalist-manager",
            "create-user",
            "testcoll",
            "alice",
            "mailto:alice@example.org",
            "view",
            "CREATE",
        ])
        .unwrap();
        match cli.command {
            Command::CreateUser { permissions, force, .. } => {
                assert_eq!(permissions, vec![Permission::View, Permission::Create]);
                assert!(!force);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_permission_is_usage_error() {
        let err = Cli::try_parse_from(["annalist-manager", "create-user", "c", "u", "mailto:u@x", "FLY"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_overrides_apply_to_settings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("site.toml");
        std::fs::write(&config, "base_url = \"http://example.org/annalist/\"\nsite_label = \"Mine\"\n").unwrap();
        let cli = Cli::try_parse_from([
            "annalist-manager",
            "--config",
            config.to_str().unwrap(),
            "--base-dir",
            "/srv/annalist",
            "list-collections",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.base_dir, PathBuf::from("/srv/annalist"));
        assert_eq!(settings.base_url, "http://example.org/annalist/");
        assert_eq!(settings.site_label, "Mine");
    }

    #[test]
    fn test_exit_codes() {
        let not_found = anyhow::Error::from(AnnalError::CollectionNotFound("x".into()));
        let conflict = anyhow::Error::from(AnnalError::CollectionExists("x".into()));
        assert_eq!(exit_code(&not_found), 3);
        assert_eq!(exit_code(&conflict), 4);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
