//! Command execution

use anyhow::Context;
use annal_core::vocab::{annal, rdfs};
use annal_core::{AnnalError, EntityValues, SITEDATA_ID};
use annal_models::{Collection, Site, SiteSettings, UserPermissions};
use colored::Colorize;
use serde_json::Value;
use tracing::info;

use crate::Command;

/// Execute one command, returning the text to print on success
pub fn execute(command: &Command, settings: &SiteSettings) -> anyhow::Result<String> {
    let site = Site::from_settings(settings)
        .with_context(|| format!("opening site at {}", settings.base_dir.display()))?;

    match command {
        Command::InitializeSite => {
            if site.is_initialized() {
                return Err(AnnalError::CollectionExists(SITEDATA_ID.to_string()).into());
            }
            site.initialize_with(settings)?;
            Ok(format!(
                "{} site at {}",
                "Initialized".green(),
                settings.base_dir.display()
            ))
        }
        Command::UpdateSiteData => {
            site.update_site_data(settings)?;
            Ok(format!("{} site data", "Updated".green()))
        }
        Command::CreateCollection { coll_id, label, parents } => {
            require_site(&site)?;
            let mut values = EntityValues::new();
            if let Some(label) = label {
                values.insert(rdfs::LABEL.to_string(), Value::from(label.as_str()));
            }
            if !parents.is_empty() {
                for parent in parents {
                    site.require_collection(parent)?;
                }
                let refs: Vec<Value> = parents.iter().map(|p| Value::from(p.as_str())).collect();
                values.insert(annal::INHERIT_FROM.to_string(), Value::Array(refs));
            }
            let coll = site.create_collection(coll_id, values)?;
            Ok(format!("{} collection {}", "Created".green(), coll.id()))
        }
        Command::DeleteCollection { coll_id } => {
            site.remove_collection(coll_id)?;
            Ok(format!("{} collection {}", "Deleted".green(), coll_id))
        }
        Command::ListCollections => {
            require_site(&site)?;
            Ok(site.collection_ids()?.join("\n"))
        }
        Command::RegenerateContext { coll_id } => {
            let coll = site.require_collection(coll_id)?;
            coll.regenerate_context()?;
            Ok(format!(
                "{} {}",
                "Wrote".green(),
                coll.context_path().display()
            ))
        }
        Command::CreateUser {
            coll_id,
            user_id,
            user_uri,
            permissions,
            force,
        } => {
            let coll = site.require_collection(coll_id)?;
            create_user(&coll, user_id, user_uri, permissions, *force)?;
            let tokens: Vec<&str> = permissions.iter().map(|p| p.token()).collect();
            Ok(format!(
                "{} user {} in {} with {}",
                "Created".green(),
                user_id,
                coll_id,
                tokens.join(" ")
            ))
        }
        Command::MigrateCollection { coll_id } => {
            let coll = site.require_collection(coll_id)?;
            let count = coll.migrate()?;
            Ok(format!("{} {} records in {}", "Migrated".green(), count, coll_id))
        }
    }
}

fn require_site(site: &Site) -> anyhow::Result<()> {
    if site.is_initialized() {
        Ok(())
    } else {
        Err(AnnalError::CollectionNotFound(SITEDATA_ID.to_string()))
            .context("site is not initialized; run initialize-site first")
    }
}

fn create_user(
    coll: &Collection,
    user_id: &str,
    user_uri: &str,
    permissions: &[annal_core::Permission],
    force: bool,
) -> anyhow::Result<()> {
    let label = format!("User {}", user_id);
    let comment = format!("Permissions for {} in collection {}", user_uri, coll.id());
    let values = UserPermissions::values(&label, &comment, user_uri, permissions).build();
    if coll.entity_exists("_user", user_id) {
        if !force {
            return Err(AnnalError::exists("_user", user_id).into());
        }
        coll.update_entity("_user", user_id, values)?;
    } else {
        coll.create_entity("_user", user_id, values)?;
    }
    info!(coll_id = coll.id(), user_id, user_uri, "wrote user permissions");
    Ok(())
}
