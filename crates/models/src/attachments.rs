//! Attachment files stored alongside entity bodies
//!
//! An attachment lives at `<entity_dir>/<name>.<ext>`, where the extension is
//! derived from its MIME type. Upload and import fields record the
//! attachment in the entity body as a small JSON object.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use annal_core::vocab::annal;
use annal_core::{AnnalError, AnnalResult};
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;
use walkdir::WalkDir;

use crate::entity::Entity;
use crate::resources;

/// Access mode for [`fileobj`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
}

/// A file submitted with a form, already parsed by the request layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name the client gave the file
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// File name of an attachment
pub fn attachment_name(name: &str, value_type: &str, mime: &str) -> String {
    format!("{}.{}", name, resources::extension_for(value_type, mime))
}

/// Path of an attachment file within an entity directory
pub fn attachment_path(entity: &Entity, name: &str, value_type: &str, mime: &str) -> PathBuf {
    entity.dir().join(attachment_name(name, value_type, mime))
}

/// Open an attachment; writing creates or truncates it
pub fn fileobj(entity: &Entity, name: &str, value_type: &str, mime: &str, mode: FileMode) -> AnnalResult<File> {
    let path = attachment_path(entity, name, value_type, mime);
    match mode {
        FileMode::Read => File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AnnalError::AttachmentNotFound(path.clone()),
            _ => AnnalError::FileRead {
                path: path.clone(),
                message: e.to_string(),
            },
        }),
        FileMode::Write => {
            std::fs::create_dir_all(entity.dir()).map_err(|e| AnnalError::DirectoryCreate {
                path: entity.dir().to_path_buf(),
                message: e.to_string(),
            })?;
            File::create(&path).map_err(|e| AnnalError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
            })
        }
    }
}

/// Read an attachment by its stored resource name
pub fn read_resource(entity: &Entity, resource_name: &str) -> AnnalResult<Vec<u8>> {
    if resource_name.is_empty()
        || resource_name.contains('/')
        || resource_name.contains('\\')
        || resource_name.starts_with('.')
    {
        return Err(AnnalError::BadRequest(format!(
            "invalid resource name '{}'",
            resource_name
        )));
    }
    let path = entity.dir().join(resource_name);
    if resource_name == entity.class().entityfile() || !path.is_file() {
        return Err(AnnalError::AttachmentNotFound(path));
    }
    std::fs::read(&path).map_err(|e| AnnalError::FileRead {
        path,
        message: e.to_string(),
    })
}

fn write_bytes(entity: &Entity, name: &str, value_type: &str, mime: &str, data: &[u8]) -> AnnalResult<String> {
    let resource_name = attachment_name(name, value_type, mime);
    let mut file = fileobj(entity, name, value_type, mime, FileMode::Write)?;
    file.write_all(data).map_err(|e| AnnalError::FileWrite {
        path: entity.dir().join(&resource_name),
        message: e.to_string(),
    })?;
    Ok(resource_name)
}

/// Store an uploaded file and record it under `property` in the entity values
pub fn save_upload(
    entity: &mut Entity,
    property: &str,
    name: &str,
    value_type: &str,
    upload: &UploadedFile,
) -> AnnalResult<Value> {
    let resource_name = write_bytes(entity, name, value_type, &upload.content_type, &upload.data)?;
    let record = json!({
        (annal::RESOURCE_NAME): resource_name,
        (annal::RESOURCE_TYPE): upload.content_type,
        (annal::UPLOAD_NAME): name,
        (annal::UPLOADED_SIZE): upload.data.len(),
        (annal::UPLOADED_FILE): upload.filename,
    });
    entity.set(property, record.clone());
    debug!(entity_id = entity.id(), property, resource_name = %record[annal::RESOURCE_NAME], "saved upload");
    Ok(record)
}

/// Fetch a resource from a URL, returning its bytes and content type
fn fetch(import_url: &str) -> AnnalResult<(Vec<u8>, String)> {
    let url = Url::parse(import_url)
        .map_err(|e| AnnalError::BadRequest(format!("import URL '{}': {}", import_url, e)))?;
    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| AnnalError::BadRequest(format!("import URL '{}'", import_url)))?;
            let mut data = Vec::new();
            File::open(&path)
                .and_then(|mut f| f.read_to_end(&mut data))
                .map_err(|e| AnnalError::FileRead {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            Ok((data, resources::mime_for_filename(&path.to_string_lossy()).to_string()))
        }
        "http" | "https" => {
            let response = reqwest::blocking::get(url.as_str())
                .and_then(|r| r.error_for_status())
                .map_err(|e| AnnalError::with_context(format!("import {}", import_url), e.to_string()))?;
            let mime = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
                .unwrap_or_else(|| resources::mime_for_filename(url.path()).to_string());
            let data = response
                .bytes()
                .map_err(|e| AnnalError::with_context(format!("import {}", import_url), e.to_string()))?;
            Ok((data.to_vec(), mime))
        }
        other => Err(AnnalError::BadRequest(format!(
            "unsupported import scheme '{}'",
            other
        ))),
    }
}

/// Import a resource into an attachment and record it in the entity values.
///
/// A failed import leaves the entity values untouched.
pub fn import_resource(
    entity: &mut Entity,
    property: &str,
    name: &str,
    value_type: &str,
    import_url: &str,
) -> AnnalResult<Value> {
    let (data, mime) = fetch(import_url)?;
    let resource_name = write_bytes(entity, name, value_type, &mime, &data)?;
    let record = json!({
        (annal::RESOURCE_NAME): resource_name,
        (annal::RESOURCE_TYPE): mime,
        (annal::IMPORT_URL): import_url,
    });
    entity.set(property, record.clone());
    info!(entity_id = entity.id(), import_url, "imported resource");
    Ok(record)
}

/// Delete the attachment files stored under a field name, whatever their
/// extension
pub fn remove_attachment(entity: &Entity, name: &str) -> AnnalResult<usize> {
    let mut removed = 0;
    if !entity.dir().is_dir() {
        return Ok(0);
    }
    for entry in WalkDir::new(entity.dir()).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| AnnalError::FileRead {
            path: entity.dir().to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        let stem = path.file_stem().and_then(|s| s.to_str());
        if !entry.file_type().is_file() || stem != Some(name) || path.ends_with(entity.class().entityfile()) {
            continue;
        }
        std::fs::remove_file(path).map_err(|e| AnnalError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        removed += 1;
    }
    debug!(entity_id = entity.id(), name, removed, "removed attachment");
    Ok(removed)
}

/// Remove the directory of an entity whose body was never written
pub fn discard_unsaved(entity: &Entity) -> AnnalResult<()> {
    if entity.body_path().is_file() || !entity.dir().is_dir() {
        return Ok(());
    }
    std::fs::remove_dir_all(entity.dir()).map_err(|e| AnnalError::DirectoryRemove {
        path: entity.dir().to_path_buf(),
        message: e.to_string(),
    })
}

/// Copy every attachment from one entity directory to another
pub fn copy_attachments(from: &Entity, to: &Entity) -> AnnalResult<usize> {
    let body = Path::new(from.class().entityfile());
    let mut copied = 0;
    for entry in WalkDir::new(from.dir()).min_depth(1) {
        let entry = entry.map_err(|e| AnnalError::FileRead {
            path: from.dir().to_path_buf(),
            message: e.to_string(),
        })?;
        let rel = entry
            .path()
            .strip_prefix(from.dir())
            .map_err(|e| AnnalError::internal(e.to_string()))?;
        if rel == body {
            continue;
        }
        let target = to.dir().join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| AnnalError::DirectoryCreate {
                path: target.clone(),
                message: e.to_string(),
            })?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| AnnalError::FileWrite {
                path: target.clone(),
                message: e.to_string(),
            })?;
            copied += 1;
        }
    }
    debug!(from = from.id(), to = to.id(), copied, "copied attachments");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;
    use annal_core::EntityValues;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Entity) {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path().join("site"), "http://test.example.com/testsite/").unwrap();
        let coll = site.create_collection("testcoll", EntityValues::new()).unwrap();
        let e = coll
            .create_entity("testtype", "e1", EntityValues::new())
            .unwrap();
        (tmp, e)
    }

    #[test]
    fn test_fileobj_write_then_read() {
        let (_tmp, e) = setup();
        let mut w = fileobj(&e, "img_field", annal::IMAGE, "image/jpeg", FileMode::Write).unwrap();
        w.write_all(b"jpeg-bytes").unwrap();
        drop(w);
        assert!(e.dir().join("img_field.jpg").is_file());
        let mut data = Vec::new();
        fileobj(&e, "img_field", annal::IMAGE, "image/jpeg", FileMode::Read)
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, b"jpeg-bytes");
    }

    #[test]
    fn test_read_missing_attachment() {
        let (_tmp, e) = setup();
        let err = fileobj(&e, "nothing", annal::IMAGE, "image/png", FileMode::Read).unwrap_err();
        assert!(err.is_not_found());
        assert!(read_resource(&e, "entity_data.jsonld").unwrap_err().is_not_found());
        assert!(read_resource(&e, "../x").is_err());
    }

    #[test]
    fn test_save_upload_records_resource() {
        let (_tmp, mut e) = setup();
        let upload = UploadedFile {
            filename: "test-image.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: b"abc".to_vec(),
        };
        let record = save_upload(&mut e, "test:image", "img_field", annal::IMAGE, &upload).unwrap();
        assert_eq!(
            record,
            json!({
                "resource_name": "img_field.jpg",
                "resource_type": "image/jpeg",
                "upload_name": "img_field",
                "uploaded_size": 3,
                "uploaded_file": "test-image.jpg",
            })
        );
        assert_eq!(e.get("test:image"), Some(&record));
        assert_eq!(read_resource(&e, "img_field.jpg").unwrap(), b"abc");
    }

    #[test]
    fn test_import_from_file_url() {
        let (tmp, mut e) = setup();
        let src = tmp.path().join("source.png");
        std::fs::write(&src, b"png-bytes").unwrap();
        let url = Url::from_file_path(&src).unwrap();
        let record = import_resource(&mut e, "test:import", "imp", "annal:Import", url.as_str()).unwrap();
        assert_eq!(record["resource_name"], json!("imp.png"));
        assert_eq!(record["import_url"], json!(url.as_str()));
        assert_eq!(read_resource(&e, "imp.png").unwrap(), b"png-bytes");
    }

    #[test]
    fn test_remove_attachment_by_name() {
        let (_tmp, e) = setup();
        std::fs::write(e.dir().join("imp.png"), b"old").unwrap();
        std::fs::write(e.dir().join("img_field.jpg"), b"keep").unwrap();
        assert_eq!(remove_attachment(&e, "imp").unwrap(), 1);
        assert!(!e.dir().join("imp.png").exists());
        assert!(e.dir().join("img_field.jpg").is_file());
        assert!(e.body_path().is_file());
    }

    #[test]
    fn test_discard_unsaved_keeps_stored_entities() {
        let (tmp, e) = setup();
        discard_unsaved(&e).unwrap();
        assert!(e.body_path().is_file());

        let site = Site::new(tmp.path().join("site"), "http://test.example.com/testsite/").unwrap();
        let coll = site.require_collection("testcoll").unwrap();
        let unsaved = coll.locate_entity("testtype", "e2").unwrap();
        std::fs::create_dir_all(unsaved.dir()).unwrap();
        std::fs::write(unsaved.dir().join("img_field.jpg"), b"partial").unwrap();
        discard_unsaved(&unsaved).unwrap();
        assert!(!unsaved.dir().exists());
    }

    #[test]
    fn test_failed_import_leaves_values() {
        let (_tmp, mut e) = setup();
        assert!(import_resource(&mut e, "test:import", "imp", "", "file:///no/such/file.png").is_err());
        assert!(e.get("test:import").is_none());
        assert!(import_resource(&mut e, "test:import", "imp", "", "ftp://x/y").is_err());
    }
}
