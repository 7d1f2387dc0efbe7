//! MIME types and file extensions for attachments

use annal_core::vocab::annal;

/// Fallback for unrecognised content
pub const DEFAULT_MIME: &str = "application/octet-stream";
pub const DEFAULT_EXT: &str = "dat";

const TEXT_TYPES: &[(&str, &str)] = &[("text/plain", "txt")];

const RICHTEXT_TYPES: &[(&str, &str)] = &[("text/markdown", "md"), ("text/plain", "txt")];

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpeg", "jpeg"),
    ("image/gif", "gif"),
    ("image/tiff", "tiff"),
    ("image/svg+xml", "svg"),
];

const AUDIO_TYPES: &[(&str, &str)] = &[
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "mp4"),
    ("audio/wav", "wav"),
    ("audio/ogg", "ogg"),
];

const ALL_TYPES: &[&[(&str, &str)]] = &[TEXT_TYPES, RICHTEXT_TYPES, IMAGE_TYPES, AUDIO_TYPES];

/// `(mime, ext)` pairs accepted for a field value type.
///
/// Upload, import and unrecognised value types accept the union of all
/// known types.
pub fn resource_types(value_type: &str) -> Vec<(&'static str, &'static str)> {
    let table: &[&[(&str, &str)]] = match value_type {
        annal::TEXT => &[TEXT_TYPES],
        annal::RICHTEXT => &[RICHTEXT_TYPES],
        annal::IMAGE => &[IMAGE_TYPES],
        annal::AUDIO => &[AUDIO_TYPES],
        _ => ALL_TYPES,
    };
    table.iter().flat_map(|t| t.iter().copied()).collect()
}

/// File extension for content of a MIME type stored under a value type
pub fn extension_for(value_type: &str, mime: &str) -> &'static str {
    let mime = mime.split(';').next().unwrap_or("").trim();
    resource_types(value_type)
        .into_iter()
        .chain(resource_types(""))
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| ext)
        .unwrap_or(DEFAULT_EXT)
}

/// MIME type for a file extension
pub fn mime_for_extension(ext: &str) -> &'static str {
    let ext = ext.to_ascii_lowercase();
    resource_types("")
        .into_iter()
        .find(|(_, e)| *e == ext)
        .map(|(mime, _)| mime)
        .unwrap_or(DEFAULT_MIME)
}

/// MIME type for a file name, from its extension
pub fn mime_for_filename(name: &str) -> &'static str {
    match name.rsplit_once('.') {
        Some((_, ext)) => mime_for_extension(ext),
        None => DEFAULT_MIME,
    }
}
