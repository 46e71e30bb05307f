//! Object storage path rules and file naming.
//!
//! Wallpaper originals live under a single storage root. Paths stored in
//! `wallpapers.storage_path` are relative, slash-separated and restricted to
//! a URL-safe character set so they can be embedded in signed URLs verbatim.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Maximum length of a relative storage path.
pub const MAX_OBJECT_PATH_LEN: usize = 512;

/// Maximum length of a download filename carried in a signed URL.
pub const MAX_DOWNLOAD_FILENAME_LEN: usize = 255;

/// Extension used when the storage path has none.
const DEFAULT_EXTENSION: &str = "jpg";

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/')
}

/// Validate a relative object path.
///
/// Rejects empty and absolute paths, empty / `.` / `..` segments, and any
/// character outside `[A-Za-z0-9._/-]`.
pub fn validate_object_path(path: &str) -> Result<(), CoreError> {
    if path.is_empty() {
        return Err(CoreError::Validation("Storage path must not be empty".into()));
    }
    if path.len() > MAX_OBJECT_PATH_LEN {
        return Err(CoreError::Validation(format!(
            "Storage path must be at most {MAX_OBJECT_PATH_LEN} characters"
        )));
    }
    if let Some(bad) = path.chars().find(|c| !is_allowed_char(*c)) {
        return Err(CoreError::Validation(format!(
            "Storage path contains invalid character '{bad}'"
        )));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(CoreError::Validation(
            "Storage path must be relative and must not contain empty, '.' or '..' segments"
                .into(),
        ));
    }
    Ok(())
}

/// Join a validated relative path onto the storage root.
pub fn resolve_object_path(root: &Path, relative: &str) -> Result<PathBuf, CoreError> {
    validate_object_path(relative)?;
    Ok(relative.split('/').fold(root.to_path_buf(), |acc, seg| acc.join(seg)))
}

/// Lowercased file extension of a storage path, if any.
pub fn extension_of(path: &str) -> Option<String> {
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Name offered to the browser for a downloaded wallpaper:
/// `{slug}-{width}x{height}.{ext}`.
pub fn download_filename(slug: &str, width: i32, height: i32, storage_path: &str) -> String {
    let ext = extension_of(storage_path).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{slug}-{width}x{height}.{ext}")
}

/// Validate a filename offered in `Content-Disposition`: a single segment of
/// `[A-Za-z0-9._-]` that does not start with a dot.
pub fn validate_download_filename(filename: &str) -> Result<(), CoreError> {
    let well_formed = !filename.is_empty()
        && filename.len() <= MAX_DOWNLOAD_FILENAME_LEN
        && !filename.starts_with('.')
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if well_formed {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid download filename '{filename}'"
        )))
    }
}

/// MIME type for an image path, by extension.
pub fn content_type_for_path(path: &str) -> &'static str {
    match extension_of(path).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}
