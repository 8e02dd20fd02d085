//! Cover image resolution.
//!
//! Images are stored on disk as `{file_id}{extension}` so a record can be
//! matched to its file without any index. The actual downloads belong to the
//! drive collaborator; this module decides what a file will be called and
//! which files still need fetching.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::CategoryMap;
use crate::error::{CalPageError, CalPageResult};
use crate::event::Event;

static DRIVE_FILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://drive\.google\.com/file/d/(?P<file_id>[^/?]+)")
        .expect("drive file url pattern")
});

/// File extension for an image mime type.
///
/// The table is explicit so a new mime type shows up as a hard error instead
/// of a file nothing references.
pub fn extension_for(mime_type: &str) -> CalPageResult<&'static str> {
    let extension = match mime_type {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        "image/heic" => ".heic",
        "image/avif" => ".avif",
        _ => return Err(CalPageError::UnknownMime(mime_type.to_string())),
    };
    Ok(extension)
}

/// Local filename for a drive file: `{file_id}{extension}`.
pub fn local_filename(file_id: &str, mime_type: &str) -> CalPageResult<String> {
    Ok(format!("{file_id}{}", extension_for(mime_type)?))
}

/// Extract the file id from a drive share link
/// (`https://drive.google.com/file/d/<id>/view?...`).
pub fn drive_file_id(url: &str) -> Option<&str> {
    DRIVE_FILE_URL
        .captures(url)
        .and_then(|caps| caps.name("file_id"))
        .map(|found| found.as_str())
}

/// One image the drive collaborator still needs to download.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFetch {
    pub file_id: String,
    /// Target filename. `None` for category covers, whose mime type is only
    /// known after the collaborator's metadata lookup.
    pub filename: Option<String>,
}

/// Directory of downloaded cover images.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ImageStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn local_path(&self, file_id: &str, mime_type: &str) -> CalPageResult<PathBuf> {
        Ok(self.dir.join(local_filename(file_id, mime_type)?))
    }

    /// Whether the file is already on disk. Checked before every fetch.
    pub fn is_resolved(&self, file_id: &str, mime_type: &str) -> CalPageResult<bool> {
        Ok(self.local_path(file_id, mime_type)?.exists())
    }

    /// Find an already-downloaded file for this id, whatever its extension.
    pub fn find_by_id(&self, file_id: &str) -> Option<String> {
        let entries = std::fs::read_dir(&self.dir).ok()?;
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .filter_map(|name| name.into_string().ok())
            .find(|name| {
                Path::new(name)
                    .file_stem()
                    .is_some_and(|stem| stem == file_id)
            })
    }

    /// Images referenced by the page that are not on disk yet, event covers
    /// first, deduplicated by file id. Attachments past the cover are never
    /// shown, so they are not fetched either.
    pub fn plan(&self, events: &[Event], categories: &CategoryMap) -> CalPageResult<Vec<ImageFetch>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut fetches = Vec::new();

        for event in events {
            let Some(cover) = event.cover_attachment() else {
                continue;
            };
            if !seen.insert(cover.file_id.clone()) {
                continue;
            }
            if self.is_resolved(&cover.file_id, &cover.mime_type)? {
                continue;
            }
            fetches.push(ImageFetch {
                file_id: cover.file_id.clone(),
                filename: Some(local_filename(&cover.file_id, &cover.mime_type)?),
            });
        }

        for category in categories.definitions() {
            let Some(file_id) = category.cover_file_id() else {
                continue;
            };
            if !seen.insert(file_id.to_string()) {
                continue;
            }
            if self.find_by_id(file_id).is_some() {
                continue;
            }
            fetches.push(ImageFetch {
                file_id: file_id.to_string(),
                filename: None,
            });
        }

        Ok(fetches)
    }
}
