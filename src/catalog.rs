//! Media catalog access: item model, filters, and the filesystem reader

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Opaque, stable reference to a media item. Resolvable by both the
/// catalog and the deletion authority; item identity is its locator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(raw: impl Into<String>) -> Self {
        Locator(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Locator(raw.to_string())
    }
}

impl From<&Path> for Locator {
    fn from(path: &Path) -> Self {
        Locator(path.to_string_lossy().into_owned())
    }
}

/// Filter over the catalog's contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaFilter {
    #[default]
    All,
    Images,
    Videos,
}

impl MediaFilter {
    /// Stable discriminant used in the persisted snapshot
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFilter::All => "all",
            MediaFilter::Images => "images",
            MediaFilter::Videos => "videos",
        }
    }

    /// Unknown discriminants fall back to All rather than failing restore
    pub fn from_str(raw: &str) -> Self {
        match raw {
            "images" => MediaFilter::Images,
            "videos" => MediaFilter::Videos,
            _ => MediaFilter::All,
        }
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        match self {
            MediaFilter::All => true,
            MediaFilter::Images => !item.is_video,
            MediaFilter::Videos => item.is_video,
        }
    }

    /// Cycle order used by the filter key in the UI
    pub fn next(&self) -> Self {
        match self {
            MediaFilter::All => MediaFilter::Images,
            MediaFilter::Images => MediaFilter::Videos,
            MediaFilter::Videos => MediaFilter::All,
        }
    }
}

/// One library entry. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub id: String,
    pub locator: Locator,
    pub mime_type: String,
    pub is_video: bool,
    /// Capture time; synthesized from `added_at` when the source has none
    pub taken_at: DateTime<Utc>,
    /// Time the item entered the library; sort tie-break
    pub added_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl MediaItem {
    /// Resolves `is_video` with the fallback chain: explicit flag,
    /// then mime prefix, then extension probe on the locator.
    pub fn resolve_is_video(explicit: Option<bool>, mime_type: &str, locator: &Locator) -> bool {
        if let Some(flag) = explicit {
            return flag;
        }
        if mime_type.starts_with("video/") {
            return true;
        }
        if mime_type.starts_with("image/") {
            return false;
        }
        Path::new(locator.as_str())
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Builds an item from filesystem metadata. `taken_at` is approximated
    /// by the modification time; `added_at` prefers the creation time.
    pub fn from_path(path: &Path) -> std::io::Result<Option<Self>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let mime_type = match mime_from_extension(&extension) {
            Some(mime) => mime.to_string(),
            None => return Ok(None),
        };

        let metadata = fs::metadata(path)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        let added_at: DateTime<Utc> = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified);

        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let locator = Locator::from(path);
        let is_video = Self::resolve_is_video(None, &mime_type, &locator);

        Ok(Some(MediaItem {
            id,
            locator,
            mime_type,
            is_video,
            taken_at: modified,
            added_at,
            size_bytes: metadata.len(),
        }))
    }
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "heic", "heif", "tiff", "tif", "dng", "raw",
];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v", "3gp", "mts"];

/// Maps a lowercase extension to a mime type; None means "not media"
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "heic" | "heif" => Some("image/heic"),
        "tiff" | "tif" => Some("image/tiff"),
        "dng" | "raw" => Some("image/x-adobe-dng"),
        "mp4" | "m4v" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "mkv" => Some("video/x-matroska"),
        "avi" => Some("video/x-msvideo"),
        "webm" => Some("video/webm"),
        "3gp" => Some("video/3gpp"),
        "mts" => Some("video/mp2t"),
        _ => None,
    }
}

/// Read-only view of the media source. Idempotent: `query` may be called
/// any number of times and reflects the source's contents at call time.
pub trait CatalogReader {
    fn query(&self, filter: MediaFilter) -> Result<Vec<MediaItem>>;
}

/// Filesystem-backed catalog scanning a single directory, non-recursive
#[derive(Debug, Clone)]
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CatalogReader for FsCatalog {
    fn query(&self, filter: MediaFilter) -> Result<Vec<MediaItem>> {
        let mut items = Vec::new();

        for entry_result in fs::read_dir(&self.root)? {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();

            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if file_name.starts_with('.') {
                continue;
            }

            match fs::metadata(&path) {
                Ok(m) if m.is_dir() => continue,
                Ok(_) => {}
                Err(_) => continue,
            }

            let item = match MediaItem::from_path(&path) {
                Ok(Some(item)) => item,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            if filter.matches(&item) {
                items.push(item);
            }
        }

        // Newest first: taken time descending, added time as tie-break
        items.sort_by(|a, b| {
            b.taken_at
                .cmp(&a.taken_at)
                .then(b.added_at.cmp(&a.added_at))
        });

        Ok(items)
    }
}
