use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::models::error::RuntimeFailure;

/// Kind of media file produced by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Picture,
    Video,
}

impl MediaKind {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Picture => "IMG",
            Self::Video => "VID",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Picture => "jpg",
            Self::Video => "mp4",
        }
    }
}

/// Timestamped file name such as `IMG_20240203_101530.jpg`.
pub fn media_file_name(kind: MediaKind, at: DateTime<Local>) -> String {
    format!("{}_{}.{}", kind.prefix(), at.format("%Y%m%d_%H%M%S"), kind.extension())
}

/// `media_file_name` for the current time, inside `dir`.
pub fn media_path(dir: &Path, kind: MediaKind) -> PathBuf {
    dir.join(media_file_name(kind, Local::now()))
}

/// Whether a recording may be written to `path`: it must not exist yet, or
/// exist and be writable.
pub fn is_writable_target(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => !meta.permissions().readonly(),
        Err(_) => true,
    }
}

/// Copy `source` to `dest`, returning the number of bytes copied.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64, RuntimeFailure> {
    fs::copy(source, dest).map_err(|e| {
        RuntimeFailure::Storage(format!(
            "failed to copy {} to {}: {}",
            source.display(),
            dest.display(),
            e
        ))
    })
}
