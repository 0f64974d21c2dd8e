//! Orientation helpers for captured bitmaps.

use std::path::Path;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};

use crate::models::config::Rotation;
use crate::models::error::RuntimeFailure;

/// Axis to mirror a bitmap across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAxis {
    /// Left and right trade places.
    Horizontal,
    /// Top and bottom trade places.
    Vertical,
}

/// Read the EXIF orientation tag of an image file.
pub fn read_orientation(path: &Path) -> Result<Orientation, RuntimeFailure> {
    let mut decoder = ImageReader::open(path)
        .map_err(|e| RuntimeFailure::Decode(format!("failed to open {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| RuntimeFailure::Decode(format!("failed to sniff {}: {}", path.display(), e)))?
        .into_decoder()
        .map_err(|e| {
            RuntimeFailure::Decode(format!("unsupported image {}: {}", path.display(), e))
        })?;

    decoder
        .orientation()
        .map_err(|e| RuntimeFailure::Decode(format!("failed to read orientation: {}", e)))
}

/// Clockwise rotation recorded in the file's EXIF data.
///
/// Unreadable files and files without EXIF count as upright. Mirrored
/// orientations cannot be expressed as a rotation and yield `None`.
pub fn exif_rotation(path: &Path) -> Option<Rotation> {
    let orientation = match read_orientation(path) {
        Ok(o) => o,
        Err(e) => {
            log::debug!("No usable EXIF orientation: {}", e);
            return Some(Rotation::Deg0);
        }
    };

    match orientation {
        Orientation::NoTransforms => Some(Rotation::Deg0),
        Orientation::Rotate90 => Some(Rotation::Deg90),
        Orientation::Rotate180 => Some(Rotation::Deg180),
        Orientation::Rotate270 => Some(Rotation::Deg270),
        _ => None,
    }
}

/// Rotate `bitmap` upright according to the EXIF data of `path`.
pub fn rotate_from_exif(path: &Path, bitmap: DynamicImage) -> DynamicImage {
    rotate(exif_rotation(path).unwrap_or_default(), bitmap)
}

/// Rotate clockwise. `Deg0` hands the bitmap back untouched.
pub fn rotate(rotation: Rotation, bitmap: DynamicImage) -> DynamicImage {
    match rotation {
        Rotation::Deg0 => bitmap,
        Rotation::Deg90 => bitmap.rotate90(),
        Rotation::Deg180 => bitmap.rotate180(),
        Rotation::Deg270 => bitmap.rotate270(),
    }
}

pub fn mirror(bitmap: &DynamicImage, axis: MirrorAxis) -> DynamicImage {
    match axis {
        MirrorAxis::Horizontal => bitmap.fliph(),
        MirrorAxis::Vertical => bitmap.flipv(),
    }
}
