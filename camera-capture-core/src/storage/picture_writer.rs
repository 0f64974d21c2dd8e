use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::models::error::RuntimeFailure;
use crate::traits::picture_callback::BitmapCallback;

/// JPEG quality used when persisting captured pictures.
pub const CAPTURE_JPEG_QUALITY: u8 = 100;

/// Encode `bitmap` as JPEG into `path`, replacing any existing file.
pub fn save_jpeg(bitmap: &DynamicImage, path: &Path, quality: u8) -> Result<(), RuntimeFailure> {
    let file = File::create(path).map_err(|e| {
        RuntimeFailure::Storage(format!("failed to create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);

    // JPEG has no alpha channel.
    let rgb = bitmap.to_rgb8();
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(&rgb)
        .map_err(|e| RuntimeFailure::Storage(format!("failed to encode JPEG: {}", e)))?;

    writer.flush().map_err(|e| {
        RuntimeFailure::Storage(format!("failed to write {}: {}", path.display(), e))
    })?;
    Ok(())
}

/// Wrap `inner` so a delivered bitmap is written to `path` first.
///
/// Write failures are logged; `inner` (if any) is still invoked with the
/// bitmap. Nothing is written for a `None` delivery.
pub fn with_file_write(path: PathBuf, inner: Option<BitmapCallback>) -> BitmapCallback {
    Box::new(move |bitmap: Option<DynamicImage>| {
        if let Some(ref bmp) = bitmap {
            match save_jpeg(bmp, &path, CAPTURE_JPEG_QUALITY) {
                Ok(()) => log::debug!("Saved picture to {}", path.display()),
                Err(e) => log::error!("Failed to save picture: {}", e),
            }
        }
        if let Some(inner) = inner {
            inner(bitmap);
        }
    })
}
