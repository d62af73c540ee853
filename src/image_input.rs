use anyhow::Context;
use image::DynamicImage;
use std::path::Path;

use crate::error::AnalyzeError;

/// Check if a file is a supported image format
/// Supports: jpg, jpeg, png, webp, bmp, tiff, tif
pub fn is_supported_image_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext_lower = ext.to_string_lossy().to_lowercase();
        matches!(
            ext_lower.as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "tiff" | "tif"
        )
    } else {
        false
    }
}

/// Decode an uploaded image and convert it to RGB.
///
/// Missing or non-image files are bad input; decode failures are internal.
pub fn load_uploaded_image(path: &Path) -> Result<DynamicImage, AnalyzeError> {
    if !path.is_file() {
        return Err(AnalyzeError::bad_input(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    if !is_supported_image_file(path) {
        return Err(AnalyzeError::bad_input("File must be an image"));
    }

    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    log::debug!(
        "Loaded upload {}: {}x{}",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}
