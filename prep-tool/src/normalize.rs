use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::error::{PrepError, Result};

/// Resampling filter used for every resize
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Size an image must be scaled to so that it covers an S×S square.
///
/// The shorter side becomes exactly `target`, the longer side keeps the
/// aspect ratio (rounded to the nearest pixel).
pub fn cover_dimensions(width: u32, height: u32, target: u32) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(PrepError::EmptyImage);
    }
    if target == 0 {
        return Err(PrepError::InvalidSize);
    }

    let aspect = width as f64 / height as f64;
    let dims = if aspect >= 1.0 {
        ((target as f64 * aspect).round() as u32, target)
    } else {
        (target, (target as f64 / aspect).round() as u32)
    };

    Ok((dims.0.max(target), dims.1.max(target)))
}

/// Scale to cover and center-crop to exactly `target`×`target`.
///
/// Never letterboxes: the crop always discards overflow on the long axis.
pub fn normalize_square(image: &RgbImage, target: u32) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    let (scaled_w, scaled_h) = cover_dimensions(width, height, target)?;

    log::info!(
        "Resizing {}x{} -> {}x{}, cropping to {}x{}",
        width,
        height,
        scaled_w,
        scaled_h,
        target,
        target
    );

    let scaled = if (scaled_w, scaled_h) == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, scaled_w, scaled_h, RESIZE_FILTER)
    };

    let left = (scaled_w - target) / 2;
    let top = (scaled_h - target) / 2;
    Ok(imageops::crop_imm(&scaled, left, top, target, target).to_image())
}

/// Resize straight to `target`×`target`, ignoring aspect ratio.
///
/// Used by batch conversion for inputs that should already be square.
pub fn resize_exact(image: &RgbImage, target: u32) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PrepError::EmptyImage);
    }
    if target == 0 {
        return Err(PrepError::InvalidSize);
    }
    Ok(imageops::resize(image, target, target, RESIZE_FILTER))
}
