//! Solid-color border detection.
//!
//! Each edge is scanned inward on its own. A line (row or column) counts as
//! border while every pixel on it lies within the threshold, measured as
//! Euclidean RGB distance, of the line's mean color.

use image::{imageops, Rgb, RgbImage};

use crate::error::{PrepError, Result};

/// Border thickness on each edge, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderSpec {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl BorderSpec {
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// True when no edge has a border
    pub fn is_empty(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }

    /// Region left after removing the border as `(x, y, width, height)`, or
    /// `None` when the bands meet and nothing would remain.
    pub fn content_rect(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let horizontal = self.left.checked_add(self.right)?;
        let vertical = self.top.checked_add(self.bottom)?;
        if horizontal >= width || vertical >= height {
            return None;
        }
        Some((self.left, self.top, width - horizontal, height - vertical))
    }
}

/// Measure the uniform bands on all four edges
pub fn detect_border(image: &RgbImage, threshold: u8) -> Result<BorderSpec> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PrepError::EmptyImage);
    }

    let row = |y: u32| is_uniform((0..width).map(move |x| image.get_pixel(x, y)), threshold);
    let col = |x: u32| is_uniform((0..height).map(move |y| image.get_pixel(x, y)), threshold);

    let top = (0..height).take_while(|&y| row(y)).count() as u32;
    let bottom = (0..height).rev().take_while(|&y| row(y)).count() as u32;
    let left = (0..width).take_while(|&x| col(x)).count() as u32;
    let right = (0..width).rev().take_while(|&x| col(x)).count() as u32;

    Ok(BorderSpec::new(top, bottom, left, right))
}

/// Detect and crop the border, returning the cropped copy and what was removed.
///
/// An image that is uniform end to end would crop to nothing; it is returned
/// unchanged together with the detected border.
pub fn trim_border(image: &RgbImage, threshold: u8) -> Result<(RgbImage, BorderSpec)> {
    let border = detect_border(image, threshold)?;

    if border.is_empty() {
        log::info!("No borders detected");
        return Ok((image.clone(), border));
    }

    log::info!(
        "Detected borders: top={}px, bottom={}px, left={}px, right={}px",
        border.top,
        border.bottom,
        border.left,
        border.right
    );

    let (width, height) = image.dimensions();
    match border.content_rect(width, height) {
        Some((x, y, w, h)) => Ok((imageops::crop_imm(image, x, y, w, h).to_image(), border)),
        None => {
            log::warn!("Image is a single solid color, keeping it uncropped");
            Ok((image.clone(), border))
        }
    }
}

fn is_uniform<'a, I>(pixels: I, threshold: u8) -> bool
where
    I: Iterator<Item = &'a Rgb<u8>> + Clone,
{
    let mut sum = [0f64; 3];
    let mut count = 0usize;
    for Rgb(p) in pixels.clone() {
        for c in 0..3 {
            sum[c] += p[c] as f64;
        }
        count += 1;
    }
    if count == 0 {
        return false;
    }

    let mean = sum.map(|s| s / count as f64);
    let limit = threshold as f64 * threshold as f64;

    pixels.into_iter().all(|Rgb(p)| {
        let distance: f64 = (0..3).map(|c| (p[c] as f64 - mean[c]).powi(2)).sum();
        distance < limit
    })
}
