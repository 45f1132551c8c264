//! `embedded-graphics` drawing on top of an in-memory RGB image.
//!
//! Tile numbers and sample artwork are rendered with the same text and
//! primitive APIs used on the device, just targeting an `RgbImage` instead
//! of the panel.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::{Rgb, RgbImage};

/// Font used for tile numbers and sample captions
pub const LABEL_FONT: &MonoFont<'static> = &FONT_10X20;

/// Draw target writing into an `RgbImage`.
///
/// Coordinates are multiplied by `scale` and offset by `origin`, which lets
/// the small bitmap font be blown up for large tiles.
pub struct ImageCanvas<'a> {
    image: &'a mut RgbImage,
    origin: Point,
    scale: u32,
}

impl<'a> ImageCanvas<'a> {
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self::scaled(image, Point::zero(), 1)
    }

    pub fn scaled(image: &'a mut RgbImage, origin: Point, scale: u32) -> Self {
        Self {
            image,
            origin,
            scale: scale.max(1),
        }
    }

    fn fill_block(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        let (width, height) = self.image.dimensions();
        let scale = self.scale as i64;
        for by in y.max(0)..(y + scale).min(height as i64) {
            for bx in x.max(0)..(x + scale).min(width as i64) {
                self.image.put_pixel(bx as u32, by as u32, color);
            }
        }
    }
}

impl OriginDimensions for ImageCanvas<'_> {
    fn size(&self) -> Size {
        let (width, height) = self.image.dimensions();
        Size::new(width / self.scale, height / self.scale)
    }
}

impl DrawTarget for ImageCanvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i64;
        for Pixel(point, color) in pixels {
            let x = self.origin.x as i64 + point.x as i64 * scale;
            let y = self.origin.y as i64 + point.y as i64 * scale;
            self.fill_block(x, y, Rgb([color.r(), color.g(), color.b()]));
        }
        Ok(())
    }
}

/// Size of `text` in image pixels at the given scale
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let glyph = LABEL_FONT.character_size;
    let spacing = LABEL_FONT.character_spacing;
    let chars = text.chars().count() as u32;
    let width = chars * glyph.width + chars.saturating_sub(1) * spacing;
    (width * scale, glyph.height * scale)
}

/// Draw `text` centered in the square cell at `(x, y)` with side `size`,
/// white over a black outline so it stays readable on any background.
pub fn draw_outlined_label(image: &mut RgbImage, text: &str, x: u32, y: u32, size: u32, scale: u32) {
    let (text_w, text_h) = text_size(text, scale);
    let left = x as i32 + (size as i32 - text_w as i32) / 2;
    let top = y as i32 + (size as i32 - text_h as i32) / 2;
    let outline = scale as i32;

    for dy in [-outline, 0, outline] {
        for dx in [-outline, 0, outline] {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw_text(image, text, Point::new(left + dx, top + dy), scale, Rgb888::BLACK);
        }
    }
    draw_text(image, text, Point::new(left, top), scale, Rgb888::WHITE);
}

/// Draw `text` with its top-left corner at `origin`
pub fn draw_text(image: &mut RgbImage, text: &str, origin: Point, scale: u32, color: Rgb888) {
    let mut canvas = ImageCanvas::scaled(image, origin, scale);
    let style = MonoTextStyle::new(LABEL_FONT, color);
    if let Err(never) = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut canvas) {
        match never {}
    }
}
