//! Synthetic test pictures for trying the pipeline without real photos.
//!
//! Each picture comes in a framed and an unframed variant so the border
//! trimmer has something to find.

use core::convert::Infallible;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Ellipse, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, Triangle,
};
use image::{Rgb, RgbImage};

use crate::canvas::{draw_text, text_size, ImageCanvas};
use crate::error::Result;
use crate::output::{ensure_dir, save_png};

/// Available sample pictures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Gradient,
    Pattern,
    Landscape,
}

impl SampleKind {
    pub const ALL: [SampleKind; 3] = [SampleKind::Gradient, SampleKind::Pattern, SampleKind::Landscape];

    pub fn name(self) -> &'static str {
        match self {
            SampleKind::Gradient => "gradient",
            SampleKind::Pattern => "pattern",
            SampleKind::Landscape => "landscape",
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            SampleKind::Gradient | SampleKind::Pattern => (800, 600),
            SampleKind::Landscape => (1000, 750),
        }
    }

    /// Frame width and color of the bordered variant
    pub fn frame(self) -> (u32, Rgb<u8>) {
        match self {
            SampleKind::Gradient => (50, Rgb([255, 255, 255])),
            SampleKind::Pattern => (40, Rgb([0, 0, 0])),
            SampleKind::Landscape => (60, Rgb([180, 180, 180])),
        }
    }
}

const SHAPE_COLORS: [Rgb888; 6] = [
    Rgb888::new(255, 100, 100),
    Rgb888::new(100, 255, 100),
    Rgb888::new(100, 100, 255),
    Rgb888::new(255, 255, 100),
    Rgb888::new(255, 100, 255),
    Rgb888::new(100, 255, 255),
];

/// Render one sample picture
pub fn render_sample(kind: SampleKind, with_border: bool) -> RgbImage {
    let (width, height) = kind.dimensions();
    let mut image = match kind {
        SampleKind::Gradient => gradient(width, height),
        SampleKind::Pattern => pattern(width, height),
        SampleKind::Landscape => landscape(width, height),
    };
    if with_border {
        let (frame, color) = kind.frame();
        add_frame(&mut image, frame, color);
    }
    image
}

/// Paint a solid frame of `width` pixels around the image
pub fn add_frame(image: &mut RgbImage, width: u32, color: Rgb<u8>) {
    let (w, h) = image.dimensions();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if x < width || y < width || x + width >= w || y + width >= h {
            *pixel = color;
        }
    }
}

/// Write every sample, framed and unframed, into `dir`
pub fn write_samples(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    let mut written = Vec::new();
    for kind in SampleKind::ALL {
        for (with_border, suffix) in [(true, "with_border"), (false, "no_border")] {
            let path = dir.join(format!("{}_{}.png", kind.name(), suffix));
            save_png(&path, &render_sample(kind, with_border))?;
            log::info!("Created {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let fx = x as f32 / width as f32;
        let fy = y as f32 / height as f32;
        Rgb([
            (255.0 * fx) as u8,
            (255.0 * fy) as u8,
            (255.0 * (1.0 - fx) * (1.0 - fy)) as u8,
        ])
    })
}

/// Drawing into an `ImageCanvas` cannot fail
type Drawn = core::result::Result<(), Infallible>;

fn pattern(width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([20, 20, 40]));
    if let Err(never) = draw_shapes(&mut ImageCanvas::new(&mut image), width) {
        match never {}
    }

    let caption = "TEST PUZZLE";
    let scale = 3;
    let (text_w, _) = text_size(caption, scale);
    let left = (width as i32 - text_w as i32) / 2;
    draw_text(&mut image, caption, Point::new(left, 30), scale, Rgb888::WHITE);
    image
}

/// Row of outlined ellipses above a row of pentagons
fn draw_shapes(canvas: &mut ImageCanvas<'_>, width: u32) -> Drawn {
    let step = (width / 6) as i32;
    for (i, color) in SHAPE_COLORS.iter().enumerate() {
        let i = i as i32;
        let top_left = Point::new(i * step + 20, 100 + (i % 3) * 100);
        let size = Size::new((step - 40).max(1) as u32, 150);
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(Rgb888::WHITE)
            .stroke_width(3)
            .fill_color(*color)
            .build();
        Ellipse::new(top_left, size).into_styled(style).draw(canvas)?;
    }

    for (i, color) in SHAPE_COLORS.iter().take(5).enumerate() {
        let center = Point::new(100 + i as i32 * 140, 400);
        draw_pentagon(canvas, center, 50.0, *color)?;
    }
    Ok(())
}

/// Filled regular pentagon built from a triangle fan
fn draw_pentagon(canvas: &mut ImageCanvas<'_>, center: Point, radius: f32, color: Rgb888) -> Drawn {
    let corners: Vec<Point> = (0..5)
        .map(|j| {
            let angle = j as f32 * TAU / 5.0;
            Point::new(
                center.x + (radius * angle.cos()).round() as i32,
                center.y + (radius * angle.sin()).round() as i32,
            )
        })
        .collect();

    let fill = PrimitiveStyle::with_fill(color);
    for j in 0..corners.len() {
        let next = corners[(j + 1) % corners.len()];
        Triangle::new(center, corners[j], next).into_styled(fill).draw(canvas)?;
    }

    let edge = PrimitiveStyle::with_stroke(Rgb888::WHITE, 2);
    for j in 0..corners.len() {
        let next = corners[(j + 1) % corners.len()];
        Line::new(corners[j], next).into_styled(edge).draw(canvas)?;
    }
    Ok(())
}

fn landscape(width: u32, height: u32) -> RgbImage {
    let horizon = height / 2;
    let mut image = RgbImage::from_fn(width, height, |_, y| {
        if y < horizon {
            let blue = 100.0 + 155.0 * (1.0 - y as f32 / horizon as f32);
            Rgb([135, 206, blue as u8])
        } else {
            let green = 50.0 + 100.0 * (y - horizon) as f32 / horizon as f32;
            Rgb([34, green as u8, 34])
        }
    });

    if let Err(never) = draw_scenery(&mut ImageCanvas::new(&mut image), width as i32, horizon as i32) {
        match never {}
    }

    let origin = Point::new(width as i32 / 2 - 100, height as i32 - 100);
    draw_text(&mut image, "LANDSCAPE", origin, 2, Rgb888::WHITE);
    image
}

/// Sun, two mountains and a row of trees along the horizon
fn draw_scenery(canvas: &mut ImageCanvas<'_>, width: i32, horizon: i32) -> Drawn {
    let h = horizon;

    Circle::new(Point::new(width - 200, 50), 150)
        .into_styled(PrimitiveStyle::with_fill(Rgb888::new(255, 255, 100)))
        .draw(canvas)?;

    Triangle::new(Point::new(0, h), Point::new(150, h - 100), Point::new(300, h))
        .into_styled(PrimitiveStyle::with_fill(Rgb888::new(100, 100, 100)))
        .draw(canvas)?;
    Triangle::new(Point::new(200, h), Point::new(400, h - 150), Point::new(600, h))
        .into_styled(PrimitiveStyle::with_fill(Rgb888::new(80, 80, 80)))
        .draw(canvas)?;

    let trunk = PrimitiveStyle::with_fill(Rgb888::new(101, 67, 33));
    let foliage = PrimitiveStyle::with_fill(Rgb888::new(34, 139, 34));
    for i in 0..10 {
        let x = 50 + i * 100;
        let y = h + 50;
        Rectangle::new(Point::new(x - 5, y), Size::new(11, 81))
            .into_styled(trunk)
            .draw(canvas)?;
        Circle::with_center(Point::new(x, y), 61)
            .into_styled(foliage)
            .draw(canvas)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::detect_border;

    #[test]
    fn test_sample_dimensions() {
        for kind in SampleKind::ALL {
            let image = render_sample(kind, false);
            assert_eq!(image.dimensions(), kind.dimensions());
        }
    }

    #[test]
    fn test_gradient_corners() {
        let image = render_sample(SampleKind::Gradient, false);
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 255]));
        let far = image.get_pixel(799, 599);
        assert!(far[0] > 250 && far[1] > 250 && far[2] < 5);
    }

    #[test]
    fn test_framed_samples_have_detectable_border() {
        for kind in SampleKind::ALL {
            let (frame, _) = kind.frame();
            let image = render_sample(kind, true);
            let border = detect_border(&image, 10).unwrap();
            assert!(border.top >= frame, "{}: {:?}", kind.name(), border);
            assert!(border.left >= frame, "{}: {:?}", kind.name(), border);
            assert!(border.bottom >= frame, "{}: {:?}", kind.name(), border);
            assert!(border.right >= frame, "{}: {:?}", kind.name(), border);
        }
    }

    #[test]
    fn test_pattern_has_caption_and_shapes() {
        let image = render_sample(SampleKind::Pattern, false);
        let background = Rgb([20, 20, 40]);
        let painted = image.pixels().filter(|p| **p != background).count();
        assert!(painted > 10_000);

        let white = Rgb([255, 255, 255]);
        assert!(image.rows().skip(30).take(60).flatten().any(|p| *p == white));
    }

    #[test]
    fn test_drawing_helpers_paint_the_canvas() {
        let mut image = RgbImage::new(800, 600);
        assert!(draw_scenery(&mut ImageCanvas::new(&mut image), 800, 300).is_ok());
        assert_eq!(image.get_pixel(675, 125), &Rgb([255, 255, 100]));

        let mut image = RgbImage::new(200, 200);
        assert!(draw_pentagon(&mut ImageCanvas::new(&mut image), Point::new(100, 100), 50.0, Rgb888::RED).is_ok());
        assert_eq!(image.get_pixel(115, 110), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(5, 5), &Rgb([0, 0, 0]));
    }
}
