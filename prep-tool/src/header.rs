//! C/C++ header emission.
//!
//! The header holds the pixel array plus `<name>_width`/`<name>_height`
//! constants so firmware can `#include` an image without a file system.

use std::fmt::Write as _;
use std::str::FromStr;

use puzzle_rgb565::{encode_words, PackLayout, PixelBuffer, PRESETS, RGB_CHANNELS};

use crate::error::{PrepError, Result};

/// Pixel format of the emitted array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormat {
    /// One `uint16_t` per pixel, packed with the given layout
    Rgb565(PackLayout),
    /// Three `uint8_t` per pixel
    Rgb888,
}

impl HeaderFormat {
    pub fn name(&self) -> &'static str {
        match self {
            HeaderFormat::Rgb565(_) => "RGB565",
            HeaderFormat::Rgb888 => "RGB888",
        }
    }

    /// Apply a packing layout; RGB888 arrays carry raw bytes and ignore it
    pub fn with_layout(self, layout: PackLayout) -> Self {
        match self {
            HeaderFormat::Rgb565(_) => HeaderFormat::Rgb565(layout),
            HeaderFormat::Rgb888 => HeaderFormat::Rgb888,
        }
    }

    pub fn uses_layout(&self) -> bool {
        matches!(self, HeaderFormat::Rgb565(_))
    }
}

impl Default for HeaderFormat {
    fn default() -> Self {
        HeaderFormat::Rgb565(PackLayout::RGB565)
    }
}

impl FromStr for HeaderFormat {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb565" => Ok(HeaderFormat::Rgb565(PackLayout::RGB565)),
            "rgb888" => Ok(HeaderFormat::Rgb888),
            other => Err(PrepError::UnknownFormat(other.to_string())),
        }
    }
}

/// Turn an arbitrary output name into a valid C identifier
pub fn symbol_name(name: &str) -> String {
    let mut symbol: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if symbol.is_empty() || symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert(0, '_');
    }
    symbol
}

/// Render the complete header for an RGB888 pixel buffer
pub fn render_header(
    data: &[u8],
    width: u32,
    height: u32,
    symbol: &str,
    format: HeaderFormat,
) -> Result<String> {
    let buffer = PixelBuffer::new(data, width, height, RGB_CHANNELS)?;
    let symbol = symbol_name(symbol);
    let pixels = buffer.pixel_count();

    let mut out = String::with_capacity(pixels * 8 + 256);
    out.push_str("#pragma once\n\n");
    let _ = writeln!(out, "// Image: {}x{}, Format: {}", width, height, format.name());
    if let HeaderFormat::Rgb565(layout) = format {
        let _ = writeln!(out, "// Layout: {} ({})", layout_label(&layout), layout);
    }
    let _ = writeln!(out, "// Generated by puzzle-prep");
    out.push('\n');

    let row_len = width as usize;
    match format {
        HeaderFormat::Rgb565(layout) => {
            let words = encode_words(&buffer, &layout);
            let _ = writeln!(out, "const uint16_t {}[{}] PROGMEM = {{", symbol, pixels);
            for row in words.chunks(row_len) {
                out.push_str("   ");
                for word in row {
                    let _ = write!(out, " 0x{:04X},", word);
                }
                out.push('\n');
            }
        }
        HeaderFormat::Rgb888 => {
            let _ = writeln!(out, "const uint8_t {}[{}] PROGMEM = {{", symbol, pixels * 3);
            for row in data.chunks(row_len * 3) {
                out.push_str("   ");
                for byte in row {
                    let _ = write!(out, " 0x{:02X},", byte);
                }
                out.push('\n');
            }
        }
    }
    out.push_str("};\n\n");

    let _ = writeln!(out, "const int {}_width = {};", symbol, width);
    let _ = writeln!(out, "const int {}_height = {};", symbol, height);

    Ok(out)
}

/// Every preset producing these words, `custom` when none does
fn layout_label(layout: &PackLayout) -> String {
    let names: Vec<&str> = PRESETS
        .iter()
        .filter(|p| p.layout == *layout)
        .map(|p| p.name)
        .collect();
    if names.is_empty() {
        "custom".to_string()
    } else {
        names.join(" / ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_rgb565::find_preset;

    #[test]
    fn test_symbol_name() {
        assert_eq!(symbol_name("castle"), "castle");
        assert_eq!(symbol_name("my-puzzle.v2"), "my_puzzle_v2");
        assert_eq!(symbol_name("3x3"), "_3x3");
        assert_eq!(symbol_name(""), "_");
    }

    #[test]
    fn test_rgb565_header() {
        let data = [255u8, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255];
        let text = render_header(&data, 2, 2, "tiny", HeaderFormat::default()).unwrap();

        assert!(text.starts_with("#pragma once\n"));
        assert!(text.contains("// Image: 2x2, Format: RGB565"));
        assert!(text.contains("// Layout: rgb565 / bgr-reversed (R5@11 G6@5 B5@0)"));
        assert!(text.contains("const uint16_t tiny[4] PROGMEM = {"));
        assert!(text.contains("    0xFFFF, 0xF800,\n"));
        assert!(text.contains("    0x07E0, 0x001F,\n"));
        assert!(text.contains("const int tiny_width = 2;"));
        assert!(text.contains("const int tiny_height = 2;"));
    }

    #[test]
    fn test_swapped_layout_is_reflected_in_values() {
        let data = [255u8, 0, 0];
        let layout = find_preset("rgb565-swapped").unwrap().layout;
        let text = render_header(&data, 1, 1, "px", HeaderFormat::Rgb565(layout)).unwrap();
        assert!(text.contains("// Layout: rgb565-swapped (R5@11 G6@5 B5@0 swapped)"));
        assert!(text.contains("    0x00F8,\n"));
    }

    #[test]
    fn test_rgb888_header() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let text = render_header(&data, 2, 1, "raw", HeaderFormat::Rgb888).unwrap();
        assert!(text.contains("const uint8_t raw[6] PROGMEM = {"));
        assert!(text.contains("    0x01, 0x02, 0x03, 0x04, 0x05, 0x06,\n"));
    }

    #[test]
    fn test_custom_layout_label() {
        let layout: PackLayout = "b5@0,g6@5,r5@11".parse().unwrap();
        let text = render_header(&[0u8, 0, 0], 1, 1, "px", HeaderFormat::Rgb565(layout)).unwrap();
        assert!(text.contains("// Layout: rgb565 / bgr-reversed "));

        let odd: PackLayout = "r4@12,g8@4,b4@0".parse().unwrap();
        let text = render_header(&[0u8, 0, 0], 1, 1, "px", HeaderFormat::Rgb565(odd)).unwrap();
        assert!(text.contains("// Layout: custom (R4@12 G8@4 B4@0)"));
    }

    #[test]
    fn test_equivalent_presets_are_all_named() {
        let layout = find_preset("rgb-reversed").unwrap().layout;
        let text = render_header(&[0u8, 0, 0], 1, 1, "px", HeaderFormat::Rgb565(layout)).unwrap();
        assert!(text.contains("// Layout: bgr565 / rgb-reversed (B5@11 G6@5 R5@0)"));
    }

    #[test]
    fn test_layout_only_applies_to_rgb565() {
        let bgr = find_preset("bgr565").unwrap().layout;
        assert_eq!(HeaderFormat::default().with_layout(bgr), HeaderFormat::Rgb565(bgr));
        assert!(HeaderFormat::default().uses_layout());

        assert_eq!(HeaderFormat::Rgb888.with_layout(bgr), HeaderFormat::Rgb888);
        assert!(!HeaderFormat::Rgb888.uses_layout());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("RGB888".parse::<HeaderFormat>().unwrap(), HeaderFormat::Rgb888);
        assert!(matches!(
            "yuv".parse::<HeaderFormat>(),
            Err(PrepError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_rejects_short_buffers() {
        let rgba = [0u8; 8];
        assert!(matches!(
            render_header(&rgba, 1, 2, "x", HeaderFormat::Rgb888),
            Err(PrepError::Codec(_))
        ));
    }
}
