//! Single-image pipeline: decode → trim → normalize → preview / header / stream.

use std::path::{Path, PathBuf};

use image::RgbImage;
use puzzle_rgb565::{encode_stream, stream_checksum, PackLayout, PixelBuffer, RGB_CHANNELS};

use crate::border::{trim_border, BorderSpec};
use crate::error::{PrepError, Result};
use crate::header::{render_header, HeaderFormat};
use crate::normalize::normalize_square;
use crate::output::{default_name, ensure_dir, save_png, write_atomic, ArtifactPaths};
use crate::tiles::{slice_tiles, TileGrid, DEFAULT_GAP};

/// Defaults match the 480×480 panel and a 4×4 puzzle
pub const DEFAULT_SIZE: u32 = puzzle_rgb565::PANEL_SIZE;
pub const DEFAULT_GRID: u32 = 4;
pub const DEFAULT_THRESHOLD: u8 = 10;

/// Settings for preparing one image
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub output_dir: PathBuf,
    /// Base name for artifacts; the input file stem when `None`
    pub output_name: Option<String>,
    pub target_size: u32,
    pub grid_size: u32,
    pub gap: u32,
    pub border_threshold: u8,
    pub preview: bool,
    /// Emit a C header in this format
    pub header: Option<HeaderFormat>,
    /// Emit a raw packed stream with this layout
    pub stream: Option<PackLayout>,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            output_name: None,
            target_size: DEFAULT_SIZE,
            grid_size: DEFAULT_GRID,
            gap: DEFAULT_GAP,
            border_threshold: DEFAULT_THRESHOLD,
            preview: true,
            header: None,
            stream: None,
        }
    }
}

impl PrepareOptions {
    /// Reject bad settings before any file is read or written
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(PrepError::InvalidSize);
        }
        TileGrid::new(self.target_size, self.grid_size, self.gap)?;
        Ok(())
    }
}

/// Artifacts produced for one input image
#[derive(Debug, Clone, Default)]
pub struct ConversionResult {
    pub border: BorderSpec,
    pub normalized: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub header: Option<PathBuf>,
    pub stream: Option<PathBuf>,
    /// CRC-16 of the packed stream, when one was written
    pub stream_crc: Option<u16>,
}

impl ConversionResult {
    /// `(kind, path)` pairs for every generated file
    pub fn artifacts(&self) -> Vec<(&'static str, &Path)> {
        [
            ("final", &self.normalized),
            ("preview", &self.preview),
            ("header", &self.header),
            ("stream", &self.stream),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.as_deref().map(|p| (kind, p)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts().is_empty()
    }
}

/// Load any supported raster file as 8-bit RGB
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    if !path.exists() {
        return Err(PrepError::MissingInput(path.to_path_buf()));
    }

    let decoded = image::ImageReader::open(path)
        .map_err(|e| PrepError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| PrepError::io(path, e))?
        .decode()
        .map_err(|source| PrepError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    log::info!("Original size: {}x{}", decoded.width(), decoded.height());
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(PrepError::EmptyImage);
    }
    if !matches!(decoded, image::DynamicImage::ImageRgb8(_)) {
        log::info!("Converting from {:?} to RGB", decoded.color());
    }

    Ok(decoded.into_rgb8())
}

/// Trim and normalize an in-memory image
pub fn prepare_square(image: &RgbImage, options: &PrepareOptions) -> Result<(RgbImage, BorderSpec)> {
    let (trimmed, border) = trim_border(image, options.border_threshold)?;
    log::info!(
        "After border removal: {}x{}",
        trimmed.width(),
        trimmed.height()
    );
    let square = normalize_square(&trimmed, options.target_size)?;
    Ok((square, border))
}

/// Run the whole pipeline for one input file
pub fn process_image(input: &Path, options: &PrepareOptions) -> Result<ConversionResult> {
    options.validate()?;
    log::info!("Processing: {}", input.display());

    let source = load_rgb(input)?;
    let (square, border) = prepare_square(&source, options)?;

    let name = options
        .output_name
        .clone()
        .unwrap_or_else(|| default_name(input));
    let paths = ArtifactPaths::new(&options.output_dir, &name, options.target_size);
    ensure_dir(&options.output_dir)?;

    let mut result = ConversionResult {
        border,
        ..Default::default()
    };

    save_png(&paths.normalized, &square)?;
    log::info!("Saved: {}", paths.normalized.display());
    result.normalized = Some(paths.normalized);

    if options.preview {
        let preview = slice_tiles(&square, options.grid_size, options.gap)?;
        save_png(&paths.preview, &preview.image)?;
        log::info!(
            "Saved {}x{} tile preview: {}",
            options.grid_size,
            options.grid_size,
            paths.preview.display()
        );
        result.preview = Some(paths.preview);
    }

    if let Some(format) = options.header {
        let text = render_header(square.as_raw(), square.width(), square.height(), &name, format)?;
        write_atomic(&paths.header, text.as_bytes())?;
        log::info!("Saved: {}", paths.header.display());
        result.header = Some(paths.header);
    }

    if let Some(layout) = options.stream {
        let bytes = encode_rgb(&square, &layout)?;
        write_atomic(&paths.stream, &bytes)?;
        log::info!("Saved: {} ({} bytes)", paths.stream.display(), bytes.len());
        result.stream_crc = Some(stream_checksum(&bytes));
        result.stream = Some(paths.stream);
    }

    Ok(result)
}

/// Pack an RGB image into a headerless stream
pub fn encode_rgb(image: &RgbImage, layout: &PackLayout) -> Result<Vec<u8>> {
    let buffer = PixelBuffer::new(image.as_raw(), image.width(), image.height(), RGB_CHANNELS)?;
    Ok(encode_stream(&buffer, layout))
}
