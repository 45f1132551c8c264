//! Directory conversion to raw `.rgb565` streams.
//!
//! Each set maps an input directory to an output directory (typically one
//! per difficulty level). A file that fails is reported and skipped; the
//! rest of the set still converts.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use indicatif::ProgressBar;
use puzzle_rgb565::{stream_checksum, stream_len, PackLayout};
use serde::Deserialize;

use crate::error::{PrepError, Result};
use crate::normalize::resize_exact;
use crate::output::{ensure_dir, write_atomic, STREAM_EXTENSION};
use crate::pipeline::{encode_rgb, load_rgb, DEFAULT_SIZE};

/// Byte order of streams loaded from flash by the panel firmware
pub const DEFAULT_STREAM_LAYOUT: PackLayout = PackLayout::RGB565_SWAPPED;

/// Settings shared by every file of a batch
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub size: u32,
    pub layout: PackLayout,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            layout: DEFAULT_STREAM_LAYOUT,
        }
    }
}

/// JSON description of several input/output directory pairs
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_size")]
    pub size: u32,
    /// Preset name or field list, `rgb565-swapped` when absent
    #[serde(default)]
    pub layout: Option<String>,
    pub sets: Vec<BatchSet>,
}

/// One input/output directory pair
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSet {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Puzzle grid the set is meant for; informational only
    #[serde(default)]
    pub grid: Option<u32>,
}

fn default_size() -> u32 {
    DEFAULT_SIZE
}

impl Manifest {
    /// Read a manifest; relative directories resolve against its location
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        let mut manifest = Self::parse(&text).map_err(|source| PrepError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for set in &mut manifest.sets {
            set.input = base.join(&set.input);
            set.output = base.join(&set.output);
        }
        Ok(manifest)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Resolve and validate the batch options
    pub fn options(&self) -> Result<BatchOptions> {
        if self.size == 0 {
            return Err(PrepError::InvalidSize);
        }
        let layout = match &self.layout {
            Some(text) => text.parse::<PackLayout>()?,
            None => DEFAULT_STREAM_LAYOUT,
        };
        Ok(BatchOptions {
            size: self.size,
            layout,
        })
    }
}

/// Outcome for one converted file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub crc: u16,
    /// Source had to be resized to the target square
    pub resized: bool,
}

impl FileReport {
    /// Relative size reduction versus the source file, in percent
    pub fn saved_percent(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.output_bytes as f64 / self.input_bytes as f64) * 100.0
    }
}

/// Outcome for a whole directory
#[derive(Debug)]
pub struct SetReport {
    pub name: String,
    pub grid: Option<u32>,
    pub converted: Vec<FileReport>,
    pub failed: Vec<(PathBuf, PrepError)>,
}

impl SetReport {
    pub fn total_output_bytes(&self) -> u64 {
        self.converted.iter().map(|r| r.output_bytes).sum()
    }
}

/// Image files directly inside `dir`, sorted by name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PrepError::MissingInput(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| PrepError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PrepError::io(dir, e))?.path();
        if path.is_file() && image::ImageFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load `input` as an `size`×`size` RGB frame, resizing with a warning when
/// it has other dimensions. The flag reports whether a resize happened.
pub fn load_frame(input: &Path, size: u32) -> Result<(RgbImage, bool)> {
    let image = load_rgb(input)?;
    if image.dimensions() == (size, size) {
        return Ok((image, false));
    }

    log::warn!(
        "{} is {}x{}, expected {}x{}; resizing",
        input.display(),
        image.width(),
        image.height(),
        size,
        size
    );
    Ok((resize_exact(&image, size)?, true))
}

/// Convert one image file into a packed stream
pub fn convert_file(input: &Path, output: &Path, options: &BatchOptions) -> Result<FileReport> {
    let (image, resized) = load_frame(input, options.size)?;
    let input_bytes = fs::metadata(input)
        .map_err(|e| PrepError::io(input, e))?
        .len();

    let bytes = encode_rgb(&image, &options.layout)?;
    debug_assert_eq!(bytes.len(), stream_len(options.size, options.size));
    write_atomic(output, &bytes)?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        input_bytes,
        output_bytes: bytes.len() as u64,
        crc: stream_checksum(&bytes),
        resized,
    })
}

/// Convert every image in `set.input`, continuing past individual failures
pub fn convert_set(set: &BatchSet, options: &BatchOptions, progress: &ProgressBar) -> Result<SetReport> {
    let files = list_images(&set.input)?;
    ensure_dir(&set.output)?;

    progress.set_length(files.len() as u64);
    progress.set_position(0);

    let mut report = SetReport {
        name: set.name.clone(),
        grid: set.grid,
        converted: Vec::new(),
        failed: Vec::new(),
    };

    for file in files {
        progress.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = set.output.join(format!("{}.{}", stem, STREAM_EXTENSION));

        match convert_file(&file, &output, options) {
            Ok(file_report) => report.converted.push(file_report),
            Err(e) => {
                log::error!("Failed to convert {}: {}", file.display(), e);
                report.failed.push((file, e));
            }
        }
        progress.inc(1);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_rgb565::find_preset;

    #[test]
    fn test_manifest_defaults() {
        let manifest = Manifest::parse(
            r#"{ "sets": [ { "name": "easy", "input": "in/easy", "output": "out/easy", "grid": 3 } ] }"#,
        )
        .unwrap();
        assert_eq!(manifest.size, 480);
        assert_eq!(manifest.sets.len(), 1);
        assert_eq!(manifest.sets[0].grid, Some(3));

        let options = manifest.options().unwrap();
        assert_eq!(options.layout, find_preset("rgb565-swapped").unwrap().layout);
    }

    #[test]
    fn test_default_stream_is_byte_swapped() {
        let options = BatchOptions::default();
        assert_eq!(options.layout, find_preset("rgb565-swapped").unwrap().layout);
        assert_eq!(options.size, 480);

        // Pure red goes out as F8 00
        let bytes = options.layout.encode([255, 0, 0]).to_le_bytes();
        assert_eq!(bytes, [0xF8, 0x00]);
    }

    #[test]
    fn test_manifest_layout_is_validated() {
        let manifest = Manifest::parse(r#"{ "layout": "rgb565-swapped", "sets": [] }"#).unwrap();
        assert!(manifest.options().unwrap().layout.swaps_bytes());

        let manifest = Manifest::parse(r#"{ "layout": "cmyk", "sets": [] }"#).unwrap();
        let err = manifest.options().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_manifest_rejects_garbage() {
        assert!(Manifest::parse("{ \"sets\": 3 }").is_err());
    }

    #[test]
    fn test_saved_percent() {
        let report = FileReport {
            input: PathBuf::new(),
            output: PathBuf::new(),
            input_bytes: 200,
            output_bytes: 50,
            crc: 0,
            resized: false,
        };
        assert!((report.saved_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_directory() {
        let err = list_images(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err, PrepError::MissingInput(_)));
    }
}
