use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::{PrepError, Result};

/// Extension of raw packed streams
pub const STREAM_EXTENSION: &str = "rgb565";

/// File names generated for one output name
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub normalized: PathBuf,
    pub preview: PathBuf,
    pub header: PathBuf,
    pub stream: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: &Path, name: &str, size: u32) -> Self {
        Self {
            normalized: output_dir.join(format!("{}_{}x{}.png", name, size, size)),
            preview: output_dir.join(format!("{}_preview.png", name)),
            header: output_dir.join(format!("{}.h", name)),
            stream: output_dir.join(format!("{}.{}", name, STREAM_EXTENSION)),
        }
    }
}

/// Create the output directory if needed
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| PrepError::io(dir, e))
}

/// Write through a temporary sibling and rename into place, so a failed
/// run never leaves a truncated artifact behind.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(PrepError::io(&tmp, e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        PrepError::io(path, e)
    })
}

/// Encode and save a PNG through the same temporary-file scheme
pub fn save_png(path: &Path, image: &RgbImage) -> Result<()> {
    let mut encoded = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
        .map_err(|source| PrepError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    write_atomic(path, &encoded)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// File stem used as default output name
pub fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "puzzle".to_string())
}
