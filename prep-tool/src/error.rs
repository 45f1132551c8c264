use std::path::PathBuf;

use puzzle_rgb565::{CodecError, LayoutError};

/// Errors produced while preparing puzzle images.
///
/// Input errors abort the current image only; configuration errors are
/// raised before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("grid size must be at least 2, got {0}")]
    InvalidGrid(u32),

    #[error("gap of {gap}px is wider than a {tile}px tile")]
    InvalidGap { gap: u32, tile: u32 },

    #[error("target size must be positive")]
    InvalidSize,

    #[error("unknown pixel format: {0} (expected rgb565 or rgb888)")]
    UnknownFormat(String),

    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("pixel codec: {0}")]
    Codec(#[from] CodecError),

    #[error("could not encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }

    /// Configuration errors are reported before processing starts
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PrepError::InvalidGrid(_)
                | PrepError::InvalidGap { .. }
                | PrepError::InvalidSize
                | PrepError::UnknownFormat(_)
                | PrepError::Layout(_)
                | PrepError::Manifest { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
