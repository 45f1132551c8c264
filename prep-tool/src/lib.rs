//! Puzzle image preparation.
//!
//! Turns arbitrary photos into square frames for the 480×480 sliding-puzzle
//! panel: trim a uniform border, scale and center-crop, render a numbered
//! tile preview, and emit the frame as a C header or a raw packed stream.

pub mod batch;
pub mod border;
pub mod canvas;
pub mod error;
pub mod header;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod samples;
pub mod tiles;

pub use batch::{convert_file, convert_set, BatchOptions, BatchSet, FileReport, Manifest, SetReport};
pub use border::{detect_border, trim_border, BorderSpec};
pub use error::{PrepError, Result};
pub use header::{render_header, symbol_name, HeaderFormat};
pub use normalize::{normalize_square, resize_exact};
pub use pipeline::{process_image, ConversionResult, PrepareOptions};
pub use tiles::{slice_tiles, TileGrid, TilePreview};
