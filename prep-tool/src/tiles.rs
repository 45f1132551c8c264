//! Sliding-puzzle tile preview.
//!
//! The square is split into an N×N grid. Every cell except the bottom-right
//! one (the empty slot) is copied onto a larger canvas with a gap between
//! cells and labelled with its 1-based number.

use image::{imageops, Rgb, RgbImage};

use crate::canvas::draw_outlined_label;
use crate::error::{PrepError, Result};

/// Canvas color behind and between tiles
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Grid sizes offered on the command line
pub const GRID_CHOICES: [u32; 4] = [3, 4, 5, 6];

/// Default gap between tiles, in pixels
pub const DEFAULT_GAP: u32 = 2;

/// One rendered cell of the puzzle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Row-major index, 0-based
    pub index: u32,
    pub row: u32,
    pub col: u32,
    /// Source rectangle in the normalized image as `(x, y, size, size)`
    pub source: (u32, u32, u32, u32),
    /// Top-left corner on the preview canvas
    pub dest: (u32, u32),
}

impl Tile {
    /// Number printed on the tile
    pub fn label(&self) -> u32 {
        self.index + 1
    }
}

/// Grid geometry for a square image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub image_size: u32,
    pub grid_size: u32,
    pub gap: u32,
}

impl TileGrid {
    pub fn new(image_size: u32, grid_size: u32, gap: u32) -> Result<Self> {
        if grid_size < 2 {
            return Err(PrepError::InvalidGrid(grid_size));
        }
        if image_size < grid_size {
            return Err(PrepError::InvalidSize);
        }
        let tile = image_size / grid_size;
        if gap > tile {
            return Err(PrepError::InvalidGap { gap, tile });
        }
        gap.checked_mul(grid_size - 1)
            .and_then(|gaps| gaps.checked_add(image_size))
            .ok_or(PrepError::InvalidSize)?;
        Ok(Self {
            image_size,
            grid_size,
            gap,
        })
    }

    /// Edge length of one tile; remainder pixels are dropped
    pub fn tile_size(&self) -> u32 {
        self.image_size / self.grid_size
    }

    /// Pixels on each axis that fall outside the grid
    pub fn remainder(&self) -> u32 {
        self.image_size % self.grid_size
    }

    /// Edge length of the preview canvas
    pub fn preview_size(&self) -> u32 {
        self.image_size
            .saturating_add(self.gap.saturating_mul(self.grid_size.saturating_sub(1)))
    }

    /// Index of the cell left empty
    pub fn empty_index(&self) -> u32 {
        self.grid_size * self.grid_size - 1
    }

    /// All non-empty tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        let tile = self.tile_size();
        let pitch = tile + self.gap;
        (0..self.empty_index()).map(move |index| {
            let row = index / self.grid_size;
            let col = index % self.grid_size;
            Tile {
                index,
                row,
                col,
                source: (col * tile, row * tile, tile, tile),
                dest: (col * pitch, row * pitch),
            }
        })
    }

    /// Canvas rectangle of any cell, empty one included
    pub fn cell_rect(&self, row: u32, col: u32) -> (u32, u32, u32, u32) {
        let tile = self.tile_size();
        let pitch = tile + self.gap;
        (col * pitch, row * pitch, tile, tile)
    }
}

/// Preview image plus the tiles drawn on it
#[derive(Debug, Clone)]
pub struct TilePreview {
    pub image: RgbImage,
    pub grid: TileGrid,
    pub tiles: Vec<Tile>,
}

/// Render the labelled tile preview of a square image
pub fn slice_tiles(image: &RgbImage, grid_size: u32, gap: u32) -> Result<TilePreview> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PrepError::EmptyImage);
    }
    let size = width.min(height);
    let grid = TileGrid::new(size, grid_size, gap)?;

    if grid.remainder() != 0 {
        log::warn!(
            "{}px is not divisible by {}, dropping {}px on the right and bottom",
            size,
            grid_size,
            grid.remainder()
        );
    }

    let tile_size = grid.tile_size();
    let label_scale = (tile_size / 80).max(1);
    let mut preview = RgbImage::from_pixel(grid.preview_size(), grid.preview_size(), BACKGROUND);
    let mut tiles = Vec::with_capacity(grid.empty_index() as usize);

    for tile in grid.tiles() {
        let (sx, sy, sw, sh) = tile.source;
        let cell = imageops::crop_imm(image, sx, sy, sw, sh).to_image();
        let (dx, dy) = tile.dest;
        imageops::replace(&mut preview, &cell, dx as i64, dy as i64);

        draw_outlined_label(&mut preview, &tile.label().to_string(), dx, dy, tile_size, label_scale);
        tiles.push(tile);
    }

    log::debug!(
        "Rendered {} tiles of {}px on a {}px preview",
        tiles.len(),
        tile_size,
        grid.preview_size()
    );

    Ok(TilePreview {
        image: preview,
        grid,
        tiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(size: u32) -> RgbImage {
        RgbImage::from_pixel(size, size, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_grid_geometry() {
        let grid = TileGrid::new(480, 4, 2).unwrap();
        assert_eq!(grid.tile_size(), 120);
        assert_eq!(grid.preview_size(), 486);
        assert_eq!(grid.empty_index(), 15);
        assert_eq!(grid.tiles().count(), 15);

        let last = grid.tiles().last().unwrap();
        assert_eq!((last.row, last.col), (3, 2));
        assert_eq!(last.source, (240, 360, 120, 120));
        assert_eq!(last.dest, (244, 366));
    }

    #[test]
    fn test_rejects_small_grid() {
        assert!(matches!(TileGrid::new(480, 1, 2), Err(PrepError::InvalidGrid(1))));
        assert!(matches!(slice_tiles(&white(10), 0, 0), Err(PrepError::InvalidGrid(0))));
    }

    #[test]
    fn test_rejects_gap_wider_than_tile() {
        assert!(matches!(
            TileGrid::new(480, 4, 121),
            Err(PrepError::InvalidGap { gap: 121, tile: 120 })
        ));
        assert!(TileGrid::new(480, 4, 120).is_ok());
        assert!(matches!(
            slice_tiles(&white(10), 2, u32::MAX),
            Err(PrepError::InvalidGap { .. })
        ));
        assert!(matches!(
            TileGrid::new(u32::MAX, 2, u32::MAX / 2),
            Err(PrepError::InvalidSize)
        ));
    }

    #[test]
    fn test_labels_are_distinct_and_sequential() {
        for n in GRID_CHOICES {
            let preview = slice_tiles(&white(120), n, 1).unwrap();
            let labels: Vec<u32> = preview.tiles.iter().map(Tile::label).collect();
            let expected: Vec<u32> = (1..n * n).collect();
            assert_eq!(labels, expected);
        }
    }

    #[test]
    fn test_empty_cell_is_background() {
        let preview = slice_tiles(&white(480), 4, 2).unwrap();
        assert_eq!(preview.image.dimensions(), (486, 486));

        let (x, y, w, h) = preview.grid.cell_rect(3, 3);
        for py in y..y + h {
            for px in x..x + w {
                assert_eq!(*preview.image.get_pixel(px, py), BACKGROUND);
            }
        }
    }

    #[test]
    fn test_gaps_are_background() {
        let preview = slice_tiles(&white(480), 4, 2).unwrap();
        for y in 0..486 {
            assert_eq!(*preview.image.get_pixel(120, y), BACKGROUND);
            assert_eq!(*preview.image.get_pixel(121, y), BACKGROUND);
        }
        // Tile corners are untouched by the centered label
        assert_eq!(*preview.image.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*preview.image.get_pixel(122, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_remainder_is_dropped() {
        let preview = slice_tiles(&white(100), 3, 0).unwrap();
        assert_eq!(preview.grid.tile_size(), 33);
        assert_eq!(preview.grid.remainder(), 1);
        // Column 99 lies outside every tile
        assert_eq!(*preview.image.get_pixel(99, 0), BACKGROUND);
        assert_eq!(*preview.image.get_pixel(98, 0), Rgb([255, 255, 255]));
    }
}
