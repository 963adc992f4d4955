//! Tile grid for parallel rendering.
//!
//! Divides the image into a fixed grid of rectangular tiles that can be
//! rendered independently and in parallel using rayon.

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// X coordinate of the tile's first column
    pub x: u32,
    /// Y coordinate of the tile's first row
    pub y: u32,
    /// Width of the tile in pixels
    pub width: u32,
    /// Height of the tile in pixels
    pub height: u32,
    /// Row-major position of this tile in the grid
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Image coordinates of every pixel, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }
}

/// A `tiles_x` by `tiles_y` grid over a `width` by `height` image.
///
/// Tiles have equal size. When the image does not divide evenly the
/// leftover pixels are spread one per tile, so tile sizes along an axis
/// differ by at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl TileGrid {
    /// Tile counts are clamped to `[1, dimension]` so every tile has pixels.
    pub fn new(width: u32, height: u32, tiles_x: u32, tiles_y: u32) -> Self {
        Self {
            width,
            height,
            tiles_x: tiles_x.clamp(1, width.max(1)),
            tiles_y: tiles_y.clamp(1, height.max(1)),
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }

    /// The tile at grid column `col`, row `row`.
    pub fn tile(&self, col: u32, row: u32) -> Tile {
        let x = split(self.width, self.tiles_x, col);
        let y = split(self.height, self.tiles_y, row);
        let width = split(self.width, self.tiles_x, col + 1) - x;
        let height = split(self.height, self.tiles_y, row + 1) - y;
        let index = (row * self.tiles_x + col) as usize;
        Tile::new(x, y, width, height, index)
    }

    /// All tiles in row-major grid order.
    pub fn tiles(&self) -> Vec<Tile> {
        (0..self.tiles_y)
            .flat_map(|row| (0..self.tiles_x).map(move |col| self.tile(col, row)))
            .collect()
    }

    /// Index of the tile containing pixel `(x, y)`.
    ///
    /// Coordinates past the image edge map to the last column or row.
    pub fn tile_index_at(&self, x: u32, y: u32) -> usize {
        let col = owner(self.width, self.tiles_x, x);
        let row = owner(self.height, self.tiles_y, y);
        (row * self.tiles_x + col) as usize
    }
}

/// First pixel of part `i` when `len` pixels are cut into `parts`.
fn split(len: u32, parts: u32, i: u32) -> u32 {
    (u64::from(i) * u64::from(len) / u64::from(parts)) as u32
}

/// The last part whose first pixel is at or before `pos`.
fn owner(len: u32, parts: u32, pos: u32) -> u32 {
    let part = ((u64::from(pos) + 1) * u64::from(parts) - 1) / u64::from(len.max(1));
    (part as u32).min(parts - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_exact_fit() {
        let grid = TileGrid::new(128, 128, 2, 2);
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.width == 64 && t.height == 64));

        // Total pixels should equal image size
        let total: usize = tiles.iter().map(|t| t.pixel_count()).sum();
        assert_eq!(total, 128 * 128);
    }

    #[test]
    fn test_remainder_is_spread_across_tiles() {
        let grid = TileGrid::new(100, 70, 3, 4);
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 12);

        assert_eq!(grid.tile(0, 0), Tile::new(0, 0, 33, 17, 0));
        let widths: Vec<_> = (0..3).map(|col| grid.tile(col, 0).width).collect();
        assert_eq!(widths, vec![33, 33, 34]);
        let heights: Vec<_> = (0..4).map(|row| grid.tile(0, row).height).collect();
        assert_eq!(heights, vec![17, 18, 17, 18]);

        let total: usize = tiles.iter().map(|t| t.pixel_count()).sum();
        assert_eq!(total, 100 * 70);
    }

    #[test]
    fn test_tile_sizes_differ_by_at_most_one() {
        let grid = TileGrid::new(10, 7, 6, 4);
        let widths: Vec<_> = (0..6).map(|col| grid.tile(col, 0).width).collect();
        assert_eq!(widths, vec![1, 2, 2, 1, 2, 2]);

        for (w, h, tx, ty) in [(10, 7, 6, 4), (37, 23, 4, 3), (101, 9, 7, 9), (5, 5, 5, 2)] {
            let grid = TileGrid::new(w, h, tx, ty);
            let tiles = grid.tiles();
            let min_w = tiles.iter().map(|t| t.width).min().unwrap();
            let max_w = tiles.iter().map(|t| t.width).max().unwrap();
            let min_h = tiles.iter().map(|t| t.height).min().unwrap();
            let max_h = tiles.iter().map(|t| t.height).max().unwrap();
            assert!(max_w - min_w <= 1 && max_h - min_h <= 1, "{w}x{h} over {tx}x{ty}");
            assert!(min_w >= 1 && min_h >= 1);
        }
    }

    #[test]
    fn test_every_pixel_in_exactly_one_tile() {
        for (w, h, tx, ty) in [(37, 23, 4, 3), (10, 7, 6, 4), (9, 5, 9, 5)] {
            let grid = TileGrid::new(w, h, tx, ty);
            let tiles = grid.tiles();

            for y in 0..h {
                for x in 0..w {
                    let owners: Vec<_> = tiles.iter().filter(|t| t.contains(x, y)).collect();
                    assert_eq!(owners.len(), 1, "pixel ({x}, {y})");
                    assert_eq!(owners[0].index, grid.tile_index_at(x, y));
                }
            }
        }
    }

    #[test]
    fn test_tile_pixels_are_row_major() {
        let tile = Tile::new(4, 2, 2, 2, 0);
        let pixels: Vec<_> = tile.pixels().collect();
        assert_eq!(pixels, vec![(4, 2), (5, 2), (4, 3), (5, 3)]);
    }

    #[test]
    fn test_tile_counts_are_clamped() {
        let grid = TileGrid::new(3, 2, 8, 0);
        assert_eq!((grid.tiles_x, grid.tiles_y), (3, 1));
        assert_eq!(grid.tiles().len(), 3);
    }
}
