//! Frame buffer partitioned by tile.
//!
//! Pixels are stored tile-major: each tile's pixels form one contiguous run,
//! row-major inside the tile. [`FrameBuffer::tiles_mut`] hands out those runs
//! as disjoint `&mut` slices, so workers can fill their tiles without locks.

use crate::output::OutputSink;
use crate::tile::{Tile, TileGrid};
use crate::{Color, RenderResult};

/// Final value of one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pixel {
    /// Mean radiance over all samples
    pub color: Color,
    /// Number of samples averaged into `color`
    pub samples: u32,
}

impl Pixel {
    pub fn new(color: Color, samples: u32) -> Self {
        Self { color, samples }
    }
}

/// Rendered image stored tile by tile.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    grid: TileGrid,
    tiles: Vec<Tile>,
    /// Start of each tile's run in `pixels`
    offsets: Vec<usize>,
    pixels: Vec<Pixel>,
}

impl FrameBuffer {
    /// Create a black frame laid out over `grid`.
    pub fn new(grid: TileGrid) -> Self {
        let tiles = grid.tiles();
        let mut offsets = Vec::with_capacity(tiles.len());
        let mut total = 0;
        for tile in &tiles {
            offsets.push(total);
            total += tile.pixel_count();
        }

        Self {
            grid,
            tiles,
            offsets,
            pixels: vec![Pixel::default(); total],
        }
    }

    pub fn width(&self) -> u32 {
        self.grid.width
    }

    pub fn height(&self) -> u32 {
        self.grid.height
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Get the pixel at (x, y), with y = 0 the bottom row.
    ///
    /// Panics if (x, y) lies outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Pixel {
        assert!(
            x < self.width() && y < self.height(),
            "pixel ({x}, {y}) outside {}x{} frame",
            self.width(),
            self.height()
        );
        let index = self.grid.tile_index_at(x, y);
        let tile = &self.tiles[index];
        let local = (y - tile.y) as usize * tile.width as usize + (x - tile.x) as usize;
        self.pixels[self.offsets[index] + local]
    }

    /// Split the buffer into one exclusive slice per tile.
    pub fn tiles_mut(&mut self) -> Vec<(Tile, &mut [Pixel])> {
        let mut rest: &mut [Pixel] = &mut self.pixels;
        let mut out = Vec::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(tile.pixel_count());
            out.push((*tile, head));
            rest = tail;
        }
        out
    }

    /// Emit every pixel in raster order, top row first.
    pub fn write_to(&self, sink: &mut dyn OutputSink) -> RenderResult<()> {
        sink.begin(self.width(), self.height())?;
        for y in (0..self.height()).rev() {
            for x in 0..self.width() {
                sink.write_pixel(self.get(x, y))?;
            }
        }
        sink.finish()
    }
}
