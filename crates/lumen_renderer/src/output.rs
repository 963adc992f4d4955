//! Image output: the sink trait plus PPM and `image`-crate writers.

use std::io::Write;
use std::path::PathBuf;

use image::{Rgb, RgbImage};

use crate::frame::Pixel;
use crate::{Color, RenderError, RenderResult};

/// Receives a finished frame one pixel at a time.
///
/// Pixels arrive in raster order: rows from top to bottom, each row left to
/// right, after a single `begin` and before a single `finish`.
pub trait OutputSink {
    fn begin(&mut self, width: u32, height: u32) -> RenderResult<()>;

    fn write_pixel(&mut self, pixel: Pixel) -> RenderResult<()>;

    fn finish(&mut self) -> RenderResult<()>;
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit sRGB-ish bytes.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let byte = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [byte(color.x), byte(color.y), byte(color.z)]
}

/// Plain-text PPM (P3) writer.
pub struct PpmSink<W: Write> {
    writer: W,
}

impl<W: Write> PpmSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for PpmSink<W> {
    fn begin(&mut self, width: u32, height: u32) -> RenderResult<()> {
        writeln!(self.writer, "P3\n{width} {height}\n255")?;
        Ok(())
    }

    fn write_pixel(&mut self, pixel: Pixel) -> RenderResult<()> {
        let [r, g, b] = color_to_rgb8(pixel.color);
        writeln!(self.writer, "{r} {g} {b}")?;
        Ok(())
    }

    fn finish(&mut self) -> RenderResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects the frame into an [`RgbImage`] and saves it on `finish`.
///
/// The file format follows the path's extension.
pub struct ImageSink {
    path: PathBuf,
    image: Option<RgbImage>,
    next: u32,
}

impl ImageSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            image: None,
            next: 0,
        }
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }
}

impl OutputSink for ImageSink {
    fn begin(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.image = Some(RgbImage::new(width, height));
        self.next = 0;
        Ok(())
    }

    fn write_pixel(&mut self, pixel: Pixel) -> RenderResult<()> {
        let image = self
            .image
            .as_mut()
            .ok_or_else(|| RenderError::Output("write_pixel called before begin".into()))?;

        let (width, height) = image.dimensions();
        let (x, row) = (self.next % width, self.next / width);
        if row >= height {
            return Err(RenderError::Output(format!(
                "more than {width}x{height} pixels written"
            )));
        }

        // Raster order already runs top to bottom, like image rows.
        image.put_pixel(x, row, Rgb(color_to_rgb8(pixel.color)));
        self.next += 1;
        Ok(())
    }

    fn finish(&mut self) -> RenderResult<()> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| RenderError::Output("finish called before begin".into()))?;
        image.save(&self.path)?;
        log::info!("Saved {}x{} image to {}", image.width(), image.height(), self.path.display());
        Ok(())
    }
}
