//! Offscreen PNG rendering of the gridlife world.

use gridlife_core::{Cell, Color, WorldState};
use image::{ImageBuffer, Rgba};
use std::io::Cursor;
use thiserror::Error;
use tracing::trace;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FOOD: Rgba<u8> = Rgba([34, 160, 60, 255]);

/// Errors produced while rasterizing or encoding a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cell_pixels must be positive")]
    ZeroCellPixels,
    #[error("frame of {0} pixels per side is too large")]
    TooLarge(u64),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Raster geometry of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Side length of one grid cell in pixels.
    pub cell_pixels: u32,
    /// Width of the black frame drawn around the grid.
    pub border_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cell_pixels: 4,
            border_width: 2,
        }
    }
}

impl RenderOptions {
    /// Side length of the rendered image for a grid of `size` cells.
    pub fn frame_side(&self, size: u32) -> Result<u32, RenderError> {
        if self.cell_pixels == 0 {
            return Err(RenderError::ZeroCellPixels);
        }
        let side = u64::from(size) * u64::from(self.cell_pixels) + 2 * u64::from(self.border_width);
        u32::try_from(side).map_err(|_| RenderError::TooLarge(side))
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// Draws every occupied cell of `world` and encodes the frame as PNG bytes.
pub fn render_png(world: &WorldState, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let size = world.grid().size();
    let side = options.frame_side(size)?;
    let border = options.border_width;
    let cell = options.cell_pixels;

    let mut image = ImageBuffer::from_pixel(side, side, BACKGROUND);
    for y in 0..side {
        for x in 0..side {
            if x < border || y < border || x >= side - border || y >= side - border {
                image.put_pixel(x, y, BORDER);
            }
        }
    }

    let mut painted = 0usize;
    for (idx, content) in world.grid().cells().iter().enumerate() {
        let fill = match content {
            Cell::Empty => continue,
            Cell::Food => FOOD,
            Cell::Agent(id) => match world.agent(*id) {
                Some(agent) => rgba(agent.genome().color()),
                None => continue,
            },
        };
        let cx = (idx as u32) % size;
        let cy = (idx as u32) / size;
        let (ox, oy) = (border + cx * cell, border + cy * cell);
        for dy in 0..cell {
            for dx in 0..cell {
                image.put_pixel(ox + dx, oy + dy, fill);
            }
        }
        painted += 1;
    }
    trace!(side, painted, "rasterized frame");

    let mut bytes = Vec::new();
    {
        let mut cursor = Cursor::new(&mut bytes);
        image.write_to(&mut cursor, image::ImageFormat::Png)?;
    }
    Ok(bytes)
}
