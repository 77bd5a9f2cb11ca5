//! Layer surfaces: the four same-sized raster buffers the engine draws on.
//!
//! Stacking order, bottom to top:
//! 1. `checker` — fixed-tile two-tone pattern indicating transparency
//! 2. `white`   — opaque backdrop for non-transparent export
//! 3. `drawing` — the only persisted, snapshotted, undo-tracked layer
//! 4. `overlay` — ephemeral previews and the floating selection
//!
//! Backgrounds are regenerated (never scaled) on resize; the drawing layer
//! is preserved with an aspect-preserving, centered letterbox scale.

use image::{imageops, Rgba, RgbaImage};
use log::{debug, warn};
use rayon::prelude::*;

use crate::error::EngineError;

/// Edge length of one checkerboard tile in pixels, independent of canvas size.
pub const CHECKER_TILE: u32 = 10;

const CHECKER_LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CHECKER_DARK: Rgba<u8> = Rgba([204, 204, 204, 255]);
const OPAQUE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// SURFACE — the abstract render target
// ============================================================================

/// A single raster surface. Everything above this type draws through its
/// pixel read/write, clear, blit and stamp operations — never through a
/// platform widget.
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.as_mut().fill(0);
    }

    /// Fill the whole surface with one color.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// Read one pixel. Out-of-bounds reads return transparent rather than
    /// panicking — callers sampling along clipped strokes rely on this.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        if x < self.width() && y < self.height() {
            *self.pixels.get_pixel(x, y)
        } else {
            TRANSPARENT
        }
    }

    /// Overwrite one pixel. Out-of-bounds writes are dropped.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.pixels.put_pixel(x, y, color);
        }
    }

    /// Flat RGBA bytes, row-major.
    pub fn raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn raw_mut(&mut self) -> &mut [u8] {
        self.pixels.as_mut()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Source-over blend of a single pixel. `src` carries alpha in `[0, 1]`.
    pub fn blend_pixel(&mut self, x: u32, y: u32, src: [f32; 4]) {
        if x >= self.width() || y >= self.height() || src[3] <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        let sa = src[3].min(1.0);
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            *dst = TRANSPARENT;
            return;
        }
        for c in 0..3 {
            let sc = src[c] * 255.0;
            let dc = dst[c] as f32;
            dst[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Scale a pixel's alpha by `1 - coverage` — the "clear" compositing mode
    /// the eraser paints with. Color channels are left alone so partially
    /// erased anti-aliased pixels keep their hue.
    pub fn erase_pixel(&mut self, x: u32, y: u32, coverage: f32) {
        if x >= self.width() || y >= self.height() || coverage <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        let a = dst[3] as f32 * (1.0 - coverage.min(1.0));
        dst[3] = a.round() as u8;
    }

    /// Stamp one anti-aliased round brush dab. `color` carries alpha in
    /// `[0, 1]`; with `erase` set the dab clears alpha instead of painting.
    /// Sub-pixel centers are honored so dense stamping yields smooth strokes.
    pub fn stamp_circle(&mut self, cx: f32, cy: f32, radius: f32, color: [f32; 4], erase: bool) {
        let r = radius.max(0.5);
        let min_x = (cx - r - 1.0).floor().max(0.0) as u32;
        let min_y = (cy - r - 1.0).floor().max(0.0) as u32;
        let max_x = ((cx + r + 1.0).ceil() as i64).clamp(0, self.width() as i64) as u32;
        let max_y = ((cy + r + 1.0).ceil() as i64).clamp(0, self.height() as i64) as u32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                // One-pixel anti-aliased rim.
                let coverage = (r + 0.5 - dist).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                if erase {
                    self.erase_pixel(x, y, coverage);
                } else {
                    self.blend_pixel(x, y, [color[0], color[1], color[2], color[3] * coverage]);
                }
            }
        }
    }

    /// Copy a rectangular region out, clamped to the surface bounds.
    pub fn copy_region(&self, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
        let x1 = (x + width).min(self.width());
        let y1 = (y + height).min(self.height());
        let x0 = x.min(x1);
        let y0 = y.min(y1);
        let mut out = RgbaImage::from_pixel(x1 - x0, y1 - y0, TRANSPARENT);
        for (oy, sy) in (y0..y1).enumerate() {
            for (ox, sx) in (x0..x1).enumerate() {
                out.put_pixel(ox as u32, oy as u32, *self.pixels.get_pixel(sx, sy));
            }
        }
        out
    }

    /// Overwrite a region with `src` placed at `(x, y)`, clipping at the
    /// edges. Alpha is copied verbatim (not blended) — this is the paste
    /// primitive for selection content and background restoration.
    pub fn blit(&mut self, src: &RgbaImage, x: i64, y: i64) {
        for (sx, sy, px) in src.enumerate_pixels() {
            let dx = x + sx as i64;
            let dy = y + sy as i64;
            if dx >= 0 && dy >= 0 && (dx as u32) < self.width() && (dy as u32) < self.height() {
                self.pixels.put_pixel(dx as u32, dy as u32, *px);
            }
        }
    }

    /// Clear a rectangular region to transparent — the destructive cut a
    /// selection capture performs.
    pub fn erase_region(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x1 = (x + width).min(self.width());
        let y1 = (y + height).min(self.height());
        for sy in y.min(y1)..y1 {
            for sx in x.min(x1)..x1 {
                self.pixels.put_pixel(sx, sy, TRANSPARENT);
            }
        }
    }

    /// Replace the surface's content wholesale. Used by snapshot restore;
    /// a length mismatch is a programming error upstream and is dropped
    /// with a warning rather than corrupting the buffer.
    pub(crate) fn set_content(&mut self, width: u32, height: u32, data: &[u8]) {
        if data.len() != width as usize * height as usize * 4 {
            warn!(
                "set_content: {} bytes for {}×{} surface, ignoring",
                data.len(),
                width,
                height
            );
            return;
        }
        match RgbaImage::from_raw(width, height, data.to_vec()) {
            Some(img) => self.pixels = img,
            None => warn!("set_content: buffer rejected for {}×{}", width, height),
        }
    }

    /// Clear, then draw `src` scaled by `min(w_ratio, h_ratio)` and centered:
    /// the aspect-preserving letterbox used by both resize and image import.
    pub fn replace_with_letterboxed(&mut self, src: &RgbaImage) {
        self.clear();
        if src.width() == 0 || src.height() == 0 {
            return;
        }
        if src.width() == self.width() && src.height() == self.height() {
            self.pixels.copy_from_slice(src.as_raw());
            return;
        }
        let scale = (self.width() as f32 / src.width() as f32)
            .min(self.height() as f32 / src.height() as f32);
        let nw = ((src.width() as f32 * scale).round() as u32).max(1);
        let nh = ((src.height() as f32 * scale).round() as u32).max(1);
        let scaled = imageops::resize(src, nw, nh, imageops::FilterType::Triangle);
        let off_x = (self.width() as i64 - nw as i64) / 2;
        let off_y = (self.height() as i64 - nh as i64) / 2;
        self.blit(&scaled, off_x, off_y);
    }
}

// ============================================================================
// LAYER STACK
// ============================================================================

/// The four cooperating surfaces, always identically sized.
pub struct LayerStack {
    width: u32,
    height: u32,
    checker: Surface,
    white: Surface,
    drawing: Surface,
    overlay: Surface,
}

impl LayerStack {
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        let mut stack = Self {
            width,
            height,
            checker: Surface::new(width, height),
            white: Surface::new(width, height),
            drawing: Surface::new(width, height),
            overlay: Surface::new(width, height),
        };
        stack.regenerate_backgrounds();
        Ok(stack)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn drawing(&self) -> &Surface {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut Surface {
        &mut self.drawing
    }

    pub fn overlay(&self) -> &Surface {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Surface {
        &mut self.overlay
    }

    pub fn checker(&self) -> &Surface {
        &self.checker
    }

    pub fn white(&self) -> &Surface {
        &self.white
    }

    /// Repaint the transparency checkerboard at its fixed tile size. The
    /// pattern must read as "nothing here", so it never scales with the
    /// canvas and is never part of a composite export.
    pub fn draw_checkerboard(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = ((x / CHECKER_TILE) + (y / CHECKER_TILE)) % 2;
                let color = if tile == 0 { CHECKER_LIGHT } else { CHECKER_DARK };
                self.checker.put_pixel(x, y, color);
            }
        }
    }

    fn regenerate_backgrounds(&mut self) {
        self.draw_checkerboard();
        self.white.fill(OPAQUE_WHITE);
    }

    /// Resize every layer atomically.
    ///
    /// Drawing-layer content is preserved: uniformly scaled by the smaller
    /// of the width/height ratios and centered (letterbox, not stretch).
    /// Backgrounds are regenerated at the new size; the overlay is cleared
    /// because previews are not meaningful across a resize.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(());
        }
        debug!(
            "resize {}×{} → {}×{}",
            self.width, self.height, width, height
        );
        let old_drawing = self.drawing.image().clone();

        self.checker = Surface::new(width, height);
        self.white = Surface::new(width, height);
        self.overlay = Surface::new(width, height);
        self.drawing = Surface::new(width, height);
        self.width = width;
        self.height = height;

        self.regenerate_backgrounds();
        self.drawing.replace_with_letterboxed(&old_drawing);
        Ok(())
    }

    /// Flatten for export: the drawing layer over the white backdrop in
    /// opaque mode, or the drawing layer with its alpha intact in
    /// transparent mode. Pixel-accurate; encoding is the caller's job.
    pub fn composite(&self, transparent_background: bool) -> RgbaImage {
        if transparent_background {
            return self.drawing.image().clone();
        }
        let mut out = self.white.image().clone();
        let drawing = self.drawing.raw();
        let row_bytes = self.width as usize * 4;
        out.as_mut()
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(row, out_row)| {
                let src_row = &drawing[row * row_bytes..(row + 1) * row_bytes];
                for px in 0..self.width as usize {
                    let o = px * 4;
                    let sa = src_row[o + 3] as f32 / 255.0;
                    if sa <= 0.0 {
                        continue;
                    }
                    for c in 0..3 {
                        let sc = src_row[o + c] as f32;
                        let dc = out_row[o + c] as f32;
                        out_row[o + c] = (sc * sa + dc * (1.0 - sa)).round() as u8;
                    }
                    out_row[o + 3] = 255;
                }
            });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(LayerStack::new(0, 100).is_err());
        let mut stack = LayerStack::new(100, 100).unwrap();
        assert!(stack.resize(100, 0).is_err());
        // Prior dimensions retained after the rejected resize.
        assert_eq!(stack.width(), 100);
        assert_eq!(stack.height(), 100);
    }

    #[test]
    fn checkerboard_uses_fixed_tiles() {
        let stack = LayerStack::new(40, 40).unwrap();
        assert_eq!(stack.checker().pixel(0, 0), CHECKER_LIGHT);
        assert_eq!(stack.checker().pixel(CHECKER_TILE, 0), CHECKER_DARK);
        assert_eq!(
            stack.checker().pixel(CHECKER_TILE, CHECKER_TILE),
            CHECKER_LIGHT
        );
    }

    #[test]
    fn resize_letterboxes_drawing_content() {
        let mut stack = LayerStack::new(100, 100).unwrap();
        stack.drawing_mut().fill(Rgba([10, 20, 30, 255]));
        stack.resize(300, 500).unwrap();
        // Scale is min(3, 5) = 3: a 300×300 block centered vertically.
        assert_eq!(stack.drawing().pixel(150, 250), Rgba([10, 20, 30, 255]));
        assert_eq!(stack.drawing().pixel(150, 40), Rgba([0, 0, 0, 0]));
        assert_eq!(stack.drawing().pixel(150, 460), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn composite_modes() {
        let mut stack = LayerStack::new(10, 10).unwrap();
        stack.drawing_mut().put_pixel(3, 3, Rgba([255, 0, 0, 255]));

        let opaque = stack.composite(false);
        assert_eq!(*opaque.get_pixel(3, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(*opaque.get_pixel(0, 0), Rgba([255, 255, 255, 255]));

        let transparent = stack.composite(true);
        assert_eq!(*transparent.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn half_transparent_pixels_flatten_over_white() {
        let mut stack = LayerStack::new(4, 4).unwrap();
        stack.drawing_mut().put_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let opaque = stack.composite(false);
        let px = opaque.get_pixel(1, 1);
        // Black at ~50% over white lands mid-gray.
        assert!(px[0] > 120 && px[0] < 135, "got {px:?}");
        assert_eq!(px[3], 255);
    }
}
