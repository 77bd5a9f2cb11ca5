//! Glyph-run rendering for the text tool.
//!
//! The engine's responsibility ends at rasterizing a finalized string onto
//! the drawing layer; collecting the string, font choice, and size is the
//! host's modal flow. Shaping is a single kerned left-to-right pass — the
//! platform text primitive here is `ab_glyph` outline coverage.

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};

use crate::canvas::Surface;
use crate::geometry::Point;

/// Rasterize `text` with its baseline starting at `anchor`. Multi-line text
/// advances one line-height per `\n`. `color` carries alpha in `[0, 1]`.
pub fn draw_text(
    surface: &mut Surface,
    font: &FontArc,
    text: &str,
    size: f32,
    anchor: Point,
    color: [f32; 4],
) {
    let scaled = font.as_scaled(size);
    let line_height = scaled.height() + scaled.line_gap();

    for (line_idx, line) in text.split('\n').enumerate() {
        let baseline_y = anchor.y + line_idx as f32 * line_height;
        let mut caret_x = anchor.x;
        let mut last: Option<GlyphId> = None;

        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = last {
                caret_x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(size, point(caret_x, baseline_y));
            if let Some(outline) = font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, coverage| {
                    let px = bounds.min.x + gx as f32;
                    let py = bounds.min.y + gy as f32;
                    if px < 0.0 || py < 0.0 || coverage <= 0.0 {
                        return;
                    }
                    surface.blend_pixel(
                        px as u32,
                        py as u32,
                        [color[0], color[1], color[2], color[3] * coverage],
                    );
                });
            }
            caret_x += scaled.h_advance(id);
            last = Some(id);
        }
    }
}
