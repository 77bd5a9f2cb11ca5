//! Tool lifecycle, the tool variants, and the dispatching manager.
//!
//! Every tool implements the same capability set — pointer down/move/up
//! plus activate/deactivate — and mutates either the overlay (previews) or
//! the drawing layer (commits). The manager owns the registry, routes
//! pointer events to the single active tool, and throttles move events the
//! way the original animation-frame wrapper did: last event wins within
//! the window, and the gated event is flushed before pointer-up.

use std::str::FromStr;
use std::time::{Duration, Instant};

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::components::history::HistoryStore;
use crate::canvas::LayerStack;
use crate::error::EngineError;
use crate::geometry::{self, Point, TriangleType};
use crate::ops::fill::flood_fill;
use crate::ops::shapes::{self, Shape, ShapeStyle};
use crate::ops::text as text_ops;

// ============================================================================
// TOOL IDENTITY AND SHARED STATE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Pencil,
    Eraser,
    Fill,
    Rectangle,
    Circle,
    Line,
    Triangle,
    Select,
    Text,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Eraser => "eraser",
            ToolKind::Fill => "fill",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Line => "line",
            ToolKind::Triangle => "triangle",
            ToolKind::Select => "select",
            ToolKind::Text => "text",
        }
    }

    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Pencil,
            ToolKind::Eraser,
            ToolKind::Fill,
            ToolKind::Rectangle,
            ToolKind::Circle,
            ToolKind::Line,
            ToolKind::Triangle,
            ToolKind::Select,
            ToolKind::Text,
        ]
    }

    /// Whether the host must route pointer events through the overlay
    /// element while this tool is active. Selection and the shape tools
    /// interact with their own preview; freehand tools do not.
    pub fn needs_overlay_input(&self) -> bool {
        matches!(
            self,
            ToolKind::Select
                | ToolKind::Rectangle
                | ToolKind::Circle
                | ToolKind::Line
                | ToolKind::Triangle
        )
    }
}

impl FromStr for ToolKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EngineError::UnknownTool {
                name: s.to_string(),
            })
    }
}

/// Cursor the host should show for the active tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorIcon {
    Crosshair,
    Cell,
    Text,
}

/// Stroke configuration, applied atomically before each draw commit —
/// never partially, so no mixed-style artifacts. Caps and joins are always
/// round; that falls out of circle-stamped strokes rather than being a
/// switch.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub line_width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            line_width: 5.0,
        }
    }
}

/// Shape-tool options.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ShapeOptions {
    pub fill_shape: bool,
    pub triangle_type: TriangleType,
}

/// Text-tool options. The font is injected by the host as a loaded
/// `ab_glyph` handle; the engine never enumerates system fonts.
#[derive(Clone)]
pub struct TextOptions {
    pub font: Option<FontArc>,
    pub size: f32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font: None,
            size: 24.0,
        }
    }
}

/// Everything a tool may touch while handling an event. Borrowed fresh for
/// each dispatch; tools never hold surface references across events.
pub struct ToolCtx<'a> {
    pub layers: &'a mut LayerStack,
    pub history: &'a mut HistoryStore,
    pub style: &'a StrokeStyle,
    pub shape: &'a ShapeOptions,
    pub text: &'a TextOptions,
}

// ============================================================================
// TOOL TRAIT
// ============================================================================

pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn activate(&mut self, _ctx: &mut ToolCtx<'_>) {}

    /// Called when the tool stops being active. Tools with uncommitted
    /// state (floating selection, mid-gesture stroke) settle it here so a
    /// tool switch can never corrupt the drawing layer.
    fn deactivate(&mut self, _ctx: &mut ToolCtx<'_>) {}

    fn on_pointer_down(&mut self, _ctx: &mut ToolCtx<'_>, _point: Point) {}

    fn on_pointer_move(&mut self, _ctx: &mut ToolCtx<'_>, _point: Point) {}

    fn on_pointer_up(&mut self, _ctx: &mut ToolCtx<'_>, _point: Point) {}

    /// Commit any uncommitted result to the drawing layer (host Enter).
    fn commit(&mut self, _ctx: &mut ToolCtx<'_>) {}

    /// Discard any uncommitted result and restore prior state (host Escape).
    fn cancel(&mut self, _ctx: &mut ToolCtx<'_>) {}

    /// Render a finalized text run. Returns `Ok(false)` for every tool but
    /// the text tool, which reports errors such as a missing font.
    fn apply_text(&mut self, _ctx: &mut ToolCtx<'_>, _text: &str) -> Result<bool, EngineError> {
        Ok(false)
    }

    fn cursor(&self) -> CursorIcon {
        CursorIcon::Crosshair
    }
}

// ============================================================================
// PENCIL / ERASER — circle-stamped freehand strokes
// ============================================================================

/// Shared freehand implementation. The pencil paints with the current
/// stroke style; the eraser paints in "clear" compositing mode, dropping
/// destination alpha instead of writing a color. Both stamp along the
/// segment densely enough that no width leaves gaps.
struct StrokeTool {
    kind: ToolKind,
    erase: bool,
    gesture_active: bool,
    last: Option<Point>,
}

impl StrokeTool {
    fn pencil() -> Self {
        Self {
            kind: ToolKind::Pencil,
            erase: false,
            gesture_active: false,
            last: None,
        }
    }

    fn eraser() -> Self {
        Self {
            kind: ToolKind::Eraser,
            erase: true,
            gesture_active: false,
            last: None,
        }
    }

    fn stamp_segment(&self, ctx: &mut ToolCtx<'_>, from: Point, to: Point) {
        let radius = (ctx.style.line_width * 0.5).max(0.5);
        let color = ctx.style.color.to_f32(1.0);
        let drawing = ctx.layers.drawing_mut();
        for point in geometry::interpolate(from, to) {
            drawing.stamp_circle(point.x, point.y, radius, color, self.erase);
        }
    }
}

impl Tool for StrokeTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        self.gesture_active = true;
        // Stamp immediately so a click without movement leaves a dot.
        self.stamp_segment(ctx, point, point);
        self.last = Some(point);
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        if !self.gesture_active {
            return;
        }
        let from = self.last.unwrap_or(point);
        self.stamp_segment(ctx, from, point);
        self.last = Some(point);
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        if !self.gesture_active {
            return;
        }
        let from = self.last.unwrap_or(point);
        self.stamp_segment(ctx, from, point);
        self.gesture_active = false;
        self.last = None;
        ctx.history.capture(ctx.layers.drawing());
    }

    fn deactivate(&mut self, ctx: &mut ToolCtx<'_>) {
        // A tool switch mid-gesture ends the stroke where it stands.
        if self.gesture_active {
            self.gesture_active = false;
            self.last = None;
            ctx.history.capture(ctx.layers.drawing());
        }
    }

    fn cursor(&self) -> CursorIcon {
        if self.erase { CursorIcon::Cell } else { CursorIcon::Crosshair }
    }
}

// ============================================================================
// FILL — single-shot flood fill
// ============================================================================

struct FillTool;

impl Tool for FillTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Fill
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        if point.x < 0.0 || point.y < 0.0 {
            return;
        }
        let x = point.x as u32;
        let y = point.y as u32;
        let fill = ctx.style.color.rgba(255);
        // Capture only when pixels actually changed; a fill onto its own
        // color must not create an undo entry.
        if flood_fill(ctx.layers.drawing_mut(), x, y, fill) {
            ctx.history.capture(ctx.layers.drawing());
        }
    }
}

// ============================================================================
// SHAPE TOOLS — overlay preview, drawing-layer commit
// ============================================================================

struct ShapeTool {
    kind: ToolKind,
    start: Option<Point>,
}

impl ShapeTool {
    fn new(kind: ToolKind) -> Self {
        Self { kind, start: None }
    }

    fn build(&self, ctx: &ToolCtx<'_>, start: Point, current: Point) -> Shape {
        match self.kind {
            ToolKind::Rectangle => {
                let (min, max) = geometry::rect_corners(start, current);
                Shape::Rectangle { min, max }
            }
            ToolKind::Circle => Shape::Circle {
                center: start,
                radius: geometry::distance(start, current),
            },
            ToolKind::Line => Shape::Line {
                from: start,
                to: current,
            },
            _ => Shape::Triangle {
                points: geometry::triangle_points(ctx.shape.triangle_type, start, current),
            },
        }
    }

    fn style(&self, ctx: &ToolCtx<'_>, preview: bool) -> ShapeStyle {
        // Previews carry the identical stroke; only the fill is dimmed so a
        // live preview cannot be mistaken for committed content.
        let fill_alpha = if preview { 0.5 } else { 1.0 };
        ShapeStyle {
            stroke: ctx.style.color.to_f32(1.0),
            stroke_width: ctx.style.line_width,
            fill: ctx
                .shape
                .fill_shape
                .then(|| ctx.style.color.to_f32(fill_alpha)),
            anti_alias: true,
        }
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn on_pointer_down(&mut self, _ctx: &mut ToolCtx<'_>, point: Point) {
        self.start = Some(point);
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        let Some(start) = self.start else {
            return;
        };
        let shape = self.build(ctx, start, point);
        let style = self.style(ctx, true);
        let overlay = ctx.layers.overlay_mut();
        overlay.clear();
        shapes::draw_shape(overlay, &shape, &style);
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        let Some(start) = self.start.take() else {
            return;
        };
        let shape = self.build(ctx, start, point);
        let style = self.style(ctx, false);
        ctx.layers.overlay_mut().clear();
        shapes::draw_shape(ctx.layers.drawing_mut(), &shape, &style);
        ctx.history.capture(ctx.layers.drawing());
    }

    fn deactivate(&mut self, ctx: &mut ToolCtx<'_>) {
        if self.start.take().is_some() {
            ctx.layers.overlay_mut().clear();
        }
    }

    fn cancel(&mut self, ctx: &mut ToolCtx<'_>) {
        self.deactivate(ctx);
    }
}

// ============================================================================
// SELECTION — capture / move / commit protocol
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum SelectPhase {
    #[default]
    Idle,
    Dragging,
    Floating,
    Moving,
}

/// A cut-out region hovering on the overlay: the captured content follows
/// the pointer, the background copy waits to restore the origin on cancel.
struct FloatingSelection {
    x: f32,
    y: f32,
    origin_x: u32,
    origin_y: u32,
    width: u32,
    height: u32,
    content: RgbaImage,
    background: RgbaImage,
}

impl FloatingSelection {
    fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width as f32
            && point.y >= self.y
            && point.y < self.y + self.height as f32
    }

    /// Shift by a pointer delta, clamped so the region never leaves the
    /// canvas.
    fn shift(&mut self, dx: f32, dy: f32, canvas_w: u32, canvas_h: u32) {
        let max_x = (canvas_w.saturating_sub(self.width)) as f32;
        let max_y = (canvas_h.saturating_sub(self.height)) as f32;
        self.x = (self.x + dx).clamp(0.0, max_x);
        self.y = (self.y + dy).clamp(0.0, max_y);
    }
}

#[derive(Default)]
struct SelectTool {
    phase: SelectPhase,
    drag_from: Option<Point>,
    grab: Option<Point>,
    floating: Option<FloatingSelection>,
}

const SELECTION_DASH_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

impl SelectTool {
    fn redraw_floating(&self, ctx: &mut ToolCtx<'_>) {
        let Some(f) = &self.floating else {
            return;
        };
        let overlay = ctx.layers.overlay_mut();
        overlay.clear();
        overlay.blit(&f.content, f.x.round() as i64, f.y.round() as i64);
        shapes::draw_dashed_rect(
            overlay,
            Point::new(f.x, f.y),
            Point::new(f.x + f.width as f32 - 1.0, f.y + f.height as f32 - 1.0),
            SELECTION_DASH_COLOR,
        );
    }

    fn finish_drag(&mut self, ctx: &mut ToolCtx<'_>, from: Point, to: Point) {
        self.phase = SelectPhase::Idle;
        let (min, max) = geometry::rect_corners(from, to);
        // Sub-pixel drags are a click, not a selection.
        if max.x - min.x < 1.0 || max.y - min.y < 1.0 {
            ctx.layers.overlay_mut().clear();
            return;
        }
        let canvas_w = ctx.layers.width();
        let canvas_h = ctx.layers.height();
        let x0 = (min.x.round().max(0.0) as u32).min(canvas_w);
        let y0 = (min.y.round().max(0.0) as u32).min(canvas_h);
        let x1 = (max.x.round().max(0.0) as u32).min(canvas_w);
        let y1 = (max.y.round().max(0.0) as u32).min(canvas_h);
        if x1 <= x0 || y1 <= y0 {
            ctx.layers.overlay_mut().clear();
            return;
        }
        let (width, height) = (x1 - x0, y1 - y0);

        let drawing = ctx.layers.drawing_mut();
        let content = drawing.copy_region(x0, y0, width, height);
        // Identical at capture time; they diverge in purpose, not pixels —
        // content travels with the pointer, background restores the origin.
        let background = content.clone();
        drawing.erase_region(x0, y0, width, height);

        self.floating = Some(FloatingSelection {
            x: x0 as f32,
            y: y0 as f32,
            origin_x: x0,
            origin_y: y0,
            width,
            height,
            content,
            background,
        });
        self.phase = SelectPhase::Floating;
        self.redraw_floating(ctx);
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        if let Some(f) = &self.floating {
            if f.contains(point) {
                self.phase = SelectPhase::Moving;
                self.grab = Some(point);
                return;
            }
            // Clicking outside the floating region settles it, then a new
            // drag begins.
            self.commit(ctx);
        }
        self.phase = SelectPhase::Dragging;
        self.drag_from = Some(point);
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        match self.phase {
            SelectPhase::Dragging => {
                let Some(from) = self.drag_from else {
                    return;
                };
                let (min, max) = geometry::rect_corners(from, point);
                let overlay = ctx.layers.overlay_mut();
                overlay.clear();
                shapes::draw_dashed_rect(overlay, min, max, SELECTION_DASH_COLOR);
            }
            SelectPhase::Moving => {
                let Some(grab) = self.grab else {
                    return;
                };
                let (dx, dy) = (point.x - grab.x, point.y - grab.y);
                let (w, h) = (ctx.layers.width(), ctx.layers.height());
                if let Some(f) = &mut self.floating {
                    f.shift(dx, dy, w, h);
                }
                self.grab = Some(point);
                self.redraw_floating(ctx);
            }
            _ => {}
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        match self.phase {
            SelectPhase::Dragging => {
                if let Some(from) = self.drag_from.take() {
                    self.finish_drag(ctx, from, point);
                }
            }
            SelectPhase::Moving => {
                self.phase = SelectPhase::Floating;
                self.grab = None;
            }
            _ => {}
        }
    }

    /// Paste the floating pixels at their current position and capture —
    /// the only point where a selection becomes part of the artwork.
    fn commit(&mut self, ctx: &mut ToolCtx<'_>) {
        if let Some(f) = self.floating.take() {
            let drawing = ctx.layers.drawing_mut();
            drawing.blit(&f.content, f.x.round() as i64, f.y.round() as i64);
            ctx.layers.overlay_mut().clear();
            ctx.history.capture(ctx.layers.drawing());
        } else if self.phase == SelectPhase::Dragging {
            ctx.layers.overlay_mut().clear();
        }
        self.phase = SelectPhase::Idle;
        self.drag_from = None;
        self.grab = None;
    }

    /// Put the background back at the origin, discarding the move. The
    /// drawing layer ends exactly as it was before the drag, so nothing is
    /// captured.
    fn cancel(&mut self, ctx: &mut ToolCtx<'_>) {
        if let Some(f) = self.floating.take() {
            let drawing = ctx.layers.drawing_mut();
            drawing.blit(&f.background, f.origin_x as i64, f.origin_y as i64);
        }
        ctx.layers.overlay_mut().clear();
        self.phase = SelectPhase::Idle;
        self.drag_from = None;
        self.grab = None;
    }

    fn deactivate(&mut self, ctx: &mut ToolCtx<'_>) {
        self.commit(ctx);
    }
}

// ============================================================================
// TEXT
// ============================================================================

struct TextTool {
    anchor: Option<Point>,
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn on_pointer_down(&mut self, _ctx: &mut ToolCtx<'_>, point: Point) {
        // The host opens its text-entry flow; we only remember where.
        self.anchor = Some(point);
    }

    fn apply_text(&mut self, ctx: &mut ToolCtx<'_>, text: &str) -> Result<bool, EngineError> {
        if self.anchor.is_none() {
            debug!("apply_text without a recorded anchor, ignoring");
            return Ok(true);
        }
        if text.is_empty() {
            return Ok(true);
        }
        // Checked before the anchor is consumed: the host can set a font
        // and retry without asking the user to click again.
        let font = ctx.text.font.clone().ok_or(EngineError::FontUnavailable)?;
        let Some(anchor) = self.anchor.take() else {
            return Ok(true);
        };
        text_ops::draw_text(
            ctx.layers.drawing_mut(),
            &font,
            text,
            ctx.text.size,
            anchor,
            ctx.style.color.to_f32(1.0),
        );
        ctx.history.capture(ctx.layers.drawing());
        Ok(true)
    }

    fn cancel(&mut self, _ctx: &mut ToolCtx<'_>) {
        self.anchor = None;
    }

    fn deactivate(&mut self, _ctx: &mut ToolCtx<'_>) {
        self.anchor = None;
    }

    fn cursor(&self) -> CursorIcon {
        CursorIcon::Text
    }
}

// ============================================================================
// TOOL MANAGER
// ============================================================================

type ToolChangeCallback = Box<dyn FnMut(ToolKind)>;

/// Owns the registry, the single active tool, and pointer routing.
pub struct ToolManager {
    tools: Vec<Box<dyn Tool>>,
    active: Option<usize>,
    move_throttle: Duration,
    last_move_applied: Option<Instant>,
    pending_move: Option<Point>,
    last_point: Option<Point>,
    gesture_down: bool,
    on_change: Option<ToolChangeCallback>,
}

impl ToolManager {
    pub fn new(move_throttle: Duration) -> Self {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(StrokeTool::pencil()),
            Box::new(StrokeTool::eraser()),
            Box::new(FillTool),
            Box::new(ShapeTool::new(ToolKind::Rectangle)),
            Box::new(ShapeTool::new(ToolKind::Circle)),
            Box::new(ShapeTool::new(ToolKind::Line)),
            Box::new(ShapeTool::new(ToolKind::Triangle)),
            Box::new(SelectTool::default()),
            Box::new(TextTool { anchor: None }),
        ];
        Self {
            tools,
            active: None,
            move_throttle,
            last_move_applied: None,
            pending_move: None,
            last_point: None,
            gesture_down: false,
            on_change: None,
        }
    }

    pub fn active_kind(&self) -> Option<ToolKind> {
        self.active.map(|idx| self.tools[idx].kind())
    }

    pub fn cursor(&self) -> Option<CursorIcon> {
        self.active.map(|idx| self.tools[idx].cursor())
    }

    /// Whether the overlay element should receive pointer events for the
    /// current tool.
    pub fn overlay_interactive(&self) -> bool {
        self.active_kind()
            .is_some_and(|kind| kind.needs_overlay_input())
    }

    /// Register a host listener notified after every successful switch.
    pub fn set_on_change(&mut self, callback: impl FnMut(ToolKind) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Switch tools by name: deactivate the old (settling any uncommitted
    /// state), activate the new. An unknown name fails without touching the
    /// active tool — the engine is never left without one.
    pub fn set_active(
        &mut self,
        name: &str,
        ctx: &mut ToolCtx<'_>,
    ) -> Result<ToolKind, EngineError> {
        let kind = ToolKind::from_str(name)?;
        if self.active_kind() == Some(kind) {
            return Ok(kind);
        }
        if let Some(idx) = self.active {
            self.tools[idx].deactivate(ctx);
        }
        let idx = ToolKind::all()
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        self.tools[idx].activate(ctx);
        self.active = Some(idx);
        self.gesture_down = false;
        self.pending_move = None;
        debug!("active tool: {}", kind.name());
        if let Some(callback) = &mut self.on_change {
            callback(kind);
        }
        Ok(kind)
    }

    pub fn pointer_down(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        let Some(idx) = self.active else {
            return; // no active tool: events are dropped silently
        };
        self.gesture_down = true;
        self.pending_move = None;
        self.last_move_applied = None;
        self.last_point = Some(point);
        self.tools[idx].on_pointer_down(ctx, point);
    }

    pub fn pointer_move(&mut self, ctx: &mut ToolCtx<'_>, point: Point, now: Instant) {
        let Some(idx) = self.active else {
            return;
        };
        self.last_point = Some(point);
        if let Some(applied) = self.last_move_applied {
            if now.duration_since(applied) < self.move_throttle {
                // Inside the window: remember it, latest wins.
                self.pending_move = Some(point);
                return;
            }
        }
        self.last_move_applied = Some(now);
        self.pending_move = None;
        self.tools[idx].on_pointer_move(ctx, point);
    }

    pub fn pointer_up(&mut self, ctx: &mut ToolCtx<'_>, point: Point) {
        let Some(idx) = self.active else {
            return;
        };
        // Flush the gated move so the gesture endpoint is never lost.
        if let Some(pending) = self.pending_move.take() {
            self.tools[idx].on_pointer_move(ctx, pending);
        }
        self.tools[idx].on_pointer_up(ctx, point);
        self.gesture_down = false;
        self.last_point = Some(point);
    }

    /// The pointer left the canvas mid-gesture: treat it as a pointer-up at
    /// the last known position so no tool is stuck "drawing".
    pub fn pointer_leave(&mut self, ctx: &mut ToolCtx<'_>) {
        if !self.gesture_down {
            return;
        }
        if let Some(point) = self.pending_move.take().or(self.last_point) {
            self.pointer_up(ctx, point);
        } else {
            self.gesture_down = false;
        }
    }

    pub fn commit_active(&mut self, ctx: &mut ToolCtx<'_>) {
        if let Some(idx) = self.active {
            self.tools[idx].commit(ctx);
        }
    }

    pub fn cancel_active(&mut self, ctx: &mut ToolCtx<'_>) {
        if let Some(idx) = self.active {
            self.tools[idx].cancel(ctx);
        }
    }

    pub fn apply_text(&mut self, ctx: &mut ToolCtx<'_>, text: &str) -> Result<(), EngineError> {
        if let Some(idx) = self.active {
            self.tools[idx].apply_text(ctx, text)?;
        }
        Ok(())
    }
}
