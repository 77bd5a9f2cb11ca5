//! The engine façade: everything UI chrome and persistence collaborators
//! are allowed to touch.
//!
//! All mutation happens synchronously inside these calls on the caller's
//! thread; handlers run to completion before the next event, so the drawing
//! layer needs no locking. The only timer-like behavior is the resize
//! debounce, which is polled, never background-driven.

use std::path::Path;
use std::time::Instant;

use ab_glyph::FontArc;
use image::RgbaImage;
use log::{debug, info};

use crate::canvas::LayerStack;
use crate::color::Color;
use crate::components::history::HistoryStore;
use crate::components::tools::{
    CursorIcon, ShapeOptions, StrokeStyle, TextOptions, ToolCtx, ToolKind, ToolManager,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::{Point, TriangleType};

/// A coalesced responsive-resize request; only the last one inside the
/// debounce window survives to be applied.
struct PendingResize {
    width: u32,
    height: u32,
    deadline: Instant,
}

macro_rules! tool_ctx {
    ($self:ident) => {
        ToolCtx {
            layers: &mut $self.layers,
            history: &mut $self.history,
            style: &$self.style,
            shape: &$self.shape_options,
            text: &$self.text_options,
        }
    };
}

pub struct Editor {
    config: EngineConfig,
    layers: LayerStack,
    history: HistoryStore,
    tools: ToolManager,
    style: StrokeStyle,
    shape_options: ShapeOptions,
    text_options: TextOptions,
    pending_resize: Option<PendingResize>,
}

impl Editor {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let (width, height) = config.clamp_dims(config.width, config.height);
        let layers = LayerStack::new(width, height)?;
        let mut history =
            HistoryStore::new(config.max_undo_steps).with_memory_cap(config.max_history_bytes);
        // Baseline snapshot: the state the deepest undo lands on.
        history.capture(layers.drawing());
        info!("editor ready at {}×{}", width, height);
        Ok(Self {
            tools: ToolManager::new(config.move_throttle),
            config,
            layers,
            history,
            style: StrokeStyle::default(),
            shape_options: ShapeOptions::default(),
            text_options: TextOptions::default(),
            pending_resize: None,
        })
    }

    // ------------------------------------------------------------------
    // Dimensions and layers
    // ------------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.layers.width()
    }

    pub fn height(&self) -> u32 {
        self.layers.height()
    }

    /// Read access to the layer surfaces, for rendering hosts and tests.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    // ------------------------------------------------------------------
    // Tool switching and pointer routing
    // ------------------------------------------------------------------

    pub fn set_active_tool(&mut self, name: &str) -> Result<ToolKind, EngineError> {
        self.tools.set_active(name, &mut tool_ctx!(self))
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.tools.active_kind()
    }

    pub fn cursor(&self) -> Option<CursorIcon> {
        self.tools.cursor()
    }

    pub fn overlay_interactive(&self) -> bool {
        self.tools.overlay_interactive()
    }

    /// Notified after every successful tool switch, for UI listeners.
    pub fn on_tool_change(&mut self, callback: impl FnMut(ToolKind) + 'static) {
        self.tools.set_on_change(callback);
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.tools.pointer_down(&mut tool_ctx!(self), point);
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.tools
            .pointer_move(&mut tool_ctx!(self), point, Instant::now());
    }

    pub fn pointer_up(&mut self, point: Point) {
        self.tools.pointer_up(&mut tool_ctx!(self), point);
    }

    /// The pointer left the canvas: an implicit pointer-up, so no gesture
    /// is ever stuck "drawing".
    pub fn pointer_leave(&mut self) {
        self.tools.pointer_leave(&mut tool_ctx!(self));
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Step back one committed state. An uncommitted floating selection is
    /// cancelled first (restoring its origin) so the overlay and the
    /// drawing layer cannot fall out of step.
    pub fn undo(&mut self) -> bool {
        self.tools.cancel_active(&mut tool_ctx!(self));
        self.history.undo(self.layers.drawing_mut())
    }

    pub fn redo(&mut self) -> bool {
        self.tools.cancel_active(&mut tool_ctx!(self));
        self.history.redo(self.layers.drawing_mut())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Manual capture of the current drawing layer.
    pub fn save_state(&mut self) {
        self.history.capture(self.layers.drawing());
    }

    /// Clear the artwork and record the cleared state as a commit.
    pub fn clear_canvas(&mut self) {
        self.tools.cancel_active(&mut tool_ctx!(self));
        self.layers.overlay_mut().clear();
        self.layers.drawing_mut().clear();
        self.history.capture(self.layers.drawing());
    }

    // ------------------------------------------------------------------
    // Brush / shape / text configuration
    // ------------------------------------------------------------------

    pub fn set_color(&mut self, hex: &str) -> Result<(), EngineError> {
        self.style.color = Color::from_hex(hex)?;
        Ok(())
    }

    pub fn set_line_width(&mut self, px: f32) {
        self.style.line_width = px.clamp(1.0, 200.0);
    }

    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn set_fill_shape(&mut self, fill: bool) {
        self.shape_options.fill_shape = fill;
    }

    pub fn set_triangle_type(&mut self, kind: TriangleType) {
        self.shape_options.triangle_type = kind;
    }

    pub fn set_font(&mut self, font: FontArc) {
        self.text_options.font = Some(font);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.text_options.size = size.clamp(4.0, 400.0);
    }

    /// Render a finalized text run at the anchor recorded by the text
    /// tool's last pointer-down.
    pub fn apply_text(&mut self, text: &str) -> Result<(), EngineError> {
        self.tools.apply_text(&mut tool_ctx!(self), text)
    }

    // ------------------------------------------------------------------
    // Selection protocol (host Enter / Escape)
    // ------------------------------------------------------------------

    pub fn commit_selection(&mut self) {
        self.tools.commit_active(&mut tool_ctx!(self));
    }

    pub fn cancel_selection(&mut self) {
        self.tools.cancel_active(&mut tool_ctx!(self));
    }

    // ------------------------------------------------------------------
    // Canvas manager: resize, square lock, debounce
    // ------------------------------------------------------------------

    /// Resize immediately, honoring the square lock and dimension bounds.
    /// Returns the dimensions actually applied. Content is preserved with
    /// the centered letterbox scale; the resized state is a commit.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(u32, u32), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        self.tools.commit_active(&mut tool_ctx!(self));
        let (w, h) = self.config.clamp_dims(width, height);
        if (w, h) == (self.width(), self.height()) {
            return Ok((w, h));
        }
        self.layers.resize(w, h)?;
        self.history.capture(self.layers.drawing());
        Ok((w, h))
    }

    pub fn square_lock(&self) -> bool {
        self.config.square_lock
    }

    pub fn set_square_lock(&mut self, locked: bool) {
        self.config.square_lock = locked;
    }

    /// Queue a responsive-resize request. Requests arriving inside the
    /// debounce window replace each other; only the last is applied when
    /// the window closes.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        debug!("resize requested: {}×{}", width, height);
        self.pending_resize = Some(PendingResize {
            width,
            height,
            deadline: Instant::now() + self.config.resize_debounce,
        });
    }

    /// Apply a debounced resize whose window has closed, if any. Hosts call
    /// this from their tick; returns the applied dimensions.
    pub fn poll_resizes(&mut self) -> Result<Option<(u32, u32)>, EngineError> {
        self.poll_resizes_at(Instant::now())
    }

    /// Deterministic variant of [`poll_resizes`](Self::poll_resizes) for
    /// hosts that drive their own clock.
    pub fn poll_resizes_at(&mut self, now: Instant) -> Result<Option<(u32, u32)>, EngineError> {
        let due = self
            .pending_resize
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if !due {
            return Ok(None);
        }
        let Some(pending) = self.pending_resize.take() else {
            return Ok(None);
        };
        self.resize(pending.width, pending.height).map(Some)
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Replace the drawing layer with a decoded image, letterboxed and
    /// centered like a resize, then record the result as a commit. Decode
    /// failure leaves the drawing layer exactly as it was.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        self.apply_loaded_image(decoded);
        Ok(())
    }

    /// As [`load_image_bytes`](Self::load_image_bytes), reading from disk.
    pub fn load_image_path(&mut self, path: &Path) -> Result<(), EngineError> {
        let decoded = image::open(path)?.to_rgba8();
        self.apply_loaded_image(decoded);
        Ok(())
    }

    fn apply_loaded_image(&mut self, decoded: RgbaImage) {
        info!("loaded image {}×{}", decoded.width(), decoded.height());
        self.tools.cancel_active(&mut tool_ctx!(self));
        self.layers.overlay_mut().clear();
        self.layers.drawing_mut().replace_with_letterboxed(&decoded);
        self.history.capture(self.layers.drawing());
    }

    /// A pixel-accurate flat image for the export collaborator: the drawing
    /// layer over the opaque backdrop, or with alpha intact in transparent
    /// mode. Encoding to PNG/JPG/ICO is the collaborator's job.
    pub fn composite(&self, transparent_background: bool) -> RgbaImage {
        self.layers.composite(transparent_background)
    }
}

/// Host-side slot for an editor that is constructed only once the platform
/// surfaces exist (the usual setup order in a windowed host). Access before
/// `init` fails with [`EngineError::NotInitialized`] — surfaced to the
/// caller, never silently retried.
#[derive(Default)]
pub struct EngineHandle {
    editor: Option<Editor>,
}

impl EngineHandle {
    pub fn empty() -> Self {
        Self { editor: None }
    }

    pub fn init(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        self.editor = Some(Editor::new(config)?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.editor.is_some()
    }

    pub fn get(&self) -> Result<&Editor, EngineError> {
        self.editor.as_ref().ok_or(EngineError::NotInitialized)
    }

    pub fn get_mut(&mut self) -> Result<&mut Editor, EngineError> {
        self.editor.as_mut().ok_or(EngineError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_guards_pre_init_access() {
        let mut handle = EngineHandle::empty();
        assert!(matches!(handle.get(), Err(EngineError::NotInitialized)));
        assert!(matches!(handle.get_mut(), Err(EngineError::NotInitialized)));

        handle.init(EngineConfig::default()).unwrap();
        assert_eq!(handle.get().unwrap().width(), 800);
    }

    #[test]
    fn invalid_config_leaves_the_handle_uninitialized() {
        let mut handle = EngineHandle::empty();
        let config = EngineConfig {
            min_dim: 0,
            ..Default::default()
        };
        assert!(handle.init(config).is_err());
        assert!(!handle.is_initialized());
    }
}
