//! rasterpad — a headless raster drawing engine.
//!
//! Four cooperating layer surfaces (transparency checkerboard, opaque
//! backdrop, the persisted drawing layer, and an ephemeral overlay), a
//! pointer-driven tool state machine, a bounded snapshot history, and a
//! flood-fill engine. The [`editor::Editor`] façade is the whole public
//! contract; UI chrome adapts its surfaces to real widgets and feeds it
//! pointer events.

pub mod canvas;
pub mod color;
pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod ops;

pub use canvas::{LayerStack, Surface};
pub use color::Color;
pub use components::history::{CanvasSnapshot, HistoryStore};
pub use components::tools::{
    CursorIcon, ShapeOptions, StrokeStyle, TextOptions, ToolKind, ToolManager,
};
pub use config::EngineConfig;
pub use editor::{Editor, EngineHandle};
pub use error::EngineError;
pub use geometry::{Point, TriangleType};
