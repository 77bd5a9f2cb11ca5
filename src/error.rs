use thiserror::Error;

/// Errors surfaced by the drawing engine.
///
/// Normal-flow outcomes are deliberately *not* errors: undo/redo on an empty
/// stack, a flood fill whose target already matches the fill color, and
/// selection drags below one pixel are all defined no-ops.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Layer access was attempted before the engine was set up.
    #[error("drawing engine is not initialized")]
    NotInitialized,

    /// `set_active_tool` was called with a name no tool answers to.
    /// The previously active tool remains active.
    #[error("unknown tool {name:?}")]
    UnknownTool { name: String },

    /// A resize or construction was attempted with unusable dimensions.
    /// Nothing is applied partially; prior dimensions are retained.
    #[error("invalid canvas dimensions {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Decoding an imported image failed. The drawing layer is untouched.
    #[error("failed to load image: {0}")]
    ImageLoadFailure(#[from] image::ImageError),

    /// A color string that is not `#rrggbb`.
    #[error("invalid color {value:?} (expected #rrggbb)")]
    InvalidColor { value: String },

    /// Text was applied before a font was configured.
    #[error("no font configured for the text tool")]
    FontUnavailable,
}
