use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine configuration — a plain value object the host constructs once and
/// may persist alongside its own settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial canvas width in pixels.
    pub width: u32,
    /// Initial canvas height in pixels.
    pub height: u32,
    /// Smallest allowed canvas edge. Resizes clamp to this.
    pub min_dim: u32,
    /// Largest allowed canvas edge. Resizes clamp to this.
    pub max_dim: u32,
    /// When set, both canvas dimensions are forced to `min(width, height)`
    /// before and after bounds clamping.
    pub square_lock: bool,
    /// Undo depth: the history store keeps at most this many full snapshots
    /// and evicts the oldest first. Memory cost is
    /// `max_undo_steps × width × height × 4` bytes at the top end.
    pub max_undo_steps: usize,
    /// Optional hard cap on history memory in bytes. `None` keeps the full
    /// `max_undo_steps` depth regardless of canvas size.
    pub max_history_bytes: Option<usize>,
    /// Window for coalescing responsive-resize requests. Only the last
    /// request inside the window is applied.
    pub resize_debounce: Duration,
    /// Minimum interval between processed pointer-move events. The last
    /// gated move always wins; it is flushed before pointer-up.
    pub move_throttle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            min_dim: 50,
            max_dim: 4096,
            square_lock: false,
            max_undo_steps: 50,
            max_history_bytes: None,
            resize_debounce: Duration::from_millis(150),
            move_throttle: Duration::from_millis(8),
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 || self.min_dim == 0 || self.min_dim > self.max_dim
        {
            return Err(EngineError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Apply the square lock and dimension bounds to a requested size.
    ///
    /// The lock is applied both before and after clamping so that clamping
    /// can never reintroduce a non-square result.
    pub fn clamp_dims(&self, width: u32, height: u32) -> (u32, u32) {
        let (mut w, mut h) = if self.square_lock {
            let side = width.min(height);
            (side, side)
        } else {
            (width, height)
        };
        w = w.clamp(self.min_dim, self.max_dim);
        h = h.clamp(self.min_dim, self.max_dim);
        if self.square_lock {
            let side = w.min(h);
            (side, side)
        } else {
            (w, h)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_lock_survives_clamping() {
        let config = EngineConfig {
            square_lock: true,
            ..Default::default()
        };
        assert_eq!(config.clamp_dims(300, 500), (300, 300));
        // A lock request below the minimum clamps to a square minimum.
        assert_eq!(config.clamp_dims(10, 900), (50, 50));
        // Above the maximum on one axis only.
        assert_eq!(config.clamp_dims(9000, 5000), (4096, 4096));
    }

    #[test]
    fn unlocked_dims_clamp_independently() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_dims(300, 500), (300, 500));
        assert_eq!(config.clamp_dims(10, 5000), (50, 4096));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let config = EngineConfig {
            width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
