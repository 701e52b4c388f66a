use std::fmt;

/// Stable identifier of a registered texture.
///
/// Handles are assigned densely from 0 in registration order and are never
/// reused. Handle `i` indexes batch slot `i` in every render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the current frame is in the compositing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    /// Batches reset, accepting geometry.
    #[default]
    Cleared,
    GroundComposited,
    LayersDrawn,
    /// Presented into the final target. The next `clear()` starts a new frame.
    Displayed,
}

/// Per-frame counters, reset by `clear()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Non-empty batch submissions (ground flush + scene layers).
    pub draw_calls: usize,
    /// The share of `draw_calls` spent flushing ground decals.
    pub ground_draw_calls: usize,
    /// Quads accepted through `add_quad` this frame.
    pub quads: usize,
    pub shadow_casters: usize,
    /// Whether a light map was multiplied over the scene.
    pub lit: bool,
}
