use glam::{UVec2, Vec2};

/// Camera state for the offscreen render targets.
///
/// The render size is the window size multiplied by the quality factor, fixed
/// at construction. Only the focus point (camera center in world space) moves.
/// World units map 1:1 onto render-target pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    render_size: UVec2,
    quality: f32,
    focus: Vec2,
}

impl Viewport {
    pub fn new(render_size: UVec2, quality: f32) -> Self {
        Self {
            render_size,
            quality,
            focus: Vec2::ZERO,
        }
    }

    /// Offscreen target size in pixels.
    pub fn render_size(&self) -> UVec2 {
        self.render_size
    }

    pub fn half_size(&self) -> Vec2 {
        self.render_size.as_vec2() * 0.5
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Scale applied when blitting the offscreen scene back to the window.
    pub fn upscale(&self) -> f32 {
        1.0 / self.quality
    }

    pub fn focus(&self) -> Vec2 {
        self.focus
    }

    /// Replace the camera center. No smoothing is applied.
    pub fn set_focus(&mut self, focus: Vec2) {
        self.focus = focus;
    }

    /// Translation from world space to render-target space: `render_size / 2 - focus`.
    ///
    /// Recomputed on every call; do not hold on to it across a `set_focus`.
    pub fn screen_offset(&self) -> Vec2 {
        self.half_size() - self.focus
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world + self.screen_offset()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen - self.screen_offset()
    }

    /// Position relative to the camera center, the space the culler tests in.
    pub fn relative_to_focus(&self, world: Vec2) -> Vec2 {
        world - self.focus
    }
}
