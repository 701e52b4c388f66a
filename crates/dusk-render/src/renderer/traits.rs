//! Graphics backend seam.
//!
//! The pipeline never talks to a graphics API directly. Everything it needs
//! from one (textures, offscreen surfaces, quad submission, sprite blits) goes
//! through [`GraphicsBackend`]. `SoftwareBackend` is the in-tree
//! implementation; a GPU backend slots in behind the same trait.

use glam::{UVec2, Vec2};
use image::RgbaImage;

use super::vertex::{Color, Vertex};

/// Backend-side texture identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Backend-side offscreen surface identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Compositing mode for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (src-alpha, one-minus-src-alpha).
    #[default]
    Alpha,
    /// Additive blending for glow (src-alpha, one).
    Additive,
    /// Multiplies the destination by the source (light maps).
    Multiply,
    /// Overwrites the destination.
    Replace,
}

/// State for one vertex submission.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderStates {
    /// Texture to sample; `None` draws flat vertex colors.
    pub texture: Option<TextureId>,
    /// Translation applied to every vertex.
    pub offset: Vec2,
    pub blend: BlendMode,
}

impl RenderStates {
    pub fn textured(texture: TextureId) -> Self {
        Self {
            texture: Some(texture),
            ..Default::default()
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// A whole texture drawn as one axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    /// Top-left corner on the target.
    pub position: Vec2,
    /// Uniform scale applied to the texture size.
    pub scale: f32,
    pub tint: Color,
    pub blend: BlendMode,
}

impl Sprite {
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            position: Vec2::ZERO,
            scale: 1.0,
            tint: Color::WHITE,
            blend: BlendMode::Alpha,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// Graphics backend used by the render pipeline.
///
/// Ids are only valid for the backend that issued them. Passing an id that
/// was never issued is a programming error and may panic.
///
/// # Example Implementation
///
/// ```ignore
/// struct WgpuBackend {
///     device: wgpu::Device,
///     queue: wgpu::Queue,
///     // ...
/// }
///
/// impl GraphicsBackend for WgpuBackend {
///     fn backend(&self) -> &'static str { "wgpu" }
///
///     fn draw_vertices(&mut self, surface: SurfaceId, vertices: &[Vertex], states: &RenderStates) {
///         // Upload vertices, bind texture, encode a render pass...
///     }
///     // ...
/// }
/// ```
pub trait GraphicsBackend {
    /// Backend identifier (e.g. "software", "wgpu").
    fn backend(&self) -> &'static str;

    /// Upload an image as a texture. `repeated` selects wrap addressing
    /// instead of clamp, fixed for the texture's lifetime.
    fn create_texture(&mut self, image: &RgbaImage, repeated: bool) -> TextureId;

    /// Replace a texture's contents (and size).
    fn update_texture(&mut self, texture: TextureId, image: &RgbaImage);

    /// Read a texture back to the CPU.
    fn read_texture(&self, texture: TextureId) -> RgbaImage;

    fn texture_size(&self, texture: TextureId) -> UVec2;

    /// Create an offscreen render target, initially transparent.
    fn create_surface(&mut self, width: u32, height: u32) -> SurfaceId;

    /// Texture view of a surface, valid for sampling after `display`.
    fn surface_texture(&self, surface: SurfaceId) -> TextureId;

    /// Free a surface's storage. The id must not be used afterwards.
    fn release_surface(&mut self, surface: SurfaceId);

    fn clear(&mut self, surface: SurfaceId, color: Color);

    /// Draw `vertices` as consecutive quads (groups of four).
    fn draw_vertices(&mut self, surface: SurfaceId, vertices: &[Vertex], states: &RenderStates);

    fn draw_sprite(&mut self, surface: SurfaceId, sprite: &Sprite);

    /// Finalize a surface so its texture reflects every draw so far.
    fn display(&mut self, surface: SurfaceId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_default_is_alpha() {
        assert_eq!(BlendMode::default(), BlendMode::Alpha);
        assert_eq!(RenderStates::default().blend, BlendMode::Alpha);
    }

    #[test]
    fn states_builder() {
        let states = RenderStates::textured(TextureId(3))
            .with_offset(Vec2::new(1.0, 2.0))
            .with_blend(BlendMode::Additive);
        assert_eq!(states.texture, Some(TextureId(3)));
        assert_eq!(states.offset, Vec2::new(1.0, 2.0));
        assert_eq!(states.blend, BlendMode::Additive);
    }

    #[test]
    fn sprite_defaults_are_opaque_white() {
        let sprite = Sprite::new(TextureId(0));
        assert_eq!(sprite.tint, Color::WHITE);
        assert_eq!(sprite.scale, 1.0);
        assert_eq!(sprite.position, Vec2::ZERO);
    }
}
