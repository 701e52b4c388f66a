//! Persistent ground surface.
//!
//! Static ground is painted once into a map-sized surface instead of being
//! re-batched every frame. Each frame the surface is blitted into the scene as
//! one sprite at the camera offset, so static ground costs O(1) draws
//! regardless of map size. Ground-layer batches are used for dynamic decals:
//! they are flushed into the surface during the frame they were added and then
//! persist there.

use crate::assets::registry::TextureRegistry;
use crate::components::layer::RenderLayer;
use crate::renderer::traits::{GraphicsBackend, RenderStates, Sprite, SurfaceId, TextureId};
use crate::renderer::vertex::{Color, Quad};
use crate::renderer::viewport::Viewport;
use crate::systems::batch::LayeredBatches;

pub struct GroundCache {
    surface: SurfaceId,
    map_size: u32,
    placed_quads: usize,
}

impl GroundCache {
    /// Create the map-sized surface, initially transparent.
    pub fn new<B: GraphicsBackend + ?Sized>(backend: &mut B, map_size: u32) -> Self {
        let surface = backend.create_surface(map_size, map_size);
        backend.clear(surface, Color::TRANSPARENT);
        Self {
            surface,
            map_size,
            placed_quads: 0,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    /// Quads painted directly since the last reset.
    pub fn placed_quads(&self) -> usize {
        self.placed_quads
    }

    /// Paint a quad straight into the ground surface, in world coordinates.
    pub fn place<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B, texture: TextureId, quad: &Quad) {
        backend.draw_vertices(self.surface, &quad.vertices, &RenderStates::textured(texture));
        self.placed_quads += 1;
    }

    /// Draw pending ground-layer batches into the surface and empty them.
    /// Returns the number of draw calls issued.
    pub fn flush<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        batches: &mut LayeredBatches,
        textures: &TextureRegistry,
    ) -> usize {
        let draws = batches.submit(
            RenderLayer::Ground,
            backend,
            self.surface,
            textures,
            RenderStates::default(),
        );
        if draws > 0 {
            batches.clear_layer(RenderLayer::Ground);
        }
        draws
    }

    /// Finalize the surface and blit it into `scene` at the camera offset, untinted.
    pub fn composite<B: GraphicsBackend + ?Sized>(&self, backend: &mut B, scene: SurfaceId, viewport: &Viewport) {
        backend.display(self.surface);
        let sprite = Sprite::new(backend.surface_texture(self.surface))
            .with_position(viewport.screen_offset())
            .with_tint(Color::WHITE);
        backend.draw_sprite(scene, &sprite);
    }

    /// Level reset: wipe the surface and drop pending decals.
    pub fn reset<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B, batches: &mut LayeredBatches) {
        backend.clear(self.surface, Color::TRANSPARENT);
        batches.clear_layer(RenderLayer::Ground);
        self.placed_quads = 0;
        log::debug!("ground surface reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TextureHandle;
    use crate::renderer::software::SoftwareBackend;
    use crate::renderer::vertex::TexRect;
    use glam::{UVec2, Vec2};
    use image::{Rgba, RgbaImage};

    struct Fixture {
        gfx: SoftwareBackend,
        textures: TextureRegistry,
        batches: LayeredBatches,
        ground: GroundCache,
        green: TextureHandle,
    }

    fn fixture() -> Fixture {
        let mut gfx = SoftwareBackend::new();
        let mut textures = TextureRegistry::new();
        let mut batches = LayeredBatches::new();
        let id = gfx.create_texture(&RgbaImage::from_pixel(1, 1, Rgba([0, 255, 0, 255])), true);
        let green = textures.insert("green", id, UVec2::ONE, true);
        batches.register_slot();
        let ground = GroundCache::new(&mut gfx, 16);
        Fixture {
            gfx,
            textures,
            batches,
            ground,
            green,
        }
    }

    fn tile(at: Vec2) -> Quad {
        Quad::rect(at, Vec2::splat(2.0), TexRect::full(1, 1), Color::WHITE)
    }

    #[test]
    fn place_paints_immediately() {
        let mut f = fixture();
        let id = f.textures.texture_id(f.green).unwrap();
        f.ground.place(&mut f.gfx, id, &tile(Vec2::new(4.0, 4.0)));

        let img = f.gfx.surface_image(f.ground.surface());
        assert_eq!(img.get_pixel(4, 4).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(f.ground.placed_quads(), 1);
    }

    #[test]
    fn flush_drains_ground_batches_once() {
        let mut f = fixture();
        f.batches.add_quad(f.green, &tile(Vec2::ZERO), RenderLayer::Ground);

        assert_eq!(f.ground.flush(&mut f.gfx, &mut f.batches, &f.textures), 1);
        assert_eq!(f.batches.quad_count(RenderLayer::Ground), 0);
        assert_eq!(f.gfx.surface_image(f.ground.surface()).get_pixel(1, 1).0, [0, 255, 0, 255]);

        // Nothing pending: no draw.
        assert_eq!(f.ground.flush(&mut f.gfx, &mut f.batches, &f.textures), 0);
        // The decal persists in the surface.
        assert_eq!(f.gfx.surface_image(f.ground.surface()).get_pixel(1, 1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn composite_places_ground_at_camera_offset() {
        let mut f = fixture();
        let id = f.textures.texture_id(f.green).unwrap();
        f.ground.place(&mut f.gfx, id, &tile(Vec2::new(6.0, 6.0)));

        let scene = f.gfx.create_surface(4, 4);
        f.gfx.clear(scene, Color::BLACK);
        let mut vp = Viewport::new(UVec2::new(4, 4), 1.0);
        // World (7, 7) to screen (2, 2): offset = (2, 2) - focus.
        vp.set_focus(Vec2::new(7.0, 7.0));
        f.ground.composite(&mut f.gfx, scene, &vp);

        let img = f.gfx.surface_image(scene);
        assert_eq!(img.get_pixel(1, 1).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(2, 2).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [0, 0, 0, 255]);
        assert_eq!(f.gfx.display_count(f.ground.surface()), 1);
    }

    #[test]
    fn reset_wipes_surface_and_pending_decals() {
        let mut f = fixture();
        let id = f.textures.texture_id(f.green).unwrap();
        f.ground.place(&mut f.gfx, id, &tile(Vec2::ZERO));
        f.batches.add_quad(f.green, &tile(Vec2::ONE), RenderLayer::Ground);

        f.ground.reset(&mut f.gfx, &mut f.batches);

        assert!(f.gfx.surface_image(f.ground.surface()).pixels().all(|p| p.0 == [0, 0, 0, 0]));
        assert_eq!(f.batches.quad_count(RenderLayer::Ground), 0);
        assert_eq!(f.ground.placed_quads(), 0);
    }
}
