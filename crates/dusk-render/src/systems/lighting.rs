//! Lighting bridge for shadow-casting occluders.
//!
//! Occluders are collected fresh each frame in world space. At composite time
//! the bridge converts them to screen space, hands them to the lighting
//! kernel and multiplies the returned light map over the scene. The kernel is
//! opaque to the pipeline; `Unlit` stands in when no lighting is wanted.

use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};

use crate::renderer::traits::{BlendMode, GraphicsBackend, Sprite, SurfaceId};
use crate::renderer::vertex::Color;
use crate::renderer::viewport::Viewport;

/// A circular occluder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCaster {
    pub position: Vec2,
    pub radius: f32,
}

impl ShadowCaster {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }
}

/// Light/shadow computation consumed by the pipeline.
///
/// Occluders arrive in render-target pixel coordinates.
pub trait LightingKernel {
    /// Size the light map. Called once, before any other method.
    fn init(&mut self, width: u32, height: u32);

    /// Drop per-frame state (occluders).
    fn clear(&mut self);

    fn add_occluder(&mut self, caster: ShadowCaster);

    /// Light map to multiply over the scene, or None to leave it untouched.
    fn render_composite(&mut self) -> Option<&RgbaImage>;
}

/// Kernel that never produces a light map.
#[derive(Debug, Default)]
pub struct Unlit;

impl LightingKernel for Unlit {
    fn init(&mut self, _width: u32, _height: u32) {}

    fn clear(&mut self) {}

    fn add_occluder(&mut self, _caster: ShadowCaster) {}

    fn render_composite(&mut self) -> Option<&RgbaImage> {
        None
    }
}

/// Ambient light with a soft dark disc under every occluder.
pub struct BlobShadows {
    ambient: [u8; 3],
    /// Darkening at the disc centre (0.0 = none, 1.0 = black).
    strength: f32,
    occluders: Vec<ShadowCaster>,
    light_map: RgbaImage,
}

impl BlobShadows {
    pub fn new(ambient: [u8; 3], strength: f32) -> Self {
        Self {
            ambient,
            strength: strength.clamp(0.0, 1.0),
            occluders: Vec::with_capacity(64),
            light_map: RgbaImage::new(0, 0),
        }
    }

    fn darken_disc(&mut self, caster: ShadowCaster) {
        if caster.radius <= 0.0 {
            return;
        }
        let (w, h) = self.light_map.dimensions();
        let lo = (caster.position - caster.radius).floor().max(Vec2::ZERO);
        let hi = (caster.position + caster.radius)
            .ceil()
            .min(UVec2::new(w, h).as_vec2());
        if lo.x >= hi.x || lo.y >= hi.y {
            return;
        }
        for y in lo.y as u32..hi.y as u32 {
            for x in lo.x as u32..hi.x as u32 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(caster.position);
                if d >= caster.radius {
                    continue;
                }
                let factor = 1.0 - self.strength * (1.0 - d / caster.radius);
                let pixel = self.light_map.get_pixel_mut(x, y);
                for c in &mut pixel.0[..3] {
                    *c = (*c as f32 * factor).round() as u8;
                }
            }
        }
    }
}

impl Default for BlobShadows {
    fn default() -> Self {
        Self::new([255, 255, 255], 0.6)
    }
}

impl LightingKernel for BlobShadows {
    fn init(&mut self, width: u32, height: u32) {
        self.light_map = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        self.occluders.clear();
    }

    fn add_occluder(&mut self, caster: ShadowCaster) {
        self.occluders.push(caster);
    }

    fn render_composite(&mut self) -> Option<&RgbaImage> {
        let [r, g, b] = self.ambient;
        for pixel in self.light_map.pixels_mut() {
            *pixel = Rgba([r, g, b, 255]);
        }
        let occluders = std::mem::take(&mut self.occluders);
        for caster in &occluders {
            self.darken_disc(*caster);
        }
        self.occluders = occluders;
        Some(&self.light_map)
    }
}

/// Marshals the frame's shadow casters to the kernel and composites its output.
pub struct LightingBridge {
    kernel: Box<dyn LightingKernel>,
    casters: Vec<ShadowCaster>,
    enabled: bool,
    light_surface: SurfaceId,
}

impl LightingBridge {
    /// Initialize the kernel at the render size and allocate the light surface.
    pub fn new<B: GraphicsBackend + ?Sized>(
        backend: &mut B,
        mut kernel: Box<dyn LightingKernel>,
        render_size: UVec2,
        enabled: bool,
    ) -> Self {
        kernel.init(render_size.x, render_size.y);
        Self {
            kernel,
            casters: Vec::with_capacity(256),
            enabled,
            light_surface: backend.create_surface(render_size.x, render_size.y),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn light_surface(&self) -> SurfaceId {
        self.light_surface
    }

    /// Start a frame: forget last frame's casters and the kernel's state.
    pub fn begin_frame(&mut self) {
        self.casters.clear();
        self.kernel.clear();
    }

    pub fn add_shadow_caster(&mut self, position: Vec2, radius: f32) {
        debug_assert!(
            position.is_finite() && radius.is_finite() && radius >= 0.0,
            "malformed shadow caster at {position} with radius {radius}"
        );
        self.casters.push(ShadowCaster::new(position, radius));
    }

    /// This frame's casters, in world space.
    pub fn shadow_casters(&self) -> &[ShadowCaster] {
        &self.casters
    }

    /// Feed the casters to the kernel and multiply its light map over `scene`.
    /// Returns whether a light map was applied.
    pub fn composite<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        scene: SurfaceId,
        viewport: &Viewport,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        // The kernel only ever sees this frame's casters, once.
        self.kernel.clear();
        for caster in &self.casters {
            self.kernel.add_occluder(ShadowCaster::new(
                viewport.world_to_screen(caster.position),
                caster.radius,
            ));
        }
        let Some(light_map) = self.kernel.render_composite() else {
            return false;
        };
        if light_map.width() == 0 {
            return false;
        }

        let texture = backend.surface_texture(self.light_surface);
        let scale = viewport.render_size().x as f32 / light_map.width() as f32;
        backend.update_texture(texture, light_map);
        let sprite = Sprite::new(texture)
            .with_scale(scale)
            .with_tint(Color::WHITE)
            .with_blend(BlendMode::Multiply);
        backend.draw_sprite(scene, &sprite);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::software::SoftwareBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records occluders and returns a flat half-grey light map.
    struct HalfLight {
        seen: Rc<RefCell<Vec<ShadowCaster>>>,
        map: RgbaImage,
    }

    impl LightingKernel for HalfLight {
        fn init(&mut self, width: u32, height: u32) {
            self.map = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
        }

        fn clear(&mut self) {
            self.seen.borrow_mut().clear();
        }

        fn add_occluder(&mut self, caster: ShadowCaster) {
            self.seen.borrow_mut().push(caster);
        }

        fn render_composite(&mut self) -> Option<&RgbaImage> {
            Some(&self.map)
        }
    }

    fn half_light() -> (Box<dyn LightingKernel>, Rc<RefCell<Vec<ShadowCaster>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let kernel = HalfLight {
            seen: Rc::clone(&seen),
            map: RgbaImage::new(0, 0),
        };
        (Box::new(kernel), seen)
    }

    #[test]
    fn disabled_bridge_leaves_scene_alone() {
        let mut gfx = SoftwareBackend::new();
        let scene = gfx.create_surface(4, 4);
        gfx.clear(scene, Color::WHITE);
        let (kernel, seen) = half_light();
        let mut bridge = LightingBridge::new(&mut gfx, kernel, UVec2::new(4, 4), false);
        bridge.add_shadow_caster(Vec2::ZERO, 3.0);

        let vp = Viewport::new(UVec2::new(4, 4), 1.0);
        assert!(!bridge.composite(&mut gfx, scene, &vp));
        assert!(seen.borrow().is_empty());
        assert_eq!(gfx.surface_image(scene).get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn enabled_bridge_multiplies_light_map() {
        let mut gfx = SoftwareBackend::new();
        let scene = gfx.create_surface(4, 4);
        gfx.clear(scene, Color::WHITE);
        let (kernel, _) = half_light();
        let mut bridge = LightingBridge::new(&mut gfx, kernel, UVec2::new(4, 4), true);

        let vp = Viewport::new(UVec2::new(4, 4), 1.0);
        assert!(bridge.composite(&mut gfx, scene, &vp));
        assert_eq!(gfx.surface_image(scene).get_pixel(3, 3).0, [128, 128, 128, 255]);
    }

    #[test]
    fn casters_reach_kernel_in_screen_space() {
        let mut gfx = SoftwareBackend::new();
        let scene = gfx.create_surface(10, 10);
        let (kernel, seen) = half_light();
        let mut bridge = LightingBridge::new(&mut gfx, kernel, UVec2::new(10, 10), true);

        let mut vp = Viewport::new(UVec2::new(10, 10), 1.0);
        vp.set_focus(Vec2::new(100.0, 100.0));
        bridge.add_shadow_caster(Vec2::new(102.0, 99.0), 4.0);
        bridge.composite(&mut gfx, scene, &vp);

        assert_eq!(*seen.borrow(), vec![ShadowCaster::new(Vec2::new(7.0, 4.0), 4.0)]);
    }

    #[test]
    fn repeated_composite_feeds_casters_once() {
        let mut gfx = SoftwareBackend::new();
        let scene = gfx.create_surface(4, 4);
        let (kernel, seen) = half_light();
        let mut bridge = LightingBridge::new(&mut gfx, kernel, UVec2::new(4, 4), true);
        bridge.add_shadow_caster(Vec2::ONE, 1.0);
        bridge.add_shadow_caster(Vec2::ZERO, 2.0);

        let vp = Viewport::new(UVec2::new(4, 4), 1.0);
        bridge.composite(&mut gfx, scene, &vp);
        bridge.composite(&mut gfx, scene, &vp);

        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn light_surface_storage_is_reused() {
        let mut gfx = SoftwareBackend::new();
        let scene = gfx.create_surface(8, 8);
        let mut bridge = LightingBridge::new(&mut gfx, Box::new(BlobShadows::default()), UVec2::new(8, 8), true);
        let vp = Viewport::new(UVec2::new(8, 8), 1.0);

        bridge.composite(&mut gfx, scene, &vp);
        let storage = gfx.surface_image(bridge.light_surface()).as_ptr();
        for _ in 0..3 {
            bridge.begin_frame();
            bridge.add_shadow_caster(Vec2::new(4.0, 4.0), 2.0);
            bridge.composite(&mut gfx, scene, &vp);
            assert_eq!(gfx.surface_image(bridge.light_surface()).as_ptr(), storage);
        }
    }

    #[test]
    fn begin_frame_forgets_casters() {
        let mut gfx = SoftwareBackend::new();
        let (kernel, seen) = half_light();
        let mut bridge = LightingBridge::new(&mut gfx, kernel, UVec2::new(2, 2), true);
        bridge.add_shadow_caster(Vec2::ONE, 1.0);
        seen.borrow_mut().push(ShadowCaster::new(Vec2::ZERO, 1.0));

        bridge.begin_frame();

        assert!(bridge.shadow_casters().is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unlit_kernel_is_a_no_op() {
        let mut gfx = SoftwareBackend::new();
        let scene = gfx.create_surface(2, 2);
        gfx.clear(scene, Color::WHITE);
        let mut bridge = LightingBridge::new(&mut gfx, Box::new(Unlit), UVec2::new(2, 2), true);
        bridge.add_shadow_caster(Vec2::ONE, 1.0);

        let vp = Viewport::new(UVec2::new(2, 2), 1.0);
        assert!(!bridge.composite(&mut gfx, scene, &vp));
        assert_eq!(gfx.surface_image(scene).get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn blob_shadows_darken_under_occluder_only() {
        let mut kernel = BlobShadows::new([200, 200, 200], 1.0);
        kernel.init(16, 16);
        kernel.add_occluder(ShadowCaster::new(Vec2::new(4.0, 4.0), 3.0));
        let map = kernel.render_composite().unwrap();

        let centre = map.get_pixel(3, 3).0[0];
        assert!(centre < 100, "centre should be dark, got {centre}");
        assert_eq!(map.get_pixel(12, 12).0, [200, 200, 200, 255]);
    }

    #[test]
    fn blob_shadows_clear_between_frames() {
        let mut kernel = BlobShadows::default();
        kernel.init(8, 8);
        kernel.add_occluder(ShadowCaster::new(Vec2::new(4.0, 4.0), 2.0));
        kernel.render_composite();
        kernel.clear();
        let map = kernel.render_composite().unwrap();
        assert!(map.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
