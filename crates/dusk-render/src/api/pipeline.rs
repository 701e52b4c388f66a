use std::path::Path;

use glam::{UVec2, Vec2};
use image::RgbaImage;

use crate::api::config::RenderConfig;
use crate::api::error::RenderResult;
use crate::api::types::{FramePhase, FrameStats, TextureHandle};
use crate::assets::manifest::TextureManifest;
use crate::assets::registry::TextureRegistry;
use crate::components::drawable::Drawable;
use crate::components::layer::RenderLayer;
use crate::renderer::traits::{BlendMode, GraphicsBackend, RenderStates, Sprite, SurfaceId, TextureId};
use crate::renderer::vertex::{Color, Quad};
use crate::renderer::viewport::Viewport;
use crate::systems::batch::LayeredBatches;
use crate::systems::blur::{BlurBridge, BlurKernel, DownsampleBlur};
use crate::systems::culling;
use crate::systems::ground::GroundCache;
use crate::systems::lighting::{LightingBridge, LightingKernel, ShadowCaster, Unlit};

/// The render pipeline: one instance per window, driven once per frame with
/// `clear()`, any number of `add_quad`/`add_shadow_caster` calls, then
/// `display(target)`.
///
/// Construction allocates every offscreen surface (scene, ground, blur,
/// light map); dropping the pipeline releases them.
pub struct RenderPipeline<B: GraphicsBackend> {
    backend: B,
    config: RenderConfig,
    viewport: Viewport,
    textures: TextureRegistry,
    batches: LayeredBatches,
    ground: GroundCache,
    lighting: LightingBridge,
    blur: BlurBridge,
    scene: SurfaceId,
    stats: FrameStats,
    phase: FramePhase,
}

impl<B: GraphicsBackend> RenderPipeline<B> {
    /// Build a pipeline for a window of the given size with the default
    /// kernels (`Unlit`, `DownsampleBlur`).
    pub fn new(backend: B, config: RenderConfig, window_width: u32, window_height: u32) -> RenderResult<Self> {
        Self::with_kernels(
            backend,
            config,
            window_width,
            window_height,
            Box::new(Unlit),
            Box::new(DownsampleBlur::default()),
        )
    }

    /// Build a pipeline with explicit lighting and blur kernels.
    pub fn with_kernels(
        mut backend: B,
        config: RenderConfig,
        window_width: u32,
        window_height: u32,
        lighting: Box<dyn LightingKernel>,
        blur: Box<dyn BlurKernel>,
    ) -> RenderResult<Self> {
        config.validate()?;

        let render_size = config.render_size(window_width, window_height);
        let viewport = Viewport::new(render_size, config.quality);

        let scene = backend.create_surface(render_size.x, render_size.y);
        let ground = GroundCache::new(&mut backend, config.map_size);
        let blur_size = (render_size / 2).max(UVec2::ONE);
        let blur = BlurBridge::new(&mut backend, blur, blur_size, config.blur_downsample);
        let lighting = LightingBridge::new(&mut backend, lighting, render_size, config.lighting_enabled);

        log::info!(
            "render pipeline ({}): window {}x{}, render target {}x{}, ground {}x{}, lighting {}",
            backend.backend(),
            window_width,
            window_height,
            render_size.x,
            render_size.y,
            config.map_size,
            config.map_size,
            if config.lighting_enabled { "on" } else { "off" },
        );

        let mut pipeline = Self {
            backend,
            config,
            viewport,
            textures: TextureRegistry::new(),
            batches: LayeredBatches::new(),
            ground,
            lighting,
            blur,
            scene,
            stats: FrameStats::default(),
            phase: FramePhase::Cleared,
        };
        pipeline.clear();
        Ok(pipeline)
    }

    // -- Textures --

    /// Load an image file and register it under its path.
    ///
    /// On failure the error is logged and returned; no handle and no batch
    /// slots are allocated, so later registrations keep dense handles.
    pub fn register_texture(&mut self, path: impl AsRef<Path>, repeated: bool) -> RenderResult<TextureHandle> {
        let path = path.as_ref();
        self.register_named(path.to_string_lossy(), path, repeated)
    }

    /// Load an image file and register it under `name`.
    pub fn register_named(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
        repeated: bool,
    ) -> RenderResult<TextureHandle> {
        let image = TextureRegistry::load_image(path.as_ref()).map_err(|err| {
            log::error!("{err}");
            err
        })?;
        Ok(self.register_image(name, &image, repeated))
    }

    /// Register an in-memory image. Cannot fail.
    pub fn register_image(&mut self, name: impl Into<String>, image: &RgbaImage, repeated: bool) -> TextureHandle {
        let name = name.into();
        let texture = self.backend.create_texture(image, repeated);
        let size = UVec2::new(image.width(), image.height());
        let handle = self.textures.insert(name.as_str(), texture, size, repeated);
        let slot = self.batches.register_slot();
        debug_assert_eq!(slot, handle.index(), "batch slots out of step with texture handles");
        log::info!("texture '{name}' registered as {handle} ({}x{})", size.x, size.y);
        handle
    }

    /// Register every texture of a manifest, in order, with paths resolved
    /// against `base_dir`. Failed entries are logged and skipped.
    pub fn register_manifest(
        &mut self,
        manifest: &TextureManifest,
        base_dir: impl AsRef<Path>,
    ) -> Vec<RenderResult<TextureHandle>> {
        let base_dir = base_dir.as_ref();
        manifest
            .textures
            .iter()
            .map(|desc| self.register_named(desc.name.as_str(), base_dir.join(&desc.path), desc.repeated))
            .collect()
    }

    /// Handle registered under `name`, if any.
    pub fn texture_handle(&self, name: &str) -> Option<TextureHandle> {
        self.textures.handle(name)
    }

    /// Every registered texture, in handle order.
    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    // -- Camera and culling --

    /// Move the camera centre. No smoothing is applied.
    pub fn set_focus(&mut self, focus: Vec2) {
        self.viewport.set_focus(focus);
    }

    /// Camera centre in world space.
    pub fn focus(&self) -> Vec2 {
        self.viewport.focus()
    }

    /// `render_size / 2 - focus`, recomputed from the current focus.
    pub fn screen_offset(&self) -> Vec2 {
        self.viewport.screen_offset()
    }

    /// Render size, quality and focus.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Cull a drawable with a margin of two world cells.
    pub fn is_visible<D: Drawable + ?Sized>(&self, drawable: &D) -> bool {
        culling::is_drawable_visible(&self.viewport, drawable, self.config.culling_margin())
    }

    /// Cull a point with a caller-chosen margin.
    pub fn is_visible_within(&self, point: Vec2, radius: f32) -> bool {
        culling::is_visible(&self.viewport, point, radius)
    }

    // -- Frame cycle --

    /// Start a new frame: reset counters, empty the render and bloom batches,
    /// forget shadow casters and clear the scene. The ground persists.
    pub fn clear(&mut self) {
        self.stats = FrameStats::default();
        self.batches.clear_frame();
        self.lighting.begin_frame();
        let clear_color = Color::from(self.config.clear_color);
        self.backend.clear(self.scene, clear_color);
        self.phase = FramePhase::Cleared;
    }

    /// Queue a world-space quad on `layer`.
    ///
    /// Panics if `handle` was not returned by a successful registration.
    pub fn add_quad(&mut self, handle: TextureHandle, quad: &Quad, layer: RenderLayer) {
        self.batches.add_quad(handle, quad, layer);
        self.stats.quads += 1;
    }

    /// Queue a world-space occluder for this frame's light map.
    pub fn add_shadow_caster(&mut self, position: Vec2, radius: f32) {
        self.lighting.add_shadow_caster(position, radius);
    }

    /// Composite the frame and draw it, upscaled, into `target`.
    ///
    /// Order: ground flush and composite, render layer, bloom layer (if
    /// enabled), light map (if enabled), scene blit.
    pub fn display(&mut self, target: SurfaceId) -> FrameStats {
        if self.phase == FramePhase::Displayed {
            log::warn!("display() called twice without clear(); batches are drawn again");
        }
        // Draw counters describe this display only; `quads` spans the frame.
        self.stats.draw_calls = 0;
        self.stats.ground_draw_calls = 0;
        self.stats.lit = false;

        let ground_draws = self.ground.flush(&mut self.backend, &mut self.batches, &self.textures);
        self.ground.composite(&mut self.backend, self.scene, &self.viewport);
        self.stats.ground_draw_calls = ground_draws;
        self.stats.draw_calls = ground_draws;
        self.phase = FramePhase::GroundComposited;

        let camera = RenderStates::default().with_offset(self.viewport.screen_offset());
        self.stats.draw_calls += self.batches.submit(
            RenderLayer::Render,
            &mut self.backend,
            self.scene,
            &self.textures,
            camera,
        );
        if self.config.bloom_enabled {
            self.stats.draw_calls += self.batches.submit(
                RenderLayer::Bloom,
                &mut self.backend,
                self.scene,
                &self.textures,
                camera.with_blend(BlendMode::Additive),
            );
        }
        self.phase = FramePhase::LayersDrawn;

        self.stats.shadow_casters = self.lighting.shadow_casters().len();
        self.stats.lit = self.lighting.composite(&mut self.backend, self.scene, &self.viewport);
        self.backend.display(self.scene);

        let sprite = Sprite::new(self.backend.surface_texture(self.scene)).with_scale(self.viewport.upscale());
        self.backend.draw_sprite(target, &sprite);
        self.phase = FramePhase::Displayed;

        log::trace!(
            "frame: {} draw calls ({} ground), {} quads, {} casters, lit: {}",
            self.stats.draw_calls,
            self.stats.ground_draw_calls,
            self.stats.quads,
            self.stats.shadow_casters,
            self.stats.lit,
        );
        self.stats
    }

    // -- Ground --

    /// Paint a quad into the persistent ground surface right away.
    /// Meant for level building, not per-frame use.
    ///
    /// Panics if `handle` is not registered.
    pub fn place_ground(&mut self, handle: TextureHandle, quad: &Quad) {
        let texture = self.textures[handle].texture;
        self.ground.place(&mut self.backend, texture, quad);
    }

    /// Wipe the ground surface and any pending ground decals.
    pub fn reset_ground(&mut self) {
        self.ground.reset(&mut self.backend, &mut self.batches);
    }

    // -- Blur --

    /// Blurred copy of `source`. The returned texture belongs to the pipeline
    /// and is overwritten by the next call.
    pub fn blurred(&mut self, source: TextureId) -> TextureId {
        self.blur.blurred(&mut self.backend, source)
    }

    /// Texture view of the offscreen scene, complete after `display()`.
    pub fn scene_texture(&self) -> TextureId {
        self.backend.surface_texture(self.scene)
    }

    /// The offscreen scene surface.
    pub fn scene(&self) -> SurfaceId {
        self.scene
    }

    // -- Lighting --

    /// Whether the light map is multiplied over the scene.
    pub fn lighting_enabled(&self) -> bool {
        self.lighting.is_enabled()
    }

    /// Switch the lighting composite on or off at runtime.
    pub fn set_lighting_enabled(&mut self, enabled: bool) {
        if enabled != self.lighting.is_enabled() {
            log::info!("lighting {}", if enabled { "enabled" } else { "disabled" });
        }
        self.lighting.set_enabled(enabled);
    }

    /// This frame's shadow casters, in world space.
    pub fn shadow_casters(&self) -> &[ShadowCaster] {
        self.lighting.shadow_casters()
    }

    // -- Inspection --

    /// Draw calls issued by the last `display()`, until the next `clear()`.
    pub fn draw_calls(&self) -> usize {
        self.stats.draw_calls
    }

    /// Counters of the current frame.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Where the current frame is in the compositing sequence.
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Pending quads, per layer and texture.
    pub fn batches(&self) -> &LayeredBatches {
        &self.batches
    }

    /// The persistent ground surface.
    pub fn ground(&self) -> &GroundCache {
        &self.ground
    }

    /// Constants the pipeline was built with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The graphics backend, for inspection.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access, e.g. to create the window target. Surfaces
    /// owned by the pipeline must not be released through it.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: GraphicsBackend> Drop for RenderPipeline<B> {
    fn drop(&mut self) {
        for surface in [
            self.scene,
            self.ground.surface(),
            self.blur.surface(),
            self.lighting.light_surface(),
        ] {
            self.backend.release_surface(surface);
        }
        log::debug!("render pipeline dropped, surfaces released");
    }
}
