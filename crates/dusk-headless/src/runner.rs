use std::f32::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use dusk_render::{
    BlobShadows, Color, Drawable, DownsampleBlur, FrameStats, GraphicsBackend, Quad, RenderConfig,
    RenderLayer, RenderPipeline, RenderResult, SoftwareBackend, SurfaceId, TexRect, TextureHandle,
};
use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};

/// Edge length of the generated textures.
const TEXTURE_SIZE: u32 = 16;
/// Frames between two footprints left by the leading walker.
const DECAL_INTERVAL: u64 = 30;

/// Scene setup for the headless runner.
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Window size in pixels (default: 640x480).
    pub window: UVec2,
    /// Number of walkers spawned around the map centre (default: 24).
    pub walkers: usize,
    /// Walker sprite size in world units (default: 12).
    pub walker_size: f32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            window: UVec2::new(640, 480),
            walkers: 24,
            walker_size: 12.0,
        }
    }
}

/// A sprite wandering on a curved path, wrapping at the map edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Walker {
    position: Vec2,
    heading: f32,
    speed: f32,
    turn_rate: f32,
}

impl Walker {
    pub fn new(position: Vec2, heading: f32, speed: f32, turn_rate: f32) -> Self {
        Self {
            position,
            heading,
            speed,
            turn_rate,
        }
    }

    /// Advance by `dt` seconds inside a square map of side `map_size`.
    pub fn step(&mut self, dt: f32, map_size: f32) {
        self.heading = (self.heading + self.turn_rate * dt).rem_euclid(TAU);
        self.position += Vec2::from_angle(self.heading) * self.speed * dt;
        self.position = self.position.rem_euclid(Vec2::splat(map_size));
    }
}

impl Drawable for Walker {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn angle(&self) -> f32 {
        self.heading
    }
}

/// Drives the render pipeline against the software backend, one
/// `clear -> populate -> display` cycle per frame, into an owned window surface.
pub struct SceneRunner {
    pipeline: RenderPipeline<SoftwareBackend>,
    window: SurfaceId,
    walkers: Vec<Walker>,
    walker_size: f32,
    actor: TextureHandle,
    glow: TextureHandle,
    footprint: TextureHandle,
    frame: u64,
}

impl SceneRunner {
    pub fn new(config: RenderConfig, options: SceneOptions) -> RenderResult<Self> {
        let map_size = config.map_size as f32;
        let mut pipeline = RenderPipeline::with_kernels(
            SoftwareBackend::new(),
            config,
            options.window.x,
            options.window.y,
            Box::new(BlobShadows::default()),
            Box::new(DownsampleBlur::default()),
        )?;
        let window = pipeline.backend_mut().create_surface(options.window.x, options.window.y);

        let floor = pipeline.register_image("floor", &checker_texture(), true);
        let actor = pipeline.register_image("actor", &disc_texture([240, 170, 60]), false);
        let glow = pipeline.register_image("glow", &glow_texture([255, 140, 40]), false);
        let footprint = pipeline.register_image("footprint", &disc_texture([40, 30, 20]), false);

        // The whole floor is one repeated quad, painted once.
        let floor_quad = Quad::rect(
            Vec2::ZERO,
            Vec2::splat(map_size),
            TexRect::new(0.0, 0.0, map_size, map_size),
            Color::WHITE,
        );
        pipeline.place_ground(floor, &floor_quad);

        let walkers = spawn_walkers(options.walkers, Vec2::splat(map_size * 0.5));
        log::info!(
            "scene ready: {} walkers on a {}x{} map",
            walkers.len(),
            map_size,
            map_size
        );

        Ok(Self {
            pipeline,
            window,
            walkers,
            walker_size: options.walker_size,
            actor,
            glow,
            footprint,
            frame: 0,
        })
    }

    /// Advance every walker by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let map_size = self.pipeline.config().map_size as f32;
        for walker in &mut self.walkers {
            walker.step(dt, map_size);
        }
    }

    /// Render one frame into the window surface.
    pub fn render_frame(&mut self) -> FrameStats {
        let pipeline = &mut self.pipeline;
        pipeline.clear();

        let focus = self
            .walkers
            .first()
            .map(Drawable::position)
            .unwrap_or_else(|| Vec2::splat(pipeline.config().map_size as f32 * 0.5));
        pipeline.set_focus(focus);

        let full = TexRect::full(TEXTURE_SIZE, TEXTURE_SIZE);
        let size = Vec2::splat(self.walker_size);
        for walker in &self.walkers {
            if !pipeline.is_visible(walker) {
                continue;
            }
            pipeline.add_quad(self.actor, &walker.sprite_quad(size, full, Color::WHITE), RenderLayer::Render);
            pipeline.add_quad(self.glow, &walker.sprite_quad(size * 2.0, full, Color::WHITE), RenderLayer::Bloom);
            pipeline.add_shadow_caster(walker.position(), self.walker_size * 0.5);
        }

        if self.frame % DECAL_INTERVAL == 0 {
            if let Some(leader) = self.walkers.first() {
                let quad = leader.sprite_quad(size * 0.5, full, Color::rgba(255, 255, 255, 160));
                pipeline.add_quad(self.footprint, &quad, RenderLayer::Ground);
            }
        }

        pipeline.backend_mut().clear(self.window, Color::BLACK);
        let stats = pipeline.display(self.window);
        log::debug!(
            "frame {}: {} draw calls, {} quads",
            self.frame,
            stats.draw_calls,
            stats.quads
        );
        self.frame += 1;
        stats
    }

    /// Write the window surface as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.window_image().save(path)
    }

    pub fn window_image(&self) -> &RgbaImage {
        self.pipeline.backend().surface_image(self.window)
    }

    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }

    pub fn pipeline(&self) -> &RenderPipeline<SoftwareBackend> {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline<SoftwareBackend> {
        &mut self.pipeline
    }
}

fn spawn_walkers(count: usize, centre: Vec2) -> Vec<Walker> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * TAU / count as f32;
            let radius = 40.0 + 10.0 * i as f32;
            let turn = if i % 2 == 0 { 0.4 } else { -0.4 };
            Walker::new(
                centre + Vec2::from_angle(angle) * radius,
                angle + FRAC_PI_2,
                30.0 + (i % 5) as f32 * 10.0,
                turn * (1 + i % 3) as f32,
            )
        })
        .collect()
}

fn checker_texture() -> RgbaImage {
    RgbaImage::from_fn(TEXTURE_SIZE * 2, TEXTURE_SIZE * 2, |x, y| {
        if (x / TEXTURE_SIZE + y / TEXTURE_SIZE) % 2 == 0 {
            Rgba([46, 74, 52, 255])
        } else {
            Rgba([38, 62, 44, 255])
        }
    })
}

fn disc_texture([r, g, b]: [u8; 3]) -> RgbaImage {
    let half = TEXTURE_SIZE as f32 * 0.5;
    RgbaImage::from_fn(TEXTURE_SIZE, TEXTURE_SIZE, |x, y| {
        let d = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half).length();
        if d < half {
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn glow_texture([r, g, b]: [u8; 3]) -> RgbaImage {
    let half = TEXTURE_SIZE as f32 * 0.5;
    RgbaImage::from_fn(TEXTURE_SIZE, TEXTURE_SIZE, |x, y| {
        let d = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half).length();
        let falloff = (1.0 - d / half).clamp(0.0, 1.0);
        Rgba([r, g, b, (falloff * falloff * 255.0) as u8])
    })
}
