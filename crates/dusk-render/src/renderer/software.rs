//! CPU rasterizer backend.
//!
//! Textures and surfaces share one slot table, so a surface's texture view is
//! the slot with the same index. Quads are split into two triangles and
//! filled at pixel centres with nearest-texel sampling.

use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};

use super::traits::{BlendMode, GraphicsBackend, RenderStates, Sprite, SurfaceId, TextureId};
use super::vertex::{Color, Quad, TexRect, Vertex};

struct Slot {
    pixels: RgbaImage,
    repeated: bool,
    presented: u64,
}

pub struct SoftwareBackend {
    slots: Vec<Slot>,
    submitted_draws: usize,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(16),
            submitted_draws: 0,
        }
    }

    /// Current contents of a surface.
    pub fn surface_image(&self, surface: SurfaceId) -> &RgbaImage {
        &self.slots[surface.0 as usize].pixels
    }

    /// Number of times `display` has been called on a surface.
    pub fn display_count(&self, surface: SurfaceId) -> u64 {
        self.slots[surface.0 as usize].presented
    }

    /// Total `draw_vertices` + `draw_sprite` calls received.
    pub fn submitted_draws(&self) -> usize {
        self.submitted_draws
    }

    fn push_slot(&mut self, pixels: RgbaImage, repeated: bool) -> u32 {
        self.slots.push(Slot {
            pixels,
            repeated,
            presented: 0,
        });
        (self.slots.len() - 1) as u32
    }

    fn rasterize_into(
        &mut self,
        target: SurfaceId,
        source: Option<TextureId>,
        vertices: &[Vertex],
        offset: Vec2,
        blend: BlendMode,
    ) {
        let target = target.0 as usize;
        match source {
            Some(texture) if texture.0 as usize == target => {
                log::warn!("software backend: surface {target} cannot sample itself, draw skipped");
            }
            Some(texture) => {
                // Lift the source out of the table so target and source can be borrowed together.
                let index = texture.0 as usize;
                let repeated = self.slots[index].repeated;
                let image = std::mem::take(&mut self.slots[index].pixels);
                let sampler = Sampler {
                    image: &image,
                    repeated,
                };
                fill_quads(&mut self.slots[target].pixels, Some(&sampler), vertices, offset, blend);
                self.slots[index].pixels = image;
            }
            None => fill_quads(&mut self.slots[target].pixels, None, vertices, offset, blend),
        }
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for SoftwareBackend {
    fn backend(&self) -> &'static str {
        "software"
    }

    fn create_texture(&mut self, image: &RgbaImage, repeated: bool) -> TextureId {
        TextureId(self.push_slot(image.clone(), repeated))
    }

    fn update_texture(&mut self, texture: TextureId, image: &RgbaImage) {
        let slot = &mut self.slots[texture.0 as usize];
        if slot.pixels.dimensions() == image.dimensions() {
            slot.pixels.copy_from_slice(image.as_raw());
        } else {
            slot.pixels = image.clone();
        }
    }

    fn read_texture(&self, texture: TextureId) -> RgbaImage {
        self.slots[texture.0 as usize].pixels.clone()
    }

    fn texture_size(&self, texture: TextureId) -> UVec2 {
        let (w, h) = self.slots[texture.0 as usize].pixels.dimensions();
        UVec2::new(w, h)
    }

    fn create_surface(&mut self, width: u32, height: u32) -> SurfaceId {
        SurfaceId(self.push_slot(RgbaImage::new(width, height), false))
    }

    fn surface_texture(&self, surface: SurfaceId) -> TextureId {
        TextureId(surface.0)
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        self.slots[surface.0 as usize].pixels = RgbaImage::new(0, 0);
    }

    fn clear(&mut self, surface: SurfaceId, color: Color) {
        let fill = Rgba(color.to_array());
        for pixel in self.slots[surface.0 as usize].pixels.pixels_mut() {
            *pixel = fill;
        }
    }

    fn draw_vertices(&mut self, surface: SurfaceId, vertices: &[Vertex], states: &RenderStates) {
        self.submitted_draws += 1;
        self.rasterize_into(surface, states.texture, vertices, states.offset, states.blend);
    }

    fn draw_sprite(&mut self, surface: SurfaceId, sprite: &Sprite) {
        let size = self.texture_size(sprite.texture);
        let quad = Quad::rect(
            sprite.position,
            size.as_vec2() * sprite.scale,
            TexRect::full(size.x, size.y),
            sprite.tint,
        );
        self.submitted_draws += 1;
        self.rasterize_into(surface, Some(sprite.texture), &quad.vertices, Vec2::ZERO, sprite.blend);
    }

    fn display(&mut self, surface: SurfaceId) {
        self.slots[surface.0 as usize].presented += 1;
    }
}

struct Sampler<'a> {
    image: &'a RgbaImage,
    repeated: bool,
}

impl Sampler<'_> {
    /// Nearest texel at texel-space coordinate `uv`, as normalized RGBA.
    fn sample(&self, uv: Vec2) -> [f32; 4] {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return [0.0; 4];
        }
        let x = self.address(uv.x.floor() as i64, w);
        let y = self.address(uv.y.floor() as i64, h);
        self.image.get_pixel(x, y).0.map(|c| c as f32 / 255.0)
    }

    fn address(&self, t: i64, size: u32) -> u32 {
        let size = size as i64;
        if self.repeated {
            t.rem_euclid(size) as u32
        } else {
            t.clamp(0, size - 1) as u32
        }
    }
}

fn fill_quads(
    target: &mut RgbaImage,
    sampler: Option<&Sampler<'_>>,
    vertices: &[Vertex],
    offset: Vec2,
    blend: BlendMode,
) {
    for quad in vertices.chunks_exact(Quad::VERTICES) {
        fill_triangle(target, sampler, [quad[0], quad[1], quad[2]], offset, blend, false);
        // The 0-2 diagonal already belongs to the first triangle.
        fill_triangle(target, sampler, [quad[0], quad[2], quad[3]], offset, blend, true);
    }
}

fn edge(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn fill_triangle(
    target: &mut RgbaImage,
    sampler: Option<&Sampler<'_>>,
    tri: [Vertex; 3],
    offset: Vec2,
    blend: BlendMode,
    exclude_first_edge: bool,
) {
    let p = tri.map(|v| v.position() + offset);
    let area = edge(p[0], p[1], p[2]);
    if area.abs() <= f32::EPSILON {
        return;
    }

    let (width, height) = target.dimensions();
    let lo = p[0].min(p[1]).min(p[2]).floor().max(Vec2::ZERO);
    let hi = p[0]
        .max(p[1])
        .max(p[2])
        .ceil()
        .min(Vec2::new(width as f32, height as f32));
    if lo.x >= hi.x || lo.y >= hi.y {
        return;
    }

    for y in lo.y as u32..hi.y as u32 {
        for x in lo.x as u32..hi.x as u32 {
            let c = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w = [
                edge(p[1], p[2], c) / area,
                edge(p[2], p[0], c) / area,
                edge(p[0], p[1], c) / area,
            ];
            if w.iter().any(|&wi| wi < 0.0) || (exclude_first_edge && w[2] <= 0.0) {
                continue;
            }

            let uv = tri[0].tex_coords() * w[0] + tri[1].tex_coords() * w[1] + tri[2].tex_coords() * w[2];
            let texel = sampler.map_or([1.0; 4], |s| s.sample(uv));
            let src: [f32; 4] = std::array::from_fn(|i| {
                let tint = tri
                    .iter()
                    .zip(w)
                    .map(|(v, wi)| v.color.to_array()[i] as f32 * wi)
                    .sum::<f32>()
                    / 255.0;
                texel[i] * tint
            });
            blend_pixel(target.get_pixel_mut(x, y), src, blend);
        }
    }
}

fn blend_pixel(dst: &mut Rgba<u8>, src: [f32; 4], mode: BlendMode) {
    let d = dst.0.map(|c| c as f32 / 255.0);
    let sa = src[3];
    let out: [f32; 4] = std::array::from_fn(|i| match mode {
        BlendMode::Replace => src[i],
        BlendMode::Alpha if i == 3 => sa + d[3] * (1.0 - sa),
        BlendMode::Alpha => src[i] * sa + d[i] * (1.0 - sa),
        BlendMode::Additive if i == 3 => d[3] + sa,
        BlendMode::Additive => d[i] + src[i] * sa,
        BlendMode::Multiply => d[i] * src[i],
    });
    dst.0 = out.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
}
