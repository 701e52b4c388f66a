use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 8-bit RGBA color, laid out as 4 bytes for vertex upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

/// Per-vertex data for batched quads.
/// 4 floats + 4 color bytes = 20 bytes stride.
///
/// `u`/`v` are texel coordinates (not normalized), matching the size of the
/// bound texture.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// X position in world space.
    pub x: f32,
    /// Y position in world space.
    pub y: f32,
    pub u: f32,
    pub v: f32,
    pub color: Color,
}

impl Vertex {
    pub const STRIDE_BYTES: usize = 20;

    pub fn new(pos: Vec2, tex: Vec2, color: Color) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            u: tex.x,
            v: tex.y,
            color,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn tex_coords(&self) -> Vec2 {
        Vec2::new(self.u, self.v)
    }
}

/// Sub-rectangle of a texture, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl TexRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// The whole of a `w` × `h` texture.
    pub fn full(w: u32, h: u32) -> Self {
        Self::new(0.0, 0.0, w as f32, h as f32)
    }

    fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.w, self.y),
            Vec2::new(self.x + self.w, self.y + self.h),
            Vec2::new(self.x, self.y + self.h),
        ]
    }
}

/// Four vertices drawn as one unit.
/// Vertex order: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad {
    pub vertices: [Vertex; 4],
}

impl Quad {
    pub const VERTICES: usize = 4;

    pub fn new(vertices: [Vertex; 4]) -> Self {
        Self { vertices }
    }

    /// Axis-aligned quad with its top-left corner at `min`.
    pub fn rect(min: Vec2, size: Vec2, tex: TexRect, color: Color) -> Self {
        let corners = [
            min,
            min + Vec2::new(size.x, 0.0),
            min + size,
            min + Vec2::new(0.0, size.y),
        ];
        Self::from_corners(corners, tex, color)
    }

    /// Quad of `size` centred on `center`, rotated by `angle` radians around it.
    pub fn sprite(center: Vec2, size: Vec2, angle: f32, tex: TexRect, color: Color) -> Self {
        let half = size * 0.5;
        let rot = Vec2::from_angle(angle);
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|corner| center + rot.rotate(corner));
        Self::from_corners(corners, tex, color)
    }

    fn from_corners(corners: [Vec2; 4], tex: TexRect, color: Color) -> Self {
        let uvs = tex.corners();
        let mut vertices = [Vertex::default(); 4];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            *vertex = Vertex::new(corners[i], uvs[i], color);
        }
        Self { vertices }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        for vertex in &mut self.vertices {
            vertex.color = color;
        }
        self
    }

    pub fn translated(mut self, offset: Vec2) -> Self {
        for vertex in &mut self.vertices {
            vertex.x += offset.x;
            vertex.y += offset.y;
        }
        self
    }

    /// Centre of the four corners.
    pub fn center(&self) -> Vec2 {
        self.vertices.iter().map(Vertex::position).sum::<Vec2>() / 4.0
    }
}
