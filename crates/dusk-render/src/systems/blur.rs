//! Pull-based blur: "give me a blurred copy of texture X".
//!
//! The kernel works on CPU images; the bridge reads the source back, runs
//! the kernel and uploads the result into its own blur surface.

use glam::UVec2;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::renderer::traits::{GraphicsBackend, SurfaceId, TextureId};

/// Blur computation consumed by the pipeline.
pub trait BlurKernel {
    /// Configure the output size and downsample factor. Called once.
    fn init(&mut self, width: u32, height: u32, downsample: u32);

    /// Blurred copy of `image`. Has no effect on later calls.
    fn blurred_version_of(&mut self, image: &RgbaImage) -> RgbaImage;
}

/// Identity kernel.
#[derive(Debug, Default)]
pub struct NoBlur;

impl BlurKernel for NoBlur {
    fn init(&mut self, _width: u32, _height: u32, _downsample: u32) {}

    fn blurred_version_of(&mut self, image: &RgbaImage) -> RgbaImage {
        image.clone()
    }
}

/// Downsample, gaussian blur at the reduced size, then scale to the output size.
#[derive(Debug)]
pub struct DownsampleBlur {
    sigma: f32,
    size: UVec2,
    downsample: u32,
}

impl DownsampleBlur {
    pub fn new(sigma: f32) -> Self {
        Self {
            sigma,
            size: UVec2::ONE,
            downsample: 1,
        }
    }
}

impl Default for DownsampleBlur {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl BlurKernel for DownsampleBlur {
    fn init(&mut self, width: u32, height: u32, downsample: u32) {
        self.size = UVec2::new(width.max(1), height.max(1));
        self.downsample = downsample.max(1);
    }

    fn blurred_version_of(&mut self, image: &RgbaImage) -> RgbaImage {
        if image.width() == 0 || image.height() == 0 {
            return RgbaImage::new(self.size.x, self.size.y);
        }
        let small_w = (image.width() / self.downsample).max(1);
        let small_h = (image.height() / self.downsample).max(1);
        let small = imageops::resize(image, small_w, small_h, FilterType::Triangle);
        let blurred = imageops::blur(&small, self.sigma);
        imageops::resize(&blurred, self.size.x, self.size.y, FilterType::Triangle)
    }
}

/// Owns the blur kernel and the surface holding its latest output.
pub struct BlurBridge {
    kernel: Box<dyn BlurKernel>,
    surface: SurfaceId,
}

impl BlurBridge {
    pub fn new<B: GraphicsBackend + ?Sized>(
        backend: &mut B,
        mut kernel: Box<dyn BlurKernel>,
        size: UVec2,
        downsample: u32,
    ) -> Self {
        kernel.init(size.x, size.y, downsample);
        Self {
            kernel,
            surface: backend.create_surface(size.x, size.y),
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Blur `source` into the blur surface and return its texture.
    /// The texture is overwritten by the next call.
    pub fn blurred<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B, source: TextureId) -> TextureId {
        let image = backend.read_texture(source);
        let blurred = self.kernel.blurred_version_of(&image);
        let target = backend.surface_texture(self.surface);
        backend.update_texture(target, &blurred);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::software::SoftwareBackend;
    use image::Rgba;

    fn dot(size: u32) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]));
        img.put_pixel(size / 2, size / 2, Rgba([255, 255, 255, 255]));
        img
    }

    #[test]
    fn no_blur_is_identity() {
        let img = dot(5);
        assert_eq!(NoBlur.blurred_version_of(&img), img);
    }

    #[test]
    fn downsample_blur_outputs_configured_size() {
        let mut kernel = DownsampleBlur::default();
        kernel.init(8, 6, 2);
        let out = kernel.blurred_version_of(&dot(16));
        assert_eq!(out.dimensions(), (8, 6));
    }

    #[test]
    fn downsample_blur_spreads_energy() {
        let mut kernel = DownsampleBlur::new(1.5);
        kernel.init(16, 16, 2);
        let out = kernel.blurred_version_of(&dot(16));
        let lit = out.pixels().filter(|p| p.0[0] > 0).count();
        assert!(lit > 1, "blur should spread the dot, lit = {lit}");
        assert!(out.pixels().all(|p| p.0[0] < 255));
    }

    #[test]
    fn downsample_blur_is_pure() {
        let mut kernel = DownsampleBlur::default();
        kernel.init(8, 8, 2);
        let src = dot(8);
        assert_eq!(kernel.blurred_version_of(&src), kernel.blurred_version_of(&src));
    }

    #[test]
    fn bridge_writes_into_its_surface() {
        let mut gfx = SoftwareBackend::new();
        let source = gfx.create_texture(&dot(4), false);
        let mut bridge = BlurBridge::new(&mut gfx, Box::new(NoBlur), UVec2::new(4, 4), 2);

        let out = bridge.blurred(&mut gfx, source);

        assert_eq!(out, gfx.surface_texture(bridge.surface()));
        assert_eq!(gfx.read_texture(out), dot(4));
        // The source is untouched.
        assert_eq!(gfx.read_texture(source), dot(4));
    }
}
