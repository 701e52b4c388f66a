pub mod software;
pub mod traits;
pub mod vertex;
pub mod viewport;

// Re-export key types for convenient access
pub use software::SoftwareBackend;
pub use traits::{BlendMode, GraphicsBackend, RenderStates, Sprite, SurfaceId, TextureId};
pub use vertex::{Color, Quad, TexRect, Vertex};
pub use viewport::Viewport;
