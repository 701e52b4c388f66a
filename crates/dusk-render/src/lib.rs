pub mod api;
pub mod assets;
pub mod components;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::RenderConfig;
pub use api::error::{RenderError, RenderResult};
pub use api::pipeline::RenderPipeline;
pub use api::types::{FramePhase, FrameStats, TextureHandle};
pub use assets::manifest::{TextureDescriptor, TextureManifest};
pub use assets::registry::{TextureEntry, TextureRegistry};
pub use components::drawable::Drawable;
pub use components::layer::RenderLayer;
pub use renderer::{
    BlendMode, Color, GraphicsBackend, Quad, RenderStates, SoftwareBackend, Sprite, SurfaceId,
    TexRect, TextureId, Vertex, Viewport,
};
pub use systems::batch::{LayeredBatches, VertexBatch};
pub use systems::blur::{BlurKernel, DownsampleBlur, NoBlur};
pub use systems::ground::GroundCache;
pub use systems::lighting::{BlobShadows, LightingKernel, ShadowCaster, Unlit};
