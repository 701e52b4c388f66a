use crate::api::types::TextureHandle;
use crate::assets::registry::TextureRegistry;
use crate::components::layer::RenderLayer;
use crate::renderer::traits::{GraphicsBackend, RenderStates, SurfaceId};
use crate::renderer::vertex::{Quad, Vertex};

/// Quads sharing one (layer, texture) key, drawn in a single call.
///
/// Cleared by truncation so the backing storage is reused frame to frame.
#[derive(Debug, Clone, Default)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_quad(&mut self, quad: &Quad) {
        self.vertices.extend_from_slice(&quad.vertices);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Raw vertex bytes for a GPU upload, `Vertex::STRIDE_BYTES` per vertex.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / Quad::VERTICES
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn capacity(&self) -> usize {
        self.vertices.capacity()
    }
}

/// Per-layer batch lists, one slot per registered texture.
///
/// Every layer always holds exactly `slot_count()` batches, and slot `i` of
/// each layer belongs to `TextureHandle(i)`.
#[derive(Debug, Default)]
pub struct LayeredBatches {
    layers: [Vec<VertexBatch>; RenderLayer::COUNT],
}

impl LayeredBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one empty batch to every layer. Returns the new slot index.
    pub fn register_slot(&mut self) -> usize {
        for layer in &mut self.layers {
            layer.push(VertexBatch::new());
        }
        self.slot_count() - 1
    }

    pub fn slot_count(&self) -> usize {
        self.layers[RenderLayer::Render.index()].len()
    }

    pub fn layer(&self, layer: RenderLayer) -> &[VertexBatch] {
        &self.layers[layer.index()]
    }

    pub fn batch(&self, layer: RenderLayer, handle: TextureHandle) -> Option<&VertexBatch> {
        self.layers[layer.index()].get(handle.index())
    }

    /// Append a quad to the (layer, handle) batch.
    ///
    /// Panics if `handle` was never registered.
    pub fn add_quad(&mut self, handle: TextureHandle, quad: &Quad, layer: RenderLayer) {
        debug_assert!(
            handle.index() < self.slot_count(),
            "add_quad with unregistered texture {handle} ({} registered)",
            self.slot_count()
        );
        self.layers[layer.index()][handle.index()].push_quad(quad);
    }

    /// Empty every frame-transient layer (Render, Bloom).
    pub fn clear_frame(&mut self) {
        for layer in RenderLayer::ALL {
            if layer.is_frame_transient() {
                self.clear_layer(layer);
            }
        }
    }

    pub fn clear_layer(&mut self, layer: RenderLayer) {
        for batch in &mut self.layers[layer.index()] {
            batch.clear();
        }
    }

    pub fn quad_count(&self, layer: RenderLayer) -> usize {
        self.layer(layer).iter().map(VertexBatch::quad_count).sum()
    }

    /// Non-empty batches of a layer with their handles, in handle order.
    pub fn non_empty(&self, layer: RenderLayer) -> impl Iterator<Item = (TextureHandle, &VertexBatch)> {
        self.layer(layer)
            .iter()
            .enumerate()
            .filter(|(_, batch)| !batch.is_empty())
            .map(|(i, batch)| (TextureHandle(i as u32), batch))
    }

    /// Draw each non-empty batch of `layer` into `target` with its texture bound.
    /// Returns the number of draw calls issued.
    pub fn submit<B: GraphicsBackend + ?Sized>(
        &self,
        layer: RenderLayer,
        backend: &mut B,
        target: SurfaceId,
        textures: &TextureRegistry,
        states: RenderStates,
    ) -> usize {
        let mut draws = 0;
        for (handle, batch) in self.non_empty(layer) {
            let Some(texture) = textures.texture_id(handle) else {
                log::warn!("{layer:?} batch {handle} has no registered texture, skipped");
                continue;
            };
            backend.draw_vertices(target, batch.vertices(), &states.with_texture(texture));
            draws += 1;
        }
        draws
    }
}
