use std::collections::HashMap;
use std::ops::Index;
use std::path::Path;

use glam::UVec2;
use image::RgbaImage;

use crate::api::error::{RenderError, RenderResult};
use crate::api::types::TextureHandle;
use crate::renderer::traits::TextureId;

/// A registered texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureEntry {
    pub name: String,
    /// Backend texture bound when this handle's batches are drawn.
    pub texture: TextureId,
    pub size: UVec2,
    pub repeated: bool,
}

/// Append-only registry of textures.
///
/// Handles are dense indices into the entry list. Nothing is ever removed, so
/// a handle stays valid for the registry's lifetime.
pub struct TextureRegistry {
    entries: Vec<TextureEntry>,
    by_name: HashMap<String, TextureHandle>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Decode an image file into RGBA8.
    pub fn load_image(path: &Path) -> RenderResult<RgbaImage> {
        image::open(path)
            .map(|img| img.to_rgba8())
            .map_err(|source| RenderError::TextureLoad {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Record an uploaded texture and assign it the next handle.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        texture: TextureId,
        size: UVec2,
        repeated: bool,
    ) -> TextureHandle {
        let name = name.into();
        let handle = TextureHandle(self.entries.len() as u32);
        if let Some(previous) = self.by_name.insert(name.clone(), handle) {
            log::debug!("texture name '{name}' rebound from {previous} to {handle}");
        }
        self.entries.push(TextureEntry {
            name,
            texture,
            size,
            repeated,
        });
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.entries.get(handle.index())
    }

    /// Backend texture for a handle. Returns None for unregistered handles.
    pub fn texture_id(&self, handle: TextureHandle) -> Option<TextureId> {
        self.get(handle).map(|entry| entry.texture)
    }

    /// Look up a texture by name.
    pub fn handle(&self, name: &str) -> Option<TextureHandle> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, handle: TextureHandle) -> bool {
        handle.index() < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &TextureEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (TextureHandle(i as u32), entry))
    }
}

/// Panics on an unregistered handle.
impl Index<TextureHandle> for TextureRegistry {
    type Output = TextureEntry;

    fn index(&self, handle: TextureHandle) -> &TextureEntry {
        &self.entries[handle.index()]
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
