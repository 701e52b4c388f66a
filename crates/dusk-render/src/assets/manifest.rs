use serde::{Deserialize, Serialize};

use crate::api::error::{RenderError, RenderResult};

/// Texture manifest describing every texture a level registers up front.
/// Loaded from a JSON file at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureManifest {
    /// Textures in registration order.
    #[serde(default)]
    pub textures: Vec<TextureDescriptor>,
}

/// Describes a single texture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDescriptor {
    /// Lookup name (e.g., "ground_dirt").
    pub name: String,
    /// Path to the image file, relative to the manifest's base directory.
    pub path: String,
    /// Tile the texture when coordinates leave its bounds (default: false).
    #[serde(default)]
    pub repeated: bool,
}

impl TextureManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|source| RenderError::Parse {
            what: "texture manifest",
            source,
        })
    }
}
