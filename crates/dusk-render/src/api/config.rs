use glam::UVec2;
use serde::{Deserialize, Serialize};

use super::error::{RenderError, RenderResult};

/// Fixed rendering constants, read once when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Offscreen resolution multiplier relative to the window (default: 0.5).
    pub quality: f32,
    /// World cell size; the default culling margin is two cells (default: 32).
    pub cell_size: f32,
    /// Side of the square ground surface in world units (default: 2048).
    pub map_size: u32,
    /// Multiply the lighting kernel's output over the scene (default: off).
    pub lighting_enabled: bool,
    /// Draw the bloom layer additively over the scene (default: off).
    pub bloom_enabled: bool,
    /// Downsample factor handed to the blur kernel (default: 2).
    pub blur_downsample: u32,
    /// Scene clear color, RGBA (default: opaque black).
    pub clear_color: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: 0.5,
            cell_size: 32.0,
            map_size: 2048,
            lighting_enabled: false,
            bloom_enabled: false,
            blur_downsample: 2,
            clear_color: [0, 0, 0, 255],
        }
    }
}

impl RenderConfig {
    /// Parse a config from a JSON string and validate it.
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|source| RenderError::Parse {
            what: "render config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RenderResult<()> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(RenderError::InvalidConfig(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(RenderError::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.map_size == 0 {
            return Err(RenderError::InvalidConfig("map_size must be non-zero".into()));
        }
        if self.blur_downsample == 0 {
            return Err(RenderError::InvalidConfig(
                "blur_downsample must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Margin used when culling entities: two world cells.
    pub fn culling_margin(&self) -> f32 {
        2.0 * self.cell_size
    }

    /// Offscreen target size for a window of the given size.
    pub fn render_size(&self, window_width: u32, window_height: u32) -> UVec2 {
        let scale = |v: u32| ((v as f32 * self.quality) as u32).max(1);
        UVec2::new(scale(window_width), scale(window_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.culling_margin(), 64.0);
        assert!(!config.lighting_enabled);
    }

    #[test]
    fn render_size_applies_quality() {
        let config = RenderConfig::default();
        assert_eq!(config.render_size(1280, 720), UVec2::new(640, 360));
        assert_eq!(config.render_size(1, 1), UVec2::new(1, 1));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = RenderConfig::from_json(r#"{ "quality": 1.0, "lighting_enabled": true }"#).unwrap();
        assert_eq!(config.quality, 1.0);
        assert!(config.lighting_enabled);
        assert_eq!(config.map_size, 2048);
    }

    #[test]
    fn rejects_bad_quality() {
        for json in [r#"{ "quality": 0.0 }"#, r#"{ "quality": 1.5 }"#] {
            assert!(matches!(
                RenderConfig::from_json(json),
                Err(RenderError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_sizes() {
        let config = RenderConfig {
            map_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RenderConfig {
            blur_downsample: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            RenderConfig::from_json("{ quality"),
            Err(RenderError::Parse { .. })
        ));
    }
}
