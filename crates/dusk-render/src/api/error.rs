use std::path::PathBuf;

/// Errors surfaced by the render core.
///
/// Only setup can fail: loading textures and reading configuration. The
/// steady-state frame loop has no recoverable errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot load texture '{}': {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
