use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not load image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path} has {channels} color channels, only 3 (RGB) or 4 (RGBA) are supported")]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    #[error("no free texture slot for '{tag}' ({max} slots in use)")]
    SlotsExhausted { tag: String, max: usize },
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no texture registered with tag '{0}'")]
    UnknownTexture(String),

    #[error("no material defined with tag '{0}'")]
    UnknownMaterial(String),

    #[error(transparent)]
    Texture(#[from] TextureError),
}
