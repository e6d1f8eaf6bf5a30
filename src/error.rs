//! Error type shared by the GL wrappers, the importers and the demos.

use std::path::PathBuf;

use crate::abs::ShaderStage;

/// Everything that can go wrong while setting up or loading GPU resources.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("platform: {0}")]
    Platform(String),

    #[error("failed to create GL object: {0}")]
    GlObject(String),

    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program linking failed: {0}")]
    ProgramLink(String),

    #[error("framebuffer incomplete (status 0x{0:x})")]
    FramebufferIncomplete(u32),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported image channel count: {0}")]
    UnsupportedChannels(u8),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("obj import: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("gltf import: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("invalid settings in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
