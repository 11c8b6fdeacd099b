//! Error types for scene configuration and rendering.

use thiserror::Error;

/// Errors raised while configuring cameras, objects or the world.
///
/// All of these are reported before any ray is cast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Camera basis not computed (call compute_uvw first)")]
    BasisNotComputed,

    #[error("Eye and look-at point coincide")]
    DegenerateView,

    #[error("Zero-length vector: {0}")]
    ZeroVector(&'static str),

    #[error("Invalid field of view: {0} degrees")]
    InvalidFieldOfView(f32),

    #[error("Invalid view-plane distance: {0}")]
    InvalidViewDistance(f32),

    #[error("Invalid lens: {0}")]
    InvalidLens(String),

    #[error("Invalid stereo setup: {0}")]
    InvalidStereo(String),

    #[error("Transform is not invertible")]
    SingularTransform,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid resolution {hres}x{vres}")]
    InvalidResolution { hres: u32, vres: u32 },

    #[error("Invalid sample count: {0}")]
    InvalidSampleCount(u32),

    #[error("No camera set on the world")]
    MissingCamera,

    #[error("Scene has not been built (call World::build first)")]
    SceneNotBuilt,
}

/// Errors that stop a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render cancelled")]
    Cancelled,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type RenderResult<T> = Result<T, RenderError>;
