//! Errors raised while setting up a render.
//!
//! Tracing and shading never fail; everything here is caught at setup time.

use thiserror::Error;

/// Errors that can occur while configuring or building a scene.
#[derive(Error, Debug)]
pub enum TracerError {
    #[error("Invalid acceleration structure settings: {0}")]
    InvalidAcceleration(String),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TracerResult<T> = Result<T, TracerError>;
