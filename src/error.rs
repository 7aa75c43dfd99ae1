//! Error types for engine start-up and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the visual.
///
/// Everything except [`EngineError::SurfaceOutOfMemory`] can only happen while
/// starting up; once the first frame is on screen the loop recovers from
/// surface loss on its own.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create the window: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("failed to create a rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    AdapterUnavailable(#[from] wgpu::RequestAdapterError),

    #[error("failed to create the GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("the adapter cannot present to this surface")]
    SurfaceUnsupported,

    #[error("{stage} shader failed to compile: {message}")]
    ShaderCompilation { stage: &'static str, message: String },

    #[error("the GPU ran out of memory while acquiring a frame")]
    SurfaceOutOfMemory,
}

/// Errors from reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
