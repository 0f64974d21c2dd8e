use thiserror::Error;

/// Invalid arguments handed to the controller or configuration.
///
/// Returned synchronously from the call that introduced them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("width and height must be positive (got {width}x{height})")]
    NonPositiveDimensions { width: u32, height: u32 },

    #[error("rotation angle must be 0, 90, 180 or 270 (got {0})")]
    InvalidRotation(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Failures reported by the host camera, recorder, surface or file system.
///
/// The controller logs these and rolls back where needed; they never reach
/// the caller of a public controller operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeFailure {
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("camera device error: {0}")]
    Device(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("autofocus rejected: {0}")]
    AutoFocus(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}
