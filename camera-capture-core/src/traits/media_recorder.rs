use crate::models::camera_models::RecorderConfig;
use crate::models::error::RuntimeFailure;

/// Encoder/muxer session writing video and audio to a file.
pub trait MediaRecorder {
    fn configure(&mut self, config: &RecorderConfig) -> Result<(), RuntimeFailure>;

    fn prepare(&mut self) -> Result<(), RuntimeFailure>;

    fn start(&mut self) -> Result<(), RuntimeFailure>;

    fn stop(&mut self) -> Result<(), RuntimeFailure>;

    /// Free encoder resources. Must not fail.
    fn release(&mut self);
}
