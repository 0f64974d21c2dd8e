use crate::models::camera_models::{EncoderProfile, QualityTier};
use crate::models::error::RuntimeFailure;
use crate::session::queue::EventSender;
use crate::traits::camera_device::CameraDevice;
use crate::traits::media_recorder::MediaRecorder;

/// Entry point into the platform camera subsystem.
///
/// Implemented by:
/// - `VirtualCameraHost` (software backend, `camera-capture-virtual`)
/// - Future: Android `Camera`/`MediaRecorder` bindings
pub trait CameraHost {
    type Device: CameraDevice;
    type Recorder: MediaRecorder;

    /// Number of cameras the platform exposes.
    fn camera_count(&self) -> usize;

    /// Device manufacturer, used to resolve `DeviceQuirks`.
    fn manufacturer(&self) -> String;

    /// Open the camera at `index`.
    ///
    /// The device posts autofocus and picture completions through `events`.
    fn open(&mut self, index: usize, events: EventSender) -> Result<Self::Device, RuntimeFailure>;

    /// Encoder profile for `tier`, or `None` if the camera has no such tier.
    fn encoder_profile(&self, index: usize, tier: QualityTier) -> Option<EncoderProfile>;

    /// Create a recorder bound to an unlocked device.
    ///
    /// The recorder reports asynchronous failures through `events`.
    fn new_recorder(
        &mut self,
        device: &mut Self::Device,
        events: EventSender,
    ) -> Result<Self::Recorder, RuntimeFailure>;
}
