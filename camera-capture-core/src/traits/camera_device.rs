use crate::models::camera_models::{DeviceCapabilities, DeviceSettings, SurfaceHandle};
use crate::models::config::Rotation;
use crate::models::error::RuntimeFailure;

/// An open, exclusively owned camera device.
///
/// Completion of `auto_focus` and `take_picture` is asynchronous: the device
/// posts `CameraEvent::AutoFocusDone` / `CameraEvent::PictureTaken` to the
/// sender it was opened with.
pub trait CameraDevice {
    fn capabilities(&self) -> Result<DeviceCapabilities, RuntimeFailure>;

    fn apply_settings(&mut self, settings: &DeviceSettings) -> Result<(), RuntimeFailure>;

    fn set_display_orientation(&mut self, rotation: Rotation) -> Result<(), RuntimeFailure>;

    fn set_preview_display(&mut self, surface: SurfaceHandle) -> Result<(), RuntimeFailure>;

    fn start_preview(&mut self) -> Result<(), RuntimeFailure>;

    fn stop_preview(&mut self) -> Result<(), RuntimeFailure>;

    /// Request a focus pass. `Err` means the device refused outright.
    fn auto_focus(&mut self) -> Result<(), RuntimeFailure>;

    /// Trigger a still capture. Only the final JPEG is delivered.
    fn take_picture(&mut self) -> Result<(), RuntimeFailure>;

    /// Hand control to a recorder.
    fn unlock(&mut self) -> Result<(), RuntimeFailure>;

    /// Take control back after a failed recorder setup.
    fn lock(&mut self) -> Result<(), RuntimeFailure>;

    /// Take control back after the recorder was released.
    fn reconnect(&mut self) -> Result<(), RuntimeFailure>;

    /// Close the device. Must not fail.
    fn release(&mut self);
}
