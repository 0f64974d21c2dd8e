//! Software camera device rendering a test pattern.

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use camera_capture_core::models::camera_models::{DeviceCapabilities, DeviceSettings, SurfaceHandle};
use camera_capture_core::models::config::Rotation;
use camera_capture_core::models::error::RuntimeFailure;
use camera_capture_core::models::size::Size;
use camera_capture_core::session::queue::{CameraEvent, EventSender};
use camera_capture_core::traits::camera_device::CameraDevice;

use crate::host::VirtualCameraSpec;
use crate::journal::{CallJournal, HostCall};

/// Fallback frame size when nothing was negotiated.
const DEFAULT_FRAME: Size = Size::new(320, 240);

/// A virtual camera opened by `VirtualCameraHost`.
///
/// Autofocus and capture complete immediately by posting to the event
/// sender; they are observed on the controller's next dispatch.
pub struct VirtualCameraDevice {
    pub(crate) index: usize,
    pub(crate) spec: VirtualCameraSpec,
    settings: DeviceSettings,
    display: Option<SurfaceHandle>,
    streaming: bool,
    unlocked: bool,
    released: bool,
    events: EventSender,
    journal: CallJournal,
}

impl VirtualCameraDevice {
    pub(crate) fn new(
        index: usize,
        spec: VirtualCameraSpec,
        events: EventSender,
        journal: CallJournal,
    ) -> Self {
        Self {
            index,
            spec,
            settings: DeviceSettings::default(),
            display: None,
            streaming: false,
            unlocked: false,
            released: false,
            events,
            journal,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn ensure_usable(&self) -> Result<(), RuntimeFailure> {
        if self.released {
            return Err(RuntimeFailure::Device(format!("camera {} was released", self.index)));
        }
        if self.unlocked {
            return Err(RuntimeFailure::Device(format!(
                "camera {} is held by a recorder",
                self.index
            )));
        }
        Ok(())
    }

    fn picture_size(&self) -> Size {
        self.settings
            .picture_size
            .or_else(|| self.spec.capabilities.picture_sizes.first().copied())
            .unwrap_or(DEFAULT_FRAME)
    }
}

impl CameraDevice for VirtualCameraDevice {
    fn capabilities(&self) -> Result<DeviceCapabilities, RuntimeFailure> {
        if self.spec.fail_capabilities {
            return Err(RuntimeFailure::Device("parameters unavailable".into()));
        }
        Ok(self.spec.capabilities.clone())
    }

    fn apply_settings(&mut self, settings: &DeviceSettings) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::ApplySettings(settings.clone()));
        self.ensure_usable()?;
        self.settings = settings.clone();
        Ok(())
    }

    fn set_display_orientation(&mut self, rotation: Rotation) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::DisplayOrientation(rotation));
        self.ensure_usable()
    }

    fn set_preview_display(&mut self, surface: SurfaceHandle) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::SetPreviewDisplay(surface));
        self.ensure_usable()?;
        self.display = Some(surface);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::StartPreview);
        self.ensure_usable()?;
        if self.display.is_none() {
            return Err(RuntimeFailure::Surface("no preview display bound".into()));
        }
        self.streaming = true;
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::StopPreview);
        self.streaming = false;
        Ok(())
    }

    fn auto_focus(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::AutoFocus);
        // Focus stays available while a recorder holds the camera.
        if self.released {
            return Err(RuntimeFailure::Device(format!("camera {} was released", self.index)));
        }
        if self.spec.reject_auto_focus {
            return Err(RuntimeFailure::AutoFocus("autofocus not supported".into()));
        }
        self.events.post(CameraEvent::AutoFocusDone {
            success: !self.spec.auto_focus_misses,
        });
        Ok(())
    }

    fn take_picture(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::TakePicture);
        self.ensure_usable()?;
        if !self.streaming {
            return Err(RuntimeFailure::Capture("preview is not running".into()));
        }
        if self.spec.fail_capture {
            return Err(RuntimeFailure::Capture("sensor error".into()));
        }

        // Still capture stops the preview stream.
        self.streaming = false;
        let jpeg = render_test_pattern(self.picture_size(), self.index)?;
        self.events.post(CameraEvent::PictureTaken(Some(jpeg)));
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::Unlock);
        self.ensure_usable()?;
        self.unlocked = true;
        Ok(())
    }

    fn lock(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::Lock);
        self.unlocked = false;
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::Reconnect);
        if self.released {
            return Err(RuntimeFailure::Device("cannot reconnect a released camera".into()));
        }
        self.unlocked = false;
        Ok(())
    }

    fn release(&mut self) {
        self.journal.record(HostCall::Release);
        self.streaming = false;
        self.released = true;
    }
}

/// Diagonal gradient JPEG, tinted per camera index.
pub fn render_test_pattern(size: Size, tint: usize) -> Result<Vec<u8>, RuntimeFailure> {
    let width = size.width.max(1);
    let height = size.height.max(1);
    let blue = (tint as u32 * 64 % 256) as u8;
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, blue])
    });

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 85)
        .encode_image(&img)
        .map_err(|e| RuntimeFailure::Capture(format!("failed to encode test pattern: {}", e)))?;
    Ok(jpeg)
}
