use camera_capture_core::models::camera_models::{
    AudioCodec, DeviceCapabilities, EncoderProfile, FocusMode, OutputFormat, QualityTier,
    VideoCodec,
};
use camera_capture_core::models::error::RuntimeFailure;
use camera_capture_core::models::size::Size;
use camera_capture_core::session::queue::EventSender;
use camera_capture_core::traits::camera_host::CameraHost;

use crate::device::VirtualCameraDevice;
use crate::journal::{CallJournal, HostCall};
use crate::recorder::VirtualRecorder;

/// Description of one virtual camera, including failure injection.
#[derive(Debug, Clone)]
pub struct VirtualCameraSpec {
    pub capabilities: DeviceCapabilities,
    pub profiles: Vec<EncoderProfile>,
    pub fail_open: bool,
    pub fail_capabilities: bool,
    pub reject_auto_focus: bool,
    /// Autofocus is accepted but completes with `success: false`.
    pub auto_focus_misses: bool,
    pub fail_capture: bool,
    pub fail_prepare: bool,
    pub fail_start: bool,
    /// Recorder posts `RecorderError` right after starting.
    pub fail_while_recording: bool,
}

impl VirtualCameraSpec {
    /// Encoder profile with typical phone defaults for `tier`.
    pub fn profile(tier: QualityTier, frame_size: Size) -> EncoderProfile {
        EncoderProfile {
            tier,
            output_format: OutputFormat::Mpeg4,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            frame_size,
            frame_rate: 30,
            video_bit_rate: frame_size.width * frame_size.height * 6,
            audio_bit_rate: 96_000,
            audio_sample_rate: 48_000,
            audio_channels: 2,
        }
    }
}

impl Default for VirtualCameraSpec {
    /// Single shared preview/video stream, plain autofocus, 720p and 480p profiles.
    fn default() -> Self {
        Self {
            capabilities: DeviceCapabilities {
                preview_sizes: vec![
                    Size::new(1280, 720),
                    Size::new(800, 480),
                    Size::new(640, 480),
                    Size::new(320, 240),
                ],
                picture_sizes: vec![Size::new(1024, 768), Size::new(640, 480), Size::new(320, 240)],
                video_sizes: None,
                preferred_preview_size_for_video: None,
                focus_modes: Some(vec![FocusMode::Auto, FocusMode::Fixed]),
            },
            profiles: vec![
                Self::profile(QualityTier::P720, Size::new(1280, 720)),
                Self::profile(QualityTier::P480, Size::new(640, 480)),
            ],
            fail_open: false,
            fail_capabilities: false,
            reject_auto_focus: false,
            auto_focus_misses: false,
            fail_capture: false,
            fail_prepare: false,
            fail_start: false,
            fail_while_recording: false,
        }
    }
}

/// Software camera subsystem with one or more virtual cameras.
pub struct VirtualCameraHost {
    cameras: Vec<VirtualCameraSpec>,
    manufacturer: String,
    journal: CallJournal,
}

impl VirtualCameraHost {
    pub fn new(cameras: Vec<VirtualCameraSpec>) -> Self {
        Self {
            cameras,
            manufacturer: "virtual".into(),
            journal: CallJournal::new(),
        }
    }

    pub fn single(spec: VirtualCameraSpec) -> Self {
        Self::new(vec![spec])
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Journal shared by every device and recorder this host creates.
    pub fn journal(&self) -> CallJournal {
        self.journal.clone()
    }

    pub fn camera_mut(&mut self, index: usize) -> Option<&mut VirtualCameraSpec> {
        self.cameras.get_mut(index)
    }
}

impl Default for VirtualCameraHost {
    fn default() -> Self {
        Self::single(VirtualCameraSpec::default())
    }
}

impl CameraHost for VirtualCameraHost {
    type Device = VirtualCameraDevice;
    type Recorder = VirtualRecorder;

    fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    fn manufacturer(&self) -> String {
        self.manufacturer.clone()
    }

    fn open(&mut self, index: usize, events: EventSender) -> Result<Self::Device, RuntimeFailure> {
        self.journal.record(HostCall::Open(index));
        let spec = self.cameras.get(index).ok_or_else(|| {
            RuntimeFailure::DeviceUnavailable(format!("no camera at index {}", index))
        })?;
        if spec.fail_open {
            return Err(RuntimeFailure::DeviceUnavailable(format!("camera {} is in use", index)));
        }
        log::debug!("Opened virtual camera {}", index);
        Ok(VirtualCameraDevice::new(index, spec.clone(), events, self.journal.clone()))
    }

    fn encoder_profile(&self, index: usize, tier: QualityTier) -> Option<EncoderProfile> {
        self.cameras
            .get(index)?
            .profiles
            .iter()
            .find(|p| p.tier == tier)
            .cloned()
    }

    fn new_recorder(
        &mut self,
        device: &mut Self::Device,
        events: EventSender,
    ) -> Result<Self::Recorder, RuntimeFailure> {
        Ok(VirtualRecorder::new(&device.spec, events, self.journal.clone()))
    }
}
