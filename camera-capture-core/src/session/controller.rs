use std::path::{Path, PathBuf};

use crate::models::camera_models::{
    AudioSource, EncoderProfile, RecorderConfig, RecorderEncoding, SurfaceHandle, VideoSource,
};
use crate::models::config::{check_positive, CameraConfiguration, Rotation};
use crate::models::error::UsageError;
use crate::models::size::Size;
use crate::models::state::{PreviewState, RecordState};
use crate::selection::negotiation::{negotiate, select_encoder_profile, Negotiated};
use crate::session::queue::{CameraEvent, EventQueue, EventSender};
use crate::session::quirks::{DeviceQuirks, PostStopHook};
use crate::session::shooter::{ShotPhase, Shooter};
use crate::storage::files::is_writable_target;
use crate::storage::picture_writer::with_file_write;
use crate::traits::camera_device::CameraDevice;
use crate::traits::camera_host::CameraHost;
use crate::traits::media_recorder::MediaRecorder;
use crate::traits::picture_callback::BitmapCallback;

/// Facade over one camera: preview, still capture and video recording.
///
/// Single-threaded: every public method and every host notification runs on
/// the thread owning the controller. Hosts post notifications through
/// `event_sender()`; the owner drains them with `dispatch_pending()`.
///
/// Runtime failures from the host are logged and rolled back, never
/// returned. Only configuration setters report errors.
///
/// ```text
/// init(surface) ─ SurfaceCreated ─┐
/// start_preview() ── requested ───┴→ open device → negotiate → stream
/// take_picture()  ── [autofocus] → capture → restart stream → callback
/// start_recording() ─ unlock → prepare → [autofocus] → record
/// ```
pub struct CaptureController<H: CameraHost> {
    host: H,
    config: CameraConfiguration,
    queue: EventQueue,

    /// Surface handed to `init`.
    surface: Option<SurfaceHandle>,
    /// Set once the host reported the bound surface as created.
    ready_surface: Option<SurfaceHandle>,

    /// Bumped whenever the device closes; stamps device and recorder events.
    session: u64,
    preview: PreviewState,
    record: RecordState,
    device: Option<H::Device>,
    recorder: Option<H::Recorder>,
    shooter: Option<Shooter>,

    // Derived when preview starts
    negotiated: Negotiated,
    profile: Option<EncoderProfile>,
    quirks: DeviceQuirks,
    quirks_override: Option<DeviceQuirks>,
    /// Cleared for the session once the device rejects an autofocus request.
    focus_trigger: bool,
    /// Autofocus requests the device accepted but has not completed yet.
    focus_requests: u32,

    output_image_file: Option<PathBuf>,
    output_video_file: Option<PathBuf>,
}

impl<H: CameraHost> CaptureController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: CameraConfiguration::default(),
            queue: EventQueue::new(),
            surface: None,
            ready_surface: None,
            session: 0,
            preview: PreviewState::Idle,
            record: RecordState::Idle,
            device: None,
            recorder: None,
            shooter: None,
            negotiated: Negotiated::default(),
            profile: None,
            quirks: DeviceQuirks::default(),
            quirks_override: None,
            focus_trigger: false,
            focus_requests: 0,
            output_image_file: None,
            output_video_file: None,
        }
    }

    pub fn with_configuration(host: H, config: CameraConfiguration) -> Result<Self, UsageError> {
        let mut controller = Self::new(host);
        controller.set_configuration(config)?;
        Ok(controller)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // --- Configuration ---

    pub fn configuration(&self) -> &CameraConfiguration {
        &self.config
    }

    /// Replace the whole configuration. Applied on the next preview start.
    pub fn set_configuration(&mut self, config: CameraConfiguration) -> Result<(), UsageError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Select the camera to open. Out-of-range indices are ignored.
    ///
    /// Returns the index in effect afterwards.
    pub fn set_camera_index(&mut self, index: usize) -> usize {
        if index < self.host.camera_count() {
            self.config.camera_index = index;
        } else {
            log::warn!(
                "Ignoring camera index {} ({} cameras available)",
                index,
                self.host.camera_count()
            );
        }
        self.config.camera_index
    }

    pub fn set_rotation_angle(&mut self, degrees: u32) -> Result<(), UsageError> {
        self.config.rotation = Rotation::try_from(degrees)?;
        Ok(())
    }

    pub fn set_max_preview_size(&mut self, width: u32, height: u32) -> Result<(), UsageError> {
        self.config.max_preview = check_positive(width, height)?;
        Ok(())
    }

    pub fn set_max_picture_size(&mut self, width: u32, height: u32) -> Result<(), UsageError> {
        self.config.max_picture = check_positive(width, height)?;
        Ok(())
    }

    pub fn set_max_video_size(&mut self, width: u32, height: u32) -> Result<(), UsageError> {
        self.config.max_video = check_positive(width, height)?;
        Ok(())
    }

    /// Force a quirk set instead of resolving it from the manufacturer.
    pub fn set_quirks(&mut self, quirks: Option<DeviceQuirks>) {
        self.quirks_override = quirks;
    }

    // --- Observed state ---

    pub fn preview_state(&self) -> PreviewState {
        self.preview
    }

    pub fn record_state(&self) -> RecordState {
        self.record
    }

    pub fn is_preview_active(&self) -> bool {
        self.preview.is_active()
    }

    /// Whether recording has been requested and not stopped since.
    pub fn is_recording(&self) -> bool {
        self.record.is_wanted()
    }

    pub fn is_capture_pending(&self) -> bool {
        self.shooter.is_some()
    }

    /// Preview size as the caller should lay it out (rotation applied).
    pub fn preview_size(&self) -> Option<Size> {
        self.negotiated.reported_preview
    }

    pub fn picture_size(&self) -> Option<Size> {
        self.negotiated.picture
    }

    pub fn video_size(&self) -> Option<Size> {
        self.negotiated.video
    }

    pub fn encoder_profile(&self) -> Option<&EncoderProfile> {
        self.profile.as_ref()
    }

    pub fn quirks(&self) -> DeviceQuirks {
        self.quirks
    }

    // --- Host notifications ---

    /// Handle for the host to post notifications with.
    pub fn event_sender(&self) -> EventSender {
        self.queue.sender()
    }

    /// Handle every queued notification, including ones posted while
    /// handling. Returns how many were handled.
    ///
    /// Events posted by a device or recorder that has since been closed are
    /// discarded without being counted.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(posted) = self.queue.pop() {
            if posted.session.is_some_and(|s| s != self.session) {
                log::debug!("Dropping {:?} from closed session", posted.event);
                continue;
            }
            self.handle_event(posted.event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: CameraEvent) {
        log::trace!("Handling {:?}", event);
        match event {
            CameraEvent::SurfaceCreated(surface) | CameraEvent::SurfaceChanged { surface, .. } => {
                self.on_surface_ready(surface)
            }
            CameraEvent::SurfaceDestroyed(surface) => self.on_surface_destroyed(surface),
            CameraEvent::AutoFocusDone { success } => self.on_auto_focus(success),
            CameraEvent::PictureTaken(data) => self.on_picture_taken(data),
            CameraEvent::RecorderError(message) => {
                log::error!("Recorder reported an error: {}", message);
                self.stop_recording();
            }
        }
    }

    // --- Lifecycle ---

    /// Bind the controller to a host surface.
    ///
    /// The surface is not usable until the host reports it created.
    pub fn init(&mut self, surface: SurfaceHandle) {
        if self.surface != Some(surface) {
            self.surface = Some(surface);
            self.ready_surface = None;
        }
    }

    /// Stop recording and preview.
    pub fn release(&mut self) {
        self.stop_recording();
        self.stop_preview();
    }

    // --- Preview ---

    pub fn start_preview(&mut self) {
        if self.preview.is_wanted() {
            return;
        }
        self.preview = PreviewState::Requested;
        self.attempt_start_preview();
    }

    /// Stop preview; recording and any pending capture end with it.
    pub fn stop_preview(&mut self) {
        if !self.preview.is_wanted() {
            return;
        }
        self.stop_recording();
        self.preview = PreviewState::Idle;
        self.close_device();
    }

    fn attempt_start_preview(&mut self) {
        if self.preview != PreviewState::Requested || self.device.is_some() {
            return;
        }
        let Some(surface) = self.ready_surface else {
            log::debug!("Preview deferred until the surface is ready");
            return;
        };

        let index = self.config.camera_index;
        let mut device = match self.host.open(index, self.queue.session_sender(self.session)) {
            Ok(device) => device,
            Err(e) => {
                log::error!("Failed to open camera {}: {}", index, e);
                self.preview = PreviewState::Idle;
                return;
            }
        };

        self.quirks = self
            .quirks_override
            .unwrap_or_else(|| DeviceQuirks::for_manufacturer(&self.host.manufacturer()));
        self.profile = select_encoder_profile(&self.host, index);

        let caps = match device.capabilities() {
            Ok(caps) => caps,
            Err(e) => {
                log::error!("Failed to query camera {} capabilities: {}", index, e);
                device.release();
                self.session += 1;
                self.preview = PreviewState::Idle;
                return;
            }
        };

        self.negotiated = negotiate(&caps, &self.config, self.profile.as_ref());
        self.focus_trigger = self.negotiated.focus.explicit_trigger;

        if let Err(e) = device.apply_settings(&self.negotiated.device_settings(&self.config)) {
            log::warn!("Camera rejected parameters: {}", e);
        }
        if let Err(e) = device.set_display_orientation(self.config.rotation) {
            log::warn!("Failed to set display orientation: {}", e);
        }
        if let Err(e) = device
            .set_preview_display(surface)
            .and_then(|()| device.start_preview())
        {
            log::error!("Failed to start preview streaming: {}", e);
        }

        log::info!(
            "Preview active on camera {} (preview {:?}, picture {:?}, video {:?}, profile {:?})",
            index,
            self.negotiated.preview_request,
            self.negotiated.picture,
            self.negotiated.video,
            self.profile.as_ref().map(|p| p.tier),
        );
        self.device = Some(device);
        self.preview = PreviewState::Active;

        self.attempt_start_recording();
    }

    fn close_device(&mut self) {
        if let Some(shooter) = self.shooter.take() {
            shooter.abandon();
        }
        let Some(mut device) = self.device.take() else {
            return;
        };
        self.session += 1;
        self.focus_requests = 0;
        if let Err(e) = device.stop_preview() {
            log::warn!("Failed to stop preview streaming: {}", e);
        }
        device.release();
        log::info!("Camera {} released", self.config.camera_index);
    }

    // --- Still capture ---

    /// Default destination for `take_picture` calls without one.
    pub fn set_output_image_file(&mut self, path: Option<PathBuf>) {
        self.output_image_file = path;
    }

    /// Take a picture into `path` without a callback. Stops recording.
    pub fn take_picture_to(&mut self, path: impl AsRef<Path>) {
        self.set_output_image_file(Some(path.as_ref().to_path_buf()));
        self.take_picture(None, None);
    }

    /// Take a still picture. Stops recording.
    ///
    /// `destination` (or the configured output image file) is written only
    /// if it does not exist yet. `callback` receives the decoded picture
    /// exactly once, or never if preview is not active or another capture
    /// is still in flight.
    pub fn take_picture(&mut self, destination: Option<PathBuf>, callback: Option<BitmapCallback>) {
        let destination = destination.or_else(|| self.output_image_file.clone());
        let callback = match destination {
            Some(path) if !path.exists() => Some(with_file_write(path, callback)),
            _ => callback,
        };
        let Some(callback) = callback else {
            return;
        };
        if !self.preview.is_active() || self.device.is_none() {
            log::debug!("Ignoring take_picture: preview is not active");
            return;
        }

        self.stop_recording();
        if self.shooter.is_some() {
            log::debug!("Ignoring take_picture: a capture is already in flight");
            return;
        }

        let mut shooter = Shooter::new(callback);
        log::info!("Taking picture {}", shooter.id());

        if self.focus_trigger && self.request_auto_focus() {
            shooter.set_phase(ShotPhase::Focusing);
            self.shooter = Some(shooter);
            return;
        }
        self.shooter = Some(shooter);
        self.trigger_capture();
    }

    /// Ask the device to focus. `false` when it refused and the caller
    /// should proceed right away.
    fn request_auto_focus(&mut self) -> bool {
        let Some(device) = self.device.as_mut() else {
            return false;
        };
        match device.auto_focus() {
            Ok(()) => {
                self.focus_requests += 1;
                true
            }
            Err(e) => {
                log::warn!("Autofocus rejected, continuing without it: {}", e);
                self.focus_trigger = false;
                false
            }
        }
    }

    fn trigger_capture(&mut self) {
        let (Some(device), Some(shooter)) = (self.device.as_mut(), self.shooter.as_mut()) else {
            return;
        };
        shooter.set_phase(ShotPhase::Capturing);
        if let Err(e) = device.take_picture() {
            log::error!("Still capture failed to start: {}", e);
            self.on_picture_taken(None);
        }
    }

    fn on_picture_taken(&mut self, data: Option<Vec<u8>>) {
        let capturing = self
            .shooter
            .as_ref()
            .is_some_and(|s| s.phase() == ShotPhase::Capturing);
        if !capturing {
            log::debug!("Ignoring picture: no capture is waiting for one");
            return;
        }
        let Some(shooter) = self.shooter.take() else {
            return;
        };

        // A still capture always interrupts streaming.
        if self.preview.is_active() {
            if let Some(device) = self.device.as_mut() {
                if let Err(e) = device.start_preview() {
                    log::warn!("Failed to restart preview after capture: {}", e);
                }
            }
        }

        shooter.deliver(data);
    }

    fn on_auto_focus(&mut self, success: bool) {
        log::debug!("Autofocus finished (success: {})", success);

        // Only the completion of the latest request releases waiters.
        self.focus_requests = self.focus_requests.saturating_sub(1);
        if self.focus_requests > 0 {
            log::debug!("{} autofocus request(s) still outstanding", self.focus_requests);
            return;
        }

        let shot_waiting = self
            .shooter
            .as_ref()
            .is_some_and(|s| s.phase() == ShotPhase::Focusing);
        if shot_waiting {
            self.trigger_capture();
        }
        if self.record == RecordState::Focusing {
            self.begin_recording();
        }
    }

    // --- Recording ---

    pub fn set_output_video_file(&mut self, path: Option<PathBuf>) {
        self.output_video_file = path;
    }

    /// Start recording to the output video file.
    ///
    /// No-op without an output file, if the file exists read-only, or if
    /// recording was already requested. Deferred until preview is active.
    pub fn start_recording(&mut self) {
        let Some(path) = self.output_video_file.as_deref() else {
            log::debug!("Ignoring start_recording: no output file");
            return;
        };
        if !is_writable_target(path) {
            log::warn!("Ignoring start_recording: {} is not writable", path.display());
            return;
        }
        if self.record.is_wanted() {
            return;
        }
        self.record = RecordState::Requested;
        self.attempt_start_recording();
    }

    pub fn stop_recording(&mut self) {
        if !self.record.is_wanted() {
            return;
        }
        let started = self.record.is_recording();
        self.record = RecordState::Idle;
        self.close_recorder(started);
    }

    fn attempt_start_recording(&mut self) {
        if self.record != RecordState::Requested {
            return;
        }
        if !self.preview.is_active() || self.device.is_none() {
            log::debug!("Recording deferred until preview is active");
            return;
        }
        let Some(surface) = self.ready_surface else {
            log::debug!("Recording deferred until the surface is ready");
            return;
        };
        let Some(output_file) = self.output_video_file.clone() else {
            self.record = RecordState::Idle;
            return;
        };
        let Some(device) = self.device.as_mut() else {
            return;
        };

        if let Err(e) = device.unlock() {
            log::error!("Failed to hand the camera to the recorder: {}", e);
            self.record = RecordState::Idle;
            return;
        }

        let events = self.queue.session_sender(self.session);
        let mut recorder = match self.host.new_recorder(device, events) {
            Ok(recorder) => recorder,
            Err(e) => {
                log::error!("Failed to create recorder: {}", e);
                if let Err(e) = device.lock() {
                    log::warn!("Failed to take the camera back: {}", e);
                }
                self.record = RecordState::Idle;
                return;
            }
        };

        let config = RecorderConfig {
            audio_source: AudioSource::Camcorder,
            video_source: VideoSource::Camera,
            encoding: RecorderEncoding::from_profile(self.profile.as_ref()),
            output_file,
            orientation_hint: self.config.rotation,
            video_size: self.negotiated.video,
            preview_display: surface,
        };

        if let Err(e) = recorder.configure(&config).and_then(|()| recorder.prepare()) {
            log::error!("Failed to prepare recorder: {}", e);
            recorder.release();
            if let Err(e) = device.lock() {
                log::warn!("Failed to take the camera back: {}", e);
            }
            self.record = RecordState::Idle;
            return;
        }

        self.recorder = Some(recorder);
        self.record = RecordState::Focusing;

        if self.focus_trigger && self.request_auto_focus() {
            return;
        }
        self.begin_recording();
    }

    fn begin_recording(&mut self) {
        if self.record != RecordState::Focusing {
            return;
        }
        let Some(recorder) = self.recorder.as_mut() else {
            self.record = RecordState::Idle;
            return;
        };
        match recorder.start() {
            Ok(()) => {
                self.record = RecordState::Recording;
                log::info!("Recording to {:?}", self.output_video_file);
            }
            Err(e) => {
                log::error!("Failed to start recorder: {}", e);
                self.record = RecordState::Idle;
                self.close_recorder(false);
            }
        }
    }

    fn close_recorder(&mut self, started: bool) {
        let Some(mut recorder) = self.recorder.take() else {
            return;
        };
        if started {
            if let Err(e) = recorder.stop() {
                log::warn!("Recorder did not stop cleanly: {}", e);
            }
        }
        recorder.release();

        let Some(device) = self.device.as_mut() else {
            return;
        };
        if let Err(e) = device.reconnect() {
            log::error!("Failed to reconnect camera after recording: {}", e);
        }

        if self.quirks.post_stop == PostStopHook::RestartPreview {
            log::debug!("Restarting preview after recording");
            if let Err(e) = device.stop_preview().and_then(|()| device.start_preview()) {
                log::warn!("Failed to restart preview after recording: {}", e);
            }
        }
    }

    // --- Surface ---

    fn on_surface_ready(&mut self, surface: SurfaceHandle) {
        if self.surface != Some(surface) {
            log::debug!("Ignoring unbound surface {:?}", surface);
            return;
        }
        self.ready_surface = Some(surface);

        // Preview start picks up a requested recording on its own.
        if self.preview == PreviewState::Requested {
            self.attempt_start_preview();
        } else {
            self.attempt_start_recording();
        }
    }

    fn on_surface_destroyed(&mut self, surface: SurfaceHandle) {
        if self.surface != Some(surface) {
            return;
        }
        self.release();
        self.surface = None;
        self.ready_surface = None;
    }
}

impl<H: CameraHost> Drop for CaptureController<H> {
    fn drop(&mut self) {
        self.release();
    }
}
