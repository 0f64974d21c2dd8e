//! Software recorder that writes test-pattern frames to the output file.

use std::fs::File;
use std::io::Write;

use camera_capture_core::models::camera_models::{RecorderConfig, RecorderEncoding};
use camera_capture_core::models::error::RuntimeFailure;
use camera_capture_core::models::size::Size;
use camera_capture_core::session::queue::{CameraEvent, EventSender};
use camera_capture_core::traits::media_recorder::MediaRecorder;

use crate::device::render_test_pattern;
use crate::host::VirtualCameraSpec;
use crate::journal::{CallJournal, HostCall};

const DEFAULT_VIDEO_FRAME: Size = Size::new(320, 240);

/// Recorder created by `VirtualCameraHost::new_recorder`.
///
/// `prepare` creates (truncates) the output file; `stop` appends one JPEG
/// frame at the negotiated video size.
pub struct VirtualRecorder {
    config: Option<RecorderConfig>,
    file: Option<File>,
    started: bool,
    fail_prepare: bool,
    fail_start: bool,
    fail_while_recording: bool,
    events: EventSender,
    journal: CallJournal,
}

impl VirtualRecorder {
    pub(crate) fn new(spec: &VirtualCameraSpec, events: EventSender, journal: CallJournal) -> Self {
        Self {
            config: None,
            file: None,
            started: false,
            fail_prepare: spec.fail_prepare,
            fail_start: spec.fail_start,
            fail_while_recording: spec.fail_while_recording,
            events,
            journal,
        }
    }

    fn frame_size(config: &RecorderConfig) -> Size {
        config.video_size.unwrap_or(match &config.encoding {
            RecorderEncoding::Profile(profile) => profile.frame_size,
            RecorderEncoding::Defaults { .. } => DEFAULT_VIDEO_FRAME,
        })
    }
}

impl MediaRecorder for VirtualRecorder {
    fn configure(&mut self, config: &RecorderConfig) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::RecorderConfigure(config.clone()));
        self.config = Some(config.clone());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::RecorderPrepare);
        if self.fail_prepare {
            return Err(RuntimeFailure::Recorder("encoder unavailable".into()));
        }
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| RuntimeFailure::Recorder("recorder not configured".into()))?;

        let file = File::create(&config.output_file).map_err(|e| {
            let path = config.output_file.display();
            RuntimeFailure::Recorder(format!("failed to create {}: {}", path, e))
        })?;
        self.file = Some(file);
        Ok(())
    }

    fn start(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::RecorderStart);
        if self.file.is_none() {
            return Err(RuntimeFailure::Recorder("recorder not prepared".into()));
        }
        if self.fail_start {
            return Err(RuntimeFailure::Recorder("camera source not available".into()));
        }
        self.started = true;
        if self.fail_while_recording {
            self.events.post(CameraEvent::RecorderError("storage full".into()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RuntimeFailure> {
        self.journal.record(HostCall::RecorderStop);
        if !self.started {
            return Err(RuntimeFailure::Recorder("recorder not started".into()));
        }
        self.started = false;

        let (Some(config), Some(file)) = (self.config.as_ref(), self.file.as_mut()) else {
            return Err(RuntimeFailure::Recorder("recorder not prepared".into()));
        };
        let frame = render_test_pattern(Self::frame_size(config), 0)?;
        file.write_all(&frame)
            .and_then(|()| file.flush())
            .map_err(|e| RuntimeFailure::Recorder(format!("failed to write frame: {}", e)))?;
        Ok(())
    }

    fn release(&mut self) {
        self.journal.record(HostCall::RecorderRelease);
        self.file = None;
        self.started = false;
    }
}
