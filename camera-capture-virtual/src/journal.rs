use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::models::camera_models::{DeviceSettings, RecorderConfig, SurfaceHandle};
use camera_capture_core::models::config::Rotation;

/// One call made into the virtual host, device or recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Open(usize),
    ApplySettings(DeviceSettings),
    DisplayOrientation(Rotation),
    SetPreviewDisplay(SurfaceHandle),
    StartPreview,
    StopPreview,
    AutoFocus,
    TakePicture,
    Unlock,
    Lock,
    Reconnect,
    Release,
    RecorderConfigure(RecorderConfig),
    RecorderPrepare,
    RecorderStart,
    RecorderStop,
    RecorderRelease,
}

/// Shared, append-only log of host calls for assertions.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: HostCall) {
        log::trace!("virtual host: {:?}", call);
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn contains(&self, call: &HostCall) -> bool {
        self.count(call) > 0
    }

    /// Position of the first matching call.
    pub fn position(&self, call: &HostCall) -> Option<usize> {
        self.calls.lock().iter().position(|c| c == call)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
