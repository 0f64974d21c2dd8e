use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::SurfaceHandle;
use crate::models::size::Size;

/// Notifications from the host platform.
///
/// Posted from wherever the host reports them and handled in order on the
/// thread that owns the `CaptureController`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    SurfaceCreated(SurfaceHandle),
    SurfaceChanged { surface: SurfaceHandle, size: Size },
    SurfaceDestroyed(SurfaceHandle),
    AutoFocusDone { success: bool },
    /// Final JPEG of a still capture; `None` if the device produced nothing.
    PictureTaken(Option<Vec<u8>>),
    RecorderError(String),
}

/// An event as queued, tagged with the device session that posted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedEvent {
    /// `None` for host-wide notifications such as surface changes.
    pub session: Option<u64>,
    pub event: CameraEvent,
}

/// FIFO of pending host notifications shared with the host.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Arc<Mutex<VecDeque<PostedEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle the host uses to post events.
    pub fn sender(&self) -> EventSender {
        EventSender {
            session: None,
            events: Arc::clone(&self.events),
        }
    }

    /// A handle whose events are stamped with `session`.
    ///
    /// Handed to devices and recorders so their late completions can be told
    /// apart from those of a newer session.
    pub fn session_sender(&self, session: u64) -> EventSender {
        EventSender {
            session: Some(session),
            events: Arc::clone(&self.events),
        }
    }

    /// Take the oldest pending event.
    ///
    /// The lock is released before the event is returned, so handlers may
    /// post follow-up events.
    pub fn pop(&self) -> Option<PostedEvent> {
        self.events.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

/// Cloneable posting end of an `EventQueue`.
#[derive(Debug, Clone)]
pub struct EventSender {
    session: Option<u64>,
    events: Arc<Mutex<VecDeque<PostedEvent>>>,
}

impl EventSender {
    pub fn post(&self, event: CameraEvent) {
        self.events.lock().push_back(PostedEvent {
            session: self.session,
            event,
        });
    }
}
