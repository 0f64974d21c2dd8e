//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Sequences preview, still capture and video recording against a host
//! camera subsystem. Platform backends implement the `CameraHost`,
//! `CameraDevice` and `MediaRecorder` traits and plug into the generic
//! `CaptureController`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CameraHost, CameraDevice, MediaRecorder, BitmapCallback
//! ├── models/       ← Size, CameraConfiguration, UsageError, RuntimeFailure, states
//! ├── selection/    ← size selection, stream/focus negotiation
//! ├── session/      ← CaptureController, EventQueue, DeviceQuirks, Shooter
//! ├── processing/   ← bitmap rotation, mirroring, EXIF orientation
//! └── storage/      ← JPEG persistence, media file helpers
//! ```

pub mod models;
pub mod processing;
pub mod selection;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::camera_models::{
    DeviceCapabilities, DeviceSettings, EncoderProfile, FocusMode, QualityTier, RecorderConfig,
    RecorderEncoding, SurfaceHandle,
};
pub use models::config::{CameraConfiguration, Rotation};
pub use models::error::{RuntimeFailure, UsageError};
pub use models::size::Size;
pub use models::state::{PreviewState, RecordState};
pub use processing::bitmap::MirrorAxis;
pub use selection::negotiation::{FocusPlan, Negotiated};
pub use selection::size_selector::select_best;
pub use session::controller::CaptureController;
pub use session::queue::{CameraEvent, EventQueue, EventSender, PostedEvent};
pub use session::quirks::{DeviceQuirks, PostStopHook};
pub use storage::picture_writer::with_file_write;
pub use traits::camera_device::CameraDevice;
pub use traits::camera_host::CameraHost;
pub use traits::media_recorder::MediaRecorder;
pub use traits::picture_callback::BitmapCallback;
