//! # camera-capture-virtual
//!
//! Software camera backend for camera-capture-kit.
//!
//! Provides:
//! - `VirtualCameraHost`: `CameraHost` with configurable cameras and failure injection
//! - `VirtualCameraDevice`: renders test-pattern JPEG stills at the negotiated size
//! - `VirtualRecorder`: writes test-pattern frames to the output file
//! - `CallJournal`: shared log of every host call, for assertions
//!
//! ## Usage
//! ```ignore
//! use camera_capture_core::{CameraEvent, CaptureController, SurfaceHandle};
//! use camera_capture_virtual::VirtualCameraHost;
//!
//! let mut camera = CaptureController::new(VirtualCameraHost::default());
//! camera.init(SurfaceHandle(1));
//! camera.start_preview();
//! camera.event_sender().post(CameraEvent::SurfaceCreated(SurfaceHandle(1)));
//! camera.dispatch_pending();
//! ```

pub mod device;
pub mod host;
pub mod journal;
pub mod recorder;

pub use device::VirtualCameraDevice;
pub use host::{VirtualCameraHost, VirtualCameraSpec};
pub use journal::{CallJournal, HostCall};
pub use recorder::VirtualRecorder;
