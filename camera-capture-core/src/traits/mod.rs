pub mod camera_device;
pub mod camera_host;
pub mod media_recorder;
pub mod picture_callback;
