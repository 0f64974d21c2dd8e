//! Derives stream sizes and focus behavior from device capabilities.
//!
//! Runs once per preview start, before any parameter reaches the device.

use crate::models::camera_models::{
    DeviceCapabilities, DeviceSettings, EncoderProfile, FocusMode, PictureFormat, QualityTier,
};
use crate::models::config::CameraConfiguration;
use crate::models::size::Size;
use crate::selection::size_selector::select_best_within;
use crate::traits::camera_host::CameraHost;

/// Focus mode to apply and whether captures must trigger a focus pass first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusPlan {
    pub mode: Option<FocusMode>,
    pub explicit_trigger: bool,
}

/// Outcome of size and focus negotiation for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Negotiated {
    /// Preview size in the device's native orientation.
    pub preview_request: Option<Size>,
    /// Preview size as seen by the caller (swapped for 90/270 rotation).
    pub reported_preview: Option<Size>,
    pub picture: Option<Size>,
    /// Only known when the device streams video independently of preview.
    pub video: Option<Size>,
    pub focus: FocusPlan,
}

impl Negotiated {
    /// Parameters to push to the device for this negotiation.
    pub fn device_settings(&self, config: &CameraConfiguration) -> DeviceSettings {
        DeviceSettings {
            preview_size: self.preview_request,
            picture_size: self.picture,
            focus_mode: self.focus.mode,
            rotation: config.rotation,
            picture_format: PictureFormat::Jpeg,
        }
    }
}

/// First encoder profile the host offers for `index`, best tier first.
pub fn select_encoder_profile<H: CameraHost + ?Sized>(
    host: &H,
    index: usize,
) -> Option<EncoderProfile> {
    QualityTier::PREFERENCE
        .iter()
        .find_map(|tier| host.encoder_profile(index, *tier))
}

pub fn negotiate(
    caps: &DeviceCapabilities,
    config: &CameraConfiguration,
    profile: Option<&EncoderProfile>,
) -> Negotiated {
    let mut video = None;
    let mut preview = None;

    // Independent streams: the recorder gets its own size.
    if let Some(video_sizes) = &caps.video_sizes {
        video = select_best_within(config.max_video, video_sizes);
        preview = caps
            .preferred_preview_size_for_video
            .or_else(|| select_best_within(config.max_preview, &caps.preview_sizes));
    }

    // Shared stream: the encoded size must match the preview size.
    if preview.is_none() {
        if let Some(profile) = profile {
            preview = caps
                .preview_sizes
                .iter()
                .copied()
                .find(|s| *s == profile.frame_size);
        }
    }

    if preview.is_none() {
        let cap = config.max_preview.min(&config.max_video);
        preview = select_best_within(cap, &caps.preview_sizes);
    }

    let reported_preview = preview.map(|s| {
        if config.rotation.swaps_axes() {
            s.transposed()
        } else {
            s
        }
    });

    Negotiated {
        preview_request: preview,
        reported_preview,
        picture: select_best_within(config.max_picture, &caps.picture_sizes),
        video,
        focus: plan_focus(caps.focus_modes.as_deref()),
    }
}

/// Continuous video, then continuous picture, then plain auto focus.
pub fn plan_focus(modes: Option<&[FocusMode]>) -> FocusPlan {
    let Some(modes) = modes else {
        return FocusPlan::default();
    };

    let mode = [FocusMode::ContinuousVideo, FocusMode::ContinuousPicture, FocusMode::Auto]
        .into_iter()
        .find(|m| modes.contains(m));

    FocusPlan {
        mode,
        explicit_trigger: mode.is_some_and(|m| m.needs_trigger()),
    }
}
