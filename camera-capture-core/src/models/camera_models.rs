use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::Rotation;
use super::size::Size;

/// Opaque identifier of a host display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Focus modes a device may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    ContinuousVideo,
    ContinuousPicture,
    Auto,
    Fixed,
    Infinity,
    Macro,
}

impl FocusMode {
    /// Whether the lens only focuses when explicitly asked to.
    pub fn needs_trigger(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// Still image encoding requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureFormat {
    #[default]
    Jpeg,
}

/// Everything the device reports about what it can stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    pub preview_sizes: Vec<Size>,
    pub picture_sizes: Vec<Size>,
    /// `Some` when preview and video run as independent streams.
    pub video_sizes: Option<Vec<Size>>,
    pub preferred_preview_size_for_video: Option<Size>,
    /// `None` when the device exposes no focus control at all.
    pub focus_modes: Option<Vec<FocusMode>>,
}

/// Parameters pushed to the device before streaming starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceSettings {
    pub preview_size: Option<Size>,
    pub picture_size: Option<Size>,
    pub focus_mode: Option<FocusMode>,
    pub rotation: Rotation,
    pub picture_format: PictureFormat,
}

/// Encoder quality tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    High,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    Qvga,
}

impl QualityTier {
    /// Order in which tiers are queried from the host.
    pub const PREFERENCE: [QualityTier; 5] = [
        QualityTier::High,
        QualityTier::P1080,
        QualityTier::P720,
        QualityTier::P480,
        QualityTier::Qvga,
    ];
}

/// Container format written by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Default,
    Mpeg4,
    ThreeGpp,
    Webm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Default,
    H263,
    H264,
    Hevc,
    Vp8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Default,
    AmrNb,
    Aac,
    Vorbis,
}

/// Bundle of format, bitrate and resolution defaults for one quality tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderProfile {
    pub tier: QualityTier,
    pub output_format: OutputFormat,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub frame_size: Size,
    pub frame_rate: u32,
    pub video_bit_rate: u32,
    pub audio_bit_rate: u32,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioSource {
    Camcorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoSource {
    Camera,
}

/// How the recorder should encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEncoding {
    Profile(EncoderProfile),
    /// Generic host defaults for container, audio and video codecs.
    Defaults {
        output_format: OutputFormat,
        audio_codec: AudioCodec,
        video_codec: VideoCodec,
    },
}

impl RecorderEncoding {
    pub fn from_profile(profile: Option<&EncoderProfile>) -> Self {
        match profile {
            Some(profile) => Self::Profile(profile.clone()),
            None => Self::Defaults {
                output_format: OutputFormat::Default,
                audio_codec: AudioCodec::Default,
                video_codec: VideoCodec::Default,
            },
        }
    }
}

/// Full recorder setup handed to the host before `prepare`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    pub audio_source: AudioSource,
    pub video_source: VideoSource,
    pub encoding: RecorderEncoding,
    pub output_file: PathBuf,
    pub orientation_hint: Rotation,
    pub video_size: Option<Size>,
    pub preview_display: SurfaceHandle,
}
