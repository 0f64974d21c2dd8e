use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::UsageError;
use super::size::Size;

/// Largest dimension accepted by default for every size cap.
pub const UNBOUNDED_DIMENSION: u32 = i16::MAX as u32;

/// Clockwise rotation applied to pictures, preview and recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Portrait/landscape reinterpretation: width and height trade places.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = UsageError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(UsageError::InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Caller-set limits for a camera session.
///
/// Can be changed between sessions; sizes are applied the next time
/// preview starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfiguration {
    /// Index of the camera to open (default: 0).
    pub camera_index: usize,

    /// Rotation for pictures, display and the recording hint (default: 0).
    pub rotation: Rotation,

    /// Upper bound for the preview stream.
    pub max_preview: Size,

    /// Upper bound for still pictures.
    pub max_picture: Size,

    /// Upper bound for recorded video frames.
    pub max_video: Size,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), UsageError> {
        for size in [self.max_preview, self.max_picture, self.max_video] {
            check_positive(size.width, size.height)?;
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their default values; `rotation` is given in degrees.
    pub fn from_json_str(json: &str) -> Result<Self, UsageError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            UsageError::InvalidConfiguration(format!("failed to parse configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, UsageError> {
        let json = fs::read_to_string(path).map_err(|e| {
            UsageError::InvalidConfiguration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        let unbounded = Size::new(UNBOUNDED_DIMENSION, UNBOUNDED_DIMENSION);
        Self {
            camera_index: 0,
            rotation: Rotation::Deg0,
            max_preview: unbounded,
            max_picture: unbounded,
            max_video: unbounded,
        }
    }
}

/// Reject a size cap with a zero dimension.
pub fn check_positive(width: u32, height: u32) -> Result<Size, UsageError> {
    if width == 0 || height == 0 {
        return Err(UsageError::NonPositiveDimensions { width, height });
    }
    Ok(Size::new(width, height))
}
