use image::DynamicImage;
use uuid::Uuid;

use crate::models::error::RuntimeFailure;
use crate::traits::picture_callback::BitmapCallback;

/// Where an in-flight still capture currently waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    /// Waiting for the autofocus pass to complete.
    Focusing,
    /// Still capture triggered; waiting for the JPEG.
    Capturing,
}

/// One in-flight `take_picture` request.
///
/// Consuming `deliver`/`abandon` is the only way to reach the callback, so
/// it runs at most once; dropping a `Shooter` silently discards it.
pub struct Shooter {
    id: Uuid,
    phase: ShotPhase,
    callback: BitmapCallback,
}

impl Shooter {
    pub fn new(callback: BitmapCallback) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: ShotPhase::Capturing,
            callback,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: ShotPhase) {
        self.phase = phase;
    }

    /// Decode the device's JPEG and hand the result to the callback.
    pub fn deliver(self, jpeg: Option<Vec<u8>>) {
        let bitmap = jpeg.and_then(|data| match decode_picture(&data) {
            Ok(bmp) => Some(bmp),
            Err(e) => {
                log::warn!("Picture {} could not be decoded: {}", self.id, e);
                None
            }
        });
        log::debug!("Delivering picture {} (decoded: {})", self.id, bitmap.is_some());
        (self.callback)(bitmap);
    }

    /// Resolve the request without a picture.
    pub fn abandon(self) {
        log::debug!("Picture {} abandoned", self.id);
        (self.callback)(None);
    }
}

pub fn decode_picture(data: &[u8]) -> Result<DynamicImage, RuntimeFailure> {
    if data.is_empty() {
        return Err(RuntimeFailure::Decode("empty picture buffer".into()));
    }
    image::load_from_memory(data).map_err(|e| RuntimeFailure::Decode(e.to_string()))
}
