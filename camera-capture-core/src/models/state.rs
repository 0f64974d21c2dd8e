/// Preview lifecycle.
///
/// ```text
/// idle → requested → active → idle
///          ↑   (surface ready)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    /// Preview was asked for; waiting for a ready surface.
    Requested,
    Active,
}

impl PreviewState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether the caller currently wants preview running.
    pub fn is_wanted(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Recording lifecycle.
///
/// ```text
/// idle → requested → focusing → recording → idle
///            └───────────────────────┘ (no focus trigger)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordState {
    #[default]
    Idle,
    /// Recording was asked for; waiting for preview and a ready surface.
    Requested,
    /// Recorder prepared; waiting for autofocus before starting.
    Focusing,
    Recording,
}

impl RecordState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_wanted(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}
