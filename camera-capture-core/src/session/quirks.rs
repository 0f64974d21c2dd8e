/// What to do with the device after a recorder hands control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostStopHook {
    #[default]
    None,
    /// Stop and restart preview streaming; some firmware otherwise fails the
    /// next still capture after a recording.
    RestartPreview,
}

/// Per-manufacturer workarounds, resolved once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceQuirks {
    pub post_stop: PostStopHook,
}

/// Known manufacturer workarounds, matched case-insensitively.
const QUIRK_TABLE: &[(&str, DeviceQuirks)] = &[(
    "samsung",
    DeviceQuirks {
        post_stop: PostStopHook::RestartPreview,
    },
)];

impl DeviceQuirks {
    pub fn for_manufacturer(manufacturer: &str) -> Self {
        QUIRK_TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(manufacturer.trim()))
            .map(|(_, quirks)| *quirks)
            .unwrap_or_default()
    }
}
