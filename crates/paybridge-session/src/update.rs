//! Reader firmware-update lifecycle.

use paybridge_sdk::models::FirmwareUpdate;
use tracing::debug;

/// Tracks the zero-or-one firmware update the SDK reported for the
/// connected reader, plus whether an install is running.
///
/// The update reference is cleared when an install finishes, success or
/// failure alike. An install command with nothing available is a no-op, not
/// an error: the absence of an update is a normal state.
#[derive(Debug, Default)]
pub struct UpdateLifecycle {
    available: Option<FirmwareUpdate>,
    installing: bool,
}

impl UpdateLifecycle {
    /// Start out with no update known.
    pub fn new() -> Self {
        Self::default()
    }

    /// The update the SDK reported as available, if any.
    pub fn available(&self) -> Option<&FirmwareUpdate> {
        self.available.as_ref()
    }

    /// Returns `true` while an install is running.
    pub fn is_installing(&self) -> bool {
        self.installing
    }

    /// Record an update the SDK discovered.
    pub fn report_available(&mut self, update: FirmwareUpdate) {
        debug!(version = %update.version, "reader update available");
        self.available = Some(update);
    }

    /// Record that the SDK began installing `update`.
    pub fn install_started(&mut self, update: FirmwareUpdate) {
        self.available = Some(update);
        self.installing = true;
    }

    /// Record install termination, success or failure; the update
    /// reference is dropped either way.
    pub fn finish(&mut self) {
        self.available = None;
        self.installing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use paybridge_sdk::enums::UpdateTimeEstimate;

    fn update(version: &str) -> FirmwareUpdate {
        FirmwareUpdate {
            version: version.to_string(),
            components: vec!["firmware".to_string()],
            required_at: Utc::now(),
            time_estimate: UpdateTimeEstimate::LessThanOneMinute,
        }
    }

    #[test]
    fn starts_with_nothing_available() {
        let lifecycle = UpdateLifecycle::new();
        assert!(lifecycle.available().is_none());
        assert!(!lifecycle.is_installing());
    }

    #[test]
    fn install_start_tracks_the_update() {
        let mut lifecycle = UpdateLifecycle::new();
        lifecycle.report_available(update("2.0.1"));
        lifecycle.install_started(update("2.0.1"));

        assert!(lifecycle.is_installing());
        assert_eq!(lifecycle.available().map(|u| u.version.as_str()), Some("2.0.1"));
    }

    #[test]
    fn finish_clears_update_on_any_outcome() {
        let mut lifecycle = UpdateLifecycle::new();
        lifecycle.install_started(update("2.0.1"));
        lifecycle.finish();

        assert!(lifecycle.available().is_none());
        assert!(!lifecycle.is_installing());
    }
}
