//! Registry of the most recent discovery result set.

use paybridge_core::{Result, SessionError};
use paybridge_sdk::models::Reader;
use tracing::debug;

/// Holds the latest discovery snapshot and resolves serial numbers to
/// concrete reader handles.
///
/// The snapshot is replaced wholesale on every discovery callback; readers
/// from superseded snapshots are unreachable. A connect command may only
/// target something the consumer was just shown.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    snapshot: Vec<Reader>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the snapshot with the latest discovery results.
    pub fn replace(&mut self, readers: Vec<Reader>) {
        debug!(count = readers.len(), "discovery snapshot replaced");
        self.snapshot = readers;
    }

    /// The current snapshot, in discovery order.
    pub fn snapshot(&self) -> &[Reader] {
        &self.snapshot
    }

    /// Look up a reader by serial number in the current snapshot.
    ///
    /// # Errors
    ///
    /// `MissingParameter` when `serial_number` is empty, `ReaderNotFound`
    /// when no reader in the current snapshot matches.
    pub fn resolve(&self, serial_number: &str) -> Result<&Reader> {
        if serial_number.trim().is_empty() {
            return Err(SessionError::missing("serialNumber"));
        }
        self.snapshot
            .iter()
            .find(|reader| reader.serial_number == serial_number)
            .ok_or_else(|| SessionError::reader_not_found(serial_number))
    }

    /// Number of readers in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Returns `true` when no discovery results are held.
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Drop the snapshot entirely.
    pub fn clear(&mut self) {
        self.snapshot.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybridge_sdk::enums::DeviceType;

    fn reader(serial: &str) -> Reader {
        Reader::new(serial, DeviceType::Chipper2x)
    }

    #[test]
    fn resolve_finds_exact_serial() {
        let mut registry = DeviceRegistry::new();
        registry.replace(vec![reader("sn-1"), reader("sn-2")]);

        assert_eq!(registry.resolve("sn-2").unwrap().serial_number, "sn-2");
    }

    #[test]
    fn resolve_rejects_empty_serial() {
        let mut registry = DeviceRegistry::new();
        registry.replace(vec![reader("sn-1")]);

        assert!(matches!(
            registry.resolve(""),
            Err(SessionError::MissingParameter {
                field: "serialNumber"
            })
        ));
        assert!(matches!(
            registry.resolve("   "),
            Err(SessionError::MissingParameter { .. })
        ));
    }

    #[test]
    fn resolve_fails_for_unknown_serial() {
        let mut registry = DeviceRegistry::new();
        registry.replace(vec![reader("sn-1")]);

        assert!(matches!(
            registry.resolve("sn-9"),
            Err(SessionError::ReaderNotFound { serial }) if serial == "sn-9"
        ));
    }

    #[test]
    fn superseded_snapshot_is_unreachable() {
        let mut registry = DeviceRegistry::new();
        registry.replace(vec![reader("sn-old")]);
        registry.replace(vec![reader("sn-new")]);

        assert!(registry.resolve("sn-new").is_ok());
        assert!(matches!(
            registry.resolve("sn-old"),
            Err(SessionError::ReaderNotFound { .. })
        ));
        assert_eq!(registry.len(), 1);
    }
}
