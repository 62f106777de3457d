//! Reader connection state.

use paybridge_sdk::enums::ConnectionStatus;
use paybridge_sdk::models::Reader;
use tracing::debug;

/// Tracks the connection status and the connected reader snapshot.
///
/// Transitions are driven entirely by SDK callbacks; connect preconditions
/// are the SDK's to enforce, so nothing here rejects a transition. It only
/// records what the SDK reported, inside the session's serialized execution
/// domain.
#[derive(Debug)]
pub struct ConnectionStateMachine {
    status: ConnectionStatus,
    connected_reader: Option<Reader>,
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateMachine {
    /// Start out not connected.
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::NotConnected,
            connected_reader: None,
        }
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// The connected reader, when status is `Connected`.
    pub fn connected_reader(&self) -> Option<&Reader> {
        self.connected_reader.as_ref()
    }

    /// Returns `true` when a reader is connected.
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Record an SDK-reported status change. Dropping to `NotConnected`
    /// discards the reader snapshot. Returns the previous status.
    pub fn apply_status(&mut self, status: ConnectionStatus) -> ConnectionStatus {
        let previous = self.status;
        if previous != status {
            debug!(from = ?previous, to = ?status, "connection status changed");
        }
        self.status = status;
        if status == ConnectionStatus::NotConnected {
            self.connected_reader = None;
        }
        previous
    }

    /// Record a successful connect callback.
    pub fn on_connected(&mut self, reader: Reader) {
        debug!(serial = %reader.serial_number, "reader connected");
        self.status = ConnectionStatus::Connected;
        self.connected_reader = Some(reader);
    }

    /// Record a disconnect, commanded or unexpected.
    pub fn on_disconnected(&mut self) {
        self.status = ConnectionStatus::NotConnected;
        self.connected_reader = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybridge_sdk::enums::DeviceType;

    #[test]
    fn starts_not_connected() {
        let machine = ConnectionStateMachine::new();
        assert_eq!(machine.status(), ConnectionStatus::NotConnected);
        assert!(machine.connected_reader().is_none());
    }

    #[test]
    fn connect_stores_reader_snapshot() {
        let mut machine = ConnectionStateMachine::new();
        machine.apply_status(ConnectionStatus::Connecting);
        machine.on_connected(Reader::new("sn-1", DeviceType::WisePad3));

        assert!(machine.is_connected());
        assert_eq!(
            machine.connected_reader().map(|r| r.serial_number.as_str()),
            Some("sn-1")
        );
    }

    #[test]
    fn dropping_to_not_connected_discards_reader() {
        let mut machine = ConnectionStateMachine::new();
        machine.on_connected(Reader::new("sn-1", DeviceType::WisePad3));

        let previous = machine.apply_status(ConnectionStatus::NotConnected);
        assert_eq!(previous, ConnectionStatus::Connected);
        assert!(machine.connected_reader().is_none());
    }

    #[test]
    fn disconnect_resets_everything() {
        let mut machine = ConnectionStateMachine::new();
        machine.on_connected(Reader::new("sn-1", DeviceType::WisePad3));
        machine.on_disconnected();

        assert_eq!(machine.status(), ConnectionStatus::NotConnected);
        assert!(machine.connected_reader().is_none());
    }
}
