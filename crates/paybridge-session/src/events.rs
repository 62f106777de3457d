//! Consumer-facing event surface.
//!
//! Unsolicited notifications relayed from the SDK, already translated into
//! the stable wire vocabulary. Events are emitted in the exact order the
//! dispatcher applied the underlying state transitions.

use paybridge_wire::{ReaderPayload, UpdatePayload};
use serde::Serialize;

/// An unsolicited session event.
///
/// Serialized with an `event` tag carrying the event name and a `payload`
/// object carrying the wire fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum SessionEvent {
    /// The SDK needs a fresh connection token; answer with
    /// `setConnectionToken`.
    RequestConnectionToken,

    /// Connection status changed (wire integer).
    #[serde(rename_all = "camelCase")]
    DidChangeConnectionStatus { status: i64 },

    /// Payment readiness changed (wire integer).
    #[serde(rename_all = "camelCase")]
    DidChangePaymentStatus { status: i64 },

    /// The connected reader's battery is critically low.
    DidReportLowBatteryWarning,

    /// Card inserted/removed (wire integer).
    #[serde(rename_all = "camelCase")]
    DidReportReaderEvent { event: i64 },

    /// The reader disconnected without a disconnect command.
    #[serde(rename_all = "camelCase")]
    DidReportUnexpectedReaderDisconnect { reader: ReaderPayload },

    /// A discovery pass produced an updated result set.
    #[serde(rename_all = "camelCase")]
    ReadersDiscovered { readers: Vec<ReaderPayload> },

    /// The reader wants a prompt shown to the cardholder.
    #[serde(rename_all = "camelCase")]
    DidRequestReaderDisplayMessage { value: i64, text: String },

    /// The reader is waiting for card input.
    #[serde(rename_all = "camelCase")]
    DidRequestReaderInput { value: String },

    /// Firmware install progress in `0.0..=1.0`.
    #[serde(rename_all = "camelCase")]
    DidReportReaderSoftwareUpdateProgress { progress: f32 },

    /// A firmware install began.
    #[serde(rename_all = "camelCase")]
    DidStartInstallingUpdate { update: UpdatePayload },

    /// A firmware install terminated; exactly one of the fields is set.
    #[serde(rename_all = "camelCase")]
    DidFinishInstallingUpdate {
        update: Option<UpdatePayload>,
        error: Option<String>,
    },

    /// The SDK found a firmware update for the connected reader.
    #[serde(rename_all = "camelCase")]
    DidReportAvailableUpdate { update: UpdatePayload },

    /// Periodic battery reading (status is a wire integer).
    #[serde(rename_all = "camelCase")]
    DidReportBatteryLevel {
        battery_level: f32,
        battery_status: i64,
        is_charging: bool,
    },

    /// The SDK began reconnecting after an unexpected disconnect.
    DidStartReaderReconnect,

    /// The reconnect attempt succeeded.
    DidSucceedReaderReconnect,

    /// The reconnect attempt gave up.
    DidFailReaderReconnect,
}

impl SessionEvent {
    /// The event name, as consumers subscribe to it.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RequestConnectionToken => "requestConnectionToken",
            SessionEvent::DidChangeConnectionStatus { .. } => "didChangeConnectionStatus",
            SessionEvent::DidChangePaymentStatus { .. } => "didChangePaymentStatus",
            SessionEvent::DidReportLowBatteryWarning => "didReportLowBatteryWarning",
            SessionEvent::DidReportReaderEvent { .. } => "didReportReaderEvent",
            SessionEvent::DidReportUnexpectedReaderDisconnect { .. } => {
                "didReportUnexpectedReaderDisconnect"
            }
            SessionEvent::ReadersDiscovered { .. } => "readersDiscovered",
            SessionEvent::DidRequestReaderDisplayMessage { .. } => {
                "didRequestReaderDisplayMessage"
            }
            SessionEvent::DidRequestReaderInput { .. } => "didRequestReaderInput",
            SessionEvent::DidReportReaderSoftwareUpdateProgress { .. } => {
                "didReportReaderSoftwareUpdateProgress"
            }
            SessionEvent::DidStartInstallingUpdate { .. } => "didStartInstallingUpdate",
            SessionEvent::DidFinishInstallingUpdate { .. } => "didFinishInstallingUpdate",
            SessionEvent::DidReportAvailableUpdate { .. } => "didReportAvailableUpdate",
            SessionEvent::DidReportBatteryLevel { .. } => "didReportBatteryLevel",
            SessionEvent::DidStartReaderReconnect => "didStartReaderReconnect",
            SessionEvent::DidSucceedReaderReconnect => "didSucceedReaderReconnect",
            SessionEvent::DidFailReaderReconnect => "didFailReaderReconnect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag_and_payload() {
        let event = SessionEvent::DidChangeConnectionStatus { status: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "didChangeConnectionStatus");
        assert_eq!(json["payload"]["status"], 2);
    }

    #[test]
    fn unit_events_carry_only_the_tag() {
        let json = serde_json::to_value(SessionEvent::DidReportLowBatteryWarning).unwrap();
        assert_eq!(json["event"], "didReportLowBatteryWarning");
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn finish_event_keeps_explicit_null_fields() {
        let event = SessionEvent::DidFinishInstallingUpdate {
            update: None,
            error: Some("update interrupted".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["payload"]["update"].is_null());
        assert_eq!(json["payload"]["error"], "update interrupted");
    }

    #[test]
    fn names_match_wire_contract() {
        assert_eq!(
            SessionEvent::RequestConnectionToken.name(),
            "requestConnectionToken"
        );
        assert_eq!(
            SessionEvent::DidReportReaderSoftwareUpdateProgress { progress: 0.5 }.name(),
            "didReportReaderSoftwareUpdateProgress"
        );
    }
}
