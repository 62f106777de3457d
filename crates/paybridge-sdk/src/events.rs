//! The unified SDK callback stream.
//!
//! The vendor SDK signals everything, command completions and unsolicited
//! notifications alike, through listener callbacks with no thread affinity.
//! This module funnels all of them into one [`SdkEvent`] enum delivered over
//! a channel, so a single consumer task can serialize them.

use crate::cancel::CancelHandle;
use crate::enums::{
    BatteryStatus, ConnectionStatus, PaymentStatus, ReaderDisplayMessage, ReaderEvent,
    ReaderInputOptions,
};
use crate::models::{FirmwareUpdate, Location, PaymentIntent, Reader};
use paybridge_core::SdkError;
use tokio::sync::{mpsc, oneshot};

/// One page of the location listing.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPage {
    pub locations: Vec<Location>,
    pub has_more: bool,
}

/// The SDK's request for a fresh connection token.
///
/// The bridge relays the request to the host application and feeds the
/// answer back through [`respond`](ConnectionTokenRequest::respond). Dropping
/// the request without responding leaves the SDK's fetch pending until it
/// times out on its own; the bridge never does that deliberately.
#[derive(Debug)]
pub struct ConnectionTokenRequest {
    reply: oneshot::Sender<Result<String, SdkError>>,
}

impl ConnectionTokenRequest {
    /// Create a request plus the receiver the SDK side awaits.
    pub fn new() -> (Self, oneshot::Receiver<Result<String, SdkError>>) {
        let (reply, rx) = oneshot::channel();
        (Self { reply }, rx)
    }

    /// Deliver the token (or the host's failure) to the SDK.
    pub fn respond(self, outcome: Result<String, SdkError>) {
        // The SDK may have timed out and dropped its receiver; nothing to do.
        let _ = self.reply.send(outcome);
    }
}

/// Every callback the vendor SDK can deliver, as one stream.
///
/// Variants ending in `Finished` resolve a command previously handed to the
/// SDK; the rest are unsolicited.
#[derive(Debug)]
pub enum SdkEvent {
    /// The SDK needs a connection token from the host backend.
    ConnectionTokenRequested(ConnectionTokenRequest),

    /// Reader connection status changed.
    ConnectionStatusChanged(ConnectionStatus),

    /// Payment readiness changed.
    PaymentStatusChanged(PaymentStatus),

    /// The connected reader's battery is critically low.
    LowBatteryWarning,

    /// Card inserted into / removed from the connected reader.
    ReaderEvent(ReaderEvent),

    /// The reader disconnected without a disconnect command.
    UnexpectedDisconnect(Reader),

    /// A discovery pass produced an updated result set.
    ReadersDiscovered(Vec<Reader>),

    /// The discovery operation terminated.
    DiscoveryFinished(Result<(), SdkError>),

    /// A connect command resolved.
    ConnectFinished(Result<Reader, SdkError>),

    /// A disconnect command resolved.
    DisconnectFinished(Result<(), SdkError>),

    /// A retrieve-payment-intent command resolved.
    PaymentIntentRetrieved(Result<PaymentIntent, SdkError>),

    /// A collect-payment-method operation resolved.
    CollectFinished(Result<PaymentIntent, SdkError>),

    /// A process-payment command resolved.
    ProcessFinished(Result<PaymentIntent, SdkError>),

    /// The reader wants a prompt shown to the cardholder.
    DisplayMessageRequested(ReaderDisplayMessage),

    /// The reader is waiting for card input.
    InputRequested(ReaderInputOptions),

    /// A set-reader-display command resolved.
    SetDisplayFinished(Result<(), SdkError>),

    /// A clear-reader-display command resolved.
    ClearDisplayFinished(Result<(), SdkError>),

    /// A list-locations command resolved.
    LocationsListed(Result<LocationPage, SdkError>),

    /// The SDK found a firmware update for the connected reader.
    UpdateAvailable(FirmwareUpdate),

    /// A firmware install began; the handle cancels it.
    InstallStarted {
        update: FirmwareUpdate,
        cancel: Box<dyn CancelHandle>,
    },

    /// Install progress in `0.0..=1.0`, forwarded verbatim.
    InstallProgress(f32),

    /// The firmware install terminated.
    InstallFinished(Result<FirmwareUpdate, SdkError>),

    /// Periodic battery reading from the connected reader.
    BatteryLevel {
        level: f32,
        status: BatteryStatus,
        is_charging: bool,
    },

    /// The SDK began reconnecting after an unexpected disconnect; the
    /// handle aborts the attempt.
    ReconnectStarted(Box<dyn CancelHandle>),

    /// The reconnect attempt succeeded.
    ReconnectSucceeded,

    /// The reconnect attempt gave up.
    ReconnectFailed,
}

impl SdkEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SdkEvent::ConnectionTokenRequested(_) => "connectionTokenRequested",
            SdkEvent::ConnectionStatusChanged(_) => "connectionStatusChanged",
            SdkEvent::PaymentStatusChanged(_) => "paymentStatusChanged",
            SdkEvent::LowBatteryWarning => "lowBatteryWarning",
            SdkEvent::ReaderEvent(_) => "readerEvent",
            SdkEvent::UnexpectedDisconnect(_) => "unexpectedDisconnect",
            SdkEvent::ReadersDiscovered(_) => "readersDiscovered",
            SdkEvent::DiscoveryFinished(_) => "discoveryFinished",
            SdkEvent::ConnectFinished(_) => "connectFinished",
            SdkEvent::DisconnectFinished(_) => "disconnectFinished",
            SdkEvent::PaymentIntentRetrieved(_) => "paymentIntentRetrieved",
            SdkEvent::CollectFinished(_) => "collectFinished",
            SdkEvent::ProcessFinished(_) => "processFinished",
            SdkEvent::DisplayMessageRequested(_) => "displayMessageRequested",
            SdkEvent::InputRequested(_) => "inputRequested",
            SdkEvent::SetDisplayFinished(_) => "setDisplayFinished",
            SdkEvent::ClearDisplayFinished(_) => "clearDisplayFinished",
            SdkEvent::LocationsListed(_) => "locationsListed",
            SdkEvent::UpdateAvailable(_) => "updateAvailable",
            SdkEvent::InstallStarted { .. } => "installStarted",
            SdkEvent::InstallProgress(_) => "installProgress",
            SdkEvent::InstallFinished(_) => "installFinished",
            SdkEvent::BatteryLevel { .. } => "batteryLevel",
            SdkEvent::ReconnectStarted(_) => "reconnectStarted",
            SdkEvent::ReconnectSucceeded => "reconnectSucceeded",
            SdkEvent::ReconnectFailed => "reconnectFailed",
        }
    }
}

/// Where an SDK implementation posts its callbacks.
///
/// Cloneable and thread-safe; the vendor may emit from any thread. Sends
/// after the session has shut down are silently dropped.
#[derive(Debug, Clone)]
pub struct SdkEventSink {
    tx: mpsc::UnboundedSender<SdkEvent>,
}

impl SdkEventSink {
    /// Wrap the session's callback channel.
    pub fn new(tx: mpsc::UnboundedSender<SdkEvent>) -> Self {
        Self { tx }
    }

    /// Post one callback. Dropped if the session is gone.
    pub fn emit(&self, event: SdkEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("SDK callback dropped: session closed");
        }
    }
}
