//! Command surface of the session.
//!
//! Each variant maps 1:1 to one host-visible operation. Commands carry a
//! oneshot responder; the dispatcher either resolves it synchronously (for
//! parameter/precondition failures and pure reads) or parks it until the
//! matching SDK callback arrives. A command is resolved exactly once.

use paybridge_core::{OperationKind, Result, SdkError};
use paybridge_sdk::models::{Cart, CollectConfiguration, ListLocationsParameters};
use paybridge_wire::{
    LocationListPayload, PaymentIntentPayload, ReaderPayload, SimulatorConfigPayload,
    UpdatePayload,
};
use tokio::sync::oneshot;

/// One-shot resolution channel for a command.
pub(crate) type Responder<T> = oneshot::Sender<Result<T>>;

/// Options for starting reader discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Wire discovery method (see the wire tables); unknown values fall
    /// back to a Bluetooth scan.
    pub discovery_method: i64,

    /// Whether to discover simulated readers.
    pub simulated: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            discovery_method: 0,
            simulated: true,
        }
    }
}

/// Options for connecting to an internet reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternetConnectOptions {
    pub serial_number: String,
    pub fail_if_in_use: bool,
}

/// Options for connecting to a Bluetooth reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BluetoothConnectOptions {
    pub serial_number: String,
    pub location_id: Option<String>,
    pub auto_reconnect_on_unexpected_disconnect: bool,
}

/// Options for connecting to a USB reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbConnectOptions {
    pub serial_number: String,
    pub location_id: Option<String>,
}

/// Options for connecting to the device's built-in NFC reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalMobileConnectOptions {
    pub serial_number: String,
    pub location_id: Option<String>,
}

/// Options for connecting to a handoff reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoffConnectOptions {
    pub serial_number: String,
    pub location_id: Option<String>,
}

/// Options for retrieving a payment intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievePaymentIntentOptions {
    /// Client secret identifying the intent on the backend. Required.
    pub client_secret: String,

    /// Currency to attach to serialized forms of the intent; the SDK does
    /// not reliably report one.
    pub currency: Option<String>,
}

/// Partial overrides for the simulator configuration, as wire integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatorOptions {
    pub available_reader_update: Option<i64>,
    pub simulated_card: Option<i64>,
}

pub(crate) enum Command {
    Initialize { reply: Responder<bool> },
    SetConnectionToken {
        token: Option<String>,
        error_message: Option<String>,
        reply: Responder<()>,
    },
    DiscoverReaders {
        options: DiscoveryOptions,
        reply: Responder<()>,
    },
    CancelDiscoverReaders { reply: Responder<()> },
    ConnectInternetReader {
        options: InternetConnectOptions,
        reply: Responder<ReaderPayload>,
    },
    ConnectBluetoothReader {
        options: BluetoothConnectOptions,
        reply: Responder<ReaderPayload>,
    },
    ConnectUsbReader {
        options: UsbConnectOptions,
        reply: Responder<ReaderPayload>,
    },
    ConnectLocalMobileReader {
        options: LocalMobileConnectOptions,
        reply: Responder<ReaderPayload>,
    },
    ConnectHandoffReader {
        options: HandoffConnectOptions,
        reply: Responder<ReaderPayload>,
    },
    DisconnectReader { reply: Responder<()> },
    GetConnectedReader {
        reply: Responder<Option<ReaderPayload>>,
    },
    GetConnectionStatus { reply: Responder<i64> },
    GetPaymentStatus { reply: Responder<i64> },
    RetrievePaymentIntent {
        options: RetrievePaymentIntentOptions,
        reply: Responder<PaymentIntentPayload>,
    },
    CollectPaymentMethod {
        config: CollectConfiguration,
        reply: Responder<PaymentIntentPayload>,
    },
    CancelCollectPaymentMethod { reply: Responder<()> },
    ProcessPayment {
        reply: Responder<PaymentIntentPayload>,
    },
    ClearCachedCredentials { reply: Responder<()> },
    InstallAvailableUpdate { reply: Responder<()> },
    CheckForUpdate {
        reply: Responder<Option<UpdatePayload>>,
    },
    CancelInstallUpdate { reply: Responder<()> },
    SetReaderDisplay {
        cart: Cart,
        reply: Responder<()>,
    },
    ClearReaderDisplay { reply: Responder<()> },
    ListLocations {
        params: ListLocationsParameters,
        reply: Responder<LocationListPayload>,
    },
    GetSimulatorConfiguration {
        reply: Responder<SimulatorConfigPayload>,
    },
    SetSimulatorConfiguration {
        options: SimulatorOptions,
        reply: Responder<SimulatorConfigPayload>,
    },
    CancelAutoReconnect { reply: Responder<()> },
}

impl Command {
    /// Command name for logging.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Initialize { .. } => "initialize",
            Command::SetConnectionToken { .. } => "setConnectionToken",
            Command::DiscoverReaders { .. } => "discoverReaders",
            Command::CancelDiscoverReaders { .. } => "cancelDiscoverReaders",
            Command::ConnectInternetReader { .. } => "connectInternetReader",
            Command::ConnectBluetoothReader { .. } => "connectBluetoothReader",
            Command::ConnectUsbReader { .. } => "connectUsbReader",
            Command::ConnectLocalMobileReader { .. } => "connectLocalMobileReader",
            Command::ConnectHandoffReader { .. } => "connectHandoffReader",
            Command::DisconnectReader { .. } => "disconnectReader",
            Command::GetConnectedReader { .. } => "getConnectedReader",
            Command::GetConnectionStatus { .. } => "getConnectionStatus",
            Command::GetPaymentStatus { .. } => "getPaymentStatus",
            Command::RetrievePaymentIntent { .. } => "retrievePaymentIntent",
            Command::CollectPaymentMethod { .. } => "collectPaymentMethod",
            Command::CancelCollectPaymentMethod { .. } => "cancelCollectPaymentMethod",
            Command::ProcessPayment { .. } => "processPayment",
            Command::ClearCachedCredentials { .. } => "clearCachedCredentials",
            Command::InstallAvailableUpdate { .. } => "installAvailableUpdate",
            Command::CheckForUpdate { .. } => "checkForUpdate",
            Command::CancelInstallUpdate { .. } => "cancelInstallUpdate",
            Command::SetReaderDisplay { .. } => "setReaderDisplay",
            Command::ClearReaderDisplay { .. } => "clearReaderDisplay",
            Command::ListLocations { .. } => "listLocations",
            Command::GetSimulatorConfiguration { .. } => "getSimulatorConfiguration",
            Command::SetSimulatorConfiguration { .. } => "setSimulatorConfiguration",
            Command::CancelAutoReconnect { .. } => "cancelAutoReconnect",
        }
    }
}

/// Everything the dispatcher task consumes, over one serialized stream.
pub(crate) enum SessionInput {
    /// A host command.
    Command(Command),

    /// Resolution of a cancel request previously queued with an SDK cancel
    /// handle. Posted by the handle's done-callback, from any thread.
    CancelResolved {
        kind: OperationKind,
        outcome: std::result::Result<(), SdkError>,
    },
}
