//! The injected vendor SDK capability.

use crate::cancel::CancelHandle;
use crate::events::SdkEventSink;
use crate::models::{
    BluetoothConnectionConfig, Cart, CollectConfiguration, DiscoveryConfiguration,
    HandoffConnectionConfig, InternetConnectionConfig, ListLocationsParameters,
    LocalMobileConnectionConfig, PaymentIntent, Reader, SimulatorConfiguration,
    UsbConnectionConfig,
};
use paybridge_core::SdkError;

/// The slice of the vendor SDK the session drives.
///
/// The real implementation wraps the vendor's process-wide singleton; tests
/// inject [`MockTerminal`](crate::mock::MockTerminal). Every method returns
/// promptly: commands are handed to the SDK and their outcomes come back as
/// [`SdkEvent`](crate::events::SdkEvent)s through the sink registered in
/// [`initialize`](TerminalSdk::initialize). Methods returning a
/// [`CancelHandle`] start operations that can be stopped early.
///
/// The trait is object-safe on purpose: the session stores it as
/// `Arc<dyn TerminalSdk>`.
pub trait TerminalSdk: Send + Sync {
    /// Initialize the SDK and register the callback sink.
    ///
    /// # Errors
    ///
    /// Returns the vendor's error when the SDK refuses to initialize (for
    /// example when the host environment is unusable). Calling this on an
    /// already-initialized SDK must succeed.
    fn initialize(&self, sink: SdkEventSink) -> Result<(), SdkError>;

    /// Start discovering readers.
    ///
    /// Result sets arrive as `ReadersDiscovered` events; termination as
    /// `DiscoveryFinished`.
    ///
    /// # Errors
    ///
    /// Returns the vendor's error when discovery cannot start at all (bad
    /// configuration, SDK not initialized).
    fn discover_readers(
        &self,
        config: DiscoveryConfiguration,
    ) -> Result<Box<dyn CancelHandle>, SdkError>;

    /// Connect to an internet reader. Resolves via `ConnectFinished`.
    fn connect_internet_reader(&self, reader: &Reader, config: InternetConnectionConfig);

    /// Connect to a Bluetooth reader. Resolves via `ConnectFinished`.
    fn connect_bluetooth_reader(&self, reader: &Reader, config: BluetoothConnectionConfig);

    /// Connect to a USB reader. Resolves via `ConnectFinished`.
    fn connect_usb_reader(&self, reader: &Reader, config: UsbConnectionConfig);

    /// Connect to the device's built-in NFC reader. Resolves via
    /// `ConnectFinished`.
    fn connect_local_mobile_reader(&self, reader: &Reader, config: LocalMobileConnectionConfig);

    /// Connect to a handoff reader. Resolves via `ConnectFinished`.
    fn connect_handoff_reader(&self, reader: &Reader, config: HandoffConnectionConfig);

    /// Disconnect the connected reader. Resolves via `DisconnectFinished`.
    fn disconnect_reader(&self);

    /// Fetch a payment intent by client secret. Resolves via
    /// `PaymentIntentRetrieved`.
    fn retrieve_payment_intent(&self, client_secret: &str);

    /// Collect a payment method for the intent. Resolves via
    /// `CollectFinished`; the handle stops the collection.
    fn collect_payment_method(
        &self,
        intent: &PaymentIntent,
        config: CollectConfiguration,
    ) -> Box<dyn CancelHandle>;

    /// Process the collected payment. Resolves via `ProcessFinished`.
    fn process_payment(&self, intent: &PaymentIntent);

    /// Install the update the SDK previously reported as available.
    /// Progress and termination arrive as install events.
    fn install_available_update(&self);

    /// Show a cart on the reader display. Resolves via `SetDisplayFinished`.
    fn set_reader_display(&self, cart: &Cart);

    /// Reset the reader display. Resolves via `ClearDisplayFinished`.
    fn clear_reader_display(&self);

    /// List merchant locations. Resolves via `LocationsListed`.
    fn list_locations(&self, params: ListLocationsParameters);

    /// Drop the cached connection token.
    fn clear_cached_credentials(&self);

    /// Read the current simulator configuration.
    fn simulator_configuration(&self) -> SimulatorConfiguration;

    /// Replace the simulator configuration.
    fn set_simulator_configuration(&self, config: SimulatorConfiguration);
}
