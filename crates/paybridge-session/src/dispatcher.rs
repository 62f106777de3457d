//! The session dispatcher: one task that owns every piece of mutable state.
//!
//! # Architecture
//!
//! ```text
//! SessionHandle ──commands──► ┌──────────────┐
//!                             │  Dispatcher  │──events──► SessionEvents
//! vendor SDK ───callbacks───► │  (one task)  │
//! cancel done-callbacks ────► └──────────────┘
//! ```
//!
//! The vendor SDK delivers callbacks on arbitrary threads. Everything funnels
//! into this task over channels, so state transitions are applied one at a
//! time and consumer events leave in exactly the order the transitions were
//! applied. No handler awaits anything: a command either resolves
//! synchronously (parameter/precondition failures, pure reads) or hands off
//! to the SDK and parks its responder until the matching callback arrives.

use crate::commands::{
    BluetoothConnectOptions, Command, DiscoveryOptions, HandoffConnectOptions,
    InternetConnectOptions, LocalMobileConnectOptions, Responder, RetrievePaymentIntentOptions,
    SessionInput, SimulatorOptions, UsbConnectOptions,
};
use crate::connection::ConnectionStateMachine;
use crate::devices::DeviceRegistry;
use crate::events::SessionEvent;
use crate::payment::PaymentIntentLifecycle;
use crate::registry::{CancelStart, OperationRegistry};
use crate::update::UpdateLifecycle;
use paybridge_core::{OperationKind, Result, SdkError, SessionError};
use paybridge_sdk::enums::{PaymentStatus, ReaderEvent};
use paybridge_sdk::models::{
    BluetoothConnectionConfig, Cart, CollectConfiguration, DiscoveryConfiguration,
    HandoffConnectionConfig, InternetConnectionConfig, ListLocationsParameters,
    LocalMobileConnectionConfig, PaymentIntent, Reader, SimulatorConfiguration,
    UsbConnectionConfig,
};
use paybridge_sdk::{ConnectionTokenRequest, SdkEvent, SdkEventSink, TerminalSdk};
use paybridge_wire::tables;
use paybridge_wire::{
    LocationListPayload, LocationPayload, PaymentIntentPayload, ReaderPayload,
    SimulatorConfigPayload, UpdatePayload,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Resolve a parked responder, tolerating an abandoned caller.
fn respond<T>(reply: Responder<T>, result: Result<T>) {
    if reply.send(result).is_err() {
        debug!("command abandoned before resolution");
    }
}

fn require_location(location_id: Option<String>) -> Result<String> {
    match location_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(SessionError::missing("locationId")),
    }
}

/// Responders parked until their SDK callback arrives.
///
/// Queues resolve in FIFO order, matching callback order. The session never
/// re-validates whether the SDK accepts overlapping calls of the same
/// command (that is the SDK's contract to enforce), so a queue per command
/// keeps each resolution paired with its own callback.
#[derive(Default)]
struct PendingReplies {
    discover: VecDeque<Responder<()>>,
    connect: VecDeque<Responder<ReaderPayload>>,
    disconnect: VecDeque<Responder<()>>,
    retrieve: VecDeque<(Responder<PaymentIntentPayload>, Option<String>)>,
    collect: VecDeque<Responder<PaymentIntentPayload>>,
    process: VecDeque<Responder<PaymentIntentPayload>>,
    set_display: VecDeque<Responder<()>>,
    clear_display: VecDeque<Responder<()>>,
    list_locations: VecDeque<Responder<LocationListPayload>>,
    cancels: HashMap<OperationKind, Responder<()>>,
}

/// Entry point: spawns the dispatcher task for an injected SDK.
pub struct Session;

impl Session {
    /// Spawn a session over `sdk`.
    ///
    /// Returns the cloneable command handle and the event stream. The
    /// dispatcher task exits when every handle has been dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use paybridge_sdk::mock::MockTerminal;
    /// use paybridge_session::Session;
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (sdk, _handle) = MockTerminal::new();
    /// let (session, _events) = Session::spawn(Arc::new(sdk));
    /// assert!(session.initialize().await.unwrap());
    /// # }
    /// ```
    pub fn spawn(sdk: Arc<dyn TerminalSdk>) -> (SessionHandle, SessionEvents) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (sdk_tx, sdk_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher {
            sdk,
            // Weak: a strong clone here would keep the input channel open
            // and the task alive after every handle is gone.
            input_tx: input_tx.downgrade(),
            sdk_tx,
            event_tx,
            registry: OperationRegistry::new(),
            connection: ConnectionStateMachine::new(),
            payment: PaymentIntentLifecycle::new(),
            update: UpdateLifecycle::new(),
            devices: DeviceRegistry::new(),
            pending: PendingReplies::default(),
            pending_token: None,
            payment_status: PaymentStatus::NotReady,
            last_reader_event: ReaderEvent::CardRemoved,
            initialized: false,
        };
        tokio::spawn(dispatcher.run(input_rx, sdk_rx));

        (
            SessionHandle { tx: input_tx },
            SessionEvents { rx: event_rx },
        )
    }
}

/// Receiving side of the unsolicited event surface.
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionEvents {
    /// Receive the next event. `None` once the session has shut down.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }
}

/// Cloneable handle issuing session commands.
///
/// Every method hands the command to the dispatcher task and resolves when
/// the dispatcher (or the SDK callback behind it) does. Awaiting is the
/// caller's choice; the dispatcher itself never blocks on a command.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionInput>,
}

impl SessionHandle {
    async fn request<T>(&self, build: impl FnOnce(Responder<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionInput::Command(build(reply)))
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)?
    }

    /// Initialize the SDK. Idempotent; returns `true` once initialized.
    pub async fn initialize(&self) -> Result<bool> {
        self.request(|reply| Command::Initialize { reply }).await
    }

    /// Answer the SDK's pending connection-token request.
    ///
    /// A non-empty `error_message` fails the SDK's fetch; otherwise `token`
    /// fulfills it.
    pub async fn set_connection_token(
        &self,
        token: Option<String>,
        error_message: Option<String>,
    ) -> Result<()> {
        self.request(|reply| Command::SetConnectionToken {
            token,
            error_message,
            reply,
        })
        .await
    }

    /// Start reader discovery. Resolves when discovery terminates.
    pub async fn discover_readers(&self, options: DiscoveryOptions) -> Result<()> {
        self.request(|reply| Command::DiscoverReaders { options, reply })
            .await
    }

    /// Cancel a running discovery; success if none is running.
    pub async fn cancel_discover_readers(&self) -> Result<()> {
        self.request(|reply| Command::CancelDiscoverReaders { reply })
            .await
    }

    /// Connect to a discovered internet reader.
    pub async fn connect_internet_reader(
        &self,
        options: InternetConnectOptions,
    ) -> Result<ReaderPayload> {
        self.request(|reply| Command::ConnectInternetReader { options, reply })
            .await
    }

    /// Connect to a discovered Bluetooth reader.
    pub async fn connect_bluetooth_reader(
        &self,
        options: BluetoothConnectOptions,
    ) -> Result<ReaderPayload> {
        self.request(|reply| Command::ConnectBluetoothReader { options, reply })
            .await
    }

    /// Connect to a discovered USB reader.
    pub async fn connect_usb_reader(&self, options: UsbConnectOptions) -> Result<ReaderPayload> {
        self.request(|reply| Command::ConnectUsbReader { options, reply })
            .await
    }

    /// Connect to the device's built-in NFC reader.
    pub async fn connect_local_mobile_reader(
        &self,
        options: LocalMobileConnectOptions,
    ) -> Result<ReaderPayload> {
        self.request(|reply| Command::ConnectLocalMobileReader { options, reply })
            .await
    }

    /// Connect to a discovered handoff reader.
    pub async fn connect_handoff_reader(
        &self,
        options: HandoffConnectOptions,
    ) -> Result<ReaderPayload> {
        self.request(|reply| Command::ConnectHandoffReader { options, reply })
            .await
    }

    /// Disconnect the connected reader; success if none is connected.
    pub async fn disconnect_reader(&self) -> Result<()> {
        self.request(|reply| Command::DisconnectReader { reply })
            .await
    }

    /// The connected reader, or `None`.
    pub async fn get_connected_reader(&self) -> Result<Option<ReaderPayload>> {
        self.request(|reply| Command::GetConnectedReader { reply })
            .await
    }

    /// Current connection status as a wire integer.
    pub async fn get_connection_status(&self) -> Result<i64> {
        self.request(|reply| Command::GetConnectionStatus { reply })
            .await
    }

    /// Current payment status as a wire integer.
    pub async fn get_payment_status(&self) -> Result<i64> {
        self.request(|reply| Command::GetPaymentStatus { reply })
            .await
    }

    /// Retrieve a payment intent by client secret, making it the active
    /// intent. Replaces any prior active intent.
    pub async fn retrieve_payment_intent(
        &self,
        options: RetrievePaymentIntentOptions,
    ) -> Result<PaymentIntentPayload> {
        self.request(|reply| Command::RetrievePaymentIntent { options, reply })
            .await
    }

    /// Collect a payment method for the active intent.
    pub async fn collect_payment_method(
        &self,
        config: CollectConfiguration,
    ) -> Result<PaymentIntentPayload> {
        self.request(|reply| Command::CollectPaymentMethod { config, reply })
            .await
    }

    /// Cancel a running collect; success if none is running.
    pub async fn cancel_collect_payment_method(&self) -> Result<()> {
        self.request(|reply| Command::CancelCollectPaymentMethod { reply })
            .await
    }

    /// Process the collected payment on the active intent.
    pub async fn process_payment(&self) -> Result<PaymentIntentPayload> {
        self.request(|reply| Command::ProcessPayment { reply }).await
    }

    /// Drop the SDK's cached connection token.
    pub async fn clear_cached_credentials(&self) -> Result<()> {
        self.request(|reply| Command::ClearCachedCredentials { reply })
            .await
    }

    /// Install the available firmware update; success (and no SDK call) if
    /// none is available.
    pub async fn install_available_update(&self) -> Result<()> {
        self.request(|reply| Command::InstallAvailableUpdate { reply })
            .await
    }

    /// The firmware update currently known to be available, if any.
    pub async fn check_for_update(&self) -> Result<Option<UpdatePayload>> {
        self.request(|reply| Command::CheckForUpdate { reply }).await
    }

    /// Cancel a running firmware install; success if none is running.
    pub async fn cancel_install_update(&self) -> Result<()> {
        self.request(|reply| Command::CancelInstallUpdate { reply })
            .await
    }

    /// Show a cart on the reader display.
    pub async fn set_reader_display(&self, cart: Cart) -> Result<()> {
        self.request(|reply| Command::SetReaderDisplay { cart, reply })
            .await
    }

    /// Reset the reader display to its idle screen.
    pub async fn clear_reader_display(&self) -> Result<()> {
        self.request(|reply| Command::ClearReaderDisplay { reply })
            .await
    }

    /// List merchant locations.
    pub async fn list_locations(
        &self,
        params: ListLocationsParameters,
    ) -> Result<LocationListPayload> {
        self.request(|reply| Command::ListLocations { params, reply })
            .await
    }

    /// Read the simulator configuration.
    pub async fn get_simulator_configuration(&self) -> Result<SimulatorConfigPayload> {
        self.request(|reply| Command::GetSimulatorConfiguration { reply })
            .await
    }

    /// Override parts of the simulator configuration; unset fields keep
    /// their current values.
    pub async fn set_simulator_configuration(
        &self,
        options: SimulatorOptions,
    ) -> Result<SimulatorConfigPayload> {
        self.request(|reply| Command::SetSimulatorConfiguration { options, reply })
            .await
    }

    /// Cancel the SDK's auto-reconnect attempt; success if none is running.
    pub async fn cancel_auto_reconnect(&self) -> Result<()> {
        self.request(|reply| Command::CancelAutoReconnect { reply })
            .await
    }
}

struct Dispatcher {
    sdk: Arc<dyn TerminalSdk>,
    input_tx: mpsc::WeakUnboundedSender<SessionInput>,
    sdk_tx: mpsc::UnboundedSender<SdkEvent>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    registry: OperationRegistry,
    connection: ConnectionStateMachine,
    payment: PaymentIntentLifecycle,
    update: UpdateLifecycle,
    devices: DeviceRegistry,
    pending: PendingReplies,
    pending_token: Option<ConnectionTokenRequest>,
    payment_status: PaymentStatus,
    last_reader_event: ReaderEvent,
    initialized: bool,
}

impl Dispatcher {
    async fn run(
        mut self,
        mut input_rx: mpsc::UnboundedReceiver<SessionInput>,
        mut sdk_rx: mpsc::UnboundedReceiver<SdkEvent>,
    ) {
        loop {
            tokio::select! {
                input = input_rx.recv() => match input {
                    Some(input) => self.handle_input(input),
                    None => break,
                },
                event = sdk_rx.recv() => match event {
                    Some(event) => self.handle_sdk_event(event),
                    None => break,
                },
            }
        }
        debug!("session dispatcher stopped");
    }

    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("event dropped: no consumer attached");
        }
    }

    fn handle_input(&mut self, input: SessionInput) {
        match input {
            SessionInput::Command(command) => {
                debug!(command = command.name(), "command received");
                self.handle_command(command);
            }
            SessionInput::CancelResolved { kind, outcome } => {
                self.handle_cancel_resolved(kind, outcome);
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Initialize { reply } => self.initialize(reply),
            Command::SetConnectionToken {
                token,
                error_message,
                reply,
            } => self.set_connection_token(token, error_message, reply),
            Command::DiscoverReaders { options, reply } => self.discover_readers(options, reply),
            Command::CancelDiscoverReaders { reply } => {
                self.cancel_operation(OperationKind::Discovery, reply);
            }
            Command::ConnectInternetReader { options, reply } => {
                self.connect_internet_reader(options, reply);
            }
            Command::ConnectBluetoothReader { options, reply } => {
                self.connect_bluetooth_reader(options, reply);
            }
            Command::ConnectUsbReader { options, reply } => {
                self.connect_usb_reader(options, reply);
            }
            Command::ConnectLocalMobileReader { options, reply } => {
                self.connect_local_mobile_reader(options, reply);
            }
            Command::ConnectHandoffReader { options, reply } => {
                self.connect_handoff_reader(options, reply);
            }
            Command::DisconnectReader { reply } => self.disconnect_reader(reply),
            Command::GetConnectedReader { reply } => {
                let payload = self.connection.connected_reader().map(ReaderPayload::from_reader);
                respond(reply, Ok(payload));
            }
            Command::GetConnectionStatus { reply } => {
                let status = tables::connection_status_to_wire(self.connection.status());
                respond(reply, Ok(status));
            }
            Command::GetPaymentStatus { reply } => {
                respond(reply, Ok(tables::payment_status_to_wire(self.payment_status)));
            }
            Command::RetrievePaymentIntent { options, reply } => {
                self.retrieve_payment_intent(options, reply);
            }
            Command::CollectPaymentMethod { config, reply } => {
                self.collect_payment_method(config, reply);
            }
            Command::CancelCollectPaymentMethod { reply } => {
                self.cancel_operation(OperationKind::CollectPaymentMethod, reply);
            }
            Command::ProcessPayment { reply } => self.process_payment(reply),
            Command::ClearCachedCredentials { reply } => {
                self.sdk.clear_cached_credentials();
                respond(reply, Ok(()));
            }
            Command::InstallAvailableUpdate { reply } => {
                // Absence of an update is a normal state, not an error.
                if self.update.available().is_some() {
                    self.sdk.install_available_update();
                }
                respond(reply, Ok(()));
            }
            Command::CheckForUpdate { reply } => {
                let payload = self.update.available().map(UpdatePayload::from_update);
                respond(reply, Ok(payload));
            }
            Command::CancelInstallUpdate { reply } => {
                self.cancel_operation(OperationKind::InstallUpdate, reply);
            }
            Command::SetReaderDisplay { cart, reply } => {
                self.sdk.set_reader_display(&cart);
                self.pending.set_display.push_back(reply);
            }
            Command::ClearReaderDisplay { reply } => {
                self.sdk.clear_reader_display();
                self.pending.clear_display.push_back(reply);
            }
            Command::ListLocations { params, reply } => {
                self.sdk.list_locations(params);
                self.pending.list_locations.push_back(reply);
            }
            Command::GetSimulatorConfiguration { reply } => {
                let config = self.sdk.simulator_configuration();
                respond(reply, Ok(SimulatorConfigPayload::from_config(&config)));
            }
            Command::SetSimulatorConfiguration { options, reply } => {
                self.set_simulator_configuration(options, reply);
            }
            Command::CancelAutoReconnect { reply } => {
                self.cancel_operation(OperationKind::AutoReconnect, reply);
            }
        }
    }

    fn initialize(&mut self, reply: Responder<bool>) {
        if self.initialized {
            respond(reply, Ok(true));
            return;
        }

        // Discard leftovers from a previous host session: in-flight
        // cancelable operations and the stale discovery snapshot.
        self.silent_cancel(OperationKind::Discovery);
        self.silent_cancel(OperationKind::InstallUpdate);
        self.devices.clear();

        let sink = SdkEventSink::new(self.sdk_tx.clone());
        match self.sdk.initialize(sink) {
            Ok(()) => {
                self.initialized = true;
                self.last_reader_event = ReaderEvent::CardRemoved;
                self.pending_token = None;
                respond(reply, Ok(true));
            }
            Err(err) => respond(reply, Err(err.into())),
        }
    }

    fn set_connection_token(
        &mut self,
        token: Option<String>,
        error_message: Option<String>,
        reply: Responder<()>,
    ) {
        let failure = error_message
            .as_deref()
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .map(String::from);

        if token.is_none() && failure.is_none() {
            respond(reply, Err(SessionError::missing("token")));
            return;
        }

        match self.pending_token.take() {
            Some(request) => {
                if let Some(message) = failure {
                    request.respond(Err(SdkError::new("CONNECTION_TOKEN_ERROR", message)));
                } else if let Some(token) = token {
                    request.respond(Ok(token));
                }
            }
            None => debug!("connection token supplied with no pending SDK request"),
        }
        respond(reply, Ok(()));
    }

    fn discover_readers(&mut self, options: DiscoveryOptions, reply: Responder<()>) {
        if self.registry.is_pending(OperationKind::Discovery) {
            respond(
                reply,
                Err(SessionError::already_pending(OperationKind::Discovery)),
            );
            return;
        }

        let config = DiscoveryConfiguration::new(
            tables::discovery_method_from_wire(options.discovery_method),
            options.simulated,
        );
        match self.sdk.discover_readers(config) {
            Ok(handle) => match self.registry.begin(OperationKind::Discovery, handle) {
                Ok(ticket) => {
                    debug!(%ticket, "discovery started");
                    self.pending.discover.push_back(reply);
                }
                Err(err) => respond(reply, Err(err)),
            },
            Err(err) => respond(reply, Err(err.into())),
        }
    }

    fn resolve_reader(&self, serial_number: &str) -> Result<Reader> {
        self.devices.resolve(serial_number).cloned()
    }

    fn connect_internet_reader(
        &mut self,
        options: InternetConnectOptions,
        reply: Responder<ReaderPayload>,
    ) {
        let reader = match self.resolve_reader(&options.serial_number) {
            Ok(reader) => reader,
            Err(err) => return respond(reply, Err(err)),
        };
        self.sdk.connect_internet_reader(
            &reader,
            InternetConnectionConfig {
                fail_if_in_use: options.fail_if_in_use,
            },
        );
        self.pending.connect.push_back(reply);
    }

    fn connect_bluetooth_reader(
        &mut self,
        options: BluetoothConnectOptions,
        reply: Responder<ReaderPayload>,
    ) {
        let reader = match self.resolve_reader(&options.serial_number) {
            Ok(reader) => reader,
            Err(err) => return respond(reply, Err(err)),
        };
        let location_id = match require_location(options.location_id) {
            Ok(id) => id,
            Err(err) => return respond(reply, Err(err)),
        };
        self.sdk.connect_bluetooth_reader(
            &reader,
            BluetoothConnectionConfig {
                location_id,
                auto_reconnect_on_unexpected_disconnect: options
                    .auto_reconnect_on_unexpected_disconnect,
            },
        );
        self.pending.connect.push_back(reply);
    }

    fn connect_usb_reader(&mut self, options: UsbConnectOptions, reply: Responder<ReaderPayload>) {
        let reader = match self.resolve_reader(&options.serial_number) {
            Ok(reader) => reader,
            Err(err) => return respond(reply, Err(err)),
        };
        let location_id = match require_location(options.location_id) {
            Ok(id) => id,
            Err(err) => return respond(reply, Err(err)),
        };
        self.sdk
            .connect_usb_reader(&reader, UsbConnectionConfig { location_id });
        self.pending.connect.push_back(reply);
    }

    fn connect_local_mobile_reader(
        &mut self,
        options: LocalMobileConnectOptions,
        reply: Responder<ReaderPayload>,
    ) {
        let reader = match self.resolve_reader(&options.serial_number) {
            Ok(reader) => reader,
            Err(err) => return respond(reply, Err(err)),
        };
        let location_id = match require_location(options.location_id) {
            Ok(id) => id,
            Err(err) => return respond(reply, Err(err)),
        };
        self.sdk
            .connect_local_mobile_reader(&reader, LocalMobileConnectionConfig { location_id });
        self.pending.connect.push_back(reply);
    }

    fn connect_handoff_reader(
        &mut self,
        options: HandoffConnectOptions,
        reply: Responder<ReaderPayload>,
    ) {
        let reader = match self.resolve_reader(&options.serial_number) {
            Ok(reader) => reader,
            Err(err) => return respond(reply, Err(err)),
        };
        let location_id = match require_location(options.location_id) {
            Ok(id) => id,
            Err(err) => return respond(reply, Err(err)),
        };
        self.sdk
            .connect_handoff_reader(&reader, HandoffConnectionConfig { location_id });
        self.pending.connect.push_back(reply);
    }

    fn disconnect_reader(&mut self, reply: Responder<()>) {
        if !self.connection.is_connected() {
            respond(reply, Ok(()));
            return;
        }
        self.sdk.disconnect_reader();
        self.pending.disconnect.push_back(reply);
    }

    fn retrieve_payment_intent(
        &mut self,
        options: RetrievePaymentIntentOptions,
        reply: Responder<PaymentIntentPayload>,
    ) {
        if options.client_secret.trim().is_empty() {
            respond(reply, Err(SessionError::missing("clientSecret")));
            return;
        }
        self.sdk.retrieve_payment_intent(&options.client_secret);
        self.pending.retrieve.push_back((reply, options.currency));
    }

    fn collect_payment_method(
        &mut self,
        config: CollectConfiguration,
        reply: Responder<PaymentIntentPayload>,
    ) {
        let intent = match self.payment.require_active() {
            Ok(intent) => intent.clone(),
            Err(err) => return respond(reply, Err(err)),
        };
        if self.registry.is_pending(OperationKind::CollectPaymentMethod) {
            respond(
                reply,
                Err(SessionError::already_pending(
                    OperationKind::CollectPaymentMethod,
                )),
            );
            return;
        }
        let handle = self.sdk.collect_payment_method(&intent, config);
        match self
            .registry
            .begin(OperationKind::CollectPaymentMethod, handle)
        {
            Ok(ticket) => {
                debug!(%ticket, "payment method collection started");
                self.pending.collect.push_back(reply);
            }
            Err(err) => respond(reply, Err(err)),
        }
    }

    fn process_payment(&mut self, reply: Responder<PaymentIntentPayload>) {
        let intent = match self.payment.require_active() {
            Ok(intent) => intent.clone(),
            Err(err) => return respond(reply, Err(err)),
        };
        self.sdk.process_payment(&intent);
        self.pending.process.push_back(reply);
    }

    fn set_simulator_configuration(
        &mut self,
        options: SimulatorOptions,
        reply: Responder<SimulatorConfigPayload>,
    ) {
        let current = self.sdk.simulator_configuration();
        let config = SimulatorConfiguration {
            update_plan: options
                .available_reader_update
                .map_or(current.update_plan, tables::simulate_update_from_wire),
            simulated_card: options
                .simulated_card
                .map_or(current.simulated_card, tables::simulated_card_from_wire),
        };
        self.sdk.set_simulator_configuration(config);
        respond(reply, Ok(SimulatorConfigPayload::from_config(&config)));
    }

    /// Route a cancel command for `kind`.
    ///
    /// Cancelling nothing is success. A cancel already in flight is success.
    /// Otherwise the stored handle is invoked and the responder parks until
    /// the handle's done-callback posts back into the input channel.
    fn cancel_operation(&mut self, kind: OperationKind, reply: Responder<()>) {
        match self.registry.start_cancel(kind) {
            CancelStart::Idle | CancelStart::AlreadyCancelling => respond(reply, Ok(())),
            CancelStart::Started(handle) => {
                self.pending.cancels.insert(kind, reply);
                let tx = self.input_tx.clone();
                handle.cancel(Box::new(move |outcome| {
                    if let Some(tx) = tx.upgrade() {
                        let _ = tx.send(SessionInput::CancelResolved { kind, outcome });
                    }
                }));
            }
        }
    }

    /// Cancel without a consumer command, used by re-initialization to
    /// discard leftovers. The resolution arrives as usual and finds no
    /// parked responder.
    fn silent_cancel(&mut self, kind: OperationKind) {
        if let CancelStart::Started(handle) = self.registry.start_cancel(kind) {
            debug!(%kind, "discarding leftover operation");
            let tx = self.input_tx.clone();
            handle.cancel(Box::new(move |outcome| {
                if let Some(tx) = tx.upgrade() {
                    let _ = tx.send(SessionInput::CancelResolved { kind, outcome });
                }
            }));
        }
    }

    fn handle_cancel_resolved(
        &mut self,
        kind: OperationKind,
        outcome: std::result::Result<(), SdkError>,
    ) {
        match outcome {
            Ok(()) => {
                self.registry.complete(kind);
                if let Some(reply) = self.pending.cancels.remove(&kind) {
                    respond(reply, Ok(()));
                }
                // Resolve the canceled operation's own command, if it is
                // still parked; its late SDK callback will then be ignored.
                match kind {
                    OperationKind::Discovery => {
                        if let Some(reply) = self.pending.discover.pop_front() {
                            respond(reply, Ok(()));
                        }
                    }
                    OperationKind::CollectPaymentMethod => {
                        self.payment.discard();
                        if let Some(reply) = self.pending.collect.pop_front() {
                            respond(reply, Err(SdkError::canceled().into()));
                        }
                    }
                    OperationKind::InstallUpdate | OperationKind::AutoReconnect => {}
                }
            }
            Err(err) => {
                warn!(%kind, error = %err, "cancellation failed");
                // The slot stays live; whichever completion callback fires
                // next clears it.
                if let Some(reply) = self.pending.cancels.remove(&kind) {
                    respond(reply, Err(SessionError::cancellation_failed(err.to_string())));
                }
            }
        }
    }

    fn handle_sdk_event(&mut self, event: SdkEvent) {
        debug!(event = event.name(), "SDK callback");
        match event {
            SdkEvent::ConnectionTokenRequested(request) => {
                if self.pending_token.is_some() {
                    debug!("superseding an unanswered connection token request");
                }
                self.pending_token = Some(request);
                self.emit(SessionEvent::RequestConnectionToken);
            }
            SdkEvent::ConnectionStatusChanged(status) => {
                self.connection.apply_status(status);
                self.emit(SessionEvent::DidChangeConnectionStatus {
                    status: tables::connection_status_to_wire(status),
                });
            }
            SdkEvent::PaymentStatusChanged(status) => {
                self.payment_status = status;
                self.emit(SessionEvent::DidChangePaymentStatus {
                    status: tables::payment_status_to_wire(status),
                });
            }
            SdkEvent::LowBatteryWarning => {
                self.emit(SessionEvent::DidReportLowBatteryWarning);
            }
            SdkEvent::ReaderEvent(reader_event) => {
                debug!(previous = ?self.last_reader_event, current = ?reader_event, "reader event");
                self.last_reader_event = reader_event;
                self.emit(SessionEvent::DidReportReaderEvent {
                    event: tables::reader_event_to_wire(reader_event),
                });
            }
            SdkEvent::UnexpectedDisconnect(reader) => {
                self.connection.on_disconnected();
                self.emit(SessionEvent::DidReportUnexpectedReaderDisconnect {
                    reader: ReaderPayload::from_reader(&reader),
                });
            }
            SdkEvent::ReadersDiscovered(readers) => {
                let payloads = readers.iter().map(ReaderPayload::from_reader).collect();
                self.devices.replace(readers);
                self.emit(SessionEvent::ReadersDiscovered { readers: payloads });
            }
            SdkEvent::DiscoveryFinished(result) => self.discovery_finished(result),
            SdkEvent::ConnectFinished(result) => self.connect_finished(result),
            SdkEvent::DisconnectFinished(result) => self.disconnect_finished(result),
            SdkEvent::PaymentIntentRetrieved(result) => self.payment_intent_retrieved(result),
            SdkEvent::CollectFinished(result) => self.collect_finished(result),
            SdkEvent::ProcessFinished(result) => self.process_finished(result),
            SdkEvent::DisplayMessageRequested(message) => {
                self.emit(SessionEvent::DidRequestReaderDisplayMessage {
                    value: tables::display_message_to_wire(message),
                    text: message.to_string(),
                });
            }
            SdkEvent::InputRequested(options) => {
                self.emit(SessionEvent::DidRequestReaderInput {
                    value: options.to_string(),
                });
            }
            SdkEvent::SetDisplayFinished(result) => {
                match self.pending.set_display.pop_front() {
                    Some(reply) => respond(reply, result.map_err(Into::into)),
                    None => debug!("display completion with no pending command"),
                }
            }
            SdkEvent::ClearDisplayFinished(result) => {
                match self.pending.clear_display.pop_front() {
                    Some(reply) => respond(reply, result.map_err(Into::into)),
                    None => debug!("display completion with no pending command"),
                }
            }
            SdkEvent::LocationsListed(result) => {
                match self.pending.list_locations.pop_front() {
                    Some(reply) => {
                        let result = result
                            .map(|page| LocationListPayload {
                                locations: page
                                    .locations
                                    .iter()
                                    .map(LocationPayload::from_location)
                                    .collect(),
                                has_more: page.has_more,
                            })
                            .map_err(Into::into);
                        respond(reply, result);
                    }
                    None => debug!("location listing with no pending command"),
                }
            }
            SdkEvent::UpdateAvailable(update) => {
                let payload = UpdatePayload::from_update(&update);
                self.update.report_available(update);
                self.emit(SessionEvent::DidReportAvailableUpdate { update: payload });
            }
            SdkEvent::InstallStarted { update, cancel } => {
                if let Err(err) = self.registry.begin(OperationKind::InstallUpdate, cancel) {
                    warn!(error = %err, "install started while another install was tracked");
                }
                let payload = UpdatePayload::from_update(&update);
                self.update.install_started(update);
                self.emit(SessionEvent::DidStartInstallingUpdate { update: payload });
            }
            SdkEvent::InstallProgress(progress) => {
                self.emit(SessionEvent::DidReportReaderSoftwareUpdateProgress { progress });
            }
            SdkEvent::InstallFinished(result) => {
                self.registry.complete(OperationKind::InstallUpdate);
                self.update.finish();
                let event = match result {
                    Ok(update) => SessionEvent::DidFinishInstallingUpdate {
                        update: Some(UpdatePayload::from_update(&update)),
                        error: None,
                    },
                    Err(err) => SessionEvent::DidFinishInstallingUpdate {
                        update: None,
                        error: Some(err.to_string()),
                    },
                };
                self.emit(event);
            }
            SdkEvent::BatteryLevel {
                level,
                status,
                is_charging,
            } => {
                self.emit(SessionEvent::DidReportBatteryLevel {
                    battery_level: level,
                    battery_status: tables::battery_status_to_wire(status),
                    is_charging,
                });
            }
            SdkEvent::ReconnectStarted(handle) => {
                if let Err(err) = self.registry.begin(OperationKind::AutoReconnect, handle) {
                    warn!(error = %err, "reconnect started while another reconnect was tracked");
                }
                self.emit(SessionEvent::DidStartReaderReconnect);
            }
            SdkEvent::ReconnectSucceeded => {
                self.registry.complete(OperationKind::AutoReconnect);
                self.emit(SessionEvent::DidSucceedReaderReconnect);
            }
            SdkEvent::ReconnectFailed => {
                self.registry.complete(OperationKind::AutoReconnect);
                self.emit(SessionEvent::DidFailReaderReconnect);
            }
        }
    }

    fn discovery_finished(&mut self, result: std::result::Result<(), SdkError>) {
        let was_live = self.registry.complete(OperationKind::Discovery);
        match self.pending.discover.pop_front() {
            Some(reply) => respond(reply, result.map_err(Into::into)),
            None => {
                if let Err(err) = result {
                    debug!(error = %err, was_live, "discovery failure after cancellation; suppressed");
                }
            }
        }
    }

    fn connect_finished(&mut self, result: std::result::Result<Reader, SdkError>) {
        match self.pending.connect.pop_front() {
            Some(reply) => match result {
                Ok(reader) => {
                    let payload = ReaderPayload::from_reader(&reader);
                    self.connection.on_connected(reader);
                    respond(reply, Ok(payload));
                }
                Err(err) => respond(reply, Err(err.into())),
            },
            None => debug!("connect completion with no pending command"),
        }
    }

    fn disconnect_finished(&mut self, result: std::result::Result<(), SdkError>) {
        match self.pending.disconnect.pop_front() {
            Some(reply) => match result {
                Ok(()) => {
                    self.connection.on_disconnected();
                    respond(reply, Ok(()));
                }
                Err(err) => respond(reply, Err(err.into())),
            },
            None => debug!("disconnect completion with no pending command"),
        }
    }

    fn payment_intent_retrieved(&mut self, result: std::result::Result<PaymentIntent, SdkError>) {
        match self.pending.retrieve.pop_front() {
            Some((reply, currency)) => match result {
                Ok(intent) => {
                    self.payment.begin(intent.clone(), currency);
                    let payload =
                        PaymentIntentPayload::from_intent(&intent, self.payment.currency());
                    respond(reply, Ok(payload));
                }
                Err(err) => {
                    self.payment.discard();
                    respond(reply, Err(err.into()));
                }
            },
            None => debug!("intent retrieval completion with no pending command"),
        }
    }

    fn collect_finished(&mut self, result: std::result::Result<PaymentIntent, SdkError>) {
        let was_live = self.registry.complete(OperationKind::CollectPaymentMethod);
        match result {
            Ok(intent) => match self.pending.collect.pop_front() {
                Some(reply) => {
                    self.payment.update(intent.clone());
                    let payload =
                        PaymentIntentPayload::from_intent(&intent, self.payment.currency());
                    respond(reply, Ok(payload));
                }
                None => debug!(was_live, "collect completion after cancellation; suppressed"),
            },
            Err(err) => {
                // The SDK does not guarantee the intent survives a failed
                // collect; discard rather than roll back.
                self.payment.discard();
                match self.pending.collect.pop_front() {
                    Some(reply) => respond(reply, Err(err.into())),
                    None => {
                        debug!(error = %err, was_live, "collect failure after cancellation; suppressed");
                    }
                }
            }
        }
    }

    fn process_finished(&mut self, result: std::result::Result<PaymentIntent, SdkError>) {
        match self.pending.process.pop_front() {
            Some(reply) => match result {
                Ok(intent) => {
                    self.payment.update(intent.clone());
                    let payload =
                        PaymentIntentPayload::from_intent(&intent, self.payment.currency());
                    respond(reply, Ok(payload));
                }
                Err(err) => {
                    self.payment.discard();
                    respond(reply, Err(err.into()));
                }
            },
            None => debug!("process completion with no pending command"),
        }
    }
}
