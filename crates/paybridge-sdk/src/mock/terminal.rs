//! Scriptable mock implementation of the vendor SDK.

use crate::cancel::{CancelDone, CancelHandle};
use crate::events::{SdkEvent, SdkEventSink};
use crate::models::{
    BluetoothConnectionConfig, Cart, CollectConfiguration, DiscoveryConfiguration,
    HandoffConnectionConfig, InternetConnectionConfig, ListLocationsParameters,
    LocalMobileConnectionConfig, PaymentIntent, Reader, SimulatorConfiguration,
    UsbConnectionConfig,
};
use crate::terminal::TerminalSdk;
use paybridge_core::SdkError;
use std::fmt;
use std::sync::{Arc, Mutex};

/// One recorded invocation of the mock SDK.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkCall {
    Initialize,
    DiscoverReaders(DiscoveryConfiguration),
    ConnectInternetReader {
        serial_number: String,
        fail_if_in_use: bool,
    },
    ConnectBluetoothReader {
        serial_number: String,
        location_id: String,
        auto_reconnect: bool,
    },
    ConnectUsbReader {
        serial_number: String,
        location_id: String,
    },
    ConnectLocalMobileReader {
        serial_number: String,
        location_id: String,
    },
    ConnectHandoffReader {
        serial_number: String,
        location_id: String,
    },
    DisconnectReader,
    RetrievePaymentIntent {
        client_secret: String,
    },
    CollectPaymentMethod {
        intent_id: Option<String>,
        update_payment_intent: bool,
    },
    ProcessPayment {
        intent_id: Option<String>,
    },
    InstallAvailableUpdate,
    SetReaderDisplay {
        currency: String,
        total: i64,
    },
    ClearReaderDisplay,
    ListLocations(ListLocationsParameters),
    ClearCachedCredentials,
    SetSimulatorConfiguration(SimulatorConfiguration),
    Cancel {
        operation: &'static str,
    },
}

struct MockInner {
    sink: Mutex<Option<SdkEventSink>>,
    calls: Mutex<Vec<SdkCall>>,
    cancel_outcome: Mutex<Result<(), SdkError>>,
    auto_resolve_cancels: Mutex<bool>,
    deferred_cancels: Mutex<Vec<(&'static str, CancelDone)>>,
    simulator_config: Mutex<SimulatorConfiguration>,
    init_error: Mutex<Option<SdkError>>,
    discover_error: Mutex<Option<SdkError>>,
}

impl MockInner {
    fn record(&self, call: SdkCall) {
        self.calls.lock().expect("mock lock poisoned").push(call);
    }
}

/// Mock vendor SDK.
///
/// Records calls, never emits callbacks on its own. Drive it through the
/// paired [`MockTerminalHandle`].
///
/// # Examples
///
/// ```
/// use paybridge_sdk::mock::{MockTerminal, SdkCall};
/// use paybridge_sdk::{SdkEventSink, TerminalSdk};
/// use tokio::sync::mpsc;
///
/// let (sdk, handle) = MockTerminal::new();
/// let (tx, _rx) = mpsc::unbounded_channel();
/// sdk.initialize(SdkEventSink::new(tx)).unwrap();
/// assert_eq!(handle.calls(), vec![SdkCall::Initialize]);
/// ```
#[derive(Clone)]
pub struct MockTerminal {
    inner: Arc<MockInner>,
}

impl fmt::Debug for MockTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTerminal").finish_non_exhaustive()
    }
}

impl MockTerminal {
    /// Create a mock SDK and its scripting handle.
    pub fn new() -> (Self, MockTerminalHandle) {
        let inner = Arc::new(MockInner {
            sink: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            cancel_outcome: Mutex::new(Ok(())),
            auto_resolve_cancels: Mutex::new(true),
            deferred_cancels: Mutex::new(Vec::new()),
            simulator_config: Mutex::new(SimulatorConfiguration::default()),
            init_error: Mutex::new(None),
            discover_error: Mutex::new(None),
        });
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockTerminalHandle { inner },
        )
    }
}

impl TerminalSdk for MockTerminal {
    fn initialize(&self, sink: SdkEventSink) -> Result<(), SdkError> {
        self.inner.record(SdkCall::Initialize);
        if let Some(err) = self.inner.init_error.lock().expect("mock lock poisoned").take() {
            return Err(err);
        }
        *self.inner.sink.lock().expect("mock lock poisoned") = Some(sink);
        Ok(())
    }

    fn discover_readers(
        &self,
        config: DiscoveryConfiguration,
    ) -> Result<Box<dyn CancelHandle>, SdkError> {
        self.inner.record(SdkCall::DiscoverReaders(config));
        if let Some(err) = self
            .inner
            .discover_error
            .lock()
            .expect("mock lock poisoned")
            .take()
        {
            return Err(err);
        }
        Ok(Box::new(MockCancelHandle {
            operation: "discovery",
            inner: Arc::clone(&self.inner),
        }))
    }

    fn connect_internet_reader(&self, reader: &Reader, config: InternetConnectionConfig) {
        self.inner.record(SdkCall::ConnectInternetReader {
            serial_number: reader.serial_number.clone(),
            fail_if_in_use: config.fail_if_in_use,
        });
    }

    fn connect_bluetooth_reader(&self, reader: &Reader, config: BluetoothConnectionConfig) {
        self.inner.record(SdkCall::ConnectBluetoothReader {
            serial_number: reader.serial_number.clone(),
            location_id: config.location_id,
            auto_reconnect: config.auto_reconnect_on_unexpected_disconnect,
        });
    }

    fn connect_usb_reader(&self, reader: &Reader, config: UsbConnectionConfig) {
        self.inner.record(SdkCall::ConnectUsbReader {
            serial_number: reader.serial_number.clone(),
            location_id: config.location_id,
        });
    }

    fn connect_local_mobile_reader(&self, reader: &Reader, config: LocalMobileConnectionConfig) {
        self.inner.record(SdkCall::ConnectLocalMobileReader {
            serial_number: reader.serial_number.clone(),
            location_id: config.location_id,
        });
    }

    fn connect_handoff_reader(&self, reader: &Reader, config: HandoffConnectionConfig) {
        self.inner.record(SdkCall::ConnectHandoffReader {
            serial_number: reader.serial_number.clone(),
            location_id: config.location_id,
        });
    }

    fn disconnect_reader(&self) {
        self.inner.record(SdkCall::DisconnectReader);
    }

    fn retrieve_payment_intent(&self, client_secret: &str) {
        self.inner.record(SdkCall::RetrievePaymentIntent {
            client_secret: client_secret.to_string(),
        });
    }

    fn collect_payment_method(
        &self,
        intent: &PaymentIntent,
        config: CollectConfiguration,
    ) -> Box<dyn CancelHandle> {
        self.inner.record(SdkCall::CollectPaymentMethod {
            intent_id: intent.id.clone(),
            update_payment_intent: config.update_payment_intent,
        });
        Box::new(MockCancelHandle {
            operation: "collectPaymentMethod",
            inner: Arc::clone(&self.inner),
        })
    }

    fn process_payment(&self, intent: &PaymentIntent) {
        self.inner.record(SdkCall::ProcessPayment {
            intent_id: intent.id.clone(),
        });
    }

    fn install_available_update(&self) {
        self.inner.record(SdkCall::InstallAvailableUpdate);
    }

    fn set_reader_display(&self, cart: &Cart) {
        self.inner.record(SdkCall::SetReaderDisplay {
            currency: cart.currency.clone(),
            total: cart.total,
        });
    }

    fn clear_reader_display(&self) {
        self.inner.record(SdkCall::ClearReaderDisplay);
    }

    fn list_locations(&self, params: ListLocationsParameters) {
        self.inner.record(SdkCall::ListLocations(params));
    }

    fn clear_cached_credentials(&self) {
        self.inner.record(SdkCall::ClearCachedCredentials);
    }

    fn simulator_configuration(&self) -> SimulatorConfiguration {
        *self.inner.simulator_config.lock().expect("mock lock poisoned")
    }

    fn set_simulator_configuration(&self, config: SimulatorConfiguration) {
        self.inner.record(SdkCall::SetSimulatorConfiguration(config));
        *self.inner.simulator_config.lock().expect("mock lock poisoned") = config;
    }
}

/// Scripting side of the mock SDK.
pub struct MockTerminalHandle {
    inner: Arc<MockInner>,
}

impl fmt::Debug for MockTerminalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTerminalHandle").finish_non_exhaustive()
    }
}

impl MockTerminalHandle {
    /// Emit one SDK callback, as the vendor library would from one of its
    /// own threads. Dropped silently if the SDK was never initialized.
    pub fn emit(&self, event: SdkEvent) {
        if let Some(sink) = self
            .inner
            .sink
            .lock()
            .expect("mock lock poisoned")
            .as_ref()
        {
            sink.emit(event);
        }
    }

    /// Returns `true` once `initialize` registered a callback sink.
    pub fn is_initialized(&self) -> bool {
        self.inner.sink.lock().expect("mock lock poisoned").is_some()
    }

    /// All invocations recorded so far, in order.
    pub fn calls(&self) -> Vec<SdkCall> {
        self.inner.calls.lock().expect("mock lock poisoned").clone()
    }

    /// Number of invocations recorded so far.
    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().expect("mock lock poisoned").len()
    }

    /// Forget all recorded invocations.
    pub fn clear_calls(&self) {
        self.inner.calls.lock().expect("mock lock poisoned").clear();
    }

    /// Outcome every subsequent cancel handle reports.
    pub fn set_cancel_outcome(&self, outcome: Result<(), SdkError>) {
        *self.inner.cancel_outcome.lock().expect("mock lock poisoned") = outcome;
    }

    /// Stop auto-resolving cancels; they queue until
    /// [`resolve_deferred_cancel`](Self::resolve_deferred_cancel).
    pub fn defer_cancel_resolution(&self) {
        *self
            .inner
            .auto_resolve_cancels
            .lock()
            .expect("mock lock poisoned") = false;
    }

    /// Resolve the oldest deferred cancel with `outcome`. Returns `false`
    /// when none is queued.
    pub fn resolve_deferred_cancel(&self, outcome: Result<(), SdkError>) -> bool {
        let deferred = {
            let mut queue = self
                .inner
                .deferred_cancels
                .lock()
                .expect("mock lock poisoned");
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };
        match deferred {
            Some((_, done)) => {
                done(outcome);
                true
            }
            None => false,
        }
    }

    /// Make the next `initialize` fail with `err`.
    pub fn fail_next_initialize(&self, err: SdkError) {
        *self.inner.init_error.lock().expect("mock lock poisoned") = Some(err);
    }

    /// Make the next `discover_readers` fail with `err`.
    pub fn fail_next_discover(&self, err: SdkError) {
        *self.inner.discover_error.lock().expect("mock lock poisoned") = Some(err);
    }

    /// Mint a cancel handle tied to this mock, for driving callbacks that
    /// carry one (install start, reconnect start). Cancels through it are
    /// recorded and resolved like any other mock cancel.
    pub fn cancel_handle(&self, operation: &'static str) -> Box<dyn CancelHandle> {
        Box::new(MockCancelHandle {
            operation,
            inner: Arc::clone(&self.inner),
        })
    }
}

struct MockCancelHandle {
    operation: &'static str,
    inner: Arc<MockInner>,
}

impl fmt::Debug for MockCancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCancelHandle")
            .field("operation", &self.operation)
            .finish()
    }
}

impl CancelHandle for MockCancelHandle {
    fn cancel(self: Box<Self>, done: CancelDone) {
        self.inner.record(SdkCall::Cancel {
            operation: self.operation,
        });
        let auto = *self
            .inner
            .auto_resolve_cancels
            .lock()
            .expect("mock lock poisoned");
        if auto {
            let outcome = self
                .inner
                .cancel_outcome
                .lock()
                .expect("mock lock poisoned")
                .clone();
            done(outcome);
        } else {
            self.inner
                .deferred_cancels
                .lock()
                .expect("mock lock poisoned")
                .push((self.operation, done));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{DeviceType, DiscoveryMethod};
    use tokio::sync::mpsc;

    fn initialized() -> (MockTerminal, MockTerminalHandle, mpsc::UnboundedReceiver<SdkEvent>) {
        let (sdk, handle) = MockTerminal::new();
        let (tx, rx) = mpsc::unbounded_channel();
        sdk.initialize(SdkEventSink::new(tx)).unwrap();
        (sdk, handle, rx)
    }

    #[test]
    fn records_calls_in_order() {
        let (sdk, handle, _rx) = initialized();
        sdk.clear_cached_credentials();
        sdk.disconnect_reader();

        assert_eq!(
            handle.calls(),
            vec![
                SdkCall::Initialize,
                SdkCall::ClearCachedCredentials,
                SdkCall::DisconnectReader,
            ]
        );
    }

    #[tokio::test]
    async fn handle_emits_into_sink() {
        let (_sdk, handle, mut rx) = initialized();
        handle.emit(SdkEvent::LowBatteryWarning);
        assert_eq!(rx.recv().await.unwrap().name(), "lowBatteryWarning");
    }

    #[test]
    fn cancel_resolves_with_configured_outcome() {
        let (sdk, handle, _rx) = initialized();
        handle.set_cancel_outcome(Err(SdkError::new("BUSY", "cannot cancel")));

        let cancel = sdk
            .discover_readers(DiscoveryConfiguration::new(DiscoveryMethod::BluetoothScan, true))
            .unwrap();

        let outcome = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&outcome);
        cancel.cancel(Box::new(move |result| {
            *seen.lock().unwrap() = Some(result);
        }));

        let got = outcome.lock().unwrap().clone().unwrap();
        assert_eq!(got, Err(SdkError::new("BUSY", "cannot cancel")));
        assert!(handle.calls().contains(&SdkCall::Cancel {
            operation: "discovery"
        }));
    }

    #[test]
    fn deferred_cancel_waits_for_manual_resolution() {
        let (sdk, handle, _rx) = initialized();
        handle.defer_cancel_resolution();

        let intent = PaymentIntent::new(
            "pi_1",
            500,
            crate::enums::PaymentIntentStatus::RequiresPaymentMethod,
        );
        let cancel = sdk.collect_payment_method(&intent, CollectConfiguration::default());

        let fired = Arc::new(Mutex::new(false));
        let seen = Arc::clone(&fired);
        cancel.cancel(Box::new(move |_| {
            *seen.lock().unwrap() = true;
        }));

        assert!(!*fired.lock().unwrap());
        assert!(handle.resolve_deferred_cancel(Ok(())));
        assert!(*fired.lock().unwrap());
        assert!(!handle.resolve_deferred_cancel(Ok(())));
    }

    #[test]
    fn failed_initialize_keeps_sink_unset() {
        let (sdk, handle) = MockTerminal::new();
        handle.fail_next_initialize(SdkError::new("NO_CONTEXT", "host not ready"));

        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(sdk.initialize(SdkEventSink::new(tx)).is_err());
        assert!(!handle.is_initialized());
    }

    #[test]
    fn simulator_configuration_round_trip() {
        let (sdk, _handle, _rx) = initialized();
        let config = SimulatorConfiguration {
            update_plan: crate::enums::SimulateReaderUpdate::Required,
            simulated_card: crate::enums::SimulatedCardType::Amex,
        };
        sdk.set_simulator_configuration(config);
        assert_eq!(sdk.simulator_configuration(), config);
    }

    #[test]
    fn reader_snapshot_feeds_connect_calls() {
        let (sdk, handle, _rx) = initialized();
        let reader = Reader::new("sn-9", DeviceType::WisePosE);
        sdk.connect_internet_reader(
            &reader,
            InternetConnectionConfig {
                fail_if_in_use: true,
            },
        );

        assert!(handle.calls().contains(&SdkCall::ConnectInternetReader {
            serial_number: "sn-9".to_string(),
            fail_if_in_use: true,
        }));
    }
}
