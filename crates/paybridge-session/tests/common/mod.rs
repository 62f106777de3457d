//! Shared helpers for session integration tests.

#![allow(dead_code)]

use chrono::Utc;
use paybridge_sdk::enums::{DeviceType, PaymentIntentStatus, UpdateTimeEstimate};
use paybridge_sdk::mock::{MockTerminal, MockTerminalHandle, SdkCall};
use paybridge_sdk::models::{FirmwareUpdate, PaymentIntent, Reader};
use paybridge_session::{Session, SessionEvent, SessionEvents, SessionHandle};
use std::sync::{Arc, Once};
use std::time::Duration;

static TRACING: Once = Once::new();

/// Install a tracing subscriber once, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Spawn a session over a fresh mock SDK and run `initialize`.
///
/// The mock's call log is cleared afterwards so tests can assert over only
/// the calls they themselves provoke.
pub async fn spawn_initialized() -> (SessionHandle, SessionEvents, MockTerminalHandle) {
    init_tracing();
    let (sdk, handle) = MockTerminal::new();
    let (session, events) = Session::spawn(Arc::new(sdk));
    assert!(session.initialize().await.unwrap());
    assert!(handle.is_initialized());
    handle.clear_calls();
    (session, events, handle)
}

/// Await the next session event, failing the test after one second.
pub async fn next_event(events: &mut SessionEvents) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event stream closed")
}

/// Wait until the mock has recorded a call matching `pred`.
pub async fn wait_for_call(handle: &MockTerminalHandle, pred: impl Fn(&SdkCall) -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if handle.calls().iter().any(&pred) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for SDK call");
}

/// A simulated Bluetooth reader snapshot.
pub fn reader(serial: &str) -> Reader {
    Reader::new(serial, DeviceType::WisePad3)
        .simulated(true)
        .with_battery_level(0.9)
        .with_software_version("2.11.0.1")
}

/// An intent snapshot in the given status.
pub fn intent(id: &str, status: PaymentIntentStatus) -> PaymentIntent {
    PaymentIntent::new(id, 1099, status)
}

/// A firmware update snapshot.
pub fn firmware_update(version: &str) -> FirmwareUpdate {
    FirmwareUpdate {
        version: version.to_string(),
        components: vec!["firmware".to_string(), "keys".to_string()],
        required_at: Utc::now(),
        time_estimate: UpdateTimeEstimate::OneToTwoMinutes,
    }
}
