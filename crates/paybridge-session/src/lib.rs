//! Session layer bridging a host application to the vendor card-reader SDK.
//!
//! The vendor SDK answers every call through callbacks that arrive on
//! arbitrary threads. This crate converts that surface into something a
//! single-threaded consumer can use: a command handle whose calls resolve
//! exactly once, and an ordered stream of unsolicited events, both speaking
//! the stable wire vocabulary from `paybridge-wire`.
//!
//! # Structure
//!
//! - [`Session`] spawns the dispatcher task over an injected
//!   [`TerminalSdk`](paybridge_sdk::TerminalSdk) capability.
//! - [`SessionHandle`] issues commands; [`SessionEvents`] yields events.
//! - [`OperationRegistry`](registry::OperationRegistry) enforces at most one
//!   live cancelable operation per kind and owns cancellation idempotency.
//! - [`ConnectionStateMachine`](connection::ConnectionStateMachine),
//!   [`PaymentIntentLifecycle`](payment::PaymentIntentLifecycle), and
//!   [`UpdateLifecycle`](update::UpdateLifecycle) advance as SDK callbacks
//!   arrive.
//! - [`DeviceRegistry`](devices::DeviceRegistry) resolves serial numbers
//!   against the latest discovery snapshot.
//!
//! # Concurrency model
//!
//! All mutable state lives inside one task. Commands, SDK callbacks, and
//! cancel resolutions are funneled over channels into that task, so no two
//! state transitions ever interleave, and events are emitted in exactly the
//! order transitions were applied. No command handler blocks: each one
//! either resolves synchronously or parks a responder for the matching
//! callback. Timeouts are the SDK's business; this layer imposes none.

pub mod commands;
pub mod connection;
pub mod devices;
pub mod dispatcher;
pub mod events;
pub mod payment;
pub mod registry;
pub mod update;

pub use commands::{
    BluetoothConnectOptions, DiscoveryOptions, HandoffConnectOptions, InternetConnectOptions,
    LocalMobileConnectOptions, RetrievePaymentIntentOptions, SimulatorOptions, UsbConnectOptions,
};
pub use dispatcher::{Session, SessionEvents, SessionHandle};
pub use events::SessionEvent;

// Re-export the error surface so consumers need only this crate.
pub use paybridge_core::{OperationKind, Result, SdkError, SessionError};
