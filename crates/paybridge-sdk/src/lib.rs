//! Vendor SDK capability surface for the paybridge session layer.
//!
//! The physical card readers are driven by a closed vendor SDK. This crate
//! models the slice of that SDK the bridge actually touches: the domain
//! snapshots it hands back ([`Reader`], [`PaymentIntent`], firmware updates,
//! locations), its internal enumerations, the asynchronous callback stream,
//! and the cancel handles returned by long-running calls.
//!
//! The SDK itself is reached exclusively through the [`TerminalSdk`] trait,
//! injected into the session at construction. Every trait method returns
//! promptly; results and unsolicited notifications are delivered later as
//! [`SdkEvent`]s through the [`SdkEventSink`] registered at initialization,
//! on whatever thread the vendor picks. Serializing those callbacks is the
//! session layer's job, not this crate's.
//!
//! # Mock implementation
//!
//! The [`mock`] module provides [`MockTerminal`](mock::MockTerminal), a
//! scriptable test double driven from a paired handle, mirroring how the
//! session would sit on top of the real vendor library.

pub mod cancel;
pub mod enums;
pub mod events;
pub mod mock;
pub mod models;
pub mod terminal;

pub use cancel::{CancelDone, CancelHandle};
pub use enums::{
    BatteryStatus, ConnectionStatus, DeviceType, DiscoveryMethod, LocationStatus, NetworkStatus,
    PaymentIntentStatus, PaymentStatus, ReaderDisplayMessage, ReaderEvent, ReaderInputOption,
    ReaderInputOptions, SimulateReaderUpdate, SimulatedCardType, UpdateTimeEstimate,
};
pub use events::{ConnectionTokenRequest, LocationPage, SdkEvent, SdkEventSink};
pub use models::{
    Address, BluetoothConnectionConfig, Cart, CartLineItem, CollectConfiguration,
    DiscoveryConfiguration, FirmwareUpdate, HandoffConnectionConfig, InternetConnectionConfig,
    ListLocationsParameters, LocalMobileConnectionConfig, Location, PaymentIntent, Reader,
    SimulatorConfiguration, UsbConnectionConfig,
};
pub use terminal::TerminalSdk;
