//! Domain snapshots handed back by the vendor SDK.
//!
//! All of these are immutable value objects: the SDK replaces them wholesale
//! in callbacks and the session never mutates one in place.

use crate::enums::{
    DeviceType, DiscoveryMethod, LocationStatus, NetworkStatus, PaymentIntentStatus,
    SimulateReaderUpdate, SimulatedCardType, UpdateTimeEstimate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A physical card-acceptance device, as last seen by the SDK.
///
/// Transport-specific fields are optional: battery level and software version
/// only exist for Bluetooth/USB readers, network status and label only for
/// internet readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    /// Backend identifier, when the reader is registered.
    pub id: Option<String>,

    /// Serial number printed on the device. The lookup key for connect
    /// commands.
    pub serial_number: String,

    /// Hardware model.
    pub device_type: DeviceType,

    /// Whether this is a simulated reader.
    pub simulated: bool,

    /// Identifier of the location the reader is registered to.
    pub location_id: Option<String>,

    /// Whether the registered location is resolved.
    pub location_status: LocationStatus,

    /// Firmware version currently installed.
    pub software_version: Option<String>,

    /// Whether the SDK knows of a pending firmware update for this reader.
    pub has_available_update: bool,

    /// Battery charge in `0.0..=1.0`, when the transport reports it.
    pub battery_level: Option<f32>,

    /// Reachability, for internet readers.
    pub network_status: Option<NetworkStatus>,

    /// Operator-assigned label, for internet readers.
    pub label: Option<String>,
}

impl Reader {
    /// Create a reader snapshot with the minimal required fields.
    pub fn new(serial_number: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            id: None,
            serial_number: serial_number.into(),
            device_type,
            simulated: false,
            location_id: None,
            location_status: LocationStatus::Unknown,
            software_version: None,
            has_available_update: false,
            battery_level: None,
            network_status: None,
            label: None,
        }
    }

    /// Mark this snapshot as a simulated reader.
    pub fn simulated(mut self, simulated: bool) -> Self {
        self.simulated = simulated;
        self
    }

    /// Attach a backend identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a battery level reading.
    pub fn with_battery_level(mut self, level: f32) -> Self {
        self.battery_level = Some(level);
        self
    }

    /// Attach a firmware version.
    pub fn with_software_version(mut self, version: impl Into<String>) -> Self {
        self.software_version = Some(version.into());
        self
    }

    /// Attach a registered location.
    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self.location_status = LocationStatus::Set;
        self
    }

    /// Attach an internet-reader network status.
    pub fn with_network_status(mut self, status: NetworkStatus) -> Self {
        self.network_status = Some(status);
        self
    }

    /// Attach an operator label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Local mirror of a server-side payment intent.
///
/// The currency is deliberately absent: the SDK does not reliably carry it,
/// so the session keeps the caller-supplied currency alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Backend identifier.
    pub id: Option<String>,

    /// Creation time, epoch milliseconds.
    pub created: i64,

    /// Current lifecycle status.
    pub status: PaymentIntentStatus,

    /// Amount in the currency's smallest unit.
    pub amount: u64,

    /// Free-form metadata attached by the backend.
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    /// Create an intent snapshot.
    pub fn new(id: impl Into<String>, amount: u64, status: PaymentIntentStatus) -> Self {
        Self {
            id: Some(id.into()),
            created: Utc::now().timestamp_millis(),
            status,
            amount,
            metadata: HashMap::new(),
        }
    }

    /// Return a copy with a different status, as the SDK does after collect
    /// and process callbacks.
    pub fn with_status(mut self, status: PaymentIntentStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A firmware update the SDK discovered for the connected reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareUpdate {
    /// Version string the reader will run after installation.
    pub version: String,

    /// Firmware components included in the bundle.
    pub components: Vec<String>,

    /// Deadline by which the vendor requires the update installed.
    pub required_at: DateTime<Utc>,

    /// Coarse install-time estimate.
    pub time_estimate: UpdateTimeEstimate,
}

/// A merchant location readers can be registered to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Backend identifier.
    pub id: String,

    /// Display name configured by the operator.
    pub display_name: Option<String>,

    /// Whether this is a live-mode location.
    pub livemode: bool,

    /// Postal address, when configured.
    pub address: Option<Address>,

    /// Free-form metadata attached by the backend.
    pub metadata: HashMap<String, String>,
}

/// Postal address of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub country: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
}

/// A line item shown on the reader's cart display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub display_name: String,
    pub quantity: i64,
    pub amount: i64,
}

/// Contents of the reader's customer-facing display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub currency: String,
    pub tax: i64,
    pub total: i64,
    pub line_items: Vec<CartLineItem>,
}

/// Parameters for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfiguration {
    /// Discovery timeout in seconds; `0` lets the SDK run until canceled.
    pub timeout_secs: u32,

    /// Transport to scan.
    pub method: DiscoveryMethod,

    /// Whether to discover simulated readers.
    pub simulated: bool,
}

impl DiscoveryConfiguration {
    /// Discovery with no deadline on the given transport.
    pub fn new(method: DiscoveryMethod, simulated: bool) -> Self {
        Self {
            timeout_secs: 0,
            method,
            simulated,
        }
    }
}

/// Connection parameters for an internet reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetConnectionConfig {
    /// Reject the connection if another POS is already using the reader.
    pub fail_if_in_use: bool,
}

/// Connection parameters for a Bluetooth reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothConnectionConfig {
    /// Location to register the reader to while connected.
    pub location_id: String,

    /// Let the SDK reconnect on its own after an unexpected disconnect.
    pub auto_reconnect_on_unexpected_disconnect: bool,
}

/// Connection parameters for a USB reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbConnectionConfig {
    pub location_id: String,
}

/// Connection parameters for the phone's own NFC reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMobileConnectionConfig {
    pub location_id: String,
}

/// Connection parameters for a handoff reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffConnectionConfig {
    pub location_id: String,
}

/// Options for collecting a payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectConfiguration {
    /// Ask the backend to refresh the intent during collection.
    pub update_payment_intent: bool,
}

/// Paging parameters for the location listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLocationsParameters {
    pub limit: Option<u32>,
    pub ending_before: Option<String>,
    pub starting_after: Option<String>,
}

impl ListLocationsParameters {
    /// Returns `true` when no paging parameter is set.
    pub fn is_default(&self) -> bool {
        self.limit.is_none() && self.ending_before.is_none() && self.starting_after.is_none()
    }
}

/// Behavior knobs for simulated readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfiguration {
    /// Update plan a simulated reader pretends to carry.
    pub update_plan: SimulateReaderUpdate,

    /// Card brand a simulated reader presents.
    pub simulated_card: SimulatedCardType,
}

impl Default for SimulatorConfiguration {
    fn default() -> Self {
        Self {
            update_plan: SimulateReaderUpdate::None,
            simulated_card: SimulatedCardType::Visa,
        }
    }
}
