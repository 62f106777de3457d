//! Serialized payload shapes crossing the bridge boundary.
//!
//! Every payload carries only stable wire fields: enum values already
//! translated through [`tables`](crate::tables), nullable strings as
//! explicit `null` (no field is skipped when absent), and metadata
//! flattened to string-valued pairs in sorted key order.

use crate::tables;
use paybridge_sdk::enums::NetworkStatus;
use paybridge_sdk::models::{
    Address, FirmwareUpdate, Location, PaymentIntent, Reader, SimulatorConfiguration,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

fn sorted_metadata(metadata: &HashMap<String, String>) -> BTreeMap<String, String> {
    metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// A reader as consumers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderPayload {
    pub device_type: i64,
    pub simulated: bool,
    pub stripe_id: Option<String>,
    pub location_id: Option<String>,
    pub location_status: i64,
    pub serial_number: String,
    pub device_software_version: Option<String>,
    pub is_available_update: bool,
    pub battery_level: f64,
    /// Wire network status; offline when the transport has no notion of it.
    pub status: i64,
    pub label: Option<String>,
}

impl ReaderPayload {
    /// Serialize a reader snapshot.
    pub fn from_reader(reader: &Reader) -> Self {
        Self {
            device_type: tables::device_type_to_wire(reader.device_type),
            simulated: reader.simulated,
            stripe_id: reader.id.clone(),
            location_id: reader.location_id.clone(),
            location_status: tables::location_status_to_wire(reader.location_status),
            serial_number: reader.serial_number.clone(),
            device_software_version: reader.software_version.clone(),
            is_available_update: reader.has_available_update,
            battery_level: reader.battery_level.map_or(0.0, f64::from),
            status: tables::network_status_to_wire(
                reader.network_status.unwrap_or(NetworkStatus::Offline),
            ),
            label: reader.label.clone(),
        }
    }
}

/// A payment intent as consumers see it. The currency is the one the
/// caller supplied at retrieve time, not anything the SDK reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentPayload {
    pub stripe_id: Option<String>,
    pub created: i64,
    pub status: i64,
    pub amount: u64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntentPayload {
    /// Serialize an intent snapshot with the caller-supplied currency.
    pub fn from_intent(intent: &PaymentIntent, currency: &str) -> Self {
        Self {
            stripe_id: intent.id.clone(),
            created: intent.created,
            status: tables::payment_intent_status_to_wire(intent.status),
            amount: intent.amount,
            currency: currency.to_string(),
            metadata: sorted_metadata(&intent.metadata),
        }
    }
}

/// A firmware update as consumers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub estimated_update_time_string: String,
    pub estimated_update_time: i64,
    pub device_software_version: String,
    pub components: Vec<String>,
    /// Epoch milliseconds.
    pub required_at: i64,
}

impl UpdatePayload {
    /// Serialize an update snapshot.
    pub fn from_update(update: &FirmwareUpdate) -> Self {
        Self {
            estimated_update_time_string: update.time_estimate.description().to_string(),
            estimated_update_time: tables::update_time_estimate_to_wire(update.time_estimate),
            device_software_version: update.version.clone(),
            components: update.components.clone(),
            required_at: update.required_at.timestamp_millis(),
        }
    }
}

/// A postal address as consumers see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub city: Option<String>,
    pub country: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
}

impl AddressPayload {
    /// Serialize an address.
    pub fn from_address(address: &Address) -> Self {
        Self {
            city: address.city.clone(),
            country: address.country.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            postal_code: address.postal_code.clone(),
            state: address.state.clone(),
        }
    }
}

/// A merchant location as consumers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub stripe_id: String,
    pub display_name: Option<String>,
    pub livemode: bool,
    pub address: Option<AddressPayload>,
    pub metadata: BTreeMap<String, String>,
}

impl LocationPayload {
    /// Serialize a location.
    pub fn from_location(location: &Location) -> Self {
        Self {
            stripe_id: location.id.clone(),
            display_name: location.display_name.clone(),
            livemode: location.livemode,
            address: location.address.as_ref().map(AddressPayload::from_address),
            metadata: sorted_metadata(&location.metadata),
        }
    }
}

/// One page of the location listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationListPayload {
    pub locations: Vec<LocationPayload>,
    pub has_more: bool,
}

/// Simulator knobs as consumers see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorConfigPayload {
    pub available_reader_update: i64,
    pub simulated_card: i64,
}

impl SimulatorConfigPayload {
    /// Serialize the simulator configuration.
    pub fn from_config(config: &SimulatorConfiguration) -> Self {
        Self {
            available_reader_update: tables::simulate_update_to_wire(config.update_plan),
            simulated_card: tables::simulated_card_to_wire(config.simulated_card),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use paybridge_sdk::enums::{
        DeviceType, PaymentIntentStatus, SimulateReaderUpdate, SimulatedCardType,
        UpdateTimeEstimate,
    };

    #[test]
    fn absent_strings_serialize_as_explicit_null() {
        let reader = Reader::new("sn-1", DeviceType::Chipper2x);
        let json = serde_json::to_value(ReaderPayload::from_reader(&reader)).unwrap();

        // Nullable fields must be present and null, not omitted.
        assert!(json.get("stripeId").unwrap().is_null());
        assert!(json.get("label").unwrap().is_null());
        assert!(json.get("deviceSoftwareVersion").unwrap().is_null());
        assert_eq!(json["serialNumber"], "sn-1");
        assert_eq!(json["deviceType"], 0);
        assert_eq!(json["status"], 0);
        assert_eq!(json["batteryLevel"], 0.0);
    }

    #[test]
    fn internet_reader_fields_carry_through() {
        let reader = Reader::new("sn-2", DeviceType::WisePosE)
            .with_network_status(NetworkStatus::Online)
            .with_label("Front counter")
            .with_location("loc_1");
        let payload = ReaderPayload::from_reader(&reader);

        assert_eq!(payload.device_type, 4);
        assert_eq!(payload.status, 1);
        assert_eq!(payload.label.as_deref(), Some("Front counter"));
        assert_eq!(payload.location_id.as_deref(), Some("loc_1"));
        assert_eq!(payload.location_status, 1);
    }

    #[test]
    fn intent_metadata_flattens_sorted() {
        let intent = PaymentIntent::new("pi_1", 2500, PaymentIntentStatus::RequiresCapture)
            .with_metadata("zebra", "1")
            .with_metadata("apple", "2");
        let payload = PaymentIntentPayload::from_intent(&intent, "usd");

        assert_eq!(payload.status, 2);
        assert_eq!(payload.currency, "usd");
        let keys: Vec<&String> = payload.metadata.keys().collect();
        assert_eq!(keys, ["apple", "zebra"]);
    }

    #[test]
    fn update_payload_uses_epoch_millis_and_estimate_table() {
        let update = FirmwareUpdate {
            version: "2.11.0.2".to_string(),
            components: vec!["firmware".to_string(), "config".to_string()],
            required_at: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
            time_estimate: UpdateTimeEstimate::TwoToFiveMinutes,
        };
        let payload = UpdatePayload::from_update(&update);

        assert_eq!(payload.estimated_update_time, 2);
        assert_eq!(payload.estimated_update_time_string, "2-5 minutes");
        assert_eq!(payload.required_at, update.required_at.timestamp_millis());
    }

    #[test]
    fn location_without_address_serializes_null_address() {
        let location = Location {
            id: "loc_9".to_string(),
            display_name: None,
            livemode: false,
            address: None,
            metadata: HashMap::new(),
        };
        let json = serde_json::to_value(LocationPayload::from_location(&location)).unwrap();
        assert!(json.get("address").unwrap().is_null());
        assert!(json.get("displayName").unwrap().is_null());
    }

    #[test]
    fn simulator_config_payload_uses_tables() {
        let config = SimulatorConfiguration {
            update_plan: SimulateReaderUpdate::Required,
            simulated_card: SimulatedCardType::Amex,
        };
        let payload = SimulatorConfigPayload::from_config(&config);
        assert_eq!(payload.available_reader_update, 2);
        assert_eq!(payload.simulated_card, 5);
    }
}
