//! Per-concept translation tables between SDK values and wire integers.
//!
//! Each function below is one table: an explicit arm per SDK value, never a
//! positional `as`-cast or ordinal index, so an SDK upgrade that reorders
//! its enums cannot silently shift wire meanings. Rules for maintenance:
//!
//! - entries are append-only; a wire integer is never reassigned
//! - unknown or newly-added SDK values map to the documented default
//! - the reverse tables (wire → SDK) accept the full historical integer
//!   range and fall back to the documented default rather than erroring

use paybridge_sdk::enums::{
    BatteryStatus, ConnectionStatus, DeviceType, DiscoveryMethod, LocationStatus, NetworkStatus,
    PaymentIntentStatus, PaymentStatus, ReaderDisplayMessage, ReaderEvent, SimulateReaderUpdate,
    SimulatedCardType, UpdateTimeEstimate,
};

/// Device type → wire. Unknown models map to 6.
pub fn device_type_to_wire(device_type: DeviceType) -> i64 {
    match device_type {
        DeviceType::Chipper2x => 0,
        DeviceType::VerifoneP400 => 1,
        DeviceType::WisePad3 => 2,
        DeviceType::StripeM2 => 3,
        DeviceType::WisePosE => 4,
        DeviceType::StripeS700 => 9,
        _ => 6,
    }
}

/// Connection status → wire. Default 0 (not connected).
pub fn connection_status_to_wire(status: ConnectionStatus) -> i64 {
    match status {
        ConnectionStatus::NotConnected => 0,
        ConnectionStatus::Connected => 1,
        ConnectionStatus::Connecting => 2,
        _ => 0,
    }
}

/// Payment status → wire. Default 0 (not ready).
pub fn payment_status_to_wire(status: PaymentStatus) -> i64 {
    match status {
        PaymentStatus::NotReady => 0,
        PaymentStatus::Ready => 1,
        PaymentStatus::WaitingForInput => 2,
        PaymentStatus::Processing => 3,
        _ => 0,
    }
}

/// Payment-intent status → wire. Default 0 (requires payment method).
///
/// This table is the canonical assignment; historical bridge revisions
/// disagreed on 3 and 5, and this layout is the one we are committed to.
pub fn payment_intent_status_to_wire(status: PaymentIntentStatus) -> i64 {
    match status {
        PaymentIntentStatus::RequiresPaymentMethod => 0,
        PaymentIntentStatus::RequiresConfirmation => 1,
        PaymentIntentStatus::RequiresCapture => 2,
        PaymentIntentStatus::Processing => 3,
        PaymentIntentStatus::Canceled => 4,
        PaymentIntentStatus::Succeeded => 5,
        _ => 0,
    }
}

/// Reader display message → wire. Default 0 (retry card).
pub fn display_message_to_wire(message: ReaderDisplayMessage) -> i64 {
    match message {
        ReaderDisplayMessage::RetryCard => 0,
        ReaderDisplayMessage::InsertCard => 1,
        ReaderDisplayMessage::InsertOrSwipeCard => 2,
        ReaderDisplayMessage::SwipeCard => 3,
        ReaderDisplayMessage::RemoveCard => 4,
        ReaderDisplayMessage::MultipleContactlessCardsDetected => 5,
        ReaderDisplayMessage::TryAnotherReadMethod => 6,
        ReaderDisplayMessage::TryAnotherCard => 7,
        _ => 0,
    }
}

/// Network status → wire. Default 0 (offline).
pub fn network_status_to_wire(status: NetworkStatus) -> i64 {
    match status {
        NetworkStatus::Offline => 0,
        NetworkStatus::Online => 1,
    }
}

/// Location status → wire. Default 0 (unknown).
pub fn location_status_to_wire(status: LocationStatus) -> i64 {
    match status {
        LocationStatus::Unknown => 0,
        LocationStatus::Set => 1,
        LocationStatus::NotSet => 2,
    }
}

/// Reader card event → wire.
pub fn reader_event_to_wire(event: ReaderEvent) -> i64 {
    match event {
        ReaderEvent::CardInserted => 0,
        ReaderEvent::CardRemoved => 1,
    }
}

/// Battery status → wire. Default 0 (unknown).
pub fn battery_status_to_wire(status: BatteryStatus) -> i64 {
    match status {
        BatteryStatus::Unknown => 0,
        BatteryStatus::Critical => 1,
        BatteryStatus::Low => 2,
        BatteryStatus::Nominal => 3,
        _ => 0,
    }
}

/// Install-time estimate → wire.
pub fn update_time_estimate_to_wire(estimate: UpdateTimeEstimate) -> i64 {
    match estimate {
        UpdateTimeEstimate::LessThanOneMinute => 0,
        UpdateTimeEstimate::OneToTwoMinutes => 1,
        UpdateTimeEstimate::TwoToFiveMinutes => 2,
        UpdateTimeEstimate::FiveToFifteenMinutes => 3,
    }
}

/// Wire → discovery method. Wire 3 was retired and never reassigned.
/// Anything unrecognized defaults to a Bluetooth scan.
pub fn discovery_method_from_wire(method: i64) -> DiscoveryMethod {
    match method {
        0 | 1 => DiscoveryMethod::BluetoothScan,
        2 => DiscoveryMethod::Internet,
        4 => DiscoveryMethod::Usb,
        5 => DiscoveryMethod::Embedded,
        6 => DiscoveryMethod::Handoff,
        7 => DiscoveryMethod::LocalMobile,
        _ => DiscoveryMethod::BluetoothScan,
    }
}

/// Simulated update plan → wire. Default 1 (no update).
pub fn simulate_update_to_wire(plan: SimulateReaderUpdate) -> i64 {
    match plan {
        SimulateReaderUpdate::UpdateAvailable => 0,
        SimulateReaderUpdate::None => 1,
        SimulateReaderUpdate::Required => 2,
        SimulateReaderUpdate::Random => 3,
        SimulateReaderUpdate::LowBattery => 4,
        _ => 1,
    }
}

/// Wire → simulated update plan. Defaults to no update.
pub fn simulate_update_from_wire(plan: i64) -> SimulateReaderUpdate {
    match plan {
        0 => SimulateReaderUpdate::UpdateAvailable,
        1 => SimulateReaderUpdate::None,
        2 => SimulateReaderUpdate::Required,
        3 => SimulateReaderUpdate::Random,
        4 => SimulateReaderUpdate::LowBattery,
        _ => SimulateReaderUpdate::None,
    }
}

/// Simulated card type → wire. Default 0 (Visa).
pub fn simulated_card_to_wire(card: SimulatedCardType) -> i64 {
    match card {
        SimulatedCardType::Visa => 0,
        SimulatedCardType::VisaDebit => 1,
        SimulatedCardType::Mastercard => 2,
        SimulatedCardType::MastercardDebit => 3,
        SimulatedCardType::MastercardPrepaid => 4,
        SimulatedCardType::Amex => 5,
        SimulatedCardType::Discover => 6,
        SimulatedCardType::ChargeDeclined => 7,
        SimulatedCardType::ChargeDeclinedInsufficientFunds => 8,
        _ => 0,
    }
}

/// Wire → simulated card type. Defaults to Visa.
pub fn simulated_card_from_wire(card: i64) -> SimulatedCardType {
    match card {
        0 => SimulatedCardType::Visa,
        1 => SimulatedCardType::VisaDebit,
        2 => SimulatedCardType::Mastercard,
        3 => SimulatedCardType::MastercardDebit,
        4 => SimulatedCardType::MastercardPrepaid,
        5 => SimulatedCardType::Amex,
        6 => SimulatedCardType::Discover,
        7 => SimulatedCardType::ChargeDeclined,
        8 => SimulatedCardType::ChargeDeclinedInsufficientFunds,
        _ => SimulatedCardType::Visa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DeviceType::Chipper2x, 0)]
    #[case(DeviceType::VerifoneP400, 1)]
    #[case(DeviceType::WisePad3, 2)]
    #[case(DeviceType::StripeM2, 3)]
    #[case(DeviceType::WisePosE, 4)]
    #[case(DeviceType::StripeS700, 9)]
    #[case(DeviceType::Chipper1x, 6)]
    #[case(DeviceType::Etna, 6)]
    #[case(DeviceType::WisePad3s, 6)]
    #[case(DeviceType::Unknown, 6)]
    fn device_type_table(#[case] device_type: DeviceType, #[case] wire: i64) {
        assert_eq!(device_type_to_wire(device_type), wire);
    }

    #[rstest]
    #[case(ConnectionStatus::NotConnected, 0)]
    #[case(ConnectionStatus::Connected, 1)]
    #[case(ConnectionStatus::Connecting, 2)]
    fn connection_status_table(#[case] status: ConnectionStatus, #[case] wire: i64) {
        assert_eq!(connection_status_to_wire(status), wire);
    }

    #[rstest]
    #[case(PaymentStatus::NotReady, 0)]
    #[case(PaymentStatus::Ready, 1)]
    #[case(PaymentStatus::WaitingForInput, 2)]
    #[case(PaymentStatus::Processing, 3)]
    fn payment_status_table(#[case] status: PaymentStatus, #[case] wire: i64) {
        assert_eq!(payment_status_to_wire(status), wire);
    }

    #[rstest]
    #[case(PaymentIntentStatus::RequiresPaymentMethod, 0)]
    #[case(PaymentIntentStatus::RequiresConfirmation, 1)]
    #[case(PaymentIntentStatus::RequiresCapture, 2)]
    #[case(PaymentIntentStatus::Processing, 3)]
    #[case(PaymentIntentStatus::Canceled, 4)]
    #[case(PaymentIntentStatus::Succeeded, 5)]
    fn payment_intent_status_table(#[case] status: PaymentIntentStatus, #[case] wire: i64) {
        assert_eq!(payment_intent_status_to_wire(status), wire);
    }

    #[rstest]
    #[case(ReaderDisplayMessage::RetryCard, 0)]
    #[case(ReaderDisplayMessage::InsertCard, 1)]
    #[case(ReaderDisplayMessage::InsertOrSwipeCard, 2)]
    #[case(ReaderDisplayMessage::SwipeCard, 3)]
    #[case(ReaderDisplayMessage::RemoveCard, 4)]
    #[case(ReaderDisplayMessage::MultipleContactlessCardsDetected, 5)]
    #[case(ReaderDisplayMessage::TryAnotherReadMethod, 6)]
    #[case(ReaderDisplayMessage::TryAnotherCard, 7)]
    #[case(ReaderDisplayMessage::CheckMobileDevice, 0)]
    fn display_message_table(#[case] message: ReaderDisplayMessage, #[case] wire: i64) {
        assert_eq!(display_message_to_wire(message), wire);
    }

    #[rstest]
    #[case(0, DiscoveryMethod::BluetoothScan)]
    #[case(1, DiscoveryMethod::BluetoothScan)]
    #[case(2, DiscoveryMethod::Internet)]
    #[case(3, DiscoveryMethod::BluetoothScan)] // retired slot
    #[case(4, DiscoveryMethod::Usb)]
    #[case(5, DiscoveryMethod::Embedded)]
    #[case(6, DiscoveryMethod::Handoff)]
    #[case(7, DiscoveryMethod::LocalMobile)]
    #[case(99, DiscoveryMethod::BluetoothScan)]
    #[case(-1, DiscoveryMethod::BluetoothScan)]
    fn discovery_method_table(#[case] wire: i64, #[case] method: DiscoveryMethod) {
        assert_eq!(discovery_method_from_wire(wire), method);
    }

    #[test]
    fn simulate_update_round_trips_through_wire() {
        for plan in [
            SimulateReaderUpdate::UpdateAvailable,
            SimulateReaderUpdate::None,
            SimulateReaderUpdate::Required,
            SimulateReaderUpdate::Random,
            SimulateReaderUpdate::LowBattery,
        ] {
            assert_eq!(simulate_update_from_wire(simulate_update_to_wire(plan)), plan);
        }
        assert_eq!(simulate_update_from_wire(42), SimulateReaderUpdate::None);
    }

    #[test]
    fn simulated_card_round_trips_through_wire() {
        for card in [
            SimulatedCardType::Visa,
            SimulatedCardType::Mastercard,
            SimulatedCardType::Amex,
            SimulatedCardType::ChargeDeclinedInsufficientFunds,
        ] {
            assert_eq!(simulated_card_from_wire(simulated_card_to_wire(card)), card);
        }
        assert_eq!(simulated_card_from_wire(-7), SimulatedCardType::Visa);
    }

    #[test]
    fn mappings_are_stable_across_calls() {
        // The tables are pure; repeated lookups within a process must agree.
        for _ in 0..3 {
            assert_eq!(device_type_to_wire(DeviceType::StripeS700), 9);
            assert_eq!(payment_intent_status_to_wire(PaymentIntentStatus::Succeeded), 5);
            assert_eq!(payment_status_to_wire(PaymentStatus::Processing), 3);
        }
    }
}
