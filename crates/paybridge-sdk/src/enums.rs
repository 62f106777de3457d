//! Vendor SDK enumerations.
//!
//! These mirror the vendor's internal value sets. Their ordinal positions are
//! NOT stable across SDK releases (the vendor reorders and extends them),
//! which is why nothing outside `paybridge-wire` may derive a number from
//! them positionally. All are `#[non_exhaustive]` where the vendor is known
//! to grow the set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware model of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DeviceType {
    Chipper1x,
    Chipper2x,
    StripeM2,
    CotsDevice,
    VerifoneP400,
    WisePad3,
    WisePad3s,
    WisePosE,
    WisePosEDevkit,
    Etna,
    StripeS700,
    StripeS700Devkit,
    Unknown,
}

/// Connection state between the SDK and a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConnectionStatus {
    NotConnected,
    Connecting,
    Connected,
}

/// The SDK's readiness to take a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PaymentStatus {
    NotReady,
    Ready,
    WaitingForInput,
    Processing,
}

/// Lifecycle status of a payment intent as reported by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresCapture,
    Processing,
    Canceled,
    Succeeded,
}

/// Prompt the reader wants shown to the cardholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ReaderDisplayMessage {
    RetryCard,
    InsertCard,
    InsertOrSwipeCard,
    SwipeCard,
    RemoveCard,
    MultipleContactlessCardsDetected,
    TryAnotherReadMethod,
    TryAnotherCard,
    CheckMobileDevice,
}

impl fmt::Display for ReaderDisplayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReaderDisplayMessage::RetryCard => "Retry card",
            ReaderDisplayMessage::InsertCard => "Insert card",
            ReaderDisplayMessage::InsertOrSwipeCard => "Insert or swipe card",
            ReaderDisplayMessage::SwipeCard => "Swipe card",
            ReaderDisplayMessage::RemoveCard => "Remove card",
            ReaderDisplayMessage::MultipleContactlessCardsDetected => {
                "Multiple contactless cards detected"
            }
            ReaderDisplayMessage::TryAnotherReadMethod => "Try another read method",
            ReaderDisplayMessage::TryAnotherCard => "Try another card",
            ReaderDisplayMessage::CheckMobileDevice => "Check mobile device",
        };
        write!(f, "{text}")
    }
}

/// A single input method the reader is prepared to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderInputOption {
    SwipeCard,
    InsertCard,
    TapCard,
}

impl fmt::Display for ReaderInputOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReaderInputOption::SwipeCard => "Swipe",
            ReaderInputOption::InsertCard => "Insert",
            ReaderInputOption::TapCard => "Tap",
        };
        write!(f, "{text}")
    }
}

/// The set of input methods offered for the current operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInputOptions(pub Vec<ReaderInputOption>);

impl fmt::Display for ReaderInputOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" / "))
    }
}

/// Reachability of an internet-connected reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Offline,
    Online,
}

/// Whether a reader's registered location is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    Unknown,
    Set,
    NotSet,
}

/// Card presence changes reported by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderEvent {
    CardInserted,
    CardRemoved,
}

/// Reader battery condition buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BatteryStatus {
    Unknown,
    Critical,
    Low,
    Nominal,
}

/// Transport used to locate readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    BluetoothScan,
    Internet,
    Usb,
    Embedded,
    Handoff,
    LocalMobile,
}

/// Update plan a simulated reader should pretend to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SimulateReaderUpdate {
    UpdateAvailable,
    None,
    Required,
    Random,
    LowBattery,
}

/// Card brand a simulated reader should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SimulatedCardType {
    Visa,
    VisaDebit,
    Mastercard,
    MastercardDebit,
    MastercardPrepaid,
    Amex,
    Discover,
    ChargeDeclined,
    ChargeDeclinedInsufficientFunds,
}

/// Coarse estimate of how long a firmware install will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTimeEstimate {
    LessThanOneMinute,
    OneToTwoMinutes,
    TwoToFiveMinutes,
    FiveToFifteenMinutes,
}

impl UpdateTimeEstimate {
    /// Human-readable description shown to operators.
    pub fn description(&self) -> &'static str {
        match self {
            UpdateTimeEstimate::LessThanOneMinute => "Less than 1 minute",
            UpdateTimeEstimate::OneToTwoMinutes => "1-2 minutes",
            UpdateTimeEstimate::TwoToFiveMinutes => "2-5 minutes",
            UpdateTimeEstimate::FiveToFifteenMinutes => "5-15 minutes",
        }
    }
}

impl fmt::Display for UpdateTimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}
