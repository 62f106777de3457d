//! Stable wire vocabulary exposed to bridge consumers.
//!
//! The vendor SDK renumbers and reorders its internal enumerations between
//! releases. Consumers of the bridge must never see that churn, so every
//! value crossing the bridge boundary goes through the hand-maintained
//! translation tables in [`tables`] and the serialized shapes in
//! [`payload`]. Wire integers are a compatibility contract: once assigned
//! they are never reused for a different meaning, and unknown SDK values
//! collapse to documented defaults instead of erroring.

pub mod payload;
pub mod tables;

pub use payload::{
    AddressPayload, LocationListPayload, LocationPayload, PaymentIntentPayload, ReaderPayload,
    SimulatorConfigPayload, UpdatePayload,
};
