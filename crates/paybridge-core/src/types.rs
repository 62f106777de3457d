//! Operation-kind vocabulary and the opaque tickets handed out by the
//! cancellation registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kinds of long-running, cancelable operations tracked by the session.
///
/// The session guarantees at most one live operation per kind at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// Reader discovery over a transport.
    Discovery,

    /// Collecting a payment method against the active payment intent.
    CollectPaymentMethod,

    /// Installing a reader firmware update.
    InstallUpdate,

    /// The SDK's own reconnect attempt after an unexpected disconnect.
    AutoReconnect,
}

impl OperationKind {
    /// All kinds, in a fixed order. Useful for exhaustive teardown.
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Discovery,
        OperationKind::CollectPaymentMethod,
        OperationKind::InstallUpdate,
        OperationKind::AutoReconnect,
    ];
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Discovery => "discovery",
            OperationKind::CollectPaymentMethod => "collectPaymentMethod",
            OperationKind::InstallUpdate => "installUpdate",
            OperationKind::AutoReconnect => "autoReconnect",
        };
        write!(f, "{name}")
    }
}

/// Opaque ticket identifying one registered pending operation.
///
/// Tickets are never reused; a fresh one is minted for every successful
/// `begin` on the operation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationTicket(Uuid);

impl OperationTicket {
    /// Mint a new, unique ticket.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
