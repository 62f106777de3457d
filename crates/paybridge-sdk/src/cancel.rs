//! Cancel handles for long-running SDK operations.
//!
//! Discovery, payment-method collection, firmware installs, and the SDK's
//! own auto-reconnect all hand back an opaque token that can be asked to
//! stop early. Cancellation is cooperative: `cancel` only queues the
//! request, and the outcome arrives later through the `done` callback, on
//! whatever thread the vendor picks.

use paybridge_core::SdkError;
use std::fmt;

/// Callback invoked once the SDK resolves a cancellation request.
pub type CancelDone = Box<dyn FnOnce(Result<(), SdkError>) + Send + 'static>;

/// An opaque token for stopping a long-running SDK operation.
///
/// Consuming `self` encodes the contract: a handle can be canceled at most
/// once, and after cancellation the only signal left is the `done` callback
/// (plus whatever natural-completion callback the operation itself still
/// delivers).
pub trait CancelHandle: Send + fmt::Debug {
    /// Queue a cancellation request with the SDK.
    ///
    /// `done` fires exactly once when the SDK resolves the request: `Ok` if
    /// the operation was stopped, `Err` if the SDK could not stop it. A
    /// successful cancel does not suppress the operation's own terminal
    /// callback; callers must tolerate both arriving.
    fn cancel(self: Box<Self>, done: CancelDone);
}
