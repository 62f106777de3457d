//! Tracker of in-flight cancelable operations.
//!
//! The session allows at most one live operation per [`OperationKind`] at
//! any instant. Each slot owns the SDK's cancel handle for that operation.
//! Completion and cancellation race freely in the vendor SDK, so both paths
//! here are idempotent against an already-cleared slot.

use paybridge_core::{OperationKind, OperationTicket, Result, SessionError};
use paybridge_sdk::CancelHandle;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
struct Slot {
    ticket: OperationTicket,
    /// `None` once a cancel has consumed the handle but the slot has not
    /// yet been cleared by a completion callback.
    handle: Option<Box<dyn CancelHandle>>,
}

/// Outcome of starting a cancellation.
#[derive(Debug)]
pub enum CancelStart {
    /// Nothing of this kind is live; cancellation trivially succeeds.
    Idle,

    /// A cancel for this slot is already in flight; treat as success.
    AlreadyCancelling,

    /// Cancellation begins: invoke this handle and wait for its callback.
    Started(Box<dyn CancelHandle>),
}

/// At-most-one-per-kind registry of pending cancelable operations.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    slots: HashMap<OperationKind, Slot>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live operation of `kind`, taking ownership of its cancel
    /// handle.
    ///
    /// # Errors
    ///
    /// `OperationAlreadyPending` when an operation of this kind is live.
    pub fn begin(
        &mut self,
        kind: OperationKind,
        handle: Box<dyn CancelHandle>,
    ) -> Result<OperationTicket> {
        if self.slots.contains_key(&kind) {
            return Err(SessionError::already_pending(kind));
        }
        let ticket = OperationTicket::new();
        self.slots.insert(
            kind,
            Slot {
                ticket,
                handle: Some(handle),
            },
        );
        debug!(%kind, %ticket, "operation registered");
        Ok(ticket)
    }

    /// Returns `true` when an operation of `kind` is live.
    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Clear the slot for `kind` unconditionally.
    ///
    /// Idempotent: completion and cancellation callbacks may both try to
    /// clear the same slot, in either order. Returns `true` when a slot was
    /// actually cleared.
    pub fn complete(&mut self, kind: OperationKind) -> bool {
        match self.slots.remove(&kind) {
            Some(slot) => {
                debug!(%kind, ticket = %slot.ticket, "operation completed");
                true
            }
            None => false,
        }
    }

    /// Begin cancelling the operation of `kind`, if any.
    ///
    /// The slot is NOT cleared here: clearing is left to whichever callback
    /// fires first, natural completion or cancel resolution.
    pub fn start_cancel(&mut self, kind: OperationKind) -> CancelStart {
        match self.slots.get_mut(&kind) {
            None => CancelStart::Idle,
            Some(slot) => match slot.handle.take() {
                Some(handle) => CancelStart::Started(handle),
                None => CancelStart::AlreadyCancelling,
            },
        }
    }

    /// Kinds with a live operation, in no particular order.
    pub fn pending_kinds(&self) -> Vec<OperationKind> {
        self.slots.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybridge_core::SdkError;
    use paybridge_sdk::cancel::CancelDone;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct StubHandle {
        canceled: Arc<AtomicBool>,
    }

    impl StubHandle {
        fn new() -> (Box<Self>, Arc<AtomicBool>) {
            let canceled = Arc::new(AtomicBool::new(false));
            (
                Box::new(Self {
                    canceled: Arc::clone(&canceled),
                }),
                canceled,
            )
        }
    }

    impl CancelHandle for StubHandle {
        fn cancel(self: Box<Self>, done: CancelDone) {
            self.canceled.store(true, Ordering::SeqCst);
            done(Ok(()));
        }
    }

    #[test]
    fn second_begin_of_same_kind_fails() {
        let mut registry = OperationRegistry::new();
        let (first, _) = StubHandle::new();
        let (second, _) = StubHandle::new();

        registry.begin(OperationKind::Discovery, first).unwrap();
        let err = registry.begin(OperationKind::Discovery, second).unwrap_err();
        assert!(matches!(
            err,
            SessionError::OperationAlreadyPending {
                kind: OperationKind::Discovery
            }
        ));
    }

    #[test]
    fn different_kinds_coexist() {
        let mut registry = OperationRegistry::new();
        let (a, _) = StubHandle::new();
        let (b, _) = StubHandle::new();

        registry.begin(OperationKind::Discovery, a).unwrap();
        registry.begin(OperationKind::InstallUpdate, b).unwrap();
        assert_eq!(registry.pending_kinds().len(), 2);
    }

    #[test]
    fn complete_is_idempotent() {
        let mut registry = OperationRegistry::new();
        let (handle, _) = StubHandle::new();

        registry.begin(OperationKind::Discovery, handle).unwrap();
        assert!(registry.complete(OperationKind::Discovery));
        assert!(!registry.complete(OperationKind::Discovery));
        assert!(!registry.is_pending(OperationKind::Discovery));
    }

    #[test]
    fn cancel_of_nothing_is_idle() {
        let mut registry = OperationRegistry::new();
        assert!(matches!(
            registry.start_cancel(OperationKind::CollectPaymentMethod),
            CancelStart::Idle
        ));
    }

    #[test]
    fn cancel_hands_out_the_stored_handle_once() {
        let mut registry = OperationRegistry::new();
        let (handle, canceled) = StubHandle::new();
        registry.begin(OperationKind::Discovery, handle).unwrap();

        let CancelStart::Started(handle) = registry.start_cancel(OperationKind::Discovery) else {
            panic!("expected Started");
        };
        // Slot survives until a completion clears it.
        assert!(registry.is_pending(OperationKind::Discovery));

        // A second cancel while the first is in flight collapses to success.
        assert!(matches!(
            registry.start_cancel(OperationKind::Discovery),
            CancelStart::AlreadyCancelling
        ));

        handle.cancel(Box::new(|outcome| assert!(outcome.is_ok())));
        assert!(canceled.load(Ordering::SeqCst));

        // Whichever callback fires first clears the slot; both are safe.
        assert!(registry.complete(OperationKind::Discovery));
        assert!(!registry.complete(OperationKind::Discovery));
    }

    #[test]
    fn begin_after_complete_mints_a_new_ticket() {
        let mut registry = OperationRegistry::new();
        let (a, _) = StubHandle::new();
        let (b, _) = StubHandle::new();

        let first = registry.begin(OperationKind::Discovery, a).unwrap();
        registry.complete(OperationKind::Discovery);
        let second = registry.begin(OperationKind::Discovery, b).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn failed_cancel_leaves_slot_for_completion() {
        #[derive(Debug)]
        struct FailingHandle;
        impl CancelHandle for FailingHandle {
            fn cancel(self: Box<Self>, done: CancelDone) {
                done(Err(SdkError::new("BUSY", "cannot cancel now")));
            }
        }

        let mut registry = OperationRegistry::new();
        registry
            .begin(OperationKind::InstallUpdate, Box::new(FailingHandle))
            .unwrap();

        let CancelStart::Started(handle) = registry.start_cancel(OperationKind::InstallUpdate)
        else {
            panic!("expected Started");
        };
        handle.cancel(Box::new(|outcome| assert!(outcome.is_err())));

        // Failure does not clear the slot; the natural completion does.
        assert!(registry.is_pending(OperationKind::InstallUpdate));
        assert!(registry.complete(OperationKind::InstallUpdate));
    }
}
