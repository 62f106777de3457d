//! Active payment-intent lifecycle.

use paybridge_core::{Result, SessionError};
use paybridge_sdk::models::PaymentIntent;
use tracing::debug;

/// Tracks the zero-or-one active payment intent and the caller-supplied
/// currency attached to it.
///
/// The SDK does not promise that an intent object survives a failed collect
/// or process attempt, so any failure discards the intent outright: the
/// lifecycle returns to empty, never to its previous state. Retrieving a new
/// intent silently replaces whatever was active.
#[derive(Debug, Default)]
pub struct PaymentIntentLifecycle {
    intent: Option<PaymentIntent>,
    currency: Option<String>,
}

impl PaymentIntentLifecycle {
    /// Start out empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active intent, if any.
    pub fn active(&self) -> Option<&PaymentIntent> {
        self.intent.as_ref()
    }

    /// The active intent, or `NoActivePaymentIntent`.
    ///
    /// # Errors
    ///
    /// Fails when the lifecycle is empty.
    pub fn require_active(&self) -> Result<&PaymentIntent> {
        self.intent
            .as_ref()
            .ok_or(SessionError::NoActivePaymentIntent)
    }

    /// Caller-supplied currency for the active intent; empty when none was
    /// supplied.
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or("")
    }

    /// Adopt a freshly retrieved intent, replacing any prior one.
    pub fn begin(&mut self, intent: PaymentIntent, currency: Option<String>) {
        if let Some(previous) = &self.intent {
            debug!(previous = ?previous.id, "active payment intent replaced");
        }
        self.intent = Some(intent);
        self.currency = currency;
    }

    /// Adopt the updated intent from a successful collect or process
    /// callback, keeping the currency.
    pub fn update(&mut self, intent: PaymentIntent) {
        self.intent = Some(intent);
    }

    /// Discard the active intent. Idempotent; returns `true` when an intent
    /// was actually dropped.
    pub fn discard(&mut self) -> bool {
        self.currency = None;
        self.intent.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybridge_sdk::enums::PaymentIntentStatus;

    fn intent(id: &str) -> PaymentIntent {
        PaymentIntent::new(id, 1000, PaymentIntentStatus::RequiresPaymentMethod)
    }

    #[test]
    fn empty_lifecycle_rejects_payment_commands() {
        let lifecycle = PaymentIntentLifecycle::new();
        assert!(matches!(
            lifecycle.require_active(),
            Err(SessionError::NoActivePaymentIntent)
        ));
    }

    #[test]
    fn begin_replaces_prior_intent_silently() {
        let mut lifecycle = PaymentIntentLifecycle::new();
        lifecycle.begin(intent("pi_1"), Some("usd".to_string()));
        lifecycle.begin(intent("pi_2"), Some("eur".to_string()));

        assert_eq!(
            lifecycle.active().and_then(|i| i.id.as_deref()),
            Some("pi_2")
        );
        assert_eq!(lifecycle.currency(), "eur");
    }

    #[test]
    fn update_keeps_currency() {
        let mut lifecycle = PaymentIntentLifecycle::new();
        lifecycle.begin(intent("pi_1"), Some("usd".to_string()));
        lifecycle.update(intent("pi_1").with_status(PaymentIntentStatus::RequiresConfirmation));

        assert_eq!(lifecycle.currency(), "usd");
        assert_eq!(
            lifecycle.active().map(|i| i.status),
            Some(PaymentIntentStatus::RequiresConfirmation)
        );
    }

    #[test]
    fn discard_empties_and_is_idempotent() {
        let mut lifecycle = PaymentIntentLifecycle::new();
        lifecycle.begin(intent("pi_1"), None);

        assert!(lifecycle.discard());
        assert!(!lifecycle.discard());
        assert!(lifecycle.require_active().is_err());
        assert_eq!(lifecycle.currency(), "");
    }
}
