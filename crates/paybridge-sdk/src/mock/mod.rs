//! Mock vendor SDK for testing and development.
//!
//! [`MockTerminal`] implements [`TerminalSdk`](crate::terminal::TerminalSdk)
//! without any hardware or network. It records every invocation and emits
//! nothing on its own; the paired [`MockTerminalHandle`] scripts callbacks,
//! so tests control exactly which SDK events fire and in what order.

mod terminal;

pub use terminal::{MockTerminal, MockTerminalHandle, SdkCall};
