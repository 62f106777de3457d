//! Core types shared across the paybridge workspace.
//!
//! This crate holds the session error taxonomy, the vendor SDK error wrapper,
//! and the operation-kind vocabulary used by the cancellation registry. It has
//! no async machinery of its own; everything here is plain data.

pub mod error;
pub mod types;

pub use error::{Result, SdkError, SessionError};
pub use types::{OperationKind, OperationTicket};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
