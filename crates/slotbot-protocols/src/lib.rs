//! # Slotbot Protocols
//!
//! Typed boundary between the automation engine and its callers.
//! Contains the data model (services, slots, booking attempts, auth and
//! records results), the intent/outcome envelope the conversational
//! front-end speaks, and the engine error taxonomy.
//!
//! Nothing in this crate touches a browser: results carry plain structured
//! data, never raw page markup.

pub mod error;
pub mod intent;
pub mod types;

pub use error::EngineError;
pub use intent::{Intent, Outcome};
pub use types::{
    AuthResult, BookingAttempt, RecordsResult, Room, ServiceItem, TimesResult,
};
