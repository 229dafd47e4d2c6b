//! Intent/outcome envelope spoken by the conversational front-end.
//!
//! Each intent is dispatched to exactly one worker, identified by the
//! calling end-user's stable identity. Outcomes wrap the typed results —
//! a caller never sees raw page markup or a raw engine fault.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{AuthResult, BookingAttempt, RecordsResult, ServiceItem, TimesResult};

/// A unit of work for one user's automation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    FetchServices {
        room_url: String,
    },
    FetchSlots {
        room_url: String,
        service_ids: Vec<String>,
        date: NaiveDate,
    },
    Book {
        room_url: String,
        service_ids: Vec<String>,
        date: NaiveDate,
        times: Vec<String>,
        #[serde(default)]
        comment: String,
    },
    Login {
        phone: String,
        password: String,
    },
    Register {
        name: String,
        phone: String,
        password: String,
        confirm: String,
    },
    FetchRecords,
}

impl Intent {
    /// Short label used in logs and failure messages.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::FetchServices { .. } => "fetch_services",
            Intent::FetchSlots { .. } => "fetch_slots",
            Intent::Book { .. } => "book",
            Intent::Login { .. } => "login",
            Intent::Register { .. } => "register",
            Intent::FetchRecords => "fetch_records",
        }
    }
}

/// Typed result envelope returned to the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Services { services: Vec<ServiceItem> },
    Slots { result: TimesResult },
    Booking { attempts: Vec<BookingAttempt> },
    Auth { result: AuthResult },
    Records { result: RecordsResult },
    /// A failure that could not be expressed as one of the typed results
    /// (e.g. the service catalog could not be fetched after the session
    /// retry). Carries a short, user-facing reason.
    Error { message: String },
}
