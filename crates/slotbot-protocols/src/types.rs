//! Core data model shared between the engine and its callers.

use serde::{Deserialize, Serialize};

/// A bookable room: one target page on the remote site.
///
/// Defined at configuration time and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Short stable key used by the front-end ("grey", "blue", ...).
    pub key: String,
    /// Human-readable title shown to end users.
    pub title: String,
    /// Target URL of the booking page.
    pub url: String,
}

/// One selectable service extracted from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceItem {
    /// Opaque identifier assigned by the remote site.
    pub id: String,
    /// Composite human-readable title (name / duration / cost).
    pub title: String,
}

/// Outcome of a slot query for one (room, service set, date) triple.
///
/// `Ok` always carries a non-empty ordered list of "HH:MM" strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimesResult {
    Ok { times: Vec<String> },
    Empty,
    Error { message: String },
}

impl TimesResult {
    pub fn ok(times: Vec<String>) -> Self {
        TimesResult::Ok { times }
    }

    pub fn error(message: impl Into<String>) -> Self {
        TimesResult::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TimesResult::Ok { .. })
    }
}

/// Outcome of one slot submission within a booking request.
///
/// A booking request fans out into one attempt per requested slot; attempts
/// are independent and a failed one never aborts the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingAttempt {
    /// Requested slot time, "HH:MM".
    pub time: String,
    pub ok: bool,
    /// Human-readable outcome for this slot.
    pub message: String,
}

impl BookingAttempt {
    pub fn succeeded(time: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            ok: true,
            message: message.into(),
        }
    }

    pub fn failed(time: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            ok: false,
            message: message.into(),
        }
    }
}

/// Outcome of a login or registration flow.
///
/// `ok` and `verified_records` are distinct facts: the site UI can report a
/// successful login while the server-side session is unusable. Only an
/// independent probe of a protected resource sets `verified_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub ok: bool,
    pub message: String,
    pub verified_records: bool,
}

impl AuthResult {
    pub fn verified(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            verified_records: true,
        }
    }

    pub fn unverified(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            message: message.into(),
            verified_records: false,
        }
    }
}

/// Outcome of a my-records retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsResult {
    pub ok: bool,
    /// Free-text reservation summaries, denoised and capped.
    pub records: Vec<String>,
    pub message: String,
}
