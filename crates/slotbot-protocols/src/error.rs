//! Engine error taxonomy.
//!
//! Five failure kinds with distinct recovery policies:
//!
//! - [`EngineError::Timeout`] — a wait predicate never became true within
//!   budget. Recovered locally where the wait was advisory, otherwise a
//!   flow failure.
//! - [`EngineError::Stale`] — an element handle outlived its DOM node.
//!   Always re-raised to the nearest bounded retry loop that can
//!   re-resolve the element.
//! - [`EngineError::Driver`] — the automation substrate itself is
//!   unusable. Handled at the worker boundary: session teardown, fresh
//!   session, one whole-operation retry.
//! - [`EngineError::RemoteServer`] — the target site reported a
//!   server-side failure for the current query.
//! - [`EngineError::Logic`] — an expected UI affordance could not be
//!   found or used; never retried automatically.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("timed out waiting for {what}")]
    Timeout { what: String },

    #[error("stale element reference: {what}")]
    Stale { what: String },

    #[error("browser driver failure: {message}")]
    Driver { message: String },

    #[error("remote server error: {message}")]
    RemoteServer { message: String },

    #[error("{message}")]
    Logic { message: String },
}

impl EngineError {
    pub fn timeout(what: impl Into<String>) -> Self {
        EngineError::Timeout { what: what.into() }
    }

    pub fn stale(what: impl Into<String>) -> Self {
        EngineError::Stale { what: what.into() }
    }

    pub fn driver(message: impl Into<String>) -> Self {
        EngineError::Driver {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        EngineError::RemoteServer {
            message: message.into(),
        }
    }

    pub fn logic(message: impl Into<String>) -> Self {
        EngineError::Logic {
            message: message.into(),
        }
    }

    /// True for faults the worker manager recovers from by recreating the
    /// session: substrate failures and staleness that escaped every bounded
    /// retry loop inside a flow.
    pub fn is_driver_fault(&self) -> bool {
        matches!(self, EngineError::Driver { .. } | EngineError::Stale { .. })
    }
}
