//! Composite procedures built from the probe, selector, calendar and
//! voting layers. One module per user-visible operation.
//!
//! Failure discipline: required gates fail fast with a specific
//! [`EngineError`](slotbot_protocols::EngineError); driver faults and
//! staleness bubble through untouched so the worker boundary can recreate
//! the session; booking alone converts everything into per-slot outcomes
//! and never errors as a whole.

pub mod auth;
pub mod booking;
pub mod records;
pub mod services;
pub mod slots;
