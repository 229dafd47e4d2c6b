//! # Slotbot Engine
//!
//! Automation and booking engine over a real browser: one isolated Chrome
//! session per end user, reliable extraction of asynchronously rendered
//! state, multi-step form driving, and recovery from transient automation
//! failures.
//!
//! Layering, leaves first:
//!
//! - [`cdp`] — the browser substrate: Chrome launcher, CDP client, page
//!   sessions.
//! - [`poll`] — generic wait-until-condition primitives.
//! - [`site`] / [`probe`] — the logical page operations and their
//!   marker-driven DOM implementation; the only place that knows the
//!   remote markup.
//! - [`vote`] — stabilization of flickering extractions by voting.
//! - [`calendar`] / [`selector`] — bounded navigation and idempotent
//!   multi-select protocols.
//! - [`flows`] — composite booking/auth procedures.
//! - [`worker`] — per-user session ownership, the worker registry and the
//!   catalog cache.
//!
//! The public entry point is [`Engine`]: typed intents in, typed outcomes
//! out, never raw page markup.

pub mod calendar;
pub mod cdp;
pub mod flows;
pub mod poll;
pub mod probe;
pub mod retry;
pub mod selector;
pub mod site;
pub mod tuning;
pub mod vote;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

pub use tuning::EngineTuning;
pub use worker::{ChromeSessionFactory, Engine, Session, SessionFactory, Worker};
