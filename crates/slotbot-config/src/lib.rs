//! # Slotbot Config
//!
//! TOML configuration for the booking engine: rooms, browser settings,
//! cache tuning and the site marker catalog.
//!
//! Site markers deserve a note: every selector, attribute, URL candidate
//! and visible-text pattern the engine matches against the remote site is
//! data in [`SiteMarkers`], not code. The remote markup is a versioned
//! external contract that can silently change; when it does, the fix is a
//! config edit (or a defaults bump here), never a code change outside the
//! DOM probe layer.

pub mod error;
pub mod loader;
pub mod markers;
pub mod schema;
pub mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use markers::SiteMarkers;
pub use schema::{BrowserConfig, CacheConfig, Config};
pub use validator::ConfigValidator;
