//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use slotbot_protocols::Room;

use crate::markers::SiteMarkers;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub rooms: Vec<Room>,

    #[serde(default)]
    pub markers: SiteMarkers,
}

impl Config {
    pub fn room_by_key(&self, key: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.key == key)
    }
}

/// Browser/session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome binary; auto-detected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Root under which per-user profile directories are created.
    /// Defaults to `~/.slotbot/profiles`.
    #[serde(default)]
    pub profiles_root: Option<PathBuf>,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Skip image loading; the site renders fine without and pages settle
    /// noticeably faster.
    #[serde(default = "default_block_images")]
    pub block_images: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_path: None,
            profiles_root: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            block_images: default_block_images(),
        }
    }
}

impl BrowserConfig {
    /// Resolve the profiles root, falling back to `~/.slotbot/profiles`.
    pub fn profiles_root(&self) -> PathBuf {
        self.profiles_root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".slotbot")
                .join("profiles")
        })
    }
}

/// Service catalog cache tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_services_ttl_secs")]
    pub services_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            services_ttl_secs: default_services_ttl_secs(),
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1400
}

fn default_window_height() -> u32 {
    1000
}

fn default_block_images() -> bool {
    true
}

fn default_services_ttl_secs() -> u64 {
    600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.browser.headless);
        assert_eq!(config.cache.services_ttl_secs, 600);
        assert!(config.rooms.is_empty());
        assert!(config.browser.profiles_root().ends_with("profiles"));
    }

    #[test]
    fn room_lookup_by_key() {
        let mut config = Config::default();
        config.rooms.push(Room {
            key: "grey".into(),
            title: "Grey room".into(),
            url: "https://example.net/grey".into(),
        });
        assert!(config.room_by_key("grey").is_some());
        assert!(config.room_by_key("pink").is_none());
    }
}
