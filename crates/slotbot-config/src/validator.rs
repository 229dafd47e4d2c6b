//! Configuration validation.

use url::Url;

use crate::schema::Config;

/// A single validation problem.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

/// Validation outcome: a config is usable iff `errors` is empty.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.rooms.is_empty() {
            result.push("rooms", "at least one room must be configured");
        }

        for (i, room) in config.rooms.iter().enumerate() {
            if room.key.trim().is_empty() {
                result.push(format!("rooms[{i}].key"), "room key must not be empty");
            }
            if Url::parse(&room.url).is_err() {
                result.push(format!("rooms[{i}].url"), "not a valid URL");
            }
        }

        let mut keys: Vec<&str> = config.rooms.iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        if keys.len() != config.rooms.len() {
            result.push("rooms", "room keys must be unique");
        }

        if Url::parse(&config.markers.site_url).is_err() {
            result.push("markers.site_url", "not a valid URL");
        }
        for (i, url) in config.markers.records_urls.iter().enumerate() {
            if Url::parse(url).is_err() {
                result.push(format!("markers.records_urls[{i}]"), "not a valid URL");
            }
        }

        if config.cache.services_ttl_secs == 0 {
            result.push("cache.services_ttl_secs", "TTL must be positive");
        }

        result
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
