//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.slotbot`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_empty_config_uses_defaults() {
        let config = ConfigLoader::load_str("").unwrap();
        assert!(config.browser.headless);
        assert!(config.rooms.is_empty());
        assert_eq!(config.markers.slots_container, "#timeBlocks");
    }

    #[test]
    fn load_rooms_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[rooms]]
            key = "grey"
            title = "Grey room"
            url = "https://example.net/grey"

            [cache]
            services_ttl_secs = 120
            "#
        )
        .unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.rooms.len(), 1);
        assert_eq!(config.rooms[0].key, "grey");
        assert_eq!(config.cache.services_ttl_secs, 120);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ConfigLoader::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn env_expansion_fails_on_unset_var() {
        let err =
            ConfigLoader::load_str("[browser]\nchrome_path = \"${SLOTBOT_NO_SUCH_VAR}\"\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotSet(_)));
    }
}
