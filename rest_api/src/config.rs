// rest_api/src/config.rs

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

pub const DEFAULT_REST_API_PORT: u16 = 8082;
pub const DEFAULT_REST_API_HOST: &str = "127.0.0.1";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    /// Start with the demo fixtures instead of an empty store.
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        RestApiConfig {
            host: DEFAULT_REST_API_HOST.to_string(),
            port: DEFAULT_REST_API_PORT,
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

fn default_seed_demo_data() -> bool {
    true
}

// Wrapper struct to match the 'rest_api:' key in the YAML config.
#[derive(Debug, Deserialize)]
struct RestApiConfigWrapper {
    rest_api: RestApiConfig,
}

/// Loads the REST API configuration from `rest_api_config.yaml` (or the given
/// path). Falls back to defaults when no config file is present.
pub fn load_rest_api_config(config_file_path: Option<PathBuf>) -> Result<RestApiConfig> {
    let path_to_use = config_file_path.unwrap_or_else(|| PathBuf::from("rest_api_config.yaml"));

    if !path_to_use.exists() {
        return Ok(RestApiConfig::default());
    }

    let config_content = fs::read_to_string(&path_to_use)
        .map_err(|e| anyhow::anyhow!("Failed to read REST API config file {}: {}", path_to_use.display(), e))?;

    let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(&config_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse REST API config file {}: {}", path_to_use.display(), e))?;

    Ok(wrapper.rest_api)
}

#[cfg(test)]
mod tests {
    use super::{load_rest_api_config, RestApiConfigWrapper, DEFAULT_REST_API_PORT};
    use std::path::PathBuf;

    #[test]
    fn should_fall_back_to_defaults_when_file_is_missing() {
        let config = load_rest_api_config(Some(PathBuf::from("/nonexistent/config.yaml"))).unwrap();
        assert_eq!(config.port, DEFAULT_REST_API_PORT);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.seed_demo_data);
    }

    #[test]
    fn should_parse_the_rest_api_section() {
        let yaml = "rest_api:\n  host: 0.0.0.0\n  port: 9090\n  seed_demo_data: false\n";
        let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(yaml).unwrap();
        assert_eq!(wrapper.rest_api.host, "0.0.0.0");
        assert_eq!(wrapper.rest_api.port, 9090);
        assert!(!wrapper.rest_api.seed_demo_data);
    }

    #[test]
    fn should_default_seed_flag_when_absent() {
        let yaml = "rest_api:\n  host: 127.0.0.1\n  port: 8082\n";
        let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(yaml).unwrap();
        assert!(wrapper.rest_api.seed_demo_data);
    }
}
