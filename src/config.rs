use std::{fs, path::Path};

use serde::Deserialize;

use crate::Result;

/// Default number of steps a simulation may visit before giving up.
pub const DEFAULT_MAX_STEPS: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// simulator config
    pub simulator: SimulatorConfig,
    /// validator config
    pub validator: ValidatorConfig,
    /// cache config
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// hard cap on visited steps, defaults to 100
    pub max_steps: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// warn about measure nodes whose expectation always passes
    pub warn_open_specs: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// capacity of the per-node parsed spec cache
    pub spec_capacity: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            warn_open_specs: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            spec_capacity: 1024,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use crate::Config;

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        [simulator]
        max_steps = 250

        [validator]
        warn_open_specs = false

        [cache]
        spec_capacity = 64
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.simulator.max_steps, 250);
        assert!(!config.validator.warn_open_specs);
        assert_eq!(config.cache.spec_capacity, 64);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.simulator.max_steps, 100);
        assert!(config.validator.warn_open_specs);
        assert_eq!(config.cache.spec_capacity, 1024);
    }

    #[test]
    fn test_config_partial_section() {
        let config = Config::load_from_str("[simulator]\n").unwrap();
        assert_eq!(config.simulator.max_steps, 100);
    }

    #[test]
    fn test_config_invalid() {
        let result = Config::load_from_str("simulator = 3");
        assert!(result.is_err());
    }
}
