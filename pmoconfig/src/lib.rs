//! # PMOIgd Configuration Module
//!
//! This module provides configuration management for the IGD client, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let timeout = config.get_ssdp_timeout_secs()?;
//!
//! // Update configuration values
//! config.set_http_timeout_secs(5)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmoigd.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMOIgd configuration"));
}

const ENV_CONFIG_DIR: &str = "PMOIGD_CONFIG";
const ENV_PREFIX: &str = "PMOIGD_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmoigd";

// Default values for configuration
const DEFAULT_SSDP_TIMEOUT_SECS: u64 = 4;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DESCRIPTION_PREFIX: &str = "pmoigd";

/// Macro to generate getter/setter for u64 values with default
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u64> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().unwrap_or($default)),
                Ok(Value::String(s)) => Ok(s.trim().parse::<u64>().unwrap_or_else(|_| {
                    tracing::warn!(
                        "Invalid value '{}' for {}, using default {}",
                        s,
                        $path.join("."),
                        $default
                    );
                    $default
                })),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            let n = Number::from(value);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Configuration manager for PMOIgd
///
/// This structure manages the client configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        CONFIG_DIR_NAME.to_string()
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOIGD_CONFIG` environment variable
    /// 3. `.pmoigd` in the current directory
    /// 4. `.pmoigd` in the user's home directory
    ///
    /// Nothing is written to disk until a setter or [`Config::save`] is called.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let external = match fs::read(&path) {
            Ok(data) => {
                info!(config_file=%path, "Loaded config file");
                Some(serde_yaml::from_slice::<Value>(&data)?)
            }
            Err(_) => {
                info!(config_file=%path, "Config file not found, using default embedded config");
                None
            }
        };

        let data = Self::build_value(external.as_ref())?;

        Ok(Config {
            config_dir,
            path,
            data: Mutex::new(data),
        })
    }

    /// Builds an in-memory configuration from a YAML document
    ///
    /// The document is merged over the embedded defaults and environment
    /// overrides are applied, exactly as for [`Config::load_config`].
    /// [`Config::save`] is a no-op on such a configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let external: Value = serde_yaml::from_str(yaml)?;
        let data = Self::build_value(Some(&external))?;

        Ok(Config {
            config_dir: String::new(),
            path: String::new(),
            data: Mutex::new(data),
        })
    }

    fn build_value(external: Option<&Value>) -> Result<Value> {
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        // un config.yaml vide se lit comme Null
        if let Some(external) = external.filter(|v| !v.is_null()) {
            merge_yaml(&mut default_value, &Self::lower_keys_value(external.clone()));
        }
        let mut config_value = Self::lower_keys_value(default_value);
        Self::apply_env_overrides(&mut config_value);
        Ok(config_value)
    }

    /// Directory the configuration was loaded from (empty for in-memory configs)
    pub fn config_dir(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        if !self.config_dir.is_empty() {
            fs::create_dir_all(&self.config_dir)?;
        }
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["igd", "http", "timeout_secs"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        let new_val = Self::lower_keys_value(v);
                        new_map.insert(new_key, new_val);
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_u64_config!(
        get_ssdp_timeout_secs,
        set_ssdp_timeout_secs,
        &["igd", "ssdp", "timeout_secs"],
        DEFAULT_SSDP_TIMEOUT_SECS
    );

    impl_u64_config!(
        get_http_timeout_secs,
        set_http_timeout_secs,
        &["igd", "http", "timeout_secs"],
        DEFAULT_HTTP_TIMEOUT_SECS
    );

    /// Préfixe des descriptions de redirections créées par ce client
    pub fn get_description_prefix(&self) -> Result<String> {
        match self.get_value(&["igd", "mapping", "description_prefix"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
            _ => Ok(DEFAULT_DESCRIPTION_PREFIX.to_string()),
        }
    }

    pub fn set_description_prefix(&self, prefix: String) -> Result<()> {
        self.set_value(
            &["igd", "mapping", "description_prefix"],
            Value::String(prefix),
        )
    }
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access.
///
/// # Examples
///
/// ```no_run
/// use pmoconfig::get_config;
///
/// let config = get_config();
/// let timeout = config.get_http_timeout_secs();
/// ```
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// This function recursively merges two YAML value trees:
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}
