//! CLI configuration management.

use popo_cache::CacheConfig;
use popo_scraper::ScrapeConfig;
use popo_trace::TracingConfig;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Everything the `popo` binary reads from its YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("mx", "popo", "popo")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a value by dotted key, e.g. `cache.capacity` or
    /// `scrape.locators.article_body.selector`. Numbers and booleans keep
    /// their type; anything else is stored as a string.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut tree = serde_yaml::to_value(&*self).map_err(|e| e.to_string())?;
        let segments: Vec<&str> = key.split('.').collect();
        set_path(&mut tree, &segments, scalar(value)).map_err(|reason| format!("{reason}: {key}"))?;

        *self = serde_yaml::from_value(tree).map_err(|e| format!("Invalid value for {key}: {e}"))?;
        Ok(())
    }
}

fn scalar(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => parsed,
        _ => Value::String(value.to_string()),
    }
}

/// Replace the leaf at `path`. Unset sections (`null`) and empty maps accept
/// new keys; the result is validated when deserialized back.
fn set_path(node: &mut Value, path: &[&str], value: Value) -> Result<(), &'static str> {
    let Some((head, rest)) = path.split_first() else {
        return Err("Empty config key");
    };
    if node.is_null() {
        *node = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(map) = node else {
        return Err("Unknown config key");
    };

    let open = map.is_empty();
    let key = Value::String((*head).to_string());
    match map.get_mut(&key) {
        Some(child) if !rest.is_empty() => set_path(child, rest, value),
        Some(child) if child.is_mapping() => Err("Config key names a section"),
        Some(child) => {
            *child = value;
            Ok(())
        }
        None if open => {
            let mut child = Value::Null;
            if rest.is_empty() {
                child = value;
            } else {
                set_path(&mut child, rest, value)?;
            }
            map.insert(key, child);
            Ok(())
        }
        None => Err("Unknown config key"),
    }
}
