use anyhow::{bail, Context};
use serde::Deserialize;

use crate::cache::{MAX_CACHE_SIZE, MAX_OBJECT_SIZE};

/// Path of an optional YAML config file.
pub const CONFIG_ENV: &str = "PROXY_CONFIG";
/// Listening port override.
pub const PORT_ENV: &str = "PROXY_PORT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Aggregate byte budget of the object cache.
    pub max_cache_size: usize,
    /// Largest response captured for caching.
    pub max_object_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size: MAX_CACHE_SIZE,
            max_object_size: MAX_OBJECT_SIZE,
        }
    }
}

impl Config {
    /// Loads the YAML file named by `PROXY_CONFIG`, if any, then applies the
    /// port override: the first command-line argument, else `PROXY_PORT`.
    pub fn load() -> anyhow::Result<Self> {
        let yaml = match std::env::var(CONFIG_ENV) {
            Ok(path) => Some(
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path))?,
            ),
            Err(_) => None,
        };
        let port = resolve_port(std::env::args().skip(1), std::env::var(PORT_ENV).ok());

        Self::from_sources(yaml.as_deref(), port.as_deref())
    }

    pub fn from_sources(yaml: Option<&str>, port: Option<&str>) -> anyhow::Result<Self> {
        let mut cfg: Config = match yaml {
            Some(text) => serde_yaml::from_str(text).context("Invalid config file")?,
            None => Config::default(),
        };

        if let Some(port) = port {
            cfg.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid port: {:?}", port))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.listen_host, self.server.port)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.cache.max_object_size == 0 {
            bail!("cache.max_object_size must be greater than zero");
        }
        if self.cache.max_object_size > self.cache.max_cache_size {
            bail!(
                "cache.max_object_size ({}) exceeds cache.max_cache_size ({})",
                self.cache.max_object_size,
                self.cache.max_cache_size
            );
        }
        Ok(())
    }
}

/// Picks the port override. A positional argument (`relaycache 3128`) beats
/// the environment variable.
pub fn resolve_port<I>(mut args: I, env: Option<String>) -> Option<String>
where
    I: Iterator<Item = String>,
{
    args.next().or(env)
}
