use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const ENV_PREFIX: &str = "GAMEME";

/// Which `ContentStore` plugin backs the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Rest,
    Sqlite,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    host: String,
    port: u16,
    workers: usize,
    backend: Backend,
    store_url: String,
    store_key: String,
    giphy_key: Option<String>,
    sqlite_url: String,
}

#[derive(Debug)]
pub struct Settings {
    // HTTP server
    pub host: String,
    pub port: u16,
    pub workers: usize,

    // Hosted store (REST backend)
    pub backend: Backend,
    pub store_url: String,
    pub store_key: SecretString,

    /// GIF search is disabled when unset
    pub giphy_key: Option<SecretString>,

    pub sqlite_url: String,
}

impl Settings {
    /// Defaults overlaid with `GAMEME__*` variables (e.g. `GAMEME__STORE_URL`).
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
    }

    fn load(env: config::Environment) -> Result<Self, config::ConfigError> {
        let raw: RawSettings = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            // One worker keeps a single feed collection per process
            .set_default("workers", 1)?
            .set_default("backend", "rest")?
            .set_default("store_url", "")?
            .set_default("store_key", "")?
            .set_default("sqlite_url", "sqlite:gameme.db")?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Ok(Self {
            host: raw.host,
            port: raw.port,
            workers: raw.workers,
            backend: raw.backend,
            store_url: raw.store_url,
            store_key: SecretString::from(raw.store_key),
            giphy_key: raw
                .giphy_key
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from),
            sqlite_url: raw.sqlite_url,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("HTTP port must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(anyhow!("Worker count must be at least 1"));
        }

        match self.backend {
            Backend::Rest if self.store_url.trim().is_empty() => {
                Err(anyhow!("Store URL is required for the REST backend"))
            }
            Backend::Rest if self.store_key.expose_secret().is_empty() => {
                Err(anyhow!("Store key is required for the REST backend"))
            }
            Backend::Sqlite if self.sqlite_url.trim().is_empty() => {
                Err(anyhow!("SQLite URL is required for the SQLite backend"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Settings {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        Settings::load(Settings::environment().source(Some(map))).unwrap()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let settings = load(&[]);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.workers, 1);
        assert_eq!(settings.backend, Backend::Rest);
        assert!(settings.giphy_key.is_none());
        // No store URL yet
        assert!(settings.validate().is_err());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = load(&[
            ("GAMEME__PORT", "9000"),
            ("GAMEME__STORE_URL", "https://project.example.co"),
            ("GAMEME__STORE_KEY", "anon-key"),
            ("GAMEME__GIPHY_KEY", "gif-key"),
        ]);

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.store_url, "https://project.example.co");
        assert_eq!(settings.store_key.expose_secret(), "anon-key");
        assert!(settings.giphy_key.is_some());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn blank_giphy_key_disables_search() {
        let settings = load(&[("GAMEME__GIPHY_KEY", "  ")]);
        assert!(settings.giphy_key.is_none());
    }

    #[test]
    fn sqlite_backend_needs_no_store_url() {
        let mut settings = load(&[("GAMEME__BACKEND", "sqlite")]);
        assert_eq!(settings.backend, Backend::Sqlite);
        assert!(settings.validate().is_ok());

        settings.workers = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn port_zero_is_rejected() {
        let mut settings = load(&[("GAMEME__BACKEND", "sqlite")]);
        settings.port = 0;
        assert!(settings.validate().is_err());
    }
}
