//! Server configuration read from the environment.

use std::path::PathBuf;

use civic_map_database::db::DEFAULT_DATABASE_URL;

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `PostGIS` connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Interface to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Directory served at `/uploads` (`UPLOAD_DIR`).
    pub upload_dir: PathBuf,
    /// Built frontend served at `/` (`STATIC_DIR`).
    pub static_dir: PathBuf,
    /// Bearer token accepted for write requests (`API_TOKEN`). Writes are
    /// rejected when unset.
    pub api_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            upload_dir: PathBuf::from("data/uploads"),
            static_dir: PathBuf::from("app/dist"),
            api_token: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup, falling
    /// back to defaults for missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT value {value:?}");
                defaults.port
            }),
            None => defaults.port,
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            upload_dir: lookup("UPLOAD_DIR").map_or(defaults.upload_dir, PathBuf::from),
            static_dir: lookup("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            api_token: lookup("API_TOKEN").filter(|token| !token.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 8080);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let vars: BTreeMap<&str, &str> = [
            ("PORT", "9090"),
            ("BIND_ADDR", "0.0.0.0"),
            ("UPLOAD_DIR", "/srv/uploads"),
            ("API_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::from_lookup(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.port, 9090);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.static_dir, PathBuf::from("app/dist"));
    }

    #[test]
    fn invalid_port_and_empty_token_fall_back() {
        let config = ServerConfig::from_lookup(|key| match key {
            "PORT" => Some("not-a-port".to_string()),
            "API_TOKEN" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.port, 8080);
        assert!(config.api_token.is_none());
    }
}
