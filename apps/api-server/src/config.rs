//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use divulge_core::domain::DEFAULT_CONTENT_EXTENSION;
use divulge_infra::database::DatabaseConfig;

/// Where post bodies are stored.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub root: PathBuf,
    pub extension: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub content: ContentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup("DATABASE_URL").map(|url| {
            let mut db = DatabaseConfig::new(url);
            if let Some(max) = parsed(&lookup, "DB_MAX_CONNECTIONS") {
                db.max_connections = max;
            }
            if let Some(min) = parsed(&lookup, "DB_MIN_CONNECTIONS") {
                db.min_connections = min;
            }
            db
        });

        let content = ContentConfig {
            root: lookup("CONTENT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./content")),
            extension: lookup("CONTENT_EXTENSION")
                .map(|ext| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_EXTENSION.to_string()),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed(&lookup, "PORT").unwrap_or(8080),
            database,
            content,
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.database.is_none());
        assert_eq!(config.content.root, PathBuf::from("./content"));
        assert_eq!(config.content.extension, "md");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/divulge"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("CONTENT_ROOT", "/var/lib/divulge"),
            ("CONTENT_EXTENSION", ".txt"),
        ]);
        assert_eq!(config.port, 9000);
        let db = config.database.unwrap();
        assert_eq!(db.url, "postgres://localhost/divulge");
        assert_eq!(db.max_connections, 20);
        assert_eq!(db.min_connections, 10);
        assert_eq!(config.content.root, PathBuf::from("/var/lib/divulge"));
        assert_eq!(config.content.extension, "txt");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        assert_eq!(config_from(&[("PORT", "not-a-port")]).port, 8080);
    }
}
