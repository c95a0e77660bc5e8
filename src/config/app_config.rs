use crate::error::{AppError, Result};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(AppError::ConfigError(format!("Invalid APP_ENV value: {}", other))),
        }
    }

    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls_port: u16,
    pub tls: Option<TlsConfig>,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be tested without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = Environment::parse(&var_or("APP_ENV", "production"))?;

        let tls = match (lookup("TLS_CERT_PATH"), lookup("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::ConfigError(
                    "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host: var_or("HOST", "127.0.0.1"),
                port: var_or("PORT", "5231")
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid PORT value".to_string()))?,
                tls_port: var_or("TLS_PORT", "5232")
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid TLS_PORT value".to_string()))?,
                tls,
                max_body_size: var_or("MAX_BODY_SIZE", "1048576")
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid MAX_BODY_SIZE value".to_string()))?,
            },
            database: DatabaseConfig {
                url: lookup("DB_URL")
                    .ok_or_else(|| AppError::ConfigError("DB_URL not set".to_string()))?,
                max_connections: var_or("DB_MAX_CONNECTIONS", "10")
                    .parse()
                    .map_err(|_| {
                        AppError::ConfigError("Invalid DB_MAX_CONNECTIONS value".to_string())
                    })?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|origins| {
                        origins
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            log_dir: PathBuf::from(var_or("LOG_DIR", "logs")),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn tls_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.tls_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_db_url_is_set() {
        let config = config_from(&[("DB_URL", "postgres://localhost/products")]).unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server_address(), "127.0.0.1:5231");
        assert_eq!(config.tls_address(), "127.0.0.1:5232");
        assert!(config.server.tls.is_none());
        assert_eq!(config.database.max_connections, 10);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn missing_db_url_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = config_from(&[("DB_URL", "postgres://x"), ("PORT", "http")]).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid PORT value");
    }

    #[test]
    fn tls_requires_both_paths() {
        let err = config_from(&[("DB_URL", "postgres://x"), ("TLS_CERT_PATH", "cert.pem")])
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let config = config_from(&[
            ("DB_URL", "postgres://x"),
            ("TLS_CERT_PATH", "cert.pem"),
            ("TLS_KEY_PATH", "key.pem"),
        ])
        .unwrap();
        let tls = config.server.tls.unwrap();
        assert_eq!(tls.cert_path, PathBuf::from("cert.pem"));
        assert_eq!(tls.key_path, PathBuf::from("key.pem"));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = config_from(&[
            ("DB_URL", "postgres://x"),
            ("APP_ENV", "development"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.environment.default_log_level(), "debug");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
