mod app_config;
mod tls_config;

pub use app_config::{
    AppConfig, CorsConfig, DatabaseConfig, Environment, ServerConfig, TlsConfig,
};
pub use tls_config::load_tls_config;
