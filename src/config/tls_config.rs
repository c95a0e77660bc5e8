use axum_server::tls_rustls::RustlsConfig;

use crate::{
    config::TlsConfig,
    error::{AppError, Result},
};

pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig> {
    if !config.cert_path.exists() {
        return Err(AppError::ConfigError(format!(
            "Certificate file not found: {}",
            config.cert_path.display()
        )));
    }

    if !config.key_path.exists() {
        return Err(AppError::ConfigError(format!(
            "Private key file not found: {}",
            config.key_path.display()
        )));
    }

    let rustls_config = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| AppError::ConfigError(format!("Failed to load TLS certificate: {}", e)))?;

    tracing::info!("TLS certificate loaded from {}", config.cert_path.display());

    Ok(rustls_config)
}
