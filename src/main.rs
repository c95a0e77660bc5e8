#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use product_api::{
    app,
    config::{AppConfig, load_tls_config},
    logging,
    server,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::fmt().with_target(false).init();
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(e) => {
            tracing_subscriber::fmt().with_target(false).init();
            tracing::error!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let app = match app::build(&config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to build application: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.server_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    let handle = Handle::new();

    let result = match &config.server.tls {
        Some(tls) => {
            let rustls_config = match load_tls_config(tls).await {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!("Failed to load TLS configuration: {}", e);
                    std::process::exit(1);
                }
            };

            let tls_addr: SocketAddr = match config.tls_address().parse() {
                Ok(addr) => addr,
                Err(e) => {
                    tracing::error!("Invalid TLS address {}: {}", config.tls_address(), e);
                    std::process::exit(1);
                }
            };

            tracing::info!("Starting TLS server on {}", tls_addr);
            tracing::info!("Redirecting plain HTTP on {} to HTTPS", addr);

            let plain = axum::serve(listener, app::build_https_redirect(&config))
                .with_graceful_shutdown(shutdown_signal(handle.clone()));
            let secure = axum_server::bind_rustls(tls_addr, rustls_config)
                .handle(handle)
                .serve(app.into_make_service());

            server::run_listeners(plain, secure).await
        }
        None => {
            tracing::warn!("TLS_CERT_PATH/TLS_KEY_PATH not set, serving plain HTTP only");
            tracing::info!("Starting server on {}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal(handle))
                .await
        }
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped gracefully");
}

async fn shutdown_signal(handle: Handle) {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
