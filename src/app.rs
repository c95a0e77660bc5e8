use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderValue, Method, Uri, header},
    response::Redirect,
    Router,
};
use tower_http::{
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, HttpMakeClassifier, TraceLayer},
};
use tracing::Level;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{AppConfig, Environment},
    database,
    error::{AppError, Result},
    queries::{PgProductRepository, ProductRepository},
    routes,
};

pub const HSTS_VALUE: &str = "max-age=2592000";

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    let state = AppState::new(Arc::new(PgProductRepository::new(pool)));

    build_with_state(config, state)
}

/// Assembles the router around an existing state. Tests use this with a
/// non-Postgres repository.
pub fn build_with_state(config: &AppConfig, state: AppState) -> Result<Router> {
    let (mut app, openapi) = routes::create_router();

    if config.environment == Environment::Development {
        app = app.merge(SwaggerUi::new(routes::SWAGGER_UI_PATH).url(routes::OPENAPI_PATH, openapi));
    }

    let mut app = app.layer(DefaultBodyLimit::max(config.server.max_body_size));

    if let Some(cors) = cors_layer(config)? {
        app = app.layer(cors);
    }

    // Only the router served over TLS carries HSTS.
    if config.environment == Environment::Production && config.server.tls.is_some() {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        ));
    }

    let app = app.layer(trace_layer()).with_state(state);

    Ok(app)
}

/// Router for the plain listener when TLS is enabled: every request is sent
/// to the same path on the TLS port.
pub fn build_https_redirect(config: &AppConfig) -> Router {
    let target = HttpsRedirect {
        host: config.server.host.clone(),
        tls_port: config.server.tls_port,
    };

    Router::new()
        .fallback(redirect_to_https)
        .with_state(target)
        .layer(trace_layer())
}

fn trace_layer() -> TraceLayer<HttpMakeClassifier, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

#[derive(Debug, Clone)]
struct HttpsRedirect {
    host: String,
    tls_port: u16,
}

impl HttpsRedirect {
    /// Prefers the host the client asked for over the bind address.
    fn location(&self, host_header: Option<&str>, uri: &Uri) -> String {
        let host = host_header
            .map(strip_port)
            .filter(|host| !host.is_empty())
            .unwrap_or(self.host.as_str());
        let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        format!("https://{}:{}{}", host, self.tls_port, path)
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

async fn redirect_to_https(
    State(target): State<HttpsRedirect>,
    headers: HeaderMap,
    uri: Uri,
) -> Redirect {
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let location = target.location(host, &uri);

    tracing::debug!(%location, "Redirecting to HTTPS");

    Redirect::temporary(&location)
}

fn cors_layer(config: &AppConfig) -> Result<Option<CorsLayer>> {
    if config.cors.allowed_origins.is_empty() {
        return Ok(match config.environment {
            Environment::Development => Some(CorsLayer::permissive()),
            Environment::Production => None,
        });
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                AppError::ConfigError(format!("Invalid CORS origin: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(allowed_origins);

    Ok(Some(cors))
}
