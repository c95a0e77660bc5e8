mod health;
mod products;

use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    info(title = "product-api", description = "CRUD API over products"),
    tags(
        (name = "products", description = "Product management"),
        (name = "health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;

/// Routes together with the OpenAPI document collected from their annotations.
pub fn create_router() -> (axum::Router<AppState>, utoipa::openapi::OpenApi) {
    OpenApiRouter::<AppState>::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::health_check))
        .routes(routes!(health::readiness_check))
        .routes(routes!(products::get_products, products::create_product))
        .routes(routes!(
            products::get_product,
            products::update_product,
            products::delete_product
        ))
        .split_for_parts()
}
