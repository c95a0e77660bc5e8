use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use http::{StatusCode, header};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductRequest, Product, UpdateOutcome, UpdateProductRequest},
};

#[utoipa::path(
    get,
    path = "/api/product",
    tag = "products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.products.list().await?;

    tracing::info!(count = products.len(), "Fetched product list");

    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/product/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = state.products.find_by_id(id).await?.ok_or_else(|| {
        tracing::warn!(product_id = id, "Product not found");
        not_found(id)
    })?;

    tracing::info!(product_id = id, "Fetched product");

    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/product",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    let product = state.products.create(payload).await?;

    tracing::info!(product_id = product.id, "Product created");

    let location = format!("/api/product/{}", product.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/product/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 204, description = "Product replaced"),
        (status = 400, description = "Id in body does not match the path"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Concurrent update conflict or internal error")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<StatusCode> {
    if id != payload.id {
        tracing::warn!(
            product_id = id,
            body_id = payload.id,
            "Product id in body does not match path"
        );
        return Err(AppError::BadRequest(format!(
            "Invalid id in request: expected {}, received {}",
            id, payload.id
        )));
    }

    match state.products.update(id, payload).await? {
        UpdateOutcome::Updated(product) => {
            tracing::info!(product_id = id, version = product.version, "Product updated");
            Ok(StatusCode::NO_CONTENT)
        }
        UpdateOutcome::NotFound => {
            tracing::warn!(product_id = id, "Product not found on update");
            Err(not_found(id))
        }
        UpdateOutcome::Conflict => Err(AppError::ConcurrencyConflict(id)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/product/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if !state.products.delete(id).await? {
        tracing::warn!(product_id = id, "Product not found on delete");
        return Err(not_found(id));
    }

    tracing::info!(product_id = id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Product with id {} not found", id))
}
