use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{CreateProductRequest, Product, UpdateOutcome, UpdateProductRequest},
    queries::ProductRepository,
};

/// Get all products
pub async fn get_all(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id ASC")
        .fetch_all(pool)
        .await?;

    Ok(products)
}

/// Find product by ID
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn exists(pool: &PgPool, id: i32) -> Result<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Create a new product
pub async fn create_product(pool: &PgPool, req: &CreateProductRequest) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, quantity)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.quantity.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    Ok(product)
}

/// Replace a product row. When the request carries a version, the write only
/// lands if the stored row still has that version.
pub async fn update_product(
    pool: &PgPool,
    id: i32,
    req: &UpdateProductRequest,
) -> Result<UpdateOutcome> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET name = $2,
             description = $3,
             price = $4,
             quantity = $5,
             version = version + 1,
             updated_at = NOW()
         WHERE id = $1 AND ($6::INTEGER IS NULL OR version = $6)
         RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.quantity.unwrap_or(0))
    .bind(req.version)
    .fetch_optional(pool)
    .await?;

    if let Some(product) = product {
        return Ok(UpdateOutcome::Updated(product));
    }

    // Nothing matched: either the row is gone or someone else bumped the version.
    if exists(pool, id).await? {
        Ok(UpdateOutcome::Conflict)
    } else {
        Ok(UpdateOutcome::NotFound)
    }
}

/// Delete a product
pub async fn delete_product(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self) -> Result<Vec<Product>> {
        get_all(&self.pool).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        find_by_id(&self.pool, id).await
    }

    async fn create(&self, req: CreateProductRequest) -> Result<Product> {
        create_product(&self.pool, &req).await
    }

    async fn update(&self, id: i32, req: UpdateProductRequest) -> Result<UpdateOutcome> {
        update_product(&self.pool, id, &req).await
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        delete_product(&self.pool, id).await
    }

    async fn ping(&self) -> Result<()> {
        crate::database::check_health(&self.pool).await
    }
}
