pub mod product_queries;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{CreateProductRequest, Product, UpdateOutcome, UpdateProductRequest},
};

pub use product_queries::PgProductRepository;

/// Storage behind the product routes.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>>;

    async fn create(&self, req: CreateProductRequest) -> Result<Product>;

    /// Replaces the row with `id`. Reports `NotFound` when the row is gone and
    /// `Conflict` when it exists but did not accept the write.
    async fn update(&self, id: i32, req: UpdateProductRequest) -> Result<UpdateOutcome>;

    async fn delete(&self, id: i32) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}
