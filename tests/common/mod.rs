//! Shared helpers for the HTTP-level tests.
#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::Utc;
use tower::ServiceExt;

use product_api::{
    AppConfig, AppError, AppState, Result, app,
    models::{CreateProductRequest, Product, UpdateOutcome, UpdateProductRequest},
    queries::ProductRepository,
};

#[derive(Default)]
struct Rows {
    next_id: i32,
    products: BTreeMap<i32, Product>,
}

/// Keeps products in memory and applies the same version rule as the
/// Postgres repository.
#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<Rows>,
    failing: AtomicBool,
}

impl InMemoryProductRepository {
    /// Makes every following call fail like a lost database connection.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Simulates another writer updating the row.
    pub fn touch(&self, id: i32) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(product) = rows.products.get_mut(&id) {
            product.version += 1;
            product.updated_at = Utc::now();
        }
    }

    /// Simulates another writer deleting the row.
    pub fn remove(&self, id: i32) {
        self.rows.lock().unwrap().products.remove(&id);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().products.get(&id).cloned())
    }

    async fn create(&self, req: CreateProductRequest) -> Result<Product> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        rows.next_id += 1;
        let now = Utc::now();
        let product = Product {
            id: rows.next_id,
            name: req.name,
            description: req.description,
            price: req.price,
            quantity: req.quantity.unwrap_or(0),
            version: 1,
            created_at: now,
            updated_at: now,
        };
        rows.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i32, req: UpdateProductRequest) -> Result<UpdateOutcome> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(product) = rows.products.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if req.version.is_some_and(|version| version != product.version) {
            return Ok(UpdateOutcome::Conflict);
        }

        product.name = req.name;
        product.description = req.description;
        product.price = req.price;
        product.quantity = req.quantity.unwrap_or(0);
        product.version += 1;
        product.updated_at = Utc::now();

        Ok(UpdateOutcome::Updated(product.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        self.check()?;
        Ok(self.rows.lock().unwrap().products.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

pub fn test_config(vars: &[(&str, &str)]) -> AppConfig {
    AppConfig::from_lookup(|key| {
        if key == "DB_URL" {
            return Some("postgres://unused".to_string());
        }
        vars.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    })
    .unwrap()
}

pub fn test_app() -> (Router, Arc<InMemoryProductRepository>) {
    test_app_with(&[])
}

pub fn test_app_with(vars: &[(&str, &str)]) -> (Router, Arc<InMemoryProductRepository>) {
    let repo = Arc::new(InMemoryProductRepository::default());
    let config = test_config(vars);

    let router = app::build_with_state(&config, AppState::new(repo.clone())).unwrap();
    (router, repo)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

pub async fn api_call(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
        None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();

    let status = resp.status();
    let headers = resp.headers().clone();
    let location = headers
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    TestResponse {
        status,
        location,
        headers,
        body,
    }
}
