//! Persistence behind one repository trait per entity.
//!
//! Handlers only see `Arc<dyn CategoryRepository>` / `Arc<dyn ProductRepository>`,
//! so the PostgreSQL store and the in-memory store are interchangeable.

use async_trait::async_trait;

use crate::error::{pk_does_not_exist, AppError, AppResult, FieldErrors};
use crate::models::{Category, CategoryFields, Product, ProductFields};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by id.
    async fn list(&self) -> AppResult<Vec<Category>>;

    async fn get(&self, id: i64) -> AppResult<Category>;

    async fn insert(&self, fields: &CategoryFields) -> AppResult<Category>;

    async fn update(&self, id: i64, fields: &CategoryFields) -> AppResult<Category>;

    /// Deletes the category and every product that references it.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products ordered by id, categories expanded.
    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn get(&self, id: i64) -> AppResult<Product>;

    /// Fails with a `category_id` validation error if the category is gone.
    async fn insert(&self, fields: &ProductFields) -> AppResult<Product>;

    async fn update(&self, id: i64, fields: &ProductFields) -> AppResult<Product>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub(crate) fn category_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

pub(crate) fn product_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Product {} not found", id))
}

pub(crate) fn unknown_category(id: i64) -> AppError {
    AppError::Validation(FieldErrors::single("category_id", pk_does_not_exist(id)))
}
