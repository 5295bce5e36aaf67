use anyhow::anyhow;
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::{category_not_found, product_not_found, unknown_category};
use super::{CategoryRepository, ProductRepository};
use crate::error::AppResult;
use crate::models::*;

/// In-process store with the same contract as the PostgreSQL one.
///
/// Both tables sit behind a single lock so the category check on a product
/// write and the cascade on a category delete see a consistent view.
/// `IndexMap` keeps insertion order, which is id order since ids only grow.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: IndexMap<i64, Category>,
    products: IndexMap<i64, ProductFields>,
    last_category_id: i64,
    last_product_id: i64,
}

impl Tables {
    fn expand(&self, id: i64, fields: &ProductFields) -> AppResult<Product> {
        let category = self.categories.get(&fields.category_id).ok_or_else(|| {
            anyhow!("product {} references missing category {}", id, fields.category_id)
        })?;

        Ok(Product {
            id,
            name: fields.name.clone(),
            price: fields.price,
            stock: fields.stock,
            category: category.clone(),
        })
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ── Categories ────────────────────────────────────────────────────────────────

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> AppResult<Category> {
        self.tables
            .read()
            .await
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| category_not_found(id))
    }

    async fn insert(&self, fields: &CategoryFields) -> AppResult<Category> {
        let mut tables = self.tables.write().await;
        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            name: fields.name.clone(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, fields: &CategoryFields) -> AppResult<Category> {
        let mut tables = self.tables.write().await;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| category_not_found(id))?;
        category.name = fields.name.clone();
        Ok(category.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.categories.shift_remove(&id).is_none() {
            return Err(category_not_found(id));
        }
        tables.products.retain(|_, p| p.category_id != id);
        Ok(())
    }
}

// ── Products ──────────────────────────────────────────────────────────────────

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let tables = self.tables.read().await;
        tables
            .products
            .iter()
            .map(|(id, fields)| tables.expand(*id, fields))
            .collect()
    }

    async fn get(&self, id: i64) -> AppResult<Product> {
        let tables = self.tables.read().await;
        let fields = tables.products.get(&id).ok_or_else(|| product_not_found(id))?;
        tables.expand(id, fields)
    }

    async fn insert(&self, fields: &ProductFields) -> AppResult<Product> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&fields.category_id) {
            return Err(unknown_category(fields.category_id));
        }
        tables.last_product_id += 1;
        let id = tables.last_product_id;
        tables.products.insert(id, fields.clone());
        tables.expand(id, fields)
    }

    async fn update(&self, id: i64, fields: &ProductFields) -> AppResult<Product> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Err(product_not_found(id));
        }
        if !tables.categories.contains_key(&fields.category_id) {
            return Err(unknown_category(fields.category_id));
        }
        tables.products.insert(id, fields.clone());
        tables.expand(id, fields)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.tables
            .write()
            .await
            .products
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| product_not_found(id))
    }
}
