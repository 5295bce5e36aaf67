use async_trait::async_trait;
use sqlx::PgPool;

use super::{category_not_found, product_not_found, unknown_category};
use super::{CategoryRepository, ProductRepository};
use crate::error::{AppError, AppResult};
use crate::models::*;

/// PostgreSQL-backed store. Referential integrity is left to the schema's
/// foreign key; a violation surfaces as a `category_id` validation error.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(category_id: i64) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return unknown_category(category_id);
            }
        }
        AppError::Database(err)
    }
}

// ── Categories ────────────────────────────────────────────────────────────────

#[async_trait]
impl CategoryRepository for PgStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn get(&self, id: i64) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| category_not_found(id))
    }

    async fn insert(&self, fields: &CategoryFields) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&fields.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update(&self, id: i64, fields: &CategoryFields) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&fields.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| category_not_found(id))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        // products.category_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(category_not_found(id));
        }
        Ok(())
    }
}

// ── Products ──────────────────────────────────────────────────────────────────

#[async_trait]
impl ProductRepository for PgStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.name, p.price_cents, p.stock, p.category_id, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.name, p.price_cents, p.stock, p.category_id, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Product::from)
        .ok_or_else(|| product_not_found(id))
    }

    async fn insert(&self, fields: &ProductFields) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            WITH p AS (
                INSERT INTO products (name, price_cents, stock, category_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, price_cents, stock, category_id
            )
            SELECT p.id, p.name, p.price_cents, p.stock, p.category_id, c.name AS category_name
            FROM p
            JOIN categories c ON c.id = p.category_id
            "#,
        )
        .bind(&fields.name)
        .bind(fields.price.cents())
        .bind(fields.stock)
        .bind(fields.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error(fields.category_id))?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, fields: &ProductFields) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(
            r#"
            WITH p AS (
                UPDATE products
                SET name        = $1,
                    price_cents = $2,
                    stock       = $3,
                    category_id = $4
                WHERE id = $5
                RETURNING id, name, price_cents, stock, category_id
            )
            SELECT p.id, p.name, p.price_cents, p.stock, p.category_id, c.name AS category_name
            FROM p
            JOIN categories c ON c.id = p.category_id
            "#,
        )
        .bind(&fields.name)
        .bind(fields.price.cents())
        .bind(fields.stock)
        .bind(fields.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error(fields.category_id))?
        .map(Product::from)
        .ok_or_else(|| product_not_found(id))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(product_not_found(id));
        }
        Ok(())
    }
}
