use serde::Serialize;

use super::{Category, Price};

/// Max length of a product name.
pub const PRODUCT_NAME_MAX_LEN: usize = 200;

/// Read representation: the owning category is expanded inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Price,
    pub stock: i32,
    pub category: Category,
}

impl Product {
    /// The write-side view of this record, used as the base of a partial update.
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            category_id: self.category.id,
        }
    }
}

/// Validated writable fields of a product. The category is referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub price: Price,
    pub stock: i32,
    pub category_id: i64,
}

/// Flat row of `products JOIN categories`.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
    pub category_id: i64,
    pub category_name: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: Price::from_cents(row.price_cents),
            stock: row.stock,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
        }
    }
}
