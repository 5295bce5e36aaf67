use serde::Serialize;

/// Max length of a category name.
pub const CATEGORY_NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Validated writable fields of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
}
