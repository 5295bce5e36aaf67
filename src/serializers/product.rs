use anyhow::anyhow;
use serde_json::Value;

use super::Input;
use crate::db::CategoryRepository;
use crate::error::{pk_does_not_exist, AppError, AppResult};
use crate::models::{Price, Product, ProductFields, PRODUCT_NAME_MAX_LEN};

/// The writable fields present in a product body, each already validated.
#[derive(Debug)]
struct ProductInput {
    name: Option<String>,
    price: Option<Price>,
    stock: Option<i32>,
    category_id: Option<i64>,
}

/// Reads `{"name", "price", "stock", "category_id"}`. The read-only
/// `category` object and `id` are ignored if sent. `category_id` must name
/// an existing category.
async fn read_product(
    body: &Value,
    partial: bool,
    categories: &dyn CategoryRepository,
) -> AppResult<ProductInput> {
    let mut input = Input::new(body, partial)?;

    let name = input.text("name", PRODUCT_NAME_MAX_LEN);
    let price = input.price("price");
    let stock = input
        .integer("stock", 0, i64::from(i32::MAX))
        .and_then(|n| i32::try_from(n).ok());

    let category_id = match input.primary_key("category_id") {
        Some(id) => match categories.get(id).await {
            Ok(category) => Some(category.id),
            Err(AppError::NotFound(_)) => {
                input.error("category_id", pk_does_not_exist(id));
                None
            }
            Err(err) => return Err(err),
        },
        None => None,
    };

    input.finish()?;

    Ok(ProductInput {
        name,
        price,
        stock,
        category_id,
    })
}

/// Full write (create / PUT): every writable field is required.
pub async fn validate_product(
    body: &Value,
    categories: &dyn CategoryRepository,
) -> AppResult<ProductFields> {
    match read_product(body, false, categories).await? {
        ProductInput {
            name: Some(name),
            price: Some(price),
            stock: Some(stock),
            category_id: Some(category_id),
        } => Ok(ProductFields {
            name,
            price,
            stock,
            category_id,
        }),
        incomplete => {
            Err(anyhow!("incomplete product input passed validation: {:?}", incomplete).into())
        }
    }
}

/// Partial write (PATCH): fields not sent keep their stored values.
pub async fn validate_product_patch(
    body: &Value,
    categories: &dyn CategoryRepository,
    existing: &Product,
) -> AppResult<ProductFields> {
    let input = read_product(body, true, categories).await?;
    let base = existing.fields();

    Ok(ProductFields {
        name: input.name.unwrap_or(base.name),
        price: input.price.unwrap_or(base.price),
        stock: input.stock.unwrap_or(base.stock),
        category_id: input.category_id.unwrap_or(base.category_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, ProductRepository};
    use crate::error::FieldErrors;
    use crate::models::CategoryFields;
    use serde_json::json;

    async fn store_with_tools() -> MemoryStore {
        let store = MemoryStore::new();
        CategoryRepository::insert(
            &store,
            &CategoryFields {
                name: "Tools".to_string(),
            },
        )
        .await
        .unwrap();
        store
    }

    fn validation_errors(result: AppResult<ProductFields>) -> FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn accepts_a_complete_payload() {
        let store = store_with_tools().await;
        let body = json!({ "name": "Widget", "price": "9.99", "stock": 5, "category_id": 1 });
        let fields = validate_product(&body, &store).await.unwrap();
        assert_eq!(
            fields,
            ProductFields {
                name: "Widget".to_string(),
                price: Price::from_cents(999),
                stock: 5,
                category_id: 1,
            }
        );
    }

    #[tokio::test]
    async fn unknown_category_is_a_field_error() {
        let store = store_with_tools().await;
        let body = json!({ "name": "Widget", "price": "9.99", "stock": 5, "category_id": 999 });
        let errors = validation_errors(validate_product(&body, &store).await);
        assert_eq!(
            errors.get("category_id").unwrap(),
            ["Invalid pk \"999\" - object does not exist."]
        );
    }

    #[tokio::test]
    async fn nested_category_is_not_writable() {
        let store = store_with_tools().await;
        let body = json!({
            "name": "Widget",
            "price": "9.99",
            "stock": 5,
            "category": { "id": 1, "name": "Tools" },
        });
        let errors = validation_errors(validate_product(&body, &store).await);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["category_id"]);
        assert_eq!(errors.get("category_id").unwrap(), ["This field is required."]);
    }

    #[tokio::test]
    async fn reports_every_invalid_field() {
        let store = store_with_tools().await;
        let body = json!({ "name": "", "price": "abc", "stock": -3, "category_id": "x" });
        let errors = validation_errors(validate_product(&body, &store).await);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["category_id", "name", "price", "stock"]
        );
    }

    #[tokio::test]
    async fn stock_must_fit_in_i32() {
        let store = store_with_tools().await;
        let body = json!({ "name": "W", "price": 1, "stock": 3_000_000_000i64, "category_id": 1 });
        let errors = validation_errors(validate_product(&body, &store).await);
        assert_eq!(
            errors.get("stock").unwrap(),
            ["Ensure this value is less than or equal to 2147483647."]
        );
    }

    #[tokio::test]
    async fn patch_merges_onto_existing_record() {
        let store = store_with_tools().await;
        let existing = ProductRepository::insert(
            &store,
            &ProductFields {
                name: "Widget".to_string(),
                price: Price::from_cents(999),
                stock: 5,
                category_id: 1,
            },
        )
        .await
        .unwrap();

        let fields = validate_product_patch(&json!({ "stock": 12 }), &store, &existing)
            .await
            .unwrap();
        assert_eq!(fields.stock, 12);
        assert_eq!(fields.name, "Widget");
        assert_eq!(fields.price, Price::from_cents(999));
        assert_eq!(fields.category_id, 1);
    }

    #[tokio::test]
    async fn patch_still_checks_category() {
        let store = store_with_tools().await;
        let existing = ProductRepository::insert(
            &store,
            &ProductFields {
                name: "Widget".to_string(),
                price: Price::from_cents(999),
                stock: 5,
                category_id: 1,
            },
        )
        .await
        .unwrap();

        let result = validate_product_patch(&json!({ "category_id": 2 }), &store, &existing).await;
        assert!(validation_errors(result).get("category_id").is_some());
    }
}
