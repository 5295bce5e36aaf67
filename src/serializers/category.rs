use serde_json::Value;

use super::Input;
use crate::error::AppResult;
use crate::models::{Category, CategoryFields, CATEGORY_NAME_MAX_LEN};

/// Full write (create / PUT): `{"name"}` is required. `id` is ignored.
pub fn validate_category(body: &Value) -> AppResult<CategoryFields> {
    let mut input = Input::new(body, false)?;
    let name = input.text("name", CATEGORY_NAME_MAX_LEN);
    input.finish()?;

    Ok(CategoryFields {
        name: name.unwrap_or_default(),
    })
}

/// Partial write (PATCH) on top of `existing`.
pub fn validate_category_patch(body: &Value, existing: &Category) -> AppResult<CategoryFields> {
    let mut input = Input::new(body, true)?;
    let name = input.text("name", CATEGORY_NAME_MAX_LEN);
    input.finish()?;

    Ok(CategoryFields {
        name: name.unwrap_or_else(|| existing.name.clone()),
    })
}
