//! JSON input validation.
//!
//! Request bodies are read as raw `serde_json::Value` so that every invalid
//! field can be reported at once, keyed by field name, instead of failing on
//! the first serde error.

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{Price, PriceError};

mod category;
mod product;

pub use category::{validate_category, validate_category_patch};
pub use product::{validate_product, validate_product_patch};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";

/// Name of a JSON value's type as reported in error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Integer text, allowing a trailing `.0` (`"5.0"`, `"5."`).
fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let digits = match s.split_once('.') {
        Some((int, zeros)) if zeros.bytes().all(|b| b == b'0') => int,
        Some(_) => return None,
        None => s,
    };
    digits.parse().ok()
}

/// Field-by-field reader over a JSON object that collects errors as it goes.
///
/// In partial mode a missing field is simply skipped; otherwise it is an
/// error. Each accessor returns `None` when the field is absent or invalid.
pub struct Input<'a> {
    data: &'a Map<String, Value>,
    partial: bool,
    errors: FieldErrors,
}

impl<'a> Input<'a> {
    pub fn new(body: &'a Value, partial: bool) -> AppResult<Self> {
        match body {
            Value::Object(data) => Ok(Self {
                data,
                partial,
                errors: FieldErrors::new(),
            }),
            other => Err(AppError::Validation(FieldErrors::single(
                "non_field_errors",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(other)
                ),
            ))),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    fn value(&mut self, field: &str) -> Option<&'a Value> {
        let data: &'a Map<String, Value> = self.data;
        match data.get(field) {
            None => {
                if !self.partial {
                    self.error(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.error(field, NOT_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Trimmed, non-blank text of at most `max_len` characters.
    pub fn text(&mut self, field: &str, max_len: usize) -> Option<String> {
        let text = match self.value(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.error(field, NOT_A_STRING);
                return None;
            }
        };

        if text.is_empty() {
            self.error(field, NOT_BLANK);
            return None;
        }
        if text.chars().count() > max_len {
            self.error(
                field,
                format!("Ensure this field has no more than {} characters.", max_len),
            );
            return None;
        }
        Some(text)
    }

    /// Integer in `min..=max`, given as a JSON integer, an integral float or
    /// a numeric string.
    pub fn integer(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        let parsed = match self.value(field)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => parse_integer(s),
            _ => None,
        };

        let Some(number) = parsed else {
            self.error(field, NOT_AN_INTEGER);
            return None;
        };
        if number < min {
            self.error(field, format!("Ensure this value is greater than or equal to {}.", min));
            return None;
        }
        if number > max {
            self.error(field, format!("Ensure this value is less than or equal to {}.", max));
            return None;
        }
        Some(number)
    }

    /// Non-negative price, given as a JSON number or a decimal string.
    pub fn price(&mut self, field: &str) -> Option<Price> {
        let parsed = match self.value(field)? {
            Value::Number(n) => Price::parse(&n.to_string()),
            Value::String(s) => Price::parse(s),
            _ => Err(PriceError::Invalid),
        };

        match parsed {
            Ok(price) if price.is_negative() => {
                self.error(field, "Ensure this value is greater than or equal to 0.");
                None
            }
            Ok(price) => Some(price),
            Err(err) => {
                self.error(field, err.message());
                None
            }
        }
    }

    /// Primary key of a related record. Existence is checked by the caller.
    pub fn primary_key(&mut self, field: &str) -> Option<i64> {
        let value = self.value(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        if parsed.is_none() {
            self.error(
                field,
                format!("Incorrect type. Expected pk value, received {}.", type_name(value)),
            );
        }
        parsed
    }

    /// `Err(Validation)` if any field failed.
    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
