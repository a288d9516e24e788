use std::fmt;

use thiserror::Error;

use crate::types::{CategoryInput, ProductInput};

/// Maximum number of characters accepted for a product name.
pub const PRODUCT_NAME_MAX_CHARS: usize = 100;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Category name cannot be empty.")]
    EmptyCategoryName,
    #[error("Product name is required.")]
    EmptyProductName,
    #[error("Product name must be at most {max} characters (got {len}).")]
    ProductNameTooLong { len: usize, max: usize },
    #[error("Category is required.")]
    MissingCategory,
    #[error("'{0}' is not a valid category id.")]
    InvalidCategoryId(String),
    #[error("Category {0} does not exist.")]
    UnknownCategory(i64),
    #[error("'{0}' is not a valid id.")]
    InvalidId(String),
    #[error("{field} must be a positive integer (got {value}).")]
    InvalidPaging { field: &'static str, value: i64 },
}

/// Every field error found in one submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Renders each error as the message shown next to the form.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

/// Validates a submitted category name. The name is kept as typed.
pub fn validate_category(name: Option<&str>) -> Result<CategoryInput, ValidationErrors> {
    match name {
        Some(value) if !value.trim().is_empty() => Ok(CategoryInput {
            name: value.to_string(),
        }),
        _ => Err(ValidationError::EmptyCategoryName.into()),
    }
}

/// Validates a product name and pairs it with an already parsed category id.
pub fn product_input(name: &str, category_id: i64) -> Result<ProductInput, ValidationErrors> {
    let name = check_product_name(Some(name))?;
    Ok(ProductInput { name, category_id })
}

/// Validates a submitted product form: the name and the raw category field.
///
/// Both fields are checked so the form can report every problem at once.
pub fn validate_product(
    name: Option<&str>,
    category_id: Option<&str>,
) -> Result<ProductInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = check_product_name(name).unwrap_or_else(|err| {
        errors.push(err);
        String::new()
    });

    let category_id = match category_id.map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::MissingCategory);
            0
        }
        Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
            errors.push(ValidationError::InvalidCategoryId(raw.to_string()));
            0
        }),
    };

    errors.into_result(ProductInput { name, category_id })
}

fn check_product_name(name: Option<&str>) -> Result<String, ValidationError> {
    let value = match name {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(ValidationError::EmptyProductName),
    };
    let len = value.chars().count();
    if len > PRODUCT_NAME_MAX_CHARS {
        return Err(ValidationError::ProductNameTooLong {
            len,
            max: PRODUCT_NAME_MAX_CHARS,
        });
    }
    Ok(value.to_string())
}

/// Parses a record identifier posted in a form field.
pub fn parse_id(raw: Option<&str>) -> Result<i64, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    raw.parse::<i64>()
        .map_err(|_| ValidationError::InvalidId(raw.to_string()))
}
