use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

use catalog_core::validation::{ValidationError, ValidationErrors};

use crate::problem::ProblemResponse;

/// Record type an error or metric refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Category,
    Product,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the catalog services.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0} already exists.")]
    Duplicate(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("failed to persist {entity}: {detail}")]
    Persistence { entity: Entity, detail: String },
}

impl CatalogError {
    pub(crate) fn persistence(entity: Entity, err: impl fmt::Display) -> Self {
        Self::Persistence {
            entity,
            detail: err.to_string(),
        }
    }

    pub(crate) fn not_found(entity: Entity, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Label used for the `result` dimension of mutation metrics.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::Duplicate(_) => "duplicate",
            Self::Conflict(_) => "conflict",
            Self::NotFound { .. } => "not_found",
            Self::Persistence { .. } => "error",
        }
    }

    /// Messages safe to show next to a form.
    ///
    /// Store failures are reduced to a generic sentence; the detail only goes
    /// to the log.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.messages(),
            Self::Persistence { entity, .. } => {
                vec![format!("An error occurred while saving the {entity}.")]
            }
            other => vec![other.to_string()],
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

impl From<CatalogError> for ProblemResponse {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => {
                ProblemResponse::new(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string())
            }
            CatalogError::Duplicate(_) => {
                ProblemResponse::new(StatusCode::CONFLICT, "duplicate", err.to_string())
            }
            CatalogError::Conflict(detail) => {
                ProblemResponse::new(StatusCode::CONFLICT, "conflict", detail)
            }
            CatalogError::NotFound { .. } => {
                ProblemResponse::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            CatalogError::Persistence { entity, .. } => ProblemResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                format!("An error occurred while saving the {entity}."),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_detail_is_not_shown_to_users() {
        let err = CatalogError::persistence(Entity::Category, "disk I/O error");
        assert_eq!(
            err.user_messages(),
            vec!["An error occurred while saving the category.".to_string()]
        );
        assert!(err.to_string().contains("disk I/O error"));
    }

    #[test]
    fn duplicate_message_names_the_input() {
        let err = CatalogError::Duplicate("tools".to_string());
        assert_eq!(err.user_messages(), vec!["tools already exists.".to_string()]);
        assert_eq!(err.metric_label(), "duplicate");
    }

    #[test]
    fn validation_lists_each_field() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::EmptyProductName);
        errors.push(ValidationError::MissingCategory);
        let err = CatalogError::from(errors);
        assert_eq!(err.user_messages().len(), 2);
        assert_eq!(err.metric_label(), "invalid");
    }
}
