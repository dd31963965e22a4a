use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User-facing validation messages, shared between services and tests.
pub mod messages {
    pub const NAME_REQUIRED: &str = "Name is required.";
    pub const STATUS_REQUIRED: &str = "Status is required.";
    pub const STATUS_INVALID: &str = "Status must be 1 (active) or 2 (inactive).";
    pub const CITY_ID_REQUIRED: &str = "City id is required.";
    pub const CITY_ID_INVALID: &str = "No city exists with the given id.";
    pub const CITY_IN_USE: &str = "City still has areas assigned to it.";
    pub const AREA_ID_INVALID: &str = "No area exists with the given id.";
    pub const IMAGE_REQUIRED: &str = "An uploaded image tagged 'picture' is required.";
    pub const STORE_ID_REQUIRED: &str = "Store id is required.";
    pub const CATEGORY_ID_REQUIRED: &str = "Category id is required.";
    pub const CATEGORY_ID_INVALID: &str = "No category exists with the given id.";
    pub const CATEGORY_IN_USE: &str = "Category still has products assigned to it.";
    pub const PICTURE_EMPTY: &str = "Product pictures cannot be empty.";
    pub const VARIANTS_REQUIRED: &str = "At least one variant is required.";
    pub const SIZE_REQUIRED: &str = "Variant size is required.";
    pub const PRICE_GREATER_THAN_0: &str = "Price must be greater than 0.";
    pub const STOCK_NON_NEGATIVE: &str = "Stock quantity cannot be negative.";
    pub const ORDER_MAX_NON_NEGATIVE: &str = "Order max cannot be negative.";
    pub const QUANTITY_POSITIVE: &str = "Quantity must be greater than 0.";
    pub const ORDER_MAX_EXCEEDED: &str =
        "Quantity exceeds the per-order maximum for this variant.";
    pub const VARIANT_INACTIVE: &str = "Variant is not available for sale.";
    pub const PAGE_NO_INVALID: &str = "pageNo must be greater than zero.";
    pub const PER_PAGE_INVALID: &str = "perPage must be greater than zero.";
}

/// Error body returned to HTTP clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "field": "city_id",
    "message": "City id is required.",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Offending input field for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "request".to_string());
        ServiceError::Validation {
            field,
            message: err.to_string(),
        }
    }
}

impl ServiceError {
    /// Convenience constructor for field-level validation failures.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The input field this error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::EventError(_)
            | Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::SerializationError(_) | Self::EventError(_) | Self::InternalServerError => {
                "Internal server error".to_string()
            }
            Self::Validation { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            field: self.field().map(|f| f.to_string()),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::validation("name", messages::NAME_REQUIRED).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InsufficientStock("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::InternalServerError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn validation_errors_carry_the_field() {
        let err = ServiceError::validation("city_id", messages::CITY_ID_REQUIRED);
        assert_eq!(err.field(), Some("city_id"));
        assert_eq!(err.response_message(), messages::CITY_ID_REQUIRED);

        assert_eq!(ServiceError::NotFound("area".into()).field(), None);
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::SerializationError("broken json".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("secret".into())).response_message(),
            "Database error"
        );
        assert_eq!(
            ServiceError::InsufficientStock("only 1 left".into()).response_message(),
            "Insufficient stock: only 1 left"
        );
    }
}
