use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient stock for item {item_id}: only {available} units available")]
    InsufficientStock { item_id: Uuid, available: i32 },

    #[error("Invalid {entity} transition: cannot {attempted} from status {from}")]
    InvalidStateTransition {
        entity: &'static str,
        from: String,
        attempted: &'static str,
    },

    #[error("{entity} {id} is already cancelled")]
    AlreadyCancelled { entity: &'static str, id: Uuid },

    #[error("At least one line is required")]
    EmptyLineSet,

    #[error("Inventory record missing for item {item_id} at location {location_id}")]
    SourceInventoryMissing { item_id: Uuid, location_id: Uuid },

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::EmptyLineSet => StatusCode::BAD_REQUEST,
            Self::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidStateTransition { .. } | Self::AlreadyCancelled { .. } => {
                StatusCode::CONFLICT
            }
            // A vanished ledger row mid-operation is a consistency fault, not a user error.
            Self::SourceInventoryMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for HTTP responses. Internal failures return generic
    /// text so backend details never leak to callers.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::EventError(_) | Self::InternalError(_)
            | Self::Other(_) => "Internal server error".to_string(),
            Self::SourceInventoryMissing { .. } => {
                "Inventory ledger inconsistency detected".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_maps_to_unprocessable_entity() {
        let err = ServiceError::InsufficientStock {
            item_id: Uuid::nil(),
            available: 30,
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.response_message().contains("only 30 units available"));
    }

    #[test]
    fn state_errors_map_to_conflict() {
        let err = ServiceError::InvalidStateTransition {
            entity: "transfer",
            from: "COMPLETED".into(),
            attempted: "cancel",
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = ServiceError::AlreadyCancelled {
            entity: "adjustment",
            id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = ServiceError::InternalError("reservation underflow on row 42".into());
        assert_eq!(err.response_message(), "Internal server error");
    }
}
