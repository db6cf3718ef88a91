//! # Action Error Type
//!
//! Unified error type for the action layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Gulab POS                              │
//! │                                                                         │
//! │  Presentation surface            Action layer                           │
//! │  ────────────────────            ────────────                           │
//! │                                                                         │
//! │  complete_sale(...)                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Result<Sale, ActionError>                                              │
//! │         │                                                               │
//! │         ├── CoreError::EmptyCart      → { code: EMPTY_CART, ... }      │
//! │         ├── CoreError::PriceBelowCost → { code: INVALID_PRICE, ... }   │
//! │         ├── DbError::InsufficientStock→ { code: INSUFFICIENT_STOCK }   │
//! │         ├── DbError::*                → { code: DATABASE_ERROR, ... }  │
//! │         └── AiError::*                → { code: NOT_GENERATED, ... }   │
//! │                                                                         │
//! │  Every failure carries a machine-readable code and a message fit        │
//! │  for display; callers never pattern-match on message text.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use gulab_ai::AiError;
use gulab_core::CoreError;
use gulab_db::DbError;

/// Error returned from every action.
///
/// ## Serialization
/// ```json
/// { "code": "EMPTY_CART", "message": "Cannot complete a sale with an empty cart" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for action responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Checkout attempted with no cart lines
    EmptyCart,

    /// A line price sits below its cost floor
    InvalidPrice,

    /// Stock enforcement rejected the sale
    InsufficientStock,

    /// Database operation failed
    DatabaseError,

    /// Text generation failed or is not configured
    NotGenerated,

    /// Business rule violation not covered above
    BusinessLogic,

    /// Internal error
    Internal,
}

impl ActionError {
    /// Creates a new action error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ActionError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ActionError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ActionError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a generation-unavailable error.
    pub fn not_generated(message: impl Into<String>) -> Self {
        ActionError::new(ErrorCode::NotGenerated, message)
    }
}

/// Converts database errors to action errors.
impl From<DbError> for ActionError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ActionError::not_found(&entity, &id),
            DbError::InsufficientStock { .. } => {
                ActionError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            DbError::UniqueViolation { field, value } => ActionError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ActionError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ActionError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ActionError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ActionError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ActionError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ActionError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ActionError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to action errors.
impl From<CoreError> for ActionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ActionError::not_found("Product", &id),
            CoreError::SaleNotFound(id) => ActionError::not_found("Sale", &id),
            CoreError::EmptyCart => ActionError::new(ErrorCode::EmptyCart, err.to_string()),
            CoreError::PriceBelowCost { .. } => {
                ActionError::new(ErrorCode::InvalidPrice, err.to_string())
            }
            CoreError::InsufficientStock { .. } => {
                ActionError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => ActionError::validation(e.to_string()),
        }
    }
}

/// Converts generation errors to action errors.
impl From<AiError> for ActionError {
    fn from(err: AiError) -> Self {
        ActionError::not_generated(err.to_string())
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ActionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::EmptyCart).unwrap();
        assert_eq!(json, "\"EMPTY_CART\"");

        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_STOCK\"");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ActionError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let err: ActionError = CoreError::PriceBelowCost {
            product_name: "Oud Attar".to_string(),
            final_price_cents: 400,
            cost_price_cents: 500,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidPrice);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ActionError = DbError::InsufficientStock {
            product_name: "Oud Attar".to_string(),
            available: 1,
            requested: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err: ActionError = DbError::not_found("Sale", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
