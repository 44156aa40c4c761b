//! # Error Types
//!
//! Domain-specific error types for bepawa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bepawa-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bepawa-db errors                                                      │
//! │  └── DbError          - Database failures (wraps CoreError)            │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError         - What the frontend sees ({code, message})       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (or is not visible to the caller).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough stock to complete a sale or add to a cart.
    ///
    /// ## User Workflow
    /// ```text
    /// POS sale (qty: 5)
    ///      │
    ///      ▼
    /// Guarded decrement: stock=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Panadol 500mg", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, UI shows "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An amount does not fit in i64 minor units.
    #[error("Amount is too large")]
    AmountOverflow,

    /// Cart lines must all come from one seller.
    #[error("Cart already holds items from another seller; check out or clear it first")]
    MixedSellers,

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Checkout or sale attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A status change that the entity's lifecycle does not allow.
    #[error("{entity} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Caller's role may not perform the operation.
    #[error("Role {role} is not allowed to {action}")]
    Forbidden { role: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a Forbidden error.
    pub fn forbidden(role: impl Into<String>, action: impl Into<String>) -> Self {
        CoreError::Forbidden {
            role: role.into(),
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Panadol 500mg".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Panadol 500mg: available 3, requested 5"
        );

        let err = CoreError::InvalidStatusTransition {
            entity: "Order",
            from: "delivered".to_string(),
            to: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "Order cannot move from delivered to pending");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: name is required");
    }
}
