//! # Error Types
//!
//! Domain-specific error types for opsdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  opsdesk-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  opsdesk-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  opsdesk-store errors (separate crate)                                 │
//! │  └── StoreError       - What the application sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → StoreError → Frontend  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order number, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The daily order-number sequence is exhausted.
    ///
    /// ## When This Occurs
    /// - The 1000th order of a calendar day is requested
    ///
    /// Order numbers are `YYMMDD` + a zero-padded 3-digit sequence; past
    /// 999 the format cannot represent another order for that day, so the
    /// create is refused rather than producing a malformed number.
    #[error("Order numbers exhausted for {date}: daily sequence past 999")]
    OrderNumbersExhausted { date: NaiveDate },

    /// Order totals do not reconcile with line items.
    ///
    /// ## When This Occurs
    /// - `total_cents` differs from the sum of `quantity × unit_price_cents`
    /// - A line item's `line_total_cents` differs from its own product
    #[error("Order total {declared_cents} does not match item sum {computed_cents}")]
    TotalMismatch {
        declared_cents: i64,
        computed_cents: i64,
    },

    /// Status transition is not allowed for the acting role.
    ///
    /// ## When This Occurs
    /// - Staff tries to move an order backwards
    /// - Manager tries to skip a pipeline stage
    /// - Non-admin tries to cancel or un-cancel an order
    #[error("Role {role} may not move order from {from:?} to {to:?}")]
    TransitionNotAllowed {
        role: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Recording a payment against a cancelled order
    /// - Editing an order that has been completed
    #[error("Order {order_id} is {current_status:?}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: OrderStatus,
    },

    /// Payment is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Voiding an already-voided payment
    /// - Refunding a voided payment
    #[error("Payment {payment_id} is {current_status:?}, cannot perform operation")]
    InvalidPaymentStatus {
        payment_id: String,
        current_status: crate::types::PaymentStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection is empty where at least one element is required.
    #[error("{field} must have at least one entry")]
    Empty { field: String },

    /// Collection exceeds the allowed size.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TotalMismatch {
            declared_cents: 10000,
            computed_cents: 9950,
        };
        assert_eq!(
            err.to_string(),
            "Order total 10000 does not match item sum 9950"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        assert_eq!(err.to_string(), "customer_name is required");

        let err = ValidationError::Empty {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items must have at least one entry");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_exhausted_message_includes_date() {
        let err = CoreError::OrderNumbersExhausted {
            date: chrono::NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
        };
        assert!(err.to_string().contains("2026-08-30"));
    }
}
