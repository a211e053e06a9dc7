//! # Validation Module
//!
//! Input and consistency validation for OpsDesk.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store layer (Rust)                                           │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The central rule here is order/total reconciliation: an order's
//! `total_cents` must equal the sum of `quantity × unit_price_cents` over
//! its line items. Amounts are integer cents, so the original system's
//! 0.01 float tolerance becomes exact equality.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::OrderItem;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Order Consistency
// =============================================================================

/// Validates an order's line items and checks its declared total.
///
/// ## Rules
/// - At least one item, at most [`MAX_ORDER_ITEMS`]
/// - Quantities positive and at most [`MAX_ITEM_QUANTITY`]
/// - Unit prices non-negative (zero allowed for bundled freebies)
/// - Each `line_total_cents` equals `quantity × unit_price_cents`
/// - `declared_total_cents` equals the sum of line totals
///
/// Violations reject the write; the order never reaches the database.
pub fn validate_order_totals(items: &[OrderItem], declared_total_cents: i64) -> CoreResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        }
        .into());
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_ORDER_ITEMS,
        }
        .into());
    }

    let mut computed_total = 0i64;
    for item in items {
        validate_quantity(item.quantity)?;
        validate_price_cents(item.unit_price_cents)?;

        let line = checked_line_total(item.unit_price_cents, item.quantity)?;
        if line != item.line_total_cents {
            return Err(CoreError::TotalMismatch {
                declared_cents: item.line_total_cents,
                computed_cents: line,
            });
        }
        computed_total = computed_total
            .checked_add(line)
            .ok_or_else(|| overflow("total"))?;
    }

    if computed_total != declared_total_cents {
        return Err(CoreError::TotalMismatch {
            declared_cents: declared_total_cents,
            computed_cents: computed_total,
        });
    }

    Ok(())
}

/// Computes an order total from its items (the canonical sum).
///
/// An overflowing total rejects the order instead of wrapping.
pub fn order_total_cents(items: &[OrderItem]) -> CoreResult<i64> {
    let mut total = 0i64;
    for item in items {
        let line = checked_line_total(item.unit_price_cents, item.quantity)?;
        total = total.checked_add(line).ok_or_else(|| overflow("total"))?;
    }
    Ok(total)
}

/// `unit_price × quantity` without a panic path.
pub fn checked_line_total(unit_price_cents: i64, quantity: i64) -> CoreResult<i64> {
    Money::from_cents(unit_price_cents)
        .checked_mul(quantity)
        .map(|m| m.cents())
        .ok_or_else(|| overflow("line_total"))
}

fn overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (customer name, product name, task title).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a SKU (business identifier for products).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// Zero is allowed (free items); negative is not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment or expense amount in cents.
///
/// Must be strictly positive: a zero payment is an entry mistake.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(qty: i64, unit_price: i64) -> OrderItem {
        OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            name_snapshot: "Widget".to_string(),
            unit_price_cents: unit_price,
            quantity: qty,
            line_total_cents: qty * unit_price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_consistent_order_passes() {
        let items = vec![item(2, 500), item(1, 1099)];
        assert!(validate_order_totals(&items, 2099).is_ok());
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let items = vec![item(2, 500)];
        let err = validate_order_totals(&items, 999).unwrap_err();
        assert!(matches!(
            err,
            CoreError::TotalMismatch {
                declared_cents: 999,
                computed_cents: 1000,
            }
        ));
    }

    #[test]
    fn test_tampered_line_total_rejected() {
        let mut bad = item(2, 500);
        bad.line_total_cents = 900;
        let err = validate_order_totals(&[bad], 900).unwrap_err();
        assert!(matches!(err, CoreError::TotalMismatch { .. }));
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = validate_order_totals(&[], 0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let items = vec![item(0, 500)];
        assert!(validate_order_totals(&items, 0).is_err());
    }

    #[test]
    fn test_negative_unit_price_rejected() {
        let items = vec![item(1, -500)];
        assert!(validate_order_totals(&items, -500).is_err());
    }

    #[test]
    fn test_free_item_allowed() {
        let items = vec![item(1, 0), item(1, 500)];
        assert!(validate_order_totals(&items, 500).is_ok());
    }

    #[test]
    fn test_order_total_cents() {
        let items = vec![item(3, 250), item(2, 100)];
        assert_eq!(order_total_cents(&items).unwrap(), 950);
    }

    #[test]
    fn test_overflowing_line_total_rejected() {
        // Quantity and price each pass their own bounds, but the product
        // exceeds i64
        let mut huge = item(1, 1);
        huge.quantity = 9_000;
        huge.unit_price_cents = i64::MAX / 4_000;
        huge.line_total_cents = i64::MAX;

        let err = validate_order_totals(&[huge.clone()], i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert!(order_total_cents(&[huge]).is_err());
    }

    #[test]
    fn test_overflowing_sum_rejected() {
        let mut a = item(1, i64::MAX / 2 + 1);
        a.line_total_cents = i64::MAX / 2 + 1;
        let b = a.clone();

        let err = validate_order_totals(&[a, b], i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("customer_name", "Acme GmbH").is_ok());
        assert!(validate_name("customer_name", "").is_err());
        assert!(validate_name("customer_name", "   ").is_err());
        assert!(validate_name("customer_name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SVC-REG_01").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("payment", 100).is_ok());
        assert!(validate_amount_cents("payment", 0).is_err());
        assert!(validate_amount_cents("payment", -100).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
