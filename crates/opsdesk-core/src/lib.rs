//! # opsdesk-core: Pure Business Logic for OpsDesk
//!
//! This crate is the **heart** of OpsDesk. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OpsDesk Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Application (SPA frontend)                      │   │
//! │  │    Orders UI ──► Payments UI ──► Tasks UI ──► Reports UI       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  opsdesk-store (Stores)                         │   │
//! │  │    OrderStore, PaymentStore, TaskStore, ReportingService       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ opsdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌────────────┐ ┌───────────┐ ┌────────┐ ┌───────┐ │   │
//! │  │  │ types  │ │order_number│ │permissions│ │validate│ │reports│ │   │
//! │  │  │ Order  │ │ YYMMDD+NNN │ │ Role gate │ │ totals │ │revenue│ │   │
//! │  │  │Payment │ │ daily seq  │ │ pipeline  │ │ rules  │ │ trend │ │   │
//! │  │  └────────┘ └────────────┘ └───────────┘ └────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  opsdesk-db (Database Layer)                    │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Payment, Customer, Task, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`order_number`] - Date-prefixed daily order-number sequencing
//! - [`permissions`] - Role capabilities and status-transition gate
//! - [`validation`] - Business rule validation
//! - [`reports`] - Pure report reductions over orders/payments/expenses
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use opsdesk_core::order_number::next_order_number;
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
//!
//! // First order of the day
//! let first = next_order_number(None, today).unwrap();
//! assert_eq!(first, "260830001");
//!
//! // Sequence continues within the same day
//! let next = next_order_number(Some("260830041"), today).unwrap();
//! assert_eq!(next, "260830042");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order_number;
pub mod permissions;
pub mod reports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use opsdesk_core::Money` instead of
// `use opsdesk_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order_number::{next_order_number, order_number_prefix};
pub use permissions::{can_change_status, capabilities, Capabilities, Role};
pub use types::*;
pub use validation::{
    checked_line_total, order_total_cents, validate_amount_cents, validate_name,
    validate_order_totals, validate_price_cents, validate_quantity, validate_sku, validate_uuid,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single order
///
/// ## Business Reason
/// Prevents runaway orders and keeps report reductions bounded.
/// Can be made configurable per-tenant in future versions.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 9999;

/// Maximum daily order sequence (3-digit zero-padded suffix)
///
/// Order numbers are `YYMMDD` + `NNN`. The 1000th order of a day is a
/// hard error rather than a silently widened number.
pub const MAX_DAILY_ORDER_SEQUENCE: u32 = 999;
