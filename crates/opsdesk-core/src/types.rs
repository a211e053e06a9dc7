//! # Domain Types
//!
//! Core domain types used throughout OpsDesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │    Payment      │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  order_number   │   │  order_id (FK)  │   │  name           │       │
//! │  │  status         │   │  method/status  │   │  email/phone    │       │
//! │  │  total_cents    │   │  amount_cents   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │  PaymentStatus  │   │  ActivityEntry  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Received       │   │  Completed      │   │  actor id/name  │       │
//! │  │  ... pipeline   │   │  Voided         │   │  entity kind/id │       │
//! │  │  Completed      │   │  Refunded       │   │  action+details │       │
//! │  │  Cancelled      │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (order_number, sku) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::permissions::Role;

// =============================================================================
// Order Status
// =============================================================================

/// The operational status of an order.
///
/// The first six variants form a fixed ordered pipeline; `Cancelled` sits
/// outside the pipeline and is only reachable by admins (see
/// [`crate::permissions::can_change_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been received and registered.
    Received,
    /// Order details confirmed with the customer.
    Confirmed,
    /// Back-office processing in progress.
    InProgress,
    /// Awaiting internal review.
    Review,
    /// Delivered to the customer.
    Delivered,
    /// Fully processed and closed.
    Completed,
    /// Cancelled; outside the operational pipeline.
    Cancelled,
}

/// The fixed ordered operational pipeline.
///
/// Transition legality is decided by index distance within this list.
pub const STATUS_PIPELINE: [OrderStatus; 6] = [
    OrderStatus::Received,
    OrderStatus::Confirmed,
    OrderStatus::InProgress,
    OrderStatus::Review,
    OrderStatus::Delivered,
    OrderStatus::Completed,
];

impl OrderStatus {
    /// Position within the ordered pipeline, `None` for `Cancelled`.
    pub fn pipeline_index(&self) -> Option<usize> {
        STATUS_PIPELINE.iter().position(|s| s == self)
    }

    /// Whether this status counts toward revenue reporting.
    ///
    /// Cancelled orders are excluded from billed revenue.
    pub fn is_billable(&self) -> bool {
        *self != OrderStatus::Cancelled
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Received
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer purchase record with line items, status, and monetary totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier: `YYMMDD` + 3-digit daily sequence.
    pub order_number: String,

    /// Customer this order belongs to, if registered.
    pub customer_id: Option<String>,

    /// Customer name at time of order (frozen snapshot).
    pub customer_name: String,

    /// Operational pipeline status.
    pub status: OrderStatus,

    /// Order total in cents. Must equal the sum of item line totals.
    pub total_cents: i64,

    /// Free-form notes.
    pub notes: Option<String>,

    /// ID of the actor who created the order.
    pub created_by: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Set when the order reaches `Completed`.
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item on an order.
/// Uses snapshot pattern to freeze product data at time of ordering.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    /// Quantity ordered.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment.
    Card,
    /// Bank transfer against an invoice.
    BankTransfer,
    /// Online payment provider.
    Online,
}

/// Lifecycle of a recorded payment.
///
/// Only `Completed` payments count toward an order's paid total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Money received and applied to the order balance.
    Completed,
    /// Entry mistake; excluded from totals but kept for the audit trail.
    Voided,
    /// Returned to the customer; excluded from totals.
    Refunded,
}

impl PaymentStatus {
    /// Whether the payment counts toward the order's paid total.
    #[inline]
    pub fn counts_toward_total(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }
}

/// A monetary transaction applied against an order's balance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Amount paid in cents.
    pub amount_cents: i64,
    /// External reference (transfer ID, card auth code, etc.).
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// ID of the actor who recorded the payment.
    pub recorded_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    /// Soft-delete flag.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product or service that can appear on orders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Business identifier.
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    /// Sale price in cents.
    pub price_cents: i64,
    /// Cost in cents (for profit reporting).
    pub cost_cents: Option<i64>,
    /// Soft-delete flag.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// An operating expense, subtracted from collected revenue in reports.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    /// Free-form category (rent, supplies, salaries, ...).
    pub category: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    /// Date the expense was incurred (not the entry timestamp).
    #[ts(as = "String")]
    pub incurred_on: NaiveDate,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Task
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Open
    }
}

/// A back-office task, optionally linked to an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Actor the task is assigned to.
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    /// Order this task relates to, if any.
    pub order_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub due_on: Option<NaiveDate>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// The kind of entity an activity entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Payment,
    Customer,
    Product,
    Expense,
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Order => "order",
            EntityKind::Payment => "payment",
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
            EntityKind::Expense => "expense",
            EntityKind::Task => "task",
        };
        f.write_str(s)
    }
}

/// An audit trail entry describing who did what to which entity.
///
/// Every mutating store operation appends exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActivityEntry {
    pub id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    /// Verb describing the change: "created", "status_changed", "voided", ...
    pub action: String,
    /// JSON metadata (old/new status, amounts, etc.).
    pub details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Actor
// =============================================================================

/// An authenticated user performing store operations.
///
/// Authentication itself happens outside this workspace; stores only need
/// the resolved identity and role.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_index() {
        assert_eq!(OrderStatus::Received.pipeline_index(), Some(0));
        assert_eq!(OrderStatus::Completed.pipeline_index(), Some(5));
        assert_eq!(OrderStatus::Cancelled.pipeline_index(), None);
    }

    #[test]
    fn test_billable() {
        assert!(OrderStatus::Received.is_billable());
        assert!(OrderStatus::Completed.is_billable());
        assert!(!OrderStatus::Cancelled.is_billable());
    }

    #[test]
    fn test_payment_status_counting() {
        assert!(PaymentStatus::Completed.counts_toward_total());
        assert!(!PaymentStatus::Voided.counts_toward_total());
        assert!(!PaymentStatus::Refunded.counts_toward_total());
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Order.to_string(), "order");
        assert_eq!(EntityKind::Task.to_string(), "task");
    }

    #[test]
    fn test_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Received);
        assert_eq!(TaskStatus::default(), TaskStatus::Open);
    }
}
