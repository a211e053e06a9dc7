//! # Permission Rules
//!
//! Role → capability lookups and the role-gated status-transition rule.
//!
//! ## The Transition Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Role-Gated Status Transitions                          │
//! │                                                                         │
//! │  Pipeline:  Received → Confirmed → InProgress → Review → Delivered     │
//! │                                                         → Completed    │
//! │                                                                         │
//! │  Admin:    any index → any index (and to/from Cancelled)               │
//! │  Manager:  |to − from| == 1       (one step forward or back)           │
//! │  Staff:    to == from + 1         (exactly one step forward)           │
//! │  Viewer:   no transitions (read-only role)                             │
//! │                                                                         │
//! │  from == to is always rejected: a no-op transition is a caller bug.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is a business rule table, not a state machine engine: legality is
//! an index comparison over [`STATUS_PIPELINE`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::OrderStatus;

// =============================================================================
// Role
// =============================================================================

/// The role of an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including deletes and free status movement.
    Admin,
    /// Mid-tier role: day-to-day management, one-step status corrections.
    Manager,
    /// Front-line role: data entry, forward-only status movement.
    Staff,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Lowercase label for log fields and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// The capability table for a role.
///
/// A handful of boolean lookups; stores check the relevant flag before
/// every mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Capabilities {
    pub manage_orders: bool,
    pub manage_payments: bool,
    pub void_payments: bool,
    pub manage_customers: bool,
    pub manage_products: bool,
    pub manage_expenses: bool,
    pub manage_tasks: bool,
    /// Hard deletes of records (orders, payments).
    pub delete_records: bool,
    pub view_reports: bool,
}

/// Returns the capability table for a role.
///
/// ## Capability Matrix
/// ```text
/// ┌──────────────────┬───────┬─────────┬───────┬────────┐
/// │                  │ Admin │ Manager │ Staff │ Viewer │
/// ├──────────────────┼───────┼─────────┼───────┼────────┤
/// │ manage_orders    │   ✓   │    ✓    │   ✓   │        │
/// │ manage_payments  │   ✓   │    ✓    │   ✓   │        │
/// │ void_payments    │   ✓   │    ✓    │       │        │
/// │ manage_customers │   ✓   │    ✓    │   ✓   │        │
/// │ manage_products  │   ✓   │    ✓    │       │        │
/// │ manage_expenses  │   ✓   │    ✓    │       │        │
/// │ manage_tasks     │   ✓   │    ✓    │   ✓   │        │
/// │ delete_records   │   ✓   │         │       │        │
/// │ view_reports     │   ✓   │    ✓    │       │   ✓    │
/// └──────────────────┴───────┴─────────┴───────┴────────┘
/// ```
pub fn capabilities(role: Role) -> Capabilities {
    match role {
        Role::Admin => Capabilities {
            manage_orders: true,
            manage_payments: true,
            void_payments: true,
            manage_customers: true,
            manage_products: true,
            manage_expenses: true,
            manage_tasks: true,
            delete_records: true,
            view_reports: true,
        },
        Role::Manager => Capabilities {
            manage_orders: true,
            manage_payments: true,
            void_payments: true,
            manage_customers: true,
            manage_products: true,
            manage_expenses: true,
            manage_tasks: true,
            delete_records: false,
            view_reports: true,
        },
        Role::Staff => Capabilities {
            manage_orders: true,
            manage_payments: true,
            void_payments: false,
            manage_customers: true,
            manage_products: false,
            manage_expenses: false,
            manage_tasks: true,
            delete_records: false,
            view_reports: false,
        },
        Role::Viewer => Capabilities {
            manage_orders: false,
            manage_payments: false,
            void_payments: false,
            manage_customers: false,
            manage_products: false,
            manage_expenses: false,
            manage_tasks: false,
            delete_records: false,
            view_reports: true,
        },
    }
}

// =============================================================================
// Status Transition Gate
// =============================================================================

/// Decides whether `role` may move an order from `from` to `to`.
///
/// ## Rules
/// - `from == to` is never a legal transition
/// - Admins move freely, including to and from `Cancelled`
/// - Transitions involving `Cancelled` are admin-only
/// - Managers may move one step in either direction along the pipeline
/// - Every other mutating role moves exactly one step forward
/// - Viewers cannot transition at all
pub fn can_change_status(role: Role, from: OrderStatus, to: OrderStatus) -> bool {
    if from == to {
        return false;
    }

    if role == Role::Admin {
        return true;
    }

    if role == Role::Viewer {
        return false;
    }

    // Cancellation and reinstatement are admin-only
    let (from_idx, to_idx) = match (from.pipeline_index(), to.pipeline_index()) {
        (Some(f), Some(t)) => (f as i64, t as i64),
        _ => return false,
    };

    match role {
        Role::Manager => (to_idx - from_idx).abs() == 1,
        _ => to_idx - from_idx == 1,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
