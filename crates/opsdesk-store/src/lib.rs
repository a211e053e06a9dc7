//! # opsdesk-store: Business Operations for OpsDesk
//!
//! The orchestration layer: every operation the application surface can
//! perform lives here, gated on an authenticated [`Actor`] and audited.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OpsDesk Store Layer                              │
//! │                                                                         │
//! │  Frontend / API surface                                                │
//! │       │  actor + request DTO                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 opsdesk-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │  OrderStore ──── order numbers, totals, status pipeline        │   │
//! │  │  PaymentStore ── record / void / refund, balance view          │   │
//! │  │  CustomerStore ─ contacts, soft delete                         │   │
//! │  │  ProductStore ── catalog, SKU uniqueness                       │   │
//! │  │  ExpenseStore ── operating costs                               │   │
//! │  │  TaskStore ───── back-office todos                             │   │
//! │  │  ReportingService ─ revenue, trends, rankings                  │   │
//! │  │  ActivityFeed ── audit trail reads                             │   │
//! │  │                                                                 │   │
//! │  │  Shared: capability gate → validation → repo write → event     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  opsdesk-db repositories → SQLite                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use opsdesk_db::{Database, DbConfig};
//! use opsdesk_store::Stores;
//!
//! let db = Database::new(DbConfig::new("opsdesk.db")).await?;
//! let stores = Stores::new(db);
//!
//! let mut events = stores.events().subscribe();
//! let order = stores.orders.create(&actor, request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod activity;
pub mod customer_store;
pub mod error;
pub mod events;
pub mod expense_store;
pub mod order_store;
pub mod payment_store;
pub mod product_store;
pub mod reporting;
pub mod task_store;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use activity::ActivityFeed;
pub use customer_store::{CustomerInput, CustomerStore};
pub use error::{StoreError, StoreResult};
pub use events::{ChangeEvent, EventBus};
pub use expense_store::{ExpenseInput, ExpenseStore};
pub use order_store::{
    NewOrder, NewOrderItem, OrderStatistics, OrderStore, OrderUpdate, OrderWithItems,
};
pub use payment_store::{NewPayment, OrderBalance, PaymentStore, PaymentUpdate};
pub use product_store::{ProductInput, ProductStore};
pub use reporting::ReportingService;
pub use task_store::{TaskInput, TaskStore};

use opsdesk_db::Database;

/// All stores wired to one database and one event bus.
#[derive(Debug, Clone)]
pub struct Stores {
    pub orders: OrderStore,
    pub payments: PaymentStore,
    pub customers: CustomerStore,
    pub products: ProductStore,
    pub expenses: ExpenseStore,
    pub tasks: TaskStore,
    pub reporting: ReportingService,
    pub activity: ActivityFeed,
    events: EventBus,
}

impl Stores {
    /// Wires every store to `db` with a shared event bus.
    pub fn new(db: Database) -> Self {
        let events = EventBus::new();
        Stores {
            orders: OrderStore::new(db.clone(), events.clone()),
            payments: PaymentStore::new(db.clone(), events.clone()),
            customers: CustomerStore::new(db.clone(), events.clone()),
            products: ProductStore::new(db.clone(), events.clone()),
            expenses: ExpenseStore::new(db.clone(), events.clone()),
            tasks: TaskStore::new(db.clone(), events.clone()),
            reporting: ReportingService::new(db.clone()),
            activity: ActivityFeed::new(db),
            events,
        }
    }

    /// The shared change-event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
