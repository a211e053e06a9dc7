//! # opsdesk-db: Database Layer for OpsDesk
//!
//! This crate provides database access for the OpsDesk back office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OpsDesk Data Flow                                │
//! │                                                                         │
//! │  Store operation (OrderStore::create)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     opsdesk-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (order.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │   payment.rs, │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│   ...)        │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │               │    │ 002_idx.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   retry.rs: backoff loop for busy/rate-limited writes          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and retryability
//! - [`retry`] - Exponential-backoff write retries
//! - [`repository`] - Repository implementations (order, payment, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use opsdesk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/opsdesk.db")).await?;
//! let order = db.orders().get_by_id("...").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use retry::{retry_write, RetryPolicy};

// Repository re-exports for convenience
pub use repository::activity::ActivityRepository;
pub use repository::customer::CustomerRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::order::{OrderFilter, OrderRepository};
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;
pub use repository::task::{TaskFilter, TaskRepository};
