//! # Repository Implementations
//!
//! One repository per aggregate. Each repository owns a pool clone and
//! exposes focused async methods; cross-aggregate policy (permissions,
//! audit, events) lives in opsdesk-store, not here.

pub mod activity;
pub mod customer;
pub mod expense;
pub mod order;
pub mod payment;
pub mod product;
pub mod task;
