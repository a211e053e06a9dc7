//! # Order Store
//!
//! Actor-gated order operations: creation with daily order-number
//! sequencing, item snapshotting, total reconciliation, role-gated status
//! movement, and deletion.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Creation                                    │
//! │                                                                         │
//! │  create(actor, request)                                                │
//! │       │                                                                 │
//! │       ├── capability check (manage_orders)                             │
//! │       ├── snapshot items from the product catalog                      │
//! │       ├── validate_order_totals() — declared total must reconcile      │
//! │       │                                                                 │
//! │       └── number loop (bounded):                                       │
//! │             read latest number for today's prefix                      │
//! │             derive next number                                         │
//! │             transactional insert (order + items + audit)               │
//! │               ├── ok → publish OrderCreated, done                      │
//! │               ├── UNIQUE(order_number) → lost the race, loop again     │
//! │               └── busy → retry_write backoff inside the attempt        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::activity::audit_entry;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeEvent, EventBus};
use opsdesk_core::reports::{self, StatusCount, TrendPoint};
use opsdesk_core::{
    can_change_status, capabilities, checked_line_total, next_order_number, order_number_prefix,
    order_total_cents, validate_name, validate_order_totals, validate_quantity, Actor, CoreError,
    EntityKind, Order, OrderItem, OrderStatus,
};
use opsdesk_db::{retry_write, Database, DbError, OrderFilter, RetryPolicy};

/// Bound on order-number race retries. Each iteration re-reads the latest
/// number, so losing this many races in a row means pathological load.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

// =============================================================================
// Request DTOs
// =============================================================================

/// A requested line item; price and name are snapshotted from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Order creation request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub items: Vec<NewOrderItem>,
    /// Client-side total for cross-checking. When present it must equal
    /// the computed item sum exactly.
    pub total_cents: Option<i64>,
    pub notes: Option<String>,
}

/// Order edit request: replaces header fields and the full item list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderUpdate {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub items: Vec<NewOrderItem>,
    pub total_cents: Option<i64>,
    pub notes: Option<String>,
}

/// An order with its line items, for detail views.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Dashboard figures derived from the order collection.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderStatistics {
    /// All orders ever, regardless of window.
    pub total_orders: i64,
    /// Pipeline histogram over the trailing window.
    pub status_counts: Vec<StatusCount>,
    /// Billed revenue (non-cancelled orders) over the trailing window.
    pub billed_cents: i64,
    /// Per-day billed revenue over the trailing window.
    pub daily_trend: Vec<TrendPoint>,
}

// =============================================================================
// Store
// =============================================================================

/// Actor-gated order operations.
#[derive(Debug, Clone)]
pub struct OrderStore {
    db: Database,
    events: EventBus,
    retry: RetryPolicy,
}

impl OrderStore {
    pub fn new(db: Database, events: EventBus) -> Self {
        OrderStore {
            db,
            events,
            retry: RetryPolicy::default_writes(),
        }
    }

    /// Creates an order with a fresh daily order number.
    pub async fn create(&self, actor: &Actor, request: NewOrder) -> StoreResult<Order> {
        if !capabilities(actor.role).manage_orders {
            return Err(StoreError::forbidden(actor.role, "create orders"));
        }

        validate_name("customer_name", &request.customer_name).map_err(CoreError::from)?;

        if let Some(customer_id) = &request.customer_id {
            if self.db.customers().get_by_id(customer_id).await?.is_none() {
                return Err(StoreError::not_found("Customer", customer_id));
            }
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();
        let items = self.snapshot_items(&order_id, &request.items).await?;
        let computed_total = order_total_cents(&items)?;
        let declared_total = request.total_cents.unwrap_or(computed_total);
        validate_order_totals(&items, declared_total)?;

        let today = now.date_naive();
        let prefix = order_number_prefix(today);

        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let last = self.db.orders().latest_order_number(&prefix).await?;
            let order_number = next_order_number(last.as_deref(), today)?;

            let order = Order {
                id: order_id.clone(),
                order_number: order_number.clone(),
                customer_id: request.customer_id.clone(),
                customer_name: request.customer_name.clone(),
                status: OrderStatus::Received,
                total_cents: declared_total,
                notes: request.notes.clone(),
                created_by: actor.id.clone(),
                created_at: now,
                updated_at: now,
                completed_at: None,
            };

            let activity = audit_entry(
                actor,
                EntityKind::Order,
                &order.id,
                "created",
                Some(
                    serde_json::json!({
                        "order_number": order_number,
                        "total_cents": declared_total,
                    })
                    .to_string(),
                ),
            );

            let repo = self.db.orders();
            let result = retry_write(self.retry, "insert order", || {
                repo.insert_with_activity(&order, &items, &activity)
            })
            .await;

            match result {
                Ok(()) => {
                    info!(
                        order_number = %order.order_number,
                        actor = %actor.id,
                        "Order created"
                    );
                    self.events.publish(ChangeEvent::OrderCreated {
                        order_id: order.id.clone(),
                        order_number: order.order_number.clone(),
                    });
                    return Ok(order);
                }
                // Lost the race for this number; re-read and try the next one
                Err(DbError::UniqueViolation { field, .. })
                    if field.contains("order_number") =>
                {
                    warn!(%order_number, "Order number taken by concurrent create, retrying");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(DbError::Busy("order number contention".to_string()).into())
    }

    /// Loads an order with its items.
    pub async fn get(&self, order_id: &str) -> StoreResult<OrderWithItems> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;
        let items = self.db.orders().get_items(order_id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// Lists orders with optional filters, newest first.
    pub async fn list(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        Ok(self.db.orders().list(&filter).await?)
    }

    /// Replaces an order's header fields and items.
    ///
    /// Completed and cancelled orders are frozen; edits are rejected with
    /// the order's current status.
    pub async fn update(
        &self,
        actor: &Actor,
        order_id: &str,
        request: OrderUpdate,
    ) -> StoreResult<Order> {
        if !capabilities(actor.role).manage_orders {
            return Err(StoreError::forbidden(actor.role, "edit orders"));
        }

        let existing = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;

        if matches!(
            existing.status,
            OrderStatus::Completed | OrderStatus::Cancelled
        ) {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order_id.to_string(),
                current_status: existing.status,
            }
            .into());
        }

        validate_name("customer_name", &request.customer_name).map_err(CoreError::from)?;

        if let Some(customer_id) = &request.customer_id {
            if self.db.customers().get_by_id(customer_id).await?.is_none() {
                return Err(StoreError::not_found("Customer", customer_id));
            }
        }

        let items = self.snapshot_items(order_id, &request.items).await?;
        let computed_total = order_total_cents(&items)?;
        let declared_total = request.total_cents.unwrap_or(computed_total);
        validate_order_totals(&items, declared_total)?;

        let updated = Order {
            customer_id: request.customer_id,
            customer_name: request.customer_name,
            total_cents: declared_total,
            notes: request.notes,
            updated_at: Utc::now(),
            ..existing
        };

        let activity = audit_entry(
            actor,
            EntityKind::Order,
            order_id,
            "updated",
            Some(serde_json::json!({ "total_cents": declared_total }).to_string()),
        );

        let repo = self.db.orders();
        retry_write(self.retry, "update order", || {
            repo.update_with_activity(&updated, &items, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::OrderUpdated {
            order_id: order_id.to_string(),
        });
        Ok(updated)
    }

    /// Moves an order along the status pipeline, enforcing the role gate.
    pub async fn change_status(
        &self,
        actor: &Actor,
        order_id: &str,
        to: OrderStatus,
    ) -> StoreResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;
        let from = order.status;

        if !can_change_status(actor.role, from, to) {
            return Err(CoreError::TransitionNotAllowed {
                role: actor.role.to_string(),
                from,
                to,
            }
            .into());
        }

        let completed_at = (to == OrderStatus::Completed).then(Utc::now);

        let activity = audit_entry(
            actor,
            EntityKind::Order,
            order_id,
            "status_changed",
            Some(serde_json::json!({ "from": from, "to": to }).to_string()),
        );

        let repo = self.db.orders();
        retry_write(self.retry, "update order status", || {
            repo.update_status(order_id, from, to, completed_at, &activity)
        })
        .await?;

        info!(%order_id, ?from, ?to, actor = %actor.id, "Order status changed");
        self.events.publish(ChangeEvent::OrderStatusChanged {
            order_id: order_id.to_string(),
            from,
            to,
        });

        Ok(Order {
            status: to,
            updated_at: Utc::now(),
            completed_at: completed_at.or(order.completed_at),
            ..order
        })
    }

    /// Hard-deletes an order and everything hanging off it. Admin only.
    pub async fn delete(&self, actor: &Actor, order_id: &str) -> StoreResult<()> {
        if !capabilities(actor.role).delete_records {
            return Err(StoreError::forbidden(actor.role, "delete orders"));
        }

        self.db.orders().delete(order_id).await?;

        // The deletion itself leaves no row to attach history to; log the
        // audit entry standalone after the fact.
        let activity = audit_entry(actor, EntityKind::Order, order_id, "deleted", None);
        self.db.activity().insert(&activity).await?;

        info!(%order_id, actor = %actor.id, "Order deleted");
        self.events.publish(ChangeEvent::OrderDeleted {
            order_id: order_id.to_string(),
        });
        Ok(())
    }

    /// Dashboard statistics over the trailing `days` days (today included).
    pub async fn statistics(&self, actor: &Actor, days: u32) -> StoreResult<OrderStatistics> {
        if !capabilities(actor.role).view_reports {
            return Err(StoreError::forbidden(actor.role, "view order statistics"));
        }

        let today = Utc::now().date_naive();
        let start = today
            .checked_sub_days(Days::new(days.saturating_sub(1) as u64))
            .unwrap_or(today);
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let to = today
            .checked_add_days(Days::new(1))
            .unwrap_or(today)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let orders = self.db.orders().list_between(from, to).await?;
        let billed_cents = orders
            .iter()
            .filter(|o| o.status.is_billable())
            .map(|o| o.total_cents)
            .sum();

        Ok(OrderStatistics {
            total_orders: self.db.orders().count().await?,
            status_counts: reports::status_breakdown(&orders),
            billed_cents,
            daily_trend: reports::daily_revenue_trend(&orders, today, days),
        })
    }

    /// Builds frozen line items from the product catalog.
    async fn snapshot_items(
        &self,
        order_id: &str,
        requested: &[NewOrderItem],
    ) -> StoreResult<Vec<OrderItem>> {
        let now = Utc::now();
        let mut items = Vec::with_capacity(requested.len());

        for line in requested {
            // Bound the quantity before any arithmetic touches it
            validate_quantity(line.quantity).map_err(CoreError::from)?;

            let product = self
                .db
                .products()
                .get_by_id(&line.product_id)
                .await?
                .ok_or_else(|| StoreError::not_found("Product", &line.product_id))?;

            let line_total_cents = checked_line_total(product.price_cents, line.quantity)?;

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.to_string(),
                product_id: product.id,
                name_snapshot: product.name,
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
                line_total_cents,
                created_at: now,
            });
        }

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{admin, manager, seeded_db, staff, viewer};
    use opsdesk_core::Role;

    async fn store() -> (OrderStore, Database) {
        let db = seeded_db().await;
        (OrderStore::new(db.clone(), EventBus::new()), db)
    }

    fn request(product_id: &str, quantity: i64) -> NewOrder {
        NewOrder {
            customer_id: None,
            customer_name: "Acme GmbH".to_string(),
            items: vec![NewOrderItem {
                product_id: product_id.to_string(),
                quantity,
            }],
            total_cents: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_daily_sequence() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);

        let first = store.create(&staff(), request(&product.id, 2)).await.unwrap();
        let second = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let prefix = order_number_prefix(Utc::now().date_naive());
        assert_eq!(first.order_number, format!("{prefix}001"));
        assert_eq!(second.order_number, format!("{prefix}002"));
        assert_eq!(first.total_cents, product.price_cents * 2);
        assert_eq!(first.status, OrderStatus::Received);
    }

    #[tokio::test]
    async fn test_create_rejects_declared_total_mismatch() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);

        let mut req = request(&product.id, 2);
        req.total_cents = Some(product.price_cents * 2 + 1);

        let err = store.create(&staff(), req).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::TotalMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_huge_quantity_rejected_without_overflow() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);

        let err = store
            .create(&staff(), request(&product.id, i64::MAX / 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));

        let err = store.create(&staff(), request(&product.id, -3)).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));

        // Nothing reached the database
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_viewer_cannot_create() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);

        let err = store.create(&viewer(), request(&product.id, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);

        // Interleaved creates may both read the same latest number; the
        // loser of the UNIQUE race re-reads and takes the next sequence.
        let staff = staff();
        let (a, b) = tokio::join!(
            store.create(&staff, request(&product.id, 1)),
            store.create(&staff, request(&product.id, 2)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let prefix = order_number_prefix(Utc::now().date_naive());
        let mut numbers = vec![a.order_number, b.order_number];
        numbers.sort();
        assert_eq!(numbers, vec![format!("{prefix}001"), format!("{prefix}002")]);
    }

    #[tokio::test]
    async fn test_number_collision_retries_are_bounded() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);

        let first = store.create(&staff(), request(&product.id, 1)).await.unwrap();
        let prefix = order_number_prefix(Utc::now().date_naive());
        assert_eq!(first.order_number, format!("{prefix}001"));

        // Plant a junk number that sorts above every real one for today.
        // Each attempt then re-derives 001, collides with the first order,
        // and loops until the attempt budget is spent.
        let junk = Order {
            id: Uuid::new_v4().to_string(),
            order_number: format!("{prefix}XXX"),
            ..first.clone()
        };
        let activity = audit_entry(&staff(), EntityKind::Order, &junk.id, "created", None);
        db.orders()
            .insert_with_activity(&junk, &[], &activity)
            .await
            .unwrap();

        let err = store.create(&staff(), request(&product.id, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Db(DbError::Busy(_))));

        // The failed create wrote nothing
        assert_eq!(db.orders().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_product() {
        let (store, _db) = store().await;
        let err = store
            .create(&staff(), request("no-such-product", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "Product", .. }));
    }

    #[tokio::test]
    async fn test_staff_moves_one_step_forward_only() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let moved = store
            .change_status(&staff(), &order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(moved.status, OrderStatus::Confirmed);

        // Backwards is manager territory
        let err = store
            .change_status(&staff(), &order.id, OrderStatus::Received)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::TransitionNotAllowed { .. })
        ));

        let back = store
            .change_status(&manager(), &order.id, OrderStatus::Received)
            .await
            .unwrap();
        assert_eq!(back.status, OrderStatus::Received);
    }

    #[tokio::test]
    async fn test_cancellation_requires_admin() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let err = store
            .change_status(&manager(), &order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::TransitionNotAllowed { .. })
        ));

        let cancelled = store
            .change_status(&admin(), &order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_completion_stamps_completed_at() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let done = store
            .change_status(&admin(), &order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert!(done.completed_at.is_some());

        let reloaded = store.get(&order.id).await.unwrap();
        assert_eq!(reloaded.order.status, OrderStatus::Completed);
        assert!(reloaded.order.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_completed_order_is_frozen() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();
        store
            .change_status(&admin(), &order.id, OrderStatus::Completed)
            .await
            .unwrap();

        let err = store
            .update(
                &admin(),
                &order.id,
                OrderUpdate {
                    customer_id: None,
                    customer_name: "Someone Else".to_string(),
                    items: vec![NewOrderItem {
                        product_id: product.id.clone(),
                        quantity: 3,
                    }],
                    total_cents: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InvalidOrderStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_is_admin_only() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let err = store.delete(&manager(), &order.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));

        store.delete(&admin(), &order.id).await.unwrap();
        assert!(matches!(
            store.get(&order.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_writes_audit_entry() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let trail = db
            .activity()
            .for_entity(EntityKind::Order, &order.id)
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, "created");
        assert_eq!(trail[0].actor_id, staff().id);
    }

    #[tokio::test]
    async fn test_create_publishes_event() {
        let db = seeded_db().await;
        let bus = EventBus::new();
        let store = OrderStore::new(db.clone(), bus.clone());
        let mut rx = bus.subscribe();

        let product = db.products().list(false).await.unwrap().remove(0);
        let order = store.create(&staff(), request(&product.id, 1)).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ChangeEvent::OrderCreated {
                order_id: order.id,
                order_number: order.order_number,
            }
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let a = store.create(&staff(), request(&product.id, 1)).await.unwrap();
        store.create(&staff(), request(&product.id, 2)).await.unwrap();
        store
            .change_status(&staff(), &a.id, OrderStatus::Confirmed)
            .await
            .unwrap();

        let confirmed = store
            .list(OrderFilter {
                status: Some(OrderStatus::Confirmed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, a.id);
    }

    #[tokio::test]
    async fn test_statistics_counts_and_trends() {
        let (store, db) = store().await;
        let product = db.products().list(false).await.unwrap().remove(0);
        let a = store.create(&staff(), request(&product.id, 2)).await.unwrap();
        store.create(&staff(), request(&product.id, 1)).await.unwrap();
        store
            .change_status(&admin(), &a.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let stats = store.statistics(&viewer(), 7).await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.billed_cents, product.price_cents);
        assert_eq!(stats.daily_trend.len(), 7);
        assert_eq!(stats.daily_trend.last().unwrap().order_count, 1);

        let cancelled = stats
            .status_counts
            .iter()
            .find(|s| s.status == OrderStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.count, 1);

        // Staff can move orders but not read the dashboard
        let err = store.statistics(&staff(), 7).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[test]
    fn test_role_helpers_have_expected_roles() {
        assert_eq!(admin().role, Role::Admin);
        assert_eq!(viewer().role, Role::Viewer);
    }
}
