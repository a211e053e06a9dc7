//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert_with_activity() → order + items + audit entry,          │
//! │         one transaction; UNIQUE(order_number) catches races            │
//! │                                                                         │
//! │  2. PROCESS                                                            │
//! │     └── update_status() → guarded UPDATE (WHERE status = expected)     │
//! │     └── replace_items()  → revalidated totals from the store layer     │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE (admin only, enforced upstream)                  │
//! │     └── delete() → items and payments cascade                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::activity::ActivityRepository;
use opsdesk_core::{ActivityEntry, Order, OrderItem, OrderStatus};

/// Filters for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order, its items, and the creation audit entry in one
    /// transaction.
    ///
    /// A UNIQUE violation on `order_number` means a concurrent create won
    /// the race for today's sequence; the store layer re-reads and retries.
    pub async fn insert_with_activity(
        &self,
        order: &Order,
        items: &[OrderItem],
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %order.id, order_number = %order.order_number, "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, customer_name, status,
                total_cents, notes, created_by,
                created_at, updated_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(&order.created_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.completed_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, customer_id, customer_name, status,
                   total_cents, notes, created_by,
                   created_at, updated_at, completed_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, name_snapshot,
                   unit_price_cents, quantity, line_total_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Returns the highest order number issued for a `YYMMDD` prefix.
    ///
    /// Feeds the daily sequence: the store derives the next number from
    /// this value.
    pub async fn latest_order_number(&self, prefix: &str) -> DbResult<Option<String>> {
        let number: Option<String> = sqlx::query_scalar(
            r#"
            SELECT order_number
            FROM orders
            WHERE order_number LIKE ?1
            ORDER BY order_number DESC
            LIMIT 1
            "#,
        )
        .bind(format!("{prefix}%"))
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    /// Lists orders with optional status/customer filters, newest first.
    pub async fn list(&self, filter: &OrderFilter) -> DbResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT id, order_number, customer_id, customer_name, status,
                   total_cents, notes, created_by,
                   created_at, updated_at, completed_at
            FROM orders
            WHERE 1 = 1
            "#,
        );

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(customer_id) = &filter.customer_id {
            qb.push(" AND customer_id = ").push_bind(customer_id.clone());
        }

        qb.push(" ORDER BY created_at DESC");
        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(100));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));

        let orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    /// Lists orders created within `[start, end)`, oldest first.
    ///
    /// Used by reporting and statistics.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, customer_id, customer_name, status,
                   total_cents, notes, created_by,
                   created_at, updated_at, completed_at
            FROM orders
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Items of all non-cancelled orders created within `[start, end)`.
    ///
    /// The reporting join for top-product and profit reductions.
    pub async fn items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, oi.name_snapshot,
                   oi.unit_price_cents, oi.quantity, oi.line_total_cents,
                   oi.created_at
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ?1 AND o.created_at < ?2
              AND o.status != 'cancelled'
            ORDER BY oi.created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates order header fields (customer, notes, total) and replaces
    /// its items, with the audit entry in the same transaction.
    ///
    /// The store layer revalidates totals against the new items before
    /// calling this.
    pub async fn update_with_activity(
        &self,
        order: &Order,
        items: &[OrderItem],
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %order.id, "Updating order");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                customer_id = ?2,
                customer_name = ?3,
                total_cents = ?4,
                notes = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Moves an order between statuses with a guard against concurrent
    /// modification, recording the audit entry in the same transaction.
    ///
    /// ## Returns
    /// `DbError::NotFound` when the order doesn't exist *or* its status
    /// is no longer `from` (someone else moved it first).
    pub async fn update_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
        completed_at: Option<DateTime<Utc>>,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %order_id, ?from, ?to, "Updating order status");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?3,
                updated_at = ?4,
                completed_at = COALESCE(?5, completed_at)
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(order_id)
        .bind(from)
        .bind(to)
        .bind(now)
        .bind(completed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (at expected status)", order_id));
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Hard-deletes an order; items and payments cascade.
    pub async fn delete(&self, order_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Total number of orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts one line item inside an open transaction.
async fn insert_item(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    item: &OrderItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, name_snapshot,
            unit_price_cents, quantity, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
