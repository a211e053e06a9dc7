//! # Payment Repository
//!
//! Database operations for payments against orders.
//!
//! Payments are never hard-deleted by normal flows; voiding or refunding
//! flips the status and the reconciliation queries ignore anything that
//! isn't `completed`. Hard delete exists for admin cleanup only.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::activity::ActivityRepository;
use opsdesk_core::{ActivityEntry, Payment, PaymentStatus};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a payment and its audit entry in one transaction.
    pub async fn insert_with_activity(
        &self,
        payment: &Payment,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %payment.id, order_id = %payment.order_id, "Inserting payment");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, method, status, amount_cents,
                reference, notes, recorded_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.method)
        .bind(payment.status)
        .bind(payment.amount_cents)
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(&payment.recorded_by)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *tx)
        .await?;

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, method, status, amount_cents,
                   reference, notes, recorded_by, created_at, updated_at
            FROM payments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// All payments against one order, oldest first.
    pub async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, method, status, amount_cents,
                   reference, notes, recorded_by, created_at, updated_at
            FROM payments
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Payments recorded within `[start, end)`, oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, method, status, amount_cents,
                   reference, notes, recorded_by, created_at, updated_at
            FROM payments
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sum of completed payments against an order, in cents.
    ///
    /// Voided and refunded payments never count.
    pub async fn total_paid_cents(&self, order_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents)
            FROM payments
            WHERE order_id = ?1 AND status = 'completed'
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }

    /// Updates the editable fields of a payment (amount, method,
    /// reference, notes), with the audit entry in the same transaction.
    pub async fn update_with_activity(
        &self,
        payment: &Payment,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %payment.id, "Updating payment");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                method = ?2,
                amount_cents = ?3,
                reference = ?4,
                notes = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&payment.id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(payment.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", &payment.id));
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Moves a payment between statuses with a guard against concurrent
    /// modification (void, refund), auditing in the same transaction.
    pub async fn set_status(
        &self,
        payment_id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %payment_id, ?from, ?to, "Updating payment status");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(payment_id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment (at expected status)", payment_id));
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Hard-deletes a payment. Admin cleanup only; normal flows void.
    pub async fn delete(&self, payment_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(payment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", payment_id));
        }

        Ok(())
    }
}
