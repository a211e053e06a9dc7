//! # Payment Store
//!
//! Actor-gated payment operations and per-order balance reconciliation.
//!
//! Only `completed` payments count toward a paid total; voiding or
//! refunding keeps the row for the audit trail and removes it from every
//! reconciliation in the same moment.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::activity::audit_entry;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeEvent, EventBus};
use opsdesk_core::{
    capabilities, reports, validate_amount_cents, Actor, CoreError, EntityKind, OrderStatus,
    Payment, PaymentMethod, PaymentStatus,
};
use opsdesk_db::{retry_write, Database, RetryPolicy};

// =============================================================================
// Request DTOs
// =============================================================================

/// Payment creation request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayment {
    pub order_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Payment edit request (amount, method, reference, notes).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentUpdate {
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Reconciliation of one order's money flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderBalance {
    pub order_id: String,
    pub total_cents: i64,
    /// Sum of completed payments.
    pub paid_cents: i64,
    /// total − paid, clamped at zero for display. Overpayment shows as
    /// zero outstanding.
    pub outstanding_cents: i64,
}

// =============================================================================
// Store
// =============================================================================

/// Actor-gated payment operations.
#[derive(Debug, Clone)]
pub struct PaymentStore {
    db: Database,
    events: EventBus,
    retry: RetryPolicy,
}

impl PaymentStore {
    pub fn new(db: Database, events: EventBus) -> Self {
        PaymentStore {
            db,
            events,
            retry: RetryPolicy::default_writes(),
        }
    }

    /// Records a payment against an order.
    ///
    /// Cancelled orders take no money. Overpayment is allowed (deposits,
    /// rounding); the balance view clamps at zero.
    pub async fn record(&self, actor: &Actor, request: NewPayment) -> StoreResult<Payment> {
        if !capabilities(actor.role).manage_payments {
            return Err(StoreError::forbidden(actor.role, "record payments"));
        }

        validate_amount_cents("amount", request.amount_cents).map_err(CoreError::from)?;

        let order = self
            .db
            .orders()
            .get_by_id(&request.order_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", &request.order_id))?;

        if order.status == OrderStatus::Cancelled {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order.id,
                current_status: order.status,
            }
            .into());
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: request.order_id.clone(),
            method: request.method,
            status: PaymentStatus::Completed,
            amount_cents: request.amount_cents,
            reference: request.reference,
            notes: request.notes,
            recorded_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let activity = audit_entry(
            actor,
            EntityKind::Payment,
            &payment.id,
            "recorded",
            Some(
                serde_json::json!({
                    "order_id": payment.order_id,
                    "amount_cents": payment.amount_cents,
                })
                .to_string(),
            ),
        );

        let repo = self.db.payments();
        retry_write(self.retry, "insert payment", || {
            repo.insert_with_activity(&payment, &activity)
        })
        .await?;

        info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            amount_cents = payment.amount_cents,
            actor = %actor.id,
            "Payment recorded"
        );
        self.events.publish(ChangeEvent::PaymentRecorded {
            payment_id: payment.id.clone(),
            order_id: payment.order_id.clone(),
        });

        Ok(payment)
    }

    /// Loads a payment.
    pub async fn get(&self, payment_id: &str) -> StoreResult<Payment> {
        self.db
            .payments()
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Payment", payment_id))
    }

    /// All payments against one order, including voided and refunded ones.
    pub async fn list_for_order(&self, order_id: &str) -> StoreResult<Vec<Payment>> {
        Ok(self.db.payments().list_by_order(order_id).await?)
    }

    /// Edits a completed payment's amount, method, reference or notes.
    pub async fn update(
        &self,
        actor: &Actor,
        payment_id: &str,
        request: PaymentUpdate,
    ) -> StoreResult<Payment> {
        if !capabilities(actor.role).manage_payments {
            return Err(StoreError::forbidden(actor.role, "edit payments"));
        }

        validate_amount_cents("amount", request.amount_cents).map_err(CoreError::from)?;

        let existing = self.get(payment_id).await?;
        if existing.status != PaymentStatus::Completed {
            return Err(CoreError::InvalidPaymentStatus {
                payment_id: payment_id.to_string(),
                current_status: existing.status,
            }
            .into());
        }

        let updated = Payment {
            method: request.method,
            amount_cents: request.amount_cents,
            reference: request.reference,
            notes: request.notes,
            updated_at: Utc::now(),
            ..existing
        };

        let activity = audit_entry(
            actor,
            EntityKind::Payment,
            payment_id,
            "updated",
            Some(serde_json::json!({ "amount_cents": updated.amount_cents }).to_string()),
        );

        let repo = self.db.payments();
        retry_write(self.retry, "update payment", || {
            repo.update_with_activity(&updated, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::PaymentRecorded {
            payment_id: updated.id.clone(),
            order_id: updated.order_id.clone(),
        });
        Ok(updated)
    }

    /// Voids a completed payment (entry mistake).
    pub async fn void(&self, actor: &Actor, payment_id: &str) -> StoreResult<Payment> {
        self.set_status(actor, payment_id, PaymentStatus::Voided, "voided")
            .await
    }

    /// Refunds a completed payment (money returned to the customer).
    pub async fn refund(&self, actor: &Actor, payment_id: &str) -> StoreResult<Payment> {
        self.set_status(actor, payment_id, PaymentStatus::Refunded, "refunded")
            .await
    }

    /// Hard-deletes a payment. Admin cleanup only.
    pub async fn delete(&self, actor: &Actor, payment_id: &str) -> StoreResult<()> {
        if !capabilities(actor.role).delete_records {
            return Err(StoreError::forbidden(actor.role, "delete payments"));
        }

        let payment = self.get(payment_id).await?;
        self.db.payments().delete(payment_id).await?;

        let activity = audit_entry(actor, EntityKind::Payment, payment_id, "deleted", None);
        self.db.activity().insert(&activity).await?;

        self.events.publish(ChangeEvent::PaymentDeleted {
            payment_id: payment_id.to_string(),
            order_id: payment.order_id,
        });
        Ok(())
    }

    /// Reconciles one order's balance from its completed payments.
    pub async fn order_balance(&self, order_id: &str) -> StoreResult<OrderBalance> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;
        let payments = self.db.payments().list_by_order(order_id).await?;

        let paid = reports::total_paid(&payments);
        let outstanding = reports::outstanding(order.total_cents, &payments).clamp_zero();

        Ok(OrderBalance {
            order_id: order_id.to_string(),
            total_cents: order.total_cents,
            paid_cents: paid.cents(),
            outstanding_cents: outstanding.cents(),
        })
    }

    /// Shared void/refund path: both are Completed → terminal moves.
    async fn set_status(
        &self,
        actor: &Actor,
        payment_id: &str,
        to: PaymentStatus,
        action: &str,
    ) -> StoreResult<Payment> {
        if !capabilities(actor.role).void_payments {
            return Err(StoreError::forbidden(actor.role, "void or refund payments"));
        }

        let existing = self.get(payment_id).await?;
        if existing.status != PaymentStatus::Completed {
            return Err(CoreError::InvalidPaymentStatus {
                payment_id: payment_id.to_string(),
                current_status: existing.status,
            }
            .into());
        }

        let activity = audit_entry(
            actor,
            EntityKind::Payment,
            payment_id,
            action,
            Some(serde_json::json!({ "amount_cents": existing.amount_cents }).to_string()),
        );

        let repo = self.db.payments();
        retry_write(self.retry, "set payment status", || {
            repo.set_status(payment_id, PaymentStatus::Completed, to, &activity)
        })
        .await?;

        info!(%payment_id, ?to, actor = %actor.id, "Payment status changed");
        self.events.publish(ChangeEvent::PaymentStatusChanged {
            payment_id: payment_id.to_string(),
            order_id: existing.order_id.clone(),
            to,
        });

        Ok(Payment {
            status: to,
            updated_at: Utc::now(),
            ..existing
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_store::{NewOrder, NewOrderItem, OrderStore};
    use crate::testutil::{admin, manager, seeded_db, staff, viewer};
    use opsdesk_core::Order;

    async fn stores() -> (PaymentStore, OrderStore, Database) {
        let db = seeded_db().await;
        let bus = EventBus::new();
        (
            PaymentStore::new(db.clone(), bus.clone()),
            OrderStore::new(db.clone(), bus),
            db,
        )
    }

    async fn order_for(db: &Database, orders: &OrderStore, quantity: i64) -> Order {
        let product = db.products().list(false).await.unwrap().remove(0);
        orders
            .create(
                &staff(),
                NewOrder {
                    customer_id: None,
                    customer_name: "Acme GmbH".to_string(),
                    items: vec![NewOrderItem {
                        product_id: product.id,
                        quantity,
                    }],
                    total_cents: None,
                    notes: None,
                },
            )
            .await
            .unwrap()
    }

    fn payment_request(order: &Order, amount_cents: i64) -> NewPayment {
        NewPayment {
            order_id: order.id.clone(),
            method: PaymentMethod::BankTransfer,
            amount_cents,
            reference: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_partial_payments_accumulate() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 2).await;
        let half = order.total_cents / 2;

        payments
            .record(&staff(), payment_request(&order, half))
            .await
            .unwrap();
        let balance = payments.order_balance(&order.id).await.unwrap();
        assert_eq!(balance.paid_cents, half);
        assert_eq!(balance.outstanding_cents, order.total_cents - half);

        payments
            .record(&staff(), payment_request(&order, order.total_cents - half))
            .await
            .unwrap();
        let balance = payments.order_balance(&order.id).await.unwrap();
        assert_eq!(balance.paid_cents, order.total_cents);
        assert_eq!(balance.outstanding_cents, 0);
    }

    #[tokio::test]
    async fn test_voided_payment_leaves_balance() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;

        let paid = payments
            .record(&staff(), payment_request(&order, order.total_cents))
            .await
            .unwrap();
        let voided = payments.void(&manager(), &paid.id).await.unwrap();
        assert_eq!(voided.status, PaymentStatus::Voided);

        let balance = payments.order_balance(&order.id).await.unwrap();
        assert_eq!(balance.paid_cents, 0);
        assert_eq!(balance.outstanding_cents, order.total_cents);

        // The row survives for the audit trail
        let all = payments.list_for_order(&order.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_staff_cannot_void() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;
        let paid = payments
            .record(&staff(), payment_request(&order, order.total_cents))
            .await
            .unwrap();

        let err = payments.void(&staff(), &paid.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_double_void_rejected() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;
        let paid = payments
            .record(&staff(), payment_request(&order, 100))
            .await
            .unwrap();

        payments.void(&admin(), &paid.id).await.unwrap();
        let err = payments.void(&admin(), &paid.id).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InvalidPaymentStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_refund_excluded_from_totals() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;
        let paid = payments
            .record(&staff(), payment_request(&order, order.total_cents))
            .await
            .unwrap();

        let refunded = payments.refund(&manager(), &paid.id).await.unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);

        let balance = payments.order_balance(&order.id).await.unwrap();
        assert_eq!(balance.paid_cents, 0);
    }

    #[tokio::test]
    async fn test_overpayment_clamps_outstanding() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;

        payments
            .record(&staff(), payment_request(&order, order.total_cents + 500))
            .await
            .unwrap();
        let balance = payments.order_balance(&order.id).await.unwrap();
        assert_eq!(balance.paid_cents, order.total_cents + 500);
        assert_eq!(balance.outstanding_cents, 0);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;

        let err = payments
            .record(&staff(), payment_request(&order, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancelled_order_takes_no_money() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;
        orders
            .change_status(&admin(), &order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let err = payments
            .record(&staff(), payment_request(&order, 100))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InvalidOrderStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_viewer_cannot_record() {
        let (payments, orders, db) = stores().await;
        let order = order_for(&db, &orders, 1).await;

        let err = payments
            .record(&viewer(), payment_request(&order, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }
}
