//! # Customer Store
//!
//! Actor-gated customer management. Customers with order history are
//! deactivated instead of deleted so past orders keep resolving.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::activity::audit_entry;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeEvent, EventBus};
use opsdesk_core::{capabilities, validate_name, Actor, CoreError, Customer, EntityKind};
use opsdesk_db::{retry_write, Database, RetryPolicy};

/// Customer create/edit request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Actor-gated customer operations.
#[derive(Debug, Clone)]
pub struct CustomerStore {
    db: Database,
    events: EventBus,
    retry: RetryPolicy,
}

impl CustomerStore {
    pub fn new(db: Database, events: EventBus) -> Self {
        CustomerStore {
            db,
            events,
            retry: RetryPolicy::default_writes(),
        }
    }

    /// Creates a customer.
    pub async fn create(&self, actor: &Actor, input: CustomerInput) -> StoreResult<Customer> {
        if !capabilities(actor.role).manage_customers {
            return Err(StoreError::forbidden(actor.role, "create customers"));
        }

        validate_name("name", &input.name).map_err(CoreError::from)?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            notes: input.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let activity = audit_entry(actor, EntityKind::Customer, &customer.id, "created", None);

        let repo = self.db.customers();
        retry_write(self.retry, "insert customer", || {
            repo.insert_with_activity(&customer, &activity)
        })
        .await?;

        info!(customer_id = %customer.id, actor = %actor.id, "Customer created");
        self.events.publish(ChangeEvent::CustomerChanged {
            customer_id: customer.id.clone(),
        });
        Ok(customer)
    }

    /// Loads a customer.
    pub async fn get(&self, customer_id: &str) -> StoreResult<Customer> {
        self.db
            .customers()
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Customer", customer_id))
    }

    /// Lists customers, alphabetical.
    pub async fn list(&self, include_inactive: bool) -> StoreResult<Vec<Customer>> {
        Ok(self.db.customers().list(include_inactive).await?)
    }

    /// Case-insensitive name search among active customers.
    pub async fn search(&self, query: &str) -> StoreResult<Vec<Customer>> {
        Ok(self.db.customers().search(query).await?)
    }

    /// Updates a customer's contact fields.
    pub async fn update(
        &self,
        actor: &Actor,
        customer_id: &str,
        input: CustomerInput,
    ) -> StoreResult<Customer> {
        if !capabilities(actor.role).manage_customers {
            return Err(StoreError::forbidden(actor.role, "edit customers"));
        }

        validate_name("name", &input.name).map_err(CoreError::from)?;

        let existing = self.get(customer_id).await?;
        let updated = Customer {
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            notes: input.notes,
            updated_at: Utc::now(),
            ..existing
        };

        let activity = audit_entry(actor, EntityKind::Customer, customer_id, "updated", None);

        let repo = self.db.customers();
        retry_write(self.retry, "update customer", || {
            repo.update_with_activity(&updated, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::CustomerChanged {
            customer_id: customer_id.to_string(),
        });
        Ok(updated)
    }

    /// Removes a customer.
    ///
    /// Hard-deletes only when no orders reference the customer; otherwise
    /// deactivates. Returns whether the row was actually deleted.
    pub async fn remove(&self, actor: &Actor, customer_id: &str) -> StoreResult<bool> {
        if !capabilities(actor.role).delete_records {
            return Err(StoreError::forbidden(actor.role, "delete customers"));
        }

        let existing = self.get(customer_id).await?;
        let orders = self.db.customers().order_count(customer_id).await?;

        if orders == 0 {
            self.db.customers().delete(customer_id).await?;
            let activity = audit_entry(actor, EntityKind::Customer, customer_id, "deleted", None);
            self.db.activity().insert(&activity).await?;

            info!(%customer_id, actor = %actor.id, "Customer deleted");
            self.events.publish(ChangeEvent::CustomerChanged {
                customer_id: customer_id.to_string(),
            });
            return Ok(true);
        }

        let deactivated = Customer {
            is_active: false,
            updated_at: Utc::now(),
            ..existing
        };
        let activity = audit_entry(
            actor,
            EntityKind::Customer,
            customer_id,
            "deactivated",
            Some(serde_json::json!({ "order_count": orders }).to_string()),
        );

        let repo = self.db.customers();
        retry_write(self.retry, "deactivate customer", || {
            repo.update_with_activity(&deactivated, &activity)
        })
        .await?;

        info!(%customer_id, actor = %actor.id, "Customer deactivated (has orders)");
        self.events.publish(ChangeEvent::CustomerChanged {
            customer_id: customer_id.to_string(),
        });
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_store::{NewOrder, NewOrderItem, OrderStore};
    use crate::testutil::{admin, seeded_db, staff, viewer};

    async fn store() -> (CustomerStore, Database) {
        let db = seeded_db().await;
        (CustomerStore::new(db.clone(), EventBus::new()), db)
    }

    fn input(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_search() {
        let (store, _db) = store().await;
        store.create(&staff(), input("Noorderlicht BV")).await.unwrap();

        let hits = store.search("noorder").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Noorderlicht BV");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let (store, _db) = store().await;
        let err = store.create(&staff(), input("   ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_viewer_cannot_create() {
        let (store, _db) = store().await;
        let err = store.create(&viewer(), input("X")).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_remove_without_orders_hard_deletes() {
        let (store, _db) = store().await;
        let customer = store.create(&staff(), input("Ephemeral")).await.unwrap();

        let deleted = store.remove(&admin(), &customer.id).await.unwrap();
        assert!(deleted);
        assert!(matches!(
            store.get(&customer.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_with_orders_deactivates() {
        let (store, db) = store().await;
        let customer = store.create(&staff(), input("Regular Client")).await.unwrap();

        let orders = OrderStore::new(db.clone(), EventBus::new());
        let product = db.products().list(false).await.unwrap().remove(0);
        orders
            .create(
                &staff(),
                NewOrder {
                    customer_id: Some(customer.id.clone()),
                    customer_name: customer.name.clone(),
                    items: vec![NewOrderItem {
                        product_id: product.id,
                        quantity: 1,
                    }],
                    total_cents: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let deleted = store.remove(&admin(), &customer.id).await.unwrap();
        assert!(!deleted);

        let kept = store.get(&customer.id).await.unwrap();
        assert!(!kept.is_active);
    }
}
