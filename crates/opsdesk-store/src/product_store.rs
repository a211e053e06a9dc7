//! # Product Store
//!
//! Actor-gated catalog management. SKU uniqueness is enforced by the
//! database; products that appear on orders are deactivated rather than
//! deleted so item snapshots keep their provenance.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::activity::audit_entry;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeEvent, EventBus};
use opsdesk_core::{
    capabilities, validate_name, validate_price_cents, validate_sku, Actor, CoreError, EntityKind,
    Product,
};
use opsdesk_db::{retry_write, Database, RetryPolicy};

/// Product create/edit request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
}

/// Actor-gated product operations.
#[derive(Debug, Clone)]
pub struct ProductStore {
    db: Database,
    events: EventBus,
    retry: RetryPolicy,
}

impl ProductStore {
    pub fn new(db: Database, events: EventBus) -> Self {
        ProductStore {
            db,
            events,
            retry: RetryPolicy::default_writes(),
        }
    }

    fn validate(input: &ProductInput) -> StoreResult<()> {
        validate_sku(&input.sku).map_err(CoreError::from)?;
        validate_name("name", &input.name).map_err(CoreError::from)?;
        validate_price_cents(input.price_cents).map_err(CoreError::from)?;
        if let Some(cost) = input.cost_cents {
            validate_price_cents(cost).map_err(CoreError::from)?;
        }
        Ok(())
    }

    /// Creates a product. A taken SKU surfaces as a unique violation.
    pub async fn create(&self, actor: &Actor, input: ProductInput) -> StoreResult<Product> {
        if !capabilities(actor.role).manage_products {
            return Err(StoreError::forbidden(actor.role, "create products"));
        }

        Self::validate(&input)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: input.sku.trim().to_string(),
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            cost_cents: input.cost_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let activity = audit_entry(
            actor,
            EntityKind::Product,
            &product.id,
            "created",
            Some(serde_json::json!({ "sku": product.sku }).to_string()),
        );

        let repo = self.db.products();
        retry_write(self.retry, "insert product", || {
            repo.insert_with_activity(&product, &activity)
        })
        .await?;

        info!(sku = %product.sku, actor = %actor.id, "Product created");
        self.events.publish(ChangeEvent::ProductChanged {
            product_id: product.id.clone(),
        });
        Ok(product)
    }

    /// Loads a product by ID.
    pub async fn get(&self, product_id: &str) -> StoreResult<Product> {
        self.db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", product_id))
    }

    /// Loads a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> StoreResult<Product> {
        self.db
            .products()
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", sku))
    }

    /// Lists products, alphabetical.
    pub async fn list(&self, include_inactive: bool) -> StoreResult<Vec<Product>> {
        Ok(self.db.products().list(include_inactive).await?)
    }

    /// Updates a product.
    ///
    /// Price changes only affect future orders; existing items keep their
    /// frozen snapshots.
    pub async fn update(
        &self,
        actor: &Actor,
        product_id: &str,
        input: ProductInput,
    ) -> StoreResult<Product> {
        if !capabilities(actor.role).manage_products {
            return Err(StoreError::forbidden(actor.role, "edit products"));
        }

        Self::validate(&input)?;

        let existing = self.get(product_id).await?;
        let updated = Product {
            sku: input.sku.trim().to_string(),
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            cost_cents: input.cost_cents,
            updated_at: Utc::now(),
            ..existing
        };

        let activity = audit_entry(
            actor,
            EntityKind::Product,
            product_id,
            "updated",
            Some(serde_json::json!({ "price_cents": updated.price_cents }).to_string()),
        );

        let repo = self.db.products();
        retry_write(self.retry, "update product", || {
            repo.update_with_activity(&updated, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::ProductChanged {
            product_id: product_id.to_string(),
        });
        Ok(updated)
    }

    /// Removes a product.
    ///
    /// Hard-deletes only when no order items reference it; otherwise
    /// deactivates. Returns whether the row was actually deleted.
    pub async fn remove(&self, actor: &Actor, product_id: &str) -> StoreResult<bool> {
        if !capabilities(actor.role).delete_records {
            return Err(StoreError::forbidden(actor.role, "delete products"));
        }

        let existing = self.get(product_id).await?;
        let references = self.db.products().order_item_count(product_id).await?;

        if references == 0 {
            self.db.products().delete(product_id).await?;
            let activity = audit_entry(actor, EntityKind::Product, product_id, "deleted", None);
            self.db.activity().insert(&activity).await?;

            self.events.publish(ChangeEvent::ProductChanged {
                product_id: product_id.to_string(),
            });
            return Ok(true);
        }

        let deactivated = Product {
            is_active: false,
            updated_at: Utc::now(),
            ..existing
        };
        let activity = audit_entry(
            actor,
            EntityKind::Product,
            product_id,
            "deactivated",
            Some(serde_json::json!({ "order_item_count": references }).to_string()),
        );

        let repo = self.db.products();
        retry_write(self.retry, "deactivate product", || {
            repo.update_with_activity(&deactivated, &activity)
        })
        .await?;

        info!(%product_id, actor = %actor.id, "Product deactivated (has order items)");
        self.events.publish(ChangeEvent::ProductChanged {
            product_id: product_id.to_string(),
        });
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{admin, manager, seeded_db, staff};
    use opsdesk_db::DbError;

    async fn store() -> (ProductStore, Database) {
        let db = seeded_db().await;
        (ProductStore::new(db.clone(), EventBus::new()), db)
    }

    fn input(sku: &str, price: i64) -> ProductInput {
        ProductInput {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            description: None,
            price_cents: price,
            cost_cents: Some(price / 2),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_sku() {
        let (store, _db) = store().await;
        let created = store.create(&manager(), input("NEW-01", 4200)).await.unwrap();

        let found = store.get_by_sku("NEW-01").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.price_cents, 4200);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let (store, _db) = store().await;
        store.create(&manager(), input("DUP-01", 100)).await.unwrap();

        let err = store.create(&manager(), input("DUP-01", 200)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Db(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_staff_cannot_manage_catalog() {
        let (store, _db) = store().await;
        let err = store.create(&staff(), input("ST-01", 100)).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_invalid_sku_rejected() {
        let (store, _db) = store().await;
        let err = store
            .create(&manager(), input("has space", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let (store, _db) = store().await;
        let err = store.create(&manager(), input("NEG-01", -5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_remove_unreferenced_product_hard_deletes() {
        let (store, _db) = store().await;
        let product = store.create(&manager(), input("TMP-01", 100)).await.unwrap();

        let deleted = store.remove(&admin(), &product.id).await.unwrap();
        assert!(deleted);
    }
}
