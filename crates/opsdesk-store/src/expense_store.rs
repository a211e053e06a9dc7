//! # Expense Store
//!
//! Actor-gated expense entry. Expenses feed the net figure in revenue
//! reports and nothing else.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::activity::audit_entry;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeEvent, EventBus};
use opsdesk_core::{
    capabilities, validate_amount_cents, validate_name, Actor, CoreError, EntityKind, Expense,
};
use opsdesk_db::{retry_write, Database, RetryPolicy};

/// Expense create/edit request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseInput {
    pub category: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub incurred_on: NaiveDate,
}

/// Actor-gated expense operations.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    db: Database,
    events: EventBus,
    retry: RetryPolicy,
}

impl ExpenseStore {
    pub fn new(db: Database, events: EventBus) -> Self {
        ExpenseStore {
            db,
            events,
            retry: RetryPolicy::default_writes(),
        }
    }

    fn validate(input: &ExpenseInput) -> StoreResult<()> {
        validate_name("category", &input.category).map_err(CoreError::from)?;
        validate_amount_cents("amount", input.amount_cents).map_err(CoreError::from)?;
        Ok(())
    }

    /// Records an expense.
    pub async fn create(&self, actor: &Actor, input: ExpenseInput) -> StoreResult<Expense> {
        if !capabilities(actor.role).manage_expenses {
            return Err(StoreError::forbidden(actor.role, "record expenses"));
        }

        Self::validate(&input)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: input.category,
            description: input.description,
            amount_cents: input.amount_cents,
            incurred_on: input.incurred_on,
            created_by: actor.id.clone(),
            created_at: Utc::now(),
        };

        let activity = audit_entry(
            actor,
            EntityKind::Expense,
            &expense.id,
            "created",
            Some(
                serde_json::json!({
                    "category": expense.category,
                    "amount_cents": expense.amount_cents,
                })
                .to_string(),
            ),
        );

        let repo = self.db.expenses();
        retry_write(self.retry, "insert expense", || {
            repo.insert_with_activity(&expense, &activity)
        })
        .await?;

        info!(
            expense_id = %expense.id,
            category = %expense.category,
            actor = %actor.id,
            "Expense recorded"
        );
        self.events.publish(ChangeEvent::ExpenseChanged {
            expense_id: expense.id.clone(),
        });
        Ok(expense)
    }

    /// Loads an expense.
    pub async fn get(&self, expense_id: &str) -> StoreResult<Expense> {
        self.db
            .expenses()
            .get_by_id(expense_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Expense", expense_id))
    }

    /// Expenses incurred within the inclusive date range.
    pub async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Expense>> {
        Ok(self.db.expenses().list_between(start, end).await?)
    }

    /// Updates an expense.
    pub async fn update(
        &self,
        actor: &Actor,
        expense_id: &str,
        input: ExpenseInput,
    ) -> StoreResult<Expense> {
        if !capabilities(actor.role).manage_expenses {
            return Err(StoreError::forbidden(actor.role, "edit expenses"));
        }

        Self::validate(&input)?;

        let existing = self.get(expense_id).await?;
        let updated = Expense {
            category: input.category,
            description: input.description,
            amount_cents: input.amount_cents,
            incurred_on: input.incurred_on,
            ..existing
        };

        let activity = audit_entry(
            actor,
            EntityKind::Expense,
            expense_id,
            "updated",
            Some(serde_json::json!({ "amount_cents": updated.amount_cents }).to_string()),
        );

        let repo = self.db.expenses();
        retry_write(self.retry, "update expense", || {
            repo.update_with_activity(&updated, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::ExpenseChanged {
            expense_id: expense_id.to_string(),
        });
        Ok(updated)
    }

    /// Deletes an expense.
    pub async fn delete(&self, actor: &Actor, expense_id: &str) -> StoreResult<()> {
        if !capabilities(actor.role).manage_expenses {
            return Err(StoreError::forbidden(actor.role, "delete expenses"));
        }

        self.db.expenses().delete(expense_id).await?;

        let activity = audit_entry(actor, EntityKind::Expense, expense_id, "deleted", None);
        self.db.activity().insert(&activity).await?;

        self.events.publish(ChangeEvent::ExpenseChanged {
            expense_id: expense_id.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{manager, seeded_db, staff};

    async fn store() -> ExpenseStore {
        ExpenseStore::new(seeded_db().await, EventBus::new())
    }

    fn input(category: &str, amount: i64, date: NaiveDate) -> ExpenseInput {
        ExpenseInput {
            category: category.to_string(),
            description: None,
            amount_cents: amount,
            incurred_on: date,
        }
    }

    #[tokio::test]
    async fn test_create_and_range_query() {
        let store = store().await;
        let june = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let july = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();

        store.create(&manager(), input("rent", 95_000, june)).await.unwrap();
        store.create(&manager(), input("supplies", 4_200, july)).await.unwrap();

        let june_only = store
            .list_between(
                NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(june_only.len(), 1);
        assert_eq!(june_only[0].category, "rent");
    }

    #[tokio::test]
    async fn test_staff_cannot_record_expenses() {
        let store = store().await;
        let date = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let err = store.create(&staff(), input("rent", 100, date)).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let store = store().await;
        let date = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let err = store.create(&manager(), input("rent", 0, date)).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }
}
