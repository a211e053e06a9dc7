//! # Expense Repository
//!
//! Database operations for operating expenses. Expenses are dated by
//! `incurred_on` (a calendar date), which is what reporting filters on.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::activity::ActivityRepository;
use opsdesk_core::{ActivityEntry, Expense};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts an expense and its audit entry in one transaction.
    pub async fn insert_with_activity(
        &self,
        expense: &Expense,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %expense.id, category = %expense.category, "Inserting expense");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, category, description, amount_cents,
                incurred_on, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.incurred_on)
        .bind(&expense.created_by)
        .bind(expense.created_at)
        .execute(&mut *tx)
        .await?;

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount_cents,
                   incurred_on, created_by, created_at
            FROM expenses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Expenses incurred within `[start, end]` inclusive, oldest first.
    pub async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount_cents,
                   incurred_on, created_by, created_at
            FROM expenses
            WHERE incurred_on >= ?1 AND incurred_on <= ?2
            ORDER BY incurred_on
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Updates an expense, with the audit entry in the same transaction.
    pub async fn update_with_activity(
        &self,
        expense: &Expense,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %expense.id, "Updating expense");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                category = ?2,
                description = ?3,
                amount_cents = ?4,
                incurred_on = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.incurred_on)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", &expense.id));
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Hard-deletes an expense.
    pub async fn delete(&self, expense_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(expense_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", expense_id));
        }

        Ok(())
    }
}
