//! # Customer Repository
//!
//! Database operations for customer records. Customers referenced by
//! orders are soft-deleted (is_active = 0) instead of removed, so order
//! history keeps resolving.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::activity::ActivityRepository;
use opsdesk_core::{ActivityEntry, Customer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer and its audit entry in one transaction.
    pub async fn insert_with_activity(
        &self,
        customer: &Customer,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, address, notes,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&mut *tx)
        .await?;

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, notes,
                   is_active, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers, active only by default, alphabetical.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, notes,
                   is_active, created_at, updated_at
            FROM customers
            WHERE is_active = 1 OR ?1
            ORDER BY name
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Case-insensitive name search among active customers.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone, address, notes,
                   is_active, created_at, updated_at
            FROM customers
            WHERE is_active = 1 AND name LIKE '%' || ?1 || '%'
            ORDER BY name
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer, with the audit entry in the same transaction.
    pub async fn update_with_activity(
        &self,
        customer: &Customer,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                notes = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(customer.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Number of orders referencing a customer.
    ///
    /// The store uses this to decide between hard delete and deactivate.
    pub async fn order_count(&self, customer_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = ?1")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Hard-deletes a customer with no order history.
    pub async fn delete(&self, customer_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        Ok(())
    }
}
