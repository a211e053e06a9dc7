//! # Task Repository
//!
//! Database operations for back-office tasks. Tasks may reference an
//! order; deleting the order leaves the task with `order_id = NULL`.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::activity::ActivityRepository;
use opsdesk_core::{ActivityEntry, Task, TaskStatus};

/// Filters for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<String>,
    pub order_id: Option<String>,
}

/// Repository for task database operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    /// Creates a new TaskRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaskRepository { pool }
    }

    /// Inserts a task and its audit entry in one transaction.
    pub async fn insert_with_activity(
        &self,
        task: &Task,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %task.id, title = %task.title, "Inserting task");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, status, assignee_id, assignee_name,
                order_id, due_on, created_by, created_at, updated_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(&task.assignee_id)
        .bind(&task.assignee_name)
        .bind(&task.order_id)
        .bind(task.due_on)
        .bind(&task.created_by)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .execute(&mut *tx)
        .await?;

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets a task by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, assignee_id, assignee_name,
                   order_id, due_on, created_by, created_at, updated_at, completed_at
            FROM tasks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks matching the filter: due soonest first, undated last.
    pub async fn list(&self, filter: &TaskFilter) -> DbResult<Vec<Task>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT id, title, description, status, assignee_id, assignee_name,
                   order_id, due_on, created_by, created_at, updated_at, completed_at
            FROM tasks
            WHERE 1 = 1
            "#,
        );

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(assignee_id) = &filter.assignee_id {
            qb.push(" AND assignee_id = ").push_bind(assignee_id.clone());
        }
        if let Some(order_id) = &filter.order_id {
            qb.push(" AND order_id = ").push_bind(order_id.clone());
        }

        qb.push(" ORDER BY due_on IS NULL, due_on, created_at");

        let tasks = qb.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    /// Updates a task, with the audit entry in the same transaction.
    pub async fn update_with_activity(
        &self,
        task: &Task,
        activity: &ActivityEntry,
    ) -> DbResult<()> {
        debug!(id = %task.id, "Updating task");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tasks SET
                title = ?2,
                description = ?3,
                status = ?4,
                assignee_id = ?5,
                assignee_name = ?6,
                order_id = ?7,
                due_on = ?8,
                updated_at = ?9,
                completed_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(&task.assignee_id)
        .bind(&task.assignee_name)
        .bind(&task.order_id)
        .bind(task.due_on)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", &task.id));
        }

        ActivityRepository::insert_on(&mut *tx, activity).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Hard-deletes a task.
    pub async fn delete(&self, task_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", task_id));
        }

        Ok(())
    }
}
