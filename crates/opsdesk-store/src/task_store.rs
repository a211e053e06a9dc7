//! # Task Store
//!
//! Actor-gated back-office tasks: assignable, optionally linked to an
//! order, with a simple Open → InProgress → Done lifecycle. Unlike order
//! statuses, task movement is free for any role that manages tasks.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::activity::audit_entry;
use crate::error::{StoreError, StoreResult};
use crate::events::{ChangeEvent, EventBus};
use opsdesk_core::{
    capabilities, validate_name, Actor, CoreError, EntityKind, Task, TaskStatus,
};
use opsdesk_db::{retry_write, Database, RetryPolicy, TaskFilter};

/// Task create/edit request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub order_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub due_on: Option<chrono::NaiveDate>,
}

/// Actor-gated task operations.
#[derive(Debug, Clone)]
pub struct TaskStore {
    db: Database,
    events: EventBus,
    retry: RetryPolicy,
}

impl TaskStore {
    pub fn new(db: Database, events: EventBus) -> Self {
        TaskStore {
            db,
            events,
            retry: RetryPolicy::default_writes(),
        }
    }

    /// Creates a task.
    pub async fn create(&self, actor: &Actor, input: TaskInput) -> StoreResult<Task> {
        if !capabilities(actor.role).manage_tasks {
            return Err(StoreError::forbidden(actor.role, "create tasks"));
        }

        validate_name("title", &input.title).map_err(CoreError::from)?;

        if let Some(order_id) = &input.order_id {
            if self.db.orders().get_by_id(order_id).await?.is_none() {
                return Err(StoreError::not_found("Order", order_id));
            }
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            status: TaskStatus::Open,
            assignee_id: input.assignee_id,
            assignee_name: input.assignee_name,
            order_id: input.order_id,
            due_on: input.due_on,
            created_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let activity = audit_entry(actor, EntityKind::Task, &task.id, "created", None);

        let repo = self.db.tasks();
        retry_write(self.retry, "insert task", || {
            repo.insert_with_activity(&task, &activity)
        })
        .await?;

        info!(task_id = %task.id, actor = %actor.id, "Task created");
        self.events.publish(ChangeEvent::TaskChanged {
            task_id: task.id.clone(),
        });
        Ok(task)
    }

    /// Loads a task.
    pub async fn get(&self, task_id: &str) -> StoreResult<Task> {
        self.db
            .tasks()
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Task", task_id))
    }

    /// Lists tasks matching the filter, due soonest first.
    pub async fn list(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(self.db.tasks().list(&filter).await?)
    }

    /// Updates a task's editable fields, leaving status alone.
    pub async fn update(
        &self,
        actor: &Actor,
        task_id: &str,
        input: TaskInput,
    ) -> StoreResult<Task> {
        if !capabilities(actor.role).manage_tasks {
            return Err(StoreError::forbidden(actor.role, "edit tasks"));
        }

        validate_name("title", &input.title).map_err(CoreError::from)?;

        let existing = self.get(task_id).await?;
        let updated = Task {
            title: input.title,
            description: input.description,
            assignee_id: input.assignee_id,
            assignee_name: input.assignee_name,
            order_id: input.order_id,
            due_on: input.due_on,
            updated_at: Utc::now(),
            ..existing
        };

        let activity = audit_entry(actor, EntityKind::Task, task_id, "updated", None);

        let repo = self.db.tasks();
        retry_write(self.retry, "update task", || {
            repo.update_with_activity(&updated, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::TaskChanged {
            task_id: task_id.to_string(),
        });
        Ok(updated)
    }

    /// Moves a task to a new status; `Done` stamps `completed_at`.
    pub async fn set_status(
        &self,
        actor: &Actor,
        task_id: &str,
        status: TaskStatus,
    ) -> StoreResult<Task> {
        if !capabilities(actor.role).manage_tasks {
            return Err(StoreError::forbidden(actor.role, "move tasks"));
        }

        let existing = self.get(task_id).await?;
        let now = Utc::now();
        let updated = Task {
            status,
            updated_at: now,
            completed_at: match status {
                TaskStatus::Done => existing.completed_at.or(Some(now)),
                _ => None,
            },
            ..existing
        };

        let activity = audit_entry(
            actor,
            EntityKind::Task,
            task_id,
            "status_changed",
            Some(serde_json::json!({ "to": status }).to_string()),
        );

        let repo = self.db.tasks();
        retry_write(self.retry, "set task status", || {
            repo.update_with_activity(&updated, &activity)
        })
        .await?;

        self.events.publish(ChangeEvent::TaskChanged {
            task_id: task_id.to_string(),
        });
        Ok(updated)
    }

    /// Deletes a task.
    pub async fn delete(&self, actor: &Actor, task_id: &str) -> StoreResult<()> {
        if !capabilities(actor.role).manage_tasks {
            return Err(StoreError::forbidden(actor.role, "delete tasks"));
        }

        self.db.tasks().delete(task_id).await?;

        let activity = audit_entry(actor, EntityKind::Task, task_id, "deleted", None);
        self.db.activity().insert(&activity).await?;

        self.events.publish(ChangeEvent::TaskChanged {
            task_id: task_id.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seeded_db, staff, viewer};

    async fn store() -> TaskStore {
        TaskStore::new(seeded_db().await, EventBus::new())
    }

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
            assignee_id: None,
            assignee_name: None,
            order_id: None,
            due_on: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_complete() {
        let store = store().await;
        let task = store.create(&staff(), input("Call supplier")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Open);
        assert!(task.completed_at.is_none());

        let done = store
            .set_status(&staff(), &task.id, TaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert!(done.completed_at.is_some());

        // Reopening clears the completion stamp
        let reopened = store
            .set_status(&staff(), &task.id, TaskStatus::Open)
            .await
            .unwrap();
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_viewer_cannot_create() {
        let store = store().await;
        let err = store.create(&viewer(), input("X")).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_unknown_order_link_rejected() {
        let store = store().await;
        let mut req = input("Linked task");
        req.order_id = Some("no-such-order".to_string());
        let err = store.create(&staff(), req).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "Order", .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = store().await;
        let a = store.create(&staff(), input("One")).await.unwrap();
        store.create(&staff(), input("Two")).await.unwrap();
        store
            .set_status(&staff(), &a.id, TaskStatus::InProgress)
            .await
            .unwrap();

        let in_progress = store
            .list(TaskFilter {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].id, a.id);
    }
}
