//! # Activity Log Repository
//!
//! Append-only audit trail. Entries are written either standalone or as
//! part of a larger transaction (order create, status change), and are
//! never updated or deleted.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use opsdesk_core::{ActivityEntry, EntityKind};

/// Repository for the audit trail.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends an entry.
    pub async fn insert(&self, entry: &ActivityEntry) -> DbResult<()> {
        debug!(
            actor = %entry.actor_id,
            entity = %entry.entity_kind,
            entity_id = %entry.entity_id,
            action = %entry.action,
            "Recording activity"
        );

        Self::insert_on(&self.pool, entry).await
    }

    /// Appends an entry on an arbitrary executor.
    ///
    /// Lets other repositories include the audit entry in the same
    /// transaction as the write it describes.
    pub(crate) async fn insert_on<'e, E>(executor: E, entry: &ActivityEntry) -> DbResult<()>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO activity_log (
                id, actor_id, actor_name, entity_kind, entity_id,
                action, details, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.actor_id)
        .bind(&entry.actor_name)
        .bind(entry.entity_kind)
        .bind(&entry.entity_id)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Returns the most recent entries, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT id, actor_id, actor_name, entity_kind, entity_id,
                   action, details, created_at
            FROM activity_log
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Returns the full history of a single entity, newest first.
    pub async fn for_entity(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> DbResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT id, actor_id, actor_name, entity_kind, entity_id,
                   action, details, created_at
            FROM activity_log
            WHERE entity_kind = ?1 AND entity_id = ?2
            ORDER BY created_at DESC
            "#,
        )
        .bind(kind)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
