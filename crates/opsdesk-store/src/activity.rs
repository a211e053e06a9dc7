//! # Activity Feed
//!
//! Read access to the audit trail, plus the entry builder every store
//! uses when writing.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use opsdesk_core::{capabilities, ActivityEntry, Actor, EntityKind};
use opsdesk_db::Database;

/// Builds the audit entry for one mutation.
///
/// `details` is serialized JSON metadata (old/new values, amounts).
pub(crate) fn audit_entry(
    actor: &Actor,
    kind: EntityKind,
    entity_id: &str,
    action: &str,
    details: Option<String>,
) -> ActivityEntry {
    ActivityEntry {
        id: Uuid::new_v4().to_string(),
        actor_id: actor.id.clone(),
        actor_name: actor.name.clone(),
        entity_kind: kind,
        entity_id: entity_id.to_string(),
        action: action.to_string(),
        details,
        created_at: Utc::now(),
    }
}

/// Read-side view of the audit trail.
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    db: Database,
}

impl ActivityFeed {
    pub fn new(db: Database) -> Self {
        ActivityFeed { db }
    }

    /// The most recent entries across all entities, newest first.
    pub async fn recent(&self, actor: &Actor, limit: i64) -> StoreResult<Vec<ActivityEntry>> {
        if !capabilities(actor.role).view_reports {
            return Err(StoreError::forbidden(actor.role, "view the activity feed"));
        }

        Ok(self.db.activity().recent(limit).await?)
    }

    /// Full audit history of one entity, newest first.
    pub async fn for_entity(
        &self,
        actor: &Actor,
        kind: EntityKind,
        entity_id: &str,
    ) -> StoreResult<Vec<ActivityEntry>> {
        if !capabilities(actor.role).view_reports {
            return Err(StoreError::forbidden(actor.role, "view the activity feed"));
        }

        Ok(self.db.activity().for_entity(kind, entity_id).await?)
    }
}
