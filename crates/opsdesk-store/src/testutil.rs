//! Shared fixtures for store tests: an in-memory database with one
//! catalog product, plus one actor per role.

use chrono::Utc;
use uuid::Uuid;

use opsdesk_core::{ActivityEntry, Actor, EntityKind, Product, Role};
use opsdesk_db::{Database, DbConfig};

/// Fresh in-memory database with migrations applied and one active
/// product in the catalog.
pub(crate) async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: "SRV-001".to_string(),
        name: "Standard Service Visit".to_string(),
        description: None,
        price_cents: 12_500,
        cost_cents: Some(6_000),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let activity = ActivityEntry {
        id: Uuid::new_v4().to_string(),
        actor_id: "fixture".to_string(),
        actor_name: "Fixture".to_string(),
        entity_kind: EntityKind::Product,
        entity_id: product.id.clone(),
        action: "seeded".to_string(),
        details: None,
        created_at: now,
    };
    db.products()
        .insert_with_activity(&product, &activity)
        .await
        .expect("seed product");

    db
}

pub(crate) fn admin() -> Actor {
    Actor::new("actor-admin", "Ada Admin", Role::Admin)
}

pub(crate) fn manager() -> Actor {
    Actor::new("actor-manager", "Max Manager", Role::Manager)
}

pub(crate) fn staff() -> Actor {
    Actor::new("actor-staff", "Sam Staff", Role::Staff)
}

pub(crate) fn viewer() -> Actor {
    Actor::new("actor-viewer", "Vic Viewer", Role::Viewer)
}
