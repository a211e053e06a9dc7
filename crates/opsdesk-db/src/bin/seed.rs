//! # Seed Data Generator
//!
//! Populates the database with development data: a product catalog, a
//! customer list, and a spread of orders with items and payments.
//!
//! ## Usage
//! ```bash
//! # Default database path
//! cargo run -p opsdesk-db --bin seed
//!
//! # Custom path and order count
//! cargo run -p opsdesk-db --bin seed -- --db ./data/opsdesk.db --orders 50
//! ```

use std::env;

use chrono::{Duration, Utc};
use uuid::Uuid;

use opsdesk_core::{
    order_number_prefix, ActivityEntry, Customer, EntityKind, Order, OrderItem, OrderStatus,
    Payment, PaymentMethod, PaymentStatus, Product,
};
use opsdesk_db::{Database, DbConfig};

/// Catalog seed: (sku, name, price_cents, cost_cents).
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("SRV-001", "Standard Service Visit", 12_500, 6_000),
    ("SRV-002", "Extended Service Visit", 22_000, 11_000),
    ("SRV-003", "Emergency Callout", 35_000, 15_000),
    ("PRT-001", "Replacement Filter", 1_950, 800),
    ("PRT-002", "Mounting Kit", 4_500, 2_100),
    ("PRT-003", "Control Unit", 28_900, 17_400),
    ("PRT-004", "Sensor Module", 8_750, 4_300),
    ("CON-001", "Consultation Hour", 9_000, 0),
    ("CON-002", "Site Survey", 15_000, 4_000),
    ("MNT-001", "Monthly Maintenance Plan", 7_500, 2_500),
];

/// Customer seed: (name, email).
const CUSTOMERS: &[(&str, &str)] = &[
    ("Harbor Logistics BV", "office@harborlogistics.example"),
    ("Linden & Zonen", "info@lindenzonen.example"),
    ("Cafe Meridiaan", "beheer@meridiaan.example"),
    ("Studio Vonk", "hello@studiovonk.example"),
    ("Van Dam Installaties", "planning@vandam.example"),
    ("Bakkerij De Korenbloem", "bestellingen@korenbloem.example"),
    ("Groenewoud Hoveniers", "admin@groenewoud.example"),
    ("Tandartspraktijk Zuid", "balie@praktijkzuid.example"),
];

const SEED_ACTOR_ID: &str = "00000000-0000-0000-0000-000000000001";
const SEED_ACTOR_NAME: &str = "Seed Script";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./opsdesk_dev.db");
    let mut order_count: usize = 30;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("OpsDesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./opsdesk_dev.db)");
                println!("  -o, --orders <N>     Number of orders to generate (default: 30)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("OpsDesk Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    if db.products().count().await? > 0 {
        println!("⚠ Database already contains products; skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Products
    let mut products = Vec::new();
    for (sku, name, price, cost) in PRODUCTS {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: (*sku).to_string(),
            name: (*name).to_string(),
            description: None,
            price_cents: *price,
            cost_cents: Some(*cost),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products()
            .insert_with_activity(&product, &seed_activity(EntityKind::Product, &product.id))
            .await?;
        products.push(product);
    }
    println!("✓ Seeded {} products", products.len());

    // Customers
    let mut customers = Vec::new();
    for (name, email) in CUSTOMERS {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            email: Some((*email).to_string()),
            phone: None,
            address: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.customers()
            .insert_with_activity(&customer, &seed_activity(EntityKind::Customer, &customer.id))
            .await?;
        customers.push(customer);
    }
    println!("✓ Seeded {} customers", customers.len());

    // Orders spread over the last 30 days, walking the daily sequence
    // manually since each seeded day starts empty.
    let mut generated = 0usize;
    let mut paid = 0usize;
    for n in 0..order_count {
        let days_ago = (n % 30) as i64;
        let created_at = Utc::now() - Duration::days(days_ago);
        let date = created_at.date_naive();
        let sequence = n / 30 + 1;
        let order_number = format!("{}{:03}", order_number_prefix(date), sequence);

        let customer = &customers[n % customers.len()];
        let product_a = &products[n % products.len()];
        let product_b = &products[(n + 3) % products.len()];
        let qty_a = (n % 3 + 1) as i64;
        let qty_b = (n % 2 + 1) as i64;

        let order_id = Uuid::new_v4().to_string();
        let items = vec![
            seed_item(&order_id, product_a, qty_a, created_at),
            seed_item(&order_id, product_b, qty_b, created_at),
        ];
        let total_cents: i64 = items.iter().map(|i| i.line_total_cents).sum();

        let status = match n % 5 {
            0 => OrderStatus::Received,
            1 => OrderStatus::Confirmed,
            2 => OrderStatus::InProgress,
            3 => OrderStatus::Delivered,
            _ => OrderStatus::Completed,
        };

        let order = Order {
            id: order_id.clone(),
            order_number,
            customer_id: Some(customer.id.clone()),
            customer_name: customer.name.clone(),
            status,
            total_cents,
            notes: None,
            created_by: SEED_ACTOR_ID.to_string(),
            created_at,
            updated_at: created_at,
            completed_at: (status == OrderStatus::Completed).then_some(created_at),
        };

        db.orders()
            .insert_with_activity(&order, &items, &seed_activity(EntityKind::Order, &order.id))
            .await?;
        generated += 1;

        // Completed and delivered orders get a payment; every third one
        // is only half paid so the outstanding report has data.
        if matches!(status, OrderStatus::Completed | OrderStatus::Delivered) {
            let amount = if n % 3 == 0 {
                total_cents / 2
            } else {
                total_cents
            };
            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                method: match n % 3 {
                    0 => PaymentMethod::BankTransfer,
                    1 => PaymentMethod::Card,
                    _ => PaymentMethod::Cash,
                },
                status: PaymentStatus::Completed,
                amount_cents: amount,
                reference: None,
                notes: None,
                recorded_by: SEED_ACTOR_ID.to_string(),
                created_at,
                updated_at: created_at,
            };
            db.payments()
                .insert_with_activity(&payment, &seed_activity(EntityKind::Payment, &payment.id))
                .await?;
            paid += 1;
        }
    }

    println!("✓ Seeded {} orders ({} with payments)", generated, paid);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one frozen-snapshot line item from a catalog product.
fn seed_item(
    order_id: &str,
    product: &Product,
    quantity: i64,
    created_at: chrono::DateTime<Utc>,
) -> OrderItem {
    OrderItem {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        product_id: product.id.clone(),
        name_snapshot: product.name.clone(),
        unit_price_cents: product.price_cents,
        quantity,
        line_total_cents: product.price_cents * quantity,
        created_at,
    }
}

/// Audit entry attributed to the seed script.
fn seed_activity(kind: EntityKind, entity_id: &str) -> ActivityEntry {
    ActivityEntry {
        id: Uuid::new_v4().to_string(),
        actor_id: SEED_ACTOR_ID.to_string(),
        actor_name: SEED_ACTOR_NAME.to_string(),
        entity_kind: kind,
        entity_id: entity_id.to_string(),
        action: "seeded".to_string(),
        details: None,
        created_at: Utc::now(),
    }
}
